//! Utils to define the time of interest when checking the validity window of a certificate

use core::{fmt, time::Duration};
use std::time::{SystemTime, UNIX_EPOCH};

use log::error;

use crate::util::error::*;

/// Time of interest for the validity check of a certificate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct TimeOfInterest(pub der::DateTime);

impl fmt::Display for TimeOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TimeOfInterest {
    /// Create a [`TimeOfInterest`] from Unix epoch
    pub fn from_unix_secs(v: u64) -> der::Result<Self> {
        Ok(Self(der::DateTime::from_unix_duration(
            Duration::from_secs(v),
        )?))
    }
}

/// `get_now_as_unix_epoch` returns the current system time as seconds since Unix epoch. A clock
/// that reads before the epoch yields [`Error::Misconfiguration`].
pub fn get_now_as_unix_epoch() -> Result<u64> {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => Ok(n.as_secs()),
        Err(e) => {
            error!("System clock reads before Unix epoch: {}", e);
            Err(Error::Misconfiguration(format!(
                "system clock reads before Unix epoch: {}",
                e
            )))
        }
    }
}

#[test]
fn time_of_interest_test() {
    let toi = TimeOfInterest::from_unix_secs(1_700_000_000).unwrap();
    assert!(toi.to_string().starts_with("2023"));
    assert!(TimeOfInterest::from_unix_secs(0)
        .unwrap()
        .to_string()
        .starts_with("1970"));
    assert!(get_now_as_unix_epoch().unwrap() > 1_700_000_000);
}
