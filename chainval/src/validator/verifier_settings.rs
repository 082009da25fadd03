//! Structures and functions related to configuring certificate verification operations

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Result as SerdeResult;

use chainprocmacros::*;

use crate::util::cert_utilities::get_file_as_byte_vec;
use crate::util::error::*;
use crate::util::time_of_interest::get_now_as_unix_epoch;

/// `VerifierSettings` is a `BTreeMap` that maps arbitrary string values to a variant map. Values
/// are accessed using the generated `get_xxx`/`set_xxx` functions, i.e., `get_fetch_timeout`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierSettings(pub BTreeMap<String, VerifierSettingTypes>);

impl VerifierSettings {
    /// Creates a new empty [`VerifierSettings`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the `VS_TIME_OF_INTEREST` value if set, otherwise the current time. Fails if the
    /// value is unset and the system clock cannot be read.
    pub fn time_of_interest(&self) -> Result<u64> {
        match self.get_time_of_interest() {
            Some(toi) => Ok(toi),
            None => get_now_as_unix_epoch(),
        }
    }

    /// Checks for values that would prevent any certificate with an issuer link from verifying
    pub fn validate(&self) -> Result<()> {
        if 0 == self.get_max_chain_depth() {
            return Err(Error::Misconfiguration(format!(
                "{} must be at least 1",
                VS_MAX_CHAIN_DEPTH
            )));
        }
        Ok(())
    }
}

/// `VerifierSettingTypes` is used to define a variant map with types associated with
/// resolving, revocation checking and matching certificate chains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifierSettingTypes {
    /// Represents bool values
    Bool(bool),
    /// Represents u8 values
    U8(u8),
    /// Represents u64 values
    U64(u64),
    /// Represents String values
    String(String),
    /// Represents duration or a timeout
    Duration(Duration),
}

/// `VS_TIME_OF_INTEREST` is used to retrieve the time against which validity windows are evaluated
/// from a [`VerifierSettings`] object. The value is expressed as a u64 containing seconds since Unix
/// epoch. When unset, the current time is used. A value of 0 disables validity checks.
pub static VS_TIME_OF_INTEREST: &str = "vsTimeOfInterest";

/// `VS_MAX_CHAIN_DEPTH` is used to retrieve the maximum number of certificates, including the
/// leaf, that may appear in a resolved chain. Defaults to [`VS_MAX_CHAIN_DEPTH_DEFAULT`].
pub static VS_MAX_CHAIN_DEPTH: &str = "vsMaxChainDepth";

/// Default maximum chain depth
pub const VS_MAX_CHAIN_DEPTH_DEFAULT: u8 = 10;

/// `VS_FETCH_TIMEOUT` is used to retrieve the timeout applied to each issuer certificate retrieval.
pub static VS_FETCH_TIMEOUT: &str = "vsFetchTimeout";

/// Default issuer retrieval timeout
pub const VS_FETCH_TIMEOUT_DEFAULT: Duration = Duration::from_secs(10);

/// `VS_CRL_TIMEOUT` is used to retrieve the timeout applied to each CRL retrieval.
pub static VS_CRL_TIMEOUT: &str = "vsCrlTimeout";

/// Default CRL retrieval timeout
pub const VS_CRL_TIMEOUT_DEFAULT: Duration = Duration::from_secs(60);

/// `VS_MAX_RESPONSE_SIZE` is used to retrieve the largest response body, in bytes, that will be
/// accepted from a fetcher.
pub static VS_MAX_RESPONSE_SIZE: &str = "vsMaxResponseSize";

/// Default maximum response size (10 MiB)
pub const VS_MAX_RESPONSE_SIZE_DEFAULT: u64 = 10 * 1024 * 1024;

/// `VS_CHECK_REVOCATION_STATUS` governs whether CRLs are consulted during verification. By default,
/// this value is true.
pub static VS_CHECK_REVOCATION_STATUS: &str = "vsCheckRevocationStatus";

/// `VS_PARALLEL_CRL_FETCH` governs whether CRLs named by a chain are retrieved concurrently. By
/// default, this value is true.
pub static VS_PARALLEL_CRL_FETCH: &str = "vsParallelCrlFetch";

/// `VS_REGISTRY_FILE` is used to retrieve the name of a file used to persist the trust registry.
/// The library does not read or write this file; it is used by front ends such as chaintool.
pub static VS_REGISTRY_FILE: &str = "vsRegistryFile";

vs_gets_and_sets!(VS_TIME_OF_INTEREST, u64);
vs_gets_and_sets_with_default!(VS_MAX_CHAIN_DEPTH, u8, VS_MAX_CHAIN_DEPTH_DEFAULT);
vs_gets_and_sets_with_default!(VS_FETCH_TIMEOUT, Duration, VS_FETCH_TIMEOUT_DEFAULT);
vs_gets_and_sets_with_default!(VS_CRL_TIMEOUT, Duration, VS_CRL_TIMEOUT_DEFAULT);
vs_gets_and_sets_with_default!(VS_MAX_RESPONSE_SIZE, u64, VS_MAX_RESPONSE_SIZE_DEFAULT);
vs_gets_and_sets_with_default!(VS_CHECK_REVOCATION_STATUS, bool, true);
vs_gets_and_sets_with_default!(VS_PARALLEL_CRL_FETCH, bool, true);
vs_gets_and_sets!(VS_REGISTRY_FILE, String);

/// `read_settings` deserializes a JSON-formatted [`VerifierSettings`] object from the file named by
/// `fname`. An absent name or a missing file yields default settings. A file that cannot be parsed
/// yields [`Error::ParseError`]. Values rejected by [`VerifierSettings::validate`] yield
/// [`Error::Misconfiguration`].
pub fn read_settings(fname: &Option<String>) -> Result<VerifierSettings> {
    if let Some(fname) = fname {
        let p = Path::new(fname.as_str());
        if Path::exists(p) {
            let json = get_file_as_byte_vec(p)?;
            let r: SerdeResult<VerifierSettings> = serde_json::from_slice(&json);
            return match r {
                Ok(vs) => {
                    if let Err(e) = vs.validate() {
                        log::error!("Invalid settings in {}: {}", fname, e);
                        return Err(e);
                    }
                    Ok(vs)
                }
                Err(e) => {
                    log::error!("Failed to parse settings file {}: {}", fname, e);
                    Err(Error::ParseError)
                }
            };
        }
    }
    Ok(VerifierSettings::new())
}

#[test]
fn test_default_gets_vs() {
    let vs = VerifierSettings::default();
    assert_eq!(10, vs.get_max_chain_depth());
    assert_eq!(Duration::from_secs(10), vs.get_fetch_timeout());
    assert_eq!(Duration::from_secs(60), vs.get_crl_timeout());
    assert_eq!(10 * 1024 * 1024, vs.get_max_response_size());
    assert!(vs.get_check_revocation_status());
    assert!(vs.get_parallel_crl_fetch());
    assert_eq!(None, vs.get_registry_file());
    assert_eq!(None, vs.get_time_of_interest());
    assert!(vs.time_of_interest().unwrap() > 1_700_000_000);
    assert_eq!(Ok(()), vs.validate());
}

#[test]
fn test_sets_vs() {
    let mut vs = VerifierSettings::new();
    vs.set_time_of_interest(0);
    vs.set_max_chain_depth(3);
    vs.set_fetch_timeout(Duration::from_millis(250));
    vs.set_check_revocation_status(false);
    vs.set_registry_file("registry.json".to_string());
    assert_eq!(Some(0), vs.get_time_of_interest());
    assert_eq!(Ok(0), vs.time_of_interest());
    assert_eq!(3, vs.get_max_chain_depth());
    assert_eq!(Duration::from_millis(250), vs.get_fetch_timeout());
    assert!(!vs.get_check_revocation_status());
    assert_eq!(Some("registry.json".to_string()), vs.get_registry_file());

    // wrong variant under a known key falls back to the default
    vs.0.insert(
        VS_MAX_CHAIN_DEPTH.to_string(),
        VerifierSettingTypes::Bool(true),
    );
    assert_eq!(VS_MAX_CHAIN_DEPTH_DEFAULT, vs.get_max_chain_depth());
}

#[test]
fn test_read_settings() {
    assert_eq!(VerifierSettings::new(), read_settings(&None).unwrap());

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert_eq!(
        VerifierSettings::new(),
        read_settings(&Some(missing.to_str().unwrap().to_string())).unwrap()
    );

    let mut vs = VerifierSettings::new();
    vs.set_max_chain_depth(4);
    vs.set_crl_timeout(Duration::from_secs(5));
    let good = dir.path().join("settings.json");
    std::fs::write(&good, serde_json::to_string(&vs).unwrap()).unwrap();
    let read = read_settings(&Some(good.to_str().unwrap().to_string())).unwrap();
    assert_eq!(4, read.get_max_chain_depth());
    assert_eq!(Duration::from_secs(5), read.get_crl_timeout());

    let mut vs = VerifierSettings::new();
    vs.set_max_chain_depth(0);
    assert!(matches!(vs.validate(), Err(Error::Misconfiguration(_))));
    let zero_depth = dir.path().join("zero_depth.json");
    std::fs::write(&zero_depth, serde_json::to_string(&vs).unwrap()).unwrap();
    assert!(matches!(
        read_settings(&Some(zero_depth.to_str().unwrap().to_string())),
        Err(Error::Misconfiguration(_))
    ));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, b"{ not json").unwrap();
    assert_eq!(
        Err(Error::ParseError),
        read_settings(&Some(bad.to_str().unwrap().to_string()))
    );
}
