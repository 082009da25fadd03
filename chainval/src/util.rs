//! Basic utility functionality supporting certificate parsing and verification

pub mod cert_utilities;
pub mod error;
pub mod time_of_interest;

pub use crate::{util::cert_utilities::*, util::error::*, util::time_of_interest::*};
