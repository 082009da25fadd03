//! Trait object switchboard and state used when verifying certificates and registering chains

pub mod trust_environment;
pub mod trust_environment_traits;

pub use crate::{environment::trust_environment::*, environment::trust_environment_traits::*};
