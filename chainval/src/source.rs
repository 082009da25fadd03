//! Sources of trust decisions and of issuer certificates and CRLs

pub mod static_fetcher;
pub mod trust_registry;

pub use crate::{source::static_fetcher::*, source::trust_registry::*};
