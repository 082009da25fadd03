//! Certificate parsing, verification settings and the verification decision

pub mod cert_chain;
pub mod chain_verifier;
pub mod parsed_certificate;
pub mod verification_result;
pub mod verifier_settings;

pub use crate::{
    validator::cert_chain::*, validator::chain_verifier::*, validator::parsed_certificate::*,
    validator::verification_result::*, validator::verifier_settings::*,
};
