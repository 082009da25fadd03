//! Revocation status determination using CRLs
//!
//! The revocation module determines whether a certificate has been revoked by retrieving the CRLs
//! named by the CRL distribution points extensions in its chain and looking for its serial number.
//! Revocation checking is performed by
//! [`verify_certificate`](../validator/chain_verifier/fn.verify_certificate.html) after the chain
//! has been resolved and is influenced by the following values in the
//! [`VerifierSettings`](../validator/verifier_settings/struct.VerifierSettings.html) object:
//!
//! - [`VS_CHECK_REVOCATION_STATUS`](../validator/verifier_settings/static.VS_CHECK_REVOCATION_STATUS.html)
//! - [`VS_PARALLEL_CRL_FETCH`](../validator/verifier_settings/static.VS_PARALLEL_CRL_FETCH.html)
//! - [`VS_CRL_TIMEOUT`](../validator/verifier_settings/static.VS_CRL_TIMEOUT.html)
//! - [`VS_MAX_RESPONSE_SIZE`](../validator/verifier_settings/static.VS_MAX_RESPONSE_SIZE.html)
//!
pub mod check_revocation;
pub mod crl;

pub use crate::revocation::{check_revocation::*, crl::*};
