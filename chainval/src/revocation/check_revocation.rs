//! High level revocation checking functionality
//!
//! The revocation status of a certificate is determined by consulting every CRL named by the CRL
//! distribution points extensions of the certificates in its chain. A certificate is revoked if any
//! of those CRLs lists its serial number. A certificate is not revoked only if every CRL was
//! obtained and none lists it.

use futures_util::stream::{FuturesUnordered, StreamExt};
use log::{debug, info};

use crate::environment::trust_environment::TrustEnvironment;
use crate::revocation::crl::{fetch_crl, get_crl_dps, RevokedSerials};
use crate::util::error::*;
use crate::validator::cert_chain::CertificateChain;
use crate::validator::parsed_certificate::ParsedCertificate;

/// `is_revoked` returns true if a CRL named by any certificate in `chain` lists the serial number of
/// `subject`. When `VS_PARALLEL_CRL_FETCH` is true, CRLs are retrieved concurrently and the first
/// CRL that lists the serial number settles the matter. Otherwise, CRLs are retrieved one at a time
/// in the order returned by [`get_crl_dps`].
///
/// [`Error::RevocationCheck`] is returned if no CRL lists the serial number and at least one CRL
/// could not be retrieved or parsed. A chain that names no CRLs yields `Ok(false)`.
pub async fn is_revoked(
    env: &TrustEnvironment,
    chain: &CertificateChain,
    subject: &ParsedCertificate,
) -> Result<bool> {
    let crl_dps = get_crl_dps(chain);
    if crl_dps.is_empty() {
        info!("No CRL DPs found in chain for {}", subject.subject);
        return Ok(false);
    }

    if env.settings().get_parallel_crl_fetch() {
        let mut pending: FuturesUnordered<_> =
            crl_dps.iter().map(|uri| fetch_crl(env, uri)).collect();
        let mut first_failure = None;
        while let Some(r) = pending.next().await {
            if let Some(revoked) = evaluate(r, subject, &mut first_failure) {
                return Ok(revoked);
            }
        }
        finish(first_failure)
    } else {
        let mut first_failure = None;
        for uri in &crl_dps {
            let r = fetch_crl(env, uri).await;
            if let Some(revoked) = evaluate(r, subject, &mut first_failure) {
                return Ok(revoked);
            }
        }
        finish(first_failure)
    }
}

/// Returns Some(true) when the CRL lists the subject, otherwise records the first failure and
/// returns None so that remaining CRLs are considered.
fn evaluate(
    r: Result<RevokedSerials>,
    subject: &ParsedCertificate,
    first_failure: &mut Option<Error>,
) -> Option<bool> {
    match r {
        Ok(crl) => {
            if crl.contains(&subject.serial_number) {
                info!(
                    "Determined revocation status (revoked) using CRL issued by {} from {} for {}",
                    crl.issuer, crl.locator, subject.subject
                );
                Some(true)
            } else {
                debug!(
                    "CRL issued by {} from {} does not list serial number {}",
                    crl.issuer, crl.locator, subject.serial_number
                );
                None
            }
        }
        Err(e) => {
            if first_failure.is_none() {
                *first_failure = Some(e);
            }
            None
        }
    }
}

fn finish(first_failure: Option<Error>) -> Result<bool> {
    match first_failure {
        Some(e) => Err(e),
        None => Ok(false),
    }
}
