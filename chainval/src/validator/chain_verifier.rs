//! Combines chain resolution, revocation checking and trust registry matching into a single
//! verification decision

use log::{error, info};

use crate::builder::chain_builder::resolve_chain;
use crate::environment::trust_environment::TrustEnvironment;
use crate::revocation::check_revocation::is_revoked;
use crate::util::error::*;
use crate::util::time_of_interest::TimeOfInterest;
use crate::validator::cert_chain::CertificateChain;
use crate::validator::parsed_certificate::{ParsedCertificate, ValidityStatus};
use crate::validator::verification_result::VerificationResult;

/// `verify_certificate` determines whether `leaf` should be trusted. Checks are performed in the
/// following order, stopping at the first one that produces an outcome:
///
/// 1. validity window relative to `VS_TIME_OF_INTEREST` ([`VerificationResult::NotYetValid`] or
///    [`VerificationResult::Expired`])
/// 2. chain resolution via caIssuers URIs (failures yield [`VerificationResult::Error`])
/// 3. CRL checks for the leaf's serial number, unless `VS_CHECK_REVOCATION_STATUS` is false
///    ([`VerificationResult::Revoked`], failures yield [`VerificationResult::Error`])
/// 4. trust registry intersection ([`VerificationResult::Trusted`] or [`VerificationResult::Untrusted`])
///
/// The trust registry is not modified.
pub async fn verify_certificate(
    env: &TrustEnvironment,
    leaf: &ParsedCertificate,
) -> VerificationResult {
    let settings = env.settings();
    let toi = match settings.time_of_interest() {
        Ok(toi) => toi,
        Err(e) => {
            error!("Failed to determine time of interest: {}", e);
            return VerificationResult::Error(e);
        }
    };
    match leaf.validity.check(toi) {
        ValidityStatus::NotYetValid => {
            info!(
                "{} is not yet valid relative to the time of interest ({})",
                leaf.subject,
                display_time(toi)
            );
            return VerificationResult::NotYetValid;
        }
        ValidityStatus::Expired => {
            info!(
                "{} is expired relative to the time of interest ({})",
                leaf.subject,
                display_time(toi)
            );
            return VerificationResult::Expired;
        }
        ValidityStatus::Valid => {}
    }

    let chain = match resolve_chain(env, leaf).await {
        Ok(chain) => chain,
        Err(e) => {
            error!("Failed to resolve chain for {}: {}", leaf.subject, e);
            return VerificationResult::Error(e);
        }
    };

    if settings.get_check_revocation_status() {
        match is_revoked(env, &chain, leaf).await {
            Ok(true) => {
                info!("{} has been revoked", leaf.subject);
                return VerificationResult::Revoked;
            }
            Ok(false) => {}
            Err(e) => {
                error!(
                    "Failed to determine revocation status for {}: {}",
                    leaf.subject, e
                );
                return VerificationResult::Error(e);
            }
        }
    }

    if env.registry().is_trusted(&chain).await {
        info!("{} is trusted", leaf.subject);
        VerificationResult::Trusted
    } else {
        info!("{} is not trusted", leaf.subject);
        VerificationResult::Untrusted
    }
}

fn display_time(toi: u64) -> String {
    match TimeOfInterest::from_unix_secs(toi) {
        Ok(t) => t.to_string(),
        Err(_e) => toi.to_string(),
    }
}

/// `register_certificate` resolves the chain for `leaf` and adds every identifier derived from it to
/// the trust registry. Validity and revocation status are not evaluated. The resolved chain is
/// returned so callers can report what was registered, i.e., via [`CertificateChain::root`].
pub async fn register_certificate(
    env: &TrustEnvironment,
    leaf: &ParsedCertificate,
) -> Result<CertificateChain> {
    let chain = resolve_chain(env, leaf).await?;
    env.registry().register(&chain).await;
    Ok(chain)
}
