//! Builds a certificate chain by following caIssuers URIs from authority information access
//! extensions, beginning with the certificate being verified.

use std::collections::BTreeSet;

use log::{debug, error, warn};

use crate::environment::trust_environment::TrustEnvironment;
use crate::util::error::*;
use crate::validator::cert_chain::CertificateChain;
use crate::validator::parsed_certificate::{parse_cert, ParsedCertificate};

/// `resolve_chain` returns a chain that begins with `leaf` and includes each certificate retrieved
/// from the previous certificate's caIssuers URI.
///
/// The chain is complete when the last certificate has no usable caIssuers URI (no extension, a
/// malformed extension or a non-HTTP URI) or when the next link would revisit a URI or a
/// certificate already in the chain. Cycles are logged.
///
/// Errors:
/// - [`Error::ChainTooLong`] when following the next link would exceed `VS_MAX_CHAIN_DEPTH`
/// - [`Error::NetworkError`], [`Error::Timeout`] or [`Error::InvalidUriScheme`] when an issuer
///   cannot be retrieved
/// - [`Error::ParseError`] when a retrieved issuer is not a certificate
///
/// A failed retrieval is never treated as the end of the chain, since the resulting chain would
/// not reflect the certificate's actual issuer.
pub async fn resolve_chain(
    env: &TrustEnvironment,
    leaf: &ParsedCertificate,
) -> Result<CertificateChain> {
    let max_depth = env.settings().get_max_chain_depth() as usize;
    let timeout = env.settings().get_fetch_timeout();

    let mut chain = CertificateChain::new(leaf.clone());
    let mut visited: BTreeSet<String> = BTreeSet::new();

    while let Some(uri) = chain.root().issuer_info_url.clone() {
        if !visited.insert(uri.clone()) {
            warn!(
                "Stopping chain resolution for {} at repeated issuer URI {}",
                leaf.subject, uri
            );
            break;
        }
        if chain.len() >= max_depth {
            error!(
                "Chain for {} exceeds the maximum depth of {}",
                leaf.subject, max_depth
            );
            return Err(Error::ChainTooLong(max_depth));
        }

        let bytes = env.fetch(&uri, timeout).await?;
        let issuer = parse_cert(&bytes, &uri)?;
        if chain.contains_fingerprint(&issuer.fingerprint) {
            warn!(
                "Stopping chain resolution for {} at repeated certificate {} from {}",
                leaf.subject, issuer.subject, uri
            );
            break;
        }
        debug!("Resolved issuer {} from {}", issuer.subject, uri);
        chain.push(issuer);
    }

    debug!(
        "Resolved chain of {} certificates for {}",
        chain.len(),
        leaf.subject
    );
    Ok(chain)
}
