//! Structures and functions to retrieve and parse CRLs named by the CRL distribution points of a
//! certificate chain. Only serial number matching is performed, i.e., CRL signatures, scope and
//! freshness are not evaluated.

use std::collections::BTreeSet;

use der::Decode;
use log::{debug, error, info};
use x509_cert::crl::CertificateList;

use crate::environment::trust_environment::TrustEnvironment;
use crate::util::cert_utilities::decode_pem_or_der;
use crate::util::error::*;
use crate::validator::cert_chain::CertificateChain;
use crate::validator::parsed_certificate::CertificateSerial;

/// `RevokedSerials` holds the serial numbers listed in a CRL along with the CRL's issuer name and
/// the location it was read from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[readonly::make]
pub struct RevokedSerials {
    /// Where the CRL came from
    #[readonly]
    pub locator: String,
    /// CRL issuer rendered as a string
    #[readonly]
    pub issuer: String,
    /// Serial numbers of revoked certificates in canonical form
    #[readonly]
    pub serials: BTreeSet<CertificateSerial>,
}

impl RevokedSerials {
    /// Returns true if the CRL lists the given serial number
    pub fn contains(&self, serial: &CertificateSerial) -> bool {
        self.serials.contains(serial)
    }

    /// Number of revoked serial numbers
    pub fn len(&self) -> usize {
        self.serials.len()
    }

    /// Returns true if the CRL lists no certificates
    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }
}

/// `parse_crl` takes a buffer containing a DER or PEM encoded CRL and returns the serial numbers it
/// lists. A CRL without a revokedCertificates field yields an empty set. Malformed buffers yield
/// [`Error::ParseError`].
pub fn parse_crl(buffer: &[u8], locator: &str) -> Result<RevokedSerials> {
    let der = decode_pem_or_der(buffer)?;
    let crl: CertificateList = match CertificateList::from_der(&der) {
        Ok(crl) => crl,
        Err(e) => {
            error!("Failed to parse CRL from {}: {}", locator, e);
            return Err(Error::ParseError);
        }
    };

    let mut serials = BTreeSet::new();
    if let Some(revoked) = &crl.tbs_cert_list.revoked_certificates {
        for rc in revoked {
            serials.insert(CertificateSerial::from(&rc.serial_number));
        }
    }
    debug!(
        "CRL from {} lists {} revoked certificates",
        locator,
        serials.len()
    );
    Ok(RevokedSerials {
        locator: locator.to_string(),
        issuer: crl.tbs_cert_list.issuer.to_string(),
        serials,
    })
}

/// `get_crl_dps` returns the CRL distribution point URIs of every certificate in the chain, without
/// duplicates, in the order they are first encountered (leaf first).
pub fn get_crl_dps(chain: &CertificateChain) -> Vec<String> {
    let mut retval: Vec<String> = vec![];
    for cert in chain {
        for uri in &cert.crl_distribution_urls {
            if !retval.contains(uri) {
                retval.push(uri.clone());
            }
        }
    }
    retval
}

/// `fetch_crl` retrieves and parses the CRL at `uri`, bounded by `VS_CRL_TIMEOUT`. Any failure is
/// reported as [`Error::RevocationCheck`].
pub(crate) async fn fetch_crl(env: &TrustEnvironment, uri: &str) -> Result<RevokedSerials> {
    let timeout = env.settings().get_crl_timeout();
    debug!("Fetching CRL from {}", uri);
    let bytes = match env.fetch(uri, timeout).await {
        Ok(b) => b,
        Err(e) => {
            info!("Failed to retrieve CRL from {}: {}", uri, e);
            return Err(Error::RevocationCheck(format!("{}: {}", uri, e)));
        }
    };
    match parse_crl(&bytes, uri) {
        Ok(rs) => Ok(rs),
        Err(e) => Err(Error::RevocationCheck(format!("{}: {}", uri, e))),
    }
}

#[test]
fn parse_crl_garbage_test() {
    assert_eq!(Err(Error::ParseError), parse_crl(b"garbage", "garbage"));
    let pem = "-----BEGIN X509 CRL-----\nMAMCAQU=\n-----END X509 CRL-----\n";
    assert_eq!(Err(Error::ParseError), parse_crl(pem.as_bytes(), "short"));
}
