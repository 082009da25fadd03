//! Normalized, immutable view of a parsed X.509 certificate along with the parser that produces it

use core::fmt;

use const_oid::db::rfc5912::{
    ID_AD_CA_ISSUERS, ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_CRL_DISTRIBUTION_POINTS,
    ID_CE_SUBJECT_KEY_IDENTIFIER, ID_PE_AUTHORITY_INFO_ACCESS,
};
use der::asn1::ObjectIdentifier;
use der::Decode;
use log::{debug, error};
use sha2::{Digest, Sha256};
use x509_cert::ext::pkix::crl::dp::DistributionPoint;
use x509_cert::ext::pkix::name::{DistributionPointName, GeneralName};
use x509_cert::ext::pkix::{
    AuthorityInfoAccessSyntax, AuthorityKeyIdentifier, CrlDistributionPoints,
    SubjectKeyIdentifier,
};
use x509_cert::serial_number::SerialNumber;
use x509_cert::Certificate;

use crate::util::cert_utilities::*;
use crate::util::error::*;

/// `CertificateSerial` holds the content octets of a serial number in canonical form, i.e., with
/// leading zero octets removed, so that serials encoded with and without padding compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CertificateSerial(Vec<u8>);

impl CertificateSerial {
    /// Creates a [`CertificateSerial`] from the content octets of a DER INTEGER
    pub fn new(bytes: &[u8]) -> Self {
        Self(canonical_serial_bytes(bytes))
    }

    /// Returns the canonical serial number octets
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&SerialNumber> for CertificateSerial {
    fn from(serial: &SerialNumber) -> Self {
        Self::new(serial.as_bytes())
    }
}

impl fmt::Display for CertificateSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", buffer_to_hex(&self.0))
    }
}

/// `ValidityStatus` indicates where a time of interest falls relative to a [`ValidityWindow`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ValidityStatus {
    /// Time of interest is within the window (or validity checks are disabled)
    Valid,
    /// Time of interest is before not_before
    NotYetValid,
    /// Time of interest is after not_after
    Expired,
}

/// `ValidityWindow` holds the not_before and not_after values of a certificate as seconds since
/// Unix epoch. The parser guarantees `not_before <= not_after`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ValidityWindow {
    /// Start of the validity period
    pub not_before: u64,
    /// End of the validity period
    pub not_after: u64,
}

impl ValidityWindow {
    /// `check` evaluates the window relative to `toi` (seconds since Unix epoch). The not_before
    /// field is evaluated first. Both ends of the window are inclusive. A `toi` of 0 disables the
    /// check.
    pub fn check(&self, toi: u64) -> ValidityStatus {
        if 0 == toi {
            return ValidityStatus::Valid;
        }
        if self.not_before > toi {
            ValidityStatus::NotYetValid
        } else if self.not_after < toi {
            ValidityStatus::Expired
        } else {
            ValidityStatus::Valid
        }
    }
}

/// `ParsedCertificate` is the normalized view of a certificate consumed by chain resolution,
/// revocation checking and trust matching. Instances are produced by [`parse_cert`] and are
/// read-only thereafter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[readonly::make]
pub struct ParsedCertificate {
    /// Binary DER-encoded certificate
    #[readonly]
    pub encoded_cert: Vec<u8>,
    /// Decoded certificate
    #[readonly]
    pub decoded_cert: Certificate,
    /// Where the certificate came from, i.e., a file name or the URI it was fetched from
    #[readonly]
    pub locator: String,
    /// Subject name rendered as a string, used in log output
    #[readonly]
    pub subject: String,
    /// Serial number in canonical form
    #[readonly]
    pub serial_number: CertificateSerial,
    /// Validity period
    #[readonly]
    pub validity: ValidityWindow,
    /// Key identifier from the subject key identifier extension, if present and non-empty
    #[readonly]
    pub subject_key_identifier: Option<Vec<u8>>,
    /// keyIdentifier field of the authority key identifier extension, if present and non-empty
    #[readonly]
    pub authority_key_identifier: Option<Vec<u8>>,
    /// First http or https caIssuers URI from the authority information access extension
    #[readonly]
    pub issuer_info_url: Option<String>,
    /// Unique http and https fullName URIs from the CRL distribution points extension, in
    /// the order they appear
    #[readonly]
    pub crl_distribution_urls: Vec<String>,
    /// SHA-256 hash of `encoded_cert`
    #[readonly]
    pub fingerprint: Vec<u8>,
}

/// `parse_cert` takes a buffer containing a DER or PEM encoded certificate and returns a
/// [`ParsedCertificate`] if parsing was successful. The `locator` is retained for use in log
/// output. Malformed buffers and certificates whose not_before follows not_after yield
/// [`Error::ParseError`]. Malformed extensions of interest are treated as absent.
pub fn parse_cert(buffer: &[u8], locator: &str) -> Result<ParsedCertificate> {
    let der = decode_pem_or_der(buffer)?;
    let cert = match Certificate::from_der(&der) {
        Ok(cert) => cert,
        Err(e) => {
            error!("Failed to parse certificate from {}: {}", locator, e);
            return Err(Error::ParseError);
        }
    };

    let tbs = &cert.tbs_certificate;
    let validity = ValidityWindow {
        not_before: tbs.validity.not_before.to_unix_duration().as_secs(),
        not_after: tbs.validity.not_after.to_unix_duration().as_secs(),
    };
    if validity.not_before > validity.not_after {
        error!(
            "Certificate from {} has a not_before value that follows its not_after value",
            locator
        );
        return Err(Error::ParseError);
    }

    let subject_key_identifier = match decode_extension::<SubjectKeyIdentifier>(
        &cert,
        &ID_CE_SUBJECT_KEY_IDENTIFIER,
        locator,
    ) {
        Some(skid) if !skid.0.as_bytes().is_empty() => Some(skid.0.as_bytes().to_vec()),
        _ => None,
    };

    let authority_key_identifier = match decode_extension::<AuthorityKeyIdentifier>(
        &cert,
        &ID_CE_AUTHORITY_KEY_IDENTIFIER,
        locator,
    ) {
        Some(AuthorityKeyIdentifier {
            key_identifier: Some(kid),
            ..
        }) if !kid.as_bytes().is_empty() => Some(kid.as_bytes().to_vec()),
        _ => None,
    };

    let issuer_info_url =
        decode_extension::<AuthorityInfoAccessSyntax>(&cert, &ID_PE_AUTHORITY_INFO_ACCESS, locator)
            .and_then(|aia| ca_issuers_uri(&aia));

    let crl_distribution_urls = match decode_extension::<CrlDistributionPoints>(
        &cert,
        &ID_CE_CRL_DISTRIBUTION_POINTS,
        locator,
    ) {
        Some(crl_dps) => crl_dp_uris(&crl_dps.0),
        None => vec![],
    };

    Ok(ParsedCertificate {
        fingerprint: Sha256::digest(&der).to_vec(),
        subject: tbs.subject.to_string(),
        serial_number: CertificateSerial::from(&tbs.serial_number),
        locator: locator.to_string(),
        validity,
        subject_key_identifier,
        authority_key_identifier,
        issuer_info_url,
        crl_distribution_urls,
        encoded_cert: der,
        decoded_cert: cert,
    })
}

/// Decodes the extension identified by `oid`, if present. Decoding failures are logged and
/// reported as absence.
fn decode_extension<'a, T: Decode<'a>>(
    cert: &'a Certificate,
    oid: &ObjectIdentifier,
    locator: &str,
) -> Option<T> {
    let exts = cert.tbs_certificate.extensions.as_ref()?;
    let ext = exts.iter().find(|ext| ext.extn_id == *oid)?;
    match T::from_der(ext.extn_value.as_bytes()) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(
                "Ignoring malformed {} extension in certificate from {}: {}",
                oid, locator, e
            );
            None
        }
    }
}

/// Returns the first http or https caIssuers URI from an AIA extension
fn ca_issuers_uri(aia: &AuthorityInfoAccessSyntax) -> Option<String> {
    for ad in &aia.0 {
        if ID_AD_CA_ISSUERS == ad.access_method {
            if let GeneralName::UniformResourceIdentifier(uri) = &ad.access_location {
                let s = uri.to_string();
                if is_http_uri(&s) {
                    return Some(s);
                }
                debug!("Ignoring non-HTTP caIssuers URI: {}", s);
            }
        }
    }
    None
}

/// Returns the unique http and https fullName URIs from a list of distribution points
fn crl_dp_uris(dps: &[DistributionPoint]) -> Vec<String> {
    let mut retval: Vec<String> = vec![];
    for crl_dp in dps {
        if let Some(DistributionPointName::FullName(gns)) = &crl_dp.distribution_point {
            for gn in gns {
                if let GeneralName::UniformResourceIdentifier(uri) = gn {
                    let s = uri.to_string();
                    if !is_http_uri(&s) {
                        debug!("Ignoring non-HTTP CRL distribution point: {}", s);
                    } else if !retval.contains(&s) {
                        retval.push(s);
                    }
                }
            }
        }
    }
    retval
}
