//! Builders for DER-encoded certificates and CRLs used by the integration tests. Signatures are
//! placeholders since signatures are not evaluated.

#![allow(dead_code)]

use std::str::FromStr;
use std::time::Duration;

use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ID_AD_CA_ISSUERS, ID_CE_AUTHORITY_KEY_IDENTIFIER,
    ID_CE_CRL_DISTRIBUTION_POINTS, ID_CE_SUBJECT_KEY_IDENTIFIER, ID_EC_PUBLIC_KEY,
    ID_PE_AUTHORITY_INFO_ACCESS,
};
use der::asn1::{BitString, Ia5String, ObjectIdentifier, OctetString, UtcTime};
use der::Encode;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::crl::{CertificateList, RevokedCert, TbsCertList};
use x509_cert::ext::pkix::crl::dp::DistributionPoint;
use x509_cert::ext::pkix::name::{DistributionPointName, GeneralName};
use x509_cert::ext::pkix::{
    AccessDescription, AuthorityInfoAccessSyntax, AuthorityKeyIdentifier, CrlDistributionPoints,
    SubjectKeyIdentifier,
};
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::{Certificate, TbsCertificate, Version};

use chainval::get_now_as_unix_epoch;

pub const DAY: u64 = 86_400;

/// Describes a certificate to generate
#[derive(Clone, Debug)]
pub struct CertTemplate {
    pub serial: Vec<u8>,
    pub subject: String,
    pub issuer: String,
    pub not_before: u64,
    pub not_after: u64,
    pub skid: Option<Vec<u8>>,
    pub akid: Option<Vec<u8>>,
    pub ca_issuers: Vec<String>,
    pub crl_dps: Vec<String>,
    pub raw_extensions: Vec<(ObjectIdentifier, Vec<u8>)>,
}

impl CertTemplate {
    /// A certificate valid from a month ago to a year from now with no extensions
    pub fn new(subject: &str, serial: &[u8]) -> Self {
        let now = get_now_as_unix_epoch().unwrap();
        CertTemplate {
            serial: serial.to_vec(),
            subject: format!("CN={}", subject),
            issuer: format!("CN={}", subject),
            not_before: now - 30 * DAY,
            not_after: now + 365 * DAY,
            skid: None,
            akid: None,
            ca_issuers: vec![],
            crl_dps: vec![],
            raw_extensions: vec![],
        }
    }

    pub fn issuer(mut self, issuer: &str) -> Self {
        self.issuer = format!("CN={}", issuer);
        self
    }

    pub fn validity(mut self, not_before: u64, not_after: u64) -> Self {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }

    pub fn skid(mut self, skid: &[u8]) -> Self {
        self.skid = Some(skid.to_vec());
        self
    }

    pub fn akid(mut self, akid: &[u8]) -> Self {
        self.akid = Some(akid.to_vec());
        self
    }

    pub fn ca_issuer(mut self, uri: &str) -> Self {
        self.ca_issuers.push(uri.to_string());
        self
    }

    pub fn crl_dp(mut self, uri: &str) -> Self {
        self.crl_dps.push(uri.to_string());
        self
    }

    pub fn raw_extension(mut self, oid: ObjectIdentifier, value: &[u8]) -> Self {
        self.raw_extensions.push((oid, value.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        build_cert(self)
    }
}

fn utc(secs: u64) -> Time {
    Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(secs)).unwrap())
}

fn alg() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: ECDSA_WITH_SHA_256,
        parameters: None,
    }
}

fn uri_name(uri: &str) -> GeneralName {
    GeneralName::UniformResourceIdentifier(Ia5String::new(uri).unwrap())
}

fn extension(oid: ObjectIdentifier, value: Vec<u8>) -> Extension {
    Extension {
        extn_id: oid,
        critical: false,
        extn_value: OctetString::new(value).unwrap(),
    }
}

pub fn build_cert(template: &CertTemplate) -> Vec<u8> {
    let mut extensions = vec![];
    if let Some(skid) = &template.skid {
        let v = SubjectKeyIdentifier(OctetString::new(skid.clone()).unwrap());
        extensions.push(extension(ID_CE_SUBJECT_KEY_IDENTIFIER, v.to_der().unwrap()));
    }
    if let Some(akid) = &template.akid {
        let v = AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::new(akid.clone()).unwrap()),
            authority_cert_issuer: None,
            authority_cert_serial_number: None,
        };
        extensions.push(extension(ID_CE_AUTHORITY_KEY_IDENTIFIER, v.to_der().unwrap()));
    }
    if !template.ca_issuers.is_empty() {
        let v = AuthorityInfoAccessSyntax(
            template.ca_issuers
                .iter()
                .map(|uri| AccessDescription {
                    access_method: ID_AD_CA_ISSUERS,
                    access_location: uri_name(uri),
                })
                .collect(),
        );
        extensions.push(extension(ID_PE_AUTHORITY_INFO_ACCESS, v.to_der().unwrap()));
    }
    if !template.crl_dps.is_empty() {
        let v = CrlDistributionPoints(vec![DistributionPoint {
            distribution_point: Some(DistributionPointName::FullName(
                template.crl_dps.iter().map(|uri| uri_name(uri)).collect(),
            )),
            reasons: None,
            crl_issuer: None,
        }]);
        extensions.push(extension(ID_CE_CRL_DISTRIBUTION_POINTS, v.to_der().unwrap()));
    }
    for (oid, value) in &template.raw_extensions {
        extensions.push(extension(*oid, value.clone()));
    }

    let tbs_certificate = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&template.serial).unwrap(),
        signature: alg(),
        issuer: Name::from_str(&template.issuer).unwrap(),
        validity: Validity {
            not_before: utc(template.not_before),
            not_after: utc(template.not_after),
        },
        subject: Name::from_str(&template.subject).unwrap(),
        subject_public_key_info: SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: ID_EC_PUBLIC_KEY,
                parameters: None,
            },
            subject_public_key: BitString::from_bytes(&[4u8; 65]).unwrap(),
        },
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: if extensions.is_empty() {
            None
        } else {
            Some(extensions)
        },
    };
    let cert = Certificate {
        tbs_certificate,
        signature_algorithm: alg(),
        signature: BitString::from_bytes(&[0u8; 64]).unwrap(),
    };
    cert.to_der().unwrap()
}

/// Builds a CRL issued by `issuer` (a common name) that lists the given serial numbers
pub fn build_crl(issuer: &str, serials: &[Vec<u8>]) -> Vec<u8> {
    let now = get_now_as_unix_epoch().unwrap();
    let revoked: Vec<RevokedCert> = serials
        .iter()
        .map(|s| {
            let rc: RevokedCert = RevokedCert {
                serial_number: SerialNumber::new(s).unwrap(),
                revocation_date: utc(now - DAY),
                crl_entry_extensions: None,
            };
            rc
        })
        .collect();
    let tbs_cert_list: TbsCertList = TbsCertList {
        version: Version::V2,
        signature: alg(),
        issuer: Name::from_str(&format!("CN={}", issuer)).unwrap(),
        this_update: utc(now - DAY),
        next_update: Some(utc(now + 7 * DAY)),
        revoked_certificates: if revoked.is_empty() {
            None
        } else {
            Some(revoked)
        },
        crl_extensions: None,
    };
    let crl: CertificateList = CertificateList {
        tbs_cert_list,
        signature_algorithm: alg(),
        signature: BitString::from_bytes(&[0u8; 64]).unwrap(),
    };
    crl.to_der().unwrap()
}

/// Wraps DER bytes in PEM with the given label
pub fn to_pem(label: &str, der: &[u8]) -> String {
    pem_rfc7468::encode_string(label, pem_rfc7468::LineEnding::LF, der).unwrap()
}
