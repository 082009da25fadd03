//! Provides a structure that represents a resolved issuer chain, beginning with the certificate
//! being verified or registered and proceeding through each certificate resolved from its
//! predecessor's caIssuers URI.

use core::slice::Iter;

use crate::validator::parsed_certificate::ParsedCertificate;

/// `CertificateChain` holds one or more certificates. `certificates[0]` is the leaf. For i > 0,
/// `certificates[i]` was retrieved from the `issuer_info_url` of `certificates[i - 1]`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[readonly::make]
pub struct CertificateChain {
    /// Certificates in the chain, leaf first
    #[readonly]
    pub certificates: Vec<ParsedCertificate>,
}

impl CertificateChain {
    /// Creates a chain that contains only the given leaf certificate
    pub fn new(leaf: ParsedCertificate) -> Self {
        CertificateChain {
            certificates: vec![leaf],
        }
    }

    /// Appends a certificate resolved from the current root's issuer link
    pub(crate) fn push(&mut self, issuer: ParsedCertificate) {
        self.certificates.push(issuer);
    }

    /// Returns the leaf certificate
    pub fn leaf(&self) -> &ParsedCertificate {
        &self.certificates[0]
    }

    /// Returns the last resolved ancestor, which is the leaf when no issuer was resolved
    pub fn root(&self) -> &ParsedCertificate {
        &self.certificates[self.certificates.len() - 1]
    }

    /// Number of certificates in the chain (always at least one)
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Always false, a chain holds at least its leaf
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Iterates over the chain leaf first
    pub fn iter(&self) -> Iter<'_, ParsedCertificate> {
        self.certificates.iter()
    }

    /// Returns true if a certificate with the given SHA-256 fingerprint is already in the chain
    pub fn contains_fingerprint(&self, fingerprint: &[u8]) -> bool {
        self.certificates
            .iter()
            .any(|c| c.fingerprint.as_slice() == fingerprint)
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a ParsedCertificate;
    type IntoIter = Iter<'a, ParsedCertificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.iter()
    }
}
