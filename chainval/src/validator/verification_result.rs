//! Outcome of a verification operation

use core::fmt;

use crate::util::error::Error;

/// `VerificationResult` conveys the outcome of [`verify_certificate`](../chain_verifier/fn.verify_certificate.html).
/// Exactly one outcome applies. Conditions are evaluated in the order the variants are declared,
/// i.e., an expired certificate is reported as `Expired` even if it has also been revoked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VerificationResult {
    /// The time of interest precedes the certificate's not_before value
    NotYetValid,
    /// The time of interest follows the certificate's not_after value
    Expired,
    /// A CRL named by the chain lists the certificate's serial number
    Revoked,
    /// At least one key identifier from the chain is in the trust registry
    Trusted,
    /// No key identifier from the chain is in the trust registry
    Untrusted,
    /// The chain or its revocation status could not be determined
    Error(Error),
}

impl VerificationResult {
    /// Returns true only for [`VerificationResult::Trusted`]
    pub fn is_trusted(&self) -> bool {
        matches!(self, VerificationResult::Trusted)
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationResult::NotYetValid => write!(f, "Certificate not yet valid"),
            VerificationResult::Expired => write!(f, "Certificate expired"),
            VerificationResult::Revoked => write!(f, "Certificate revoked"),
            VerificationResult::Trusted => write!(f, "Certificate trusted"),
            VerificationResult::Untrusted => write!(f, "Certificate not trusted"),
            VerificationResult::Error(e) => write!(f, "Verification failed: {}", e),
        }
    }
}

#[test]
fn verification_result_display_test() {
    assert_eq!("Certificate trusted", VerificationResult::Trusted.to_string());
    assert_eq!("Certificate not trusted", VerificationResult::Untrusted.to_string());
    assert_eq!("Certificate revoked", VerificationResult::Revoked.to_string());
    assert_eq!("Certificate expired", VerificationResult::Expired.to_string());
    assert_eq!("Certificate not yet valid", VerificationResult::NotYetValid.to_string());
    assert_eq!(
        "Verification failed: ChainTooLong: more than 3 certificates",
        VerificationResult::Error(Error::ChainTooLong(3)).to_string()
    );
    assert!(VerificationResult::Trusted.is_trusted());
    assert!(!VerificationResult::Error(Error::ParseError).is_trusted());
}
