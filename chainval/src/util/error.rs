//! Error types

use thiserror::Error as ThisError;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Error type
///
/// Domain outcomes of a verification (expired, revoked, untrusted, etc.) are not errors. See
/// [`VerificationResult`](../../validator/verification_result/enum.VerificationResult.html).
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[non_exhaustive]
pub enum Error {
    /// An artifact could not be parsed, i.e., certificate or CRL bytes are malformed
    #[error("ParseError")]
    ParseError,
    /// A networking issue occurred while retrieving the resource at the given URI.
    #[error("NetworkError: {0}")]
    NetworkError(String),
    /// Retrieval of the resource at the given URI did not complete within the configured timeout.
    #[error("Timeout: {0}")]
    Timeout(String),
    /// A CRL required to determine revocation status could not be obtained or parsed.
    #[error("RevocationCheckError: {0}")]
    RevocationCheck(String),
    /// The issuer chain grew beyond the configured maximum depth.
    #[error("ChainTooLong: more than {0} certificates")]
    ChainTooLong(usize),
    /// A URI scheme was encountered that no available fetcher supports, i.e., ldap URI
    #[error("InvalidUriScheme: {0}")]
    InvalidUriScheme(String),
    /// A configuration error was detected. See textual log output for more details.
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),
    /// Error encapsulates an error derived from [std::io::ErrorKind]
    #[error("StdError: {0:?}")]
    StdIoError(std::io::ErrorKind),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::StdIoError(err.kind())
    }
}

impl Error {
    /// Returns true for errors that arise from retrieving remote resources, as opposed to errors
    /// that arise from the content of those resources.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::NetworkError(_) | Error::Timeout(_) | Error::InvalidUriScheme(_)
        )
    }
}

#[test]
fn error_test() {
    let _s = format!("{}", Error::ParseError);
    let _s = format!("{}", Error::NetworkError("http://ca.test/ca.crt".to_string()));
    let _s = format!("{}", Error::Timeout("http://ca.test/ca.crt".to_string()));
    let _s = format!("{}", Error::RevocationCheck("http://ca.test/ca.crl".to_string()));
    let _s = format!("{}", Error::InvalidUriScheme("ldap://ca.test".to_string()));
    let _s = format!("{}", Error::Misconfiguration("bad".to_string()));
    let _s = format!("{}", Error::StdIoError(std::io::ErrorKind::NotFound));
    assert_eq!("ChainTooLong: more than 10 certificates", format!("{}", Error::ChainTooLong(10)));

    assert!(Error::Timeout(String::new()).is_transport());
    assert!(Error::NetworkError(String::new()).is_transport());
    assert!(!Error::ParseError.is_transport());
    assert!(!Error::RevocationCheck(String::new()).is_transport());
}
