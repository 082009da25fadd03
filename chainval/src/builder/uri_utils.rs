//! Contains utility functions related to downloading artifacts from URIs
//!

#![cfg(feature = "remote")]

use core::time::Duration;

use async_trait::async_trait;
use log::{debug, error};

use crate::environment::trust_environment_traits::ResourceFetcher;
use crate::util::cert_utilities::is_http_uri;
use crate::util::error::*;

/// `HttpFetcher` retrieves issuer certificates and CRLs from http and https URIs using reqwest.
/// Non-success status codes, connection failures and bodies larger than the permitted size are
/// reported as [`Error::NetworkError`]. Requests that exceed the timeout are reported as
/// [`Error::Timeout`].
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {}

impl HttpFetcher {
    /// Creates a new HttpFetcher
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    fn handles(&self, uri: &str) -> bool {
        is_http_uri(uri)
    }

    async fn fetch(&self, uri: &str, timeout: Duration, max_size: u64) -> Result<Vec<u8>> {
        if !uri.starts_with("http") {
            debug!("Ignored non-HTTP URI presented for retrieval");
            return Err(Error::InvalidUriScheme(uri.to_string()));
        }

        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to prepare HTTP client to retrieve {}: {}", uri, e);
                return Err(Error::NetworkError(format!("{}: {}", uri, e)));
            }
        };

        let mut response = match client.get(uri).send().await {
            Ok(r) => r,
            Err(e) => return Err(map_reqwest_error(uri, e)),
        };

        let status = response.status();
        if !status.is_success() {
            error!("Received {} when retrieving {}", status, uri);
            return Err(Error::NetworkError(format!("{}: status {}", uri, status)));
        }

        if let Some(len) = response.content_length() {
            if len > max_size {
                error!("{} advertises {} bytes, limit is {}", uri, len, max_size);
                return Err(Error::NetworkError(format!(
                    "{}: response exceeds {} bytes",
                    uri, max_size
                )));
            }
        }

        // content length is optional, so the limit is also enforced while reading
        let mut body: Vec<u8> = vec![];
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if (body.len() + chunk.len()) as u64 > max_size {
                        error!("Response from {} exceeds {} bytes", uri, max_size);
                        return Err(Error::NetworkError(format!(
                            "{}: response exceeds {} bytes",
                            uri, max_size
                        )));
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => return Err(map_reqwest_error(uri, e)),
            }
        }
        debug!("Downloaded {} bytes from {}", body.len(), uri);
        Ok(body)
    }
}

fn map_reqwest_error(uri: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        error!("Timed out retrieving {}", uri);
        Error::Timeout(uri.to_string())
    } else {
        error!("Failed to retrieve {} with {}", uri, e);
        Error::NetworkError(format!("{}: {}", uri, e))
    }
}

#[tokio::test]
async fn http_fetcher_scheme_test() {
    let hf = HttpFetcher::new();
    assert!(hf.handles("http://ca.test/ca.crt"));
    assert!(hf.handles("https://ca.test/ca.crt"));
    assert!(!hf.handles("ldap://ca.test/cn=ca"));
    assert_eq!(
        Err(Error::InvalidUriScheme("ldap://ldap.scheme/".to_string())),
        hf.fetch("ldap://ldap.scheme/", Duration::from_secs(1), 1024)
            .await
    );
}
