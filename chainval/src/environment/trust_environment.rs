//! TrustEnvironment aggregates the resource fetchers, settings and trust registry used when
//! verifying certificates and registering trusted chains.
//!
//! The sample below illustrates preparation of a TrustEnvironment that retrieves issuer
//! certificates and CRLs from memory.
//! ```
//! use chainval::*;
//!
//! let mut settings = VerifierSettings::default();
//! settings.set_max_chain_depth(5);
//!
//! let fetcher = StaticFetcher::new();
//! // populate the fetcher with issuer certificates and CRLs keyed by URI, i.e.,
//! // fetcher.add_resource("http://ca.example.com/ca.crt", &ca_der);
//!
//! let mut te = TrustEnvironment::new(settings);
//! te.add_fetcher(Box::new(fetcher.clone()));
//! ```
//!
//! With the `remote` feature, [`populate_trust_environment`] adds a fetcher that retrieves
//! resources over HTTP.

use core::time::Duration;

use log::{debug, error};

use crate::environment::trust_environment_traits::*;
use crate::source::trust_registry::TrustRegistry;
use crate::util::error::*;
use crate::validator::cert_chain::CertificateChain;
use crate::validator::chain_verifier::{register_certificate, verify_certificate};
use crate::validator::parsed_certificate::{parse_cert, ParsedCertificate};
use crate::validator::verification_result::VerificationResult;
use crate::validator::verifier_settings::VerifierSettings;

/// [`TrustEnvironment`] provides a switchboard of resource fetchers along with the settings and
/// trust registry that govern verification.
#[derive(Default)]
pub struct TrustEnvironment {
    /// List of trait objects that retrieve issuer certificates and CRLs
    fetchers: Vec<Box<dyn ResourceFetcher + Send + Sync>>,

    /// Settings that govern verification and registration
    settings: VerifierSettings,

    /// Identifiers of registered chains
    registry: TrustRegistry,
}

impl TrustEnvironment {
    /// Creates a [`TrustEnvironment`] with the given settings, no fetchers and an empty registry
    pub fn new(settings: VerifierSettings) -> TrustEnvironment {
        TrustEnvironment {
            fetchers: vec![],
            settings,
            registry: TrustRegistry::new(),
        }
    }

    /// Creates a [`TrustEnvironment`] with the given settings and a registry, i.e., one restored
    /// from a saved snapshot
    pub fn with_registry(settings: VerifierSettings, registry: TrustRegistry) -> TrustEnvironment {
        TrustEnvironment {
            fetchers: vec![],
            settings,
            registry,
        }
    }

    /// Returns the settings used by this environment
    pub fn settings(&self) -> &VerifierSettings {
        &self.settings
    }

    /// Replaces the settings used by this environment
    pub fn set_settings(&mut self, settings: VerifierSettings) {
        self.settings = settings;
    }

    /// Returns the trust registry
    pub fn registry(&self) -> &TrustRegistry {
        &self.registry
    }

    /// add_fetcher adds a [`ResourceFetcher`] object to the end of the list.
    pub fn add_fetcher(&mut self, f: Box<dyn ResourceFetcher + Send + Sync>) {
        self.fetchers.push(f);
    }

    /// clear_fetchers clears the list of [`ResourceFetcher`] objects.
    pub fn clear_fetchers(&mut self) {
        self.fetchers.clear();
    }

    /// `fetch` retrieves the resource at `uri` using the first fetcher that handles it. Retrieval
    /// is abandoned after `timeout` with [`Error::Timeout`]. Bodies larger than
    /// `VS_MAX_RESPONSE_SIZE` are rejected with [`Error::NetworkError`]. When no fetcher handles the
    /// URI, [`Error::InvalidUriScheme`] is returned.
    pub async fn fetch(&self, uri: &str, timeout: Duration) -> Result<Vec<u8>> {
        let max_size = self.settings.get_max_response_size();
        let fetcher = match self.fetchers.iter().find(|f| f.handles(uri)) {
            Some(f) => f,
            None => {
                error!("No fetcher available for {}", uri);
                return Err(Error::InvalidUriScheme(uri.to_string()));
            }
        };

        debug!("Fetching {}", uri);
        let body = match tokio::time::timeout(timeout, fetcher.fetch(uri, timeout, max_size)).await
        {
            Ok(r) => r?,
            Err(_elapsed) => {
                error!("Timed out after {:?} retrieving {}", timeout, uri);
                return Err(Error::Timeout(uri.to_string()));
            }
        };
        if body.len() as u64 > max_size {
            error!("Response from {} exceeds {} bytes", uri, max_size);
            return Err(Error::NetworkError(format!(
                "{}: response exceeds {} bytes",
                uri, max_size
            )));
        }
        debug!("Retrieved {} bytes from {}", body.len(), uri);
        Ok(body)
    }

    /// Verifies a parsed certificate. See [`verify_certificate`].
    pub async fn verify(&self, leaf: &ParsedCertificate) -> VerificationResult {
        verify_certificate(self, leaf).await
    }

    /// Parses a DER or PEM encoded certificate and verifies it. Parse failures are reported as
    /// [`VerificationResult::Error`].
    pub async fn verify_buffer(&self, buffer: &[u8]) -> VerificationResult {
        match parse_cert(buffer, "presented certificate") {
            Ok(leaf) => self.verify(&leaf).await,
            Err(e) => VerificationResult::Error(e),
        }
    }

    /// Resolves the chain for a parsed certificate and registers it. See [`register_certificate`].
    pub async fn register(&self, leaf: &ParsedCertificate) -> Result<CertificateChain> {
        register_certificate(self, leaf).await
    }

    /// Parses a DER or PEM encoded certificate then resolves and registers its chain
    pub async fn register_buffer(&self, buffer: &[u8]) -> Result<CertificateChain> {
        let leaf = parse_cert(buffer, "presented certificate")?;
        self.register(&leaf).await
    }

    /// Removes every identifier from the trust registry
    pub async fn clear(&self) {
        self.registry.clear().await;
    }
}

/// `populate_trust_environment` adds the fetchers available in the current build to the
/// environment. With the `remote` feature this is an [`HttpFetcher`](../../builder/uri_utils/struct.HttpFetcher.html).
pub fn populate_trust_environment(te: &mut TrustEnvironment) {
    cfg_if::cfg_if! {
        if #[cfg(feature = "remote")] {
            te.add_fetcher(Box::new(crate::builder::uri_utils::HttpFetcher::default()));
        } else {
            debug!("No remote fetchers available, {} fetchers configured", te.fetchers.len());
        }
    }
}
