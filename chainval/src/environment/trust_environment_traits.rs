//! The trust_environment_traits module features trait definitions used by [`TrustEnvironment`]
//! to retrieve issuer certificates and CRLs.
//!
//! [`TrustEnvironment`]: ../trust_environment/struct.TrustEnvironment.html

use core::time::Duration;

use async_trait::async_trait;

use crate::util::error::*;

/// The [`ResourceFetcher`] trait defines the interface for retrieving the bytes at an issuer or CRL
/// URI. [`TrustEnvironment`](../trust_environment/struct.TrustEnvironment.html) consults its
/// fetchers in the order they were added and uses the first one that handles the URI.
#[async_trait]
pub trait ResourceFetcher {
    /// Returns true if this fetcher can retrieve the given URI, typically based on its scheme
    fn handles(&self, uri: &str) -> bool;

    /// Retrieves the resource at `uri`. Implementations should abandon the request after `timeout`
    /// and return [`Error::NetworkError`] for bodies larger than `max_size` bytes.
    async fn fetch(&self, uri: &str, timeout: Duration, max_size: u64) -> Result<Vec<u8>>;
}
