//! StaticFetcher serves issuer certificates and CRLs from memory. It supports offline use, i.e.,
//! when the artifacts named by AIA and CRL DP extensions were obtained out of band, and testing.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;

use crate::environment::trust_environment_traits::ResourceFetcher;
use crate::util::cert_utilities::is_http_uri;
use crate::util::error::*;

#[derive(Clone, Debug)]
enum StaticResource {
    Body(Bytes),
    Delayed(Duration, Bytes),
    Failure(String),
}

/// `StaticFetcher` maps URIs to canned responses. It claims every http and https URI. URIs with no
/// entry produce [`Error::NetworkError`], as would a 404 from a server.
///
/// Clones share the same resources and retrieval counts, so a clone may be handed to a
/// [`TrustEnvironment`](../../environment/trust_environment/struct.TrustEnvironment.html) while the
/// original is retained to add resources or inspect counts.
#[derive(Clone, Debug, Default)]
pub struct StaticFetcher {
    resources: Arc<Mutex<BTreeMap<String, StaticResource>>>,
    hits: Arc<Mutex<BTreeMap<String, usize>>>,
}

impl StaticFetcher {
    /// Creates an empty StaticFetcher
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, uri: &str, resource: StaticResource) {
        if let Ok(mut g) = self.resources.lock() {
            g.insert(uri.to_string(), resource);
        }
    }

    /// Serves `body` for `uri`
    pub fn add_resource(&self, uri: &str, body: &[u8]) {
        self.insert(uri, StaticResource::Body(Bytes::copy_from_slice(body)));
    }

    /// Serves `body` for `uri` after waiting for `delay`
    pub fn add_delayed_resource(&self, uri: &str, delay: Duration, body: &[u8]) {
        self.insert(
            uri,
            StaticResource::Delayed(delay, Bytes::copy_from_slice(body)),
        );
    }

    /// Fails retrieval of `uri` with [`Error::NetworkError`] carrying `reason`
    pub fn add_failure(&self, uri: &str, reason: &str) {
        self.insert(uri, StaticResource::Failure(reason.to_string()));
    }

    /// Removes the entry for `uri`, if any
    pub fn remove_resource(&self, uri: &str) {
        if let Ok(mut g) = self.resources.lock() {
            g.remove(uri);
        }
    }

    /// Returns the number of times `uri` has been requested
    pub fn fetch_count(&self, uri: &str) -> usize {
        match self.hits.lock() {
            Ok(g) => g.get(uri).copied().unwrap_or(0),
            Err(_e) => 0,
        }
    }

    fn lookup(&self, uri: &str) -> Option<StaticResource> {
        if let Ok(mut g) = self.hits.lock() {
            *g.entry(uri.to_string()).or_insert(0) += 1;
        }
        match self.resources.lock() {
            Ok(g) => g.get(uri).cloned(),
            Err(_e) => None,
        }
    }
}

fn check_size(uri: &str, body: Bytes, max_size: u64) -> Result<Vec<u8>> {
    if body.len() as u64 > max_size {
        return Err(Error::NetworkError(format!(
            "{}: response exceeds {} bytes",
            uri, max_size
        )));
    }
    Ok(body.to_vec())
}

#[async_trait]
impl ResourceFetcher for StaticFetcher {
    fn handles(&self, uri: &str) -> bool {
        is_http_uri(uri)
    }

    async fn fetch(&self, uri: &str, _timeout: Duration, max_size: u64) -> Result<Vec<u8>> {
        match self.lookup(uri) {
            Some(StaticResource::Body(body)) => {
                debug!("Serving {} bytes for {} from memory", body.len(), uri);
                check_size(uri, body, max_size)
            }
            Some(StaticResource::Delayed(delay, body)) => {
                tokio::time::sleep(delay).await;
                check_size(uri, body, max_size)
            }
            Some(StaticResource::Failure(reason)) => {
                Err(Error::NetworkError(format!("{}: {}", uri, reason)))
            }
            None => Err(Error::NetworkError(format!("{}: not found", uri))),
        }
    }
}
