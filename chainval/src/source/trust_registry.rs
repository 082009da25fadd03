//! The trust_registry module provides the set of key identifiers harvested from previously
//! registered certificate chains.
//!
//! Identifiers are the upper case hex encodings of subject and authority key identifiers. A chain
//! is trusted when any identifier derived from it has been registered. Mutations hold the write
//! lock for their entire duration, so readers never observe a partially registered chain.

use std::collections::BTreeSet;

use log::{debug, info};
use tokio::sync::RwLock;

use crate::util::cert_utilities::buffer_to_hex;
use crate::validator::cert_chain::CertificateChain;

/// `derive_identifiers` returns the set of identifiers for a chain: for every certificate, the
/// hex-encoded subject key identifier and authority key identifier keyIdentifier, when present.
pub fn derive_identifiers(chain: &CertificateChain) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for cert in chain {
        if let Some(skid) = &cert.subject_key_identifier {
            ids.insert(buffer_to_hex(skid));
        }
        if let Some(akid) = &cert.authority_key_identifier {
            ids.insert(buffer_to_hex(akid));
        }
    }
    ids
}

/// Normalizes externally supplied identifiers to the form produced by [`derive_identifiers`]
fn canonical_identifier(id: &str) -> Option<String> {
    let id = id.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_uppercase())
    }
}

/// `TrustRegistry` is a concurrency-safe set of trusted key identifiers.
#[derive(Debug, Default)]
pub struct TrustRegistry {
    identifiers: RwLock<BTreeSet<String>>,
}

impl TrustRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry populated with previously saved identifiers, i.e., the output of
    /// [`TrustRegistry::snapshot`]. Empty values are ignored and hex digits are upper cased.
    pub fn from_identifiers<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = ids
            .into_iter()
            .filter_map(|id| canonical_identifier(id.as_ref()))
            .collect();
        TrustRegistry {
            identifiers: RwLock::new(set),
        }
    }

    /// Adds every identifier derived from `chain`. Registering the same chain twice has the same
    /// effect as registering it once. Returns the number of identifiers that were not already
    /// present.
    pub async fn register(&self, chain: &CertificateChain) -> usize {
        let ids = derive_identifiers(chain);
        let mut guard = self.identifiers.write().await;
        let before = guard.len();
        guard.extend(ids);
        let added = guard.len() - before;
        info!(
            "Registered chain for {} ({} certificates, {} new identifiers)",
            chain.leaf().subject,
            chain.len(),
            added
        );
        added
    }

    /// Adds the given identifiers under a single write lock. Returns the number of identifiers
    /// that were not already present.
    pub async fn register_identifiers<I, S>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<String> = ids
            .into_iter()
            .filter_map(|id| canonical_identifier(id.as_ref()))
            .collect();
        let mut guard = self.identifiers.write().await;
        let before = guard.len();
        guard.extend(ids);
        guard.len() - before
    }

    /// Returns true if any identifier derived from `chain` is registered
    pub async fn is_trusted(&self, chain: &CertificateChain) -> bool {
        let ids = derive_identifiers(chain);
        let guard = self.identifiers.read().await;
        match ids.iter().find(|id| guard.contains(*id)) {
            Some(id) => {
                debug!("Chain for {} matched identifier {}", chain.leaf().subject, id);
                true
            }
            None => false,
        }
    }

    /// Removes all identifiers
    pub async fn clear(&self) {
        let mut guard = self.identifiers.write().await;
        let count = guard.len();
        guard.clear();
        info!("Cleared {} identifiers from trust registry", count);
    }

    /// Returns true if the given identifier is registered
    pub async fn contains(&self, id: &str) -> bool {
        match canonical_identifier(id) {
            Some(id) => self.identifiers.read().await.contains(&id),
            None => false,
        }
    }

    /// Number of registered identifiers
    pub async fn len(&self) -> usize {
        self.identifiers.read().await.len()
    }

    /// Returns true if no identifiers are registered
    pub async fn is_empty(&self) -> bool {
        self.identifiers.read().await.is_empty()
    }

    /// Returns a copy of the registered identifiers in sorted order
    pub async fn snapshot(&self) -> Vec<String> {
        self.identifiers.read().await.iter().cloned().collect()
    }
}
