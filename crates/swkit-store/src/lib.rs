//! # swkit Store
//!
//! Versioned request/response cache stores for the swkit cache worker.
//!
//! ## Features
//!
//! - **RequestIdentity**: normalized method + URL cache keys
//! - **StoredResponse**: immutable response snapshots
//! - **CacheStore**: one named, versioned identity → snapshot mapping
//! - **StoreRegistry**: open/has/delete stores by versioned name
//! - **StoreSnapshot**: serde round-trip for persistence by the shell
//!
//! ## Architecture
//!
//! ```text
//! StoreRegistry
//!     └── CacheStore ("<product>-cache-v<version>")
//!             └── RequestIdentity → StoredResponse
//! ```
//!
//! Exactly one store is "current" per deployed version. A version bump
//! opens a new store under a new name; superseded stores are left in
//! place until the surrounding system deletes them.

use hashbrown::HashMap;
use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

// ==================== Errors ====================

/// Errors that can occur in store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store not found: {0}")]
    NotFound(String),

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

// ==================== Identity ====================

/// Normalized cache key derived from a request's method and absolute URL.
///
/// Two requests with the same identity address the same cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity {
    method: Method,
    url: Url,
}

impl RequestIdentity {
    /// Create an identity from a method and absolute URL.
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url }
    }

    /// Shorthand for a GET identity.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Parse an identity from serialized parts.
    pub fn from_parts(method: &str, url: &str) -> Result<Self, StoreError> {
        let method = method
            .parse::<Method>()
            .map_err(|e| StoreError::InvalidIdentity(e.to_string()))?;
        let url = Url::parse(url).map_err(|e| StoreError::InvalidIdentity(e.to_string()))?;
        Ok(Self { method, url })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

// ==================== Stored Response ====================

/// Immutable snapshot of a response, captured at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    /// Response status.
    pub status: u16,

    /// Response headers.
    pub headers: HashMap<String, String>,

    /// Response body.
    pub body: Vec<u8>,

    /// Stored-at timestamp (ms since epoch).
    pub stored_at: u64,
}

impl StoredResponse {
    /// Snapshot a response captured now.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
            stored_at: epoch_millis(),
        }
    }

    /// Whether the status is in the storable [200, 300) range.
    pub fn is_storable(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ==================== Cache Store ====================

/// A named, versioned mapping of request identities to response snapshots.
///
/// Entries are replaced whole, never partially updated. Concurrent writes
/// to the same identity are last-write-wins.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Store name (version-qualified).
    pub name: String,

    entries: HashMap<RequestIdentity, StoredResponse>,
}

impl CacheStore {
    /// Create a new, empty store.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: HashMap::new(),
        }
    }

    /// Look up an identity.
    pub fn lookup(&self, identity: &RequestIdentity) -> Option<&StoredResponse> {
        self.entries.get(identity)
    }

    /// Insert or overwrite an entry.
    pub fn put(&mut self, identity: RequestIdentity, response: StoredResponse) {
        debug!(store = %self.name, identity = %identity, status = response.status, "cache put");
        self.entries.insert(identity, response);
    }

    /// Delete an entry.
    pub fn delete(&mut self, identity: &RequestIdentity) -> bool {
        self.entries.remove(identity).is_some()
    }

    /// All stored identities.
    pub fn keys(&self) -> Vec<&RequestIdentity> {
        self.entries.keys().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export a serde-able snapshot of this store.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            name: self.name.clone(),
            entries: self
                .entries
                .iter()
                .map(|(identity, response)| SnapshotEntry {
                    method: identity.method().to_string(),
                    url: identity.url().to_string(),
                    response: response.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        let mut store = Self::new(&snapshot.name);
        for entry in snapshot.entries {
            let identity = RequestIdentity::from_parts(&entry.method, &entry.url)?;
            store.entries.insert(identity, entry.response);
        }
        Ok(store)
    }
}

// ==================== Snapshot ====================

/// Serializable dump of one store, used by the surrounding shell to
/// persist a version's cache across worker restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub name: String,
    pub entries: Vec<SnapshotEntry>,
}

/// One serialized cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub method: String,
    pub url: String,
    pub response: StoredResponse,
}

impl StoreSnapshot {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ==================== Registry ====================

/// Build the version-qualified store name for a product.
pub fn store_name(product: &str, version: &str) -> String {
    format!("{product}-cache-v{version}")
}

/// Registry of cache stores, addressed by versioned name.
///
/// The registry never deletes a superseded version's store on its own;
/// `delete` exists for the surrounding system.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: RwLock<HashMap<String, Arc<RwLock<CacheStore>>>>,
}

impl StoreRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store, creating it if absent.
    pub async fn open(&self, name: &str) -> Arc<RwLock<CacheStore>> {
        let mut stores = self.stores.write().await;
        Arc::clone(
            stores
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(RwLock::new(CacheStore::new(name)))),
        )
    }

    /// Get an existing store.
    pub async fn get(&self, name: &str) -> Result<Arc<RwLock<CacheStore>>, StoreError> {
        let stores = self.stores.read().await;
        stores
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Check if a store exists.
    pub async fn has(&self, name: &str) -> bool {
        self.stores.read().await.contains_key(name)
    }

    /// Delete a store.
    pub async fn delete(&self, name: &str) -> bool {
        self.stores.write().await.remove(name).is_some()
    }

    /// All store names.
    pub async fn names(&self) -> Vec<String> {
        self.stores.read().await.keys().cloned().collect()
    }

    /// Restore a store from a snapshot, replacing any store of the same name.
    pub async fn restore(&self, snapshot: StoreSnapshot) -> Result<(), StoreError> {
        let store = CacheStore::from_snapshot(snapshot)?;
        let mut stores = self.stores.write().await;
        stores.insert(store.name.clone(), Arc::new(RwLock::new(store)));
        Ok(())
    }
}
