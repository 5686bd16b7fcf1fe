//! Cache storage for request/response pairs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Identity of an intercepted request: HTTP method plus origin-relative URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: &str, url: impl Into<String>) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url: url.into(),
        }
    }

    /// Key for a plain GET, the common case for asset requests.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }
}

/// A response as held by a partition: status, headers, raw body bytes.
///
/// Stored verbatim and served verbatim; the cache never inspects or rewrites
/// what it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl StoredResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// 200 OK with a body, convenient for tests and fixtures.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, Vec::new(), body.into())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Statistics about partition usage
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of lookups answered from the partition
    pub hits: usize,
    /// Number of lookups that found nothing
    pub misses: usize,
    /// Current number of entries
    pub entries: usize,
    /// Total size of stored bodies in bytes
    pub body_bytes: usize,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f32 / total as f32) * 100.0
        }
    }
}

/// Trait for partition backends
#[async_trait]
pub trait CachePartition: Send + Sync {
    /// Look up a stored response by request identity
    async fn lookup(&self, key: &RequestKey) -> Option<StoredResponse>;

    /// Store a response under a request identity, replacing any previous one
    async fn store(&self, key: RequestKey, response: StoredResponse);

    /// All request identities currently stored
    async fn keys(&self) -> Vec<RequestKey>;

    /// Number of entries
    async fn len(&self) -> usize;

    /// Drop every entry (external eviction; the gate itself never calls this)
    async fn clear(&self);

    /// Usage statistics
    async fn stats(&self) -> CacheStats;
}

/// In-memory partition implementation
#[derive(Default)]
pub struct MemoryPartition {
    entries: RwLock<HashMap<RequestKey, StoredResponse>>,
    stats: RwLock<CacheStats>,
}

impl MemoryPartition {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CachePartition for MemoryPartition {
    async fn lookup(&self, key: &RequestKey) -> Option<StoredResponse> {
        let entries = self.entries.read().await;
        let found = entries.get(key).cloned();

        let mut stats = self.stats.write().await;
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }

        found
    }

    async fn store(&self, key: RequestKey, response: StoredResponse) {
        let mut entries = self.entries.write().await;
        entries.insert(key, response);

        // Recomputing is cheap: partitions hold a preload set, not a corpus.
        let mut stats = self.stats.write().await;
        stats.entries = entries.len();
        stats.body_bytes = entries.values().map(|r| r.body.len()).sum();
    }

    async fn keys(&self) -> Vec<RequestKey> {
        self.entries.read().await.keys().cloned().collect()
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();

        let mut stats = self.stats.write().await;
        stats.entries = 0;
        stats.body_bytes = 0;
    }

    async fn stats(&self) -> CacheStats {
        let stats = self.stats.read().await;
        let mut out = stats.clone();
        out.entries = self.entries.read().await.len();
        out
    }
}

/// Registry of named partitions
///
/// Opening a name that already exists returns the existing partition, so the
/// install step can run any number of times against the same name.
#[derive(Default)]
pub struct CacheStorage {
    partitions: RwLock<HashMap<String, Arc<MemoryPartition>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or create) the partition with the given name
    pub async fn open(&self, name: &str) -> Arc<MemoryPartition> {
        let mut partitions = self.partitions.write().await;
        partitions
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryPartition::new()))
            .clone()
    }

    /// Names of every partition opened so far
    pub async fn partition_names(&self) -> Vec<String> {
        self.partitions.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_lookup() {
        let partition = MemoryPartition::new();
        let key = RequestKey::get("/");
        let response = StoredResponse::ok("<html>home</html>");

        assert!(partition.lookup(&key).await.is_none());

        partition.store(key.clone(), response.clone()).await;
        let found = partition.lookup(&key).await;
        assert_eq!(found, Some(response));

        let stats = partition.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_key_identity_includes_method() {
        let partition = MemoryPartition::new();
        partition
            .store(RequestKey::get("/"), StoredResponse::ok("body"))
            .await;

        // Same URL, different method: different identity.
        assert!(partition.lookup(&RequestKey::new("POST", "/")).await.is_none());
        assert!(partition.lookup(&RequestKey::get("/")).await.is_some());
    }

    #[tokio::test]
    async fn test_store_replaces_previous_entry() {
        let partition = MemoryPartition::new();
        let key = RequestKey::get("/static/style.css");

        partition
            .store(key.clone(), StoredResponse::ok("old body"))
            .await;
        partition.store(key.clone(), StoredResponse::ok("new")).await;

        let found = partition.lookup(&key).await.unwrap();
        assert_eq!(found.body, b"new");

        let stats = partition.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.body_bytes, 3);
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let storage = CacheStorage::new();

        let first = storage.open("expense-cache-v1").await;
        first
            .store(RequestKey::get("/"), StoredResponse::ok("home"))
            .await;

        let second = storage.open("expense-cache-v1").await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len().await, 1);

        let other = storage.open("expense-cache-v2").await;
        assert_eq!(other.len().await, 0);
    }

    #[tokio::test]
    async fn test_header_lookup_is_case_insensitive() {
        let response = StoredResponse::new(
            200,
            vec![("Content-Type".to_string(), "text/css".to_string())],
            b"body".to_vec(),
        );
        assert_eq!(response.header("content-type"), Some("text/css"));
        assert_eq!(response.header("etag"), None);
    }
}
