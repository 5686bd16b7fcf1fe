//! Cache-then-network request gate
//!
//! This is the heart of the crate: a one-time install pass seeds a named
//! cache partition with a fixed set of assets, and every intercepted request
//! afterwards is answered from the partition when an entry exists, from the
//! network otherwise. Stored responses are served verbatim with no freshness
//! check; a miss never populates the cache. Both the partition and the
//! network are injected, so the two handlers are unit-testable without any
//! server running.

pub mod service;

use std::sync::Arc;

use anyhow::Result;

use crate::cache::{CachePartition, StoredResponse};
use crate::net::{FetchError, FetchRequest, NetworkFetch};

/// Default partition name. Changing this literal is the only cache
/// invalidation lever; there is deliberately no migration logic.
pub const DEFAULT_PARTITION: &str = "expense-cache-v1";

/// Default preload set: the assets fetched and stored at install time.
pub const DEFAULT_PRELOAD: [&str; 2] = ["/", "/static/style.css"];

/// The request gate over one partition and one network backend
pub struct CacheGate {
    partition: Arc<dyn CachePartition>,
    network: Arc<dyn NetworkFetch>,
}

impl CacheGate {
    pub fn new(partition: Arc<dyn CachePartition>, network: Arc<dyn NetworkFetch>) -> Self {
        Self { partition, network }
    }

    /// Install: fetch every preload target and store it in the partition.
    ///
    /// All-or-nothing. Every target is fetched first and must answer 2xx;
    /// only when all fetches succeed are the responses stored. On failure
    /// nothing from this run is stored and the error propagates, so the
    /// caller can abort startup. Re-running against an already populated
    /// partition re-stores the same key set.
    pub async fn handle_install(&self, preload: &[String]) -> Result<()> {
        let fetches = preload.iter().map(|path| {
            let request = FetchRequest::get(path.clone());
            async move {
                let response = self.network.fetch(&request).await?;
                if !response.is_success() {
                    return Err(FetchError::PreloadStatus {
                        url: request.key.url.clone(),
                        status: response.status,
                    }
                    .into());
                }
                Ok::<_, anyhow::Error>((request.key, response))
            }
        });

        let fetched = futures::future::try_join_all(fetches).await?;

        for (key, response) in fetched {
            self.partition.store(key, response).await;
        }

        tracing::info!(targets = preload.len(), "cache gate installed");
        Ok(())
    }

    /// Fetch: answer one intercepted request.
    ///
    /// Lookup uses only the request identity (method + URL); a hit serves the
    /// stored response as-is. A miss passes the identical request through to
    /// the network, headers and body included, and returns whatever it
    /// yields, including non-2xx responses. Network failures propagate
    /// untranslated.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<StoredResponse> {
        if let Some(stored) = self.partition.lookup(&request.key).await {
            tracing::debug!(url = %request.key.url, "cache hit");
            return Ok(stored);
        }

        tracing::debug!(url = %request.key.url, "cache miss, passing through");
        self.network.fetch(request).await
    }

    pub fn partition(&self) -> &Arc<dyn CachePartition> {
        &self.partition
    }
}
