//! Memoizing single-work fetcher
//!
//! Owns the per-run cache over any [`WorkSource`]: successful lookups are
//! memoized by normalized work identifier, failures are reported as absent
//! and retried on the next call for that identifier. The cache never
//! outlives the run.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::openalex::client::WorkSource;
use crate::openalex::types::OpenAlexWork;

/// Memoizing fetcher over a [`WorkSource`].
pub struct WorkFetcher {
    source: Arc<dyn WorkSource>,
    cache: Mutex<HashMap<String, OpenAlexWork>>,
}

impl WorkFetcher {
    pub fn new(source: Arc<dyn WorkSource>) -> Self {
        Self::with_cache(source, HashMap::new())
    }

    /// Fetcher starting from a pre-seeded cache.
    pub fn with_cache(source: Arc<dyn WorkSource>, cache: HashMap<String, OpenAlexWork>) -> Self {
        Self {
            source,
            cache: Mutex::new(cache),
        }
    }

    /// Fetch one work by its normalized identifier.
    ///
    /// An empty identifier resolves to `None` without touching the source.
    /// A cache hit returns the cached document. Otherwise the source is
    /// consulted: a success is cached and returned, a failure is logged and
    /// reported as `None` without being cached, so the next call for the
    /// same identifier contacts the source again.
    pub async fn fetch(&self, work_id: &str) -> Option<OpenAlexWork> {
        if work_id.is_empty() {
            return None;
        }

        {
            let cache = self.cache.lock().await;
            if let Some(work) = cache.get(work_id) {
                return Some(work.clone());
            }
        }

        match self.source.lookup_work(work_id).await {
            Ok(work) => {
                let mut cache = self.cache.lock().await;
                cache.insert(work_id.to_string(), work.clone());
                Some(work)
            }
            Err(e) => {
                warn!(work_id = %work_id, error = %e, "OpenAlex lookup failed, continuing without external metadata");
                None
            }
        }
    }

    /// Number of memoized works.
    pub async fn cached_count(&self) -> usize {
        self.cache.lock().await.len()
    }
}
