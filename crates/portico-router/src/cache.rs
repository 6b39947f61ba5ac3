//! Match-result caching.
//!
//! A hit here short-circuits the whole matching pipeline: no pattern walk,
//! no convention inference, no metadata resolution. Entries are keyed by a
//! hash of (verb, normalized path) and serialized as JSON through the
//! [`CacheStore`] port. Every failure mode is a miss; a result that itself
//! came from the cache is never written back.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use tracing::debug;

use portico_core::{CacheStore, CachedMatch, MatchResult, MatchSource};

pub(crate) struct MatchCache {
    store: Option<Arc<dyn CacheStore>>,
    ttl: Duration,
}

impl MatchCache {
    pub(crate) fn new(store: Option<Arc<dyn CacheStore>>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn key(method: &Method, path: &str) -> String {
        let mut hasher = DefaultHasher::new();
        method.as_str().hash(&mut hasher);
        path.hash(&mut hasher);
        format!("portico:route:{:016x}", hasher.finish())
    }

    /// Reconstructs a match result from the store, marked cache-sourced.
    pub(crate) fn get(&self, method: &Method, path: &str) -> Option<MatchResult> {
        let store = self.store.as_ref()?;
        let bytes = store.get(&Self::key(method, path))?;
        match serde_json::from_slice::<CachedMatch>(&bytes) {
            Ok(cached) => Some(MatchResult::from_cached(cached)),
            Err(error) => {
                debug!(%error, "discarding undecodable route cache entry");
                None
            }
        }
    }

    /// Writes a match result, best effort.
    pub(crate) fn put(&self, method: &Method, path: &str, result: &MatchResult) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if result.source == MatchSource::Cache {
            return;
        }
        match serde_json::to_vec(&result.to_cached()) {
            Ok(bytes) => store.set(&Self::key(method, path), bytes, self.ttl),
            Err(error) => debug!(%error, "skipping route cache write"),
        }
    }
}
