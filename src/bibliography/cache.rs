//! Read-through response cache for bibliography sources.
//!
//! Responses are cached as serialized JSON keyed by query string, so the
//! same cache can back a network crawler and be snapshotted by its owner.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::trace;

use super::{BibliographySource, PublicationRecord};
use crate::error::{CoiError, CoiResult};

/// Key-value store for raw service responses.
pub trait ResponseCache: Send + Sync {
    /// Returns the cached response for `key`.
    fn lookup(&self, key: &str) -> Option<String>;

    /// Stores `response` under `key`. An existing entry is kept.
    fn store(&self, key: &str, response: String);
}

/// Thread-safe in-memory [`ResponseCache`].
#[derive(Debug, Default)]
pub struct InMemoryResponseCache {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryResponseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached responses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResponseCache for InMemoryResponseCache {
    fn lookup(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn store(&self, key: &str, response: String) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_insert(response);
    }
}

/// A [`BibliographySource`] that consults a [`ResponseCache`] before the
/// wrapped source and fills the cache on a miss.
#[derive(Debug)]
pub struct CachedBibliography<S, C> {
    inner: S,
    cache: C,
}

impl<S, C> CachedBibliography<S, C> {
    /// Wraps `inner` with `cache`.
    pub const fn new(inner: S, cache: C) -> Self {
        Self { inner, cache }
    }

    /// Returns the cache.
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// The cache key used for an author's publication list.
    #[must_use]
    pub fn query_key(author_key: &str) -> String {
        format!("rec/pers/{author_key}/publications")
    }
}

impl<S: BibliographySource, C: ResponseCache> BibliographySource for CachedBibliography<S, C> {
    fn fetch_publications_for_author_key(&self, key: &str) -> CoiResult<Vec<PublicationRecord>> {
        let query = Self::query_key(key);
        if let Some(raw) = self.cache.lookup(&query) {
            trace!(query = %query, "bibliography cache hit");
            return serde_json::from_str(&raw)
                .map_err(|e| CoiError::bibliography(format!("corrupt cache entry {query}: {e}")));
        }

        let records = self.inner.fetch_publications_for_author_key(key)?;
        let raw = serde_json::to_string(&records)
            .map_err(|e| CoiError::bibliography(format!("cannot cache {query}: {e}")))?;
        self.cache.store(&query, raw);
        Ok(records)
    }
}
