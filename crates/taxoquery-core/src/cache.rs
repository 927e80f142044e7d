//! Bounded LRU cache around a document builder.
//!
//! Concurrency contract: lookups are safe from any thread, concurrent builds
//! of the same URI coalesce onto a single parse, and eviction never
//! invalidates a document handle a caller already holds (documents are
//! `Arc`s; the cache only drops its own reference). Failures are never
//! memoized.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};

use lru::LruCache;
use tracing::debug;
use url::Url;

use crate::builder::{DocumentBuilder, DocumentFetchError};
use crate::dom::XmlDocument;

/// Default cache capacity when none is configured.
pub const DEFAULT_DOCUMENT_CACHE_CAPACITY: usize = 5000;

type BuildResult = Result<Arc<XmlDocument>, DocumentFetchError>;

/// LRU-bounded, coalescing wrapper over any [`DocumentBuilder`].
pub struct CachingDocumentBuilder<B> {
    inner: B,
    cache: Mutex<LruCache<Url, Arc<XmlDocument>>>,
    // Losers of the per-URI insertion race block on the winner's slot.
    inflight: Mutex<HashMap<Url, Arc<OnceLock<BuildResult>>>>,
}

impl<B: DocumentBuilder> CachingDocumentBuilder<B> {
    pub fn new(inner: B) -> Self {
        Self::with_capacity(inner, DEFAULT_DOCUMENT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: B, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped builder.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Number of documents currently retained.
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached document without touching the inner builder.
    pub fn cached(&self, uri: &Url) -> Option<Arc<XmlDocument>> {
        self.cache.lock().unwrap().get(uri).cloned()
    }
}

impl<B: DocumentBuilder> DocumentBuilder for CachingDocumentBuilder<B> {
    fn build(&self, uri: &Url) -> BuildResult {
        if let Some(doc) = self.cache.lock().unwrap().get(uri) {
            return Ok(Arc::clone(doc));
        }

        let slot = {
            let mut inflight = self.inflight.lock().unwrap();
            Arc::clone(inflight.entry(uri.clone()).or_default())
        };

        let result = slot
            .get_or_init(|| {
                debug!(uri = %uri, "document cache miss");
                let result = self.inner.build(uri);
                if let Ok(doc) = &result {
                    self.cache.lock().unwrap().put(uri.clone(), Arc::clone(doc));
                }
                result
            })
            .clone();

        // Retire the slot so a later build after a failure parses afresh.
        let mut inflight = self.inflight.lock().unwrap();
        if inflight.get(uri).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
            inflight.remove(uri);
        }
        result
    }
}
