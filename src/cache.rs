//! Token caching with LRU eviction, keyed by book page

use crate::tokens::{PageKey, Tokenizer};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const FALLBACK_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(n) => n,
    None => unreachable!(),
};

/// Tokenized pages, so repeated searches over the same pages skip the
/// tokenizer. Page content is immutable, which keeps entries valid for the
/// life of the cache.
pub struct TokenCache {
    cache: Mutex<LruCache<PageKey, Arc<Vec<String>>>>,
}

impl TokenCache {
    pub fn new(capacity: usize) -> Self {
        let cache = LruCache::new(NonZeroUsize::new(capacity).unwrap_or(FALLBACK_CAPACITY));
        Self { cache: Mutex::new(cache) }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<PageKey, Arc<Vec<String>>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &PageKey) -> Option<Arc<Vec<String>>> {
        self.lock().get(key).map(Arc::clone)
    }

    /// Cached tokens for `key`, tokenizing `content` on a miss
    pub fn get_or_tokenize(&self, key: &PageKey, content: &str, tokenizer: &Tokenizer) -> Arc<Vec<String>> {
        if let Some(tokens) = self.get(key) {
            return tokens;
        }

        // Tokenize outside the lock; a racing thread may insert the same page first
        let tokens = Arc::new(tokenizer.tokenize(content));
        self.lock().put(key.clone(), Arc::clone(&tokens));
        tokens
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// (entries, capacity)
    pub fn stats(&self) -> (usize, usize) {
        let cache = self.lock();
        (cache.len(), cache.cap().get())
    }
}
