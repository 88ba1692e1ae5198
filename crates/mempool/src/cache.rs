use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant}
};

use alloy_primitives::TxHash;
use blockcast_types::TxAnnotation;
use parking_lot::RwLock;

use crate::ANNOTATION_TTL;

#[derive(Debug, Clone)]
struct CachedAnnotation {
    annotation: TxAnnotation,
    last_used:  Instant
}

/// Memoized annotations keyed by transaction hash.
///
/// Reads refresh `last_used`; eviction drops entries idle longer than the
/// TTL, so hot entries stay as long as they are consulted.
#[derive(Debug, Clone)]
pub struct AnnotationCache {
    inner: Arc<RwLock<HashMap<TxHash, CachedAnnotation>>>,
    ttl:   Duration
}

impl Default for AnnotationCache {
    fn default() -> Self {
        Self::new(ANNOTATION_TTL)
    }
}

impl AnnotationCache {
    pub fn new(ttl: Duration) -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    pub fn insert(&self, hash: TxHash, annotation: TxAnnotation) {
        self.inner
            .write()
            .insert(hash, CachedAnnotation { annotation, last_used: Instant::now() });
    }

    pub fn get(&self, hash: &TxHash) -> Option<TxAnnotation> {
        let mut inner = self.inner.write();
        let cached = inner.get_mut(hash)?;
        cached.last_used = Instant::now();
        Some(cached.annotation.clone())
    }

    pub fn contains(&self, hash: &TxHash) -> bool {
        self.inner.read().contains_key(hash)
    }

    /// Drops entries idle longer than the TTL.
    pub fn evict_stale(&self, now: Instant) -> usize {
        let mut inner = self.inner.write();
        let before = inner.len();
        inner.retain(|_, cached| now.duration_since(cached.last_used) <= self.ttl);
        before - inner.len()
    }

    pub fn remove(&self, hashes: &[TxHash]) {
        let mut inner = self.inner.write();
        for hash in hashes {
            inner.remove(hash);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use blockcast_types::{TxCategory, TxKind};

    use super::*;

    #[test]
    fn get_refreshes_last_used() {
        let cache = AnnotationCache::new(Duration::from_millis(50));
        let hash = B256::with_last_byte(1);
        cache.insert(hash, TxAnnotation::new(TxKind::Swap, TxCategory::Dex));

        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get(&hash).is_some());

        // idle clock restarted by the read above
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.evict_stale(Instant::now()), 0);
        assert!(cache.contains(&hash));
    }

    #[test]
    fn idle_entries_expire() {
        let cache = AnnotationCache::new(Duration::from_millis(10));
        let hash = B256::with_last_byte(2);
        cache.insert(hash, TxAnnotation::unknown());

        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.evict_stale(Instant::now()), 1);
        assert!(!cache.contains(&hash));
    }

    #[test]
    fn remove_and_clear() {
        let cache = AnnotationCache::default();
        let a = B256::with_last_byte(3);
        let b = B256::with_last_byte(4);
        cache.insert(a, TxAnnotation::unknown());
        cache.insert(b, TxAnnotation::unknown());

        cache.remove(&[a]);
        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));

        cache.clear();
        assert!(cache.is_empty());
    }
}
