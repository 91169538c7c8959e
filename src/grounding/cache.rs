use crate::grounding::GroundingScope;
use crate::structs::{GroundLdlRule, LdlRule};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

pub const DEFAULT_GROUNDING_CACHE_CAPACITY: usize = 4096;

/// Memoised rule groundings, keyed by rule and scope, with least recently
/// used eviction. Safe to share between threads.
#[derive(Debug)]
pub struct GroundingCache {
    entries: Mutex<LruCache<(LdlRule, GroundingScope), Arc<[GroundLdlRule]>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl GroundingCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Returns the cached groundings of `rule` in `scope`, computing them
    /// with `ground` on a miss. The lock is not held while grounding.
    pub fn get_or_insert_with<F>(
        &self,
        rule: &LdlRule,
        scope: GroundingScope,
        ground: F,
    ) -> Arc<[GroundLdlRule]>
    where
        F: FnOnce() -> Vec<GroundLdlRule>,
    {
        let key = (rule.clone(), scope);
        if let Some(found) = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(found);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let groundings: Arc<[GroundLdlRule]> = ground().into();
        trace!(rule = %rule.name(), groundings = groundings.len(), "grounded rule");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, Arc::clone(&groundings));
        groundings
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for GroundingCache {
    fn default() -> Self {
        Self::new(DEFAULT_GROUNDING_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn second_lookup_hits() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let scope = GroundingScope::for_task(&domain, &task);
        let rule = pick_up_rule(&domain);
        let cache = GroundingCache::new(2);

        let first = cache.get_or_insert_with(&rule, scope, Vec::new);
        let second = cache.get_or_insert_with(&rule, scope, || unreachable!());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let scope = GroundingScope::for_task(&domain, &task);
        let other_scope = GroundingScope::unfiltered(task.objects().iter().copied().take(1));
        let rule = pick_up_rule(&domain);
        let cache = GroundingCache::new(1);

        cache.get_or_insert_with(&rule, scope, Vec::new);
        cache.get_or_insert_with(&rule, other_scope, Vec::new);
        assert_eq!(cache.len(), 1);
        cache.get_or_insert_with(&rule, scope, Vec::new);
        assert_eq!(cache.misses(), 3);
    }
}
