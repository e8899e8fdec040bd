//! LRU cache for OS group lookups
//!
//! Group ACL checks resolve the candidate's group list once per check; the
//! cache keeps recent answers, including "no such user", so repeated checks
//! against the same user stay off the identity database.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Cached answer for one user; `None` records a failed lookup
pub type CachedGroups = Option<Vec<String>>;

/// LRU cache of user name to group names
pub struct GroupCache {
    cache: LruCache<String, CachedGroups>,
}

impl GroupCache {
    /// Create a new group cache with given capacity
    pub fn new(capacity: NonZeroUsize) -> Self {
        GroupCache {
            cache: LruCache::new(capacity),
        }
    }

    /// Get cached lookup result
    pub fn get(&mut self, user: &str) -> Option<CachedGroups> {
        self.cache.get(user).cloned()
    }

    /// Put lookup result in cache
    pub fn put(&mut self, user: &str, groups: CachedGroups) {
        self.cache.put(user.to_string(), groups);
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached users
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
