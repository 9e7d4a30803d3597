use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::{Page, PageNumber, Post};

/// Cache key: which listing and which page, after clamping
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListingKey {
    All(PageNumber),
    Group { slug: String, page: PageNumber },
    Author { username: String, page: PageNumber },
}

/// Entry cap used when none is configured
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

#[derive(Debug, Clone)]
struct CachedPage {
    page: Page<Post>,
    stored_at: Instant,
    generation: u64,
}

/// Invalidate-on-write TTL cache for listing pages.
///
/// Readers take a generation snapshot before querying the store and hand it
/// back on `insert`. Entries remember the generation they were computed at and
/// are only served while it is current, so a page computed before an
/// invalidation is never returned. The map holds at most `max_entries` pages;
/// expired entries are swept when it fills up.
#[derive(Debug)]
pub struct ListingCache {
    ttl: Duration,
    max_entries: usize,
    entries: DashMap<ListingKey, CachedPage>,
    generation: AtomicU64,
}

impl ListingCache {
    /// A zero TTL disables the cache.
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn is_live(&self, entry: &CachedPage, generation: u64) -> bool {
        entry.generation == generation && entry.stored_at.elapsed() < self.ttl
    }

    pub fn get(&self, key: &ListingKey) -> Option<Page<Post>> {
        if !self.is_enabled() {
            return None;
        }

        let current = self.generation();
        let hit = self
            .entries
            .get(key)
            .and_then(|entry| self.is_live(&entry, current).then(|| entry.page.clone()));

        if hit.is_some() {
            debug!(?key, "Listing cache HIT");
            return hit;
        }

        self.entries.remove_if(key, |_, entry| !self.is_live(entry, current));
        debug!(?key, "Listing cache MISS");
        None
    }

    /// Store `page` unless the cache was invalidated since `generation`.
    pub fn insert(&self, key: ListingKey, page: Page<Post>, generation: u64) {
        if !self.is_enabled() || self.generation() != generation {
            return;
        }

        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.evict_expired();
            if self.entries.len() >= self.max_entries {
                debug!(?key, max_entries = self.max_entries, "Listing cache full");
                return;
            }
        }

        self.entries.insert(
            key.clone(),
            CachedPage {
                page,
                stored_at: Instant::now(),
                generation,
            },
        );

        // An invalidation may have landed between the check above and the insert.
        if self.generation() != generation {
            self.entries.remove_if(&key, |_, entry| entry.generation == generation);
        }
    }

    /// Drop every entry that is expired or from an older generation.
    pub fn evict_expired(&self) {
        let current = self.generation();
        self.entries.retain(|_, entry| self.is_live(entry, current));
    }

    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if self.is_enabled() {
            self.entries.clear();
            debug!("Listing cache invalidated");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::disabled()
    }
}
