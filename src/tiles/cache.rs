use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;

use super::source::TileAddress;

type TileBytes = Arc<Vec<u8>>;

/// Shared LRU cache of fetched tile bytes.
///
/// Clones share storage, so the loader's worker threads fill the same cache
/// the UI thread reads. Addresses carry the map name, so entries outlive map
/// switches and returning to a map is served from memory.
#[derive(Debug, Clone)]
pub struct TileCache {
    inner: Arc<Mutex<LruCache<TileAddress, TileBytes>>>,
}

impl TileCache {
    /// Cache holding up to `capacity` tiles (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    // a poisoned lock only means a worker panicked mid-insert; the map itself is intact
    fn lock(&self) -> MutexGuard<'_, LruCache<TileAddress, TileBytes>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached bytes for `address`, marking it recently used
    pub fn get(&self, address: &TileAddress) -> Option<TileBytes> {
        self.lock().get(address).cloned()
    }

    pub fn put(&self, address: TileAddress, data: TileBytes) {
        self.lock().put(address, data);
    }

    /// Membership test that leaves the recency order alone
    pub fn contains(&self, address: &TileAddress) -> bool {
        self.lock().contains(address)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
