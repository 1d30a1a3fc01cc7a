use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::cache::TileCache;
use super::source::TileAddress;
use crate::Result;

/// Identity of one map load.
///
/// Every asynchronous tile result carries the generation it was requested
/// under; results from older generations belong to a surface that no longer
/// exists and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Generation {
        Generation(self.0 + 1)
    }
}

/// Reads the bytes of one tile image
pub trait TileFetch: Send + Sync + 'static {
    fn fetch(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Fetches tiles from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFetch;

impl TileFetch for FsFetch {
    fn fetch(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }
}

#[derive(Debug, Clone)]
pub enum TileOutcome {
    Loaded(Arc<Vec<u8>>),
    Failed(String),
}

/// Completion report for one tile request
#[derive(Debug, Clone)]
pub struct TileEvent {
    pub generation: Generation,
    pub address: TileAddress,
    pub outcome: TileOutcome,
}

/// Tile loader that fetches tiles on background threads and reports the
/// result back over a channel. Callers drain the channel from their own
/// thread; nothing here ever blocks the caller.
pub struct TileLoader {
    fetcher: Arc<dyn TileFetch>,
    cache: TileCache,
    tx: Sender<TileEvent>,
    rx: Receiver<TileEvent>,
}

impl TileLoader {
    pub fn new(fetcher: Arc<dyn TileFetch>, cache: TileCache) -> Self {
        let (tx, rx) = unbounded();
        Self {
            fetcher,
            cache,
            tx,
            rx,
        }
    }

    /// Loader reading tiles from disk
    pub fn filesystem(cache: TileCache) -> Self {
        Self::new(Arc::new(FsFetch), cache)
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Start loading `address` from `path`. Cached tiles are reported
    /// immediately; everything else completes on a detached thread.
    pub fn request(&self, generation: Generation, address: TileAddress, path: PathBuf) {
        if let Some(data) = self.cache.get(&address) {
            let _ = self.tx.send(TileEvent {
                generation,
                address,
                outcome: TileOutcome::Loaded(data),
            });
            return;
        }

        let fetcher = Arc::clone(&self.fetcher);
        let cache = self.cache.clone();
        let tx = self.tx.clone();

        thread::spawn(move || {
            log::debug!("fetch tile {} from {}", address, path.display());
            let outcome = match fetcher.fetch(&path) {
                Ok(bytes) => {
                    let data = Arc::new(bytes);
                    cache.put(address.clone(), Arc::clone(&data));
                    TileOutcome::Loaded(data)
                }
                Err(e) => {
                    log::warn!("tile {} failed to load: {}", address, e);
                    TileOutcome::Failed(e.to_string())
                }
            };
            // receiver gone means the viewer was dropped
            let _ = tx.send(TileEvent {
                generation,
                address,
                outcome,
            });
        });
    }

    /// Every completion reported so far, without waiting
    pub fn drain(&self) -> Vec<TileEvent> {
        self.rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next completion
    pub fn recv_timeout(&self, timeout: Duration) -> Option<TileEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}
