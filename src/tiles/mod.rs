pub mod cache;
pub mod loader;
pub mod source;

// Re-exports for convenience
pub use cache::TileCache;
pub use loader::{Generation, TileEvent, TileLoader, TileOutcome};
pub use source::{PyramidTileSource, TileAddress, TileSource};
