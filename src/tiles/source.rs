use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::geo::TileCoord;

/// Identifier of one tile image in a map's pyramid
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileAddress {
    pub map_name: String,
    pub level: u32,
    pub col: u32,
    pub row: u32,
}

impl TileAddress {
    /// Location under `root` following `{map}/{level}/{col}_{row}.{ext}`
    pub fn path(&self, root: &Path, extension: &str) -> PathBuf {
        root.join(&self.map_name)
            .join(self.level.to_string())
            .join(format!("{}_{}.{}", self.col, self.row, extension))
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}_{}", self.map_name, self.level, self.col, self.row)
    }
}

/// Trait representing anything that can turn pyramid coordinates into tile images.
pub trait TileSource: Send + Sync {
    /// Resolve `coord`, or `None` when no tile exists there.
    fn resolve(&self, coord: TileCoord) -> Option<TileAddress>;

    /// Where the image for `address` is stored.
    fn location(&self, address: &TileAddress) -> PathBuf;
}

/// Square power-of-two pyramid stored as one image file per tile.
///
/// Levels below zero reuse level-0 imagery. Levels above the native maximum
/// still resolve; the surface upsamples them.
#[derive(Debug, Clone)]
pub struct PyramidTileSource {
    map_name: String,
    root: PathBuf,
    extension: String,
}

impl PyramidTileSource {
    pub fn new(map_name: impl Into<String>, root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            map_name: map_name.into(),
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }
}

impl TileSource for PyramidTileSource {
    fn resolve(&self, coord: TileCoord) -> Option<TileAddress> {
        let level = coord.level.max(0);
        let tiles_at_level = TileCoord::tiles_at_level(level);

        if coord.col < 0 || coord.row < 0 || coord.col >= tiles_at_level || coord.row >= tiles_at_level {
            log::trace!(
                "tile ({}, {}, {}) outside [0, {}) for {}",
                level,
                coord.col,
                coord.row,
                tiles_at_level,
                self.map_name
            );
            return None;
        }

        Some(TileAddress {
            map_name: self.map_name.clone(),
            level: u32::try_from(level).ok()?,
            col: u32::try_from(coord.col).ok()?,
            row: u32::try_from(coord.row).ok()?,
        })
    }

    fn location(&self, address: &TileAddress) -> PathBuf {
        address.path(&self.root, &self.extension)
    }
}
