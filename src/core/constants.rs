//! Engine-wide defaults for the annotated map viewer.
//! Keeping them in a single place makes it easier to tweak viewer-wide magic numbers.

/// Square tile size of the shipped map pyramids, in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 512;

/// Highest pyramid level with real imagery when calibration does not say otherwise.
pub const DEFAULT_NATIVE_MAX_ZOOM: u32 = 4;

/// Zoom level a freshly loaded map opens at.
pub const DEFAULT_START_ZOOM: f64 = 1.0;

/// How far the viewer may zoom out past level 0 (level-0 imagery is reused).
pub const DEFAULT_ZOOM_LEVELS_BELOW_NATIVE: u32 = 1;

/// How far the viewer may zoom in past the native maximum (imagery is upsampled).
pub const DEFAULT_ZOOM_LEVELS_ABOVE_NATIVE: u32 = 1;

/// Programmatic +/- zoom step when calling `zoom_in/zoom_out`.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

/// Root directory of the tile pyramids.
pub const DEFAULT_TILE_ROOT: &str = "assets/maps/tiles";

/// File extension of individual tile images.
pub const DEFAULT_TILE_EXTENSION: &str = "webp";

/// Number of decoded tile payloads kept in memory.
pub const DEFAULT_TILE_CACHE_SIZE: usize = 256;

/// Map opened when the viewer mounts.
pub const DEFAULT_MAP: &str = "dam";

/// Marker icon size in screen pixels.
pub const MARKER_ICON_SIZE: (u32, u32) = (30, 30);

/// Anchor inside the icon (hot-spot) in pixel coords.
pub const MARKER_ICON_ANCHOR: (u32, u32) = (15, 15);

/// Glyph used for annotations whose subcategory is not in the taxonomy.
pub const FALLBACK_MARKER_GLYPH: &str = "📍";
