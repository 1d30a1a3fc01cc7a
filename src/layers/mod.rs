pub mod annotation;
pub mod base;
pub mod macros;
pub mod manager;
pub mod marker;
pub mod tile;

pub use annotation::{AnnotationLayers, Reconciliation};
pub use base::{LayerProperties, LayerTrait, LayerType};
pub use manager::LayerManager;
pub use marker::{Marker, MarkerGroup, MarkerIcon, MarkerLayer, MarkerPopup};
pub use tile::{TileLayer, TileState};
