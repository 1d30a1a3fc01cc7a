pub mod filter;
pub mod overlay;
pub mod popup;

pub use filter::FilterState;
pub use overlay::{Overlay, OverlaySlot};
pub use popup::Popup;
