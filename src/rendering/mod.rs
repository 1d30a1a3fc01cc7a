pub mod context;
pub mod style;

// Re-export main types
pub use context::{DrawCommand, RenderContext};
pub use style::Color;
