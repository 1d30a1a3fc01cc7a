pub mod annotation;
pub mod taxonomy;

pub use annotation::{AnnotationCatalog, AnnotationRecord};
pub use taxonomy::{layer_key, CategoryInfo, CategoryTaxonomy, SubcategoryInfo};
