// Boundary with the vector store that holds the media files the filters are
// applied to.
pub mod config;
pub mod predicates;
pub mod records;
pub mod storage;
pub mod types;

// Re-export main components
pub use config::*;
pub use predicates::{Predicate, StorePredicates};
pub use records::{point_id, FileRecord};
pub use storage::{define_collection, import_media, MediaEmbedder, PointWriter};
pub use types::*;
