//! news-digest domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Aggregation, image resolution, composition and the run pipeline

pub mod model;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;

/// Maximum number of posts kept in the history
pub const HISTORY_LIMIT: usize = 10;

/// Rotate a history: prepend `post` and keep at most [`HISTORY_LIMIT`] entries
pub fn rotate_history(mut history: Vec<BlogPost>, post: &BlogPost) -> Vec<BlogPost> {
    history.insert(0, post.clone());
    history.truncate(HISTORY_LIMIT);
    history
}
