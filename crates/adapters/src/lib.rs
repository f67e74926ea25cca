//! news-digest adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `news_api`: structured news search API source
//! - `atom_feed`: official Atom feed source
//! - `unsplash`: photo search
//! - `llm`: chat completions text generator
//! - `store`: JSON file and in-memory post stores

mod store_json;
mod store_memory;

pub mod atom_feed;
pub mod llm;
pub mod news_api;
pub mod unsplash;

/// Re-exports for post store adapters
pub mod store {
    pub use crate::store_json::JsonFilePostStore;
    pub use crate::store_memory::InMemoryPostStore;
}
