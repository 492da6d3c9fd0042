//! Core of the Codarch snippet archive: the snippet model and its field
//! rules, list pagination, configuration and the SQLite-backed store.

pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod storage;

// Re-export common items for convenience
pub use config::Config;
pub use error::{CodarchError, Result};
pub use models::{Language, NewSnippet, Snippet, SnippetInput, SnippetPatch};
pub use pagination::{Pagination, SnippetPage};
pub use storage::SnippetStore;
