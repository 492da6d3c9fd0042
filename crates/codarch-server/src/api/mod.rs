//! API handlers and their request/response types.

pub mod endpoints;
pub mod models;

pub use endpoints::{
    add_snippet_handler, delete_snippet_handler, get_snippet, health, list_snippets,
    update_snippet_handler, ApiError,
};
pub use models::{ErrorBody, HealthStatus};
