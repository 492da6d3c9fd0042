pub mod api;
pub mod server;

// Re-export for convenience
pub use server::{routes, run, start_api_server};
