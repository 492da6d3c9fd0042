pub mod http_server;
pub mod rejection;
pub mod utils;

pub use http_server::{routes, run, start_api_server};
