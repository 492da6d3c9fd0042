use codarch_core::config::{self, DATABASE_URL_VAR, PORT_VAR};
use codarch_core::{Config, Result};
use std::env;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber. `RUST_LOG` wins, `info` otherwise.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// Environment lookup where command-line flags take precedence.
fn with_overrides(
    port: Option<u16>,
    database_url: Option<String>,
) -> impl Fn(&str) -> Option<String> {
    move |key| match key {
        DATABASE_URL_VAR => database_url.clone().or_else(|| env::var(key).ok()),
        PORT_VAR => port.map(|p| p.to_string()).or_else(|| env::var(key).ok()),
        _ => env::var(key).ok(),
    }
}

/// Load configuration from the environment with command-line overrides.
pub fn load_config(port: Option<u16>, database_url: Option<String>) -> Result<Config> {
    Config::from_lookup(with_overrides(port, database_url))
}

/// Resolve only the database location, with the same rules the server uses.
pub fn load_database_url(database_url: Option<String>) -> Result<String> {
    config::load_database_url(&with_overrides(None, database_url))
}
