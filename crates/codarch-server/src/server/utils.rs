//! Utilities for running the API server.

use codarch_core::{CodarchError, Result};
use tokio::signal;
use tracing::info;
use warp::http::uri::{Authority, Scheme};

/// CORS policy for the configured front-end origins.
///
/// warp panics on an origin it cannot parse, so every origin is parsed here
/// first and a bad one becomes a configuration error.
pub fn cors(allowed_origins: &[String]) -> Result<warp::cors::Builder> {
    for origin in allowed_origins {
        check_origin(origin)?;
    }

    Ok(warp::cors()
        .allow_origins(allowed_origins.iter().map(String::as_str))
        .allow_headers(vec!["Content-Type"])
        .allow_methods(vec!["GET", "POST", "DELETE", "PUT"])
        .allow_credentials(true))
}

fn check_origin(origin: &str) -> Result<()> {
    let invalid = |reason: String| {
        CodarchError::InvalidConfig(format!("invalid CORS origin '{origin}': {reason}"))
    };

    let (scheme, authority) = origin
        .split_once("://")
        .ok_or_else(|| invalid("expected scheme://host[:port]".to_string()))?;
    scheme
        .parse::<Scheme>()
        .map_err(|e| invalid(e.to_string()))?;
    authority
        .parse::<Authority>()
        .map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

/// Resolve on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
