//! HTTP server implementation for the Codarch API.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;

use codarch_core::{CodarchError, Config, Result, SnippetInput, SnippetStore};
use tracing::info;
use warp::{Filter, Rejection, Reply};

use crate::api::{
    add_snippet_handler, delete_snippet_handler, get_snippet, health, list_snippets,
    update_snippet_handler,
};
use crate::server::rejection::handle_rejection;
use crate::server::utils::{cors, shutdown_signal};

/// Largest JSON body accepted on create and update.
pub const MAX_BODY_BYTES: u64 = 100 * 1024;

fn with_store(
    store: SnippetStore,
) -> impl Filter<Extract = (SnippetStore,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

fn json_body() -> impl Filter<Extract = (SnippetInput,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// All `/api/snippets` routes, with every rejection recovered into an error body.
pub fn routes(
    store: SnippetStore,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health_route = warp::path!("api" / "snippets" / "health")
        .and(warp::get())
        .map(|| warp::reply::json(&health()));

    let list_route = warp::path!("api" / "snippets")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_store(store.clone()))
        .and_then(list_snippets);

    let get_route = warp::path!("api" / "snippets" / String)
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(get_snippet);

    let add_route = warp::path!("api" / "snippets")
        .and(warp::post())
        .and(json_body())
        .and(with_store(store.clone()))
        .and_then(add_snippet_handler);

    let update_route = warp::path!("api" / "snippets" / String)
        .and(warp::put())
        .and(json_body())
        .and(with_store(store.clone()))
        .and_then(update_snippet_handler);

    let delete_route = warp::path!("api" / "snippets" / String)
        .and(warp::delete())
        .and(with_store(store))
        .and_then(delete_snippet_handler);

    health_route
        .or(list_route)
        .or(get_route)
        .or(add_route)
        .or(update_route)
        .or(delete_route)
        .recover(handle_rejection)
}

/// Serve `store` on the configured address until a shutdown signal arrives.
pub async fn start_api_server(config: &Config, store: SnippetStore) -> Result<()> {
    let address = config.listen_address();
    let addr: SocketAddr = address.parse().map_err(|e| {
        CodarchError::InvalidConfig(format!("invalid listen address '{address}': {e}"))
    })?;

    let cors_policy = cors(&config.allowed_origins)?;
    let app = routes(store)
        .with(cors_policy)
        .with(warp::trace::request());

    let server = warp::serve(app).try_bind_with_graceful_shutdown(addr, shutdown_signal());

    match server {
        Ok((addr, server)) => {
            info!("Codarch API listening on http://{addr}");
            server.await;
            info!("API server stopped");
            Ok(())
        }
        Err(e) => Err(CodarchError::Bind {
            addr: address,
            reason: e.to_string(),
        }),
    }
}

/// Open the store, check it answers, serve, then close it.
///
/// Any failure before the listener is bound aborts startup; the server never
/// runs without a working store.
pub async fn run(config: Config) -> Result<()> {
    info!("Initializing snippet store...");
    let store = SnippetStore::open(&config.database_url)?;
    store.ping().await?;
    info!("Snippet store reachable");

    let served = start_api_server(&config, store.clone()).await;
    store.close()?;
    served
}
