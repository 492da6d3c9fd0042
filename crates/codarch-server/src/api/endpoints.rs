use std::collections::HashMap;

use codarch_core::{CodarchError, Pagination, SnippetInput, SnippetStore};
use warp::http::StatusCode;
use warp::{reject, Rejection, Reply};

use crate::api::models::HealthStatus;

/// A store error carried through warp until the rejection handler
/// turns it into a response.
#[derive(Debug)]
pub struct ApiError(pub CodarchError);

impl reject::Reject for ApiError {}

fn rejection(err: CodarchError) -> Rejection {
    reject::custom(ApiError(err))
}

pub fn health() -> HealthStatus {
    HealthStatus::ok()
}

/// List snippets, newest first. Bad paging values are clamped, never rejected.
pub async fn list_snippets(
    params: HashMap<String, String>,
    store: SnippetStore,
) -> Result<impl Reply, Rejection> {
    let page = Pagination::from_query(
        params.get("skip").map(String::as_str),
        params.get("limit").map(String::as_str),
    );
    let page = store.list(page).await.map_err(rejection)?;
    Ok(warp::reply::json(&page))
}

/// Get a single snippet by id
pub async fn get_snippet(id: String, store: SnippetStore) -> Result<impl Reply, Rejection> {
    let snippet = store.get(&id).await.map_err(rejection)?;
    Ok(warp::reply::json(&snippet))
}

/// Create a snippet
pub async fn add_snippet_handler(
    body: SnippetInput,
    store: SnippetStore,
) -> Result<impl Reply, Rejection> {
    let snippet = store.create(body).await.map_err(rejection)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&snippet),
        StatusCode::CREATED,
    ))
}

/// Update an existing snippet
pub async fn update_snippet_handler(
    id: String,
    body: SnippetInput,
    store: SnippetStore,
) -> Result<impl Reply, Rejection> {
    let snippet = store.update(&id, body).await.map_err(rejection)?;
    Ok(warp::reply::json(&snippet))
}

/// Delete a snippet
pub async fn delete_snippet_handler(
    id: String,
    store: SnippetStore,
) -> Result<impl Reply, Rejection> {
    store.delete(&id).await.map_err(rejection)?;
    Ok(StatusCode::NO_CONTENT)
}
