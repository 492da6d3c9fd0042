//! The one place where failures become HTTP responses.

use std::convert::Infallible;

use codarch_core::CodarchError;
use tracing::{error, warn};
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{LengthRequired, MethodNotAllowed, PayloadTooLarge, UnsupportedMediaType};
use warp::{Rejection, Reply};

use crate::api::models::{
    ErrorBody, METHOD_NOT_ALLOWED, NOT_FOUND, PAYLOAD_TOO_LARGE, SERVER_ERROR,
    UNSUPPORTED_MEDIA_TYPE, VALIDATION_ERROR,
};
use crate::api::ApiError;

const INTERNAL_DETAIL: &str = "internal server error";

/// Map a store error to its status and body. Store faults are logged here and
/// reported without detail.
pub fn classify(err: &CodarchError) -> (StatusCode, ErrorBody) {
    match err {
        CodarchError::Validation(violations) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new(VALIDATION_ERROR, violations.join("; ")),
        ),
        CodarchError::NotFound => (
            StatusCode::NOT_FOUND,
            ErrorBody::new(NOT_FOUND, err.to_string()),
        ),
        other => {
            error!(error = %other, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(SERVER_ERROR, INTERNAL_DETAIL),
            )
        }
    }
}

/// Recover every rejection into `{error, detail}`.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, body) = if let Some(ApiError(inner)) = err.find::<ApiError>() {
        classify(inner)
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            ErrorBody::new(VALIDATION_ERROR, format!("invalid request body: {e}")),
        )
    } else if err.find::<LengthRequired>().is_some() {
        (
            StatusCode::BAD_REQUEST,
            ErrorBody::new(VALIDATION_ERROR, "Content-Length header is required"),
        )
    } else if err.find::<PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorBody::new(PAYLOAD_TOO_LARGE, "request body is too large"),
        )
    } else if err.find::<UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorBody::new(UNSUPPORTED_MEDIA_TYPE, "expected application/json"),
        )
    } else if err.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorBody::new(METHOD_NOT_ALLOWED, "method not allowed"),
        )
    } else if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ErrorBody::new(NOT_FOUND, "route not found"),
        )
    } else {
        warn!(rejection = ?err, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new(SERVER_ERROR, INTERNAL_DETAIL),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
