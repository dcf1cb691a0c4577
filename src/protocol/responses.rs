//! HTTP response building
//!
//! Turns handler results and errors into warp responses.

use serde::Serialize;
use warp::http::StatusCode;
use warp::http::header::{CONTENT_TYPE, HeaderValue};
use warp::reply::{Reply, Response};

use crate::error::handlers::handle_error;
use crate::error::{ErrorResponse, ServerError, error_to_status_code};

/// Serialize `body` as JSON with the given status
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

/// Log the error and build its structured JSON reply
pub fn error_response(err: &ServerError) -> Response {
    handle_error(err);
    json_response(error_to_status_code(err), &ErrorResponse::from_error(err))
}

/// Raw script bytes
pub fn file_response(content: Vec<u8>) -> Response {
    let mut response = Response::new(content.into());
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    response
}
