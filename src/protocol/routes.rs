//! HTTP routes
//!
//! Wires the handlers to warp filters under `/api/v1/lua`:
//!
//! - `GET  /api/v1/lua/`         list scripts
//! - `POST /api/v1/lua/create`   create or overwrite a script (bearer auth)
//! - `GET  /api/v1/lua/{path..}` fetch a script

use log::warn;
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::http::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use warp::hyper::body::Bytes;
use warp::path::Tail;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::error::{ErrorResponse, ServerError, StorageError};
use crate::middleware::{access_log, cors};
use crate::protocol::handlers::{handle_create, handle_list, handle_retrieve};
use crate::protocol::responses::{error_response, file_response, json_response};
use crate::server::ServerContext;

/// Builds the complete filter tree served by the server.
pub fn routes(
    ctx: Arc<ServerContext>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let scripts = warp::path("api").and(warp::path("v1")).and(warp::path("lua"));

    let list = scripts
        .clone()
        .and(warp::path::end())
        .and(warp::get())
        .and(with_context(Arc::clone(&ctx)))
        .and_then(list_route);

    let create = scripts
        .clone()
        .and(warp::path("create"))
        .and(warp::path::end())
        .and(warp::post())
        .and(authorization_header())
        .and(warp::body::bytes())
        .and(with_context(Arc::clone(&ctx)))
        .and_then(create_route);

    let retrieve = scripts
        .and(warp::path::tail())
        .and(warp::get())
        .and(with_context(ctx))
        .and_then(retrieve_route);

    list.or(create)
        .or(retrieve)
        .recover(handle_rejection)
        .with(cors())
        .with(access_log())
}

fn with_context(
    ctx: Arc<ServerContext>,
) -> impl Filter<Extract = (Arc<ServerContext>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&ctx))
}

/// Extracts the raw `Authorization` value; a non-ASCII value is left for the
/// credential check to reject instead of failing the route.
fn authorization_header()
-> impl Filter<Extract = (Option<HeaderValue>,), Error = Infallible> + Clone {
    warp::header::headers_cloned().map(|headers: HeaderMap| headers.get(AUTHORIZATION).cloned())
}

/// Runs blocking filesystem work off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T, ServerError>
where
    F: FnOnce() -> Result<T, ServerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServerError::Internal(format!("worker task failed: {e}")))?
}

async fn list_route(ctx: Arc<ServerContext>) -> Result<Response, Rejection> {
    let response = match run_blocking(move || handle_list(&ctx)).await {
        Ok(listing) => json_response(StatusCode::OK, &listing),
        Err(e) => error_response(&e),
    };
    Ok(response)
}

async fn retrieve_route(tail: Tail, ctx: Arc<ServerContext>) -> Result<Response, Rejection> {
    let relative_path = match percent_decode_str(tail.as_str()).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(_) => {
            warn!("Rejected non UTF-8 request path: {:?}", tail.as_str());
            let err = ServerError::from(StorageError::InvalidPath("path is not valid UTF-8".into()));
            return Ok(error_response(&err));
        }
    };

    let response = match run_blocking(move || handle_retrieve(&ctx, &relative_path)).await {
        Ok(retrieved) => file_response(retrieved.content),
        Err(e) => error_response(&e),
    };
    Ok(response)
}

async fn create_route(
    authorization: Option<HeaderValue>,
    body: Bytes,
    ctx: Arc<ServerContext>,
) -> Result<Response, Rejection> {
    let result = run_blocking(move || {
        let authorization = authorization.as_ref().map(HeaderValue::as_bytes);
        handle_create(&ctx, authorization, &body)
    })
    .await;

    let response = match result {
        Ok(created) => json_response(StatusCode::CREATED, &created),
        Err(e) => error_response(&e),
    };
    Ok(response)
}

/// Converts warp's own rejections into the same JSON error shape.
async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if err.find::<warp::reject::InvalidHeader>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid request header")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large")
    } else {
        warn!("Unhandled rejection: {err:?}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Unhandled rejection")
    };

    Ok(json_response(status, &ErrorResponse::new(status, message, None)))
}
