//! CORS middleware
//!
//! Browser clients may call the API from any origin.

use warp::cors::Cors;

pub fn cors() -> Cors {
    warp::cors()
        .allow_any_origin()
        .allow_credentials(true)
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["authorization", "content-type"])
        .build()
}
