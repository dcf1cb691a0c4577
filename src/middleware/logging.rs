//! Logging middleware
//!
//! Provides request logging functionality.

use log::info;
use warp::log::{Info, Log};

/// Target used for per-request access lines
pub const ACCESS_LOG_TARGET: &str = "rax_lua_server::access";

/// Log one line per request: client, method, path, status and latency.
pub fn access_log() -> Log<impl Fn(Info<'_>) + Clone + Send + Sync> {
    warp::log::custom(|request: Info<'_>| {
        let client = request
            .remote_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "-".to_string());

        info!(
            target: ACCESS_LOG_TARGET,
            "{} {} {} {} {:?}",
            client,
            request.method(),
            request.path(),
            request.status().as_u16(),
            request.elapsed()
        );
    })
}
