//! Server middleware
//!
//! Provides access logging and CORS wrappers for the route tree.

pub mod cors;
pub mod logging;

pub use cors::cors;
pub use logging::access_log;
