//! Server core functionality
//!
//! This module contains the server bootstrap and the shared request context.

pub mod context;
pub mod core;

pub use context::ServerContext;
pub use self::core::Server;
