use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::routes;
use crate::server::context::ServerContext;

pub struct Server {
    context: Arc<ServerContext>,
    addr: SocketAddr,
}

impl Server {
    /// Prepares the server root and listener address from configuration.
    pub fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        let addr = config.socket_addr()?;

        let context = ServerContext::from_config(config).map_err(|e| {
            error!(
                "Failed to prepare server root {}: {}",
                config.server_root, e
            );
            ServerError::IoError(e)
        })?;

        Ok(Self {
            context: Arc::new(context),
            addr,
        })
    }

    /// Serves requests until Ctrl-C is received.
    pub async fn start(self) -> Result<(), ServerError> {
        let routes = routes(Arc::clone(&self.context));

        let (addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(self.addr, shutdown_signal())
            .map_err(|e| {
                error!("Failed to bind to {}: {}", self.addr, e);
                ServerError::Internal(format!("failed to bind {}: {e}", self.addr))
            })?;

        info!("Starting RAX Lua server on http://{}", addr);
        server.await;
        info!("Server stopped");

        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
