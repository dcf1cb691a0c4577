//! Shared request context
//!
//! Immutable state built once at startup and handed to every request.

use log::info;
use std::io;

use crate::config::ServerConfig;
use crate::storage::SandboxRoot;
use crate::storage::filesystem::create_directory;

/// Everything a request handler needs: the sandbox root and the upload secret.
#[derive(Debug, Clone)]
pub struct ServerContext {
    root: SandboxRoot,
    auth_key: String,
}

impl ServerContext {
    pub fn new(root: SandboxRoot, auth_key: impl Into<String>) -> Self {
        Self {
            root,
            auth_key: auth_key.into(),
        }
    }

    /// Builds the context from configuration, creating the server root if it
    /// does not exist yet.
    pub fn from_config(config: &ServerConfig) -> io::Result<Self> {
        let root_path = config.server_root_path();
        create_directory(&root_path)?;
        let root = SandboxRoot::open(&root_path)?;
        info!("Server root directory: {}", root.path().display());
        Ok(Self::new(root, config.auth_key.clone()))
    }

    pub fn root(&self) -> &SandboxRoot {
        &self.root
    }

    pub fn auth_key(&self) -> &str {
        &self.auth_key
    }
}
