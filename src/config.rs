//! Configuration management for RAX Lua Server
//!
//! Values are layered: built-in defaults, then an optional `config.toml`,
//! then `RAX_LUA_*` environment variables. The result is immutable for the
//! lifetime of the process.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SERVER_ROOT: &str = "lua_files";
const DEFAULT_CONFIG_PATH: &str = "config";
const ENV_PREFIX: &str = "RAX_LUA";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the HTTP listener binds to
    /// Environment: RAX_LUA_BIND_ADDRESS
    pub bind_address: String,

    /// HTTP listener port
    /// Environment: RAX_LUA_PORT
    pub port: u16,

    /// Directory holding the scripts, relative to the working directory
    /// unless absolute
    /// Environment: RAX_LUA_SERVER_ROOT
    pub server_root: String,

    /// Bearer secret required for uploads
    /// Environment: RAX_LUA_AUTH_KEY
    #[serde(default)]
    pub auth_key: String,
}

impl ServerConfig {
    /// Load configuration from ./config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from `config_path` (extension optional) with
    /// environment overrides. A missing file is not an error.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("server_root", DEFAULT_SERVER_ROOT)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.bind_address.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Message(format!(
                "bind_address is not an IP address: {}",
                self.bind_address
            )));
        }

        if self.server_root.trim().is_empty() {
            return Err(ConfigError::Message("server_root cannot be empty".into()));
        }

        if self.auth_key.is_empty() {
            return Err(ConfigError::Message(format!(
                "auth_key must be set (config.toml or {ENV_PREFIX}_AUTH_KEY)"
            )));
        }

        Ok(())
    }

    /// Socket address for the HTTP listener
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid bind_address: {e}")))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Get server root as PathBuf
    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }
}
