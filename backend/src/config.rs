//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use crate::state::persistence::RESPONSES_FILE;
use std::env;
use std::path::PathBuf;

/// Default port when `PORT` is unset or invalid
pub const DEFAULT_PORT: u16 = 3000;

/// Default request body cap in bytes (200 KiB)
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 200 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Security configuration
    pub security: SecurityConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
    /// Largest accepted request body, in bytes
    pub body_limit_bytes: usize,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Directory holding the survey store file
    pub data_dir: PathBuf,
}

/// Security configuration
#[derive(Clone, Default)]
pub struct SecurityConfig {
    /// Shared secret for clearing the store; `None` disables the operation
    pub admin_token: Option<String>,
}

// Never print the secret itself
impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    ///
    /// - `PORT` (default 3000), `HOST` (default "0.0.0.0")
    /// - `BODY_LIMIT_BYTES` (default 204800)
    /// - `DATA_DIR` (default "data")
    /// - `ADMIN_TOKEN` (optional; empty counts as unset)
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_PORT),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                body_limit_bytes: env::var("BODY_LIMIT_BYTES")
                    .ok()
                    .and_then(|b| b.parse().ok())
                    .filter(|&b| b > 0)
                    .unwrap_or(DEFAULT_BODY_LIMIT_BYTES),
            },
            persistence: PersistenceConfig {
                data_dir: env::var_os("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("data")),
            },
            security: SecurityConfig {
                admin_token: env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl PersistenceConfig {
    /// Full path of the survey store file
    pub fn responses_path(&self) -> PathBuf {
        self.data_dir.join(RESPONSES_FILE)
    }
}
