//! Catalog node - the main application entry point.
//!
//! Architecture:
//! - Single daemon process with shared RocksDB storage
//! - Read-only HTTP API for clients (channels, contents, groups)
//! - Unix admin socket for the write path (catalog-admin CLI)

use crate::admin_socket::AdminSocket;
use crate::api;
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_DATA_DIR: &str = "./catalog-data";
const DEFAULT_API_ADDR: &str = "0.0.0.0:8080";

/// Configuration for a catalog node.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Data directory for storage
    pub data_dir: PathBuf,

    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Admin socket path (for catalog-admin CLI)
    pub admin_socket: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            admin_socket: data_dir.join("admin.sock"),
            data_dir,
            api_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl CatalogConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(
            lookup("CATALOG_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let api_addr = lookup("CATALOG_API_ADDR")
            .unwrap_or_else(|| DEFAULT_API_ADDR.to_string());
        let api_addr = api_addr
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("invalid CATALOG_API_ADDR {:?}: {}", api_addr, e)))?;

        let admin_socket = lookup("CATALOG_ADMIN_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("admin.sock"));

        Ok(Self {
            data_dir,
            api_addr,
            admin_socket,
        })
    }
}

/// A catalog node instance.
pub struct CatalogNode {
    catalog: Arc<Catalog>,
    config: CatalogConfig,
}

impl CatalogNode {
    /// Open storage and create a node.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        // Ensure data directory exists
        std::fs::create_dir_all(&config.data_dir)?;

        let catalog = Arc::new(Catalog::open(config.data_dir.join("db"))?);
        Ok(Self { catalog, config })
    }

    /// Shared catalog (for API handlers and the admin socket).
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Run the node (starts admin socket and HTTP server).
    pub async fn run(self) -> Result<()> {
        tracing::info!("Catalog node starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!("  Admin: {:?}", self.config.admin_socket);
        tracing::info!("  Data: {:?}", self.config.data_dir);

        let admin_socket = AdminSocket::new(self.catalog(), self.config.admin_socket.clone());
        tokio::spawn(async move {
            if let Err(e) = admin_socket.run().await {
                tracing::error!("Admin socket error: {}", e);
            }
        });

        let app = api::build_router(self.catalog());

        let listener = tokio::net::TcpListener::bind(self.config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", self.config.api_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
