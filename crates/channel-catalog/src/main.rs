//! Catalog Node binary
//!
//! Serves the channel catalog over HTTP and accepts edits on the admin socket.

use channel_catalog::{CatalogConfig, CatalogNode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_node=info,channel_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Catalog Node");

    let config = CatalogConfig::from_env()?;

    // Create and run node
    let node = CatalogNode::new(config)?;
    node.run().await?;

    Ok(())
}
