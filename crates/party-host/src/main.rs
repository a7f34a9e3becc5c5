//! Party host entry point
//!
//! Run with:
//! ```bash
//! cargo run -p party-host
//! ```
//!
//! Configuration is loaded from environment variables.

use party_common::{try_init_tracing, HostConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the host
    if let Err(e) = run().await {
        error!(error = %e, "Host failed to start");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting party host...");

    // Load configuration
    let config = HostConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        addr = %config.server.address(),
        radius_m = config.party.proximity_radius_m,
        "Configuration loaded"
    );

    // Run the host server
    party_host::run(config).await?;

    Ok(())
}
