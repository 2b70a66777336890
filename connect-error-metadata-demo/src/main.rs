//! Shows how error metadata reaches the caller over Connect and over gRPC.
//!
//! Run with: cargo run --bin connect-error-metadata
//! Environment: PORT (default 8080), DEMO_HOST, DEMO_CONNECT_ENCODING, RUST_LOG

use anyhow::Context;
use connect_error_metadata_demo::{DemoConfig, config, demo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_tracing();

    let config = DemoConfig::from_env().context("load config")?;
    tracing::debug!(?config, "starting");

    let mut stdout = std::io::stdout().lock();
    demo::run_all(&config, &mut stdout).await?;

    Ok(())
}
