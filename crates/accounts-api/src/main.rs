//! Accounts server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p accounts-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use accounts_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        address = %config.server.address(),
        database = config.database.is_some(),
        redis = config.redis.is_some(),
        "Configuration loaded"
    );

    accounts_api::run(config).await.context("Server failed")?;
    Ok(())
}
