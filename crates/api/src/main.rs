use std::sync::Arc;

use anyhow::Context;

use salesrelay_api::{app, server};
use salesrelay_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    salesrelay_observability::init();

    if let Err(e) = run().await {
        tracing::error!(error = ?e, "exiting with error");
        return Err(e);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    let services = app::services::AppServices::from_config(&config)
        .await
        .context("failed to initialize sinks")?;
    let app = app::build_app(Arc::new(services), config.sink_timeout);

    let listener = server::bind(config.port)
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{}", config.port))?;
    server::log_banner(listener.local_addr()?);

    server::run(listener, app, server::shutdown_signal(), server::SHUTDOWN_GRACE)
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}
