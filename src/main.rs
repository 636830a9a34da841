use std::sync::Arc;

use anyhow::{Error, Result};
use campaign_service::{api::run_api_server, clients::smtp::SmtpMailer, config::Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;

    info!(
        smtp_host = %config.smtp_host,
        send_interval_ms = config.send_interval_ms,
        "Configuration validated"
    );

    let transport = Arc::new(SmtpMailer::new(&config));

    run_api_server(config, transport).await
}
