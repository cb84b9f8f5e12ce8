use std::process::ExitCode;

use tracing::{error, info, warn};

use vhost_broker::Broker;
use vhost_broker::config::{Settings, load_config};
use vhost_broker::utils::logging;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&settings.log.level);

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Broker failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    settings.validate()?;

    let broker = Broker::from_settings(&settings.broker);
    broker.register_all(&settings.virtual_hosts)?;
    broker.start_all()?;

    let table = serde_json::to_string(&broker.summary())?;
    info!("Virtual hosts ready: {}", table);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Closing connections.");

    let report = broker.shutdown().await?;
    for (id, failure) in &report.failures {
        warn!("Connection {} did not close cleanly: {}", id, failure);
    }
    Ok(())
}
