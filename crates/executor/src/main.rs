use std::process;
use std::sync::Arc;

use dotenvy::dotenv;
use tracing::{error, info};

use common::config::ServerConfig;
use common::logger;
use common::{Credentials, TradingConfig};
use executor::ExecutionService;
use relay::{RelayService, ThreeCommasClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    info!("System starting up...");

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("{} - trading disabled, refusing to start", e);
            process::exit(1);
        }
    };

    let config = TradingConfig::from_env()?;
    let server = ServerConfig::from_env()?;

    let client = ThreeCommasClient::new(&credentials, &config)?;
    let relay = RelayService::new(client, credentials.account_id, config.clone());

    info!("Starting crypto trading execution service");
    info!("Supported trading pairs: {}", config.pairs.join(", "));

    let service = Arc::new(ExecutionService::new(Arc::new(relay), Arc::new(config)));
    executor::serve(server.socket_addr(), service).await
}
