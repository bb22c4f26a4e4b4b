use std::sync::Arc;

use anyhow::Result;
use storeweather::{AppState, StoreWeatherConfig, VERSION, telemetry, web};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = StoreWeatherConfig::load()?;
    telemetry::init(&config.logging)?;
    info!("StoreWeather {} starting", VERSION);

    let state = Arc::new(AppState::from_config(&config)?);
    web::run(&config.server, state).await?;

    info!("StoreWeather shut down");
    Ok(())
}
