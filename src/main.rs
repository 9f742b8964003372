//! VAT validation server
//!
//! Serves `POST /validate_vat` on port 8001.

use std::net::SocketAddr;

use tracing::{error, info};
use vat_validator::{LISTEN_PORT, Settings, Validator, api, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logger(logging::json_requested());
    logging::log_service_info();

    let settings = Settings::from_env();
    info!("VIES endpoint: {}", settings.vies_url);
    match settings.request_timeout {
        Some(t) => info!("VIES timeout: {}s", t.as_secs()),
        None => info!("VIES timeout: none"),
    }

    let validator = Validator::new(&settings)?;
    let app = api::create_router(api::AppState::new(validator));

    let addr = SocketAddr::from(([0, 0, 0, 0], LISTEN_PORT));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    logging::log_startup_complete(&addr.to_string());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    logging::log_service_shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
