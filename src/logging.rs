//! Subscriber setup and service lifecycle log lines.

use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the output format (`json` or anything else
/// for compact text).
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_FILTER: &str = "vat_validator=info,tower_http=info";

/// Whether `LOG_FORMAT=json` is set.
pub fn json_requested() -> bool {
    env::var(ENV_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logger(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .json(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init();
    }
}

/// Logs service information at startup
pub fn log_service_info() {
    info!(
        "=== {} v{} starting ===",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    info!("Platform: {}/{}", env::consts::OS, env::consts::ARCH);
    if let Ok(rust_log) = env::var("RUST_LOG") {
        info!("Log filter: {rust_log}");
    }
}

pub fn log_startup_complete(bind_address: &str) {
    info!("Listening on {bind_address}");
    info!("Ready to accept requests");
}

pub fn log_service_shutdown() {
    info!("{} shutting down", env!("CARGO_PKG_NAME"));
}
