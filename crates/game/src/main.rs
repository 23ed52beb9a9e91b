use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;

fn main() -> ExitCode {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Tanks Startup ===");

    match app::build_app() {
        Ok(wiring) => app::run(wiring),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
