//! Countdown - a countdown timer state machine served over HTTP
//! 
//! This is the main entry point for the countdown server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use countdown::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::state_observer_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms",
          config.host, config.port, config.tick_ms);

    let state = Arc::new(AppState::new(config.port, config.host.clone(), config.tick_period()));

    tokio::spawn(state_observer_task(state.driver.clone()));

    if let Some(initial) = config.initial {
        if let Err(e) = state.start_countdown(initial) {
            error!("Failed to start initial countdown: {}", e);
        }
    }

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start    - Start a countdown ({{\"initial\": n}})");
    info!("  POST /restart  - Return to setup");
    info!("  GET  /status   - Current countdown and server status");
    info!("  GET  /events   - Server-sent countdown updates");
    info!("  GET  /health   - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.driver.shutdown() {
        error!("Failed to stop countdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
