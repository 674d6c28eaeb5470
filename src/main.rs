//! focus-timer - a focus/break countdown timer with a distraction guard
//!
//! This is the main entry point for the focus-timer server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focus_timer::{
    api::create_router,
    config::Config,
    services::{DesktopBackend, HttpSessionBackend},
    state::AppState,
    tasks::tick_source_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, focus={}min, break={}min, credit={:?}",
          config.host, config.port, config.focus, config.break_minutes, config.credit);

    let backend = Arc::new(HttpSessionBackend::new(&config.backend)?);
    let state = Arc::new(AppState::new(&config, backend, Arc::new(DesktopBackend)));

    // Show the statistics the backend already has
    let reporter = state.reporter.clone();
    tokio::spawn(async move {
        let _ = reporter.refresh_stats().await;
    });

    // Start the tick source background task
    tokio::spawn(tick_source_task(Arc::clone(&state.engine)));

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Session backend: {}", config.backend);
    info!("Endpoints:");
    info!("  POST /start /pause /skip /finish - Timer controls");
    info!("  POST /reset                      - Reset (confirmed during focus)");
    info!("  POST /duration                   - Set focus/break minutes");
    info!("  POST /task                       - Select task for sessions");
    info!("  POST /input                      - Forward key/click events");
    info!("  POST /dialog/confirm|cancel      - Answer the guard dialog");
    info!("  GET  /status                     - Timer, guard and statistics");
    info!("  GET  /health                     - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&state)))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
