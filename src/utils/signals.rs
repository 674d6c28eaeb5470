//! Signal handling for graceful shutdown

use std::sync::Arc;
use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::{error, info};

use crate::state::AppState;

/// Wait for SIGTERM or SIGINT, then pause the timer so nothing ticks
/// while the server drains
pub async fn shutdown_signal(state: Arc<AppState>) {
    let mut signals = match Signals::new([SIGTERM, SIGINT]) {
        Ok(signals) => signals,
        Err(e) => {
            error!("Failed to install signal handler: {}", e);
            return std::future::pending().await;
        }
    };

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
        state.shutdown();
    }
}
