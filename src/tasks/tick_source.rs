//! Tick source background task

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::engine::{TickOutcome, TimerEngine};

const TICK: Duration = Duration::from_secs(1);

/// Drives the engine one second at a time while it is running.
///
/// Waits for the engine to publish a live epoch, then ticks an interval
/// until the epoch changes (pause, completion or restart). Only one
/// interval exists at any time.
pub async fn tick_source_task(engine: Arc<Mutex<TimerEngine>>) {
    info!("Starting tick source task");

    let mut schedule_rx = match engine.lock() {
        Ok(engine) => engine.subscribe_schedule(),
        Err(e) => {
            error!("Failed to lock timer engine: {}", e);
            return;
        }
    };

    loop {
        let live_epoch = *schedule_rx.borrow_and_update();

        let Some(epoch) = live_epoch else {
            // Paused, wait for the next start
            if schedule_rx.changed().await.is_err() {
                debug!("Timer engine dropped, stopping tick source");
                return;
            }
            continue;
        };

        debug!("Tick source armed for epoch {}", epoch);
        let mut interval = interval_at(Instant::now() + TICK, TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let outcome = match engine.lock() {
                        Ok(mut engine) => engine.tick(epoch),
                        Err(e) => {
                            error!("Failed to lock timer engine: {}", e);
                            break;
                        }
                    };

                    match outcome {
                        TickOutcome::Ticked => {}
                        TickOutcome::Completed(mode) => {
                            debug!("{} interval completed on epoch {}", mode.label(), epoch);
                            break;
                        }
                        TickOutcome::Ignored => break,
                    }
                }

                changed = schedule_rx.changed() => {
                    if changed.is_err() {
                        debug!("Timer engine dropped, stopping tick source");
                        return;
                    }
                    debug!("Schedule changed, dropping interval for epoch {}", epoch);
                    break;
                }
            }
        }
    }
}
