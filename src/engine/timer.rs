//! Countdown engine: start/pause/reset/skip and the completion transition

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::state::{
    DisplaySnapshot, FocusSession, SessionCredit, TimerConfig, TimerMode, TimerState,
};
use super::{Notifier, Presentation, SessionSink};

const FOCUS_DONE_MESSAGE: &str = "Focus time is over. Take a break now!";
const BREAK_DONE_MESSAGE: &str = "Break is over. Time to focus!";

/// Everything the engine calls out to when an interval completes
#[derive(Clone)]
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub sessions: Arc<dyn SessionSink>,
    pub presentation: Arc<dyn Presentation>,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belonged to a cancelled tick source or the timer is paused
    Ignored,
    /// One second was counted down
    Ticked,
    /// The interval reached zero and the completion transition ran
    Completed(TimerMode),
}

/// Focus/break countdown state machine.
///
/// The engine never sleeps itself. `start` publishes a fresh tick epoch on
/// the schedule channel and the tick source task calls `tick` with that
/// epoch once a second until the channel says otherwise.
pub struct TimerEngine {
    config: TimerConfig,
    state: TimerState,
    credit: SessionCredit,
    task_id: Option<String>,
    epoch: u64,
    schedule_tx: watch::Sender<Option<u64>>,
    display_tx: watch::Sender<DisplaySnapshot>,
    collaborators: Collaborators,
}

impl TimerEngine {
    pub fn new(config: TimerConfig, credit: SessionCredit, collaborators: Collaborators) -> Self {
        let state = TimerState::new(&config);
        let (schedule_tx, _) = watch::channel(None);
        let (display_tx, _) = watch::channel(DisplaySnapshot::of(&state));

        Self {
            config,
            state,
            credit,
            task_id: None,
            epoch: 0,
            schedule_tx,
            display_tx,
            collaborators,
        }
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn credit(&self) -> SessionCredit {
        self.credit
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn is_armed(&self) -> bool {
        self.state.is_armed()
    }

    pub fn display(&self) -> DisplaySnapshot {
        self.display_tx.borrow().clone()
    }

    /// Live tick epoch, `None` while paused
    pub fn subscribe_schedule(&self) -> watch::Receiver<Option<u64>> {
        self.schedule_tx.subscribe()
    }

    pub fn subscribe_display(&self) -> watch::Receiver<DisplaySnapshot> {
        self.display_tx.subscribe()
    }

    /// Start counting down. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.state.running {
            return false;
        }
        self.state.running = true;
        self.epoch += 1;
        self.schedule_tx.send_replace(Some(self.epoch));
        info!("Timer started: {} {}s remaining (epoch {})",
              self.state.mode.label(), self.state.remaining_seconds, self.epoch);
        self.publish();
        true
    }

    /// Stop counting down. Returns false if not running.
    pub fn pause(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        self.state.running = false;
        self.schedule_tx.send_replace(None);
        debug!("Timer paused at {}s (epoch {})", self.state.remaining_seconds, self.epoch);
        self.publish();
        true
    }

    /// One second from the tick source registered under `epoch`
    pub fn tick(&mut self, epoch: u64) -> TickOutcome {
        if !self.state.running || epoch != self.epoch {
            debug!("Ignoring tick from epoch {} (live epoch {}, running={})",
                   epoch, self.epoch, self.state.running);
            return TickOutcome::Ignored;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            let finished = self.state.mode;
            self.complete();
            return TickOutcome::Completed(finished);
        }

        self.publish();
        TickOutcome::Ticked
    }

    /// Pause and rewind the current interval. Mode is unchanged.
    pub fn reset(&mut self) {
        self.pause();
        self.state.remaining_seconds = self.config.duration_for(self.state.mode);
        info!("Timer reset to {}s ({})", self.state.remaining_seconds, self.state.mode.label());
        self.publish();
    }

    /// Jump to the other mode without reporting or notifying.
    /// Without break mode there is nothing to skip to, so this rewinds.
    pub fn skip(&mut self) {
        self.pause();
        if self.config.break_enabled() {
            self.state.mode = self.state.mode.flipped();
        }
        self.state.remaining_seconds = self.config.duration_for(self.state.mode);
        info!("Skipped to {} ({}s)", self.state.mode.label(), self.state.remaining_seconds);
        self.publish();
    }

    /// Stop the focus interval early and report the elapsed part of it
    pub fn finish(&mut self) -> Option<FocusSession> {
        if self.state.mode != TimerMode::Focus {
            return None;
        }
        let elapsed = self.focus_elapsed();
        if elapsed == 0 {
            return None;
        }

        self.pause();
        let session = FocusSession {
            duration_minutes: SessionCredit::Elapsed.minutes(&self.config, elapsed),
            task_id: self.task_id.clone(),
        };
        info!("Focus stopped early after {}s, crediting {} min",
              elapsed, session.duration_minutes);
        self.collaborators.sessions.submit(session.clone());

        self.state.remaining_seconds = self.config.focus_seconds;
        self.publish();
        Some(session)
    }

    /// Apply new interval lengths in minutes.
    ///
    /// A non-positive focus length or a negative break length is ignored.
    /// `None` keeps the current break length and zero disables break mode.
    /// A successful change resets to the start of a focus interval.
    pub fn set_duration(&mut self, focus_minutes: i64, break_minutes: Option<i64>) -> bool {
        if focus_minutes <= 0 || break_minutes.is_some_and(|b| b < 0) {
            debug!("Ignoring invalid duration: focus={} break={:?}", focus_minutes, break_minutes);
            return false;
        }

        let break_minutes = break_minutes
            .map(|b| b as u64)
            .unwrap_or(self.config.break_seconds / 60);
        let Some(config) = TimerConfig::from_minutes(focus_minutes as u64, break_minutes) else {
            return false;
        };

        self.pause();
        self.config = config;
        self.state = TimerState::new(&config);
        info!("Durations set: focus={}min break={}min", focus_minutes, break_minutes);
        self.publish();
        true
    }

    /// Task attached to sessions reported from now on
    pub fn set_task(&mut self, task_id: Option<String>) {
        debug!("Selected task: {:?}", task_id);
        self.task_id = task_id;
    }

    fn focus_elapsed(&self) -> u64 {
        self.config.focus_seconds.saturating_sub(self.state.remaining_seconds)
    }

    fn complete(&mut self) {
        let finished = self.state.mode;
        let elapsed = self.focus_elapsed();
        self.pause();
        info!("{} interval complete", finished.label());

        let message = match finished {
            TimerMode::Focus => FOCUS_DONE_MESSAGE,
            TimerMode::Break => BREAK_DONE_MESSAGE,
        };
        self.collaborators.notifier.notify(message);

        if finished == TimerMode::Focus {
            let session = FocusSession {
                duration_minutes: self.credit.minutes(&self.config, elapsed),
                task_id: self.task_id.clone(),
            };
            self.collaborators.sessions.submit(session);
        }

        if self.config.break_enabled() {
            self.state.mode = finished.flipped();
        }
        self.state.remaining_seconds = self.config.duration_for(self.state.mode);
        self.publish();
        self.collaborators.presentation.exit_fullscreen_if_active();
    }

    fn publish(&self) {
        self.display_tx.send_replace(DisplaySnapshot::of(&self.state));
    }
}
