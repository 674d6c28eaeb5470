//! Main application state: the one timer, its guard and collaborators

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    config::Config,
    engine::{Collaborators, DialogClose, GuardConfig, InputEvent, InputGuard, TimerEngine, Verdict},
    services::{
        notifier::NotificationBackend, DesktopNotifier, FocusStats, FullscreenState,
        SessionBackend, SessionReporter, ToastBoard,
    },
};
use super::{DisplaySnapshot, SessionCredit, TimerConfig, TimerState};

/// Composition root. Built once at startup and shared by the HTTP handlers
/// and the tick source task.
pub struct AppState {
    /// The countdown engine
    pub engine: Arc<Mutex<TimerEngine>>,
    /// Distraction guard; always locked before `engine`
    pub guard: Arc<Mutex<InputGuard>>,
    pub reporter: SessionReporter,
    pub toasts: Arc<ToastBoard>,
    pub fullscreen: Arc<FullscreenState>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Wire the engine to its collaborators
    pub fn new(
        config: &Config,
        backend: Arc<dyn SessionBackend>,
        notifications: Arc<dyn NotificationBackend>,
    ) -> Self {
        let toasts = Arc::new(ToastBoard::default());
        let fullscreen = Arc::new(FullscreenState::default());
        let reporter = SessionReporter::new(backend);

        let collaborators = Collaborators {
            notifier: Arc::new(DesktopNotifier::new(
                config.notifications,
                config.sound,
                notifications,
                Arc::clone(&toasts),
            )),
            sessions: Arc::new(reporter.clone()),
            presentation: fullscreen.clone(),
        };
        let engine = TimerEngine::new(config.timer_config(), config.credit, collaborators);

        Self {
            engine: Arc::new(Mutex::new(engine)),
            guard: Arc::new(Mutex::new(InputGuard::new(GuardConfig::default()))),
            reporter,
            toasts,
            fullscreen,
            start_time: Instant::now(),
            port: config.port,
            host: config.host.clone(),
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Run `f` against the engine and record `action` as the last action
    pub fn with_engine<F, R>(&self, action: &str, f: F) -> Result<R, String>
    where
        F: FnOnce(&mut TimerEngine) -> R,
    {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;
        let result = f(&mut engine);
        drop(engine);

        self.record_action(action);
        Ok(result)
    }

    /// Run `f` against the guard and the engine, locking in that order
    pub fn with_guard<F, R>(&self, action: &str, f: F) -> Result<R, String>
    where
        F: FnOnce(&mut InputGuard, &mut TimerEngine) -> R,
    {
        let mut guard = self.guard.lock()
            .map_err(|e| format!("Failed to lock input guard: {}", e))?;
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;
        let result = f(&mut guard, &mut engine);
        drop(engine);
        drop(guard);

        self.record_action(action);
        Ok(result)
    }

    pub fn start(&self) -> Result<bool, String> {
        self.with_engine("start", |engine| engine.start())
    }

    pub fn pause(&self) -> Result<bool, String> {
        self.with_engine("pause", |engine| engine.pause())
    }

    pub fn skip(&self) -> Result<(), String> {
        self.with_engine("skip", |engine| engine.skip())
    }

    pub fn finish(&self) -> Result<bool, String> {
        self.with_engine("finish", |engine| engine.finish().is_some())
    }

    pub fn set_duration(&self, focus_minutes: i64, break_minutes: Option<i64>) -> Result<bool, String> {
        self.with_engine("duration", |engine| engine.set_duration(focus_minutes, break_minutes))
    }

    pub fn set_task(&self, task_id: Option<String>) -> Result<(), String> {
        self.with_engine("task", |engine| engine.set_task(task_id))
    }

    /// User-initiated reset, confirmed first during a running focus interval
    pub fn request_reset(&self) -> Result<Verdict, String> {
        self.with_guard("reset", |guard, engine| guard.request_reset(engine))
    }

    /// Forward a host input event to the guard
    pub fn handle_input(&self, event: &InputEvent) -> Result<Verdict, String> {
        self.with_guard("input", |guard, engine| guard.intercept(engine, event))
    }

    /// Close the open guard dialog
    pub fn resolve_dialog(&self, close: DialogClose) -> Result<Option<Verdict>, String> {
        self.with_guard("dialog", |guard, engine| guard.resolve(engine, close))
    }

    /// Get current display projection
    pub fn get_display(&self) -> Result<DisplaySnapshot, String> {
        self.engine.lock()
            .map(|engine| engine.display())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Get current config and countdown state
    pub fn get_timer(&self) -> Result<(TimerConfig, TimerState), String> {
        self.engine.lock()
            .map(|engine| (engine.config(), engine.state()))
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Config, display and credit policy read under one lock
    pub fn get_status(&self) -> Result<(TimerConfig, DisplaySnapshot, SessionCredit), String> {
        self.engine.lock()
            .map(|engine| (engine.config(), engine.display(), engine.credit()))
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Whether a guard dialog is waiting for an answer
    pub fn get_open_dialog(&self) -> Result<Option<crate::engine::GuardAction>, String> {
        self.guard.lock()
            .map(|guard| guard.open_dialog())
            .map_err(|e| format!("Failed to lock input guard: {}", e))
    }

    pub fn get_stats(&self) -> Option<FocusStats> {
        self.reporter.stats()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Pause the timer on the way out and log where it stopped
    pub fn shutdown(&self) {
        if let Ok(mut engine) = self.engine.lock() {
            if engine.pause() {
                let snapshot = engine.display();
                info!("Paused running timer at {} ({})", snapshot.clock, snapshot.mode.label());
            }
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }
}
