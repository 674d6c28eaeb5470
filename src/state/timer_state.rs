//! Timer configuration, countdown state and the display projection

use serde::{Deserialize, Serialize};

/// Default focus interval length in minutes
pub const DEFAULT_FOCUS_MINUTES: u64 = 25;
/// Default break interval length in minutes
pub const DEFAULT_BREAK_MINUTES: u64 = 5;
/// Longest accepted interval in minutes
pub const MAX_INTERVAL_MINUTES: u64 = 24 * 60;

/// Which kind of interval is counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Focus,
    Break,
}

impl TimerMode {
    /// Label shown next to the clock in the window title
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focusing",
            TimerMode::Break => "On break",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            TimerMode::Focus => TimerMode::Break,
            TimerMode::Break => TimerMode::Focus,
        }
    }
}

/// Interval lengths. A zero break length disables break mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub focus_seconds: u64,
    pub break_seconds: u64,
}

impl TimerConfig {
    /// Build a config from minutes, rejecting a zero focus length and
    /// anything longer than a day
    pub fn from_minutes(focus_minutes: u64, break_minutes: u64) -> Option<Self> {
        if focus_minutes == 0 || focus_minutes > MAX_INTERVAL_MINUTES || break_minutes > MAX_INTERVAL_MINUTES {
            return None;
        }
        Some(Self {
            focus_seconds: focus_minutes.checked_mul(60)?,
            break_seconds: break_minutes.checked_mul(60)?,
        })
    }

    pub fn break_enabled(&self) -> bool {
        self.break_seconds > 0
    }

    /// Length of an interval in the given mode
    pub fn duration_for(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Focus => self.focus_seconds,
            TimerMode::Break => self.break_seconds,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_seconds: DEFAULT_FOCUS_MINUTES * 60,
            break_seconds: DEFAULT_BREAK_MINUTES * 60,
        }
    }
}

/// Countdown state owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub remaining_seconds: u64,
    pub running: bool,
}

impl TimerState {
    /// Create a paused state at the start of a focus interval
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            mode: TimerMode::Focus,
            remaining_seconds: config.focus_seconds,
            running: false,
        }
    }

    /// True while a focus interval is actively counting down
    pub fn is_armed(&self) -> bool {
        self.running && self.mode == TimerMode::Focus
    }
}

/// A completed (or credited) focus interval handed to the session reporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    #[serde(rename = "duration")]
    pub duration_minutes: u64,
    pub task_id: Option<String>,
}

/// How many minutes a finished focus interval is credited with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SessionCredit {
    /// The configured focus length, regardless of what actually elapsed
    Configured,
    /// Seconds actually counted down, rounded to minutes, at least one
    #[default]
    Elapsed,
}

impl SessionCredit {
    pub fn minutes(&self, config: &TimerConfig, elapsed_seconds: u64) -> u64 {
        match self {
            SessionCredit::Configured => (config.focus_seconds / 60).max(1),
            SessionCredit::Elapsed => elapsed_minutes(elapsed_seconds),
        }
    }
}

/// `max(1, round(seconds / 60))`, rounding half up
pub fn elapsed_minutes(elapsed_seconds: u64) -> u64 {
    ((elapsed_seconds + 30) / 60).max(1)
}

/// Format seconds as a zero-padded `MM:SS` clock
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Everything a host needs to render the timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub clock: String,
    pub title: String,
    pub mode: TimerMode,
    pub remaining_seconds: u64,
    pub running: bool,
    pub armed: bool,
}

impl DisplaySnapshot {
    pub fn of(state: &TimerState) -> Self {
        let clock = format_clock(state.remaining_seconds);
        Self {
            title: format!("{} - {}", clock, state.mode.label()),
            clock,
            mode: state.mode,
            remaining_seconds: state.remaining_seconds,
            running: state.running,
            armed: state.is_armed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(120 * 60 + 9), "120:09");
    }

    #[test]
    fn title_carries_mode_label() {
        let config = TimerConfig::default();
        let mut state = TimerState::new(&config);
        assert_eq!(DisplaySnapshot::of(&state).title, "25:00 - Focusing");

        state.mode = TimerMode::Break;
        state.remaining_seconds = 299;
        assert_eq!(DisplaySnapshot::of(&state).title, "04:59 - On break");
    }

    #[test]
    fn armed_only_while_focus_is_running() {
        let config = TimerConfig::default();
        let mut state = TimerState::new(&config);
        assert!(!state.is_armed());
        state.running = true;
        assert!(state.is_armed());
        state.mode = TimerMode::Break;
        assert!(!state.is_armed());
    }

    #[test]
    fn zero_focus_is_rejected() {
        assert!(TimerConfig::from_minutes(0, 5).is_none());
        let config = TimerConfig::from_minutes(1, 0).unwrap();
        assert!(!config.break_enabled());
        assert_eq!(config.duration_for(TimerMode::Focus), 60);
    }

    #[test]
    fn oversized_lengths_are_rejected() {
        assert!(TimerConfig::from_minutes(MAX_INTERVAL_MINUTES + 1, 5).is_none());
        assert!(TimerConfig::from_minutes(25, MAX_INTERVAL_MINUTES + 1).is_none());
        assert!(TimerConfig::from_minutes(u64::MAX, 0).is_none());
        let config = TimerConfig::from_minutes(MAX_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES).unwrap();
        assert_eq!(config.focus_seconds, 86_400);
    }

    #[test]
    fn elapsed_credit_rounds_and_floors_at_one() {
        assert_eq!(elapsed_minutes(0), 1);
        assert_eq!(elapsed_minutes(29), 1);
        assert_eq!(elapsed_minutes(60), 1);
        assert_eq!(elapsed_minutes(89), 1);
        assert_eq!(elapsed_minutes(90), 2);
        assert_eq!(elapsed_minutes(1500), 25);

        let config = TimerConfig::from_minutes(25, 5).unwrap();
        assert_eq!(SessionCredit::Configured.minutes(&config, 600), 25);
        assert_eq!(SessionCredit::Elapsed.minutes(&config, 600), 10);
    }

    #[test]
    fn session_serializes_with_backend_field_names() {
        let session = FocusSession { duration_minutes: 25, task_id: None };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json, serde_json::json!({ "duration": 25, "task_id": null }));
    }
}
