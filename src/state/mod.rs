//! State management module
//!
//! Timer data model, the display projection and the composition root that
//! owns the single engine instance.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::{
    format_clock, DisplaySnapshot, FocusSession, SessionCredit, TimerConfig, TimerMode, TimerState,
    DEFAULT_BREAK_MINUTES, DEFAULT_FOCUS_MINUTES, MAX_INTERVAL_MINUTES,
};
