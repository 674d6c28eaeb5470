//! focus-timer - a focus/break countdown timer with a distraction guard
//!
//! This library provides the countdown engine, the input guard that protects
//! a running focus interval, session reporting to a remote backend, and the
//! HTTP control surface that ties them together.

pub mod api;
pub mod config;
pub mod engine;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::{InputGuard, TimerEngine};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
