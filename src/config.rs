//! Configuration and CLI argument handling

use clap::Parser;

use crate::{
    services::NotificationPermission,
    state::{SessionCredit, TimerConfig, DEFAULT_FOCUS_MINUTES, MAX_INTERVAL_MINUTES},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focus-timer")]
#[command(about = "A focus/break countdown timer with a distraction guard")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Focus interval in minutes
    #[arg(short, long, default_value_t = DEFAULT_FOCUS_MINUTES,
          value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_MINUTES))]
    pub focus: u64,

    /// Break interval in minutes, 0 disables break mode
    #[arg(short = 'b', long = "break", default_value = "5",
          value_parser = clap::value_parser!(u64).range(0..=MAX_INTERVAL_MINUTES))]
    pub break_minutes: u64,

    /// Base URL of the session backend
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub backend: String,

    /// How finished focus intervals are credited
    #[arg(long, value_enum, default_value_t = SessionCredit::Elapsed)]
    pub credit: SessionCredit,

    /// Desktop notification permission. Desktop sessions grant on first use,
    /// so `default` ends up as `granted` with the desktop backend.
    #[arg(long, value_enum, default_value_t = NotificationPermission::Default)]
    pub notifications: NotificationPermission,

    /// Do not play a chime with completion notifications
    #[arg(long = "no-sound", action = clap::ArgAction::SetFalse)]
    pub sound: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::from_minutes(self.focus.max(1), self.break_minutes).unwrap_or_default()
    }
}
