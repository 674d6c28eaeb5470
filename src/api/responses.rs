//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{DialogClose, GuardAction, Verdict, WARNING_MESSAGE},
    services::FocusStats,
    state::{DisplaySnapshot, SessionCredit},
};

/// Response for timer control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: DisplaySnapshot,
}

impl ApiResponse {
    pub fn new(status: &str, message: impl Into<String>, timer: DisplaySnapshot) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            timer,
        }
    }

    /// The control took effect
    pub fn ok(message: impl Into<String>, timer: DisplaySnapshot) -> Self {
        Self::new("ok", message, timer)
    }

    /// The control was a no-op in the current state
    pub fn ignored(message: impl Into<String>, timer: DisplaySnapshot) -> Self {
        Self::new("ignored", message, timer)
    }
}

/// Response for input forwarding, reset and dialog endpoints
#[derive(Debug, Clone, Serialize)]
pub struct GuardResponse {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub prevent_default: bool,
    pub stop_propagation: bool,
    /// Warning to show while a dialog is open
    pub dialog_message: Option<String>,
    pub timer: DisplaySnapshot,
}

impl GuardResponse {
    pub fn new(verdict: Verdict, timer: DisplaySnapshot) -> Self {
        Self {
            verdict,
            prevent_default: verdict.prevents_default(),
            stop_propagation: verdict.stops_propagation(),
            dialog_message: matches!(verdict, Verdict::Pending(_)).then(|| WARNING_MESSAGE.to_string()),
            timer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationRequest {
    pub focus_minutes: i64,
    #[serde(default)]
    pub break_minutes: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(default)]
    pub task_id: Option<String>,
}

/// How a dialog was dismissed; defaults to the cancel button
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    #[serde(default = "default_close")]
    pub via: DialogClose,
}

fn default_close() -> DialogClose {
    DialogClose::Cancel
}

/// Full status with timer, guard and statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: DisplaySnapshot,
    pub focus_minutes: u64,
    pub break_minutes: u64,
    pub credit: SessionCredit,
    pub open_dialog: Option<GuardAction>,
    pub stats: Option<FocusStats>,
    pub toast: Option<String>,
    pub fullscreen: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
