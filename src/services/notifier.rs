//! Completion notifications: desktop notification plus a short-lived toast

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use notify_rust::{Notification, Timeout};
use serde::{Deserialize, Serialize};
use tokio::{runtime::Handle, time::Instant};
use tracing::{debug, info};

use crate::engine::Notifier;

/// How long a toast stays visible
pub const TOAST_TTL: Duration = Duration::from_secs(3);

const APP_NAME: &str = "focus-timer";

/// Freedesktop sound theme name played with completion notifications
pub const COMPLETION_SOUND: &str = "message-new-instant";

/// Permission to show OS-level notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    Granted,
    /// Not decided yet, ask on first use
    Default,
    Denied,
}

/// Where OS notifications actually go
pub trait NotificationBackend: Send + Sync {
    fn request_permission(&self) -> NotificationPermission;

    /// Show `message`, with the completion chime when `sound` is set
    fn show(&self, message: &str, sound: bool) -> Result<(), String>;
}

/// Freedesktop/macOS/Windows notifications through notify-rust.
///
/// Desktop sessions have no permission prompt, so a `Default` permission
/// always resolves to `Granted` on first use. Run with
/// `--notifications denied` to keep notifications off the desktop.
#[derive(Debug, Default)]
pub struct DesktopBackend;

impl NotificationBackend for DesktopBackend {
    fn request_permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn show(&self, message: &str, sound: bool) -> Result<(), String> {
        let mut notification = Notification::new();
        notification
            .summary("Focus Timer")
            .body(message)
            .appname(APP_NAME)
            .icon("alarm-clock")
            .timeout(Timeout::Milliseconds(TOAST_TTL.as_millis() as u32));
        if sound {
            notification.sound_name(COMPLETION_SOUND);
        }
        notification
            .show()
            .map(|_| ())
            .map_err(|e| format!("Failed to show notification: {}", e))
    }
}

/// The most recent message, visible for [`TOAST_TTL`]
#[derive(Debug, Default)]
pub struct ToastBoard {
    current: Mutex<Option<(String, Instant)>>,
}

impl ToastBoard {
    pub fn post(&self, message: &str) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = Some((message.to_string(), Instant::now()));
    }

    /// The toast still on screen, if any
    pub fn active(&self) -> Option<String> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        match current.as_ref() {
            Some((message, posted)) if posted.elapsed() < TOAST_TTL => Some(message.clone()),
            Some(_) => {
                *current = None;
                None
            }
            None => None,
        }
    }
}

/// Notifier with a browser-style permission state machine
pub struct DesktopNotifier {
    permission: Mutex<NotificationPermission>,
    sound: bool,
    backend: Arc<dyn NotificationBackend>,
    toasts: Arc<ToastBoard>,
}

impl DesktopNotifier {
    pub fn new(
        permission: NotificationPermission,
        sound: bool,
        backend: Arc<dyn NotificationBackend>,
        toasts: Arc<ToastBoard>,
    ) -> Self {
        Self { permission: Mutex::new(permission), sound, backend, toasts }
    }

    pub fn permission(&self) -> NotificationPermission {
        *self.permission.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn resolve_permission(&self) -> NotificationPermission {
        let mut permission = self.permission.lock().unwrap_or_else(|e| e.into_inner());
        if *permission == NotificationPermission::Default {
            *permission = self.backend.request_permission();
            info!("Notification permission is now {:?}", *permission);
        }
        *permission
    }

    fn show(&self, message: &str) {
        let backend = Arc::clone(&self.backend);
        let message = message.to_string();
        let sound = self.sound;
        let show = move || {
            if let Err(e) = backend.show(&message, sound) {
                debug!("{}", e);
            }
        };

        // The desktop call can block on the session bus; keep it off the caller
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(show);
            }
            Err(_) => show(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, message: &str) {
        self.toasts.post(message);

        match self.resolve_permission() {
            NotificationPermission::Granted => self.show(message),
            permission => debug!("Skipping desktop notification ({:?})", permission),
        }
    }
}
