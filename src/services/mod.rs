//! External collaborators
//!
//! The session backend, desktop notifications and the fullscreen flag the
//! timer engine talks to.

pub mod fullscreen;
pub mod notifier;
pub mod reporter;

// Re-export main types
pub use fullscreen::FullscreenState;
pub use notifier::{DesktopBackend, DesktopNotifier, NotificationPermission, ToastBoard};
pub use reporter::{FocusStats, HttpSessionBackend, ReportError, SessionBackend, SessionReporter};
