//! Timer core
//!
//! The countdown state machine, the distraction guard that sits in front of
//! it, and the collaborator seams the engine calls out to on completion.

pub mod guard;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use guard::{
    ClickEvent, ConfirmDialog, DialogClose, GuardAction, GuardConfig, InputEvent, InputGuard,
    KeyEvent, Verdict, WARNING_MESSAGE,
};
pub use timer::{Collaborators, TickOutcome, TimerEngine};

use crate::state::FocusSession;

/// Fire-and-forget user notification
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Receives finished focus sessions. Must not block the caller.
pub trait SessionSink: Send + Sync {
    fn submit(&self, session: FocusSession);
}

/// Best-effort fullscreen presentation
pub trait Presentation: Send + Sync {
    fn exit_fullscreen_if_active(&self);
}
