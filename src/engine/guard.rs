//! Distraction guard
//!
//! While a focus interval is running, stray key presses and clicks are
//! held back behind a confirmation dialog. Confirming abandons the interval
//! (it will not be recorded); cancelling leaves everything as it was.
//!
//! Two dialog contracts are supported. `handle_with` asks a synchronous
//! [`ConfirmDialog`] and returns the final verdict. `intercept` opens a
//! modal and returns [`Verdict::Pending`]; the host answers later through
//! `resolve`. Interception is suspended while a modal is open, so clicks
//! and keys inside the dialog are never intercepted themselves.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::TimerEngine;

/// Shown for every intercepted action
pub const WARNING_MESSAGE: &str = "Are you sure to proceed? If so, the duration of your current study will not be included in the records.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// Id of the clicked element, empty if it has none
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Ambient input forwarded by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputEvent {
    Key(KeyEvent),
    Click(ClickEvent),
}

impl InputEvent {
    pub fn key(key: &str) -> Self {
        InputEvent::Key(KeyEvent { key: key.to_string(), ctrl: false, meta: false })
    }

    pub fn click(target: &str) -> Self {
        InputEvent::Click(ClickEvent { target: target.to_string(), ..Default::default() })
    }
}

/// What runs when an open dialog is confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardAction {
    /// Pause the focus interval so the host can carry on with the input
    AbandonFocus,
    /// Rewind the current interval
    Reset,
}

/// Every way a modal can close. Only `Confirm` runs the guarded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogClose {
    Confirm,
    Cancel,
    Dismiss,
    Escape,
    Overlay,
}

/// Result of showing an input event to the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "action", rename_all = "snake_case")]
pub enum Verdict {
    /// Not intercepted, the host performs the default action
    Allowed,
    /// Reset click while unarmed, the engine was reset directly
    Reset,
    /// Intercepted, a modal is open and waiting for `resolve`
    Pending(GuardAction),
    /// Confirmed and the action ran
    Confirmed(GuardAction),
    /// Cancelled, nothing changed
    Cancelled(GuardAction),
}

impl Verdict {
    /// Whether the host must suppress the event's default action
    pub fn prevents_default(&self) -> bool {
        match self {
            Verdict::Allowed => false,
            Verdict::Confirmed(action) => *action == GuardAction::Reset,
            _ => true,
        }
    }

    /// Reset clicks never reach other handlers
    pub fn stops_propagation(&self) -> bool {
        matches!(
            self,
            Verdict::Reset
                | Verdict::Pending(GuardAction::Reset)
                | Verdict::Confirmed(GuardAction::Reset)
                | Verdict::Cancelled(GuardAction::Reset)
        )
    }
}

/// Synchronous yes/no prompt
pub trait ConfirmDialog {
    fn confirm(&self, message: &str) -> bool;
}

/// What passes through while the guard is armed
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub allowed_keys: Vec<String>,
    pub allowed_targets: Vec<String>,
    pub allowed_classes: Vec<String>,
    pub reset_target: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            allowed_keys: [" ", "Escape", "F11"].map(String::from).to_vec(),
            allowed_targets: ["start", "pause", "set-custom-time", "custom-minutes", "task-select"]
                .map(String::from)
                .to_vec(),
            allowed_classes: vec!["preset-btn".to_string()],
            reset_target: "reset".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct InputGuard {
    config: GuardConfig,
    open_dialog: Option<GuardAction>,
    prompts: u64,
}

impl InputGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config, open_dialog: None, prompts: 0 }
    }

    /// Action waiting on the open modal, if any
    pub fn open_dialog(&self) -> Option<GuardAction> {
        self.open_dialog
    }

    /// False while a modal is open
    pub fn is_listening(&self) -> bool {
        self.open_dialog.is_none()
    }

    /// Number of dialogs shown so far
    pub fn prompts(&self) -> u64 {
        self.prompts
    }

    /// Route a user-initiated reset through the guard. While a modal is open
    /// nothing happens and the pending verdict for that modal is returned.
    pub fn request_reset(&mut self, engine: &mut TimerEngine) -> Verdict {
        if let Some(action) = self.open_dialog {
            debug!("Reset requested while {:?} dialog is open", action);
            return Verdict::Pending(action);
        }
        let event = InputEvent::click(&self.config.reset_target.clone());
        self.intercept(engine, &event)
    }

    /// Evaluate an event, opening a modal if it needs confirmation
    pub fn intercept(&mut self, engine: &mut TimerEngine, event: &InputEvent) -> Verdict {
        if !self.is_listening() {
            if let InputEvent::Key(key) = event {
                if key.key == "Escape" {
                    return self.resolve(engine, DialogClose::Escape).unwrap_or(Verdict::Allowed);
                }
            }
            return Verdict::Allowed;
        }

        if self.is_reset_click(event) {
            if !engine.is_armed() {
                engine.reset();
                return Verdict::Reset;
            }
            return self.open(GuardAction::Reset);
        }

        if !engine.is_armed() || self.is_allowed(event) {
            return Verdict::Allowed;
        }

        debug!("Intercepted {:?} during focus", event);
        self.open(GuardAction::AbandonFocus)
    }

    /// Close the open modal. Returns `None` if no modal was open.
    pub fn resolve(&mut self, engine: &mut TimerEngine, close: DialogClose) -> Option<Verdict> {
        let action = self.open_dialog.take()?;

        if close != DialogClose::Confirm {
            info!("Guard dialog closed via {:?}, keeping focus interval", close);
            return Some(Verdict::Cancelled(action));
        }

        match action {
            GuardAction::AbandonFocus => {
                info!("User abandoned focus interval");
                engine.pause();
            }
            GuardAction::Reset => engine.reset(),
        }
        Some(Verdict::Confirmed(action))
    }

    /// Evaluate an event, answering any dialog synchronously
    pub fn handle_with(
        &mut self,
        engine: &mut TimerEngine,
        event: &InputEvent,
        dialog: &dyn ConfirmDialog,
    ) -> Verdict {
        match self.intercept(engine, event) {
            Verdict::Pending(action) => {
                let close = if dialog.confirm(WARNING_MESSAGE) {
                    DialogClose::Confirm
                } else {
                    DialogClose::Cancel
                };
                self.resolve(engine, close).unwrap_or(Verdict::Cancelled(action))
            }
            verdict => verdict,
        }
    }

    fn open(&mut self, action: GuardAction) -> Verdict {
        self.open_dialog = Some(action);
        self.prompts += 1;
        info!("Asking for confirmation before {:?}", action);
        Verdict::Pending(action)
    }

    fn is_reset_click(&self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Click(click) => {
                click.target == self.config.reset_target
                    || click.parent.as_deref() == Some(self.config.reset_target.as_str())
            }
            InputEvent::Key(_) => false,
        }
    }

    fn is_allowed(&self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(key) => {
                key.ctrl || key.meta || self.config.allowed_keys.contains(&key.key)
            }
            InputEvent::Click(click) => {
                let listed = |id: &str| self.config.allowed_targets.iter().any(|t| t == id);
                listed(click.target.as_str())
                    || click.parent.as_deref().is_some_and(listed)
                    || click.classes.iter().any(|c| self.config.allowed_classes.contains(c))
            }
        }
    }
}
