//! Fullscreen presentation flag shared with the host

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::engine::Presentation;

#[derive(Debug)]
pub struct FullscreenState {
    supported: bool,
    active: AtomicBool,
}

impl FullscreenState {
    pub fn new(supported: bool) -> Self {
        Self { supported, active: AtomicBool::new(false) }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns false when the host has no fullscreen capability
    pub fn enter(&self) -> bool {
        if !self.supported {
            debug!("Fullscreen not supported by host");
            return false;
        }
        self.active.store(true, Ordering::SeqCst);
        true
    }

    pub fn exit(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl Default for FullscreenState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Presentation for FullscreenState {
    fn exit_fullscreen_if_active(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!("Leaving fullscreen");
        }
    }
}
