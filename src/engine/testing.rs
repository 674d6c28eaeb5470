//! Recording collaborators for engine and guard tests

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use super::{Collaborators, Notifier, Presentation, SessionSink};
use crate::state::FocusSession;

#[derive(Clone, Default)]
pub struct Recorder {
    notifications: Arc<Mutex<Vec<String>>>,
    sessions: Arc<Mutex<Vec<FocusSession>>>,
    fullscreen_exits: Arc<AtomicUsize>,
}

impl Recorder {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            notifier: Arc::new(self.clone()),
            sessions: Arc::new(self.clone()),
            presentation: Arc::new(self.clone()),
        }
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn sessions(&self) -> Vec<FocusSession> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn fullscreen_exits(&self) -> usize {
        self.fullscreen_exits.load(Ordering::SeqCst)
    }
}

impl Notifier for Recorder {
    fn notify(&self, message: &str) {
        self.notifications.lock().unwrap().push(message.to_string());
    }
}

impl SessionSink for Recorder {
    fn submit(&self, session: FocusSession) {
        self.sessions.lock().unwrap().push(session);
    }
}

impl Presentation for Recorder {
    fn exit_fullscreen_if_active(&self) {
        self.fullscreen_exits.fetch_add(1, Ordering::SeqCst);
    }
}
