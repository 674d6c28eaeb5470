use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use clap::Parser;
use focus_timer::{
    config::Config,
    services::{
        notifier::{NotificationBackend, NotificationPermission},
        FocusStats, ReportError, SessionBackend,
    },
    state::{AppState, FocusSession, TimerMode},
    tasks::tick_source_task,
};

#[derive(Default)]
struct RecordingBackend {
    saved: Mutex<Vec<FocusSession>>,
}

#[async_trait]
impl SessionBackend for RecordingBackend {
    async fn save_session(&self, session: &FocusSession) -> Result<(), ReportError> {
        self.saved.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<FocusStats, ReportError> {
        let saved = self.saved.lock().unwrap();
        Ok(FocusStats {
            completed_sessions: saved.len() as u64,
            today_duration: saved.iter().map(|s| s.duration_minutes).sum(),
            completion_rate: 50,
        })
    }
}

#[derive(Default)]
struct CountingNotifications {
    shown: Mutex<Vec<String>>,
}

impl NotificationBackend for CountingNotifications {
    fn request_permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn show(&self, message: &str, _sound: bool) -> Result<(), String> {
        self.shown.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

struct Harness {
    state: Arc<AppState>,
    backend: Arc<RecordingBackend>,
    notifications: Arc<CountingNotifications>,
}

async fn harness(args: &[&str]) -> Harness {
    let config = Config::parse_from(std::iter::once("focus-timer").chain(args.iter().copied()));
    let backend = Arc::new(RecordingBackend::default());
    let notifications = Arc::new(CountingNotifications::default());
    let state = Arc::new(AppState::new(&config, backend.clone(), notifications.clone()));

    tokio::spawn(tick_source_task(Arc::clone(&state.engine)));
    tokio::task::yield_now().await;

    Harness { state, backend, notifications }
}

async fn advance_secs(secs: u64) {
    for _ in 0..secs {
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
    }
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn pomodoro_completes_into_break() {
    let h = harness(&["--focus", "25", "--break", "5", "--notifications", "granted"]).await;
    let mut stats_rx = h.state.reporter.subscribe_stats();

    h.state.start().unwrap();
    advance_secs(1499).await;
    let (_, timer) = h.state.get_timer().unwrap();
    assert_eq!(timer.mode, TimerMode::Focus);
    assert_eq!(timer.remaining_seconds, 1);
    assert!(h.backend.saved.lock().unwrap().is_empty());

    advance_secs(1).await;
    let (_, timer) = h.state.get_timer().unwrap();
    assert_eq!(timer.mode, TimerMode::Break);
    assert_eq!(timer.remaining_seconds, 300);
    assert!(!timer.running);

    stats_rx.changed().await.unwrap();
    assert_eq!(
        h.backend.saved.lock().unwrap().clone(),
        vec![FocusSession { duration_minutes: 25, task_id: None }]
    );
    assert_eq!(h.state.get_stats().map(|s| s.today_duration), Some(25));
    assert_eq!(h.state.toasts.active().as_deref(), Some("Focus time is over. Take a break now!"));

    // Nothing else happens while paused in break mode
    advance_secs(600).await;
    settle().await;
    assert_eq!(h.backend.saved.lock().unwrap().len(), 1);
    assert_eq!(h.state.get_timer().unwrap().1.remaining_seconds, 300);
}

#[tokio::test(start_paused = true)]
async fn focus_only_with_pause_and_resume() {
    let h = harness(&["--focus", "1", "--break", "0"]).await;

    h.state.start().unwrap();
    advance_secs(10).await;
    h.state.pause().unwrap();
    advance_secs(20).await;
    assert_eq!(h.state.get_timer().unwrap().1.remaining_seconds, 50);

    h.state.start().unwrap();
    advance_secs(49).await;
    assert!(h.backend.saved.lock().unwrap().is_empty());
    advance_secs(1).await;
    settle().await;

    let (_, timer) = h.state.get_timer().unwrap();
    assert_eq!(timer.mode, TimerMode::Focus);
    assert_eq!(timer.remaining_seconds, 60);
    assert!(!timer.running);
    assert_eq!(
        h.backend.saved.lock().unwrap().clone(),
        vec![FocusSession { duration_minutes: 1, task_id: None }]
    );
}

#[tokio::test(start_paused = true)]
async fn fullscreen_is_left_on_completion() {
    let h = harness(&["--focus", "1", "--notifications", "granted"]).await;
    assert!(h.state.fullscreen.enter());

    h.state.start().unwrap();
    advance_secs(60).await;
    settle().await;

    assert!(!h.state.fullscreen.is_active());
    assert_eq!(h.state.toasts.active().as_deref(), Some("Focus time is over. Take a break now!"));
}

#[tokio::test]
async fn denied_permission_never_reaches_the_desktop() {
    let h = harness(&["--focus", "1", "--notifications", "denied"]).await;
    h.state.start().unwrap();
    {
        let mut engine = h.state.engine.lock().unwrap();
        let epoch = (*engine.subscribe_schedule().borrow()).unwrap();
        for _ in 0..60 {
            engine.tick(epoch);
        }
    }

    assert_eq!(h.state.get_timer().unwrap().1.mode, TimerMode::Break);
    assert!(h.notifications.shown.lock().unwrap().is_empty());
    assert!(h.state.toasts.active().is_some());
}

#[tokio::test(start_paused = true)]
async fn abandoned_focus_is_not_recorded() {
    use focus_timer::engine::{DialogClose, GuardAction, InputEvent, Verdict};

    let h = harness(&["--focus", "1"]).await;
    h.state.set_task(Some("3".to_string())).unwrap();
    h.state.start().unwrap();
    advance_secs(20).await;

    let verdict = h.state.handle_input(&InputEvent::click("nav-profile")).unwrap();
    assert_eq!(verdict, Verdict::Pending(GuardAction::AbandonFocus));

    // The timer keeps running while the dialog is open
    advance_secs(5).await;
    assert_eq!(h.state.get_timer().unwrap().1.remaining_seconds, 35);

    let verdict = h.state.resolve_dialog(DialogClose::Confirm).unwrap();
    assert_eq!(verdict, Some(Verdict::Confirmed(GuardAction::AbandonFocus)));
    advance_secs(60).await;
    settle().await;

    assert_eq!(h.state.get_timer().unwrap().1.remaining_seconds, 35);
    assert!(h.backend.saved.lock().unwrap().is_empty());
}
