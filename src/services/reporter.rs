//! Session reporting against the remote focus backend

use std::{sync::Arc, time::Duration};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{runtime::Handle, sync::watch};
use tracing::{debug, info, warn};

use crate::{engine::SessionSink, state::FocusSession};

const SAVE_SESSION_PATH: &str = "/focus/save_session";
const STATS_PATH: &str = "/focus/stats";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend rejected session ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Aggregate statistics shown next to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FocusStats {
    pub completed_sessions: u64,
    /// Minutes focused today
    pub today_duration: u64,
    /// Percent, 0-100
    pub completion_rate: u8,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    message: String,
}

#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn save_session(&self, session: &FocusSession) -> Result<(), ReportError>;

    async fn fetch_stats(&self) -> Result<FocusStats, ReportError>;
}

/// Backend reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpSessionBackend {
    client: Client,
    base_url: String,
}

impl HttpSessionBackend {
    pub fn new(base_url: &str) -> Result<Self, ReportError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SessionBackend for HttpSessionBackend {
    async fn save_session(&self, session: &FocusSession) -> Result<(), ReportError> {
        let response = self
            .client
            .post(self.url(SAVE_SESSION_PATH))
            .json(session)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match response.json::<ErrorPayload>().await {
            Ok(payload) => payload.message,
            Err(_) => "no error message from backend".to_string(),
        };
        Err(ReportError::Rejected { status: status.as_u16(), message })
    }

    async fn fetch_stats(&self) -> Result<FocusStats, ReportError> {
        let stats = self
            .client
            .get(self.url(STATS_PATH))
            .send()
            .await?
            .error_for_status()?
            .json::<FocusStats>()
            .await?;
        Ok(stats)
    }
}

/// Sends finished sessions to the backend and keeps the statistics current.
/// Reports are one-shot: failures are logged and never retried.
#[derive(Clone)]
pub struct SessionReporter {
    backend: Arc<dyn SessionBackend>,
    stats_tx: Arc<watch::Sender<Option<FocusStats>>>,
}

impl SessionReporter {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        let (stats_tx, _) = watch::channel(None);
        Self { backend, stats_tx: Arc::new(stats_tx) }
    }

    /// Last statistics successfully fetched
    pub fn stats(&self) -> Option<FocusStats> {
        *self.stats_tx.borrow()
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<Option<FocusStats>> {
        self.stats_tx.subscribe()
    }

    /// Persist one session, then refresh the statistics
    pub async fn report_session(&self, session: FocusSession) -> Result<FocusStats, ReportError> {
        info!("Reporting focus session: {} min, task={:?}",
              session.duration_minutes, session.task_id);

        if let Err(e) = self.backend.save_session(&session).await {
            warn!("Failed to save focus session: {}", e);
            return Err(e);
        }

        debug!("Focus session saved");
        self.refresh_stats().await
    }

    /// Fetch statistics and publish them. Keeps the old values on failure.
    pub async fn refresh_stats(&self) -> Result<FocusStats, ReportError> {
        match self.backend.fetch_stats().await {
            Ok(stats) => {
                debug!("Focus stats updated: {:?}", stats);
                self.stats_tx.send_replace(Some(stats));
                Ok(stats)
            }
            Err(e) => {
                warn!("Failed to fetch focus stats: {}", e);
                Err(e)
            }
        }
    }
}

impl SessionSink for SessionReporter {
    fn submit(&self, session: FocusSession) {
        match Handle::try_current() {
            Ok(handle) => {
                let reporter = self.clone();
                handle.spawn(async move {
                    let _ = reporter.report_session(session).await;
                });
            }
            Err(_) => {
                warn!("No runtime to report from, dropping {} min session", session.duration_minutes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        saved: Mutex<Vec<FocusSession>>,
        reject_saves: bool,
        stats: Mutex<Option<FocusStats>>,
        stats_calls: Mutex<u32>,
    }

    #[async_trait]
    impl SessionBackend for FakeBackend {
        async fn save_session(&self, session: &FocusSession) -> Result<(), ReportError> {
            if self.reject_saves {
                return Err(ReportError::Rejected { status: 400, message: "Invalid focus duration".to_string() });
            }
            self.saved.lock().unwrap().push(session.clone());
            Ok(())
        }

        async fn fetch_stats(&self) -> Result<FocusStats, ReportError> {
            *self.stats_calls.lock().unwrap() += 1;
            self.stats.lock().unwrap().ok_or(ReportError::Rejected {
                status: 500,
                message: "stats unavailable".to_string(),
            })
        }
    }

    fn session(minutes: u64) -> FocusSession {
        FocusSession { duration_minutes: minutes, task_id: Some("7".to_string()) }
    }

    const STATS: FocusStats = FocusStats { completed_sessions: 3, today_duration: 75, completion_rate: 40 };

    #[tokio::test]
    async fn successful_report_refreshes_stats() {
        let backend = Arc::new(FakeBackend::default());
        *backend.stats.lock().unwrap() = Some(STATS);
        let reporter = SessionReporter::new(backend.clone());

        let stats = reporter.report_session(session(25)).await.unwrap();
        assert_eq!(stats, STATS);
        assert_eq!(reporter.stats(), Some(STATS));
        assert_eq!(backend.saved.lock().unwrap().clone(), vec![session(25)]);
    }

    #[tokio::test]
    async fn rejected_report_keeps_previous_stats() {
        let backend = Arc::new(FakeBackend { reject_saves: true, ..Default::default() });
        *backend.stats.lock().unwrap() = Some(STATS);
        let reporter = SessionReporter::new(backend.clone());
        reporter.refresh_stats().await.unwrap();

        let err = reporter.report_session(session(25)).await.unwrap_err();
        assert!(err.to_string().contains("Invalid focus duration"));
        assert_eq!(reporter.stats(), Some(STATS));
        // No stats fetch after a failed save, and no retry
        assert_eq!(*backend.stats_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn stats_failure_keeps_last_known_values() {
        let backend = Arc::new(FakeBackend::default());
        *backend.stats.lock().unwrap() = Some(STATS);
        let reporter = SessionReporter::new(backend.clone());
        reporter.refresh_stats().await.unwrap();

        *backend.stats.lock().unwrap() = None;
        assert!(reporter.report_session(session(5)).await.is_err());
        assert_eq!(reporter.stats(), Some(STATS));
        assert_eq!(backend.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn submit_reports_in_the_background() {
        let backend = Arc::new(FakeBackend::default());
        *backend.stats.lock().unwrap() = Some(STATS);
        let reporter = SessionReporter::new(backend.clone());
        let mut stats_rx = reporter.subscribe_stats();

        reporter.submit(session(25));
        stats_rx.changed().await.unwrap();
        assert_eq!(*stats_rx.borrow(), Some(STATS));
    }

    #[test]
    fn submit_without_runtime_is_dropped_quietly() {
        let backend = Arc::new(FakeBackend::default());
        let reporter = SessionReporter::new(backend.clone());
        reporter.submit(session(25));
        assert!(backend.saved.lock().unwrap().is_empty());
    }

    #[test]
    fn stats_deserialize_from_backend_json() {
        let json = r#"{"today_duration": 50, "completed_sessions": 2, "completion_rate": 100}"#;
        let stats: FocusStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats, FocusStats { completed_sessions: 2, today_duration: 50, completion_rate: 100 });
    }
}
