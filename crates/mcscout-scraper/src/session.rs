//! Single-session control surface shared by the CLI and the HTTP server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mcscout_core::{AcquisitionRequest, AppConfig, CarrierRecord};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::acquisition::{run_acquisition, Pacer, ProgressEvent, StopSignal, Summary};
use crate::error::SessionError;
use crate::workflow::CarrierScraper;

/// Point-in-time view of the session for polling clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub scraping_active: bool,
    pub data_count: usize,
    pub last_event: Option<ProgressEvent>,
}

/// State shared between the manager and its running scan task.
///
/// Only the scan task appends records or updates the last event; readers get
/// whatever is there when they look.
#[derive(Debug, Default)]
pub struct SessionContext {
    active: AtomicBool,
    stop: StopSignal,
    records: Mutex<Vec<CarrierRecord>>,
    last_event: Mutex<Option<ProgressEvent>>,
}

impl SessionContext {
    fn records(&self) -> MutexGuard<'_, Vec<CarrierRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn last_event(&self) -> MutexGuard<'_, Option<ProgressEvent>> {
        self.last_event.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observe(&self, event: &ProgressEvent) {
        if let Some(record) = &event.record {
            self.records().push(record.clone());
        }
        *self.last_event() = Some(event.clone());
    }
}

/// Owns at most one running scan at a time.
pub struct SessionManager {
    config: AppConfig,
    context: Arc<SessionContext>,
}

impl SessionManager {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            context: Arc::new(SessionContext::default()),
        }
    }

    /// Starts a scan on a background task.
    ///
    /// Records from the previous scan are discarded. `on_progress` sees every
    /// per-identifier event after it has been recorded; `on_complete` fires
    /// exactly once, after the session has been marked inactive.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidRequest`] when the range is inverted.
    /// - [`SessionError::AlreadyActive`] when a scan is still running.
    /// - [`SessionError::Client`] when the HTTP client cannot be built.
    pub fn start_session<P, C>(
        &self,
        request: AcquisitionRequest,
        mut on_progress: P,
        on_complete: C,
    ) -> Result<JoinHandle<()>, SessionError>
    where
        P: FnMut(ProgressEvent) + Send + 'static,
        C: FnOnce(Summary) + Send + 'static,
    {
        request.validate()?;

        if self
            .context
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SessionError::AlreadyActive);
        }

        let scraper = match CarrierScraper::from_config(&self.config) {
            Ok(scraper) => scraper,
            Err(e) => {
                self.context.active.store(false, Ordering::SeqCst);
                return Err(e.into());
            }
        };

        self.context.records().clear();
        *self.context.last_event() = None;
        self.context.stop.reset();

        let context = Arc::clone(&self.context);
        let pacing = Duration::from_millis(self.config.pacing_delay_ms);

        Ok(tokio::spawn(async move {
            let completion_context = Arc::clone(&context);
            let on_complete = Box::new(move |summary: Summary| {
                completion_context.active.store(false, Ordering::SeqCst);
                on_complete(summary);
            });
            let progress_context = Arc::clone(&context);
            let on_progress = move |event: ProgressEvent| {
                progress_context.observe(&event);
                on_progress(event);
            };

            let mut pacer = Pacer::new(pacing);
            run_acquisition(
                &scraper,
                request,
                &context.stop,
                &mut pacer,
                on_progress,
                on_complete,
            )
            .await;
        }))
    }

    /// Asks the running scan to stop after its current identifier.
    ///
    /// Returns immediately; `false` when no scan was running.
    pub fn stop_session(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        tracing::info!("stop requested");
        self.context.stop.stop();
        true
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.context.active.load(Ordering::SeqCst)
    }

    /// Accepted records of the current (or last) scan.
    #[must_use]
    pub fn records(&self) -> Vec<CarrierRecord> {
        self.context.records().clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            scraping_active: self.is_active(),
            data_count: self.context.records().len(),
            last_event: self.context.last_event().clone(),
        }
    }
}
