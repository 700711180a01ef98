//! The sequential scan loop that drives lookups across an MC range.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use mcscout_core::{AcquisitionRequest, CarrierRecord};
use serde::Serialize;

use crate::workflow::{CarrierLookup, LookupOutcome};

/// Cooperative cancellation flag shared between a scan and its controller.
///
/// Checked once at the top of every iteration; a lookup already in flight
/// runs to completion.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fixed wait between identifiers.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    waits: u64,
}

impl Pacer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval, waits: 0 }
    }

    pub async fn wait(&mut self) {
        self.waits += 1;
        tokio::time::sleep(self.interval).await;
    }

    /// Number of waits taken so far.
    #[must_use]
    pub fn waits(&self) -> u64 {
        self.waits
    }
}

/// Per-identifier status, rendered with the labels the UI has always shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ProgressStatus {
    Valid,
    NotFound,
    Filtered,
    Error(String),
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::Valid => f.write_str("valid"),
            ProgressStatus::NotFound => f.write_str("Not found"),
            ProgressStatus::Filtered => f.write_str("Invalid (filtered out)"),
            ProgressStatus::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

impl From<ProgressStatus> for String {
    fn from(status: ProgressStatus) -> Self {
        status.to_string()
    }
}

/// Emitted once for every identifier checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    #[serde(rename = "mc_number")]
    pub identifier: u64,
    pub status: ProgressStatus,
    /// Present only for accepted records.
    pub record: Option<CarrierRecord>,
}

impl ProgressEvent {
    #[must_use]
    pub fn from_outcome(identifier: u64, outcome: LookupOutcome) -> Self {
        let (status, record) = match outcome {
            LookupOutcome::Found(record) => (ProgressStatus::Valid, Some(*record)),
            LookupOutcome::NotFound(_) => (ProgressStatus::NotFound, None),
            LookupOutcome::Rejected(_) => (ProgressStatus::Filtered, None),
            LookupOutcome::TransportFailure(message) => (ProgressStatus::Error(message), None),
        };
        Self {
            identifier,
            status,
            record,
        }
    }
}

/// Why a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    RangeExhausted,
    Stopped,
    /// The next identifier would not fit in a `u64`.
    IdentifierOverflow,
    /// The scan task unwound before reaching a normal exit.
    Aborted,
}

/// Final tally handed to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub checked: u64,
    pub found: u64,
    pub last_identifier: Option<u64>,
    pub reason: CompletionReason,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            checked: 0,
            found: 0,
            last_identifier: None,
            reason: CompletionReason::Aborted,
        }
    }
}

pub type CompletionCallback = Box<dyn FnOnce(Summary) + Send>;

/// Fires the completion callback exactly once, when dropped.
///
/// Dropping during a panic still fires it, with whatever was tallied and a
/// reason of [`CompletionReason::Aborted`].
pub struct CompletionGuard {
    summary: Summary,
    on_complete: Option<CompletionCallback>,
}

impl CompletionGuard {
    #[must_use]
    pub fn new(on_complete: CompletionCallback) -> Self {
        Self {
            summary: Summary::default(),
            on_complete: Some(on_complete),
        }
    }

    fn record(&mut self, identifier: u64, event: &ProgressEvent) {
        self.summary.checked += 1;
        self.summary.last_identifier = Some(identifier);
        if event.status == ProgressStatus::Valid {
            self.summary.found += 1;
        }
    }

    fn finish(&mut self, reason: CompletionReason) {
        self.summary.reason = reason;
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(std::mem::take(&mut self.summary));
        }
    }
}

/// Scans `request`'s range one identifier at a time.
///
/// Each identifier gets exactly one lookup, one progress event, and one
/// pacing wait, in that order. The stop signal is checked before each lookup.
/// A lookup that panics is reported as an `Error` event for its identifier and
/// the scan moves on. `on_complete` fires exactly once however the loop ends.
pub async fn run_acquisition<L, P>(
    lookup: &L,
    request: AcquisitionRequest,
    stop: &StopSignal,
    pacer: &mut Pacer,
    mut on_progress: P,
    on_complete: CompletionCallback,
) where
    L: CarrierLookup,
    P: FnMut(ProgressEvent),
{
    let mut guard = CompletionGuard::new(on_complete);
    tracing::info!(
        start = request.start_identifier,
        end = ?request.end_identifier,
        entity_type = %request.entity_type,
        "scan started"
    );

    let mut next = Some(request.start_identifier);
    let reason = loop {
        let Some(identifier) = next else {
            tracing::warn!("identifier space exhausted");
            break CompletionReason::IdentifierOverflow;
        };
        if stop.is_stopped() {
            break CompletionReason::Stopped;
        }
        if !request.includes(identifier) {
            break CompletionReason::RangeExhausted;
        }

        tracing::debug!(identifier, "checking identifier");
        let attempt = async { lookup.lookup(identifier, request.entity_type).await };
        let outcome = AssertUnwindSafe(attempt)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!(identifier, error = %message, "lookup panicked");
                LookupOutcome::TransportFailure(message)
            });
        let event = ProgressEvent::from_outcome(identifier, outcome);
        guard.record(identifier, &event);
        on_progress(event);

        pacer.wait().await;
        next = identifier.checked_add(1);
    };

    guard.finish(reason);
    tracing::info!(
        checked = guard.summary.checked,
        found = guard.summary.found,
        ?reason,
        "scan finished"
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("lookup panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("lookup panicked: {message}")
    } else {
        "lookup panicked".to_owned()
    }
}

#[cfg(test)]
#[path = "acquisition_test.rs"]
mod tests;
