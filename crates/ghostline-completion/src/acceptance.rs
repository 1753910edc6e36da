//! Acceptance tracking and telemetry
//!
//! Correlates a shown suggestion with a later accept signal or a timeout,
//! and reports exactly one of accept/reject per shown-or-attempted
//! suggestion. Resolution is idempotent: the accept signal, the timeout
//! task, and the supersede path race, and the first one wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::types::RequestId;

/// Telemetry event names; the minimal contract carries no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryEvent {
    AcceptSuggestion,
    RejectSuggestion,
}

/// Sink for telemetry events
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: TelemetryEvent);
}

/// Terminal outcome of a shown suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceOutcome {
    Accepted,
    Rejected,
}

struct PendingRecord {
    armed_at: DateTime<Utc>,
    timeout_task: JoinHandle<()>,
}

/// Tracks pending acceptance records for shown suggestions.
///
/// A record exists only while pending; resolving it removes it, so a
/// second resolution attempt finds nothing and is a no-op.
pub struct AcceptanceTracker {
    records: Mutex<HashMap<RequestId, PendingRecord>>,
    sink: Arc<dyn TelemetrySink>,
    timeout: Duration,
}

impl AcceptanceTracker {
    pub fn new(sink: Arc<dyn TelemetrySink>, timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(HashMap::new()),
            sink,
            timeout,
        })
    }

    /// Arm tracking for a shown suggestion: record it as pending and start
    /// the rejection timeout.
    pub fn arm(self: &Arc<Self>, request_id: RequestId) {
        let tracker = Arc::clone(self);
        let timeout = self.timeout;
        let timeout_task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if tracker.resolve(request_id, AcceptanceOutcome::Rejected) {
                debug!(%request_id, "suggestion timed out without acceptance");
            }
        });
        let mut records = self.lock_records();
        records.insert(
            request_id,
            PendingRecord {
                armed_at: Utc::now(),
                timeout_task,
            },
        );
    }

    /// External accept signal for a shown suggestion.
    ///
    /// Returns whether this call performed the resolution.
    pub fn accept(&self, request_id: RequestId) -> bool {
        self.resolve(request_id, AcceptanceOutcome::Accepted)
    }

    /// A new trigger superseded the shown suggestion: the user moved on,
    /// which counts as rejection.
    pub fn supersede(&self, request_id: RequestId) -> bool {
        self.resolve(request_id, AcceptanceOutcome::Rejected)
    }

    /// No suggestion was available for an attempted request: report the
    /// rejection immediately, with no pending state and no timeout.
    pub fn report_absent(&self) {
        self.sink.emit(TelemetryEvent::RejectSuggestion);
    }

    /// Number of records still pending
    pub fn pending_count(&self) -> usize {
        self.lock_records().len()
    }

    fn resolve(&self, request_id: RequestId, outcome: AcceptanceOutcome) -> bool {
        let record = self.lock_records().remove(&request_id);
        let Some(record) = record else {
            // Already resolved by a racing path.
            return false;
        };
        record.timeout_task.abort();
        let event = match outcome {
            AcceptanceOutcome::Accepted => TelemetryEvent::AcceptSuggestion,
            AcceptanceOutcome::Rejected => TelemetryEvent::RejectSuggestion,
        };
        let resolved_at = Utc::now();
        trace!(
            %request_id,
            ?outcome,
            pending_since = %record.armed_at,
            %resolved_at,
            "resolved acceptance record"
        );
        self.sink.emit(event);
        true
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, HashMap<RequestId, PendingRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
