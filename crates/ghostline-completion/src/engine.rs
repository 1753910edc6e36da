//! Completion orchestration
//!
//! The state machine per trigger: `Idle → Debouncing → Requesting →
//! {Completed, Cancelled, Suppressed}`. Exactly one request occupies
//! Debouncing/Requesting at a time; a new trigger supersedes the previous
//! one rather than queueing behind it. Cancellation is cooperative: the
//! stream consumer checks the request's cancellation token between
//! fragment reads.

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use ghostline_config::SettingsStore;
use ghostline_providers::FimGateway;

use crate::acceptance::{AcceptanceTracker, TelemetrySink};
use crate::clipboard::ClipboardReader;
use crate::context::ContextBuilder;
use crate::processor;
use crate::types::{
    CompletionOutcome, CompletionRequest, RequestId, Suggestion, TriggerEvent,
};

struct ActiveRequest {
    request_id: RequestId,
    cancel: CancellationToken,
}

/// Orchestrates the completion request lifecycle.
///
/// The engine owns the "current active request" slot exclusively; it is a
/// mutex-guarded field, never shared ambient state, so the single-writer
/// discipline holds on multi-threaded runtimes too.
pub struct CompletionEngine {
    settings: SettingsStore,
    gateway: Arc<dyn FimGateway>,
    context_builder: ContextBuilder,
    tracker: Arc<AcceptanceTracker>,
    active: Mutex<Option<ActiveRequest>>,
    last_shown: Mutex<Option<RequestId>>,
}

impl CompletionEngine {
    pub fn new(
        settings: SettingsStore,
        gateway: Arc<dyn FimGateway>,
        clipboard: Arc<dyn ClipboardReader>,
        sink: Arc<dyn TelemetrySink>,
    ) -> Arc<Self> {
        let timeout = settings.completion().acceptance_timeout();
        Arc::new(Self {
            settings,
            gateway,
            context_builder: ContextBuilder::new(clipboard),
            tracker: AcceptanceTracker::new(sink, timeout),
            active: Mutex::new(None),
            last_shown: Mutex::new(None),
        })
    }

    /// Handle one trigger event through the full lifecycle.
    ///
    /// Returns the suggestion to show, an empty result, or the suppression
    /// or cancellation outcome; the acceptance tracker is armed before a
    /// non-empty suggestion is handed back.
    pub async fn provide_completion(&self, trigger: TriggerEvent) -> CompletionOutcome {
        let request_id = RequestId::new();
        let cancel = self.begin_request(request_id);

        // Debouncing: wait out the keystroke burst, last trigger wins.
        let debounce = self.settings.completion().debounce();
        tokio::select! {
            _ = cancel.cancelled() => return self.finish_cancelled(request_id),
            _ = tokio::time::sleep(debounce) => {}
        }

        // Admission gates, in order. The disabled flag suppresses silently;
        // the capability gates count as an attempted suggestion.
        if !self.settings.auto_trigger_enabled() {
            trace!(%request_id, "auto-trigger disabled, suppressing");
            self.clear_active(request_id);
            return CompletionOutcome::Suppressed;
        }
        let model = match self.gateway.ensure_model_loaded() {
            Ok(model) => model,
            Err(e) => {
                debug!(%request_id, error = %e, "model unavailable, suppressing");
                self.clear_active(request_id);
                self.tracker.report_absent();
                return CompletionOutcome::Suppressed;
            }
        };
        if !self.gateway.supports_fim() {
            debug!(%request_id, model = %model.id, "model lacks fim support, suppressing");
            self.clear_active(request_id);
            self.tracker.report_absent();
            return CompletionOutcome::Suppressed;
        }

        // Requesting: build context, open the stream, fold fragments.
        let prompt = self.context_builder.build(&trigger);
        let request = CompletionRequest::new(request_id, &trigger, prompt);
        debug!(
            %request_id,
            file = %request.file_path,
            line = request.cursor.line,
            "requesting completion"
        );

        let mut stream = match self.gateway.stream_fim(&request.prefix, &request.suffix).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(%request_id, error = %e, "fim request failed");
                self.clear_active(request_id);
                self.tracker.report_absent();
                return CompletionOutcome::Empty;
            }
        };

        let mut raw = String::new();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return self.finish_cancelled(request_id),
                fragment = stream.next() => match fragment {
                    Some(Ok(text)) => raw.push_str(&text),
                    Some(Err(e)) => {
                        warn!(%request_id, error = %e, "fim stream failed");
                        self.clear_active(request_id);
                        self.tracker.report_absent();
                        return CompletionOutcome::Empty;
                    }
                    None => break,
                },
            }
        }

        self.finish_completed(request_id, raw, &trigger.user_text)
    }

    /// Accept hook for the host's bound accept action.
    ///
    /// Returns whether a pending record was resolved by this call.
    pub fn notify_accepted(&self, request_id: RequestId) -> bool {
        self.tracker.accept(request_id)
    }

    /// Explicit editor-side cancellation of the in-flight request, if any
    pub fn cancel_active(&self) {
        let active = self.lock_active();
        if let Some(request) = active.as_ref() {
            trace!(request_id = %request.request_id, "cancelling active request");
            request.cancel.cancel();
        }
    }

    /// The acceptance tracker backing this engine
    pub fn tracker(&self) -> &Arc<AcceptanceTracker> {
        &self.tracker
    }

    /// Claim the active slot: cancel any in-flight request and resolve a
    /// still-pending shown suggestion as rejected (the user moved on).
    fn begin_request(&self, request_id: RequestId) -> CancellationToken {
        let cancel = CancellationToken::new();
        {
            let mut active = self.lock_active();
            if let Some(previous) = active.take() {
                trace!(
                    superseded = %previous.request_id,
                    by = %request_id,
                    "superseding in-flight request"
                );
                previous.cancel.cancel();
            }
            *active = Some(ActiveRequest {
                request_id,
                cancel: cancel.clone(),
            });
        }
        if let Some(shown) = self.lock_last_shown().take() {
            self.tracker.supersede(shown);
        }
        cancel
    }

    fn finish_cancelled(&self, request_id: RequestId) -> CompletionOutcome {
        // Cancellation is not rejection: nothing was shown, nothing is
        // reported.
        trace!(%request_id, "request cancelled");
        self.clear_active(request_id);
        CompletionOutcome::Cancelled
    }

    fn finish_completed(
        &self,
        request_id: RequestId,
        raw: String,
        user_text: &str,
    ) -> CompletionOutcome {
        let cleaned = processor::clean(processor::parse(&raw), user_text);
        self.clear_active(request_id);

        if cleaned.is_empty() {
            debug!(%request_id, "generation produced nothing usable");
            self.tracker.report_absent();
            return CompletionOutcome::Empty;
        }

        // Arm tracking before the suggestion is handed back, so an accept
        // signal can never outrun the record.
        self.tracker.arm(request_id);
        *self.lock_last_shown() = Some(request_id);
        debug!(%request_id, len = cleaned.len(), "suggestion ready");
        CompletionOutcome::Suggestion(Suggestion {
            request_id,
            raw_text: raw,
            cleaned_text: cleaned,
            shown: true,
        })
    }

    /// Release the active slot if this request still owns it; a newer
    /// trigger may have replaced it already.
    fn clear_active(&self, request_id: RequestId) {
        let mut active = self.lock_active();
        if active.as_ref().map(|a| a.request_id) == Some(request_id) {
            *active = None;
        }
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveRequest>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_last_shown(&self) -> std::sync::MutexGuard<'_, Option<RequestId>> {
        self.last_shown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
