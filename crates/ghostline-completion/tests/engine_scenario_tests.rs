//! Scenario tests for the completion request lifecycle
//!
//! Time-sensitive scenarios run on a paused clock so debounce and
//! acceptance timeouts are deterministic.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use ghostline_completion::{
    AmbientContext, ClipboardReader, CompletionEngine, CompletionOutcome, DocumentSnapshot,
    Position, StaticClipboard, TelemetryEvent, TelemetrySink, TriggerEvent, TriggerKind,
};
use ghostline_config::{EngineConfig, SettingsStore};
use ghostline_providers::{Capability, FimGateway, FimStream, ModelInfo, ProviderError};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }

    fn count(&self, event: TelemetryEvent) -> usize {
        self.events().iter().filter(|e| **e == event).count()
    }
}

impl TelemetrySink for RecordingSink {
    fn emit(&self, event: TelemetryEvent) {
        self.events.lock().unwrap().push(event);
    }
}

enum StubBehavior {
    /// Stream the given fragments, then end
    Fragments(Vec<&'static str>),
    /// Fail the request before any fragment arrives
    Fail(ProviderError),
    /// Open a stream that never yields and never ends
    Hang,
}

struct StubGateway {
    behavior: StubBehavior,
    supports: bool,
    load_fails: bool,
    requests: Mutex<Vec<(String, String)>>,
}

impl StubGateway {
    fn streaming(fragments: Vec<&'static str>) -> Self {
        Self {
            behavior: StubBehavior::Fragments(fragments),
            supports: true,
            load_fails: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(error: ProviderError) -> Self {
        Self {
            behavior: StubBehavior::Fail(error),
            supports: true,
            load_fails: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn hanging() -> Self {
        Self {
            behavior: StubBehavior::Hang,
            supports: true,
            load_fails: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn chat_only() -> Self {
        Self {
            supports: false,
            ..Self::streaming(vec![])
        }
    }

    fn unloadable() -> Self {
        Self {
            load_fails: true,
            ..Self::streaming(vec![])
        }
    }

    fn seen_requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FimGateway for StubGateway {
    fn supports_fim(&self) -> bool {
        self.supports
    }

    fn ensure_model_loaded(&self) -> Result<ModelInfo, ProviderError> {
        if self.load_fails {
            return Err(ProviderError::UnknownModel("stub-model".to_string()));
        }
        Ok(ModelInfo {
            id: "stub-model".to_string(),
            name: "Stub".to_string(),
            provider: "stub".to_string(),
            context_window: 32_768,
            max_output_tokens: 4_096,
            capabilities: if self.supports {
                vec![Capability::Code, Capability::Streaming, Capability::Fim]
            } else {
                vec![Capability::Chat]
            },
        })
    }

    async fn stream_fim(&self, prefix: &str, suffix: &str) -> Result<FimStream, ProviderError> {
        self.requests
            .lock()
            .unwrap()
            .push((prefix.to_string(), suffix.to_string()));
        match &self.behavior {
            StubBehavior::Fragments(fragments) => {
                let items: Vec<Result<String, ProviderError>> =
                    fragments.iter().map(|f| Ok(f.to_string())).collect();
                Ok(futures::stream::iter(items).boxed())
            }
            StubBehavior::Fail(error) => Err(error.clone()),
            StubBehavior::Hang => Ok(futures::stream::pending().boxed()),
        }
    }
}

struct TestHarness {
    engine: Arc<CompletionEngine>,
    gateway: Arc<StubGateway>,
    sink: Arc<RecordingSink>,
}

fn harness(gateway: StubGateway) -> TestHarness {
    harness_with(gateway, EngineConfig::default())
}

fn harness_with(gateway: StubGateway, config: EngineConfig) -> TestHarness {
    let gateway = Arc::new(gateway);
    let sink = Arc::new(RecordingSink::default());
    let clipboard: Arc<dyn ClipboardReader> = Arc::new(StaticClipboard::empty());
    let engine = CompletionEngine::new(
        SettingsStore::new(config),
        gateway.clone(),
        clipboard,
        sink.clone(),
    );
    TestHarness {
        engine,
        gateway,
        sink,
    }
}

fn trigger(document_text: &str, user_text: &str) -> TriggerEvent {
    TriggerEvent {
        kind: TriggerKind::Keystroke,
        document: DocumentSnapshot {
            file_path: "src/main.rs".to_string(),
            language_id: "rust".to_string(),
            text: document_text.to_string(),
        },
        cursor: Position::new(0, document_text.chars().count() as u32),
        user_text: user_text.to_string(),
        prompt_override: None,
        ambient: AmbientContext::default(),
    }
}

/// Let spawned triggers reach their debounce sleep before acting further.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_disabled_auto_trigger_suppresses_without_telemetry() {
    let mut config = EngineConfig::default();
    config.completion.auto_trigger = false;
    let h = harness_with(StubGateway::streaming(vec!["unused"]), config);

    let outcome = h.engine.provide_completion(trigger("fn main() {", "")).await;
    assert!(matches!(outcome, CompletionOutcome::Suppressed));
    assert!(h.sink.events().is_empty());
    assert!(h.gateway.seen_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delimited_stream_yields_suggestion_and_accept_reports_once() {
    let h = harness(StubGateway::streaming(vec![
        "<<<SUGGESTION>>>\n'hello world'\n",
        "<<<END_SUGGESTION>>>",
    ]));

    let outcome = h
        .engine
        .provide_completion(trigger("const test = ", "const test = "))
        .await;
    let suggestion = outcome.suggestion().expect("suggestion expected");
    assert_eq!(suggestion.cleaned_text, "'hello world'");
    assert!(suggestion.shown);

    // Nothing is reported until the accept action fires.
    assert!(h.sink.events().is_empty());
    assert!(h.engine.notify_accepted(suggestion.request_id));
    assert_eq!(h.sink.count(TelemetryEvent::AcceptSuggestion), 1);
    assert_eq!(h.sink.count(TelemetryEvent::RejectSuggestion), 0);

    // A duplicate accept signal is a no-op.
    assert!(!h.engine.notify_accepted(suggestion.request_id));
    assert_eq!(h.sink.events().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_token_stream_reports_single_immediate_rejection() {
    let h = harness(StubGateway::streaming(vec![]));

    let outcome = h.engine.provide_completion(trigger("let x = ", "")).await;
    assert!(matches!(outcome, CompletionOutcome::Empty));
    assert_eq!(h.sink.events(), vec![TelemetryEvent::RejectSuggestion]);
    // No timeout was armed.
    assert_eq!(h.engine.tracker().pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unaccepted_suggestion_rejects_at_timeout_and_not_before() {
    let h = harness(StubGateway::streaming(vec!["completed_value"]));

    let outcome = h
        .engine
        .provide_completion(trigger("let x = ", "let x = "))
        .await;
    let suggestion = outcome.suggestion().expect("suggestion expected").clone();

    tokio::time::sleep(Duration::from_secs(9)).await;
    assert!(h.sink.events().is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.sink.events(), vec![TelemetryEvent::RejectSuggestion]);

    // An accept arriving after the timeout resolved is a no-op.
    assert!(!h.engine.notify_accepted(suggestion.request_id));
    assert_eq!(h.sink.events().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_second_trigger_supersedes_first_within_debounce() {
    let h = harness(StubGateway::streaming(vec!["fragment"]));

    let engine = h.engine.clone();
    let first = tokio::spawn(async move {
        engine
            .provide_completion(trigger("first document", "first "))
            .await
    });
    settle().await;

    let second = h
        .engine
        .provide_completion(trigger("second document", "second "))
        .await;

    assert!(second.suggestion().is_some());
    assert!(matches!(first.await.unwrap(), CompletionOutcome::Cancelled));

    // Only the second trigger's context ever reached the transport.
    let requests = h.gateway.seen_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "second document");
}

#[tokio::test(start_paused = true)]
async fn test_mid_stream_cancellation_reports_nothing() {
    let h = harness(StubGateway::hanging());

    let engine = h.engine.clone();
    let pending = tokio::spawn(async move {
        engine
            .provide_completion(trigger("stalled document", ""))
            .await
    });
    // Get past the debounce and into the stream read loop.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(h.gateway.seen_requests().len(), 1);

    h.engine.cancel_active();
    assert!(matches!(pending.await.unwrap(), CompletionOutcome::Cancelled));
    assert!(h.sink.events().is_empty());
    assert_eq!(h.engine.tracker().pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_new_trigger_rejects_pending_shown_suggestion() {
    let h = harness(StubGateway::streaming(vec!["first_value"]));

    let outcome = h
        .engine
        .provide_completion(trigger("let a = ", "let a = "))
        .await;
    assert!(outcome.suggestion().is_some());
    assert!(h.sink.events().is_empty());

    // The user kept typing: the shown suggestion resolves as rejected
    // before the new request produces anything.
    let second = h
        .engine
        .provide_completion(trigger("let ab = ", "let ab = "))
        .await;
    assert!(second.suggestion().is_some());
    assert_eq!(h.sink.count(TelemetryEvent::RejectSuggestion), 1);
    assert_eq!(h.sink.count(TelemetryEvent::AcceptSuggestion), 0);
    assert_eq!(h.engine.tracker().pending_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fim_unsupported_model_suppresses_with_rejection() {
    let h = harness(StubGateway::chat_only());

    let outcome = h.engine.provide_completion(trigger("let x = ", "")).await;
    assert!(matches!(outcome, CompletionOutcome::Suppressed));
    assert_eq!(h.sink.events(), vec![TelemetryEvent::RejectSuggestion]);
    assert!(h.gateway.seen_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_model_load_failure_suppresses_with_rejection() {
    let h = harness(StubGateway::unloadable());

    let outcome = h.engine.provide_completion(trigger("let x = ", "")).await;
    assert!(matches!(outcome, CompletionOutcome::Suppressed));
    assert_eq!(h.sink.events(), vec![TelemetryEvent::RejectSuggestion]);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_degrades_to_empty_with_rejection() {
    let h = harness(StubGateway::failing(ProviderError::Http {
        status: 500,
        body: "upstream exploded".to_string(),
    }));

    let outcome = h.engine.provide_completion(trigger("let x = ", "")).await;
    assert!(matches!(outcome, CompletionOutcome::Empty));
    assert_eq!(h.sink.events(), vec![TelemetryEvent::RejectSuggestion]);
}

#[tokio::test(start_paused = true)]
async fn test_echoed_prefix_is_stripped_from_suggestion() {
    let h = harness(StubGateway::streaming(vec!["const test = 'value'"]));

    let outcome = h
        .engine
        .provide_completion(trigger("const test = ", "const test = "))
        .await;
    let suggestion = outcome.suggestion().expect("suggestion expected");
    assert_eq!(suggestion.cleaned_text, "'value'");
}
