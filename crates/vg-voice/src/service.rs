//! Remote-first greeting generation with local fallback

use chrono::{DateTime, Local};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use vg_config::VoiceConfig;
use vg_core::clip;
use vg_openai::{
    ClientConfig, ModelResolver, PromptRequest, ResponsesClient, TextGenerationBackend, Verbosity,
    DEFAULT_CACHE_HOURS,
};
use vg_selector::NonRepeatingSelector;
use vg_state_store::{SharedStateStore, StateStoreExt};

use crate::failure::GenerationFailure;
use crate::local::LocalGenerator;
use crate::memo::{MemoEntry, VoiceMemo};
use crate::prompt::Prompt;
use crate::request::{GreetingDecision, GreetingRequest};

/// Greeting cap on the remote path when the request sets none
pub const REMOTE_MAX_GREETING_CHARS: usize = 140;

/// Decision cap on the remote path when the request sets none
pub const REMOTE_MAX_DECISION_CHARS: usize = 520;

/// Timeout of the greeting request when the request sets none
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(9000);

/// Where a result came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationSource {
    Remote { model: String },
    Local { reason: GenerationFailure },
}

impl GenerationSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, GenerationSource::Remote { .. })
    }
}

/// Produces greeting/decision pairs
///
/// Owns the model cache, the voice memo and the selector bags; one
/// instance per process is the normal setup.
pub struct VoiceService {
    backend: Arc<dyn TextGenerationBackend>,
    states: Option<SharedStateStore>,
    resolver: ModelResolver,
    selector: NonRepeatingSelector,
    memo: VoiceMemo,
}

impl VoiceService {
    pub fn new(backend: Arc<dyn TextGenerationBackend>) -> Self {
        Self {
            backend,
            states: None,
            resolver: ModelResolver::new(DEFAULT_CACHE_HOURS),
            selector: NonRepeatingSelector::new(),
            memo: VoiceMemo::new(),
        }
    }

    /// Build the service against the Responses API as configured
    pub fn from_config(config: &VoiceConfig) -> Self {
        let openai = &config.openai;
        let mut client_config = ClientConfig::default().with_base_url(openai.base_url.as_str());
        client_config.json_timeout = Duration::from_millis(openai.timeout_ms);

        Self::new(Arc::new(ResponsesClient::new(client_config)))
            .with_model_cache_hours(openai.model_cache_hours)
    }

    /// Read credentials referenced by `api_key_state` from this store
    pub fn with_state_store(mut self, states: SharedStateStore) -> Self {
        self.states = Some(states);
        self
    }

    pub fn with_selector(mut self, selector: NonRepeatingSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_model_cache_hours(mut self, hours: u32) -> Self {
        self.resolver = ModelResolver::new(hours);
        self
    }

    pub fn selector(&self) -> &NonRepeatingSelector {
        &self.selector
    }

    pub fn memo(&self) -> &VoiceMemo {
        &self.memo
    }

    /// Generate a greeting and decision; never fails
    pub async fn generate_greeting_decision(&self, request: &GreetingRequest) -> GreetingDecision {
        self.generate(request).await.0
    }

    /// Like [`generate_greeting_decision`](Self::generate_greeting_decision),
    /// also reporting where the text came from
    #[instrument(skip(self, request), fields(room = %request.room(), station = %request.station()))]
    pub async fn generate(&self, request: &GreetingRequest) -> (GreetingDecision, GenerationSource) {
        let now = request.now();
        let key = request.memo_key(&now);
        let previous = self.memo.get(&key);

        match self.remote(request, &now, previous.as_ref()).await {
            Ok((output, model)) => {
                debug!(%model, "Remote greeting accepted");
                self.memo.record(&key, &output);
                (output, GenerationSource::Remote { model })
            }
            Err(reason) => {
                let output = LocalGenerator::new(&self.selector).generate(request);
                match &reason {
                    GenerationFailure::CredentialMissing | GenerationFailure::ModelUnresolvable => {
                        debug!(%reason, "Using local greeting");
                        self.memo.record(&key, &output);
                    }
                    GenerationFailure::DuplicateOutput => {
                        debug!(%reason, "Using local greeting");
                    }
                    GenerationFailure::Network(_) | GenerationFailure::MalformedResponse(_) => {
                        warn!(%reason, "Remote greeting failed, using local greeting");
                    }
                }
                (output, GenerationSource::Local { reason })
            }
        }
    }

    /// Forget cached models, memo entries and selector bags
    pub fn reset(&self) {
        self.resolver.reset();
        self.memo.reset();
        self.selector.reset();
        info!("Voice service state reset");
    }

    async fn remote(
        &self,
        request: &GreetingRequest,
        now: &DateTime<Local>,
        previous: Option<&MemoEntry>,
    ) -> Result<(GreetingDecision, String), GenerationFailure> {
        let api_key = self
            .credential(request)
            .await
            .ok_or(GenerationFailure::CredentialMissing)?;

        let model = self
            .resolver
            .resolve(
                self.backend.as_ref(),
                &api_key,
                request.model_desired.as_deref(),
                &request.model_prefer,
            )
            .await?
            .ok_or(GenerationFailure::ModelUnresolvable)?;

        let (max_greeting, max_decision) =
            request.caps(REMOTE_MAX_GREETING_CHARS, REMOTE_MAX_DECISION_CHARS);

        let prompt = Prompt::new(request, now, max_greeting, max_decision);
        let prompt_request = PromptRequest::new(model.as_str(), prompt.instructions, prompt.input)
            .with_verbosity(Verbosity::Medium)
            .with_timeout(request.timeout.unwrap_or(DEFAULT_TIMEOUT));

        let reply = self
            .backend
            .respond_json_object(&api_key, &prompt_request)
            .await?
            .ok_or_else(|| GenerationFailure::MalformedResponse("empty reply".to_string()))?;

        let output = GreetingDecision {
            greeting: clip(&text_field(&reply, "greeting")?, max_greeting),
            decision: clip(&text_field(&reply, "decision")?, max_decision),
        };
        if output.greeting.is_empty() || output.decision.is_empty() {
            return Err(GenerationFailure::MalformedResponse(
                "blank greeting or decision".to_string(),
            ));
        }

        if previous.is_some_and(|p| p.repeats(&output)) {
            return Err(GenerationFailure::DuplicateOutput);
        }

        Ok((output, model))
    }

    /// Explicit credential first, then the configured host state
    async fn credential(&self, request: &GreetingRequest) -> Option<String> {
        if let Some(key) = request
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            return Some(key.to_string());
        }

        let state_id = request.api_key_state.as_deref()?;
        let states = self.states.as_ref()?;
        let key = states.get_string_or(state_id, "").await;
        let key = key.trim();
        (!key.is_empty()).then(|| key.to_string())
    }
}

fn text_field(reply: &Value, field: &str) -> Result<String, GenerationFailure> {
    reply
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GenerationFailure::MalformedResponse(format!("missing text field '{}'", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use vg_core::StateId;
    use vg_event_bus::EventBus;
    use vg_openai::{ClientError, ClientResult};
    use vg_state_store::{MemoryStateStore, StateStore};

    /// Scripted backend: replies are served in order, the last one repeats
    struct FakeBackend {
        models: Vec<String>,
        list_error: Mutex<Option<ClientError>>,
        replies: Mutex<VecDeque<ClientResult<Option<Value>>>>,
        list_calls: AtomicUsize,
        respond_calls: AtomicUsize,
        last_key: Mutex<Option<String>>,
        last_request: Mutex<Option<PromptRequest>>,
    }

    impl FakeBackend {
        fn new(models: &[&str], replies: Vec<ClientResult<Option<Value>>>) -> Arc<Self> {
            Arc::new(Self {
                models: models.iter().map(|m| m.to_string()).collect(),
                list_error: Mutex::new(None),
                replies: Mutex::new(replies.into()),
                list_calls: AtomicUsize::new(0),
                respond_calls: AtomicUsize::new(0),
                last_key: Mutex::new(None),
                last_request: Mutex::new(None),
            })
        }

        /// Backend whose model listing always fails with `error`
        fn failing_listing(error: ClientError) -> Arc<Self> {
            let backend = Self::new(&["gpt-5-mini"], vec![reply("Hallo", "Los")]);
            *backend.list_error.lock().unwrap() = Some(error);
            backend
        }

        fn calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst) + self.respond_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerationBackend for FakeBackend {
        async fn list_models(&self, _api_key: &str) -> ClientResult<Vec<String>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            match self.list_error.lock().unwrap().clone() {
                Some(error) => Err(error),
                None => Ok(self.models.clone()),
            }
        }

        async fn respond_text(&self, _: &str, _: &PromptRequest) -> ClientResult<String> {
            unreachable!("greetings use JSON replies")
        }

        async fn respond_json_object(
            &self,
            api_key: &str,
            request: &PromptRequest,
        ) -> ClientResult<Option<Value>> {
            self.respond_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_key.lock().unwrap() = Some(api_key.to_string());
            *self.last_request.lock().unwrap() = Some(request.clone());
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                replies.front().cloned().unwrap()
            }
        }
    }

    fn reply(greeting: &str, decision: &str) -> ClientResult<Option<Value>> {
        Ok(Some(json!({ "greeting": greeting, "decision": decision })))
    }

    fn morning_request() -> GreetingRequest {
        GreetingRequest::new("kueche", "WDR 2")
            .at(Local.with_ymd_and_hms(2025, 12, 22, 7, 15, 0).unwrap())
    }

    fn service(backend: Arc<FakeBackend>) -> VoiceService {
        VoiceService::new(backend).with_selector(NonRepeatingSelector::seeded(42))
    }

    #[tokio::test]
    async fn test_no_credential_stays_local() {
        let backend = FakeBackend::new(&["gpt-5-mini"], vec![reply("Hallo", "Los")]);
        let svc = service(backend.clone());

        let (out, source) = svc.generate(&morning_request()).await;

        assert_eq!(backend.calls(), 0);
        assert_eq!(
            source,
            GenerationSource::Local {
                reason: GenerationFailure::CredentialMissing
            }
        );
        assert!(out
            .decision
            .starts_with("Guten Morgen! Es ist 07:15. Ich starte jetzt WDR 2."));
        assert!(svc.memo().get("kueche|WDR 2|morgen").is_some());
    }

    #[tokio::test]
    async fn test_blank_credential_counts_as_missing() {
        let backend = FakeBackend::new(&["gpt-5-mini"], vec![reply("Hallo", "Los")]);
        let svc = service(backend.clone());

        let (_, source) = svc.generate(&morning_request().with_api_key("   ")).await;

        assert!(!source.is_remote());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_remote_success() {
        let backend = FakeBackend::new(
            &["gpt-4o", "gpt-5-mini"],
            vec![reply(" Moin! ", "Es ist 07:15. Ich starte WDR 2.")],
        );
        let svc = service(backend.clone());
        let mut req = morning_request().with_api_key(" sk-test ");
        req.model_prefer = vec!["gpt-5-mini".to_string()];

        let (out, source) = svc.generate(&req).await;

        assert_eq!(
            source,
            GenerationSource::Remote {
                model: "gpt-5-mini".to_string()
            }
        );
        assert_eq!(out.greeting, "Moin!");
        assert_eq!(out.decision, "Es ist 07:15. Ich starte WDR 2.");
        assert_eq!(backend.last_key.lock().unwrap().as_deref(), Some("sk-test"));

        let sent = backend.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.model, "gpt-5-mini");
        assert_eq!(sent.verbosity, Verbosity::Medium);
        assert_eq!(sent.timeout, Some(DEFAULT_TIMEOUT));
        assert!(sent.input.contains("- Uhrzeit: 07:15"));

        let memo = svc.memo().get("kueche|WDR 2|morgen").unwrap();
        assert_eq!(memo.greeting, "Moin!");
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let backend = FakeBackend::new(&["gpt-5-mini"], vec![Err(ClientError::Timeout)]);
        let svc = service(backend);

        let (out, source) = svc.generate(&morning_request().with_api_key("sk")).await;

        assert_eq!(
            source,
            GenerationSource::Local {
                reason: GenerationFailure::Network("HTTP timeout".to_string())
            }
        );
        assert!(out.decision.contains("07:15"));
        assert!(svc.memo().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_output_falls_back() {
        let backend = FakeBackend::new(&["gpt-5-mini"], vec![reply("Hallo", "Es ist 07:15. Ich starte WDR 2.")]);
        let svc = service(backend);
        let req = morning_request().with_api_key("sk");

        let (first, source) = svc.generate(&req).await;
        assert!(source.is_remote());

        let (second, source) = svc.generate(&req).await;
        assert_eq!(
            source,
            GenerationSource::Local {
                reason: GenerationFailure::DuplicateOutput
            }
        );
        assert_ne!(first, second);

        // the memo still holds the remote pair
        assert_eq!(svc.memo().get("kueche|WDR 2|morgen").unwrap().greeting, "Hallo");
    }

    #[tokio::test]
    async fn test_credential_from_state_store() {
        let store = Arc::new(MemoryStateStore::new(Arc::new(EventBus::new())));
        let id: StateId = "0_userdata.0.openai_key".parse().unwrap();
        store.set(&id, json!(" sk-state "), true).await.unwrap();

        let backend = FakeBackend::new(&["gpt-5-mini"], vec![reply("Hallo", "Los")]);
        let svc = service(backend.clone()).with_state_store(store);

        let req = morning_request().with_api_key_state("0_userdata.0.openai_key");
        let (_, source) = svc.generate(&req).await;

        assert!(source.is_remote());
        assert_eq!(backend.last_key.lock().unwrap().as_deref(), Some("sk-state"));
    }

    #[tokio::test]
    async fn test_explicit_credential_wins() {
        let store = Arc::new(MemoryStateStore::new(Arc::new(EventBus::new())));
        let id: StateId = "0_userdata.0.openai_key".parse().unwrap();
        store.set(&id, json!("sk-state"), true).await.unwrap();

        let backend = FakeBackend::new(&["gpt-5-mini"], vec![reply("Hallo", "Los")]);
        let svc = service(backend.clone()).with_state_store(store);

        let req = morning_request()
            .with_api_key("sk-direct")
            .with_api_key_state("0_userdata.0.openai_key");
        svc.generate(&req).await;

        assert_eq!(backend.last_key.lock().unwrap().as_deref(), Some("sk-direct"));
    }

    #[tokio::test]
    async fn test_no_model_stays_local() {
        let backend = FakeBackend::new(&[], vec![reply("Hallo", "Los")]);
        let svc = service(backend.clone());

        let (_, source) = svc.generate(&morning_request().with_api_key("sk")).await;

        assert_eq!(
            source,
            GenerationSource::Local {
                reason: GenerationFailure::ModelUnresolvable
            }
        );
        assert_eq!(backend.respond_calls.load(Ordering::SeqCst), 0);
        assert!(svc.memo().get("kueche|WDR 2|morgen").is_some());
    }

    #[tokio::test]
    async fn test_model_listing_failure_falls_back() {
        let backend = FakeBackend::failing_listing(ClientError::Timeout);
        let svc = service(backend.clone());

        let (out, source) = svc.generate(&morning_request().with_api_key("sk")).await;

        assert!(
            matches!(
                source,
                GenerationSource::Local {
                    reason: GenerationFailure::Network(_)
                }
            ),
            "{:?}",
            source
        );
        assert!(!out.greeting.is_empty());
        assert!(out.decision.contains("07:15"));
        assert_eq!(backend.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.respond_calls.load(Ordering::SeqCst), 0);
        assert!(svc.memo().is_empty());

        // failures are not cached, the next call lists again
        svc.generate(&morning_request().with_api_key("sk")).await;
        assert_eq!(backend.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concrete_model_skips_listing() {
        let backend = FakeBackend::new(&[], vec![reply("Hallo", "Los")]);
        let svc = service(backend.clone());

        let req = morning_request().with_api_key("sk").with_model("gpt-4.1");
        let (_, source) = svc.generate(&req).await;

        assert_eq!(
            source,
            GenerationSource::Remote {
                model: "gpt-4.1".to_string()
            }
        );
        assert_eq!(backend.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_replies_fall_back() {
        let replies = vec![
            Ok(None),
            Ok(Some(json!({ "greeting": "Hallo" }))),
            Ok(Some(json!({ "greeting": 3, "decision": "Los" }))),
            Ok(Some(json!({ "greeting": "  ", "decision": "Los" }))),
            Err(ClientError::MalformedResponse {
                reason: "not JSON".to_string(),
            }),
        ];
        let count = replies.len();
        let backend = FakeBackend::new(&["gpt-5-mini"], replies);
        let svc = service(backend);
        let req = morning_request().with_api_key("sk");

        for _ in 0..count {
            let (out, source) = svc.generate(&req).await;
            assert!(
                matches!(
                    source,
                    GenerationSource::Local {
                        reason: GenerationFailure::MalformedResponse(_)
                    }
                ),
                "{:?}",
                source
            );
            assert!(!out.greeting.is_empty());
        }
    }

    #[tokio::test]
    async fn test_remote_caps_respected() {
        let long = "a".repeat(1000);
        let backend = FakeBackend::new(&["gpt-5-mini"], vec![reply(&long, &long)]);
        let svc = service(backend.clone());

        let (out, _) = svc.generate(&morning_request().with_api_key("sk")).await;
        assert_eq!(out.greeting.chars().count(), REMOTE_MAX_GREETING_CHARS);
        assert_eq!(out.decision.chars().count(), REMOTE_MAX_DECISION_CHARS);

        svc.reset();
        let req = morning_request().with_api_key("sk").with_caps(20, 50);
        let (out, _) = svc.generate(&req).await;
        assert_eq!(out.greeting.chars().count(), 20);
        assert_eq!(out.decision.chars().count(), 50);
        assert!(out.greeting.ends_with('…'));

        let sent = backend.last_request.lock().unwrap().clone().unwrap();
        assert!(sent.input.contains("max 20 Zeichen"));
    }

    #[tokio::test]
    async fn test_zero_caps_use_remote_defaults() {
        let long = "a".repeat(1000);
        let backend = FakeBackend::new(&["gpt-5-mini"], vec![reply(&long, &long)]);
        let svc = service(backend.clone());

        let req = morning_request().with_api_key("sk").with_caps(0, 0);
        let (out, source) = svc.generate(&req).await;

        assert!(source.is_remote());
        assert_eq!(out.greeting.chars().count(), REMOTE_MAX_GREETING_CHARS);
        assert_eq!(out.decision.chars().count(), REMOTE_MAX_DECISION_CHARS);

        let sent = backend.last_request.lock().unwrap().clone().unwrap();
        assert!(sent.input.contains(&format!("max {} Zeichen", REMOTE_MAX_GREETING_CHARS)));
        assert!(!sent.input.contains("max 0 Zeichen"));
    }

    #[tokio::test]
    async fn test_model_list_cached_across_calls() {
        let backend = FakeBackend::new(
            &["gpt-5-mini"],
            vec![reply("Eins", "A"), reply("Zwei", "B"), reply("Drei", "C")],
        );
        let svc = service(backend.clone());
        let req = morning_request().with_api_key("sk");

        for _ in 0..3 {
            assert!(svc.generate(&req).await.1.is_remote());
        }
        assert_eq!(backend.list_calls.load(Ordering::SeqCst), 1);

        svc.reset();
        svc.generate(&req).await;
        assert_eq!(backend.list_calls.load(Ordering::SeqCst), 2);
    }
}
