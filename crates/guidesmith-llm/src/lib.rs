//! Guidesmith LLM Provider Layer
//!
//! Pluggable implementations of the `LlmBackend` trait from
//! `guidesmith-domain`. Each provider makes exactly one attempt per call;
//! retry and timeout policy belong to the extractor.
//!
//! # Providers
//!
//! - `MockProvider`: scripted, deterministic responses for tests
//! - `GeminiProvider`: Google Generative Language API
//! - `OllamaProvider`: local Ollama API
//! - `AnyProvider`: runtime selection between the above from `LlmSettings`
//!
//! # Examples
//!
//! ```
//! use guidesmith_llm::MockProvider;
//! use guidesmith_domain::{LlmBackend, LlmRequest};
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("{\"line_spacing\": 2.0}");
//! let reply = provider.generate(&LlmRequest::new("system", "prompt")).await.unwrap();
//! assert_eq!(reply, "{\"line_spacing\": 2.0}");
//! # });
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod ollama;
pub mod provider;

use async_trait::async_trait;
use guidesmith_domain::{BackendError, LlmBackend, LlmRequest};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use provider::{AnyProvider, LlmSettings, ProviderKind};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Missing or rejected credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl BackendError for LlmError {
    fn is_transient(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

/// Map a non-success HTTP status to an error
pub(crate) fn error_for_status(status: reqwest::StatusCode, body: String, model: &str) -> LlmError {
    use reqwest::StatusCode;

    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
        StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::Authentication(format!("HTTP {}", status))
        }
        s if s.is_server_error() || s == StatusCode::REQUEST_TIMEOUT => {
            LlmError::Communication(format!("HTTP {}: {}", status, body))
        }
        _ => LlmError::Other(format!("HTTP {}: {}", status, body)),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One scripted reply
#[derive(Debug)]
enum MockReply {
    Text(String),
    Fail(LlmError),
}

/// Mock LLM provider for deterministic testing
///
/// Replies are chosen in this order: the next scripted reply (if any), then
/// the first keyed response whose key occurs in the prompt, then the default
/// response. Clones share call counts and scripts.
///
/// # Examples
///
/// ```
/// use guidesmith_llm::{LlmError, MockProvider};
/// use guidesmith_domain::{LlmBackend, LlmRequest};
///
/// # tokio_test::block_on(async {
/// let provider = MockProvider::new("{}");
/// provider.push_error(LlmError::RateLimitExceeded);
///
/// let request = LlmRequest::new("system", "prompt");
/// assert!(provider.generate(&request).await.is_err());
/// assert_eq!(provider.generate(&request).await.unwrap(), "{}");
/// assert_eq!(provider.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<LlmRequest>>>,
    latency: Option<Duration>,
    model: String,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
            latency: None,
            model: "mock".to_string(),
        }
    }

    /// Respond with `response` whenever the prompt contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(needle.into(), response.into());
    }

    /// Queue a text reply ahead of the keyed and default responses
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(MockReply::Text(response.into()));
    }

    /// Queue a failure ahead of the keyed and default responses
    pub fn push_error(&self, error: LlmError) {
        lock(&self.script).push_back(MockReply::Fail(error));
    }

    /// Sleep this long before every reply
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Report a different model name
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// The most recent request received
    pub fn last_request(&self) -> Option<LlmRequest> {
        lock(&self.last_request).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmBackend for MockProvider {
    type Error = LlmError;

    async fn generate(&self, request: &LlmRequest) -> Result<String, Self::Error> {
        *lock(&self.call_count) += 1;
        *lock(&self.last_request) = Some(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = lock(&self.script).pop_front();
        match scripted {
            Some(MockReply::Text(text)) => return Ok(text),
            Some(MockReply::Fail(error)) => return Err(error),
            None => {}
        }

        let responses = lock(&self.responses);
        let mut keyed: Vec<(&String, &String)> = responses
            .iter()
            .filter(|(needle, _)| request.prompt.contains(needle.as_str()))
            .collect();
        // several needles can match; pick deterministically
        keyed.sort();

        Ok(keyed
            .first()
            .map(|(_, response)| (*response).clone())
            .unwrap_or_else(|| self.default_response.clone()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> LlmRequest {
        LlmRequest::new("system", prompt)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate(&request("any prompt")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_keyed_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("Times New Roman", "times");
        provider.add_response("Arial", "arial");

        assert_eq!(provider.generate(&request("use Times New Roman")).await.unwrap(), "times");
        assert_eq!(provider.generate(&request("use Arial 11pt")).await.unwrap(), "arial");
        assert_eq!(
            provider.generate(&request("unknown")).await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_script_runs_first() {
        let provider = MockProvider::new("default");
        provider.push_error(LlmError::Communication("reset".to_string()));
        provider.push_response("scripted");

        assert!(matches!(
            provider.generate(&request("p")).await,
            Err(LlmError::Communication(_))
        ));
        assert_eq!(provider.generate(&request("p")).await.unwrap(), "scripted");
        assert_eq!(provider.generate(&request("p")).await.unwrap(), "default");
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.generate(&request("prompt1")).await.unwrap();
        provider.generate(&request("prompt2")).await.unwrap();
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_provider_records_last_request() {
        let provider = MockProvider::new("ok");
        provider.generate(&request("the guide")).await.unwrap();
        let last = provider.last_request().unwrap();
        assert_eq!(last.prompt, "the guide");
        assert_eq!(last.system, "system");
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate(&request("test")).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_provider_latency() {
        let provider = MockProvider::new("slow").with_latency(Duration::from_secs(5));
        let start = tokio::time::Instant::now();
        provider.generate(&request("p")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::RateLimitExceeded.is_transient());
        assert!(LlmError::Communication("timeout".into()).is_transient());
        assert!(!LlmError::ModelNotAvailable("x".into()).is_transient());
        assert!(!LlmError::Authentication("bad key".into()).is_transient());
        assert!(!LlmError::InvalidResponse("garbage".into()).is_transient());
    }

    #[test]
    fn test_error_for_status() {
        use reqwest::StatusCode;
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, String::new(), "m"),
            LlmError::RateLimitExceeded
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, String::new(), "m"),
            LlmError::ModelNotAvailable(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::SERVICE_UNAVAILABLE, String::new(), "m"),
            LlmError::Communication(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_REQUEST, "bad".into(), "m"),
            LlmError::Other(_)
        ));
    }
}
