//! Trait definitions for external interactions
//!
//! These traits define the boundary between the extraction pipeline and the
//! language-model infrastructure. Implementations live in `guidesmith-llm`.

use async_trait::async_trait;

/// A single prompt submitted to a language model
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    /// System instruction (role and output discipline)
    pub system: String,

    /// User prompt (instructions plus the guide text)
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl LlmRequest {
    /// Create a request with the given system instruction and prompt
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature: 0.1,
        }
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Classification the retry loop needs from a backend error
pub trait BackendError: std::error::Error + Send + Sync + 'static {
    /// Whether a later attempt might succeed (network blip, rate limit)
    fn is_transient(&self) -> bool;
}

/// Trait for language-model backends
///
/// Implemented by the infrastructure layer (guidesmith-llm). A backend makes
/// exactly one attempt per call; retries belong to the caller.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Error type for backend operations
    type Error: BackendError;

    /// Generate a completion for the request
    async fn generate(&self, request: &LlmRequest) -> Result<String, Self::Error>;

    /// Name of the model serving requests, for logs and result metadata
    fn model_name(&self) -> &str;
}
