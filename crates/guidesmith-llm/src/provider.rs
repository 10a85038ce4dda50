//! Runtime provider selection
//!
//! `LlmSettings` is the `[llm]` table of the service configuration.
//! `AnyProvider` wraps whichever backend it names so callers can stay generic
//! over a single concrete type.

use crate::{gemini, ollama, GeminiProvider, LlmError, MockProvider, OllamaProvider};
use async_trait::async_trait;
use guidesmith_domain::{LlmBackend, LlmRequest};
use serde::{Deserialize, Serialize};

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini
    Gemini,
    /// Local Ollama
    Ollama,
    /// Canned responses, no network
    Mock,
}

impl ProviderKind {
    /// Parse a provider name (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(ProviderKind::Gemini),
            "ollama" => Some(ProviderKind::Ollama),
            "mock" => Some(ProviderKind::Mock),
            _ => None,
        }
    }
}

/// LLM backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Backend to use
    pub provider: ProviderKind,

    /// Model name passed to the backend
    pub model: String,

    /// Override the backend's default endpoint
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Inline API key; the environment variable wins when both are set
    pub api_key: Option<String>,

    /// Canned reply used by the mock provider
    pub mock_response: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: gemini::DEFAULT_MODEL.to_string(),
            endpoint: None,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            api_key: None,
            mock_response: "{}".to_string(),
        }
    }
}

impl LlmSettings {
    /// API key from the configured environment variable, else the inline key
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }
}

/// A backend chosen at runtime
pub enum AnyProvider {
    /// Gemini backend
    Gemini(GeminiProvider),
    /// Ollama backend
    Ollama(OllamaProvider),
    /// Mock backend
    Mock(MockProvider),
}

impl AnyProvider {
    /// Build the backend the settings describe
    ///
    /// # Errors
    ///
    /// `LlmError::Authentication` when Gemini is selected and no API key can
    /// be resolved.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let provider = match settings.provider {
            ProviderKind::Gemini => {
                let key = settings.resolve_api_key().ok_or_else(|| {
                    LlmError::Authentication(format!(
                        "set {} or llm.api_key to use the Gemini provider",
                        settings.api_key_env
                    ))
                })?;
                let endpoint = settings
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| gemini::DEFAULT_ENDPOINT.to_string());
                AnyProvider::Gemini(GeminiProvider::with_endpoint(
                    endpoint,
                    key,
                    settings.model.clone(),
                ))
            }
            ProviderKind::Ollama => {
                let endpoint = settings
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| ollama::DEFAULT_ENDPOINT.to_string());
                AnyProvider::Ollama(OllamaProvider::new(endpoint, settings.model.clone()))
            }
            ProviderKind::Mock => AnyProvider::Mock(
                MockProvider::new(settings.mock_response.clone())
                    .with_model_name(settings.model.clone()),
            ),
        };

        tracing::debug!(
            provider = ?settings.provider,
            model = %settings.model,
            "LLM provider configured"
        );
        Ok(provider)
    }
}

#[async_trait]
impl LlmBackend for AnyProvider {
    type Error = LlmError;

    async fn generate(&self, request: &LlmRequest) -> Result<String, Self::Error> {
        match self {
            AnyProvider::Gemini(p) => p.generate(request).await,
            AnyProvider::Ollama(p) => p.generate(request).await,
            AnyProvider::Mock(p) => p.generate(request).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            AnyProvider::Gemini(p) => p.model_name(),
            AnyProvider::Ollama(p) => p.model_name(),
            AnyProvider::Mock(p) => p.model_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(ProviderKind::parse("Gemini"), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::parse(" ollama "), Some(ProviderKind::Ollama));
        assert_eq!(ProviderKind::parse("mock"), Some(ProviderKind::Mock));
        assert_eq!(ProviderKind::parse("openai"), None);
    }

    #[test]
    fn test_settings_partial_override() {
        let settings: LlmSettings = from_json(
            r#"{"provider": "ollama", "model": "llama3.1", "endpoint": "http://gpu:11434"}"#,
        );
        assert_eq!(settings.provider, ProviderKind::Ollama);
        assert_eq!(settings.model, "llama3.1");
        // untouched fields keep defaults
        assert_eq!(settings.api_key_env, "GOOGLE_API_KEY");
    }

    fn from_json(json: &str) -> LlmSettings {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_inline_key_used_when_env_missing() {
        let settings = LlmSettings {
            api_key_env: "GUIDESMITH_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            api_key: Some("inline".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_api_key().as_deref(), Some("inline"));
    }

    #[test]
    fn test_gemini_without_key_is_rejected() {
        let settings = LlmSettings {
            api_key_env: "GUIDESMITH_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            AnyProvider::from_settings(&settings),
            Err(LlmError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_selected_from_settings() {
        let settings = LlmSettings {
            provider: ProviderKind::Mock,
            model: "canned".to_string(),
            mock_response: "{\"line_spacing\": 2}".to_string(),
            ..Default::default()
        };
        let provider = AnyProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.model_name(), "canned");
        let reply = provider
            .generate(&LlmRequest::new("s", "p"))
            .await
            .unwrap();
        assert_eq!(reply, "{\"line_spacing\": 2}");
    }

    #[test]
    fn test_ollama_uses_default_endpoint() {
        let settings = LlmSettings {
            provider: ProviderKind::Ollama,
            model: "mistral".to_string(),
            ..Default::default()
        };
        match AnyProvider::from_settings(&settings).unwrap() {
            AnyProvider::Ollama(p) => assert_eq!(p.endpoint(), ollama::DEFAULT_ENDPOINT),
            _ => panic!("expected Ollama"),
        }
    }
}
