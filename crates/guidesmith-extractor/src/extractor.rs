//! Core Extractor implementation

use crate::cache::{CacheOutcome, ExtractionCache, Fingerprint};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::normalize::{normalize, NormalizedText};
use crate::parser::parse_rules;
use crate::prompt::PromptBuilder;
use crate::types::RuleExtraction;
use guidesmith_domain::{BackendError, LlmBackend, LlmRequest};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor turns guide text into a `FormatRuleSet` through a language
/// model
///
/// Makes exactly one logical request per guide. Transient backend failures
/// are retried under the configured `RetryPolicy`; every attempt and the
/// retry loop as a whole run under deadlines.
pub struct Extractor<B: LlmBackend> {
    backend: Arc<B>,
    config: ExtractorConfig,
}

impl<B: LlmBackend> Extractor<B> {
    /// Create a new Extractor
    pub fn new(backend: B, config: ExtractorConfig) -> Self {
        Self::with_shared_backend(Arc::new(backend), config)
    }

    /// Create an Extractor over a backend that is shared elsewhere
    pub fn with_shared_backend(backend: Arc<B>, config: ExtractorConfig) -> Self {
        Self { backend, config }
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The backend requests go through
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Bound text to this extractor's character budget
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let normalized = normalize(text, self.config.max_text_chars);
        if normalized.is_truncated() {
            warn!(
                original_chars = normalized.original_chars(),
                kept_chars = normalized.char_count(),
                "Guide text truncated"
            );
        }
        normalized
    }

    /// Extract rules from normalized text
    ///
    /// Unparsable model output is not an error: the result carries the
    /// default rules with `used_fallback` set.
    ///
    /// # Errors
    ///
    /// `ExtractorError::ExtractionUnavailable` when no backend response was
    /// obtained (retries exhausted, permanent failure, or timeout).
    pub async fn extract(&self, text: &NormalizedText) -> Result<RuleExtraction, ExtractorError> {
        let start = Instant::now();
        let request = PromptBuilder::new(text).request(self.config.temperature);

        info!(
            chars = text.char_count(),
            truncated = text.is_truncated(),
            model = self.backend.model_name(),
            "Starting rule extraction"
        );
        debug!("Prompt length: {} chars", request.prompt.len());

        let (response, attempts) = timeout(
            self.config.extraction_timeout(),
            self.call_with_retry(&request),
        )
        .await
        .map_err(|_| {
            warn!(
                timeout_secs = self.config.extraction_timeout_secs,
                "Extraction deadline exceeded"
            );
            ExtractorError::ExtractionUnavailable(format!(
                "no answer within {}s",
                self.config.extraction_timeout_secs
            ))
        })??;

        debug!("LLM response length: {} chars", response.len());

        let parsed = parse_rules(&response);
        if parsed.used_fallback {
            warn!("Model answer was not a JSON object, fallback rules used");
        }

        info!(
            attempts,
            used_fallback = parsed.used_fallback,
            defaulted = parsed.defaulted_fields.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extraction complete"
        );

        Ok(RuleExtraction {
            rules: parsed.rules,
            used_fallback: parsed.used_fallback,
            defaulted_fields: parsed.defaulted_fields,
            model: self.backend.model_name().to_string(),
            attempts,
        })
    }

    /// Extract through `cache`, sharing in-flight work for identical text
    pub async fn extract_cached(
        &self,
        cache: &ExtractionCache,
        text: &NormalizedText,
    ) -> Result<CacheOutcome, ExtractorError> {
        let fingerprint = Fingerprint::of(text.as_str());
        debug!(fingerprint = %fingerprint.short(), "Consulting extraction cache");
        cache
            .get_or_extract(fingerprint, || self.extract(text))
            .await
    }

    /// Submit the request, retrying transient failures
    ///
    /// Returns the response text and the number of attempts used.
    async fn call_with_retry(&self, request: &LlmRequest) -> Result<(String, u32), ExtractorError> {
        let policy = &self.config.retry;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let (reason, transient) =
                match timeout(self.config.request_timeout(), self.backend.generate(request)).await {
                    Ok(Ok(text)) => return Ok((text, attempt)),
                    Ok(Err(e)) => (e.to_string(), e.is_transient()),
                    Err(_) => (
                        format!("no response within {}s", self.config.request_timeout_secs),
                        true,
                    ),
                };

            if !transient {
                warn!(attempt, error = %reason, "Backend failed permanently");
                return Err(ExtractorError::ExtractionUnavailable(reason));
            }

            if attempt >= policy.max_attempts {
                warn!(attempts = attempt, error = %reason, "Backend retries exhausted");
                return Err(ExtractorError::ExtractionUnavailable(format!(
                    "{} (after {} attempts)",
                    reason, attempt
                )));
            }

            let delay = policy.backoff_for(attempt);
            warn!(
                attempt,
                max_attempts = policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %reason,
                "Backend attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidesmith_llm::MockProvider;

    #[tokio::test]
    async fn test_normalize_uses_configured_budget() {
        let config = ExtractorConfig {
            max_text_chars: 5,
            ..Default::default()
        };
        let extractor = Extractor::new(MockProvider::new("{}"), config);
        let normalized = extractor.normalize("abcdefgh");
        assert_eq!(normalized.as_str(), "abcde");
        assert!(normalized.is_truncated());
    }

    #[tokio::test]
    async fn test_extract_records_model_and_attempts() {
        let backend = MockProvider::new(r#"{"alignment": "justify"}"#).with_model_name("test-model");
        let extractor = Extractor::new(backend, ExtractorConfig::default());

        let text = extractor.normalize("Body text is justified.");
        let extraction = extractor.extract(&text).await.unwrap();

        assert_eq!(extraction.model, "test-model");
        assert_eq!(extraction.attempts, 1);
        assert!(!extraction.used_fallback);
    }

    #[tokio::test]
    async fn test_request_sent_to_backend() {
        let backend = MockProvider::new("{}");
        let extractor = Extractor::new(backend.clone(), ExtractorConfig::default());

        let text = extractor.normalize("Use Garamond.");
        extractor.extract(&text).await.unwrap();

        let request = backend.last_request().unwrap();
        assert!(request.prompt.contains("Use Garamond."));
        assert_eq!(request.temperature, 0.1);
        assert_eq!(request.system, crate::prompt::SYSTEM_PREAMBLE);
    }
}
