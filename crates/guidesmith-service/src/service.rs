//! The end-to-end pipeline: load → normalize → extract (cached) → generate

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use guidesmith_domain::{FormatRuleSet, LlmBackend, RequestId};
use guidesmith_extractor::{CacheStatus, ExtractionCache, Extractor, Fingerprint, RuleExtraction};
use guidesmith_llm::AnyProvider;
use guidesmith_loader::GuideDocument;
use guidesmith_template::{TemplateArtifact, TemplateGenerator};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

/// Rules extracted from one guide, with provenance
#[derive(Debug, Clone)]
pub struct ExtractedRules {
    /// The extraction outcome
    pub extraction: RuleExtraction,
    /// Cache key of the normalized text
    pub fingerprint: Fingerprint,
    /// Whether the guide was cut to the character budget
    pub truncated: bool,
    /// Characters in the loaded guide before truncation
    pub original_chars: usize,
    /// How the cache satisfied the request
    pub cache_status: CacheStatus,
}

impl ExtractedRules {
    /// The rule set
    pub fn rules(&self) -> &FormatRuleSet {
        &self.extraction.rules
    }

    /// Whether no backend call was made for this request
    pub fn from_cache(&self) -> bool {
        self.cache_status.is_cached()
    }
}

/// Result of `TemplateService::process`
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Identifier of the run, as logged
    pub request_id: RequestId,
    /// The extracted rules
    pub rules: ExtractedRules,
    /// The generated template
    pub template: TemplateArtifact,
}

/// Turns uploaded style guides into document templates
///
/// The extraction cache is owned through an `Arc` so several services (or
/// request handlers) can share one instance; nothing here is global.
pub struct TemplateService<B: LlmBackend> {
    extractor: Extractor<B>,
    cache: Arc<ExtractionCache>,
    generator: TemplateGenerator,
    max_upload_bytes: usize,
}

impl TemplateService<AnyProvider> {
    /// Build a service with the backend named in `config.llm`
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let backend = AnyProvider::from_settings(&config.llm)?;
        Self::new(backend, config)
    }
}

impl<B: LlmBackend> TemplateService<B> {
    /// Create a service with its own cache
    pub fn new(backend: B, config: &ServiceConfig) -> Result<Self, ServiceError> {
        let cache = Arc::new(ExtractionCache::new(config.cache.clone()));
        Self::with_cache(backend, config, cache)
    }

    /// Create a service over an existing cache
    pub fn with_cache(
        backend: B,
        config: &ServiceConfig,
        cache: Arc<ExtractionCache>,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        info!(
            model = backend.model_name(),
            max_upload_bytes = config.max_upload_bytes,
            "Template service ready"
        );
        Ok(Self {
            extractor: Extractor::new(backend, config.extractor.clone()),
            cache,
            generator: TemplateGenerator::new(config.template.clone()),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// The shared extraction cache
    pub fn cache(&self) -> &Arc<ExtractionCache> {
        &self.cache
    }

    /// The extractor requests go through
    pub fn extractor(&self) -> &Extractor<B> {
        &self.extractor
    }

    /// Load a guide and extract its rules, consulting the cache
    ///
    /// # Errors
    ///
    /// - `UploadTooLarge` before anything is read
    /// - `UnsupportedFormat` / `CorruptDocument` from the loader
    /// - `ExtractionUnavailable` when the backend gave no answer
    pub async fn extract_rules(&self, document: &GuideDocument) -> Result<ExtractedRules, ServiceError> {
        if document.len() > self.max_upload_bytes {
            warn!(
                size = document.len(),
                limit = self.max_upload_bytes,
                "Upload rejected"
            );
            return Err(ServiceError::UploadTooLarge {
                size: document.len(),
                limit: self.max_upload_bytes,
            });
        }

        let text = guidesmith_loader::load(document)?;
        debug!(
            file = %document.file_name,
            format = document.format.as_str(),
            chars = text.chars().count(),
            "Guide loaded"
        );

        let normalized = self.extractor.normalize(&text);
        let fingerprint = Fingerprint::of(normalized.as_str());
        let outcome = self.extractor.extract_cached(&self.cache, &normalized).await?;

        debug!(
            fingerprint = %fingerprint.short(),
            status = ?outcome.status,
            "Rules resolved"
        );

        Ok(ExtractedRules {
            extraction: outcome.extraction,
            fingerprint,
            truncated: normalized.is_truncated(),
            original_chars: normalized.original_chars(),
            cache_status: outcome.status,
        })
    }

    /// Render a template from a rule set
    pub fn generate_template(&self, rules: &FormatRuleSet) -> Result<TemplateArtifact, ServiceError> {
        Ok(self.generator.generate(rules)?)
    }

    /// Run the whole pipeline for one upload
    pub async fn process(&self, document: &GuideDocument) -> Result<ProcessOutput, ServiceError> {
        let request_id = RequestId::new();
        let span = info_span!("process", request_id = %request_id, file = %document.file_name);

        async move {
            let start = Instant::now();
            info!(bytes = document.len(), "Processing guide");

            let rules = self.extract_rules(document).await.map_err(|e| {
                warn!(error = %e, "Rule extraction failed");
                e
            })?;
            let template = self.generate_template(rules.rules())?;

            info!(
                from_cache = rules.from_cache(),
                used_fallback = rules.extraction.used_fallback,
                truncated = rules.truncated,
                template_bytes = template.bytes.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Guide processed"
            );

            Ok(ProcessOutput {
                request_id,
                rules,
                template,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidesmith_llm::{LlmSettings, MockProvider, ProviderKind};

    #[tokio::test]
    async fn test_process_plain_text() {
        let backend = MockProvider::new(r#"{"font": {"family": "Arial", "size_pt": 11}}"#);
        let service = TemplateService::new(backend, &ServiceConfig::default()).unwrap();

        let document = GuideDocument::from_text("guide.txt", "Use Arial 11pt.");
        let output = service.process(&document).await.unwrap();

        assert_eq!(output.rules.rules().font.family, "Arial");
        assert_eq!(output.rules.cache_status, CacheStatus::Miss);
        assert!(!output.rules.truncated);
        assert_eq!(
            output.template.document.style("Normal").unwrap().font_family,
            "Arial"
        );
    }

    #[tokio::test]
    async fn test_from_config_mock_provider() {
        let config = ServiceConfig {
            llm: LlmSettings {
                provider: ProviderKind::Mock,
                mock_response: r#"{"alignment": "justify"}"#.to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let service = TemplateService::from_config(&config).unwrap();

        let document = GuideDocument::from_text("guide.md", "Justify body text.");
        let rules = service.extract_rules(&document).await.unwrap();
        assert_eq!(rules.rules().alignment, guidesmith_domain::Alignment::Justify);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ServiceConfig::default();
        config.max_upload_bytes = 0;
        let result = TemplateService::new(MockProvider::default(), &config);
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }

    #[test]
    fn test_generate_template_rejects_broken_rules() {
        let service = TemplateService::new(MockProvider::default(), &ServiceConfig::default()).unwrap();
        let mut rules = FormatRuleSet::default();
        rules.font.size_pt = 0.0;
        let err = service.generate_template(&rules).unwrap_err();
        assert!(matches!(err, ServiceError::TemplateRenderError(_)));
    }
}
