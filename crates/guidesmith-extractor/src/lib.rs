//! Guidesmith Extractor
//!
//! Distills style-guide prose into a `FormatRuleSet` through a language
//! model.
//!
//! # Overview
//!
//! A guide is bounded to a character budget, sent to the model in a single
//! request with a fixed instruction block, and the answer is merged field by
//! field over the default rules. Results are memoized per text fingerprint.
//!
//! # Architecture
//!
//! ```text
//! text → normalize → (cache lookup) → PromptBuilder → LlmBackend → parse_rules → RuleExtraction
//!                          ↑                                                           |
//!                          └──────────────────────── store ────────────────────────────┘
//! ```
//!
//! # Key Features
//!
//! - **Bounded input**: `normalize` keeps the first `max_text_chars` characters
//! - **Retry with backoff**: transient backend failures follow a `RetryPolicy`
//! - **Deadlines**: per attempt and for the whole retry loop
//! - **Lenient parsing**: code fences, prose around the JSON, unit strings
//! - **Fallback**: unparsable answers yield the default rules, never an error
//! - **Single-flight cache**: identical concurrent requests share one call
//!
//! # Example Usage
//!
//! ```
//! use guidesmith_extractor::{ExtractionCache, Extractor, ExtractorConfig};
//! use guidesmith_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let llm = MockProvider::new(r#"{"font": {"family": "Arial", "size_pt": 11}}"#);
//! let extractor = Extractor::new(llm, ExtractorConfig::default());
//! let cache = ExtractionCache::default();
//!
//! let text = extractor.normalize("Body text: Arial 11pt.");
//! let outcome = extractor.extract_cached(&cache, &text).await.unwrap();
//!
//! assert_eq!(outcome.extraction.rules.font.family, "Arial");
//! assert!(!outcome.extraction.used_fallback);
//! # });
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod extractor;
mod normalize;
mod parser;
mod prompt;
mod retry;
mod types;


pub use cache::{CacheOutcome, CacheStats, CacheStatus, ExtractionCache, Fingerprint};
pub use config::{CacheConfig, ExtractorConfig};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use normalize::{normalize, NormalizedText, DEFAULT_MAX_CHARS};
pub use parser::{parse_rules, ParsedRules};
pub use prompt::{PromptBuilder, SYSTEM_PREAMBLE};
pub use retry::RetryPolicy;
pub use types::RuleExtraction;
