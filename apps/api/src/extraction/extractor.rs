//! Rule Extraction: orchestrates the guideline → rule set pipeline.
//!
//! Flow: load text → cache lookup → prompt → model call (bounded retry) →
//!       JSON object scan → normalize → cache store.
//!
//! Every failure degrades to the fallback rule set. The returned `RuleSource`
//! says which path produced the rules; the rules themselves are always complete.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::extraction::cache::RuleCache;
use crate::extraction::loader::load_text;
use crate::extraction::prompts::{build_extraction_prompt, extraction_system};
use crate::extraction::response::first_json_object;
use crate::llm_client::{RetryPolicy, TextGenerator, MODEL};
use crate::rules::{normalize, RuleSet};

/// Where an extraction's rules came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSource {
    Cache,
    Model,
    Fallback { reason: String },
}

impl RuleSource {
    pub fn label(&self) -> &'static str {
        match self {
            RuleSource::Cache => "cache",
            RuleSource::Model => "model",
            RuleSource::Fallback { .. } => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub rules: RuleSet,
    pub source: RuleSource,
}

impl Extraction {
    fn fallback(reason: impl Into<String>) -> Self {
        Self {
            rules: RuleSet::fallback(),
            source: RuleSource::Fallback {
                reason: reason.into(),
            },
        }
    }
}

pub struct RuleExtractor {
    llm: Arc<dyn TextGenerator>,
    cache: RuleCache,
    retry: RetryPolicy,
}

impl RuleExtractor {
    pub fn new(llm: Arc<dyn TextGenerator>, cache: RuleCache) -> Self {
        Self {
            llm,
            cache,
            retry: RetryPolicy::default(),
        }
    }

    #[cfg(test)]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &RuleCache {
        &self.cache
    }

    /// Extracts rules from a `.txt` or `.docx` guideline on disk.
    pub async fn extract_from_path(&self, path: &Path) -> Extraction {
        info!("Extracting formatting rules from {}", path.display());

        match load_text(path).await {
            Ok(text) => self.extract_from_text(&text).await,
            Err(e) => {
                warn!("Could not load {}: {e}; using fallback rules", path.display());
                Extraction::fallback(e.to_string())
            }
        }
    }

    /// Extracts rules from already-loaded guideline text.
    pub async fn extract_from_text(&self, text: &str) -> Extraction {
        let key = RuleCache::key_for(text);
        if let Some(rules) = self.cache.get(&key) {
            debug!("Cache hit for guideline {key}");
            return Extraction {
                rules,
                source: RuleSource::Cache,
            };
        }

        let system = extraction_system();
        let prompt = build_extraction_prompt(text);
        info!(
            "Sending {} characters of guideline text to {MODEL}",
            prompt.chars().count()
        );

        let response = self
            .retry
            .run(|attempt| {
                debug!("Model call attempt {attempt}/{}", self.retry.max_attempts);
                self.llm.generate(&system, &prompt)
            })
            .await;

        let response = match response {
            Ok(text) => text,
            Err(e) => {
                warn!("Model call failed: {e}; using fallback rules");
                return Extraction::fallback(e.to_string());
            }
        };

        let raw = match first_json_object(&response) {
            Ok(object) => object,
            Err(e) => {
                warn!("{e}; using fallback rules");
                return Extraction::fallback(e.to_string());
            }
        };

        let rules = normalize(&Value::Object(raw));

        if let Err(e) = self.cache.put(&key, &rules, MODEL) {
            warn!("Failed to cache extracted rules: {e}");
        }
        info!("Rules extracted by model for guideline {key}");

        Extraction {
            rules,
            source: RuleSource::Model,
        }
    }
}
