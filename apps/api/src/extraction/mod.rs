// Rule Extraction: guideline loading, model prompting, response parsing and
// the content-addressed rule cache.
// All model calls go through llm_client, never direct HTTP calls here.

pub mod cache;
pub mod extractor;
pub mod handlers;
pub mod loader;
pub mod prompts;
pub mod response;
pub mod sample;

pub use cache::RuleCache;
pub use extractor::{Extraction, RuleExtractor, RuleSource};
