//! Extraction stages that run before the direct fetch
//!
//! Design: Each extractor handles specific URL patterns with custom logic.
//! The reader tries matching extractors in registration order and keeps the
//! first result that is not flagged for escalation.

mod article;
mod notion;

pub use article::ArticleExtractor;
pub use notion::{
    extract_page_id, render_page, Annotation, Block, BlockKind, BlockMap, NotionExtractor,
    RenderedPage, RichText, RichTextFragment,
};

use crate::client::ReaderOptions;
use crate::error::ReaderError;
use crate::fetch::HttpClient;
use crate::sanitize::Sanitizer;
use crate::types::{ConversionResult, ResultMetadata};
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// Outcome of one extraction stage
#[derive(Debug)]
pub enum StageOutcome {
    /// The stage produced a result
    Produced(ConversionResult),
    /// The stage does not apply; try the next one
    Declined,
    /// The stage failed; logged by the reader and treated as a decline
    Failed(ReaderError),
}

impl StageOutcome {
    /// Produced if `result` is present, declined otherwise
    pub fn from_result(result: Option<ConversionResult>) -> Self {
        match result {
            Some(result) => StageOutcome::Produced(result),
            None => StageOutcome::Declined,
        }
    }
}

/// Input shared by all extraction stages of one conversion
#[derive(Debug)]
pub struct ExtractRequest<'a> {
    /// URL as requested by the caller
    pub source_url: &'a str,
    /// Normalized target URL
    pub url: &'a Url,
    /// Metadata accumulated so far (normalizer tag)
    pub metadata: &'a ResultMetadata,
}

/// Trait for extraction stages
///
/// Each extractor declares what URLs it can handle via `matches()` and
/// performs the extraction via `extract()`.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Unique identifier for this extractor (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Returns true if this extractor should run for the given URL
    fn matches(&self, url: &Url) -> bool;

    /// Run the extraction
    ///
    /// Called only if `matches()` returned true. Failures are reported as
    /// [`StageOutcome::Failed`], never as panics or early returns.
    async fn extract(&self, request: &ExtractRequest<'_>) -> StageOutcome;
}

/// Ordered list of extraction stages
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create a registry with the built-in stages
    ///
    /// Includes (in order of priority):
    /// 1. NotionExtractor - Notion pages via the block API
    /// 2. ArticleExtractor - Readability-style article extraction
    pub fn with_defaults(
        client: &HttpClient,
        options: &Arc<ReaderOptions>,
        sanitizer: &Arc<Sanitizer>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(NotionExtractor::new(
            client.clone(),
            Arc::clone(options),
        )));
        registry.register(Box::new(ArticleExtractor::new(
            client.clone(),
            Arc::clone(options),
            Arc::clone(sanitizer),
        )));
        registry
    }

    /// Register an extractor
    ///
    /// Extractors run in registration order.
    pub fn register(&mut self, extractor: Box<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    /// Extractors in priority order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Extractor> {
        self.extractors.iter().map(|e| e.as_ref())
    }

    /// Number of registered extractors
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// True if no extractor is registered
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}
