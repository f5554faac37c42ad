//! Core types for ReaderKit

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// URL rewrite applied before extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Normalizer {
    /// Google Docs share link rewritten to its HTML export
    #[serde(rename = "google-docs-html-export")]
    GoogleDocsHtmlExport,
    /// Notion page with the reader-mode query marker appended
    #[serde(rename = "notion-reader-mode")]
    NotionReaderMode,
}

impl Normalizer {
    /// Tag as serialized in result metadata, e.g. `notion-reader-mode`
    pub fn as_str(&self) -> &'static str {
        match self {
            Normalizer::GoogleDocsHtmlExport => "google-docs-html-export",
            Normalizer::NotionReaderMode => "notion-reader-mode",
        }
    }
}

impl fmt::Display for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage that produced the returned Markdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Renderer {
    /// Notion block tree fetched from the companion API
    #[serde(rename = "notion-api")]
    NotionApi,
    /// Readability-style article extraction
    #[serde(rename = "article-extractor")]
    Article,
    /// Direct GET of the page
    #[serde(rename = "direct-http")]
    DirectHttp,
    /// JavaScript-rendered snapshot from the rendering proxy
    #[serde(rename = "r.jina.ai")]
    Proxy,
}

impl Renderer {
    /// Tag as serialized in result metadata, e.g. `direct-http`
    pub fn as_str(&self) -> &'static str {
        match self {
            Renderer::NotionApi => "notion-api",
            Renderer::Article => "article-extractor",
            Renderer::DirectHttp => "direct-http",
            Renderer::Proxy => "r.jina.ai",
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance and article metadata attached to a result
///
/// Serialized keys keep declaration order; empty values are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResultMetadata {
    /// URL rewrite applied, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalizer: Option<Normalizer>,

    /// Stage that produced the Markdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<Renderer>,

    /// Article authors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    /// Article publish date as reported by the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,

    /// Article keywords
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl ResultMetadata {
    /// Metadata carrying only the normalizer tag
    pub fn normalized(normalizer: Option<Normalizer>) -> Self {
        Self {
            normalizer,
            ..Default::default()
        }
    }

    /// Copy with the renderer tag set
    pub fn with_renderer(&self, renderer: Renderer) -> Self {
        Self {
            renderer: Some(renderer),
            ..self.clone()
        }
    }
}

/// Successful conversion of one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConversionResult {
    /// URL as requested
    pub source_url: String,

    /// URL after normalization and redirects
    pub final_url: String,

    /// Page title
    pub title: Option<String>,

    /// Markdown body, never empty
    pub markdown: String,

    /// Whitespace-delimited token count of `markdown`
    pub word_count: usize,

    /// Which normalizer/renderer path produced this result
    pub metadata: ResultMetadata,
}

impl ConversionResult {
    /// Build a result, deriving `word_count` from `markdown`
    ///
    /// Returns `None` when `markdown` has no visible text.
    pub fn new(
        source_url: impl Into<String>,
        final_url: impl Into<String>,
        title: Option<String>,
        markdown: String,
        metadata: ResultMetadata,
    ) -> Option<Self> {
        if markdown.trim().is_empty() {
            return None;
        }
        Some(Self {
            source_url: source_url.into(),
            final_url: final_url.into(),
            title: title.filter(|t| !t.trim().is_empty()),
            word_count: word_count(&markdown),
            markdown,
            metadata,
        })
    }
}

/// Count whitespace-delimited non-empty tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
