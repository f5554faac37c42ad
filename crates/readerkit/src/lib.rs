//! ReaderKit - convert public URLs into clean Markdown
//!
//! This crate turns a URL into a [`ConversionResult`]: Markdown text, a
//! title, a word count and a record of which path produced it.
//!
//! ## Pipeline
//!
//! Each conversion runs a fixed sequence of stages, see [`Reader`]:
//!
//! 1. URL normalization (Google Docs export, Notion reader mode)
//! 2. Extractors from the [`ExtractorRegistry`], first useful result wins:
//!    - [`NotionExtractor`] - Notion block tree via the companion API
//!    - [`ArticleExtractor`] - Readability-style article extraction
//! 3. Direct fetch with sanitization and HTML to Markdown conversion
//! 4. Rendering-proxy escalation for thin results on client-rendered hosts
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), readerkit::ReaderError> {
//! let reader = readerkit::Reader::builder().build()?;
//! let result = reader.convert("https://example.com").await?;
//! println!("{}", result.markdown);
//! # Ok(())
//! # }
//! ```

pub mod client;
mod convert;
mod error;
pub mod escalation;
pub mod extractors;
mod fetch;
pub mod normalize;
mod reader;
mod sanitize;
mod types;

pub use client::{convert, convert_with_options, ReaderOptions};
pub use convert::{html_to_markdown, normalize_markdown};
pub use error::ReaderError;
pub use extractors::{
    ArticleExtractor, ExtractRequest, Extractor, ExtractorRegistry, NotionExtractor, StageOutcome,
};
pub use fetch::{FetchedPage, HttpClient};
pub use normalize::{normalize_url, NormalizedUrl};
pub use reader::{Reader, ReaderBuilder};
pub use sanitize::{extract_title, Sanitizer};
pub use types::{word_count, ConversionResult, Normalizer, Renderer, ResultMetadata};

/// Default User-Agent string (desktop Safari)
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5) ",
    "AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.5 Safari/605.1.15"
);

/// Default Accept header
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Default Accept-Language header
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,ja;q=0.8";

/// Notion companion API; the dashless page id is appended
pub const DEFAULT_STRUCTURED_API_BASE: &str = "https://notion-api.splitbee.io/v1/page/";

/// Rendering proxy; the target URL is appended
pub const DEFAULT_PROXY_PREFIX: &str = "https://r.jina.ai/";
