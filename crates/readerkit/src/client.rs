//! Entry points and options for ReaderKit
//!
//! This module provides the main entry points for converting URLs.
//! The stage sequencing is implemented by [`Reader`](crate::Reader).

use crate::error::ReaderError;
use crate::reader::Reader;
use crate::types::ConversionResult;
use crate::{
    DEFAULT_ACCEPT, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_PROXY_PREFIX, DEFAULT_STRUCTURED_API_BASE,
    DEFAULT_USER_AGENT,
};
use std::time::Duration;

/// Tags removed from every document before content selection
pub const UNWANTED_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "canvas", "form", "button", "input", "video",
    "audio",
];

/// Navigation chrome and hidden nodes removed before content selection
pub const UNWANTED_SELECTORS: &[&str] = &[
    "header",
    "footer",
    "nav",
    "[role='navigation']",
    "[aria-hidden='true']",
    ".notion-topbar",
    ".notion-sidebar-container",
    ".notion-record-navbar",
    ".kix-paginateddocumentheader",
    ".kix-paginateddocumentfooter",
];

/// Content containers, highest priority first
pub const MAIN_CONTENT_SELECTORS: &[&str] = &[
    ".notion-page-content",
    ".notion-page-block",
    ".kix-appview-editor",
    ".kix-zoomdocumentplugin-mobile-view",
    "#contents",
    "#doc-contents",
    "article",
    "main",
    "[role='main']",
];

/// Hosts served as Notion block trees
pub const STRUCTURED_HOSTS: &[&str] = &["notion.so", "notion.site"];

/// Hosts that render client-side and may need the rendering proxy
pub const PROXY_HOSTS: &[&str] = &[
    "notion.so",
    "www.notion.so",
    "notion.site",
    "www.notion.site",
    "docs.google.com",
];

/// Results below this many words are escalated on proxy hosts
pub const MIN_PROXY_WORD_COUNT: usize = 10;

/// Timeout for the structured-content API call
pub const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for direct page fetches
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the rendering proxy
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(45);

/// Conversion options, configured via [`ReaderBuilder`](crate::ReaderBuilder)
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// User-Agent sent on every request
    pub user_agent: String,
    /// Accept header value
    pub accept: String,
    /// Accept-Language header value
    pub accept_language: String,
    /// Tags removed during sanitization
    pub unwanted_tags: Vec<String>,
    /// Selectors removed during sanitization
    pub unwanted_selectors: Vec<String>,
    /// Main content candidates, highest priority first
    pub main_content_selectors: Vec<String>,
    /// Hosts (and their subdomains) handled by the structured extractor
    pub structured_hosts: Vec<String>,
    /// Structured API endpoint; the dashless page id is appended
    pub structured_api_base: String,
    /// Rendering proxy prefix; `None` disables escalation
    pub proxy_prefix: Option<String>,
    /// Hosts (and their subdomains) eligible for escalation
    pub proxy_hosts: Vec<String>,
    /// Escalate when a result has fewer words than this
    pub min_proxy_word_count: usize,
    /// Structured API timeout
    pub api_timeout: Duration,
    /// Direct fetch timeout (primary and raw stages)
    pub fetch_timeout: Duration,
    /// Rendering proxy timeout
    pub proxy_timeout: Duration,
    /// Run the article-extraction stage
    pub enable_article: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            unwanted_tags: to_strings(UNWANTED_TAGS),
            unwanted_selectors: to_strings(UNWANTED_SELECTORS),
            main_content_selectors: to_strings(MAIN_CONTENT_SELECTORS),
            structured_hosts: to_strings(STRUCTURED_HOSTS),
            structured_api_base: DEFAULT_STRUCTURED_API_BASE.to_string(),
            proxy_prefix: Some(DEFAULT_PROXY_PREFIX.to_string()),
            proxy_hosts: to_strings(PROXY_HOSTS),
            min_proxy_word_count: MIN_PROXY_WORD_COUNT,
            api_timeout: API_TIMEOUT,
            fetch_timeout: FETCH_TIMEOUT,
            proxy_timeout: PROXY_TIMEOUT,
            enable_article: true,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// True if `host` equals one of `domains` or is a subdomain of one
pub fn host_matches(host: &str, domains: &[String]) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    domains.iter().any(|domain| {
        let domain = domain.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    })
}

/// Convert a URL to Markdown with default options
///
/// For custom options, use [`convert_with_options`] or [`Reader::builder`].
pub async fn convert(url: &str) -> Result<ConversionResult, ReaderError> {
    convert_with_options(url, ReaderOptions::default()).await
}

/// Convert a URL to Markdown with custom options
pub async fn convert_with_options(
    url: &str,
    options: ReaderOptions,
) -> Result<ConversionResult, ReaderError> {
    // Validate URL early, before any client is built
    if url.is_empty() {
        return Err(ReaderError::MissingUrl);
    }

    let reader = Reader::from_options(options)?;
    reader.convert(url).await
}
