//! Reader builder and conversion pipeline
//!
//! A [`Reader`] runs one conversion per call, stage by stage:
//!
//! ```text
//! normalize -> extractors (notion, article) -> raw fetch -> proxy -> return
//! ```
//!
//! Extractor results short-circuit unless the escalation policy flags them.
//! The raw fetch is the only stage whose failure reaches the caller.

use crate::client::ReaderOptions;
use crate::convert::html_to_markdown;
use crate::error::ReaderError;
use crate::escalation::{is_proxy_host, needs_proxy};
use crate::extractors::{ExtractRequest, ExtractorRegistry, StageOutcome};
use crate::fetch::{fetch_raw, fetch_via_proxy, HttpClient};
use crate::normalize::normalize_url;
use crate::sanitize::{extract_title, Sanitizer};
use crate::types::{ConversionResult, Renderer, ResultMetadata};
use schemars::schema_for;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Builder for configuring a [`Reader`]
#[derive(Debug, Clone, Default)]
pub struct ReaderBuilder {
    options: ReaderOptions,
}

impl ReaderBuilder {
    /// Create a builder with the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.options.user_agent = ua.into();
        self
    }

    /// Set the structured API base; the dashless page id is appended
    pub fn structured_api_base(mut self, base: impl Into<String>) -> Self {
        self.options.structured_api_base = base.into();
        self
    }

    /// Add a host handled by the structured extractor
    pub fn structured_host(mut self, host: impl Into<String>) -> Self {
        self.options.structured_hosts.push(host.into());
        self
    }

    /// Set the rendering proxy prefix
    pub fn proxy_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.proxy_prefix = Some(prefix.into());
        self
    }

    /// Never escalate to the rendering proxy
    pub fn disable_proxy(mut self) -> Self {
        self.options.proxy_prefix = None;
        self.options.proxy_hosts.clear();
        self
    }

    /// Add a host eligible for escalation
    pub fn proxy_host(mut self, host: impl Into<String>) -> Self {
        self.options.proxy_hosts.push(host.into());
        self
    }

    /// Set the escalation word-count threshold
    pub fn min_proxy_word_count(mut self, words: usize) -> Self {
        self.options.min_proxy_word_count = words;
        self
    }

    /// Enable or disable the article-extraction stage
    pub fn enable_article(mut self, enable: bool) -> Self {
        self.options.enable_article = enable;
        self
    }

    /// Set the structured API timeout
    pub fn api_timeout(mut self, timeout: Duration) -> Self {
        self.options.api_timeout = timeout;
        self
    }

    /// Set the direct fetch timeout
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.options.fetch_timeout = timeout;
        self
    }

    /// Set the rendering proxy timeout
    pub fn proxy_timeout(mut self, timeout: Duration) -> Self {
        self.options.proxy_timeout = timeout;
        self
    }

    /// Add a selector removed during sanitization
    pub fn unwanted_selector(mut self, selector: impl Into<String>) -> Self {
        self.options.unwanted_selectors.push(selector.into());
        self
    }

    /// Add a main-content candidate with the lowest priority
    pub fn main_content_selector(mut self, selector: impl Into<String>) -> Self {
        self.options.main_content_selectors.push(selector.into());
        self
    }

    /// Build the reader, validating selectors and the HTTP client
    pub fn build(self) -> Result<Reader, ReaderError> {
        Reader::from_options(self.options)
    }
}

/// Configured conversion pipeline
///
/// Cheap to share behind an `Arc`; holds no per-request state.
pub struct Reader {
    options: Arc<ReaderOptions>,
    client: HttpClient,
    sanitizer: Arc<Sanitizer>,
    registry: ExtractorRegistry,
}

impl Reader {
    /// Create a new reader builder
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::new()
    }

    /// Build a reader from explicit options
    pub fn from_options(options: ReaderOptions) -> Result<Self, ReaderError> {
        let options = Arc::new(options);
        let client = HttpClient::new(&options)?;
        let sanitizer = Arc::new(Sanitizer::new(&options)?);
        let registry = ExtractorRegistry::with_defaults(&client, &options, &sanitizer);
        Ok(Self {
            options,
            client,
            sanitizer,
            registry,
        })
    }

    /// Options this reader was built with
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// JSON schema of [`ConversionResult`]
    pub fn output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(ConversionResult);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Convert `url` to Markdown
    pub async fn convert(&self, url: &str) -> Result<ConversionResult, ReaderError> {
        let source_url = url.trim();
        validate_url(source_url)?;

        let normalized = normalize_url(source_url, &self.options.structured_hosts);
        if let Some(normalizer) = normalized.normalizer {
            debug!(
                url = %source_url,
                normalized = %normalized.url,
                %normalizer,
                "Normalized URL"
            );
        }
        let target =
            Url::parse(&normalized.url).map_err(|e| ReaderError::InvalidUrl(e.to_string()))?;
        let metadata = ResultMetadata::normalized(normalized.normalizer);

        let request = ExtractRequest {
            source_url,
            url: &target,
            metadata: &metadata,
        };
        for extractor in self.registry.iter() {
            if !extractor.matches(&target) {
                continue;
            }
            debug!(stage = extractor.name(), url = %target, "Running extractor");

            match extractor.extract(&request).await {
                StageOutcome::Produced(result) => {
                    if needs_proxy(&result, &target, &self.options) {
                        debug!(
                            stage = extractor.name(),
                            word_count = result.word_count,
                            "Result too thin, continuing"
                        );
                        continue;
                    }
                    info!(
                        stage = extractor.name(),
                        url = %target,
                        word_count = result.word_count,
                        "Converted"
                    );
                    return Ok(result);
                }
                StageOutcome::Declined => {
                    debug!(stage = extractor.name(), url = %target, "Extractor declined");
                }
                StageOutcome::Failed(e) => {
                    warn!(stage = extractor.name(), url = %target, error = %e, "Extractor failed");
                }
            }
        }

        let page = fetch_raw(&self.client, target.as_str(), &self.options).await?;
        let raw = self.render_html(
            &page.body,
            source_url,
            &page.final_url,
            metadata.with_renderer(Renderer::DirectHttp),
        );

        let escalate = match &raw {
            Some(result) => needs_proxy(result, &target, &self.options),
            None => is_proxy_host(&target, &self.options),
        };
        if escalate {
            debug!(stage = "proxy", url = %target, "Escalating to rendering proxy");
            let proxied = fetch_via_proxy(&self.client, target.as_str(), &self.options).await;
            if let Some(body) = proxied {
                if let Some(result) = self.render_html(
                    &body,
                    source_url,
                    target.as_str(),
                    metadata.with_renderer(Renderer::Proxy),
                ) {
                    info!(
                        stage = "proxy",
                        url = %target,
                        word_count = result.word_count,
                        "Converted"
                    );
                    return Ok(result);
                }
                warn!(stage = "proxy", url = %target, "Rendering proxy produced no text");
            }
        }

        match raw {
            Some(result) => {
                info!(stage = "raw", url = %target, word_count = result.word_count, "Converted");
                Ok(result)
            }
            None => {
                warn!(stage = "raw", url = %target, "No content could be extracted");
                Err(ReaderError::EmptyContent)
            }
        }
    }

    /// Sanitize, convert and title one HTML document
    fn render_html(
        &self,
        html: &str,
        source_url: &str,
        final_url: &str,
        metadata: ResultMetadata,
    ) -> Option<ConversionResult> {
        let markdown = html_to_markdown(&self.sanitizer.sanitize(html));
        ConversionResult::new(source_url, final_url, extract_title(html), markdown, metadata)
    }
}

fn validate_url(url: &str) -> Result<(), ReaderError> {
    if url.is_empty() {
        return Err(ReaderError::MissingUrl);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ReaderError::InvalidUrlScheme);
    }
    Url::parse(url)
        .map(|_| ())
        .map_err(|e| ReaderError::InvalidUrl(e.to_string()))
}
