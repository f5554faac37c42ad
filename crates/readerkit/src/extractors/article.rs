//! Article extractor
//!
//! Fetches the page and runs Readability-style extraction on it via
//! dom_smoothie. The extracted article HTML goes through the same
//! sanitizer and converter as the direct fetch.

use super::{ExtractRequest, Extractor, StageOutcome};
use crate::client::ReaderOptions;
use crate::convert::html_to_markdown;
use crate::error::ReaderError;
use crate::fetch::{fetch_raw, FetchedPage, HttpClient};
use crate::sanitize::{extract_title, Sanitizer};
use crate::types::{ConversionResult, Renderer, ResultMetadata};
use async_trait::async_trait;
use dom_smoothie::Readability;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use url::Url;

static META_KEYWORDS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[name='keywords']").expect("valid selector"));

/// Readability-based article extraction
pub struct ArticleExtractor {
    client: HttpClient,
    options: Arc<ReaderOptions>,
    sanitizer: Arc<Sanitizer>,
}

impl ArticleExtractor {
    pub fn new(client: HttpClient, options: Arc<ReaderOptions>, sanitizer: Arc<Sanitizer>) -> Self {
        Self {
            client,
            options,
            sanitizer,
        }
    }
}

#[async_trait]
impl Extractor for ArticleExtractor {
    fn name(&self) -> &'static str {
        "article"
    }

    fn matches(&self, _url: &Url) -> bool {
        self.options.enable_article
    }

    async fn extract(&self, request: &ExtractRequest<'_>) -> StageOutcome {
        let page = match fetch_raw(&self.client, request.url.as_str(), &self.options).await {
            Ok(page) => page,
            Err(e) => return StageOutcome::Failed(e),
        };

        // The parsed DOM is not Send, so parsing stays on a blocking thread.
        let sanitizer = Arc::clone(&self.sanitizer);
        let source_url = request.source_url.to_string();
        let metadata = request.metadata.with_renderer(Renderer::Article);
        let joined = tokio::task::spawn_blocking(move || {
            extract_article(&page, &sanitizer, source_url, metadata)
        })
        .await;

        match joined {
            Ok(Ok(result)) => StageOutcome::from_result(result),
            Ok(Err(e)) => StageOutcome::Failed(e),
            Err(e) => StageOutcome::Failed(ReaderError::RequestError(format!(
                "article extraction task failed: {e}"
            ))),
        }
    }
}

/// Extract, sanitize and convert the article in `page`
fn extract_article(
    page: &FetchedPage,
    sanitizer: &Sanitizer,
    source_url: String,
    metadata: ResultMetadata,
) -> Result<Option<ConversionResult>, ReaderError> {
    let mut readability = Readability::new(page.body.as_str(), Some(page.final_url.as_str()), None)
        .map_err(|e| ReaderError::InvalidPayload(e.to_string()))?;
    let article = readability
        .parse()
        .map_err(|e| ReaderError::InvalidPayload(e.to_string()))?;

    let content = article.content.to_string();
    if content.trim().is_empty() {
        return Err(ReaderError::EmptyContent);
    }

    let markdown = html_to_markdown(&sanitizer.sanitize(&content));
    let title = Some(article.title.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| extract_title(&page.body));

    let metadata = ResultMetadata {
        authors: split_authors(article.byline.as_deref()),
        publish_date: article
            .published_time
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        keywords: meta_keywords(&page.body),
        ..metadata
    };

    Ok(ConversionResult::new(
        source_url,
        page.final_url.as_str(),
        title,
        markdown,
        metadata,
    ))
}

/// Authors from a byline such as "Ada Lovelace, Charles Babbage"
fn split_authors(byline: Option<&str>) -> Vec<String> {
    let Some(byline) = byline else {
        return Vec::new();
    };
    split_list(byline.trim().trim_start_matches("By ").trim_start_matches("by "))
}

/// Keywords from `<meta name="keywords">`
fn meta_keywords(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&META_KEYWORDS)
        .filter_map(|meta| meta.value().attr("content"))
        .flat_map(split_list)
        .collect()
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
