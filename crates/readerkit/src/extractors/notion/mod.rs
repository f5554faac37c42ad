//! Notion extractor
//!
//! Handles Notion page URLs by fetching the page's block tree from the
//! companion API and rendering it straight to Markdown, without going
//! through HTML.

mod blocks;
mod render;

pub use blocks::{Annotation, Block, BlockKind, BlockMap, RichText, RichTextFragment};
pub use render::{render_page, RenderedPage};

use super::{ExtractRequest, Extractor, StageOutcome};
use crate::client::{host_matches, ReaderOptions};
use crate::fetch::HttpClient;
use crate::types::{ConversionResult, Renderer};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// 32 hex characters not followed by another hex character
static PAGE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9a-f]{32})(?:[^0-9a-f]|$)").expect("valid page id pattern"));

/// Find the Notion page id in a URL, as a hyphenated UUID (8-4-4-4-12)
pub fn extract_page_id(url: &str) -> Option<String> {
    let compact = url.replace('-', "");
    let raw = PAGE_ID_RE.captures(&compact)?.get(1)?.as_str().to_ascii_lowercase();
    Some(format!(
        "{}-{}-{}-{}-{}",
        &raw[0..8],
        &raw[8..12],
        &raw[12..16],
        &raw[16..20],
        &raw[20..32]
    ))
}

/// Notion block-tree extractor
///
/// Matches hosts in `structured_hosts` (and subdomains). Declines when the
/// URL has no page id; API failures are reported as stage failures.
pub struct NotionExtractor {
    client: HttpClient,
    options: Arc<ReaderOptions>,
}

impl NotionExtractor {
    pub fn new(client: HttpClient, options: Arc<ReaderOptions>) -> Self {
        Self { client, options }
    }

    fn api_url(&self, page_id: &str) -> String {
        format!(
            "{}{}",
            self.options.structured_api_base,
            page_id.replace('-', "")
        )
    }
}

#[async_trait]
impl Extractor for NotionExtractor {
    fn name(&self) -> &'static str {
        "notion"
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| host_matches(host, &self.options.structured_hosts))
    }

    async fn extract(&self, request: &ExtractRequest<'_>) -> StageOutcome {
        let Some(page_id) = extract_page_id(request.url.as_str()) else {
            debug!(url = %request.url, "No Notion page id in URL");
            return StageOutcome::Declined;
        };

        let record_map: BTreeMap<String, Value> = match self
            .client
            .get_json(&self.api_url(&page_id), self.options.api_timeout)
            .await
        {
            Ok(record_map) => record_map,
            Err(e) => return StageOutcome::Failed(e),
        };

        let blocks = BlockMap::from_record_map(record_map);
        debug!(page_id = %page_id, blocks = blocks.len(), "Decoded Notion record map");

        let Some(page) = render_page(&blocks, &page_id) else {
            return StageOutcome::Declined;
        };

        StageOutcome::from_result(ConversionResult::new(
            request.source_url,
            request.url.as_str(),
            page.title,
            page.markdown,
            request.metadata.with_renderer(Renderer::NotionApi),
        ))
    }
}
