//! HTML sanitization and main-content selection

use crate::client::ReaderOptions;
use crate::error::ReaderError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("valid selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));
static HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3").expect("valid selector"));

/// Strips noise from HTML and picks the main content subtree
///
/// Selectors are parsed once at construction.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    unwanted_tags: Option<Selector>,
    unwanted: Vec<Selector>,
    main_content: Vec<Selector>,
}

impl Sanitizer {
    /// Build a sanitizer from the configured tag and selector lists
    pub fn new(options: &ReaderOptions) -> Result<Self, ReaderError> {
        let unwanted_tags = if options.unwanted_tags.is_empty() {
            None
        } else {
            Some(parse_selector(&options.unwanted_tags.join(", "))?)
        };
        let unwanted = options
            .unwanted_selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;
        let main_content = options
            .main_content_selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            unwanted_tags,
            unwanted,
            main_content,
        })
    }

    /// Clean `raw_html` and return the serialized main content node
    pub fn sanitize(&self, raw_html: &str) -> String {
        let mut document = Html::parse_document(raw_html);

        let comments: Vec<_> = document
            .tree
            .root()
            .descendants()
            .filter(|node| node.value().is_comment())
            .map(|node| node.id())
            .collect();
        for id in comments {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        let selectors = self.unwanted_tags.iter().chain(self.unwanted.iter());
        for selector in selectors {
            let ids: Vec<_> = document.select(selector).map(|el| el.id()).collect();
            for id in ids {
                if let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                }
            }
        }

        self.pick_main_node(&document)
    }

    fn pick_main_node(&self, document: &Html) -> String {
        for selector in &self.main_content {
            if let Some(node) = document.select(selector).next() {
                if has_text(node) {
                    return node.html();
                }
            }
        }
        if let Some(body) = document.select(&BODY).next() {
            if has_text(body) {
                return body.html();
            }
        }
        document.root_element().html()
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ReaderError> {
    Selector::parse(selector).map_err(|e| ReaderError::InvalidSelector(format!("{selector}: {e}")))
}

fn has_text(element: ElementRef<'_>) -> bool {
    element.text().any(|t| !t.trim().is_empty())
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Page title: `<title>` text, else the first h1-h3 heading
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TITLE)
        .next()
        .and_then(element_text)
        .or_else(|| document.select(&HEADING).find_map(element_text))
}
