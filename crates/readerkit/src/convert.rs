//! HTML to Markdown rendering

use htmd::options::{HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use once_cell::sync::Lazy;
use tracing::warn;

static CONVERTER: Lazy<HtmlToMarkdown> = Lazy::new(|| {
    HtmlToMarkdown::builder()
        // `head` is kept: a title-only document renders its title
        .skip_tags(vec!["script", "style", "noscript"])
        .options(Options {
            heading_style: HeadingStyle::Atx,
            ..Default::default()
        })
        .build()
});

/// Convert sanitized HTML to Markdown with ATX headings
///
/// Returns an empty string when the HTML holds no renderable text.
pub fn html_to_markdown(html: &str) -> String {
    match CONVERTER.convert(html) {
        Ok(markdown) => normalize_markdown(&markdown),
        Err(e) => {
            warn!(error = %e, "HTML to Markdown conversion failed");
            String::new()
        }
    }
}

/// Strip trailing whitespace per line, drop leading blank lines, trim
pub fn normalize_markdown(markdown: &str) -> String {
    let lines: Vec<&str> = markdown
        .lines()
        .map(str::trim_end)
        .skip_while(|line| line.trim().is_empty())
        .collect();
    lines.join("\n").trim().to_string()
}
