//! Block tree to Markdown

use super::blocks::{Block, BlockKind, BlockMap};
use std::collections::HashSet;

/// Glyph used for callouts without an icon
const DEFAULT_CALLOUT_ICON: &str = "💡";

/// Markdown rendering of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Page title, if non-empty
    pub title: Option<String>,
    /// Markdown body including the title heading
    pub markdown: String,
}

/// Render the page block for `page_id` and its live descendants
///
/// Returns `None` when the map holds no page block or nothing renders.
pub fn render_page(blocks: &BlockMap, page_id: &str) -> Option<RenderedPage> {
    let page = blocks.page_block(page_id)?;
    let title = page.properties.title.to_markdown();

    let mut lines = Vec::new();
    if !title.is_empty() {
        lines.push(format!("# {}", title));
        lines.push(String::new());
    }

    let mut visited = HashSet::from([page.id.as_str()]);
    render_blocks(&page.children, blocks, 0, &mut visited, &mut lines);

    let markdown = lines.join("\n").trim().to_string();
    if markdown.is_empty() {
        return None;
    }
    Some(RenderedPage {
        title: Some(title).filter(|t| !t.is_empty()),
        markdown,
    })
}

fn render_blocks<'a>(
    ids: &'a [String],
    blocks: &'a BlockMap,
    depth: usize,
    visited: &mut HashSet<&'a str>,
    lines: &mut Vec<String>,
) {
    for id in ids {
        let Some(block) = blocks.get(id) else {
            continue;
        };
        // A block renders at most once, even if the map links it twice.
        if !block.alive || !visited.insert(block.id.as_str()) {
            continue;
        }

        render_block(block, depth, lines);
        render_blocks(&block.children, blocks, depth + 1, visited, lines);
    }
}

fn render_block(block: &Block, depth: usize, lines: &mut Vec<String>) {
    let text = block.properties.title.to_markdown();
    let indent = "  ".repeat(depth);

    match block.kind {
        BlockKind::Text | BlockKind::Page | BlockKind::Unrecognized => {
            if !text.is_empty() {
                lines.push(text);
                lines.push(String::new());
            }
        }
        BlockKind::Header => {
            lines.push(format!("# {}", text));
            lines.push(String::new());
        }
        BlockKind::SubHeader => {
            lines.push(format!("## {}", text));
            lines.push(String::new());
        }
        BlockKind::SubSubHeader => {
            lines.push(format!("### {}", text));
            lines.push(String::new());
        }
        BlockKind::BulletedList | BlockKind::Toggle => {
            lines.push(format!("{}- {}", indent, text));
        }
        BlockKind::NumberedList => {
            lines.push(format!("{}1. {}", indent, text));
        }
        BlockKind::ToDo => {
            let mark = if block.is_checked() { "x" } else { " " };
            lines.push(format!("{}- [{}] {}", indent, mark, text));
        }
        BlockKind::Quote => {
            lines.push(format!("> {}", text));
            lines.push(String::new());
        }
        BlockKind::Code => {
            lines.push(format!("```{}", block.language()));
            lines.push(text);
            lines.push("```".to_string());
            lines.push(String::new());
        }
        BlockKind::Callout => {
            let icon = block.icon().unwrap_or(DEFAULT_CALLOUT_ICON);
            lines.push(format!("> {} {}", icon, text));
            lines.push(String::new());
        }
        BlockKind::Divider => {
            lines.push("---".to_string());
            lines.push(String::new());
        }
        BlockKind::Image => {
            if let Some(source) = block.source() {
                lines.push(format!("![image]({})", source));
                lines.push(String::new());
            }
        }
    }
}
