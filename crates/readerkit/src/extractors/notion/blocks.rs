//! Typed Notion block records
//!
//! The block API answers with a record map keyed by block id. Each entry is
//! decoded once into a [`Block`]; entries that do not fit the schema are
//! skipped.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Block type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Page,
    #[serde(alias = "paragraph")]
    Text,
    Header,
    SubHeader,
    SubSubHeader,
    BulletedList,
    NumberedList,
    ToDo,
    Quote,
    Code,
    Callout,
    Divider,
    Image,
    Toggle,
    #[serde(other)]
    Unrecognized,
}

/// Inline annotation on a rich-text fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Hyperlink target
    Link(String),
    /// Any other style (bold, italic, color, mention...)
    Style(String),
}

/// A run of text sharing the same annotations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichTextFragment {
    pub text: String,
    pub annotations: Vec<Annotation>,
}

/// Notion rich text: `[["text", [["a", "https://..."], ["b"]]], ...]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<Value>")]
pub struct RichText(pub Vec<RichTextFragment>);

impl From<Vec<Value>> for RichText {
    fn from(values: Vec<Value>) -> Self {
        RichText(values.iter().filter_map(parse_fragment).collect())
    }
}

fn parse_fragment(value: &Value) -> Option<RichTextFragment> {
    let parts = value.as_array()?;
    let text = parts.first()?.as_str()?.to_string();
    let annotations = parts
        .get(1)
        .and_then(Value::as_array)
        .map(|styles| styles.iter().filter_map(parse_annotation).collect())
        .unwrap_or_default();
    Some(RichTextFragment { text, annotations })
}

fn parse_annotation(value: &Value) -> Option<Annotation> {
    let parts = value.as_array()?;
    let name = parts.first()?.as_str()?;
    match (name, parts.get(1).and_then(Value::as_str)) {
        ("a", Some(href)) => Some(Annotation::Link(href.to_string())),
        _ => Some(Annotation::Style(name.to_string())),
    }
}

impl RichText {
    /// Render as Markdown; links become `[text](href)`
    pub fn to_markdown(&self) -> String {
        self.0
            .iter()
            .map(|fragment| {
                fragment
                    .annotations
                    .iter()
                    .fold(fragment.text.clone(), |text, annotation| match annotation {
                        Annotation::Link(href) => format!("[{}]({})", text, href),
                        Annotation::Style(_) => text,
                    })
            })
            .collect()
    }

    /// Plain text of the first fragment, for scalar properties
    pub fn first_text(&self) -> Option<&str> {
        self.0
            .first()
            .map(|f| f.text.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|f| f.text.is_empty())
    }
}

/// Named properties a block may carry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlockProperties {
    pub title: RichText,
    pub checked: RichText,
    pub language: RichText,
    pub icon: RichText,
    pub source: RichText,
}

/// Display options stored outside `properties`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlockFormat {
    pub page_icon: Option<String>,
    pub display_source: Option<String>,
}

/// One node of the block tree
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub properties: BlockProperties,
    #[serde(default)]
    pub format: BlockFormat,
    /// Child block ids in render order
    #[serde(default, rename = "content")]
    pub children: Vec<String>,
    /// Dead blocks are skipped when rendering
    #[serde(default)]
    pub alive: bool,
}

impl Block {
    /// Whether a to-do is ticked (`[["Yes"]]`)
    pub fn is_checked(&self) -> bool {
        self.properties.checked.first_text() == Some("Yes")
    }

    pub fn language(&self) -> &str {
        self.properties.language.first_text().unwrap_or("")
    }

    pub fn icon(&self) -> Option<&str> {
        self.properties
            .icon
            .first_text()
            .or(self.format.page_icon.as_deref())
    }

    pub fn source(&self) -> Option<&str> {
        self.properties
            .source
            .first_text()
            .or(self.format.display_source.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Blocks of one page, keyed by id
#[derive(Debug, Clone, Default)]
pub struct BlockMap {
    blocks: BTreeMap<String, Block>,
}

/// Record map entry: `{ "role": "...", "value": { ...block... } }`
#[derive(Debug, Deserialize)]
struct RecordEntry {
    value: Option<Value>,
}

impl BlockMap {
    /// Decode a raw record map, skipping entries that are not blocks
    pub fn from_record_map(record_map: BTreeMap<String, Value>) -> Self {
        let blocks = record_map
            .into_iter()
            .filter_map(|(id, entry)| {
                let value = serde_json::from_value::<RecordEntry>(entry).ok()?.value?;
                match serde_json::from_value::<Block>(value) {
                    Ok(block) => Some((id, block)),
                    Err(e) => {
                        debug!(block_id = %id, error = %e, "Skipping undecodable block");
                        None
                    }
                }
            })
            .collect();
        Self { blocks }
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The page block for `page_id`, else the first page block by key
    pub fn page_block(&self, page_id: &str) -> Option<&Block> {
        let wanted = compact_id(page_id);
        let mut pages = self.blocks.values().filter(|b| b.kind == BlockKind::Page);
        pages
            .clone()
            .find(|b| compact_id(&b.id) == wanted)
            .or_else(|| pages.next())
    }
}

fn compact_id(id: &str) -> String {
    id.replace('-', "").to_ascii_lowercase()
}

impl FromIterator<Block> for BlockMap {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().map(|b| (b.id.clone(), b)).collect(),
        }
    }
}
