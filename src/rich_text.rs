//! Structured rich text shared by CMS-authored and provider-derived descriptions
//!
//! Documents follow the Sanity Portable Text layout: a list of blocks, each
//! holding a list of spans. Fields this crate does not interpret (styles,
//! mark definitions, list attributes, custom annotations) are kept verbatim so
//! that a CMS document passes through the pipeline unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const BLOCK_TYPE: &str = "block";
const SPAN_TYPE: &str = "span";

fn default_block_type() -> String {
    BLOCK_TYPE.to_string()
}

fn default_span_type() -> String {
    SPAN_TYPE.to_string()
}

/// An ordered sequence of block nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichTextDocument {
    blocks: Vec<Block>,
}

/// A single block node (paragraph, heading, list item, or a custom block).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Node type, `block` for text blocks
    #[serde(rename = "_type", default = "default_block_type")]
    pub kind: String,
    /// Stable key assigned by the CMS editor
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Inline spans in reading order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Span>,
    /// Everything else the CMS attached to the block
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An inline run of literal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "_type", default = "default_span_type")]
    pub kind: String,
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Span {
    fn plain(text: &str) -> Self {
        Self {
            kind: default_span_type(),
            key: None,
            text: text.to_string(),
            marks: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Block {
    /// Concatenated text of all spans in this block.
    pub fn text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }

    fn is_list_item(&self) -> bool {
        self.extra.contains_key("listItem")
    }
}

impl RichTextDocument {
    /// Wraps plain text into exactly one block containing exactly one span.
    ///
    /// The text is kept verbatim, including line breaks and surrounding
    /// whitespace.
    pub fn from_plain_text(text: &str) -> Self {
        Self {
            blocks: vec![Block {
                kind: default_block_type(),
                key: None,
                children: vec![Span::plain(text)],
                extra: Map::new(),
            }],
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Renders the document as terminal-friendly text.
    ///
    /// Blocks are separated by blank lines, consecutive list items by a single
    /// line break. Blocks without text (images, embeds) are skipped.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        let mut previous_was_list_item = false;

        for block in &self.blocks {
            let text = block.text();
            if text.is_empty() {
                continue;
            }

            let list_item = block.is_list_item();
            if !out.is_empty() {
                out.push_str(if list_item && previous_was_list_item {
                    "\n"
                } else {
                    "\n\n"
                });
            }
            if list_item {
                out.push_str("- ");
            }
            out.push_str(&text);
            previous_was_list_item = list_item;
        }

        out
    }
}
