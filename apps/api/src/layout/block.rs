//! Rendered document tree consumed by the pagination engine.
//!
//! Blocks are produced once by the Markdown renderer and never mutated afterwards:
//! pagination clones and regroups them into sections, entries, and list fragments.

use serde::{Deserialize, Serialize};

/// Inline content inside a heading, paragraph, or list item label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text { text: String },
    Code { text: String },
    Strong { children: Vec<Inline> },
    Emphasis { children: Vec<Inline> },
    Strikethrough { children: Vec<Inline> },
    Link { href: String, children: Vec<Inline> },
    LineBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text { text: text.into() }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Inline::Text { text } | Inline::Code { text } => out.push_str(text),
            Inline::Strong { children }
            | Inline::Emphasis { children }
            | Inline::Strikethrough { children }
            | Inline::Link { children, .. } => {
                children.iter().for_each(|c| c.collect_text(out));
            }
            Inline::LineBreak => out.push(' '),
        }
    }
}

/// Concatenated text of a run of inlines.
pub fn inline_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    inlines.iter().for_each(|i| i.collect_text(&mut out));
    out
}

/// A list and its items. `start` is only meaningful for ordered lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    pub start: Option<u64>,
    pub items: Vec<ListItem>,
}

impl List {
    /// A list with the same kind as `self` and no items.
    pub fn empty_like(&self) -> List {
        List {
            ordered: self.ordered,
            start: self.start,
            items: Vec::new(),
        }
    }

    /// Same kind, numbering continued `offset` items past `self.start`.
    pub(crate) fn continued(&self, offset: usize) -> List {
        List {
            ordered: self.ordered,
            start: if self.ordered {
                Some(self.start.unwrap_or(1) + offset as u64)
            } else {
                None
            },
            items: Vec::new(),
        }
    }
}

/// A list item: an inline label followed by child blocks (paragraphs of a loose
/// list, nested lists, quotes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ListItem {
    pub label: Vec<Inline>,
    pub children: Vec<Block>,
}

impl ListItem {
    pub fn from_text(text: impl Into<String>) -> Self {
        ListItem {
            label: vec![Inline::text(text)],
            children: Vec::new(),
        }
    }

    /// Index of the first nested list among the children, if any.
    pub fn first_nested_list(&self) -> Option<usize> {
        self.children.iter().position(|b| matches!(b, Block::List(_)))
    }

    pub fn has_nested_list(&self) -> bool {
        self.first_nested_list().is_some()
    }

    /// Splits the item into its label part (label inline plus the children before
    /// the first nested list) and the nested tail.
    pub fn split_label(&self) -> (ListItem, Vec<Block>) {
        let at = self.first_nested_list().unwrap_or(self.children.len());
        let head = ListItem {
            label: self.label.clone(),
            children: self.children[..at].to_vec(),
        };
        (head, self.children[at..].to_vec())
    }

    /// Whitespace-normalised text of the whole item, nested content included.
    pub fn plain_text(&self) -> String {
        let mut parts = vec![inline_text(&self.label)];
        parts.extend(self.children.iter().map(Block::plain_text));
        normalize_ws(&parts.join(" "))
    }
}

/// A renderable block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph { content: Vec<Inline> },
    List(List),
    Quote { children: Vec<Block> },
    CodeBlock { text: String },
    Rule,
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            content: vec![Inline::text(text)],
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            content: vec![Inline::text(text)],
        }
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Block::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }

    /// H1 and H2 open a new section.
    pub fn starts_section(&self) -> bool {
        matches!(self.heading_level(), Some(1 | 2))
    }

    /// H3 opens a new entry inside the current section.
    pub fn starts_entry(&self) -> bool {
        self.heading_level() == Some(3)
    }

    /// Whitespace-normalised text content.
    pub fn plain_text(&self) -> String {
        let raw = match self {
            Block::Heading { content, .. } | Block::Paragraph { content } => inline_text(content),
            Block::List(list) => list
                .items
                .iter()
                .map(ListItem::plain_text)
                .collect::<Vec<_>>()
                .join(" "),
            Block::Quote { children } => children
                .iter()
                .map(Block::plain_text)
                .collect::<Vec<_>>()
                .join(" "),
            Block::CodeBlock { text } => text.clone(),
            Block::Rule => String::new(),
        };
        normalize_ws(&raw)
    }
}

/// Collapses runs of whitespace to single spaces and trims the ends.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
