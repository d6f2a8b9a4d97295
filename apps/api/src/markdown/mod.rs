//! Markdown → block tree, plus the contact prelude prepended to every resume.
//!
//! Parsing is event-driven: each container tag opens a frame on a stack and
//! closing it hands the finished node to its parent. Constructs the layout model
//! has no block for (tables, images, raw HTML, footnotes) degrade to their text.

pub mod html;

use pulldown_cmark::{Event, Options, Parser, Tag};

use crate::layout::block::{Block, Inline, List, ListItem};
use crate::models::UserDetails;

/// Substituted when a resume has no content at all.
pub const EMPTY_CONTENT_PLACEHOLDER: &str = "No content provided";

/// Renders Markdown into the block sequence the layout engine paginates.
pub fn render(markdown: &str) -> Vec<Block> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, options) {
        builder.event(event);
    }
    builder.finish()
}

/// Contact header: the name as an H1, then the non-empty contact fields joined by
/// " | ". Empty when there are no details.
pub fn contact_prelude(details: Option<&UserDetails>) -> String {
    let Some(d) = details.filter(|d| !d.is_blank()) else {
        return String::new();
    };

    let mut contact: Vec<String> = Vec::new();
    if !d.address.trim().is_empty() {
        contact.push(d.address.trim().to_string());
    }
    if !d.phone.trim().is_empty() {
        contact.push(d.phone.trim().to_string());
    }
    if !d.email.trim().is_empty() {
        let email = d.email.trim();
        contact.push(format!("[{email}](mailto:{email})"));
    }
    if !d.linkedin.trim().is_empty() {
        contact.push(format!("[Linkedin]({})", d.linkedin.trim()));
    }
    if !d.portfolio.trim().is_empty() {
        let portfolio = d.portfolio.trim();
        contact.push(format!("[{portfolio}]({portfolio})"));
    }

    format!("# {}\n\n{}\n\n", d.name.trim(), contact.join(" | "))
}

/// Full document source: contact prelude followed by the resume body.
pub fn compose_document(details: Option<&UserDetails>, content: &str) -> String {
    let body = if content.trim().is_empty() {
        EMPTY_CONTENT_PLACEHOLDER
    } else {
        content
    };
    format!("{}{}", contact_prelude(details), body)
}

// ────────────────────────────────────────────────────────────────────────────
// Tree builder
// ────────────────────────────────────────────────────────────────────────────

enum Span {
    Strong,
    Emphasis,
    Strikethrough,
    Link(String),
}

impl Span {
    fn close(self, children: Vec<Inline>) -> Inline {
        match self {
            Span::Strong => Inline::Strong { children },
            Span::Emphasis => Inline::Emphasis { children },
            Span::Strikethrough => Inline::Strikethrough { children },
            Span::Link(href) => Inline::Link { href, children },
        }
    }
}

enum Frame {
    Document(Vec<Block>),
    Paragraph(Vec<Inline>),
    Heading(u8, Vec<Inline>),
    Quote(Vec<Block>),
    List(List),
    Item(ListItem),
    CodeBlock(String),
    Span(Span, Vec<Inline>),
    /// Anything without a block of its own; keeps only its text.
    Opaque(Vec<Inline>),
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::Document(Vec::new())],
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(_) => self.close(),
            Event::Text(text) => {
                if let Some(Frame::CodeBlock(code)) = self.stack.last_mut() {
                    code.push_str(&text);
                } else {
                    self.push_inline(Inline::text(text.to_string()));
                }
            }
            Event::Code(text) => self.push_inline(Inline::Code {
                text: text.to_string(),
            }),
            Event::SoftBreak => self.push_inline(Inline::text(" ")),
            Event::HardBreak => self.push_inline(Inline::LineBreak),
            Event::InlineHtml(html) => {
                let tag = html.trim().to_ascii_lowercase();
                if tag.starts_with("<br") {
                    self.push_inline(Inline::LineBreak);
                }
            }
            Event::Rule => self.push_block(Block::Rule),
            Event::TaskListMarker(checked) => {
                self.push_inline(Inline::text(if checked { "[x] " } else { "[ ] " }))
            }
            Event::FootnoteReference(label) => self.push_inline(Inline::text(format!("[{label}]"))),
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph(Vec::new()),
            Tag::Heading { level, .. } => Frame::Heading(level as u8, Vec::new()),
            Tag::BlockQuote(_) => Frame::Quote(Vec::new()),
            Tag::CodeBlock(_) => Frame::CodeBlock(String::new()),
            Tag::List(start) => Frame::List(List {
                ordered: start.is_some(),
                start,
                items: Vec::new(),
            }),
            Tag::Item => Frame::Item(ListItem::default()),
            Tag::Emphasis => Frame::Span(Span::Emphasis, Vec::new()),
            Tag::Strong => Frame::Span(Span::Strong, Vec::new()),
            Tag::Strikethrough => Frame::Span(Span::Strikethrough, Vec::new()),
            Tag::Link { dest_url, .. } => Frame::Span(Span::Link(dest_url.to_string()), Vec::new()),
            _ => Frame::Opaque(Vec::new()),
        };
        self.stack.push(frame);
    }

    /// Every end tag closes the innermost open frame; the parser guarantees nesting.
    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Paragraph(content) => {
                if !content.is_empty() {
                    self.push_block(Block::Paragraph { content });
                }
            }
            Frame::Heading(level, content) => self.push_block(Block::Heading { level, content }),
            Frame::Quote(children) => self.push_block(Block::Quote { children }),
            Frame::List(list) => self.push_block(Block::List(list)),
            Frame::Item(item) => {
                if let Some(Frame::List(list)) = self.stack.last_mut() {
                    list.items.push(item);
                }
            }
            Frame::CodeBlock(mut text) => {
                if text.ends_with('\n') {
                    text.pop();
                }
                self.push_block(Block::CodeBlock { text });
            }
            Frame::Span(span, children) => self.push_inline(span.close(children)),
            Frame::Opaque(inlines) => self.push_inlines(inlines),
            Frame::Document(_) => {}
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        match self.stack.last_mut() {
            Some(
                Frame::Paragraph(content)
                | Frame::Heading(_, content)
                | Frame::Span(_, content)
                | Frame::Opaque(content),
            ) => append_inline(content, inline),
            Some(Frame::Item(item)) => {
                if item.children.is_empty() {
                    append_inline(&mut item.label, inline);
                } else if let Some(Block::Paragraph { content }) = item.children.last_mut() {
                    append_inline(content, inline);
                } else {
                    item.children.push(Block::Paragraph {
                        content: vec![inline],
                    });
                }
            }
            Some(Frame::CodeBlock(code)) => {
                code.push_str(&crate::layout::block::inline_text(std::slice::from_ref(&inline)))
            }
            _ => self.push_block(Block::Paragraph {
                content: vec![inline],
            }),
        }
    }

    fn push_inlines(&mut self, inlines: Vec<Inline>) {
        if inlines.is_empty() {
            return;
        }
        match self.stack.last() {
            Some(Frame::Document(_) | Frame::Quote(_) | Frame::List(_)) => {
                self.push_block(Block::Paragraph { content: inlines })
            }
            _ => inlines.into_iter().for_each(|i| self.push_inline(i)),
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(Frame::Document(blocks) | Frame::Quote(blocks)) => blocks.push(block),
            Some(Frame::Item(item)) => match block {
                // The first paragraph of a loose item is its label.
                Block::Paragraph { content } if item.label.is_empty() && item.children.is_empty() => {
                    item.label = content
                }
                other => item.children.push(other),
            },
            Some(Frame::List(list)) => list.items.push(ListItem {
                label: Vec::new(),
                children: vec![block],
            }),
            Some(
                Frame::Paragraph(content)
                | Frame::Heading(_, content)
                | Frame::Span(_, content)
                | Frame::Opaque(content),
            ) => content.push(Inline::text(block.plain_text())),
            Some(Frame::CodeBlock(code)) => code.push_str(&block.plain_text()),
            None => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        while self.stack.len() > 1 {
            self.close();
        }
        match self.stack.pop() {
            Some(Frame::Document(blocks)) => blocks,
            _ => Vec::new(),
        }
    }
}

/// Appends `inline`, merging adjacent text runs so paragraphs compare by content.
fn append_inline(content: &mut Vec<Inline>, inline: Inline) {
    if let (Some(Inline::Text { text: last }), Inline::Text { text }) = (content.last_mut(), &inline) {
        last.push_str(text);
        return;
    }
    content.push(inline);
}
