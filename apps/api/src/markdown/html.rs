//! HTML serialisation of blocks and laid-out pages, shared by the preview and PDF export.

use std::fmt::Write;

use crate::layout::block::{Block, Inline, List};
use crate::layout::page::{Page, PageContent, PageSection};

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Only web, mail, phone, and relative targets become links.
fn safe_href(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    ["http://", "https://", "mailto:", "tel:", "#", "/"]
        .iter()
        .any(|p| lower.starts_with(p))
}

pub fn inlines_to_html(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        write_inline(&mut out, inline);
    }
    out
}

fn write_inline(out: &mut String, inline: &Inline) {
    match inline {
        Inline::Text { text } => out.push_str(&escape(text)),
        Inline::Code { text } => {
            let _ = write!(out, "<code>{}</code>", escape(text));
        }
        Inline::Strong { children } => {
            let _ = write!(out, "<strong>{}</strong>", inlines_to_html(children));
        }
        Inline::Emphasis { children } => {
            let _ = write!(out, "<em>{}</em>", inlines_to_html(children));
        }
        Inline::Strikethrough { children } => {
            let _ = write!(out, "<del>{}</del>", inlines_to_html(children));
        }
        Inline::Link { href, children } if safe_href(href) => {
            let _ = write!(
                out,
                "<a href=\"{}\">{}</a>",
                escape(href),
                inlines_to_html(children)
            );
        }
        Inline::Link { children, .. } => out.push_str(&inlines_to_html(children)),
        Inline::LineBreak => out.push_str("<br>"),
    }
}

pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        write_block(&mut out, block);
    }
    out
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6);
            let _ = write!(out, "<h{level}>{}</h{level}>", inlines_to_html(content));
        }
        Block::Paragraph { content } => {
            let _ = write!(out, "<p>{}</p>", inlines_to_html(content));
        }
        Block::List(list) => write_list(out, list),
        Block::Quote { children } => {
            let _ = write!(out, "<blockquote>{}</blockquote>", blocks_to_html(children));
        }
        Block::CodeBlock { text } => {
            let _ = write!(out, "<pre><code>{}</code></pre>", escape(text));
        }
        Block::Rule => out.push_str("<hr>"),
    }
}

fn write_list(out: &mut String, list: &List) {
    if list.ordered {
        match list.start {
            Some(start) if start != 1 => {
                let _ = write!(out, "<ol start=\"{start}\">");
            }
            _ => out.push_str("<ol>"),
        }
    } else {
        out.push_str("<ul>");
    }
    for item in &list.items {
        let _ = write!(
            out,
            "<li>{}{}</li>",
            inlines_to_html(&item.label),
            blocks_to_html(&item.children)
        );
    }
    out.push_str(if list.ordered { "</ol>" } else { "</ul>" });
}

fn write_section(out: &mut String, section: &PageSection) {
    let class = if section.continuation {
        "section continuation"
    } else {
        "section"
    };
    let _ = write!(
        out,
        "<section class=\"{class}\" data-section=\"{}\">",
        escape(&section.name)
    );
    if let Some(header) = &section.header {
        write_block(out, header);
    }
    for entry in &section.entries {
        let _ = write!(out, "<div class=\"entry\">{}</div>", blocks_to_html(&entry.blocks));
    }
    out.push_str("</section>");
}

/// One `.page` container. `paginated` adds the class the stylesheet uses for
/// fixed A4 page boxes.
pub fn page_to_html(page: &Page, paginated: bool) -> String {
    let mut out = String::new();
    let class = if paginated { "page paginated" } else { "page" };
    let _ = write!(out, "<div class=\"{class}\" data-page=\"{}\">", page.number);
    match &page.content {
        PageContent::Flow(blocks) => out.push_str(&blocks_to_html(blocks)),
        PageContent::Sections(sections) => {
            for section in sections {
                write_section(&mut out, section);
            }
        }
    }
    out.push_str("</div>");
    out
}
