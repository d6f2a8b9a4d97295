//! Measurement surface: rendered pixel height of content at the fixed page width.
//!
//! The fitting algorithm only ever talks to the [`Measurer`] trait, so the backend can
//! be a real layout engine, a headless browser, or the static text-metrics estimator
//! shipped here. Every call is synchronous; callers run pagination on a blocking thread.

use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;

use crate::layout::block::{inline_text, Block, ListItem};
use crate::layout::font_metrics::{get_metrics, FontFamily};
use crate::layout::page::PageSetup;

#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("measurement of {what} produced a non-finite height")]
    NonFinite { what: &'static str },

    #[error("measurement surface failed: {0}")]
    Surface(String),
}

/// Returns the rendered height (px) of content laid out at the page's text width.
pub trait Measurer {
    fn block_height(&self, block: &Block) -> Result<f32, MeasureError>;

    /// Height of a single list item laid out as a direct child of a top-level list.
    fn item_height(&self, item: &ListItem) -> Result<f32, MeasureError>;

    /// Height of a block sequence stacked vertically.
    fn blocks_height(&self, blocks: &[Block]) -> Result<f32, MeasureError> {
        blocks
            .iter()
            .try_fold(0.0_f32, |acc, b| Ok(acc + self.block_height(b)?))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text-metrics estimator
// ────────────────────────────────────────────────────────────────────────────

/// Typographic parameters mirroring the browser preview's default stylesheet.
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub base_font_px: f32,
    pub code_font_px: f32,
    pub line_height: f32,
    /// Heading font size as a multiple of the base size, H1..H6.
    pub heading_scale: [f32; 6],
    /// Vertical margin above and below a heading, in em of the heading size.
    pub heading_margin_em: [f32; 6],
    /// Vertical margin above and below paragraphs, top-level lists, quotes, code.
    pub block_margin_px: f32,
    pub list_indent_px: f32,
    pub rule_height_px: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            base_font_px: 16.0,
            code_font_px: 13.0,
            line_height: 1.5,
            heading_scale: [2.0, 1.5, 1.17, 1.0, 0.83, 0.67],
            heading_margin_em: [0.67, 0.83, 1.0, 1.33, 1.67, 2.33],
            block_margin_px: 16.0,
            list_indent_px: 40.0,
            rule_height_px: 17.0,
        }
    }
}

/// Narrowest column text is wrapped to, however deep the indentation.
pub const MIN_TEXT_WIDTH_EM: f32 = 10.0;

/// Estimates heights by greedy word-wrapping against static font-width tables.
///
/// Margins are additive (no collapsing), so the height of a block sequence is the
/// sum of its parts. Lists nested inside items carry no vertical margin.
#[derive(Debug, Clone)]
pub struct TextMetricsMeasurer {
    width_px: f32,
    font: FontFamily,
    style: TextStyle,
}

impl TextMetricsMeasurer {
    pub fn new(setup: &PageSetup) -> Self {
        Self::with_style(setup, TextStyle::default())
    }

    pub fn with_style(setup: &PageSetup, style: TextStyle) -> Self {
        Self {
            width_px: setup.usable_width_px(),
            font: setup.font,
            style,
        }
    }

    fn text_height(&self, text: &str, font_px: f32, width_px: f32, font: FontFamily) -> f32 {
        let width_em = (width_px / font_px).max(MIN_TEXT_WIDTH_EM);
        let lines = get_metrics(font).wrapped_lines(text, width_em);
        lines as f32 * font_px * self.style.line_height
    }

    fn block_at(&self, block: &Block, indent_px: f32, nested: bool) -> f32 {
        let width = self.width_px - indent_px;
        let margin = self.style.block_margin_px;
        match block {
            Block::Heading { level, content } => {
                let idx = (*level).clamp(1, 6) as usize - 1;
                let size = self.style.base_font_px * self.style.heading_scale[idx];
                let text = inline_text(content);
                2.0 * size * self.style.heading_margin_em[idx]
                    + self.text_height(&text, size, width, self.font)
            }
            Block::Paragraph { content } => {
                2.0 * margin
                    + self.text_height(
                        &inline_text(content),
                        self.style.base_font_px,
                        width,
                        self.font,
                    )
            }
            Block::List(list) => {
                let chrome = if nested { 0.0 } else { 2.0 * margin };
                chrome
                    + list
                        .items
                        .iter()
                        .map(|item| self.item_at(item, indent_px + self.style.list_indent_px))
                        .sum::<f32>()
            }
            Block::Quote { children } => {
                2.0 * margin
                    + children
                        .iter()
                        .map(|c| self.block_at(c, indent_px + self.style.list_indent_px, false))
                        .sum::<f32>()
            }
            Block::CodeBlock { text } => {
                let lines = text.lines().count().max(1);
                2.0 * margin + lines as f32 * self.style.code_font_px * self.style.line_height
            }
            Block::Rule => self.style.rule_height_px,
        }
    }

    fn item_at(&self, item: &ListItem, indent_px: f32) -> f32 {
        let label = inline_text(&item.label);
        let label_h = self.text_height(
            &label,
            self.style.base_font_px,
            self.width_px - indent_px,
            self.font,
        );
        let children_h: f32 = item
            .children
            .iter()
            .map(|c| self.block_at(c, indent_px, true))
            .sum();
        label_h + children_h
    }
}

fn finite(value: f32, what: &'static str) -> Result<f32, MeasureError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MeasureError::NonFinite { what })
    }
}

impl Measurer for TextMetricsMeasurer {
    fn block_height(&self, block: &Block) -> Result<f32, MeasureError> {
        finite(self.block_at(block, 0.0, false), "block")
    }

    fn item_height(&self, item: &ListItem) -> Result<f32, MeasureError> {
        finite(self.item_at(item, self.style.list_indent_px), "list item")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-pass memoisation
// ────────────────────────────────────────────────────────────────────────────

/// Memoises an inner measurer for the duration of one pagination pass.
///
/// Splitting re-measures the same subtrees many times (entries before and after
/// pre-splitting, list fragments, continuation sections); each distinct subtree is
/// measured once. Not `Sync`: build one per pass on the thread doing the work.
pub struct CachedMeasurer<'a> {
    inner: &'a dyn Measurer,
    blocks: RefCell<HashMap<Block, f32>>,
    items: RefCell<HashMap<ListItem, f32>>,
}

impl<'a> CachedMeasurer<'a> {
    pub fn new(inner: &'a dyn Measurer) -> Self {
        Self {
            inner,
            blocks: RefCell::new(HashMap::new()),
            items: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.blocks.borrow().len() + self.items.borrow().len()
    }
}

impl Measurer for CachedMeasurer<'_> {
    fn block_height(&self, block: &Block) -> Result<f32, MeasureError> {
        if let Some(h) = self.blocks.borrow().get(block) {
            return Ok(*h);
        }
        let h = self.inner.block_height(block)?;
        self.blocks.borrow_mut().insert(block.clone(), h);
        Ok(h)
    }

    fn item_height(&self, item: &ListItem) -> Result<f32, MeasureError> {
        if let Some(h) = self.items.borrow().get(item) {
            return Ok(*h);
        }
        let h = self.inner.item_height(item)?;
        self.items.borrow_mut().insert(item.clone(), h);
        Ok(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::block::List;
    use std::cell::Cell;

    fn measurer() -> TextMetricsMeasurer {
        TextMetricsMeasurer::new(&PageSetup::default())
    }

    fn bullets(items: &[&str]) -> Block {
        Block::List(List {
            ordered: false,
            start: None,
            items: items.iter().map(|t| ListItem::from_text(*t)).collect(),
        })
    }

    #[test]
    fn test_short_paragraph_is_one_line_plus_margins() {
        let h = measurer().block_height(&Block::paragraph("Hello")).unwrap();
        assert!((h - (32.0 + 24.0)).abs() < 1e-3, "got {h}");
    }

    #[test]
    fn test_long_paragraph_is_taller() {
        let m = measurer();
        let short = m.block_height(&Block::paragraph("Hello")).unwrap();
        let long = m
            .block_height(&Block::paragraph("lorem ipsum ".repeat(80)))
            .unwrap();
        assert!(long > short * 3.0);
    }

    #[test]
    fn test_list_height_is_chrome_plus_items() {
        let m = measurer();
        let list = bullets(&["one", "two", "three"]);
        let chrome = match &list {
            Block::List(l) => m.block_height(&Block::List(l.empty_like())).unwrap(),
            _ => unreachable!(),
        };
        let items: f32 = ["one", "two", "three"]
            .iter()
            .map(|t| m.item_height(&ListItem::from_text(*t)).unwrap())
            .sum();
        let total = m.block_height(&list).unwrap();
        assert!((total - (chrome + items)).abs() < 1e-3);
    }

    #[test]
    fn test_blocks_height_is_additive() {
        let m = measurer();
        let blocks = vec![Block::heading(2, "Skills"), Block::paragraph("Rust")];
        let sum = m.block_height(&blocks[0]).unwrap() + m.block_height(&blocks[1]).unwrap();
        assert!((m.blocks_height(&blocks).unwrap() - sum).abs() < 1e-3);
    }

    #[test]
    fn test_empty_heading_has_only_margins() {
        let h = measurer().block_height(&Block::heading(1, "")).unwrap();
        assert!((h - 2.0 * 32.0 * 0.67).abs() < 1e-2);
    }

    #[test]
    fn test_deep_indent_wraps_to_minimum_column() {
        let m = measurer();
        let line = 16.0 * 1.5;
        // Indented past the page width: still a readable column, not a word per line.
        let h = m.text_height("a bb c dd e ff", 16.0, -200.0, FontFamily::default());
        assert!((h - line).abs() < 1e-3, "got {h}");
    }

    struct CountingMeasurer {
        calls: Cell<usize>,
    }

    impl Measurer for CountingMeasurer {
        fn block_height(&self, _block: &Block) -> Result<f32, MeasureError> {
            self.calls.set(self.calls.get() + 1);
            Ok(10.0)
        }

        fn item_height(&self, _item: &ListItem) -> Result<f32, MeasureError> {
            self.calls.set(self.calls.get() + 1);
            Ok(5.0)
        }
    }

    #[test]
    fn test_cached_measurer_measures_each_subtree_once() {
        let inner = CountingMeasurer {
            calls: Cell::new(0),
        };
        let cached = CachedMeasurer::new(&inner);
        let p = Block::paragraph("same");
        for _ in 0..5 {
            assert_eq!(cached.block_height(&p).unwrap(), 10.0);
            assert_eq!(cached.item_height(&ListItem::from_text("x")).unwrap(), 5.0);
        }
        assert_eq!(inner.calls.get(), 2);
        assert_eq!(cached.cached_entries(), 2);
    }
}
