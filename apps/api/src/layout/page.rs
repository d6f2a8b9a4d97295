//! Page geometry and the paginated output model.

use serde::{Deserialize, Serialize};

use crate::layout::block::{normalize_ws, Block};
use crate::layout::font_metrics::FontFamily;

/// 1mm = 3.779px at 96dpi.
pub const PX_PER_MM: f32 = 3.779;
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;
pub const DEFAULT_PADDING_MM: f32 = 10.0;

/// Marker appended to the name of a section continued on a later page.
pub const CONTINUATION_SUFFIX: &str = "(cont.)";

/// Physical page geometry used to derive the packing budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    pub width_mm: f32,
    pub height_mm: f32,
    /// Padding applied on every side of the page box.
    pub padding_mm: f32,
    pub font: FontFamily,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4(DEFAULT_PADDING_MM)
    }
}

impl PageSetup {
    pub fn a4(padding_mm: f32) -> Self {
        Self {
            width_mm: A4_WIDTH_MM,
            height_mm: A4_HEIGHT_MM,
            padding_mm,
            font: FontFamily::Inter,
        }
    }

    /// Printable height in px: page height minus top and bottom padding.
    /// 277mm ≈ 1046.78px for A4 at 10mm padding.
    pub fn usable_height_px(&self) -> f32 {
        mm_to_px(self.height_mm - 2.0 * self.padding_mm)
    }

    /// Printable width in px. 190mm ≈ 718.01px for A4 at 10mm padding.
    pub fn usable_width_px(&self) -> f32 {
        mm_to_px(self.width_mm - 2.0 * self.padding_mm)
    }
}

pub fn mm_to_px(mm: f32) -> f32 {
    mm * PX_PER_MM
}

/// How a continuation section renders its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationHeader {
    /// No header on continuation pages. Keeps the output free of duplicated text.
    #[default]
    Suppress,
    /// Re-render the header with the " (cont.)" suffix.
    Repeat,
}

/// Options for one pagination pass. Replaces any ambient "paginated mode" state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationOptions {
    pub paginated: bool,
    pub page: PageSetup,
    pub continuation_header: ContinuationHeader,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            paginated: true,
            page: PageSetup::default(),
            continuation_header: ContinuationHeader::default(),
        }
    }
}

/// A run of blocks kept together inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    pub blocks: Vec<Block>,
}

impl Entry {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A section, or the part of one, placed on a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSection {
    pub name: String,
    /// The header as rendered on this page; `None` for headerless prelude content
    /// and for suppressed continuation headers.
    pub header: Option<Block>,
    pub continuation: bool,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PageContent {
    /// Paginated mode off: the whole document in one flow, untouched.
    Flow(Vec<Block>),
    Sections(Vec<PageSection>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub content: PageContent,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        match &self.content {
            PageContent::Flow(blocks) => blocks.is_empty(),
            PageContent::Sections(sections) => sections.is_empty(),
        }
    }

    /// Blocks in document order as they appear on this page, repeated
    /// continuation headers excluded.
    pub fn original_blocks(&self) -> Vec<Block> {
        match &self.content {
            PageContent::Flow(blocks) => blocks.clone(),
            PageContent::Sections(sections) => sections
                .iter()
                .flat_map(|s| {
                    let header = if s.continuation { None } else { s.header.clone() };
                    header
                        .into_iter()
                        .chain(s.entries.iter().flat_map(|e| e.blocks.iter().cloned()))
                })
                .collect(),
        }
    }
}

/// Content handed to the engine: flat blocks, or pages from a previous pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentRoot {
    Flat(Vec<Block>),
    Paged(Vec<Page>),
}

impl ContentRoot {
    /// Unwraps page containers to recover the flat block sequence.
    pub fn into_blocks(self) -> Vec<Block> {
        match self {
            ContentRoot::Flat(blocks) => blocks,
            ContentRoot::Paged(pages) => pages.iter().flat_map(Page::original_blocks).collect(),
        }
    }
}

/// Name for the continuation of `name`; the suffix is applied at most once.
pub fn continuation_name(name: &str) -> String {
    if name.trim_end().ends_with(CONTINUATION_SUFFIX) {
        name.to_string()
    } else {
        format!("{name} {CONTINUATION_SUFFIX}")
    }
}

/// Section name derived from its header text.
pub fn section_name(header: Option<&Block>) -> String {
    header.map(|h| normalize_ws(&h.plain_text())).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_usable_dimensions() {
        let setup = PageSetup::default();
        assert!((setup.usable_height_px() - 277.0 * 3.779).abs() < 1e-2);
        assert!((setup.usable_width_px() - 190.0 * 3.779).abs() < 1e-2);
    }

    #[test]
    fn test_padding_shrinks_usable_height() {
        assert!(PageSetup::a4(20.0).usable_height_px() < PageSetup::a4(10.0).usable_height_px());
    }

    #[test]
    fn test_continuation_name_suffixes_once() {
        assert_eq!(continuation_name("Experience"), "Experience (cont.)");
        assert_eq!(
            continuation_name("Experience (cont.)"),
            "Experience (cont.)"
        );
        assert_eq!(
            continuation_name(&continuation_name("Skills")),
            "Skills (cont.)"
        );
    }

    #[test]
    fn test_unwrap_paged_drops_repeated_headers() {
        let header = Block::heading(2, "Experience");
        let pages = vec![
            Page {
                number: 1,
                content: PageContent::Sections(vec![PageSection {
                    name: "Experience".into(),
                    header: Some(header.clone()),
                    continuation: false,
                    entries: vec![Entry::new(vec![Block::paragraph("a")])],
                }]),
            },
            Page {
                number: 2,
                content: PageContent::Sections(vec![PageSection {
                    name: "Experience (cont.)".into(),
                    header: Some(Block::heading(2, "Experience (cont.)")),
                    continuation: true,
                    entries: vec![Entry::new(vec![Block::paragraph("b")])],
                }]),
            },
        ];
        let blocks = ContentRoot::Paged(pages).into_blocks();
        assert_eq!(
            blocks,
            vec![header, Block::paragraph("a"), Block::paragraph("b")]
        );
    }
}
