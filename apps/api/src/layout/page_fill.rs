//! Page fill analysis: how much of each page's usable height the placed content uses.
//!
//! Reported alongside the preview so the editor can flag pages that overflow (an
//! irreducible block taller than the page) or leave a large gap at the bottom.
//!
//! # Page fill rules
//! - Whitespace > 8% on any page but the last → `TooMuchWhitespace`
//! - Overflow ≤ 5%  → `MinorOverflow`
//! - Overflow > 5%  → `MajorOverflow`

use serde::{Deserialize, Serialize};

use crate::layout::measure::{MeasureError, Measurer};
use crate::layout::page::{Page, PageContent};

const WHITESPACE_THRESHOLD: f32 = 0.08;
const MINOR_OVERFLOW_THRESHOLD: f32 = 0.05;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFillVerdict {
    Acceptable,
    /// More than 8% of the page left empty. Never reported for the last page.
    TooMuchWhitespace,
    /// Up to 5% taller than the usable height.
    MinorOverflow,
    /// More than 5% taller than the usable height.
    MajorOverflow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFillAnalysis {
    pub page: usize,
    pub used_px: f32,
    pub available_px: f32,
    pub whitespace_fraction: f32,
    pub overflow_fraction: f32,
    pub verdict: PageFillVerdict,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Height of everything placed on `page`, headers included.
pub fn page_height(page: &Page, measurer: &dyn Measurer) -> Result<f32, MeasureError> {
    match &page.content {
        PageContent::Flow(blocks) => measurer.blocks_height(blocks),
        PageContent::Sections(sections) => {
            let mut total = 0.0_f32;
            for section in sections {
                if let Some(header) = &section.header {
                    total += measurer.block_height(header)?;
                }
                for entry in &section.entries {
                    total += measurer.blocks_height(&entry.blocks)?;
                }
            }
            Ok(total)
        }
    }
}

/// Classifies a single page's fill.
pub fn analyze_fill(page: usize, used_px: f32, available_px: f32, is_last: bool) -> PageFillAnalysis {
    let fill_ratio = if available_px > 0.0 {
        used_px / available_px
    } else {
        1.0
    };
    let whitespace_fraction = (1.0_f32 - fill_ratio).max(0.0);
    let overflow_fraction = (fill_ratio - 1.0_f32).max(0.0);

    let verdict = if overflow_fraction > MINOR_OVERFLOW_THRESHOLD {
        PageFillVerdict::MajorOverflow
    } else if overflow_fraction > 0.0 {
        PageFillVerdict::MinorOverflow
    } else if whitespace_fraction > WHITESPACE_THRESHOLD && !is_last {
        PageFillVerdict::TooMuchWhitespace
    } else {
        PageFillVerdict::Acceptable
    };

    PageFillAnalysis {
        page,
        used_px,
        available_px,
        whitespace_fraction,
        overflow_fraction,
        verdict,
    }
}

/// Analyzes every page of a pagination result against the usable page height.
pub fn analyze_pages(
    pages: &[Page],
    available_px: f32,
    measurer: &dyn Measurer,
) -> Result<Vec<PageFillAnalysis>, MeasureError> {
    let last = pages.len().saturating_sub(1);
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let used = page_height(page, measurer)?;
            Ok(analyze_fill(page.number, used, available_px, i == last))
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::block::Block;
    use crate::layout::page::{Entry, PageSection};
    use crate::layout::test_support::FixedMeasurer;

    #[test]
    fn test_acceptable_fill_verdict() {
        let analysis = analyze_fill(1, 960.0, 1000.0, false);
        assert_eq!(analysis.verdict, PageFillVerdict::Acceptable);
        assert!(analysis.whitespace_fraction < 0.08);
    }

    #[test]
    fn test_too_much_whitespace_verdict() {
        let analysis = analyze_fill(1, 700.0, 1000.0, false);
        assert_eq!(analysis.verdict, PageFillVerdict::TooMuchWhitespace);
        assert!((analysis.whitespace_fraction - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_last_page_may_be_short() {
        let analysis = analyze_fill(3, 100.0, 1000.0, true);
        assert_eq!(analysis.verdict, PageFillVerdict::Acceptable);
    }

    #[test]
    fn test_minor_overflow_verdict() {
        let analysis = analyze_fill(1, 1030.0, 1000.0, false);
        assert_eq!(analysis.verdict, PageFillVerdict::MinorOverflow);
        assert!(analysis.overflow_fraction > 0.0 && analysis.overflow_fraction <= 0.05);
    }

    #[test]
    fn test_major_overflow_verdict() {
        let analysis = analyze_fill(1, 1500.0, 1000.0, true);
        assert_eq!(analysis.verdict, PageFillVerdict::MajorOverflow);
    }

    #[test]
    fn test_page_height_counts_headers_and_entries() {
        let m = FixedMeasurer::new()
            .with("Experience", 50.0)
            .with("a", 300.0)
            .with("b", 200.0);
        let page = Page {
            number: 1,
            content: PageContent::Sections(vec![PageSection {
                name: "Experience".into(),
                header: Some(Block::heading(2, "Experience")),
                continuation: false,
                entries: vec![
                    Entry::new(vec![Block::paragraph("a")]),
                    Entry::new(vec![Block::paragraph("b")]),
                ],
            }]),
        };
        assert_eq!(page_height(&page, &m).unwrap(), 550.0);

        let report = analyze_pages(&[page], 1000.0, &m).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].page, 1);
        assert_eq!(report[0].verdict, PageFillVerdict::Acceptable);
    }
}
