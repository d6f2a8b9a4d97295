//! Page fitting: sections and entries → pages.
//!
//! # Architecture
//! - `paginate` is the synchronous pass: unwrap, segment, pre-split oversized
//!   entries, then pack sections greedily through a work queue.
//! - `paginate_or_fallback` turns a measurement failure into the single-page
//!   fallback instead of an error.
//! - `paginate_blocking` runs the pass on the blocking pool; every measurement is
//!   a synchronous layout computation and must not stall the async executor.
//!
//! Continuation sections are pushed to the front of the queue, so a section can
//! spill across any number of pages and is always finished before the next one
//! starts. Entries are measured and split once, when their section is first
//! opened; continuations reuse those heights.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::block::{Block, Inline};
use crate::layout::entry_split::split_oversized_entry;
use crate::layout::measure::{CachedMeasurer, MeasureError, Measurer};
use crate::layout::page::{
    continuation_name, ContentRoot, ContinuationHeader, Entry, Page, PageContent, PageSection,
    PaginationOptions,
};
use crate::layout::segment::{has_structure, segment, Section};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Measure(#[from] MeasureError),

    #[error("pagination worker failed: {0}")]
    Worker(String),
}

/// Why a pass produced the single-page layout instead of fitted pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Paginated mode was off.
    Disabled,
    /// The document has no H1/H2 to paginate around.
    NoHeadings,
    /// A measurement failed part-way through the pass.
    MeasurementFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub pages: Vec<Page>,
    /// Entries that were taller than a page and had to be split.
    pub split_entries: usize,
    pub fallback: Option<Fallback>,
}

impl Pagination {
    fn single_page(blocks: Vec<Block>, reason: Fallback) -> Self {
        Self {
            pages: vec![Page {
                number: 1,
                content: PageContent::Flow(blocks),
            }],
            split_entries: 0,
            fallback: Some(reason),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Lays `root` out into pages.
///
/// With paginated mode off, or when the document has no section headings, the
/// result is exactly one page holding every block untouched.
pub fn paginate(
    root: ContentRoot,
    options: &PaginationOptions,
    measurer: &dyn Measurer,
) -> Result<Pagination, LayoutError> {
    let blocks = root.into_blocks();
    if !options.paginated {
        return Ok(Pagination::single_page(blocks, Fallback::Disabled));
    }

    let sections = segment(&blocks);
    if !has_structure(&sections) {
        debug!(blocks = blocks.len(), "no section headings; single-page layout");
        return Ok(Pagination::single_page(blocks, Fallback::NoHeadings));
    }
    debug!(sections = sections.len(), "segmented document");

    let cached = CachedMeasurer::new(measurer);
    let pagination = fit_sections(
        sections,
        options.page.usable_height_px(),
        options.continuation_header,
        &cached,
    )?;
    debug!(
        pages = pagination.pages.len(),
        split_entries = pagination.split_entries,
        measured = cached.cached_entries(),
        "pagination pass complete"
    );
    Ok(pagination)
}

/// Like [`paginate`], but a failed measurement degrades to the single-page layout.
pub fn paginate_or_fallback(
    root: ContentRoot,
    options: &PaginationOptions,
    measurer: &dyn Measurer,
) -> Pagination {
    let blocks = root.clone().into_blocks();
    match paginate(root, options, measurer) {
        Ok(pagination) => pagination,
        Err(e) => {
            warn!(error = %e, "pagination failed; falling back to single page");
            Pagination::single_page(blocks, Fallback::MeasurementFailed)
        }
    }
}

/// Runs [`paginate_or_fallback`] on the blocking thread pool.
pub async fn paginate_blocking(
    root: ContentRoot,
    options: PaginationOptions,
    measurer: Arc<dyn Measurer + Send + Sync>,
) -> Result<Pagination, LayoutError> {
    tokio::task::spawn_blocking(move || {
        paginate_or_fallback(root, &options, measurer.as_ref())
    })
    .await
    .map_err(|e| LayoutError::Worker(e.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Fitting
// ────────────────────────────────────────────────────────────────────────────

fn fit_sections(
    sections: Vec<Section>,
    limit: f32,
    policy: ContinuationHeader,
    measurer: &dyn Measurer,
) -> Result<Pagination, MeasureError> {
    let mut queue: VecDeque<Pending> = sections
        .into_iter()
        .map(|section| Pending {
            section,
            heights: None,
        })
        .collect();
    let mut pages = PageBuilder::new();
    let mut split_entries = 0usize;

    while let Some(Pending { section, heights }) = queue.pop_front() {
        let header = rendered_header(&section, policy);
        let header_height = match &header {
            Some(block) => measurer.block_height(block)?,
            None => 0.0,
        };

        let (entries, heights) = match heights {
            Some(heights) => (section.entries, heights),
            None => measure_entries(
                section.entries,
                limit - header_height,
                measurer,
                &mut split_entries,
            )?,
        };
        let total = header_height + heights.iter().sum::<f32>();

        let fits_whole = total <= limit && (pages.is_empty() || pages.height + total <= limit);
        let take = if fits_whole {
            entries.len()
        } else {
            let mut take = greedy_fit(pages.height, header_height, &heights, limit);
            if take == 0 && !pages.is_empty() {
                pages.break_page();
                take = greedy_fit(0.0, header_height, &heights, limit);
            }
            if take == 0 && !entries.is_empty() {
                // Irreducible: the first entry alone overflows an empty page.
                take = 1;
            }
            take
        };

        let partial = header_height + heights[..take].iter().sum::<f32>();
        if pages.height + partial > limit && !pages.is_empty() {
            pages.break_page();
        }

        let mut placed = entries;
        let rest = placed.split_off(take);
        let rest_heights = heights[take..].to_vec();
        if header.is_some() || !placed.is_empty() {
            pages.push(
                PageSection {
                    name: section.name.clone(),
                    header,
                    continuation: section.continuation,
                    entries: placed,
                },
                partial,
            );
        }

        if !rest.is_empty() {
            debug!(
                section = %section.name,
                remaining = rest.len(),
                "section continues on next page"
            );
            queue.push_front(Pending {
                section: Section {
                    name: continuation_name(&section.name),
                    header: section.header,
                    entries: rest,
                    continuation: true,
                },
                heights: Some(rest_heights),
            });
        }
    }

    Ok(Pagination {
        pages: pages.finish(),
        split_entries,
        fallback: None,
    })
}

/// A section waiting to be placed. Continuations carry the heights of their
/// entries, which were already measured and split when the section was opened.
struct Pending {
    section: Section,
    heights: Option<Vec<f32>>,
}

/// Measures every entry, splitting those taller than `max_height`.
fn measure_entries(
    entries: Vec<Entry>,
    max_height: f32,
    measurer: &dyn Measurer,
    split_count: &mut usize,
) -> Result<(Vec<Entry>, Vec<f32>), MeasureError> {
    let mut out = Vec::with_capacity(entries.len());
    let mut heights = Vec::with_capacity(entries.len());

    for entry in entries {
        let height = measurer.blocks_height(&entry.blocks)?;
        if height <= max_height {
            out.push(entry);
            heights.push(height);
            continue;
        }

        let fragments = split_oversized_entry(&entry, max_height, measurer)?;
        if fragments.len() > 1 {
            *split_count += 1;
        }
        for fragment in fragments {
            heights.push(measurer.blocks_height(&fragment.blocks)?);
            out.push(fragment);
        }
    }
    Ok((out, heights))
}

/// Number of leading entries that fit after `used` px, the header counted once.
fn greedy_fit(used: f32, header_height: f32, heights: &[f32], limit: f32) -> usize {
    let mut total = used + header_height;
    let mut count = 0;
    for height in heights {
        if total + height > limit {
            break;
        }
        total += height;
        count += 1;
    }
    count
}

/// The header as it will appear on the page for this (possibly continued) section.
fn rendered_header(section: &Section, policy: ContinuationHeader) -> Option<Block> {
    if !section.continuation {
        return section.header.clone();
    }
    match policy {
        ContinuationHeader::Suppress => None,
        ContinuationHeader::Repeat => section.header.as_ref().map(|h| Block::Heading {
            level: h.heading_level().unwrap_or(2),
            content: vec![Inline::text(section.name.clone())],
        }),
    }
}

struct PageBuilder {
    pages: Vec<Page>,
    current: Vec<PageSection>,
    height: f32,
}

impl PageBuilder {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            height: 0.0,
        }
    }

    fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    fn push(&mut self, section: PageSection, height: f32) {
        self.current.push(section);
        self.height += height;
    }

    fn break_page(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let number = self.pages.len() + 1;
        debug!(page = number, height = self.height, "page break");
        self.pages.push(Page {
            number,
            content: PageContent::Sections(std::mem::take(&mut self.current)),
        });
        self.height = 0.0;
    }

    fn finish(mut self) -> Vec<Page> {
        self.break_page();
        self.pages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
