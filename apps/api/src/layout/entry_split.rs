//! Oversized-entry splitting: one entry taller than the page → several entries that
//! each fit, concatenating back to the original blocks.

use tracing::debug;

use crate::layout::block::Block;
use crate::layout::list_split::split_list;
use crate::layout::measure::{MeasureError, Measurer};
use crate::layout::page::Entry;

/// Height limits for a run of fragments: the first fragment may start part-way
/// down a page, later ones get a full page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    pub first: f32,
    pub rest: f32,
}

impl Budget {
    pub fn uniform(limit: f32) -> Self {
        Self {
            first: limit,
            rest: limit,
        }
    }

    /// Limit for the fragment at `index` (0-based).
    pub fn for_fragment(&self, index: usize) -> f32 {
        if index == 0 {
            self.first
        } else {
            self.rest
        }
    }

    pub fn shrink(&self, by: f32) -> Self {
        Self {
            first: self.first - by,
            rest: self.rest - by,
        }
    }
}

/// Splits `entry` into fragments no taller than `max_height` where possible.
///
/// Returns the entry unchanged when it already fits. A block that cannot be split
/// further and alone exceeds the limit is placed in a fragment of its own.
pub fn split_oversized_entry(
    entry: &Entry,
    max_height: f32,
    measurer: &dyn Measurer,
) -> Result<Vec<Entry>, MeasureError> {
    let total = measurer.blocks_height(&entry.blocks)?;
    if total <= max_height {
        return Ok(vec![entry.clone()]);
    }

    let fragments = split_blocks(&entry.blocks, Budget::uniform(max_height), measurer)?;
    debug!(
        height = total,
        max_height,
        fragments = fragments.len(),
        "split oversized entry"
    );
    Ok(fragments.into_iter().map(Entry::new).collect())
}

/// Packs blocks into fragments with the fits-or-flush rule.
///
/// Lists are not atomic: each is split by [`split_list`] against the space left in
/// the current fragment, and every list fragment is packed like any other block.
/// No returned fragment is empty.
pub(crate) fn split_blocks(
    blocks: &[Block],
    budget: Budget,
    measurer: &dyn Measurer,
) -> Result<Vec<Vec<Block>>, MeasureError> {
    let mut packer = Packer::new(budget);

    for block in blocks {
        match block {
            Block::List(list) => {
                let remaining = packer.remaining();
                let parts = split_list(
                    list,
                    Budget {
                        first: remaining,
                        rest: budget.rest,
                    },
                    measurer,
                )?;
                for part in parts {
                    let part = Block::List(part);
                    let height = measurer.block_height(&part)?;
                    packer.place(part, height);
                }
            }
            other => {
                let height = measurer.block_height(other)?;
                packer.place(other.clone(), height);
            }
        }
    }

    Ok(packer.finish())
}

struct Packer {
    budget: Budget,
    done: Vec<Vec<Block>>,
    current: Vec<Block>,
    height: f32,
}

impl Packer {
    fn new(budget: Budget) -> Self {
        Self {
            budget,
            done: Vec::new(),
            current: Vec::new(),
            height: 0.0,
        }
    }

    fn limit(&self) -> f32 {
        self.budget.for_fragment(self.done.len())
    }

    fn remaining(&self) -> f32 {
        self.limit() - self.height
    }

    fn place(&mut self, block: Block, height: f32) {
        if self.height + height > self.limit() && !self.current.is_empty() {
            self.done.push(std::mem::take(&mut self.current));
            self.height = 0.0;
        }
        self.current.push(block);
        self.height += height;
    }

    fn finish(mut self) -> Vec<Vec<Block>> {
        if !self.current.is_empty() {
            self.done.push(self.current);
        }
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::block::{List, ListItem};
    use crate::layout::test_support::FixedMeasurer;

    fn p(text: &str) -> Block {
        Block::paragraph(text)
    }

    #[test]
    fn test_entry_that_fits_is_returned_unchanged() {
        let m = FixedMeasurer::new().with("a", 100.0).with("b", 100.0);
        let entry = Entry::new(vec![p("a"), p("b")]);
        let out = split_oversized_entry(&entry, 500.0, &m).unwrap();
        assert_eq!(out, vec![entry]);
    }

    #[test]
    fn test_paragraphs_are_packed_fits_or_flush() {
        let m = FixedMeasurer::new()
            .with("a", 400.0)
            .with("b", 400.0)
            .with("c", 400.0);
        let entry = Entry::new(vec![p("a"), p("b"), p("c")]);
        let out = split_oversized_entry(&entry, 1000.0, &m).unwrap();
        assert_eq!(
            out,
            vec![Entry::new(vec![p("a"), p("b")]), Entry::new(vec![p("c")])]
        );
    }

    #[test]
    fn test_unsplittable_block_gets_its_own_fragment() {
        let m = FixedMeasurer::new()
            .with("small", 100.0)
            .with("giant", 1500.0)
            .with("tail", 100.0);
        let entry = Entry::new(vec![p("small"), p("giant"), p("tail")]);
        let out = split_oversized_entry(&entry, 1000.0, &m).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].blocks, vec![p("giant")]);
        assert!(out.iter().all(|e| !e.is_empty()));
    }

    #[test]
    fn test_list_is_split_across_fragments() {
        let m = FixedMeasurer::new().with("role", 200.0);
        let items: Vec<ListItem> = (0..10)
            .map(|i| ListItem::from_text(format!("bullet-{i}")))
            .collect();
        for item in &items {
            m.set_item(&item.plain_text(), 150.0);
        }
        let list = Block::List(List {
            ordered: false,
            start: None,
            items: items.clone(),
        });
        let entry = Entry::new(vec![p("role"), list]);

        let out = split_oversized_entry(&entry, 1000.0, &m).unwrap();
        assert!(out.len() >= 2);
        // First fragment keeps the role line plus as many bullets as fit after it.
        assert_eq!(out[0].blocks[0], p("role"));
        for fragment in &out {
            assert!(m.blocks_height(&fragment.blocks).unwrap() <= 1000.0);
        }
        let rebuilt: Vec<ListItem> = out
            .iter()
            .flat_map(|e| e.blocks.iter())
            .filter_map(|b| match b {
                Block::List(l) => Some(l.items.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn test_budget_for_fragment() {
        let b = Budget {
            first: 300.0,
            rest: 1000.0,
        };
        assert_eq!(b.for_fragment(0), 300.0);
        assert_eq!(b.for_fragment(3), 1000.0);
        assert_eq!(b.shrink(100.0).first, 200.0);
    }
}
