//! Splitting a list into fragments that each fit a height budget.
//!
//! Items are packed fits-or-flush. An item that is too tall on its own is split
//! further: at its nested list when it has one, otherwise word by word.

use crate::layout::block::{Block, List, ListItem};
use crate::layout::entry_split::{split_blocks, Budget};
use crate::layout::measure::{MeasureError, Measurer};

/// Splits `list` into fragments whose heights respect `budget`.
///
/// Each fragment keeps the list's kind; ordered fragments continue the numbering
/// of the ones before them. Concatenating the fragments' items yields the original
/// items, except for items that had to be split by words, which come back as
/// several plain-text items. Never returns an empty fragment.
pub fn split_list(
    list: &List,
    budget: Budget,
    measurer: &dyn Measurer,
) -> Result<Vec<List>, MeasureError> {
    let chrome = measurer.block_height(&Block::List(list.empty_like()))?;
    let budget = budget.shrink(chrome);
    if budget.rest <= 0.0 {
        // No fragment could hold anything: the list is irreducible.
        return Ok(vec![list.clone()]);
    }
    let mut packer = ListPacker::new(list, budget);

    for item in &list.items {
        let height = measurer.item_height(item)?;
        if height <= packer.available() {
            packer.push(item.clone(), height);
            continue;
        }

        if item.has_nested_list() {
            let (head, _) = item.split_label();
            let label_height = measurer.item_height(&head)?;
            if packer.available() - label_height <= 0.0 {
                packer.flush();
            }
            let units = split_nested_item(item, packer.available(), packer.rest(), measurer)?;
            for unit in units {
                let h = measurer.item_height(&unit)?;
                packer.place(unit, h);
            }
            continue;
        }

        packer.flush();
        if height <= packer.available() {
            packer.push(item.clone(), height);
            continue;
        }

        let pieces = split_words(item, packer.available(), measurer)?;
        let last = pieces.len().saturating_sub(1);
        for (i, piece) in pieces.into_iter().enumerate() {
            let h = measurer.item_height(&piece)?;
            packer.push(piece, h);
            if i < last {
                packer.flush();
            }
        }
    }

    Ok(packer.finish())
}

/// Splits an item with a nested list into units: the label part followed by
/// successive fragments of the nested tail.
///
/// Every unit repeats the label, and so every level of nesting shrinks the budget
/// left for its tail. Once the label would take half of a fragment, the item is
/// returned unchanged, as it is when its tail cannot be divided.
fn split_nested_item(
    item: &ListItem,
    first: f32,
    rest: f32,
    measurer: &dyn Measurer,
) -> Result<Vec<ListItem>, MeasureError> {
    let (head, tail) = item.split_label();
    let label_height = measurer.item_height(&head)?;
    let budget = Budget { first, rest }.shrink(label_height);
    if budget.rest < label_height {
        return Ok(vec![item.clone()]);
    }
    let fragments = split_blocks(&tail, budget, measurer)?;
    if fragments.len() <= 1 {
        return Ok(vec![item.clone()]);
    }

    Ok(fragments
        .into_iter()
        .map(|fragment| {
            let mut unit = head.clone();
            unit.children.extend(fragment);
            unit
        })
        .collect())
}

/// Splits an item's text into plain-text items, each holding as many words as fit
/// `max_height`. Every piece holds at least one word, so an unbreakable word still
/// makes progress. Inline formatting inside the item is not preserved.
pub(crate) fn split_words(
    item: &ListItem,
    max_height: f32,
    measurer: &dyn Measurer,
) -> Result<Vec<ListItem>, MeasureError> {
    let text = item.plain_text();
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measurer.item_height(&ListItem::from_text(candidate.as_str()))? <= max_height {
            current = candidate;
        } else {
            debug_assert!(!current.is_empty());
            pieces.push(ListItem::from_text(std::mem::take(&mut current)));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        pieces.push(ListItem::from_text(current));
    }
    if pieces.is_empty() {
        pieces.push(item.clone());
    }
    Ok(pieces)
}

/// Accumulates items into list fragments. `index` counts fragments opened so far,
/// including a skipped first fragment when nothing fit in the initial budget.
struct ListPacker<'a> {
    source: &'a List,
    budget: Budget,
    done: Vec<List>,
    current: List,
    height: f32,
    index: usize,
    emitted: usize,
}

impl<'a> ListPacker<'a> {
    fn new(source: &'a List, budget: Budget) -> Self {
        Self {
            source,
            budget,
            done: Vec::new(),
            current: source.empty_like(),
            height: 0.0,
            index: 0,
            emitted: 0,
        }
    }

    fn available(&self) -> f32 {
        self.budget.for_fragment(self.index) - self.height
    }

    fn rest(&self) -> f32 {
        self.budget.rest
    }

    fn push(&mut self, item: ListItem, height: f32) {
        self.current.items.push(item);
        self.height += height;
    }

    /// Pushes onto the open fragment, flushing first when it would overflow.
    fn place(&mut self, item: ListItem, height: f32) {
        if height > self.available() && !self.current.items.is_empty() {
            self.flush();
        }
        self.push(item, height);
    }

    /// Closes the open fragment and moves on to the next budget.
    fn flush(&mut self) {
        if !self.current.items.is_empty() {
            self.emitted += self.current.items.len();
            let next = self.source.continued(self.emitted);
            self.done.push(std::mem::replace(&mut self.current, next));
        }
        self.height = 0.0;
        self.index += 1;
    }

    fn finish(mut self) -> Vec<List> {
        if !self.current.items.is_empty() {
            self.done.push(self.current);
        }
        self.done
    }
}
