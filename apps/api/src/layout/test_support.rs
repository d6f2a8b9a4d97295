//! Deterministic measurer for layout tests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::layout::block::{inline_text, Block, ListItem};
use crate::layout::measure::{MeasureError, Measurer};

/// Heights come from exact-text overrides, then from per-word weights
/// (10px per word unless overridden). Lists have no chrome, so a list is exactly
/// the sum of its items.
pub(crate) struct FixedMeasurer {
    blocks: RefCell<HashMap<String, f32>>,
    items: RefCell<HashMap<String, f32>>,
    words: HashMap<String, f32>,
    per_word: f32,
}

impl FixedMeasurer {
    pub fn new() -> Self {
        Self {
            blocks: RefCell::new(HashMap::new()),
            items: RefCell::new(HashMap::new()),
            words: HashMap::new(),
            per_word: 10.0,
        }
    }

    /// Fixed height for any non-list block whose text is `text`.
    pub fn with(self, text: &str, height: f32) -> Self {
        self.blocks.borrow_mut().insert(text.to_string(), height);
        self
    }

    pub fn with_word(mut self, word: &str, height: f32) -> Self {
        self.words.insert(word.to_string(), height);
        self
    }

    pub fn set_item(&self, text: &str, height: f32) {
        self.items.borrow_mut().insert(text.to_string(), height);
    }

    fn text_height(&self, text: &str) -> f32 {
        text.split_whitespace()
            .map(|w| self.words.get(w).copied().unwrap_or(self.per_word))
            .sum()
    }
}

impl Measurer for FixedMeasurer {
    fn block_height(&self, block: &Block) -> Result<f32, MeasureError> {
        match block {
            Block::List(list) => list
                .items
                .iter()
                .try_fold(0.0_f32, |acc, item| Ok(acc + self.item_height(item)?)),
            other => {
                let text = other.plain_text();
                Ok(match self.blocks.borrow().get(&text) {
                    Some(h) => *h,
                    None => self.text_height(&text),
                })
            }
        }
    }

    fn item_height(&self, item: &ListItem) -> Result<f32, MeasureError> {
        if let Some(h) = self.items.borrow().get(&item.plain_text()) {
            return Ok(*h);
        }
        let label = self.text_height(&inline_text(&item.label));
        Ok(label + self.blocks_height(&item.children)?)
    }
}
