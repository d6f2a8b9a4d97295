//! Segmentation: flat blocks → sections → entries.

use serde::{Deserialize, Serialize};

use crate::layout::block::Block;
use crate::layout::page::{section_name, Entry};

/// A heading (H1/H2) and the entries that follow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub header: Option<Block>,
    pub entries: Vec<Entry>,
    /// True for synthetic sections carrying spillover entries.
    pub continuation: bool,
}

impl Section {
    fn open(header: Option<Block>) -> Self {
        Self {
            name: section_name(header.as_ref()),
            header,
            entries: Vec::new(),
            continuation: false,
        }
    }

    fn is_blank(&self) -> bool {
        self.header.is_none() && self.entries.is_empty()
    }
}

/// Splits a block sequence into sections in a single pass.
///
/// H1/H2 close the open entry and section and start a new section; H3 closes the
/// open entry and starts a new one; everything else joins the open entry.
/// Content before the first heading forms a headerless section.
pub fn segment(blocks: &[Block]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section::open(None);
    let mut entry: Vec<Block> = Vec::new();

    for block in blocks {
        if block.starts_section() {
            flush_entry(&mut current, &mut entry);
            if !current.is_blank() {
                sections.push(current);
            }
            current = Section::open(Some(block.clone()));
        } else if block.starts_entry() {
            flush_entry(&mut current, &mut entry);
            entry.push(block.clone());
        } else {
            entry.push(block.clone());
        }
    }

    flush_entry(&mut current, &mut entry);
    if !current.is_blank() {
        sections.push(current);
    }
    sections
}

fn flush_entry(section: &mut Section, entry: &mut Vec<Block>) {
    if !entry.is_empty() {
        section.entries.push(Entry::new(std::mem::take(entry)));
    }
}

/// Whether segmentation found any heading to paginate around.
pub fn has_structure(sections: &[Section]) -> bool {
    sections.iter().any(|s| s.header.is_some())
}
