//! Per-domain table of subrecord layouts

// standard library
use std::collections::BTreeMap;

// internal modules
use crate::library::Subrecord;

/// Object coverage of one subrecord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubrecordEntry {
    pub class_name: String,
    pub qty_objects: usize,
    /// Inclusive, 1-based object ranges within the class
    pub blocks: Vec<(usize, usize)>,
}

impl SubrecordEntry {
    /// Total objects covered by the blocks
    pub fn block_length(&self) -> usize {
        self.blocks
            .iter()
            .map(|(lo, hi)| (hi + 1).saturating_sub(*lo))
            .sum()
    }
}

impl From<&Subrecord> for SubrecordEntry {
    fn from(subrecord: &Subrecord) -> Self {
        Self {
            class_name: subrecord.class_name.clone(),
            qty_objects: subrecord.qty_objects,
            blocks: subrecord.blocks.clone(),
        }
    }
}

/// Subrecord id to layout, built once per domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubrecordTable {
    entries: BTreeMap<usize, SubrecordEntry>,
}

impl SubrecordTable {
    pub fn insert(&mut self, id: usize, entry: SubrecordEntry) {
        self.entries.insert(id, entry);
    }

    pub fn get(&self, id: usize) -> Option<&SubrecordEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
