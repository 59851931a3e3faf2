//! Ordered, deduplicated list of feed items with pagination state

use std::collections::HashSet;

use super::types::{Item, ItemId};

/// Feed items in display order, plus the page cursor used to fetch more.
///
/// Membership is tracked in an auxiliary id set so `has_item` is O(1) and a
/// duplicate id can never enter the list, whichever path delivers it.
#[derive(Debug, Default)]
pub struct ItemList {
    items: Vec<Item>,
    ids: HashSet<ItemId>,
    total_count: Option<usize>,
    page: u32,
}

impl ItemList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every item whose id is not already present, preserving
    /// arrival order. Returns how many were actually added.
    pub fn append(&mut self, items: impl IntoIterator<Item = Item>) -> usize {
        let before = self.items.len();
        for item in items {
            if self.ids.insert(item.id.clone()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    /// Inserts at index 0 unless the id is already present. Every existing
    /// index shifts by one when this returns `true`.
    pub fn insert_at_front(&mut self, item: Item) -> bool {
        if !self.ids.insert(item.id.clone()) {
            return false;
        }
        self.items.insert(0, item);
        true
    }

    pub fn item_at(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn has_item(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    pub fn loaded_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    pub fn set_total_count(&mut self, total: Option<usize>) {
        self.total_count = total;
    }

    /// Marks the list as complete at its current length
    pub fn mark_exhausted(&mut self) {
        self.total_count = Some(self.items.len());
    }

    /// Whether another page may still exist
    pub fn has_more(&self) -> bool {
        self.total_count.is_none_or(|total| self.items.len() < total)
    }

    /// Cursor of the next page to request
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn advance_page(&mut self) {
        self.page += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops all items and pagination state (pull-to-refresh)
    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.total_count = None;
        self.page = 0;
    }
}
