//! Core type definitions for the feed

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identity of a feed item
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A video item as delivered by the data source. Immutable once fetched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub created_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            created_at: Utc::now(),
            width: 0,
            height: 0,
            thumbnail_url: None,
        }
    }
}

/// One page of results from the data source
#[derive(Clone, Debug, Default)]
pub struct Page {
    pub items: Vec<Item>,
    /// Total number of items available, when the source knows it
    pub total_count: Option<usize>,
    /// Set by the source when no page follows this one
    pub is_last: bool,
}

/// Inclusive, contiguous interval of list indices currently on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleRange {
    pub lo: usize,
    pub hi: usize,
}

impl VisibleRange {
    /// Builds a range, swapping the bounds if given in reverse
    pub fn new(lo: usize, hi: usize) -> Self {
        if lo <= hi {
            Self { lo, hi }
        } else {
            Self { lo: hi, hi: lo }
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.lo && index <= self.hi
    }

    /// Number of indices in the range (never zero)
    pub fn count(&self) -> usize {
        self.hi - self.lo + 1
    }

    pub fn indices(self) -> RangeInclusive<usize> {
        self.lo..=self.hi
    }

    pub(crate) fn shifted(self, by: usize) -> Self {
        Self {
            lo: self.lo + by,
            hi: self.hi + by,
        }
    }
}

/// Geometry of one on-screen cell, in content coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemBounds {
    pub index: usize,
    pub top: f32,
    pub bottom: f32,
}

impl ItemBounds {
    pub fn new(index: usize, top: f32, bottom: f32) -> Self {
        Self { index, top, bottom }
    }

    pub fn crosses(&self, line: f32) -> bool {
        self.top <= line && line < self.bottom
    }
}

/// Snapshot of the viewport delivered on every scroll tick
#[derive(Clone, Debug, Default)]
pub struct ViewportState {
    /// Scroll offset of the viewport's top edge
    pub offset: f32,
    pub height: f32,
    /// Visible cells, top to bottom
    pub items: Vec<ItemBounds>,
}

impl ViewportState {
    /// Builds the viewport for a list of fixed-height rows
    pub fn uniform(offset: f32, height: f32, row_height: f32, row_count: usize) -> Self {
        let mut items = Vec::new();
        if row_height > 0.0 && height > 0.0 {
            let first = (offset.max(0.0) / row_height).floor() as usize;
            let mut index = first;
            while index < row_count {
                let top = index as f32 * row_height;
                if top >= offset + height {
                    break;
                }
                items.push(ItemBounds::new(index, top, top + row_height));
                index += 1;
            }
        }
        Self {
            offset,
            height,
            items,
        }
    }

    /// Index interval spanned by the visible cells
    pub fn visible_range(&self) -> Option<VisibleRange> {
        let lo = self.items.iter().map(|b| b.index).min()?;
        let hi = self.items.iter().map(|b| b.index).max()?;
        Some(VisibleRange::new(lo, hi))
    }
}
