//! Maps viewport geometry to a playback target and a pagination trigger

use super::types::ViewportState;

/// Result of one [`ViewportTracker::compute_target`] pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TargetDecision {
    pub target_index: Option<usize>,
    pub should_paginate: bool,
}

/// Pagination inputs read from the item list and coordinator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationState {
    pub loaded_count: usize,
    pub total_count: Option<usize>,
    pub is_paginating: bool,
}

/// Pure policy; holds only tuning values.
#[derive(Clone, Copy, Debug)]
pub struct ViewportTracker {
    focal_fraction: f32,
    lookahead_count: usize,
}

impl ViewportTracker {
    pub fn new(focal_fraction: f32, lookahead_count: usize) -> Self {
        Self {
            focal_fraction: focal_fraction.clamp(0.0, 1.0),
            lookahead_count,
        }
    }

    /// Position of the focal line in content coordinates
    pub fn focal_line(&self, viewport: &ViewportState) -> f32 {
        viewport.offset + viewport.height * self.focal_fraction
    }

    /// Picks the first visible cell crossing the focal line, or the top
    /// cell while the list rests at its start. Linear in the number of
    /// visible cells.
    pub fn compute_target(&self, viewport: &ViewportState, pagination: PaginationState) -> TargetDecision {
        let target_index = if viewport.offset <= 0.0 {
            viewport.items.first().map(|bounds| bounds.index)
        } else {
            let line = self.focal_line(viewport);
            viewport
                .items
                .iter()
                .find(|bounds| bounds.crosses(line))
                .map(|bounds| bounds.index)
        };

        let should_paginate = viewport.visible_range().is_some_and(|range| {
            range.hi + self.lookahead_count > pagination.loaded_count
                && pagination
                    .total_count
                    .is_none_or(|total| pagination.loaded_count < total)
                && !pagination.is_paginating
        });

        TargetDecision {
            target_index,
            should_paginate,
        }
    }
}
