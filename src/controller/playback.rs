//! Scroll ticks, taps and single-playback routing

use crate::model::{PaginationState, TargetDecision, ViewportState};

use super::PlaybackCoordinator;

impl PlaybackCoordinator {
    /// Runs the viewport policy for one scroll tick.
    ///
    /// A visible-range change carried by the tick is applied first. When the
    /// target changes, the previous item is paused before the new one is
    /// asked to play; a tick without a target pauses everything.
    pub fn on_scroll_tick(&mut self, viewport: &ViewportState) -> TargetDecision {
        let range = viewport.visible_range();
        if range != self.visible_range {
            self.on_visibility_changed(range);
        }

        let decision = self.tracker.compute_target(viewport, self.pagination_state());
        let target = decision.target_index.filter(|index| self.items.item_at(*index).is_some());

        if target != self.last_target {
            tracing::debug!(from = ?self.last_target, to = ?target, "Scroll target changed");
            self.last_target = target;
            self.set_active(target);
        } else if target.is_none() && self.active_index.is_some() {
            // nothing under the focal line; a tapped item stops too
            tracing::debug!(active = ?self.active_index, "No scroll target, pausing");
            self.set_active(None);
        }

        if decision.should_paginate {
            self.on_pagination_needed();
        }

        decision
    }

    /// Explicit tap: pauses the item if it is playing, otherwise makes it
    /// the active item right away.
    pub fn on_item_selected(&mut self, index: usize) {
        let visible = self.visible_range.is_some_and(|r| r.contains(index));
        if !visible || self.items.item_at(index).is_none() {
            tracing::debug!(index, "Ignoring selection outside the visible items");
            return;
        }

        if let Some(slot) = self.slots.get_mut(&index).filter(|slot| slot.is_playing()) {
            slot.set_desired_playing(false);
            self.active_index = None;
            self.paused_index = Some(index);
            tracing::info!(index, "Playback paused by selection");
            return;
        }

        tracing::info!(index, "Item selected for playback");
        self.set_active(Some(index));
    }

    pub(super) fn pagination_state(&self) -> PaginationState {
        PaginationState {
            loaded_count: self.items.loaded_count(),
            total_count: self.items.total_count(),
            is_paginating: self.is_paginating,
        }
    }

    fn set_active(&mut self, target: Option<usize>) {
        let target = target.filter(|index| self.visible_range.is_some_and(|r| r.contains(*index)));
        self.active_index = target;
        self.paused_index = None;
        // the activation window follows the active index
        self.reconcile_slots();
        self.apply_playback();
    }

    /// The only place play intent is distributed. Every other slot is
    /// paused before the active one is told to play.
    fn apply_playback(&mut self) {
        let active = self.active_index;

        for (index, slot) in self.slots.iter_mut() {
            if Some(*index) != active && (slot.desired_playing() || slot.is_playing()) {
                slot.set_desired_playing(false);
            }
        }

        if let Some(slot) = active.and_then(|index| self.slots.get_mut(&index)) {
            slot.set_desired_playing(true);
        }
    }
}
