//! Visible range changes, slot reconciliation and container recycling

use std::ops::Range;

use crate::model::{ItemId, ResourceSlot, SlotState, VisibleRange};

use super::PlaybackCoordinator;

impl PlaybackCoordinator {
    /// The view reports a new visible interval (`None` when nothing with
    /// backing data is on screen). Slots leaving the activation window are
    /// released before any entering slot is activated.
    pub fn on_visibility_changed(&mut self, range: Option<VisibleRange>) {
        if self.visible_range != range {
            tracing::debug!(from = ?self.visible_range, to = ?range, "Visible range changed");
        }
        self.visible_range = range;

        if let Some(active) = self.active_index {
            if !range.is_some_and(|r| r.contains(active)) {
                tracing::debug!(index = active, "Active item scrolled out");
                if let Some(slot) = self.slots.get_mut(&active) {
                    slot.set_desired_playing(false);
                }
                self.active_index = None;
                self.last_target = None;
            }
        }
        if self.paused_index.is_some_and(|paused| !range.is_some_and(|r| r.contains(paused))) {
            self.paused_index = None;
        }

        self.reconcile_slots();
    }

    /// The view reused the container at `index` for `new_item`. The previous
    /// binding is fully released first, even with its acquire still in flight.
    pub fn on_slot_recycled(&mut self, index: usize, new_item: ItemId) {
        let current = self.slots.get(&index).map(|slot| slot.item_id() == &new_item);
        if current == Some(true) {
            return;
        }
        tracing::debug!(index, item = %new_item, "Cell recycled");

        if !self.items.has_item(&new_item) || !self.activation_window().contains(&index) {
            self.release_slot(index);
            return;
        }

        // the item may still be tracked at its old position
        let elsewhere: Vec<usize> = self
            .slots
            .iter()
            .filter(|(i, slot)| **i != index && slot.item_id() == &new_item)
            .map(|(i, _)| *i)
            .collect();
        for other in elsewhere {
            self.release_slot(other);
        }

        if current.is_some() {
            self.recycle_slot(index, new_item);
        } else {
            self.slots.insert(index, ResourceSlot::new(new_item));
            self.activate_slot(index);
        }
    }

    /// Indices allowed to hold a slot: the visible range limited to loaded
    /// items and to at most `prefetch_window` entries, kept around the
    /// active (or tap-paused) index when the range is wider than the window.
    pub(super) fn activation_window(&self) -> Range<usize> {
        let Some(range) = self.visible_range else {
            return 0..0;
        };
        let loaded = self.items.loaded_count();
        if range.lo >= loaded {
            return 0..0;
        }
        let hi = range.hi.min(loaded - 1);
        let window = self.config.prefetch_window.max(1);
        if hi - range.lo < window {
            return range.lo..hi + 1;
        }
        let anchor = self
            .active_index
            .or(self.paused_index)
            .unwrap_or(range.lo)
            .clamp(range.lo, hi);
        let start = anchor.min(hi + 1 - window);
        start..start + window
    }

    /// Brings the slot set in line with the activation window: outgoing
    /// slots are released, missing ones created, idle ones retried.
    pub(super) fn reconcile_slots(&mut self) {
        let window = self.activation_window();

        let outgoing: Vec<usize> = self.slots.keys().copied().filter(|i| !window.contains(i)).collect();
        for index in outgoing {
            self.release_slot(index);
        }

        for index in window {
            match self.slots.get(&index).map(ResourceSlot::state) {
                Some(SlotState::Idle) => self.activate_slot(index),
                Some(_) => {}
                None => {
                    let Some(item) = self.items.item_at(index) else {
                        continue;
                    };
                    self.slots.insert(index, ResourceSlot::new(item.id.clone()));
                    self.activate_slot(index);
                }
            }
        }
    }

    pub(super) fn activate_slot(&mut self, index: usize) {
        let desired = self.active_index == Some(index);
        let Some(slot) = self.slots.get_mut(&index) else {
            return;
        };
        slot.set_desired_playing(desired);
        if let Some(ticket) = slot.activate(&mut self.generations) {
            tracing::debug!(index, item = %ticket.item, generation = ticket.generation, "Slot activated");
            self.request_player(ticket);
        }
    }

    /// Removes the slot at `index`, releasing whatever it holds
    pub(super) fn release_slot(&mut self, index: usize) {
        if let Some(mut slot) = self.slots.remove(&index) {
            self.deactivate_slot(index, &mut slot);
        }
    }

    fn recycle_slot(&mut self, index: usize, new_item: ItemId) {
        if let Some(mut slot) = self.slots.remove(&index) {
            self.deactivate_slot(index, &mut slot);
            slot.rebind(new_item);
            self.slots.insert(index, slot);
            self.activate_slot(index);
        }
    }

    fn deactivate_slot(&mut self, index: usize, slot: &mut ResourceSlot) {
        let from = slot.state();
        if slot.deactivate(&mut self.generations).is_some() {
            self.view.unbind(index, slot.item_id());
            if let Err(error) = self.pool.release(slot.item_id()) {
                tracing::warn!(index, item = %slot.item_id(), error = %error, "Pool release failed");
            }
            slot.finish_release();
        }
        tracing::debug!(index, item = %slot.item_id(), from = ?from, "Slot deactivated");
    }
}
