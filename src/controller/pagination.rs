//! Page fetches, pull-to-refresh and pushed items

use crate::model::{Item, ItemId};
use crate::pool::PlayerRef;

use super::PlaybackCoordinator;

impl PlaybackCoordinator {
    /// Requests the next page unless one is already in flight or the list is
    /// complete. Returns whether a fetch was started.
    pub fn on_pagination_needed(&mut self) -> bool {
        if self.is_paginating {
            tracing::trace!("Pagination already in flight");
            return false;
        }
        if !self.items.has_more() {
            tracing::trace!(loaded = self.items.loaded_count(), "Feed exhausted");
            return false;
        }

        self.is_paginating = true;
        let cursor = self.items.page();
        self.spawn_fetch(cursor);
        true
    }

    /// Pull-to-refresh: drops every slot and item, then loads page zero.
    /// A page requested before the reset is discarded when it lands.
    pub fn reset(&mut self) {
        tracing::info!(loaded = self.items.loaded_count(), "Resetting feed");
        self.teardown();
        self.items.clear();
        self.list_epoch += 1;
        self.is_paginating = false;
        self.on_pagination_needed();
    }

    /// Out-of-band new item (e.g. uploaded from another client). Index-keyed
    /// state shifts by one so it keeps referring to the same items.
    pub fn on_item_created(&mut self, item: Item) -> bool {
        let id = item.id.clone();
        if !self.items.insert_at_front(item) {
            tracing::debug!(item = %id, "Pushed item already known");
            return false;
        }

        let moved: Vec<(usize, ItemId, PlayerRef)> = self
            .slots
            .iter()
            .filter_map(|(index, slot)| slot.player().map(|player| (*index, slot.item_id().clone(), player.clone())))
            .collect();
        for (index, item, _) in &moved {
            self.view.unbind(*index, item);
        }

        let slots = std::mem::take(&mut self.slots);
        self.slots = slots.into_iter().map(|(index, slot)| (index + 1, slot)).collect();
        self.active_index = self.active_index.map(|index| index + 1);
        self.paused_index = self.paused_index.map(|index| index + 1);
        self.last_target = self.last_target.map(|index| index + 1);
        self.visible_range = self.visible_range.map(|range| range.shifted(1));

        for (index, item, player) in &moved {
            self.view.bind(index + 1, item, player);
        }

        tracing::info!(item = %id, loaded = self.items.loaded_count(), "Pushed item inserted at front");
        true
    }
}
