//! Controller module - Playback coordination and event handling
//!
//! The [`PlaybackCoordinator`] owns the item list and every player slot, talks
//! to the pool and the page source, and keeps exactly one item playing. It is
//! organized into submodules by responsibility:
//!
//! - `visibility`: Visible range changes, slot reconciliation and recycling
//! - `playback`: Scroll ticks, taps and single-playback routing
//! - `pagination`: Page fetches, pull-to-refresh and pushed items
//! - `completions`: Re-entry point for asynchronous pool/source results
//! - `session`: Event loop serializing view events and completions

mod visibility;
mod playback;
mod pagination;
mod completions;
mod session;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::FeedConfig;
use crate::model::{Generations, ItemId, ItemList, ResourceSlot, SlotState, ViewportTracker, VisibleRange};
use crate::pool::PlayerPool;
use crate::source::PageSource;
use crate::view::SlotView;

pub use completions::FeedEvent;
pub use session::{FeedSession, SessionState, ViewEvent};

use completions::Completion;

pub struct PlaybackCoordinator {
    config: FeedConfig,
    tracker: ViewportTracker,
    items: ItemList,
    slots: BTreeMap<usize, ResourceSlot>,
    generations: Generations,
    /// Item -> generation of the slot that will receive the outstanding acquire
    in_flight: HashMap<ItemId, u64>,
    active_index: Option<usize>,
    /// Item paused by a tap; keeps its place in the activation window
    paused_index: Option<usize>,
    last_target: Option<usize>,
    visible_range: Option<VisibleRange>,
    is_paginating: bool,
    /// Bumped on reset so pages requested before it are dropped
    list_epoch: u64,
    outstanding: usize,
    pool: Arc<dyn PlayerPool>,
    source: Arc<dyn PageSource>,
    view: Box<dyn SlotView>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl PlaybackCoordinator {
    /// Builds a coordinator for one feed session. Must be called from within
    /// a tokio runtime; pool and source calls are spawned onto it.
    pub fn new(
        config: FeedConfig,
        pool: Arc<dyn PlayerPool>,
        source: Arc<dyn PageSource>,
        view: Box<dyn SlotView>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let tracker = ViewportTracker::new(config.focal_fraction, config.lookahead_count);
        Self {
            config,
            tracker,
            items: ItemList::new(),
            slots: BTreeMap::new(),
            generations: Generations::default(),
            in_flight: HashMap::new(),
            active_index: None,
            paused_index: None,
            last_target: None,
            visible_range: None,
            is_paginating: false,
            list_epoch: 0,
            outstanding: 0,
            pool,
            source,
            view,
            completions_tx,
            completions_rx,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn items(&self) -> &ItemList {
        &self.items
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.visible_range
    }

    pub fn is_paginating(&self) -> bool {
        self.is_paginating
    }

    pub fn slot(&self, index: usize) -> Option<&ResourceSlot> {
        self.slots.get(&index)
    }

    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.slots.get(&index).map(ResourceSlot::state)
    }

    /// Indices that currently have a slot, ascending
    pub fn tracked_indices(&self) -> Vec<usize> {
        self.slots.keys().copied().collect()
    }

    pub fn held_count(&self) -> usize {
        self.slots.values().filter(|s| s.state() == SlotState::Held).count()
    }

    pub fn playing_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_playing())
            .map(|(index, _)| *index)
            .collect()
    }

    /// Releases every slot; the feed view is going away
    pub fn teardown(&mut self) {
        let indices = self.tracked_indices();
        tracing::info!(slots = indices.len(), "Tearing down feed");
        for index in indices {
            self.release_slot(index);
        }
        self.active_index = None;
        self.paused_index = None;
        self.last_target = None;
        self.visible_range = None;
    }
}
