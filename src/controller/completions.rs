//! Re-entry point for asynchronous pool and page-source results
//!
//! Acquires and page fetches run as spawned tasks; their results come back
//! through one channel and are applied on the coordinator's own thread of
//! control, so no slot or list state is ever touched concurrently.

use std::sync::Arc;

use crate::error::{FetchError, PoolError};
use crate::model::{AcquireTicket, ItemId, Page};
use crate::pool::PlayerRef;

use super::PlaybackCoordinator;

pub(crate) enum Completion {
    Acquired {
        item: ItemId,
        generation: u64,
        result: Result<PlayerRef, PoolError>,
    },
    PageFetched {
        epoch: u64,
        cursor: u32,
        result: Result<Page, FetchError>,
    },
}

/// Outcome of one applied completion, surfaced to the coordinator's caller
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    PlayerBound { index: usize, item: ItemId },
    /// The slot moved on before the acquire finished; the player went back
    StaleDiscarded { item: ItemId },
    ResourceUnavailable { index: usize, item: ItemId, error: PoolError },
    PageAppended { cursor: u32, added: usize, loaded: usize },
    FetchFailed { cursor: u32, error: FetchError },
    /// A page requested before a reset
    PageDiscarded { cursor: u32 },
}

impl PlaybackCoordinator {
    /// Number of spawned acquires and fetches whose result is not yet applied
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Waits for the next completion and applies it. Returns `None` right
    /// away when nothing is outstanding.
    pub async fn process_next(&mut self) -> Option<FeedEvent> {
        if self.outstanding == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        Some(self.handle_completion(completion))
    }

    /// Issues the acquire for a freshly activated slot, unless an older
    /// acquire for the same item is still out; that one is adopted instead
    /// so the pool never sees two requests for one item.
    pub(super) fn request_player(&mut self, ticket: AcquireTicket) {
        let AcquireTicket { item, generation } = ticket;
        if let Some(owner) = self.in_flight.get_mut(&item) {
            tracing::debug!(item = %item, generation, "Adopting acquire already in flight");
            *owner = generation;
            return;
        }

        self.in_flight.insert(item.clone(), generation);
        self.outstanding += 1;
        let pool = Arc::clone(&self.pool);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = pool.acquire(&item).await;
            let _ = tx.send(Completion::Acquired {
                item,
                generation,
                result,
            });
        });
    }

    pub(super) fn spawn_fetch(&mut self, cursor: u32) {
        let epoch = self.list_epoch;
        let per_page = self.config.page_size;
        let source = Arc::clone(&self.source);
        let tx = self.completions_tx.clone();
        self.outstanding += 1;
        tracing::debug!(cursor, per_page, "Fetching page");
        tokio::spawn(async move {
            let result = source.fetch_page(cursor, per_page).await;
            let _ = tx.send(Completion::PageFetched { epoch, cursor, result });
        });
    }

    pub(crate) fn handle_completion(&mut self, completion: Completion) -> FeedEvent {
        self.outstanding = self.outstanding.saturating_sub(1);
        match completion {
            Completion::Acquired {
                item,
                generation,
                result,
            } => self.handle_acquired(item, generation, result),
            Completion::PageFetched { epoch, cursor, result } => self.handle_page(epoch, cursor, result),
        }
    }

    fn handle_acquired(
        &mut self,
        item: ItemId,
        requested: u64,
        result: Result<PlayerRef, PoolError>,
    ) -> FeedEvent {
        let owner = self.in_flight.remove(&item);
        let target = owner.and_then(|generation| {
            self.slots
                .iter_mut()
                .find(|(_, slot)| slot.item_id() == &item && slot.accepts(generation))
                .map(|(index, slot)| (*index, slot, generation))
        });

        match (result, target) {
            (Ok(player), Some((index, slot, generation))) => match slot.bind(generation, player.clone()) {
                Ok(()) => {
                    self.view.bind(index, &item, &player);
                    slot.apply_desired();
                    tracing::info!(index, item = %item, playing = slot.is_playing(), "Player bound");
                    FeedEvent::PlayerBound { index, item }
                }
                Err(stale) => self.discard_stale(item, requested, Some(stale)),
            },
            (Ok(player), None) => self.discard_stale(item, requested, Some(player)),
            (Err(error), Some((index, slot, generation))) => {
                slot.fail(generation, &mut self.generations);
                tracing::warn!(index, item = %item, error = %error, "Player unavailable");
                FeedEvent::ResourceUnavailable { index, item, error }
            }
            (Err(error), None) => {
                tracing::debug!(item = %item, error = %error, "Stale acquire failed");
                self.discard_stale(item, requested, None)
            }
        }
    }

    fn discard_stale(&mut self, item: ItemId, requested: u64, player: Option<PlayerRef>) -> FeedEvent {
        if let Some(player) = player {
            player.pause();
            if let Err(error) = self.pool.release(&item) {
                tracing::warn!(item = %item, error = %error, "Pool release failed");
            }
            tracing::debug!(item = %item, generation = requested, "Discarded stale player");
        }
        FeedEvent::StaleDiscarded { item }
    }

    fn handle_page(&mut self, epoch: u64, cursor: u32, result: Result<Page, FetchError>) -> FeedEvent {
        if epoch != self.list_epoch {
            tracing::debug!(cursor, epoch, "Dropping page fetched before reset");
            return FeedEvent::PageDiscarded { cursor };
        }
        self.is_paginating = false;

        match result {
            Ok(page) => {
                let added = self.items.append(page.items);
                self.items.advance_page();
                if page.total_count.is_some() {
                    self.items.set_total_count(page.total_count);
                }
                if page.is_last {
                    self.items.mark_exhausted();
                }
                let loaded = self.items.loaded_count();
                tracing::info!(cursor, added, loaded, total = ?self.items.total_count(), "Page appended");

                // cells that were on screen without data may now be backed
                self.reconcile_slots();
                FeedEvent::PageAppended { cursor, added, loaded }
            }
            Err(error) => {
                tracing::warn!(cursor, error = %error, "Page fetch failed");
                FeedEvent::FetchFailed { cursor, error }
            }
        }
    }
}
