//! Per-index player slot state machine
//!
//! A slot tracks whether a player has been requested for its item, is held,
//! or is being released. Every transition in or out of `Requesting`/`Held`
//! takes a fresh generation from a coordinator-wide [`Generations`] counter,
//! so an acquire completion can be checked against the live generation when
//! it arrives and discarded if the slot has moved on in the meantime.

use crate::pool::PlayerRef;

use super::types::ItemId;

/// Lifecycle state of a [`ResourceSlot`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Requesting,
    Held,
    Releasing,
}

/// Monotonic generation source shared by all slots of one coordinator.
///
/// Shared rather than per-slot so a slot created at a recycled index can
/// never reuse a generation still captured by an older request.
#[derive(Debug, Default)]
pub struct Generations(u64);

impl Generations {
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// Issued on `Idle -> Requesting`; the caller performs the acquire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcquireTicket {
    pub item: ItemId,
    pub generation: u64,
}

#[derive(Debug)]
pub struct ResourceSlot {
    item: ItemId,
    state: SlotState,
    generation: u64,
    desired_playing: bool,
    player: Option<PlayerRef>,
}

impl ResourceSlot {
    pub fn new(item: ItemId) -> Self {
        Self {
            item,
            state: SlotState::Idle,
            generation: 0,
            desired_playing: false,
            player: None,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn desired_playing(&self) -> bool {
        self.desired_playing
    }

    pub fn player(&self) -> Option<&PlayerRef> {
        self.player.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state == SlotState::Held && self.player.as_ref().is_some_and(|p| p.is_playing())
    }

    /// `Idle -> Requesting`. Returns `None` while a request is already
    /// outstanding or a player is held.
    pub fn activate(&mut self, generations: &mut Generations) -> Option<AcquireTicket> {
        if self.state != SlotState::Idle {
            return None;
        }
        self.state = SlotState::Requesting;
        self.generation = generations.next();
        tracing::trace!(item = %self.item, generation = self.generation, "Slot requesting");
        Some(AcquireTicket {
            item: self.item.clone(),
            generation: self.generation,
        })
    }

    /// Whether a completion captured at `generation` may still bind here
    pub fn accepts(&self, generation: u64) -> bool {
        self.state == SlotState::Requesting && self.generation == generation
    }

    /// `Requesting -> Held`. A stale completion gets its player handed back
    /// so the caller can release it unbound.
    pub fn bind(&mut self, generation: u64, player: PlayerRef) -> Result<(), PlayerRef> {
        if !self.accepts(generation) {
            return Err(player);
        }
        self.state = SlotState::Held;
        self.player = Some(player);
        Ok(())
    }

    /// Applies the latched play intent to the held player
    pub fn apply_desired(&self) {
        if let Some(player) = self.player.as_ref().filter(|_| self.state == SlotState::Held) {
            if self.desired_playing {
                player.play();
            } else {
                player.pause();
            }
        }
    }

    /// `Requesting -> Idle` after the pool refused the acquire
    pub fn fail(&mut self, generation: u64, generations: &mut Generations) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.state = SlotState::Idle;
        self.generation = generations.next();
        true
    }

    /// Valid in any state: applied immediately when held, latched otherwise
    pub fn set_desired_playing(&mut self, playing: bool) {
        self.desired_playing = playing;
        self.apply_desired();
    }

    /// Leaves `Requesting` or `Held`.
    ///
    /// A pending request simply returns to `Idle` (its completion will be
    /// stale). A held player is paused and handed back with the slot left in
    /// `Releasing`; call [`finish_release`](Self::finish_release) once the
    /// pool has been told.
    pub fn deactivate(&mut self, generations: &mut Generations) -> Option<PlayerRef> {
        self.desired_playing = false;
        match self.state {
            SlotState::Idle | SlotState::Releasing => None,
            SlotState::Requesting => {
                self.state = SlotState::Idle;
                self.generation = generations.next();
                None
            }
            SlotState::Held => {
                self.state = SlotState::Releasing;
                self.generation = generations.next();
                let player = self.player.take();
                if let Some(player) = &player {
                    player.pause();
                }
                player
            }
        }
    }

    /// `Releasing -> Idle`
    pub fn finish_release(&mut self) {
        if self.state == SlotState::Releasing {
            self.state = SlotState::Idle;
        }
    }

    /// Points an idle slot at a different item (container reuse)
    pub fn rebind(&mut self, item: ItemId) {
        debug_assert_eq!(self.state, SlotState::Idle);
        self.item = item;
        self.desired_playing = false;
    }
}
