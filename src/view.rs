//! View adapter contract
//!
//! The view layer owns the recyclable visual containers. The coordinator
//! only tells it when a held player should be attached to, or detached from,
//! the container showing a given index.

use crate::model::ItemId;
use crate::pool::PlayerRef;

/// Bindings are keyed by list index. When an item is pushed to the front,
/// every held player is unbound at its old index and bound again one row
/// lower.
pub trait SlotView: Send {
    /// A slot reached `Held`: attach `player` to the container at `index`
    fn bind(&mut self, index: usize, item: &ItemId, player: &PlayerRef);

    /// A slot left `Held`: detach whatever player shows `item` at `index`
    fn unbind(&mut self, index: usize, item: &ItemId);
}

/// View that only logs bindings; used when no real container exists
#[derive(Debug, Default)]
pub struct TracingView {
    bound: usize,
}

impl TracingView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotView for TracingView {
    fn bind(&mut self, index: usize, item: &ItemId, _player: &PlayerRef) {
        self.bound += 1;
        tracing::info!(index, item = %item, bound = self.bound, "Player attached to cell");
    }

    fn unbind(&mut self, index: usize, item: &ItemId) {
        self.bound = self.bound.saturating_sub(1);
        tracing::info!(index, item = %item, bound = self.bound, "Player detached from cell");
    }
}
