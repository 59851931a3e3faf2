//! Player pool contract and a simulated pool for the demo binary
//!
//! The pool owns the expensive decode/render resources. The coordinator only
//! asks for a player per item and gives it back; it never constructs one.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::PoolError;
use crate::model::ItemId;

/// A pooled player bound to one item
pub trait PlayerHandle: Send + Sync + fmt::Debug {
    fn play(&self);
    fn pause(&self);
    fn is_playing(&self) -> bool;
}

pub type PlayerRef = Arc<dyn PlayerHandle>;

/// External provider of players under a concurrency budget.
///
/// The coordinator never has more than one `acquire` outstanding per item.
#[async_trait]
pub trait PlayerPool: Send + Sync {
    async fn acquire(&self, item: &ItemId) -> Result<PlayerRef, PoolError>;

    /// Hands the player for `item` back to the pool
    fn release(&self, item: &ItemId) -> Result<(), PoolError>;
}

#[derive(Debug)]
pub struct SimulatedPlayer {
    item: ItemId,
    playing: AtomicBool,
}

impl SimulatedPlayer {
    fn new(item: ItemId) -> Self {
        Self {
            item,
            playing: AtomicBool::new(false),
        }
    }
}

impl PlayerHandle for SimulatedPlayer {
    fn play(&self) {
        if !self.playing.swap(true, Ordering::SeqCst) {
            tracing::debug!(item = %self.item, "Player started");
        }
    }

    fn pause(&self) {
        if self.playing.swap(false, Ordering::SeqCst) {
            tracing::debug!(item = %self.item, "Player paused");
        }
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

/// In-process pool with a fixed ceiling and artificial decode latency
pub struct SimulatedPool {
    max_players: usize,
    latency: Duration,
    players: Mutex<HashMap<ItemId, Arc<SimulatedPlayer>>>,
}

impl SimulatedPool {
    pub fn new(max_players: usize, latency: Duration) -> Self {
        Self {
            max_players,
            latency,
            players: Mutex::new(HashMap::new()),
        }
    }

    pub fn in_use(&self) -> usize {
        self.players.lock().map(|players| players.len()).unwrap_or(0)
    }

    /// Number of players currently playing, across the whole pool
    pub fn playing_count(&self) -> usize {
        self.players
            .lock()
            .map(|players| players.values().filter(|p| p.is_playing()).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl PlayerPool for SimulatedPool {
    async fn acquire(&self, item: &ItemId) -> Result<PlayerRef, PoolError> {
        tokio::time::sleep(self.latency).await;

        let mut players = self.players.lock().map_err(|_| PoolError::Closed)?;
        if let Some(existing) = players.get(item) {
            return Ok(existing.clone());
        }
        if players.len() >= self.max_players {
            tracing::warn!(item = %item, limit = self.max_players, "Pool budget exhausted");
            return Err(PoolError::Exhausted {
                limit: self.max_players,
            });
        }

        let player = Arc::new(SimulatedPlayer::new(item.clone()));
        players.insert(item.clone(), player.clone());
        tracing::trace!(item = %item, in_use = players.len(), "Player created");
        Ok(player)
    }

    fn release(&self, item: &ItemId) -> Result<(), PoolError> {
        let mut players = self.players.lock().map_err(|_| PoolError::Closed)?;
        match players.remove(item) {
            Some(player) => {
                player.pause();
                Ok(())
            }
            None => Err(PoolError::Unavailable(format!("{item} is not held"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_pool_enforces_ceiling() {
        let pool = SimulatedPool::new(2, Duration::ZERO);
        pool.acquire(&ItemId::new("a")).await.unwrap();
        pool.acquire(&ItemId::new("b")).await.unwrap();

        let err = pool.acquire(&ItemId::new("c")).await.unwrap_err();
        assert_eq!(err, PoolError::Exhausted { limit: 2 });

        pool.release(&ItemId::new("a")).unwrap();
        assert!(pool.acquire(&ItemId::new("c")).await.is_ok());
        assert_eq!(pool.in_use(), 2);
    }

    #[tokio::test]
    async fn releasing_unknown_item_is_an_error() {
        let pool = SimulatedPool::new(1, Duration::ZERO);
        assert!(pool.release(&ItemId::new("ghost")).is_err());
    }

    #[tokio::test]
    async fn release_pauses_the_player() {
        let pool = SimulatedPool::new(1, Duration::ZERO);
        let player = pool.acquire(&ItemId::new("a")).await.unwrap();
        player.play();
        assert_eq!(pool.playing_count(), 1);

        pool.release(&ItemId::new("a")).unwrap();
        assert!(!player.is_playing());
        assert_eq!(pool.playing_count(), 0);
    }
}
