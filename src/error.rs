//! Error types for the pool and data-source seams

use thiserror::Error;

/// Failure reported by the player pool
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool's concurrency ceiling is already reached
    #[error("player budget exhausted ({limit} players in use)")]
    Exhausted { limit: usize },

    #[error("player unavailable: {0}")]
    Unavailable(String),

    #[error("player pool is closed")]
    Closed,
}

/// Failure reported by the page source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
}
