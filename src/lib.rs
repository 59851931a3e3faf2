//! Viewport-driven playback scheduling for a scrollable video feed
//!
//! A [`PlaybackCoordinator`] decides, as the viewport scrolls, which items get
//! one of a bounded number of pooled players, keeps exactly one item playing
//! and fetches more items before the list runs out. Pool, data source and
//! view are injected through the [`PlayerPool`], [`PageSource`] and
//! [`SlotView`] traits.

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod pool;
pub mod source;
pub mod view;

pub use config::FeedConfig;
pub use controller::{FeedEvent, FeedSession, PlaybackCoordinator, SessionState, ViewEvent};
pub use error::{FetchError, PoolError};
pub use model::{Item, ItemId, ItemList, Page, SlotState, ViewportState, VisibleRange};
pub use pool::{PlayerHandle, PlayerPool, PlayerRef};
pub use source::PageSource;
pub use view::SlotView;
