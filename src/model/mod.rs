//! Model module - Feed state and data types
//!
//! Everything here is synchronous and free of I/O; the controller drives it.
//!
//! - `types`: Core type definitions (items, pages, viewport geometry)
//! - `item_list`: Ordered, deduplicated item collection with page cursor
//! - `slot`: Per-index player slot state machine
//! - `viewport`: Target selection and pagination trigger policy

mod types;
mod item_list;
mod slot;
mod viewport;

pub use types::{Item, ItemBounds, ItemId, Page, ViewportState, VisibleRange};

pub use item_list::ItemList;

pub use slot::{AcquireTicket, Generations, ResourceSlot, SlotState};

pub use viewport::{PaginationState, TargetDecision, ViewportTracker};
