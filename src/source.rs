//! Page sources: the pluggable fetch strategy behind the item list
//!
//! Plain, filtered and simulated feeds differ only in which source the
//! coordinator is built with.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::error::FetchError;
use crate::model::{Item, ItemId, Page};

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches page `cursor` (zero based) of at most `per_page` items
    async fn fetch_page(&self, cursor: u32, per_page: usize) -> Result<Page, FetchError>;
}

fn page_of(items: &[Item], cursor: u32, per_page: usize) -> Page {
    let start = (cursor as usize).saturating_mul(per_page);
    Page {
        items: items.iter().skip(start).take(per_page).cloned().collect(),
        total_count: Some(items.len()),
        is_last: start.saturating_add(per_page) >= items.len(),
    }
}

/// Fixed in-memory catalogue served page by page
#[derive(Clone, Debug, Default)]
pub struct StaticPages {
    items: Vec<Item>,
}

impl StaticPages {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl PageSource for StaticPages {
    async fn fetch_page(&self, cursor: u32, per_page: usize) -> Result<Page, FetchError> {
        Ok(page_of(&self.items, cursor, per_page))
    }
}

/// Wraps another source and keeps only items matching a predicate.
///
/// The inner total no longer applies once items are dropped, so filtered
/// pages report an unknown total and rely on the inner `is_last` flag.
pub struct Filtered<S> {
    inner: S,
    predicate: Arc<dyn Fn(&Item) -> bool + Send + Sync>,
}

impl<S: PageSource> Filtered<S> {
    pub fn new(inner: S, predicate: impl Fn(&Item) -> bool + Send + Sync + 'static) -> Self {
        Self {
            inner,
            predicate: Arc::new(predicate),
        }
    }
}

#[async_trait]
impl<S: PageSource> PageSource for Filtered<S> {
    async fn fetch_page(&self, cursor: u32, per_page: usize) -> Result<Page, FetchError> {
        let page = self.inner.fetch_page(cursor, per_page).await?;
        let fetched = page.items.len();
        let items: Vec<Item> = page.items.into_iter().filter(|item| (self.predicate)(item)).collect();
        tracing::trace!(cursor, fetched, kept = items.len(), "Filtered page");
        Ok(Page {
            items,
            total_count: None,
            is_last: page.is_last,
        })
    }
}

/// Generated catalogue with network-like latency
pub struct SimulatedSource {
    items: Vec<Item>,
    latency: Duration,
}

impl SimulatedSource {
    pub fn new(count: usize, latency: Duration) -> Self {
        let origin = Utc.with_ymd_and_hms(2020, 11, 11, 0, 0, 0).single().unwrap_or_else(Utc::now);
        let items = (0..count)
            .map(|n| Item {
                id: ItemId::new(format!("video-{n:04}")),
                created_at: origin + chrono::Duration::minutes(n as i64),
                width: 1080,
                height: 1920,
                thumbnail_url: Some(format!("https://cdn.example.invalid/thumbs/{n:04}.jpg")),
            })
            .collect();
        Self { items, latency }
    }
}

#[async_trait]
impl PageSource for SimulatedSource {
    async fn fetch_page(&self, cursor: u32, per_page: usize) -> Result<Page, FetchError> {
        tokio::time::sleep(self.latency).await;
        Ok(page_of(&self.items, cursor, per_page))
    }
}
