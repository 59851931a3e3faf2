use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};

use scrollfeed::logging;
use scrollfeed::pool::SimulatedPool;
use scrollfeed::source::SimulatedSource;
use scrollfeed::view::TracingView;
use scrollfeed::{FeedConfig, FeedEvent, FeedSession, Item, PlaybackCoordinator, SessionState, ViewEvent, ViewportState};

const ROW_HEIGHT: f32 = 220.0;
const VIEWPORT_HEIGHT: f32 = 800.0;
const CATALOGUE_SIZE: usize = 35;
const TICK_INTERVAL: Duration = Duration::from_millis(60);

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== scrollfeed demo starting ===");

    let config = FeedConfig::load()?;

    // One spare player so a stale acquire does not starve the window
    let pool = Arc::new(SimulatedPool::new(config.prefetch_window + 1, Duration::from_millis(40)));
    let source = Arc::new(SimulatedSource::new(CATALOGUE_SIZE, Duration::from_millis(120)));

    let coordinator = PlaybackCoordinator::new(
        config.clone(),
        pool.clone(),
        source,
        Box::new(TracingView::new()),
    );

    let (view_tx, view_rx) = mpsc::unbounded_channel();
    let (push_tx, push_rx) = mpsc::unbounded_channel();
    let (session_tx, session_rx) = watch::channel(SessionState::Connecting);
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let session = FeedSession::new(coordinator, view_rx, push_rx, session_rx, events_tx);
    let handle = tokio::spawn(session.run());

    tokio::time::sleep(Duration::from_millis(50)).await;
    session_tx.send(SessionState::Connected)?;

    let mut loaded = 0usize;
    let mut offset = 0.0f32;
    let mut tick = 0u32;

    loop {
        while let Ok(event) = events_rx.try_recv() {
            match event {
                FeedEvent::PageAppended { loaded: now, .. } => loaded = now,
                FeedEvent::ResourceUnavailable { item, error, .. } => {
                    tracing::warn!(item = %item, error = %error, "Cell will show its thumbnail only");
                }
                _ => {}
            }
        }

        let content_height = loaded as f32 * ROW_HEIGHT;
        if loaded >= CATALOGUE_SIZE && offset + VIEWPORT_HEIGHT >= content_height {
            break;
        }

        let viewport = ViewportState::uniform(offset, VIEWPORT_HEIGHT, ROW_HEIGHT, loaded);
        view_tx.send(ViewEvent::ScrollTick(viewport))?;

        match tick {
            20 => {
                // tap on whatever is playing to pause it, then again to resume
                let index = (offset / ROW_HEIGHT) as usize + 1;
                view_tx.send(ViewEvent::ItemSelected(index))?;
                view_tx.send(ViewEvent::ItemSelected(index))?;
            }
            40 => {
                push_tx.send(Item::new("pushed-upload-0001"))?;
                offset += ROW_HEIGHT;
            }
            _ => {}
        }

        tick += 1;
        if content_height > offset + VIEWPORT_HEIGHT {
            offset += ROW_HEIGHT / 4.0;
        }
        tokio::time::sleep(TICK_INTERVAL).await;
    }

    drop(view_tx);
    let coordinator = handle.await?;

    println!("Scrolled {} ticks over {} items", tick, coordinator.items().loaded_count());
    println!("Players still held by the pool: {}", pool.in_use());
    tracing::info!("=== scrollfeed demo finished ===");
    Ok(())
}
