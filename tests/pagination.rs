mod common;

use std::sync::Arc;

use common::{GatedSource, RecordingView, ScriptedPool, numbered};
use scrollfeed::model::ItemBounds;
use scrollfeed::source::{Filtered, StaticPages};
use scrollfeed::{FeedConfig, FeedEvent, FetchError, Item, PlaybackCoordinator, ViewportState};

fn feed_with(source: Arc<dyn scrollfeed::PageSource>, page_size: usize) -> PlaybackCoordinator {
    let config = FeedConfig {
        page_size,
        ..FeedConfig::default()
    };
    PlaybackCoordinator::new(config, ScriptedPool::auto(), source, Box::new(RecordingView::default()))
}

#[tokio::test]
async fn test_scroll_near_end_requests_exactly_one_page() {
    let source = GatedSource::new(numbered(20), false);
    let mut feed = feed_with(source.clone(), 8);

    assert!(feed.on_pagination_needed());
    source.open();
    assert_eq!(
        feed.process_next().await,
        Some(FeedEvent::PageAppended {
            cursor: 0,
            added: 8,
            loaded: 8
        })
    );
    assert_eq!(feed.items().total_count(), None);
    assert!(feed.items().has_more());

    // rows 5..=9 on screen, 8 and 9 still without data
    let viewport = ViewportState {
        offset: 500.0,
        height: 500.0,
        items: (5..=9)
            .map(|index| ItemBounds::new(index, index as f32 * 100.0, (index + 1) as f32 * 100.0))
            .collect(),
    };
    let decision = feed.on_scroll_tick(&viewport);
    assert!(decision.should_paginate);
    assert_eq!(decision.target_index, Some(6));
    assert!(feed.is_paginating());
    assert_eq!(feed.tracked_indices(), vec![5, 6, 7]);

    let decision = feed.on_scroll_tick(&viewport);
    assert!(!decision.should_paginate);
    assert!(!feed.on_pagination_needed());

    tokio::task::yield_now().await;
    assert_eq!(source.calls(), 2);

    source.open();
    let events = common::settle(&mut feed).await;
    assert!(events.contains(&FeedEvent::PageAppended {
        cursor: 1,
        added: 8,
        loaded: 16
    }));
    assert!(!feed.is_paginating());
    assert_eq!(source.calls(), 2);
    // the window now follows the active row into the fresh page
    assert_eq!(feed.tracked_indices(), vec![6, 7, 8]);
}

#[tokio::test]
async fn test_failed_fetch_can_be_retried() {
    let source = GatedSource::new(numbered(20), true);
    let mut feed = feed_with(source.clone(), 10);

    feed.on_pagination_needed();
    source.open();
    feed.process_next().await;
    assert_eq!(feed.items().loaded_count(), 10);

    source.fail_next(FetchError::Network("connection reset".into()));
    assert!(feed.on_pagination_needed());
    source.open();
    assert_eq!(
        feed.process_next().await,
        Some(FeedEvent::FetchFailed {
            cursor: 1,
            error: FetchError::Network("connection reset".into()),
        })
    );
    assert!(!feed.is_paginating());
    assert_eq!(feed.items().loaded_count(), 10);
    assert_eq!(feed.items().page(), 1);

    assert!(feed.on_pagination_needed());
    source.open();
    assert_eq!(
        feed.process_next().await,
        Some(FeedEvent::PageAppended {
            cursor: 1,
            added: 10,
            loaded: 20
        })
    );
    assert!(!feed.items().has_more());
    assert!(!feed.on_pagination_needed());
}

#[tokio::test]
async fn test_reset_drops_page_requested_before_it() {
    let source = GatedSource::new(numbered(20), true);
    let mut feed = feed_with(source.clone(), 10);

    feed.on_pagination_needed();
    source.open();
    feed.process_next().await;

    assert!(feed.on_pagination_needed());
    tokio::task::yield_now().await;
    feed.reset();
    assert!(feed.items().is_empty());
    assert!(feed.is_paginating());

    source.open();
    source.open();
    let events = common::settle(&mut feed).await;
    assert_eq!(events.len(), 2);
    assert!(events.contains(&FeedEvent::PageDiscarded { cursor: 1 }));
    assert!(events.contains(&FeedEvent::PageAppended {
        cursor: 0,
        added: 10,
        loaded: 10
    }));
    assert_eq!(feed.items().loaded_count(), 10);
    assert_eq!(feed.items().page(), 1);
    assert!(feed.items().has_more());
}

#[tokio::test]
async fn test_filtered_feed_stops_at_last_inner_page() {
    // only v0..v9 survive the filter; later pages come back empty
    let source = Filtered::new(StaticPages::new(numbered(25)), |item: &Item| item.id.as_str().len() == 2);
    let mut feed = feed_with(Arc::new(source), 10);

    let mut pages = 0;
    while feed.on_pagination_needed() {
        assert!(matches!(feed.process_next().await, Some(FeedEvent::PageAppended { .. })));
        pages += 1;
    }

    assert_eq!(pages, 3);
    assert_eq!(feed.items().loaded_count(), 10);
    // the last page pins the total to what was loaded
    assert_eq!(feed.items().total_count(), Some(10));
    assert!(!feed.items().has_more());
}

#[tokio::test]
async fn test_known_total_suppresses_pagination_at_end() {
    let mut feed = feed_with(Arc::new(StaticPages::new(numbered(6))), 10);
    feed.on_pagination_needed();
    feed.process_next().await;

    let decision = feed.on_scroll_tick(&ViewportState::uniform(300.0, 400.0, 100.0, 6));
    assert!(!decision.should_paginate);
    assert!(!feed.is_paginating());
}
