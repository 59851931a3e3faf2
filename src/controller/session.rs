//! Feed session event loop
//!
//! The single serialization point: view events, pushed items and pool/source
//! completions are all applied to the coordinator from this one task.

use tokio::sync::{mpsc, watch};

use crate::model::{Item, ItemId, ViewportState, VisibleRange};

use super::{FeedEvent, PlaybackCoordinator};

/// Events delivered by the view layer
#[derive(Clone, Debug)]
pub enum ViewEvent {
    VisibilityChanged(Option<VisibleRange>),
    ScrollTick(ViewportState),
    ItemSelected(usize),
    SlotRecycled { index: usize, item: ItemId },
    PullToRefresh,
}

/// Account session state; the feed loads once connected and is suspended
/// while disconnected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Connected,
    Disconnected,
}

pub struct FeedSession {
    coordinator: PlaybackCoordinator,
    view_events: mpsc::UnboundedReceiver<ViewEvent>,
    pushed: mpsc::UnboundedReceiver<Item>,
    session: watch::Receiver<SessionState>,
    events: mpsc::UnboundedSender<FeedEvent>,
}

impl FeedSession {
    pub fn new(
        coordinator: PlaybackCoordinator,
        view_events: mpsc::UnboundedReceiver<ViewEvent>,
        pushed: mpsc::UnboundedReceiver<Item>,
        session: watch::Receiver<SessionState>,
        events: mpsc::UnboundedSender<FeedEvent>,
    ) -> Self {
        Self {
            coordinator,
            view_events,
            pushed,
            session,
            events,
        }
    }

    /// Runs until the view side hangs up, then tears the feed down and hands
    /// the coordinator back.
    pub async fn run(mut self) -> PlaybackCoordinator {
        tracing::info!("Waiting for account session");
        let connected = self
            .session
            .wait_for(|state| *state == SessionState::Connected)
            .await
            .is_ok();
        if !connected {
            tracing::warn!("Session channel closed before connecting");
            self.coordinator.teardown();
            return self.coordinator;
        }

        tracing::info!("Session connected, loading feed");
        self.coordinator.on_pagination_needed();

        let mut suspended = false;
        let mut session_open = true;
        loop {
            tokio::select! {
                Some(completion) = self.coordinator.completions_rx.recv() => {
                    let event = self.coordinator.handle_completion(completion);
                    let _ = self.events.send(event);
                }
                Some(item) = self.pushed.recv() => {
                    self.coordinator.on_item_created(item);
                }
                changed = self.session.changed(), if session_open => match changed {
                    Ok(()) => {
                        let state = *self.session.borrow_and_update();
                        suspended = self.on_session_state(state, suspended);
                    }
                    Err(_) => {
                        tracing::debug!("Session channel closed");
                        session_open = false;
                    }
                },
                event = self.view_events.recv() => match event {
                    Some(event) if suspended => {
                        tracing::trace!(?event, "Session disconnected, dropping view event");
                    }
                    Some(event) => self.dispatch(event),
                    None => {
                        tracing::debug!("View event channel closed");
                        break;
                    }
                },
            }
        }

        self.coordinator.teardown();
        // acquires still out come back as stale and go straight to the pool
        while let Some(event) = self.coordinator.process_next().await {
            let _ = self.events.send(event);
        }
        self.coordinator
    }

    /// Losing the session releases every player; getting it back reloads the
    /// feed from the first page. Returns whether the feed is now suspended.
    fn on_session_state(&mut self, state: SessionState, suspended: bool) -> bool {
        match state {
            SessionState::Disconnected if !suspended => {
                tracing::warn!("Session lost, releasing players");
                self.coordinator.teardown();
                true
            }
            SessionState::Connected if suspended => {
                tracing::info!("Session restored, reloading feed");
                self.coordinator.reset();
                false
            }
            _ => suspended,
        }
    }

    fn dispatch(&mut self, event: ViewEvent) {
        tracing::trace!(?event, "View event");
        match event {
            ViewEvent::VisibilityChanged(range) => self.coordinator.on_visibility_changed(range),
            ViewEvent::ScrollTick(viewport) => {
                self.coordinator.on_scroll_tick(&viewport);
            }
            ViewEvent::ItemSelected(index) => self.coordinator.on_item_selected(index),
            ViewEvent::SlotRecycled { index, item } => self.coordinator.on_slot_recycled(index, item),
            ViewEvent::PullToRefresh => self.coordinator.reset(),
        }
    }
}
