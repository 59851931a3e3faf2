//! Scripted pool, source and view doubles shared by the scheduling tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use scrollfeed::source::StaticPages;
use scrollfeed::{
    FeedConfig, FetchError, Item, ItemId, Page, PageSource, PlaybackCoordinator, PlayerHandle, PlayerPool, PlayerRef,
    PoolError, SlotView,
};

#[derive(Debug)]
pub struct TestPlayer {
    pub item: ItemId,
    playing: AtomicBool,
}

impl PlayerHandle for TestPlayer {
    fn play(&self) {
        self.playing.store(true, Ordering::SeqCst);
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct PoolState {
    gates: HashMap<ItemId, Arc<Notify>>,
    failures: HashMap<ItemId, PoolError>,
    acquire_calls: Vec<ItemId>,
    released: Vec<ItemId>,
    held: HashSet<ItemId>,
    players: Vec<Arc<TestPlayer>>,
}

/// Pool whose acquires either complete at once (`auto`) or wait until the
/// test resolves them item by item.
#[derive(Default)]
pub struct ScriptedPool {
    auto: bool,
    state: Mutex<PoolState>,
}

impl ScriptedPool {
    pub fn gated() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn auto() -> Arc<Self> {
        Arc::new(Self {
            auto: true,
            ..Self::default()
        })
    }

    fn gate(state: &mut PoolState, item: &ItemId) -> Arc<Notify> {
        state.gates.entry(item.clone()).or_default().clone()
    }

    /// Lets the (possibly future) acquire for `item` complete successfully
    pub fn resolve(&self, item: &str) {
        let gate = Self::gate(&mut self.state.lock().unwrap(), &ItemId::new(item));
        gate.notify_one();
    }

    /// Lets the acquire for `item` complete with `error`
    pub fn fail(&self, item: &str, error: PoolError) {
        let mut state = self.state.lock().unwrap();
        state.failures.insert(ItemId::new(item), error);
        Self::gate(&mut state, &ItemId::new(item)).notify_one();
    }

    pub fn acquire_calls(&self, item: &str) -> usize {
        let id = ItemId::new(item);
        self.state.lock().unwrap().acquire_calls.iter().filter(|i| **i == id).count()
    }

    pub fn released(&self) -> Vec<String> {
        self.state.lock().unwrap().released.iter().map(|i| i.to_string()).collect()
    }

    pub fn held_count(&self) -> usize {
        self.state.lock().unwrap().held.len()
    }

    pub fn playing_count(&self) -> usize {
        self.state.lock().unwrap().players.iter().filter(|p| p.is_playing()).count()
    }
}

#[async_trait]
impl PlayerPool for ScriptedPool {
    async fn acquire(&self, item: &ItemId) -> Result<PlayerRef, PoolError> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.acquire_calls.push(item.clone());
            (!self.auto).then(|| Self::gate(&mut state, item))
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        state.gates.remove(item);
        if let Some(error) = state.failures.remove(item) {
            return Err(error);
        }
        let player = Arc::new(TestPlayer {
            item: item.clone(),
            playing: AtomicBool::new(false),
        });
        state.players.push(player.clone());
        state.held.insert(item.clone());
        Ok(player)
    }

    fn release(&self, item: &ItemId) -> Result<(), PoolError> {
        let mut state = self.state.lock().unwrap();
        state.released.push(item.clone());
        if state.held.remove(item) {
            Ok(())
        } else {
            Err(PoolError::Unavailable(format!("{item} is not held")))
        }
    }
}

/// Source that waits for the test to open each fetch
pub struct GatedSource {
    items: Vec<Item>,
    known_total: bool,
    gate: Notify,
    calls: AtomicUsize,
    fail_next: Mutex<Option<FetchError>>,
}

impl GatedSource {
    pub fn new(items: Vec<Item>, known_total: bool) -> Arc<Self> {
        Arc::new(Self {
            items,
            known_total,
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
            fail_next: Mutex::new(None),
        })
    }

    pub fn open(&self) {
        self.gate.notify_one();
    }

    pub fn fail_next(&self, error: FetchError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for GatedSource {
    async fn fetch_page(&self, cursor: u32, per_page: usize) -> Result<Page, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        if let Some(error) = self.fail_next.lock().unwrap().take() {
            return Err(error);
        }
        let start = cursor as usize * per_page;
        Ok(Page {
            items: self.items.iter().skip(start).take(per_page).cloned().collect(),
            total_count: self.known_total.then_some(self.items.len()),
            is_last: start + per_page >= self.items.len(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewCall {
    Bind(usize, String),
    Unbind(usize, String),
}

/// View recording every bind/unbind it receives
#[derive(Clone, Default)]
pub struct RecordingView {
    pub calls: Arc<Mutex<Vec<ViewCall>>>,
}

impl RecordingView {
    pub fn bound_items(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                ViewCall::Bind(_, item) => Some(item.clone()),
                ViewCall::Unbind(..) => None,
            })
            .collect()
    }
}

impl SlotView for RecordingView {
    fn bind(&mut self, index: usize, item: &ItemId, _player: &PlayerRef) {
        self.calls.lock().unwrap().push(ViewCall::Bind(index, item.to_string()));
    }

    fn unbind(&mut self, index: usize, item: &ItemId) {
        self.calls.lock().unwrap().push(ViewCall::Unbind(index, item.to_string()));
    }
}

pub fn items(ids: &[&str]) -> Vec<Item> {
    ids.iter().map(|id| Item::new(*id)).collect()
}

pub fn numbered(count: usize) -> Vec<Item> {
    (0..count).map(|n| Item::new(format!("v{n}"))).collect()
}

pub fn config(prefetch_window: usize) -> FeedConfig {
    FeedConfig {
        prefetch_window,
        ..FeedConfig::default()
    }
}

/// Coordinator whose list already holds `catalogue` (total known)
pub async fn loaded_coordinator(
    config: FeedConfig,
    pool: Arc<ScriptedPool>,
    catalogue: Vec<Item>,
) -> (PlaybackCoordinator, RecordingView) {
    let view = RecordingView::default();
    let source = Arc::new(StaticPages::new(catalogue));
    let mut coordinator = PlaybackCoordinator::new(config, pool, source, Box::new(view.clone()));
    while coordinator.items().has_more() {
        assert!(coordinator.on_pagination_needed());
        coordinator.process_next().await.unwrap();
    }
    (coordinator, view)
}

/// Applies completions until nothing is outstanding
pub async fn settle(coordinator: &mut PlaybackCoordinator) -> Vec<scrollfeed::FeedEvent> {
    let mut events = Vec::new();
    while let Some(event) = coordinator.process_next().await {
        events.push(event);
    }
    events
}
