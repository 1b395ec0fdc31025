//! Tile lifecycle: fetch, decode, classify, insert, evict.
//!
//! The controller is driven from the host's event loop. "Tile needed" hands
//! back a [`FetchTask`] for the host to spawn on whatever executor it uses;
//! the task reports its result over a channel, and
//! [`TileLifecycle::poll_completions`] applies results on the host's thread.
//! Nothing outside the controller touches the cache.
//!
//! Each request for an address gets a fresh generation number. A completion
//! is applied only if its generation is still the address's current fetch,
//! so results from superseded or unloaded requests are dropped instead of
//! leaving orphaned markers behind.

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use tiledmarkers_decode::RawFeature;

use crate::{
    cache::TileMarkerCache,
    classify::classify,
    config::LayerConfig,
    error::Result,
    sink::RenderSink,
    source::TileSource,
    types::TileAddress,
};

/// A spawned fetch. Resolves once its result has been queued for the
/// controller.
#[cfg(not(target_family = "wasm"))]
pub type FetchTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A spawned fetch. Resolves once its result has been queued for the
/// controller.
///
/// Spawn it with a local executor such as `wasm_bindgen_futures::spawn_local`.
#[cfg(target_family = "wasm")]
pub type FetchTask = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Observable state of one tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    /// Not requested, or unloaded since.
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// The latest fetch succeeded and its markers are in the cache.
    Inserted,
    /// The latest fetch failed. A new request retries it.
    Failed,
}

/// Per-address bookkeeping. Absence means idle.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Fetching { generation: u64 },
    Inserted,
    Failed,
}

/// Result of one fetch task.
struct Completion {
    address: TileAddress,
    generation: u64,
    result: Result<Vec<RawFeature>>,
}

/// Orchestrates marker loading and removal for a tiled layer.
pub struct TileLifecycle<T: TileSource, S: RenderSink> {
    source: Arc<T>,
    sink: S,
    cache: TileMarkerCache<S::Handle>,
    slots: HashMap<TileAddress, Slot>,
    next_generation: u64,
    max_native_zoom: u8,
    completion_tx: async_channel::Sender<Completion>,
    completion_rx: async_channel::Receiver<Completion>,
}

impl<T: TileSource + 'static, S: RenderSink> TileLifecycle<T, S> {
    /// Create a controller with default layer options.
    #[must_use]
    pub fn new(source: T, sink: S) -> Self {
        Self::with_config(source, sink, &LayerConfig::default())
    }

    /// Create a controller using the zoom ceiling from `config`.
    #[must_use]
    #[cfg_attr(target_family = "wasm", allow(clippy::arc_with_non_send_sync))]
    pub fn with_config(source: T, sink: S, config: &LayerConfig) -> Self {
        let (completion_tx, completion_rx) = async_channel::unbounded();
        Self {
            source: Arc::new(source),
            sink,
            cache: TileMarkerCache::new(),
            slots: HashMap::new(),
            next_generation: 0,
            max_native_zoom: config.max_native_zoom,
            completion_tx,
            completion_rx,
        }
    }

    /// Handle a "tile needed" event.
    ///
    /// Returns the fetch task for the host to spawn. Requesting an address
    /// that is already fetching or loaded supersedes the earlier request; the
    /// cache entry is replaced when the new fetch succeeds.
    pub fn on_tile_needed(&mut self, address: TileAddress) -> FetchTask {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.slots.insert(address, Slot::Fetching { generation });

        tracing::debug!(%address, generation, "tile needed");

        let source = Arc::clone(&self.source);
        let tx = self.completion_tx.clone();
        Box::pin(async move {
            let result = match source.fetch(address).await {
                Ok(payload) => tiledmarkers_decode::decode(&payload).map_err(Into::into),
                Err(e) => Err(e),
            };
            // Fails only if the controller was dropped.
            let _ = tx
                .send(Completion {
                    address,
                    generation,
                    result,
                })
                .await;
        })
    }

    /// Apply every fetch result that has arrived so far. Never blocks.
    ///
    /// Returns the number of results applied; stale results are dropped and
    /// not counted.
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, completion: Completion) -> bool {
        let Completion {
            address,
            generation,
            result,
        } = completion;

        let current = match self.slots.get(&address) {
            Some(Slot::Fetching { generation }) => Some(*generation),
            _ => None,
        };
        if current != Some(generation) {
            tracing::debug!(%address, generation, ?current, "discarding stale tile result");
            return false;
        }

        match result {
            Ok(features) => {
                let handles: Vec<S::Handle> = features
                    .iter()
                    .map(|feature| self.sink.add(&classify(feature)))
                    .collect();
                let markers = handles.len();
                let displaced = self.cache.insert(address, handles, &mut self.sink);
                self.slots.insert(address, Slot::Inserted);
                tracing::debug!(%address, generation, markers, displaced, "tile inserted");
            }
            Err(e) => {
                tracing::warn!(%address, generation, error = %e, "failed to load tile");
                self.slots.insert(address, Slot::Failed);
            }
        }
        true
    }

    /// Handle a "tile no longer needed" event.
    ///
    /// Removes the tile's markers immediately, even if a fetch is still in
    /// flight; that fetch's result will be dropped. Returns the number of
    /// markers removed.
    pub fn on_tile_unneeded(&mut self, address: TileAddress) -> usize {
        self.slots.remove(&address);
        let handles = self.cache.remove(address);
        let removed = self.unrender(handles);
        if removed > 0 {
            tracing::debug!(%address, removed, "tile unloaded");
        }
        removed
    }

    /// Handle a zoom change.
    ///
    /// Once `new_zoom` exceeds the native zoom ceiling, every tile at
    /// `old_zoom` is cleared at once and its in-flight fetches are dropped.
    /// Returns the number of markers removed.
    pub fn on_zoom_changed(&mut self, old_zoom: u8, new_zoom: u8) -> usize {
        if old_zoom == new_zoom || new_zoom <= self.max_native_zoom {
            return 0;
        }

        self.slots.retain(|address, _| address.zoom != old_zoom);
        let handles = self.cache.clear_zoom(old_zoom);
        let removed = self.unrender(handles);
        tracing::debug!(old_zoom, new_zoom, removed, "cleared zoom level");
        removed
    }

    /// Remove every marker and forget every request.
    pub fn clear(&mut self) -> usize {
        self.slots.clear();
        let handles = self.cache.clear();
        self.unrender(handles)
    }

    fn unrender(&mut self, handles: Vec<S::Handle>) -> usize {
        let count = handles.len();
        for handle in handles {
            self.sink.remove(handle);
        }
        count
    }

    /// Current state of `address`.
    #[must_use]
    pub fn state(&self, address: TileAddress) -> TileState {
        match self.slots.get(&address) {
            None => TileState::Idle,
            Some(Slot::Fetching { .. }) => TileState::Fetching,
            Some(Slot::Inserted) => TileState::Inserted,
            Some(Slot::Failed) => TileState::Failed,
        }
    }

    /// Number of addresses with a fetch in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Fetching { .. }))
            .count()
    }

    /// The marker cache.
    #[must_use]
    pub fn cache(&self) -> &TileMarkerCache<S::Handle> {
        &self.cache
    }

    /// The render sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The zoom ceiling above which zoom changes clear levels in bulk.
    #[must_use]
    pub fn max_native_zoom(&self) -> u8 {
        self.max_native_zoom
    }
}
