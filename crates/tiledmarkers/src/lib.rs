//! Tile-keyed marker cache and decode pipeline for clustered point overlays.
//!
//! A map host tells this crate which tiles are visible. For each visible tile
//! the crate fetches the binary payload, decodes its point and cluster
//! features, decides what marker to draw for each one, and remembers the
//! drawn markers by tile so they can be removed exactly when the tile leaves
//! the viewport.
//!
//! # Design principles
//!
//! - **Host-driven**: The host delivers lifecycle events and spawns fetch tasks
//!   on its own executor; the crate never owns a runtime
//! - **Typed keys**: Tiles are keyed by [`TileAddress`], not formatted strings
//! - **Stale-safe**: Results of superseded or unloaded fetches are dropped
//!
//! # Example
//!
//! ```ignore
//! use tiledmarkers::{HttpTileSource, TileAddress, TileLifecycle};
//!
//! let source = HttpTileSource::new("catalog/{z}/{y}/{x}.pbf");
//! let mut layer = TileLifecycle::new(source, my_sink);
//!
//! // Tile entered the viewport.
//! tokio::spawn(layer.on_tile_needed(TileAddress::new(3, 2, 5)));
//!
//! // Each frame.
//! layer.poll_completions();
//!
//! // Tile left the viewport.
//! layer.on_tile_unneeded(TileAddress::new(3, 2, 5));
//! ```

pub mod cache;
pub mod classify;
mod config;
pub mod controller;
mod error;
mod sink;
pub mod source;
pub mod types;

pub use cache::TileMarkerCache;
pub use classify::classify;
pub use config::LayerConfig;
pub use controller::{FetchTask, TileLifecycle, TileState};
pub use error::{Error, Result};
pub use sink::RenderSink;
pub use source::{FetchFuture, HttpTileSource, MaybeSendSync, TileSource};
pub use types::{ContentRef, MarkerDescriptor, SizeBucket, TileAddress};

// Re-export decode types for convenience.
pub use tiledmarkers_decode::{DecodeError, FeatureKind, POINTS_LAYER, RawFeature};
