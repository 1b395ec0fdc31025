//! Generated protobuf types for the vector tile wire format.
//!
//! Tiles are served as the industry-standard vector tile schema: a tile holds
//! named layers, each layer holds features whose attributes are stored as
//! alternating indices into the layer's key and value tables.
//!
//! # Key types
//!
//! - [`Tile`]: The top-level message, a list of layers
//! - [`tile::Layer`]: A named layer with its key/value tables
//! - [`tile::Feature`]: A single feature and its packed attribute tags
//! - [`tile::Value`]: A typed attribute value
//!
//! # Regenerating types
//!
//! To regenerate the protobuf types after modifying `proto/vector_tile.proto`:
//!
//! ```sh
//! cargo run -p tiledmarkers-proto --bin generate
//! ```
//!
//! This requires `protoc` to be installed.

mod generated;

pub use generated::*;
