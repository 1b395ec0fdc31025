//! The rendering surface seam.

use crate::types::MarkerDescriptor;

/// A surface markers are drawn on.
///
/// The engine never looks inside a [`Handle`](RenderSink::Handle); it only
/// keeps it so the marker can be removed later. Handles are passed back by
/// value, so each one is removed at most once.
pub trait RenderSink {
    /// Reference to a drawn marker.
    type Handle;

    /// Draw a marker and return its handle.
    fn add(&mut self, marker: &MarkerDescriptor) -> Self::Handle;

    /// Remove a previously drawn marker.
    fn remove(&mut self, handle: Self::Handle);
}
