//! The tile-keyed marker cache.
//!
//! Maps each [`TileAddress`] to the handles of the markers drawn for it, in
//! feature order. The cache is the only owner of those handles: a handle that
//! leaves the cache is either returned to the caller for removal or removed
//! through the sink directly.

use std::collections::HashMap;

use crate::{sink::RenderSink, types::TileAddress};

/// Live marker handles per tile.
///
/// Every address present in the cache has at least one handle.
#[derive(Debug)]
pub struct TileMarkerCache<H> {
    entries: HashMap<TileAddress, Vec<H>>,
    marker_count: usize,
}

impl<H> TileMarkerCache<H> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            marker_count: 0,
        }
    }

    /// Store the handles for `address`, replacing any previous entry.
    ///
    /// Handles already stored for `address` are removed through `sink` first,
    /// so overlapping fetches for one tile never leave duplicates drawn. An
    /// empty `handles` leaves no entry behind.
    ///
    /// Returns the number of displaced handles.
    pub fn insert<S>(&mut self, address: TileAddress, handles: Vec<H>, sink: &mut S) -> usize
    where
        S: RenderSink<Handle = H>,
    {
        let displaced = self.remove(address);
        let displaced_count = displaced.len();
        for handle in displaced {
            sink.remove(handle);
        }

        if !handles.is_empty() {
            self.marker_count += handles.len();
            self.entries.insert(address, handles);
        }
        displaced_count
    }

    /// Take every handle stored for `address`.
    ///
    /// Returns an empty list if the address has no entry, so repeated calls
    /// are harmless.
    pub fn remove(&mut self, address: TileAddress) -> Vec<H> {
        let handles = self.entries.remove(&address).unwrap_or_default();
        self.marker_count -= handles.len();
        handles
    }

    /// Take every handle stored at zoom level `zoom`.
    ///
    /// Handles of one tile stay in order; the order between tiles is
    /// unspecified.
    pub fn clear_zoom(&mut self, zoom: u8) -> Vec<H> {
        let addresses: Vec<TileAddress> = self
            .entries
            .keys()
            .filter(|address| address.zoom == zoom)
            .copied()
            .collect();

        let mut handles = Vec::new();
        for address in addresses {
            handles.extend(self.remove(address));
        }
        handles
    }

    /// Take every handle in the cache.
    pub fn clear(&mut self) -> Vec<H> {
        self.marker_count = 0;
        self.entries.drain().flat_map(|(_, handles)| handles).collect()
    }

    /// Whether `address` has live markers.
    #[must_use]
    pub fn contains(&self, address: TileAddress) -> bool {
        self.entries.contains_key(&address)
    }

    /// Handles stored for `address`, in feature order.
    #[must_use]
    pub fn handles(&self, address: TileAddress) -> Option<&[H]> {
        self.entries.get(&address).map(Vec::as_slice)
    }

    /// Addresses with live markers.
    pub fn addresses(&self) -> impl Iterator<Item = TileAddress> + '_ {
        self.entries.keys().copied()
    }

    /// Number of tiles with live markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of handles across all tiles.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.marker_count
    }
}

impl<H> Default for TileMarkerCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::types::MarkerDescriptor;

    /// Hands out sequential handles and tracks which are still drawn.
    #[derive(Default)]
    struct CountingSink {
        next: u32,
        live: BTreeSet<u32>,
        removed: Vec<u32>,
    }

    impl CountingSink {
        fn draw(&mut self, count: usize) -> Vec<u32> {
            (0..count)
                .map(|_| {
                    let handle = self.next;
                    self.next += 1;
                    self.live.insert(handle);
                    handle
                })
                .collect()
        }
    }

    impl RenderSink for CountingSink {
        type Handle = u32;

        fn add(&mut self, _marker: &MarkerDescriptor) -> u32 {
            self.draw(1)[0]
        }

        fn remove(&mut self, handle: u32) {
            assert!(self.live.remove(&handle), "handle {handle} removed twice");
            self.removed.push(handle);
        }
    }

    const A: TileAddress = TileAddress::new(3, 1, 1);
    const B: TileAddress = TileAddress::new(3, 2, 1);
    const C: TileAddress = TileAddress::new(4, 2, 2);

    #[test]
    fn test_insert_and_lookup() {
        let mut sink = CountingSink::default();
        let mut cache = TileMarkerCache::new();

        let handles = sink.draw(3);
        assert_eq!(cache.insert(A, handles.clone(), &mut sink), 0);

        assert!(cache.contains(A));
        assert_eq!(cache.handles(A), Some(handles.as_slice()));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.marker_count(), 3);
    }

    #[test]
    fn test_insert_replaces_and_unrenders_previous() {
        let mut sink = CountingSink::default();
        let mut cache = TileMarkerCache::new();

        let first = sink.draw(2);
        cache.insert(A, first.clone(), &mut sink);
        let second = sink.draw(3);
        assert_eq!(cache.insert(A, second.clone(), &mut sink), 2);

        assert_eq!(cache.handles(A), Some(second.as_slice()));
        assert_eq!(sink.removed, first);
        assert_eq!(cache.marker_count(), 3);
    }

    #[test]
    fn test_insert_empty_leaves_no_entry() {
        let mut sink = CountingSink::default();
        let mut cache = TileMarkerCache::new();

        let handles = sink.draw(2);
        cache.insert(A, handles, &mut sink);
        cache.insert(A, Vec::new(), &mut sink);

        assert!(!cache.contains(A));
        assert!(cache.is_empty());
        assert!(sink.live.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut sink = CountingSink::default();
        let mut cache = TileMarkerCache::new();

        let handles = sink.draw(2);
        cache.insert(A, handles.clone(), &mut sink);

        assert_eq!(cache.remove(A), handles);
        assert!(cache.remove(A).is_empty());
        assert_eq!(cache.marker_count(), 0);
    }

    #[test]
    fn test_remove_unknown_address() {
        let mut cache: TileMarkerCache<u32> = TileMarkerCache::new();
        assert!(cache.remove(A).is_empty());
    }

    #[test]
    fn test_clear_zoom_only_touches_that_level() {
        let mut sink = CountingSink::default();
        let mut cache = TileMarkerCache::new();

        let a = sink.draw(1);
        let b = sink.draw(2);
        let c = sink.draw(1);
        cache.insert(A, a.clone(), &mut sink);
        cache.insert(B, b.clone(), &mut sink);
        cache.insert(C, c.clone(), &mut sink);

        let mut cleared = cache.clear_zoom(3);
        cleared.sort_unstable();
        let mut expected = [a, b].concat();
        expected.sort_unstable();
        assert_eq!(cleared, expected);

        assert!(!cache.contains(A));
        assert!(!cache.contains(B));
        assert_eq!(cache.handles(C), Some(c.as_slice()));
        assert!(cache.clear_zoom(3).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut sink = CountingSink::default();
        let mut cache = TileMarkerCache::new();

        let a = sink.draw(2);
        let c = sink.draw(1);
        cache.insert(A, a, &mut sink);
        cache.insert(C, c, &mut sink);

        assert_eq!(cache.clear().len(), 3);
        assert!(cache.is_empty());
        assert_eq!(cache.marker_count(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(TileAddress, usize),
        Remove(TileAddress),
        ClearZoom(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        let address = (3u8..5, 0u32..3, 0u32..3).prop_map(|(z, x, y)| TileAddress::new(z, x, y));
        prop_oneof![
            (address.clone(), 0usize..4).prop_map(|(a, n)| Op::Insert(a, n)),
            address.prop_map(Op::Remove),
            (3u8..5).prop_map(Op::ClearZoom),
        ]
    }

    proptest! {
        #[test]
        fn prop_cache_matches_drawn_markers(ops in proptest::collection::vec(op(), 0..64)) {
            let mut sink = CountingSink::default();
            let mut cache = TileMarkerCache::new();

            for op in ops {
                let removed = match op {
                    Op::Insert(address, count) => {
                        let handles = sink.draw(count);
                        cache.insert(address, handles, &mut sink);
                        Vec::new()
                    }
                    Op::Remove(address) => cache.remove(address),
                    Op::ClearZoom(zoom) => cache.clear_zoom(zoom),
                };
                for handle in removed {
                    sink.remove(handle);
                }

                // Every entry is non-empty and the cache holds exactly what is drawn.
                let mut cached = BTreeSet::new();
                for address in cache.addresses() {
                    let handles = cache.handles(address).unwrap();
                    prop_assert!(!handles.is_empty());
                    cached.extend(handles.iter().copied());
                }
                prop_assert_eq!(&cached, &sink.live);
                prop_assert_eq!(cache.marker_count(), sink.live.len());
            }
        }
    }
}
