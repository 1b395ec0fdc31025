//! High-level types for tile markers.
//!
//! These types describe what the engine keys its cache on and what it hands
//! to the rendering surface.

use std::fmt;

use glam::DVec2;

/// Address of one grid cell: zoom level, column and row.
///
/// Used verbatim as the cache key. The coordinate system is fixed per map
/// instance, so no normalization happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileAddress {
    /// Zoom level.
    pub zoom: u8,
    /// Column (`x`).
    pub column: u32,
    /// Row (`y`).
    pub row: u32,
}

impl TileAddress {
    /// Create a new tile address.
    #[must_use]
    pub const fn new(zoom: u8, column: u32, row: u32) -> Self {
        Self { zoom, column, row }
    }

    /// Row counted from the opposite edge of the grid (`2^zoom - row - 1`).
    ///
    /// Saturates at zero for rows outside the grid.
    #[must_use]
    pub fn flipped_row(self) -> u64 {
        let rows = 1u64
            .checked_shl(u32::from(self.zoom))
            .unwrap_or(u64::MAX);
        rows.saturating_sub(1).saturating_sub(u64::from(self.row))
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.column, self.row)
    }
}

/// Size class of a cluster glyph, derived from its point count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeBucket {
    /// Fewer than 100 points.
    Small,
    /// Fewer than 1,000 points.
    Medium,
    /// Fewer than 1,000,000 points.
    Large,
    /// Everything above.
    XLarge,
}

impl SizeBucket {
    /// Bucket for a cluster of `count` points.
    ///
    /// Counts below one are treated as one.
    #[must_use]
    pub fn from_count(count: i64) -> Self {
        match count.max(1) {
            i64::MIN..100 => Self::Small,
            100..1_000 => Self::Medium,
            1_000..1_000_000 => Self::Large,
            _ => Self::XLarge,
        }
    }

    /// Lowercase name of the bucket.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::XLarge => "x-large",
        }
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative path of a marker's detail payload, fetched only when inspected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentRef(String);

impl ContentRef {
    /// Directory all detail payloads live under.
    pub const ROOT: &'static str = "catalog_assets";

    /// Build the reference for a catalog source.
    #[must_use]
    pub fn new(cat_path: &str, catalog_id: &str) -> Self {
        Self(format!("{}/{cat_path}/{catalog_id}.json", Self::ROOT))
    }

    /// The relative path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to draw for one decoded feature.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerDescriptor {
    /// A cluster glyph showing a count.
    Cluster {
        /// Map position.
        position: DVec2,
        /// Glyph size class.
        size: SizeBucket,
        /// Abbreviated count shown in the glyph.
        label: String,
    },
    /// An ellipse outlining an extended source.
    Ellipse {
        /// Map position of the centre.
        position: DVec2,
        /// Semi-axes `(a, b)`.
        semi_axes: DVec2,
        /// Clockwise rotation in degrees.
        rotation_degrees: f64,
        /// Deferred detail payload.
        content: ContentRef,
    },
    /// A point marker for a source without shape.
    Point {
        /// Map position.
        position: DVec2,
        /// Deferred detail payload.
        content: ContentRef,
    },
}

impl MarkerDescriptor {
    /// Map position of the marker.
    #[must_use]
    pub fn position(&self) -> DVec2 {
        match self {
            Self::Cluster { position, .. }
            | Self::Ellipse { position, .. }
            | Self::Point { position, .. } => *position,
        }
    }

    /// Deferred detail payload, for non-cluster markers.
    #[must_use]
    pub fn content(&self) -> Option<&ContentRef> {
        match self {
            Self::Cluster { .. } => None,
            Self::Ellipse { content, .. } | Self::Point { content, .. } => Some(content),
        }
    }

    /// Whether this marker is a cluster glyph.
    #[must_use]
    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster { .. })
    }
}
