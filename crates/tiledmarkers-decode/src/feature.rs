//! Feature attribute unpacking.

use glam::DVec2;
use tiledmarkers_proto::tile::{Feature, Layer, Value};

use crate::{
    error::{DecodeError, DecodeResult},
    value::{as_bool, as_f64, as_i64, as_string},
};

/// Attribute keys read from each feature. Anything else is ignored.
pub mod keys {
    pub const GLOBAL_X: &str = "global_x";
    pub const GLOBAL_Y: &str = "global_y";
    pub const CLUSTER: &str = "cluster";
    pub const POINT_COUNT: &str = "point_count";
    pub const POINT_COUNT_ABBREVIATED: &str = "point_count_abbreviated";
    pub const A: &str = "a";
    pub const B: &str = "b";
    pub const THETA: &str = "theta";
    pub const CAT_PATH: &str = "cat_path";
    pub const CATALOG_ID: &str = "catalog_id";
}

/// Value of `a` marking a source without an ellipse shape.
pub const NO_SHAPE: f64 = -1.0;

/// A feature decoded from the points layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeature {
    /// Position in map coordinates (`global_x`, `global_y`).
    pub position: DVec2,
    /// Cluster or individual source.
    pub kind: FeatureKind,
}

/// What a feature stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureKind {
    /// An aggregate of nearby sources.
    Cluster {
        /// Number of sources in the cluster, as written by the tile server.
        point_count: i64,
        /// Display string for the count (e.g. `"12k"`).
        abbreviated: String,
    },
    /// A single catalog source.
    Source {
        /// Semi-major axis, or [`NO_SHAPE`].
        a: f64,
        /// Semi-minor axis.
        b: f64,
        /// Counter-clockwise rotation in radians.
        theta: f64,
        /// Catalog directory fragment for the detail payload.
        cat_path: String,
        /// Catalog identifier of the source.
        catalog_id: String,
    },
}

impl RawFeature {
    /// Whether this feature is a cluster.
    #[must_use]
    pub fn is_cluster(&self) -> bool {
        matches!(self.kind, FeatureKind::Cluster { .. })
    }
}

/// Borrowed attribute slots for one feature.
#[derive(Default)]
struct Attributes<'a> {
    global_x: Option<&'a Value>,
    global_y: Option<&'a Value>,
    cluster: Option<&'a Value>,
    point_count: Option<&'a Value>,
    point_count_abbreviated: Option<&'a Value>,
    a: Option<&'a Value>,
    b: Option<&'a Value>,
    theta: Option<&'a Value>,
    cat_path: Option<&'a Value>,
    catalog_id: Option<&'a Value>,
}

impl<'a> Attributes<'a> {
    /// Resolve the feature's tag pairs against the layer tables.
    fn collect(layer: &'a Layer, feature: &Feature) -> DecodeResult<Self> {
        if feature.tags.len() % 2 != 0 {
            return Err(DecodeError::InvalidFormat {
                context: "feature tags",
                detail: format!("odd tag count {}", feature.tags.len()),
            });
        }

        let mut attrs = Self::default();
        for pair in feature.tags.chunks_exact(2) {
            let key_index = pair[0] as usize;
            let value_index = pair[1] as usize;

            let key = layer
                .keys
                .get(key_index)
                .ok_or(DecodeError::IndexOutOfBounds {
                    index: key_index,
                    len: layer.keys.len(),
                })?;
            let value = layer
                .values
                .get(value_index)
                .ok_or(DecodeError::IndexOutOfBounds {
                    index: value_index,
                    len: layer.values.len(),
                })?;

            let slot = match key.as_str() {
                keys::GLOBAL_X => &mut attrs.global_x,
                keys::GLOBAL_Y => &mut attrs.global_y,
                keys::CLUSTER => &mut attrs.cluster,
                keys::POINT_COUNT => &mut attrs.point_count,
                keys::POINT_COUNT_ABBREVIATED => &mut attrs.point_count_abbreviated,
                keys::A => &mut attrs.a,
                keys::B => &mut attrs.b,
                keys::THETA => &mut attrs.theta,
                keys::CAT_PATH => &mut attrs.cat_path,
                keys::CATALOG_ID => &mut attrs.catalog_id,
                _ => continue,
            };
            *slot = Some(value);
        }
        Ok(attrs)
    }
}

/// Unpack one layer feature into a [`RawFeature`].
///
/// `index` is the feature's position in the layer and only used for error
/// reporting.
pub fn unpack_feature(layer: &Layer, index: usize, feature: &Feature) -> DecodeResult<RawFeature> {
    let attrs = Attributes::collect(layer, feature)?;

    let coordinate = |slot: Option<&Value>, key: &'static str| {
        slot.and_then(as_f64)
            .ok_or(DecodeError::MissingAttribute { feature: index, key })
    };
    let position = DVec2::new(
        coordinate(attrs.global_x, keys::GLOBAL_X)?,
        coordinate(attrs.global_y, keys::GLOBAL_Y)?,
    );

    let cluster = attrs.cluster.and_then(as_bool).unwrap_or(false);
    let kind = if cluster {
        let point_count = attrs.point_count.and_then(as_i64).unwrap_or(0);
        let abbreviated = attrs
            .point_count_abbreviated
            .and_then(as_string)
            .unwrap_or_else(|| point_count.to_string());
        FeatureKind::Cluster {
            point_count,
            abbreviated,
        }
    } else {
        FeatureKind::Source {
            a: attrs.a.and_then(as_f64).unwrap_or(NO_SHAPE),
            b: attrs.b.and_then(as_f64).unwrap_or(0.0),
            theta: attrs.theta.and_then(as_f64).unwrap_or(0.0),
            cat_path: attrs.cat_path.and_then(as_string).unwrap_or_default(),
            catalog_id: attrs.catalog_id.and_then(as_string).unwrap_or_default(),
        }
    };

    Ok(RawFeature { position, kind })
}
