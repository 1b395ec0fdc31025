//! Per-feature marker classification.
//!
//! Classification never fails. Out-of-range numbers in a single feature are
//! clamped and logged so that one bad feature cannot discard a whole tile.

use glam::DVec2;
use tiledmarkers_decode::{FeatureKind, NO_SHAPE, RawFeature};

use crate::types::{ContentRef, MarkerDescriptor, SizeBucket};

/// Map a decoded feature to the marker that should be drawn for it.
///
/// - Clusters become glyphs sized by point count.
/// - Sources whose `a` is the no-shape sentinel become points.
/// - Other sources become ellipses. The source rotation is counter-clockwise
///   in radians; the map surface rotates clockwise in degrees, hence the sign
///   flip.
#[must_use]
pub fn classify(feature: &RawFeature) -> MarkerDescriptor {
    let position = feature.position;
    match &feature.kind {
        FeatureKind::Cluster {
            point_count,
            abbreviated,
        } => {
            if *point_count < 1 {
                tracing::debug!(point_count, %position, "clamping cluster count");
            }
            MarkerDescriptor::Cluster {
                position,
                size: SizeBucket::from_count(*point_count),
                label: abbreviated.clone(),
            }
        }
        FeatureKind::Source {
            a,
            b,
            theta,
            cat_path,
            catalog_id,
        } => {
            let content = ContentRef::new(cat_path, catalog_id);
            if is_shapeless(*a) {
                return MarkerDescriptor::Point { position, content };
            }
            MarkerDescriptor::Ellipse {
                position,
                semi_axes: DVec2::new(clamp_axis(*a, position), clamp_axis(*b, position)),
                rotation_degrees: display_rotation(*theta, position),
                content,
            }
        }
    }
}

#[allow(clippy::float_cmp)]
fn is_shapeless(a: f64) -> bool {
    if a == NO_SHAPE {
        return true;
    }
    if !a.is_finite() {
        tracing::debug!(a, "non-finite semi-axis, drawing as point");
        return true;
    }
    false
}

fn clamp_axis(axis: f64, position: DVec2) -> f64 {
    if axis.is_finite() && axis >= 0.0 {
        axis
    } else {
        tracing::debug!(axis, %position, "clamping ellipse axis to zero");
        0.0
    }
}

fn display_rotation(theta: f64, position: DVec2) -> f64 {
    if theta.is_finite() {
        -theta.to_degrees()
    } else {
        tracing::debug!(theta, %position, "non-finite rotation, using zero");
        0.0
    }
}
