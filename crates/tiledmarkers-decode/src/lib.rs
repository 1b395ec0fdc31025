//! Decode point and cluster features from binary vector tiles.
//!
//! This crate provides pure synchronous decoding of tile payloads into
//! [`RawFeature`]s. It performs no I/O; the caller decides where decoding runs.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives
//! - **Schema-tolerant**: Unknown attributes are skipped and numeric
//!   attributes are read from whichever numeric slot the writer used
//! - **Order-preserving**: Features come out in layer order
//!
//! # Example
//!
//! ```ignore
//! let features = tiledmarkers_decode::decode(&payload)?;
//! for feature in &features {
//!     println!("{:?} at {}", feature.kind, feature.position);
//! }
//! ```

mod error;
mod feature;
mod gzip;
mod value;

pub use error::{DecodeError, DecodeResult};
pub use feature::{FeatureKind, NO_SHAPE, RawFeature, keys, unpack_feature};
pub use gzip::{GZIP_MAGIC, MAX_INFLATED, inflate};

use prost::Message;
use tiledmarkers_proto::Tile;

/// Name of the layer holding point and cluster features.
pub const POINTS_LAYER: &str = "Points";

/// Layer versions this decoder reads.
const SUPPORTED_VERSIONS: std::ops::RangeInclusive<u32> = 1..=2;

/// Decode the features of the [`POINTS_LAYER`] layer.
///
/// A tile without that layer decodes to an empty list.
pub fn decode(payload: &[u8]) -> DecodeResult<Vec<RawFeature>> {
    decode_layer(payload, POINTS_LAYER)
}

/// Decode the features of the layer named `layer_name`.
///
/// The payload may be gzip-compressed. A tile without the named layer decodes
/// to an empty list.
///
/// # Errors
///
/// Returns an error if the payload is not a well-formed tile, the layer has an
/// unsupported version, or a feature's attributes are malformed.
pub fn decode_layer(payload: &[u8], layer_name: &str) -> DecodeResult<Vec<RawFeature>> {
    let bytes = inflate(payload)?;
    let tile = Tile::decode(bytes.as_ref())?;

    let Some(layer) = tile.layers.iter().find(|l| l.name == layer_name) else {
        return Ok(Vec::new());
    };

    if !SUPPORTED_VERSIONS.contains(&layer.version) {
        return Err(DecodeError::UnsupportedVersion {
            layer: layer.name.clone(),
            version: layer.version,
        });
    }

    layer
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| unpack_feature(layer, index, feature))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{Compression, write::GzEncoder};
    use glam::DVec2;
    use proptest::prelude::*;
    use tiledmarkers_proto::tile::{Feature, Layer, Value};

    use super::*;

    fn double(v: f64) -> Value {
        Value {
            double_value: Some(v),
            ..Value::default()
        }
    }

    /// Build a layer from per-feature attribute lists, sharing one key table.
    fn layer(name: &str, features: &[Vec<(&str, Value)>]) -> Layer {
        let mut layer = Layer {
            version: 2,
            name: name.to_string(),
            ..Layer::default()
        };
        for attrs in features {
            let mut feature = Feature::default();
            for (key, value) in attrs {
                let key_index = match layer.keys.iter().position(|k| k == key) {
                    Some(i) => i,
                    None => {
                        layer.keys.push((*key).to_string());
                        layer.keys.len() - 1
                    }
                };
                layer.values.push(value.clone());
                #[allow(clippy::cast_possible_truncation)]
                feature
                    .tags
                    .extend([key_index as u32, (layer.values.len() - 1) as u32]);
            }
            layer.features.push(feature);
        }
        layer
    }

    fn point(x: f64, y: f64) -> Vec<(&'static str, Value)> {
        vec![("global_x", double(x)), ("global_y", double(y))]
    }

    fn encode(layers: Vec<Layer>) -> Vec<u8> {
        Tile { layers }.encode_to_vec()
    }

    #[test]
    fn test_decode_empty_payload() {
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_missing_points_layer() {
        let payload = encode(vec![layer("Other", &[point(1.0, 1.0)])]);
        assert!(decode(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_decode_preserves_feature_order() {
        let payload = encode(vec![
            layer("Other", &[point(9.0, 9.0)]),
            layer("Points", &[point(1.0, 2.0), point(3.0, 4.0), point(5.0, 6.0)]),
        ]);

        let positions: Vec<DVec2> = decode(&payload)
            .unwrap()
            .into_iter()
            .map(|f| f.position)
            .collect();
        assert_eq!(positions, vec![
            DVec2::new(1.0, 2.0),
            DVec2::new(3.0, 4.0),
            DVec2::new(5.0, 6.0),
        ]);
    }

    #[test]
    fn test_decode_named_layer() {
        let payload = encode(vec![layer("Stars", &[point(7.0, 8.0)])]);
        let features = decode_layer(&payload, "Stars").unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].position, DVec2::new(7.0, 8.0));
    }

    #[test]
    fn test_decode_gzip_payload() {
        let payload = encode(vec![layer("Points", &[point(1.0, 2.0)])]);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload).unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(decode(&compressed).unwrap(), decode(&payload).unwrap());
    }

    #[test]
    fn test_decode_truncated_payload() {
        // `layers` field claiming 5 bytes with only 1 present.
        let payload = [0x1a, 0x05, 0x01];
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::Protobuf { .. })
        ));
    }

    #[test]
    fn test_decode_unsupported_version() {
        let mut points = layer("Points", &[point(1.0, 2.0)]);
        points.version = 3;
        let payload = encode(vec![points]);
        assert_eq!(
            decode(&payload),
            Err(DecodeError::UnsupportedVersion {
                layer: "Points".to_string(),
                version: 3,
            })
        );
    }

    #[test]
    fn test_decode_bad_feature_fails_tile() {
        let payload = encode(vec![layer("Points", &[
            point(1.0, 2.0),
            vec![("global_x", double(1.0))],
        ])]);
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::MissingAttribute { feature: 1, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = decode(&bytes);
        }

        #[test]
        fn prop_decode_is_deterministic(
            coords in proptest::collection::vec((-1e6f64..1e6, -1e6f64..1e6), 0..32)
        ) {
            let features: Vec<_> = coords.iter().map(|&(x, y)| point(x, y)).collect();
            let payload = encode(vec![layer("Points", &features)]);

            let first = decode(&payload).unwrap();
            let second = decode(&payload).unwrap();
            prop_assert_eq!(first.len(), coords.len());
            prop_assert_eq!(first, second);
        }
    }
}
