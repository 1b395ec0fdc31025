//! Transparent gzip inflation.

use std::{borrow::Cow, io::Read};

use flate2::read::GzDecoder;

use crate::error::{DecodeError, DecodeResult};

/// Leading bytes of a gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Largest inflated payload accepted, in bytes.
pub const MAX_INFLATED: u64 = 64 * 1024 * 1024;

/// Inflate `payload` if it carries the gzip magic, otherwise borrow it as is.
///
/// An encoded tile always starts with a field key (`0x1a` for `layers`), so
/// the magic cannot collide with an uncompressed tile. Payloads that inflate
/// past [`MAX_INFLATED`] bytes are rejected.
pub fn inflate(payload: &[u8]) -> DecodeResult<Cow<'_, [u8]>> {
    inflate_bounded(payload, MAX_INFLATED)
}

fn inflate_bounded(payload: &[u8], limit: u64) -> DecodeResult<Cow<'_, [u8]>> {
    if !payload.starts_with(&GZIP_MAGIC) {
        return Ok(Cow::Borrowed(payload));
    }

    let mut inflated = Vec::new();
    GzDecoder::new(payload)
        .take(limit.saturating_add(1))
        .read_to_end(&mut inflated)
        .map_err(|e| DecodeError::Gzip {
            message: e.to_string(),
        })?;
    if inflated.len() as u64 > limit {
        return Err(DecodeError::Gzip {
            message: format!("inflated payload exceeds {limit} bytes"),
        });
    }
    Ok(Cow::Owned(inflated))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{Compression, write::GzEncoder};

    use super::*;

    #[test]
    fn test_inflate_passthrough() {
        let data = [0x1a, 0x02, 0x78, 0x01];
        assert!(matches!(inflate(&data).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_inflate_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"points").unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(inflate(&compressed).unwrap().as_ref(), b"points");
    }

    #[test]
    fn test_inflate_rejects_oversized_output() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&[0u8; 4096]).unwrap();
        let compressed = encoder.finish().unwrap();

        assert!(matches!(
            inflate_bounded(&compressed, 1024),
            Err(DecodeError::Gzip { ref message }) if message.contains("exceeds 1024")
        ));
        assert_eq!(inflate_bounded(&compressed, 4096).unwrap().len(), 4096);
    }

    #[test]
    fn test_inflate_truncated_gzip() {
        let data = [0x1f, 0x8b, 0x08];
        assert!(matches!(inflate(&data), Err(DecodeError::Gzip { .. })));
    }
}
