//! Opaque return value delivered after the return block.
//!
//! The bytes are produced elsewhere; this module only loads them and drops
//! their leading 4-byte stream header, which the return block already
//! carries.

use std::path::Path;

use bytes::Bytes;

use crate::error::{JrmpError, Result};

/// Length of the header stripped from a serialized payload.
pub const PAYLOAD_HEADER_LEN: usize = 4;

/// Immutable payload shared by every session.
///
/// Cloning is cheap; all clones point at the same buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    bytes: Bytes,
}

impl Payload {
    /// Build from a complete serialized stream, dropping its 4-byte header.
    pub fn from_serialized(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        if data.len() < PAYLOAD_HEADER_LEN {
            return Err(JrmpError::Payload(format!(
                "payload of {} bytes is shorter than its {PAYLOAD_HEADER_LEN}-byte header",
                data.len()
            )));
        }
        Ok(Self {
            bytes: data.slice(PAYLOAD_HEADER_LEN..),
        })
    }

    /// Build from bytes that are written as-is.
    pub fn from_raw(data: impl Into<Bytes>) -> Self {
        Self { bytes: data.into() }
    }

    /// Load from a file, stripping the header unless `raw` is set.
    pub fn from_file(path: impl AsRef<Path>, raw: bool) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            JrmpError::Payload(format!("Failed to read payload {}: {e}", path.display()))
        })?;
        if raw {
            Ok(Self::from_raw(data))
        } else {
            Self::from_serialized(data)
        }
    }

    /// Bytes written to the peer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes written to the peer.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
