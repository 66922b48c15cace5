//! Call envelope decoding.
//!
//! ```text
//! [u8 CALL][u32 0xACED0005][u8 TC_BLOCKDATA][u8 0x22]
//! [22 bytes object id][u32 op][u64 interface hash]
//! ```
//!
//! The object id is opaque to the responder and skipped.

use std::fmt;
use std::io::Read;

use super::constants::{tc, CALL, CALL_BLOCK_LEN, OBJECT_STREAM_MAGIC, OBJ_ID_LEN};
use super::handshake::PeerRole;
use super::profile::ProtocolProfile;
use super::wire::{read_i64, read_u32, read_u8, skip};
use crate::error::{JrmpError, Result};

/// The registry's closed operation set, numbered as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Operation {
    /// `bind(String, Remote)`
    Bind = 0,
    /// `list()`
    List = 1,
    /// `lookup(String)`
    Lookup = 2,
    /// `rebind(String, Remote)`
    Rebind = 3,
    /// `unbind(String)`
    Unbind = 4,
}

impl Operation {
    /// All operations, in wire order.
    pub const ALL: [Operation; 5] = [
        Operation::Bind,
        Operation::List,
        Operation::Lookup,
        Operation::Rebind,
        Operation::Unbind,
    ];

    /// Wire code.
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Method name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bind => "bind",
            Self::List => "list",
            Self::Lookup => "lookup",
            Self::Rebind => "rebind",
            Self::Unbind => "unbind",
        }
    }
}

impl TryFrom<u32> for Operation {
    type Error = JrmpError;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Bind),
            1 => Ok(Self::List),
            2 => Ok(Self::Lookup),
            3 => Ok(Self::Rebind),
            4 => Ok(Self::Unbind),
            other => Err(JrmpError::UnknownOperation(other)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decoded call envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallMessage {
    /// Requested operation
    pub operation: Operation,
    /// Interface hash declared by the peer
    pub interface_hash: i64,
}

impl CallMessage {
    /// Read and validate the fixed envelope up to and including the block
    /// length byte. Stops at the first mismatching field.
    pub fn read_envelope<R: Read>(reader: &mut R) -> Result<()> {
        let call = read_u8(reader)?;
        if call != CALL {
            return Err(JrmpError::CallHeader(format!(
                "expected CALL {CALL:#04x}, got {call:#04x}"
            )));
        }

        let stream_magic = read_u32(reader)?;
        if stream_magic != OBJECT_STREAM_MAGIC {
            return Err(JrmpError::CallHeader(format!(
                "bad stream header {stream_magic:#010x}"
            )));
        }

        let block = read_u8(reader)?;
        if block != tc::BLOCKDATA {
            return Err(JrmpError::CallHeader(format!(
                "expected block data {:#04x}, got {block:#04x}",
                tc::BLOCKDATA
            )));
        }

        let block_len = read_u8(reader)?;
        if block_len != CALL_BLOCK_LEN {
            return Err(JrmpError::CallHeader(format!(
                "unexpected call block length {block_len:#04x}"
            )));
        }

        Ok(())
    }

    /// Read the full call header and check the interface hash against the
    /// peer role. The operation code is resolved only after the hash matches.
    pub fn read_from<R: Read>(
        reader: &mut R,
        role: PeerRole,
        profile: &ProtocolProfile,
    ) -> Result<Self> {
        Self::read_envelope(reader)?;
        skip(reader, OBJ_ID_LEN)?;

        let op = read_u32(reader)?;
        let interface_hash = read_i64(reader)?;

        let expected = profile.expected_hash(role);
        if interface_hash != expected {
            return Err(JrmpError::InterfaceMismatch {
                role,
                expected,
                actual: interface_hash,
            });
        }

        Ok(Self {
            operation: Operation::try_from(op)?,
            interface_hash,
        })
    }

    /// Encode a call header as a registry stub would send it, with a zeroed
    /// object id.
    pub fn encode(operation_code: u32, interface_hash: i64) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + OBJ_ID_LEN + 12);
        buf.push(CALL);
        buf.extend_from_slice(&OBJECT_STREAM_MAGIC.to_be_bytes());
        buf.push(tc::BLOCKDATA);
        buf.push(CALL_BLOCK_LEN);
        buf.extend_from_slice(&[0u8; OBJ_ID_LEN]);
        buf.extend_from_slice(&operation_code.to_be_bytes());
        buf.extend_from_slice(&interface_hash.to_be_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::REGISTRY_CLIENT_HASH;
    use std::io::Cursor;

    #[test]
    fn test_operation_codes() {
        for (code, op) in Operation::ALL.iter().enumerate() {
            assert_eq!(op.code(), code as u32);
            assert_eq!(Operation::try_from(code as u32).unwrap(), *op);
        }
        assert_eq!(Operation::Lookup.to_string(), "lookup");
    }

    #[test]
    fn test_unknown_operation() {
        match Operation::try_from(5) {
            Err(JrmpError::UnknownOperation(5)) => {},
            other => panic!("expected UnknownOperation, got {other:?}"),
        }
    }

    #[test]
    fn test_call_block_is_0x22_bytes() {
        let encoded = CallMessage::encode(2, REGISTRY_CLIENT_HASH);
        // block payload: object id + op + hash
        assert_eq!(encoded.len() - 7, CALL_BLOCK_LEN as usize);
    }

    #[test]
    fn test_read_lookup_call() {
        let profile = ProtocolProfile::default();
        let mut cursor = Cursor::new(CallMessage::encode(2, REGISTRY_CLIENT_HASH));
        let call = CallMessage::read_from(&mut cursor, PeerRole::Client, &profile).unwrap();
        assert_eq!(call.operation, Operation::Lookup);
        assert_eq!(call.interface_hash, REGISTRY_CLIENT_HASH);
    }

    #[test]
    fn test_hash_checked_against_role() {
        let profile = ProtocolProfile::default();
        let mut cursor = Cursor::new(CallMessage::encode(2, REGISTRY_CLIENT_HASH));
        let err = CallMessage::read_from(&mut cursor, PeerRole::Server, &profile).unwrap_err();
        assert!(matches!(
            err,
            JrmpError::InterfaceMismatch {
                role: PeerRole::Server,
                ..
            }
        ));
    }

    #[test]
    fn test_hash_checked_before_operation() {
        let profile = ProtocolProfile::default();
        let mut cursor = Cursor::new(CallMessage::encode(42, 7));
        let err = CallMessage::read_from(&mut cursor, PeerRole::Client, &profile).unwrap_err();
        assert!(matches!(err, JrmpError::InterfaceMismatch { .. }));

        let mut cursor = Cursor::new(CallMessage::encode(42, REGISTRY_CLIENT_HASH));
        let err = CallMessage::read_from(&mut cursor, PeerRole::Client, &profile).unwrap_err();
        assert!(matches!(err, JrmpError::UnknownOperation(42)));
    }

    #[test]
    fn test_envelope_mismatches() {
        let profile = ProtocolProfile::default();
        let good = CallMessage::encode(1, REGISTRY_CLIENT_HASH);

        // call tag, stream magic, block tag, block length
        for index in [0usize, 2, 5, 6] {
            let mut bytes = good.clone();
            bytes[index] ^= 0x01;
            let mut cursor = Cursor::new(bytes);
            let err = CallMessage::read_from(&mut cursor, PeerRole::Client, &profile).unwrap_err();
            assert!(
                matches!(err, JrmpError::CallHeader(_)),
                "byte {index}: {err:?}"
            );
        }
    }
}
