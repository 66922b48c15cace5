//! Return framing.
//!
//! ```text
//! [u8 RETURN][u32 0xACED0005][u8 TC_BLOCKDATA][u8 0x0F][u8 outcome]
//! [u32 seconds][u64 seconds][i16 count]
//! ```
//!
//! The 15-byte block is the outcome byte followed by the call identifier.
//! The return value itself (the payload) follows the block verbatim.

use std::io::Read;

use super::constants::{
    tc, EXCEPTIONAL_RETURN, NORMAL_RETURN, OBJECT_STREAM_MAGIC, RETURN, RETURN_BLOCK_LEN,
};
use super::wire::{read_i16, read_u32, read_u64, read_u8};
use crate::error::{JrmpError, Result};

/// Size of an encoded return block, identifier included.
pub const RETURN_BLOCK_SIZE: usize = 7 + RETURN_BLOCK_LEN as usize;

/// Size of the fields preceding the call identifier.
pub const RETURN_HEADER_SIZE: usize = 8;

/// Size of an encoded call identifier.
pub const CALL_IDENTIFIER_SIZE: usize = 14;

/// Whether the return carries a value or an exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// Normal return
    Normal,
    /// Exceptional return
    Exceptional,
}

impl ReturnOutcome {
    /// Wire flag.
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Normal => NORMAL_RETURN,
            Self::Exceptional => EXCEPTIONAL_RETURN,
        }
    }

    /// Parse the wire flag.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            NORMAL_RETURN => Some(Self::Normal),
            EXCEPTIONAL_RETURN => Some(Self::Exceptional),
            _ => None,
        }
    }
}

/// Call identifier written after the outcome byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallIdentifier {
    /// Wall-clock seconds, truncated to 32 bits
    pub unique: u32,
    /// Wall-clock seconds
    pub time: u64,
    /// Session counter value
    pub count: i16,
}

impl CallIdentifier {
    /// Identifier stamped with the current time.
    pub fn now(count: i16) -> Self {
        let secs = chrono::Utc::now().timestamp();
        Self {
            unique: secs as u32,
            time: secs as u64,
            count,
        }
    }

    /// Encode to bytes (Big Endian).
    pub fn encode(&self) -> [u8; CALL_IDENTIFIER_SIZE] {
        let mut buf = [0u8; CALL_IDENTIFIER_SIZE];
        buf[0..4].copy_from_slice(&self.unique.to_be_bytes());
        buf[4..12].copy_from_slice(&self.time.to_be_bytes());
        buf[12..14].copy_from_slice(&self.count.to_be_bytes());
        buf
    }

    /// Read an identifier.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            unique: read_u32(reader)?,
            time: read_u64(reader)?,
            count: read_i16(reader)?,
        })
    }
}

/// Per-session identifier counter.
///
/// Starts at `i16::MIN`; every identifier takes the current value and then
/// advances by one, wrapping from `i16::MAX` back to `i16::MIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallCounter {
    next: i16,
}

impl Default for CallCounter {
    fn default() -> Self {
        Self { next: i16::MIN }
    }
}

impl CallCounter {
    /// Create a counter at its minimum value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value the next identifier will carry.
    pub fn current(&self) -> i16 {
        self.next
    }

    /// Take the current value and advance.
    pub fn advance(&mut self) -> i16 {
        let value = self.next;
        self.next = self.next.wrapping_add(1);
        value
    }

    /// Take the current value as a fresh identifier.
    pub fn next_identifier(&mut self) -> CallIdentifier {
        CallIdentifier::now(self.advance())
    }
}

/// Envelope written before every return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnBlock {
    /// Outcome flag
    pub outcome: ReturnOutcome,
    /// Call identifier
    pub identifier: CallIdentifier,
}

impl ReturnBlock {
    /// Create a new return block.
    pub fn new(outcome: ReturnOutcome, identifier: CallIdentifier) -> Self {
        Self {
            outcome,
            identifier,
        }
    }

    /// Encode the fields up to and including the outcome flag.
    pub fn encode_header(outcome: ReturnOutcome) -> [u8; RETURN_HEADER_SIZE] {
        let mut buf = [0u8; RETURN_HEADER_SIZE];
        buf[0] = RETURN;
        buf[1..5].copy_from_slice(&OBJECT_STREAM_MAGIC.to_be_bytes());
        buf[5] = tc::BLOCKDATA;
        buf[6] = RETURN_BLOCK_LEN;
        buf[7] = outcome.as_byte();
        buf
    }

    /// Encode to bytes.
    pub fn encode(&self) -> [u8; RETURN_BLOCK_SIZE] {
        let mut buf = [0u8; RETURN_BLOCK_SIZE];
        buf[..RETURN_HEADER_SIZE].copy_from_slice(&Self::encode_header(self.outcome));
        buf[RETURN_HEADER_SIZE..].copy_from_slice(&self.identifier.encode());
        buf
    }

    /// Read a return block back.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let tag = read_u8(reader)?;
        if tag != RETURN {
            return Err(JrmpError::CallHeader(format!(
                "expected RETURN {RETURN:#04x}, got {tag:#04x}"
            )));
        }
        let magic = read_u32(reader)?;
        if magic != OBJECT_STREAM_MAGIC {
            return Err(JrmpError::CallHeader(format!(
                "bad stream header {magic:#010x}"
            )));
        }
        let block = read_u8(reader)?;
        let len = read_u8(reader)?;
        if block != tc::BLOCKDATA || len != RETURN_BLOCK_LEN {
            return Err(JrmpError::CallHeader(format!(
                "unexpected return block {block:#04x}/{len:#04x}"
            )));
        }
        let flag = read_u8(reader)?;
        let outcome = ReturnOutcome::from_byte(flag)
            .ok_or_else(|| JrmpError::CallHeader(format!("unknown return outcome {flag:#04x}")))?;

        Ok(Self {
            outcome,
            identifier: CallIdentifier::read_from(reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use std::io::Cursor;

    #[test]
    fn test_return_block_layout() {
        let identifier = CallIdentifier {
            unique: 0x6543_2100,
            time: 0x6543_2100,
            count: i16::MIN,
        };
        let bytes = ReturnBlock::new(ReturnOutcome::Normal, identifier).encode();
        assert_eq!(bytes.len(), 22);
        assert_eq!(
            bytes,
            hex!("51 aced0005 77 0f 01 65432100 0000000065432100 8000")
        );
    }

    #[test]
    fn test_exceptional_flag() {
        let bytes = ReturnBlock::new(ReturnOutcome::Exceptional, CallIdentifier::now(0)).encode();
        assert_eq!(bytes[7], EXCEPTIONAL_RETURN);
    }

    #[test]
    fn test_return_block_roundtrip() {
        let block = ReturnBlock::new(ReturnOutcome::Normal, CallIdentifier::now(-5));
        let decoded = ReturnBlock::read_from(&mut Cursor::new(block.encode())).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.identifier.count, -5);
    }

    #[test]
    fn test_identifier_timestamps_agree() {
        let id = CallIdentifier::now(0);
        assert_eq!(u64::from(id.unique), id.time & 0xFFFF_FFFF);
        assert!(id.time > 1_600_000_000);
    }

    #[test]
    fn test_counter_starts_at_min() {
        let mut counter = CallCounter::new();
        assert_eq!(counter.current(), i16::MIN);
        assert_eq!(counter.advance(), i16::MIN);
        assert_eq!(counter.current(), i16::MIN + 1);
    }

    #[test]
    fn test_counter_wraps() {
        let mut counter = CallCounter { next: i16::MAX };
        assert_eq!(counter.advance(), i16::MAX);
        assert_eq!(counter.current(), i16::MIN);
    }

    #[test]
    fn test_outcome_from_byte() {
        assert_eq!(ReturnOutcome::from_byte(1), Some(ReturnOutcome::Normal));
        assert_eq!(ReturnOutcome::from_byte(2), Some(ReturnOutcome::Exceptional));
        assert_eq!(ReturnOutcome::from_byte(3), None);
    }

    mod prop {
        use crate::protocol::response::CallCounter;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn counter_after_n_responses(n in 0usize..70_000) {
                let mut counter = CallCounter::new();
                for _ in 0..n {
                    counter.advance();
                }
                prop_assert_eq!(counter.current(), i16::MIN.wrapping_add(n as i16));
            }
        }
    }
}
