//! Big-endian primitives over blocking streams.
//!
//! Every reader consumes exactly the bytes of its field; a short stream
//! surfaces as `std::io::ErrorKind::UnexpectedEof` wrapped in
//! [`JrmpError::Io`].

#![allow(missing_docs)]

use std::io::{ErrorKind, Read, Write};

use crate::error::{JrmpError, Result};

pub fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read one byte, or `None` if the stream is already at its end.
pub fn read_optional_u8<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(Some(buf[0])),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(JrmpError::Io(e)),
    }
}

pub fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

pub fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

pub fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

pub fn read_i16<R: Read>(reader: &mut R) -> Result<i16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(i16::from_be_bytes(buf))
}

pub fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

pub fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Discard exactly `len` bytes.
pub fn skip<R: Read>(reader: &mut R, len: usize) -> Result<()> {
    let copied = std::io::copy(&mut reader.by_ref().take(len as u64), &mut std::io::sink())?;
    if copied < len as u64 {
        return Err(JrmpError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("expected {len} bytes to skip, stream ended after {copied}"),
        )));
    }
    Ok(())
}

/// Read a `[u16 len][bytes]` string. Invalid UTF-8 is replaced, never rejected.
pub fn read_short_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = read_u16(reader)?;
    let bytes = read_bytes(reader, len as usize)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write a `[u16 len][bytes]` string.
pub fn write_short_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| {
        JrmpError::Io(std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("string of {} bytes exceeds u16 length", value.len()),
        ))
    })?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}
