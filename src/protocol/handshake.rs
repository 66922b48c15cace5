//! Transport handshake.
//!
//! ```text
//! Peer                                   Responder
//!   |                                        |
//!   |-- [u32 magic][u16 version][u8 proto] ->|  validated field by field
//!   |                                        |
//!   |<- [u8 ACK][u16 len][host][u32 port] ---|  echoes the peer's address
//!   |                                        |
//!   |-- [u16 len][host][u32 port] ---------->|  port 0 = pure client
//! ```

use std::fmt;
use std::io::{Read, Write};
use std::net::SocketAddr;

use super::constants::{MAGIC, PROTOCOL_ACK, STREAM_PROTOCOL, VERSION};
use super::wire::{read_short_string, read_u16, read_u32, read_u8, write_short_string};
use crate::error::{JrmpError, Result};

/// Size of the encoded transport header.
pub const TRANSPORT_HEADER_SIZE: usize = 7;

/// Fixed transport preamble sent by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportHeader {
    /// Header magic
    pub magic: u32,
    /// Transport version
    pub version: u16,
    /// Protocol style byte
    pub protocol: u8,
}

impl Default for TransportHeader {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            protocol: STREAM_PROTOCOL,
        }
    }
}

impl TransportHeader {
    /// Read and validate the header one field at a time.
    ///
    /// Returns on the first mismatching field, so the fields after it are
    /// left unread.
    pub fn read_validated<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = read_u32(reader)?;
        if magic != MAGIC {
            return Err(JrmpError::Handshake(format!(
                "bad magic {magic:#010x}, expected {MAGIC:#010x}"
            )));
        }

        let version = read_u16(reader)?;
        if version != VERSION {
            return Err(JrmpError::Handshake(format!(
                "unsupported version {version}, expected {VERSION}"
            )));
        }

        let protocol = read_u8(reader)?;
        if protocol != STREAM_PROTOCOL {
            return Err(JrmpError::Handshake(format!(
                "unsupported protocol {protocol:#04x}, expected {STREAM_PROTOCOL:#04x}"
            )));
        }

        Ok(Self {
            magic,
            version,
            protocol,
        })
    }

    /// Encode header to bytes (Big Endian).
    pub fn encode(&self) -> [u8; TRANSPORT_HEADER_SIZE] {
        let mut buf = [0u8; TRANSPORT_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_be_bytes());
        buf[4..6].copy_from_slice(&self.version.to_be_bytes());
        buf[6] = self.protocol;
        buf
    }
}

/// Address of the connected peer as seen by the responder's transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    /// Textual IP address
    pub host: String,
    /// Source port
    pub port: u16,
}

impl RemoteEndpoint {
    /// Create a new endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Write the handshake acknowledgement echoing this endpoint.
    pub fn write_ack<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[PROTOCOL_ACK])?;
        write_short_string(writer, &self.host)?;
        writer.write_all(&u32::from(self.port).to_be_bytes())?;
        Ok(())
    }
}

impl From<SocketAddr> for RemoteEndpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

impl fmt::Display for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Role the peer claims in its endpoint announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    /// Announced port 0, not reachable for callbacks
    Client,
    /// Announced a listening port
    Server,
}

impl PeerRole {
    /// Get descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for PeerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Listening endpoint the peer announces after the acknowledgement.
///
/// Taken as-is; neither the host nor the port is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEndpoint {
    /// Declared host
    pub host: String,
    /// Declared port (u32 on the wire)
    pub port: u32,
}

impl PeerEndpoint {
    /// Read `[u16 len][host][u32 port]`.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let host = read_short_string(reader)?;
        let port = read_u32(reader)?;
        Ok(Self { host, port })
    }

    /// Classify the peer by its announced port.
    pub fn role(&self) -> PeerRole {
        if self.port == 0 {
            PeerRole::Client
        } else {
            PeerRole::Server
        }
    }

    /// Encode the announcement as a peer would send it.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(6 + self.host.len());
        write_short_string(&mut buf, &self.host)?;
        buf.extend_from_slice(&self.port.to_be_bytes());
        Ok(buf)
    }
}
