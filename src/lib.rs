//! # JRMP Core - Registry Responder
//!
//! Impersonates a Java RMI registry endpoint on the JRMP stream protocol.
//! The responder performs the transport handshake, decodes one registry call
//! (`bind`, `list`, `lookup`, `rebind`, `unbind`) and answers it with an
//! opaque serialized payload as the call's return value. It exists to show
//! that a peer speaking this protocol deserializes whatever object data it
//! receives in an ordinary method return.
//!
//! ## Architecture
//!
//! ```text
//!   TcpListener ──accept──> Session (one per connection, blocking)
//!                              │
//!                              ├─ handshake: header check, ACK, peer role
//!                              ├─ call decode: envelope, op, interface hash
//!                              ├─ dispatch: lookup | list | bind | rebind | unbind
//!                              └─ response: return block + identifier + payload
//! ```
//!
//! ### State Machine
//!
//! ```text
//!     [Connected] ──validate_handshake()──> [Acknowledged]
//!                                                │
//!                                                │ read_peer_announcement()
//!                                                │ validate_call_message()
//!                                                v
//!     [Responded] <────────dispatch()──── [CallDecoded]
//!
//!     any error ──> [Dropped] (no response written)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jrmp::{Payload, RegistryServer, ServerConfig};
//!
//! let payload = Payload::from_file("payload.ser", false)?;
//! let server = RegistryServer::new(ServerConfig::default().bind_all(), payload);
//! server.run().await?;
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: Handshake, call decoding, dispatch and return framing
//! - [`payload`]: Opaque return value handling
//! - [`server`]: TCP listener
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod error;
pub mod payload;
pub mod protocol;
pub mod server;

// Re-exports for convenience
pub use config::Config;
pub use error::{JrmpError, Result};
pub use payload::Payload;
pub use protocol::{Arguments, Operation, PeerRole, ProtocolProfile, Session, SessionState};
pub use server::{RegistryServer, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
