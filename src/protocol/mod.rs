//! JRMP registry responder protocol.
//!
//! Implements the stream-protocol handshake and the registry call/return
//! framing for one connection.
//!
//! # Message Flow
//!
//! ```text
//! Peer                                  Responder
//!    |                                      |
//!    |------ transport header ------------->|  magic, version, protocol
//!    |<----- ACK (peer host, peer port) ----|
//!    |------ listening endpoint ----------->|  port 0 = client role
//!    |                                      |
//!    |------ CALL (op, interface hash) ---->|  hash checked against role
//!    |------ arguments -------------------->|
//!    |                                      |
//!    |<----- RETURN block + identifier -----|  normal or exceptional
//!    |<----- payload -----------------------|
//! ```
//!
//! ## Operations
//!
//! | Code | Operation | Arguments                 | Outcome     |
//! |------|-----------|---------------------------|-------------|
//! | 0    | `bind`    | key, object descriptor    | Exceptional |
//! | 1    | `list`    | none                      | Normal      |
//! | 2    | `lookup`  | key                       | Normal      |
//! | 3    | `rebind`  | key, object descriptor    | Exceptional |
//! | 4    | `unbind`  | key                       | Exceptional |
//!
//! Any failure ends the session without a response.
//!
//! # Usage
//!
//! ```rust,ignore
//! use jrmp::protocol::{RemoteEndpoint, Session};
//! use jrmp::Payload;
//!
//! let payload = Payload::from_file("payload.ser", false)?;
//! let mut session = Session::new(stream, RemoteEndpoint::from(addr), payload);
//! session.handle_connection()?;
//! ```

mod arguments;
mod call;
pub mod constants;
mod handshake;
mod profile;
mod response;
mod session;
pub mod wire;

pub use arguments::{read_key, Arguments, BindArguments, BoundObject, ObjectDescriptor};
pub use call::{CallMessage, Operation};
pub use handshake::{
    PeerEndpoint, PeerRole, RemoteEndpoint, TransportHeader, TRANSPORT_HEADER_SIZE,
};
pub use profile::ProtocolProfile;
pub use response::{
    CallCounter, CallIdentifier, ReturnBlock, ReturnOutcome, CALL_IDENTIFIER_SIZE,
    RETURN_BLOCK_SIZE, RETURN_HEADER_SIZE,
};
pub use session::{Session, SessionState};
