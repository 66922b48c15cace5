//! JRMP responder error types.
//!
//! Every variant is local to one session: the session logs it once and the
//! connection is dropped without a protocol-level error reply. Nothing here
//! is retried, since the byte stream has no resynchronization points.

use thiserror::Error;

use crate::protocol::PeerRole;

/// JRMP responder errors.
#[derive(Error, Debug)]
pub enum JrmpError {
    /// Malformed transport header (magic, version or protocol byte).
    #[error("Handshake error: {0}")]
    Handshake(String),

    /// Malformed call envelope.
    #[error("Call header error: {0}")]
    CallHeader(String),

    /// The call declared an interface hash that does not match the peer role.
    #[error("Interface hash mismatch for {role} peer: expected {expected:#018x}, got {actual:#018x}")]
    InterfaceMismatch {
        /// Role announced by the peer during the handshake.
        role: PeerRole,
        /// Hash expected for that role.
        expected: i64,
        /// Hash the peer actually sent.
        actual: i64,
    },

    /// Malformed operation argument.
    #[error("Argument decode error: {0}")]
    ArgumentDecode(String),

    /// Operation code outside the registry's closed operation set.
    #[error("Unknown operation: {0}")]
    UnknownOperation(u32),

    /// Payload could not be built or loaded.
    #[error("Payload error: {0}")]
    Payload(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Listener error.
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error, including truncated streams.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for JRMP operations
pub type Result<T> = std::result::Result<T, JrmpError>;

impl JrmpError {
    /// Whether the error was raised by the peer's bytes rather than the
    /// local environment.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            JrmpError::Handshake(_)
                | JrmpError::CallHeader(_)
                | JrmpError::InterfaceMismatch { .. }
                | JrmpError::ArgumentDecode(_)
                | JrmpError::UnknownOperation(_)
        )
    }
}

impl From<toml::de::Error> for JrmpError {
    fn from(err: toml::de::Error) -> Self {
        JrmpError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_mismatch_display() {
        let err = JrmpError::InterfaceMismatch {
            role: PeerRole::Client,
            expected: 1,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("client"));
        assert!(msg.contains("0x0000000000000001"));
        assert!(msg.contains("0x0000000000000002"));
    }

    #[test]
    fn test_protocol_violation_classification() {
        assert!(JrmpError::Handshake("bad magic".into()).is_protocol_violation());
        assert!(JrmpError::UnknownOperation(9).is_protocol_violation());
        assert!(!JrmpError::Config("x".into()).is_protocol_violation());

        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        assert!(!JrmpError::from(io).is_protocol_violation());
    }
}
