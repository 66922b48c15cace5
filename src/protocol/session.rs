//! Responder session.
//!
//! One session serves exactly one accepted connection: handshake, one call,
//! one response. Every stage consumes exactly its bytes before the next one
//! starts, so the parse position is implicit in the order of the reads.

use std::io::{Read, Write};

use super::arguments::{read_key, Arguments, BindArguments};
use super::call::{CallMessage, Operation};
use super::handshake::{PeerEndpoint, PeerRole, RemoteEndpoint, TransportHeader};
use super::profile::ProtocolProfile;
use super::response::{CallCounter, CallIdentifier, ReturnBlock, ReturnOutcome};
use crate::error::{JrmpError, Result};
use crate::payload::Payload;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection accepted, nothing read yet
    Connected,
    /// Transport header accepted and acknowledged
    Acknowledged,
    /// Call header decoded and interface hash accepted
    CallDecoded,
    /// Return block and payload written
    Responded,
    /// Session ended on an error without a response
    Dropped,
}

/// Responder bound to one stream.
pub struct Session<S> {
    /// Session ID, for log correlation
    id: String,
    /// Underlying stream
    stream: S,
    /// Address the transport reports for the peer
    peer: RemoteEndpoint,
    /// Return value written after every return block
    payload: Payload,
    /// Interface hashes and limits
    profile: ProtocolProfile,
    /// Identifier counter
    counter: CallCounter,
    /// Current state
    state: SessionState,
    /// Role announced by the peer
    role: Option<PeerRole>,
    /// Return blocks written
    responses_written: u64,
}

impl<S: Read + Write> Session<S> {
    /// Create a session over an accepted stream.
    pub fn new(stream: S, peer: RemoteEndpoint, payload: Payload) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            stream,
            peer,
            payload,
            profile: ProtocolProfile::default(),
            counter: CallCounter::new(),
            state: SessionState::Connected,
            role: None,
            responses_written: 0,
        }
    }

    /// Use a non-default registry profile.
    pub fn with_profile(mut self, profile: ProtocolProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Get session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Peer address as reported by the transport
    pub fn peer(&self) -> &RemoteEndpoint {
        &self.peer
    }

    /// Role announced by the peer, once read
    pub fn role(&self) -> Option<PeerRole> {
        self.role
    }

    /// Counter value the next identifier will carry
    pub fn counter(&self) -> i16 {
        self.counter.current()
    }

    /// Number of return blocks written
    pub fn responses_written(&self) -> u64 {
        self.responses_written
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Give the stream back to the caller, which closes it.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Validate the transport header and acknowledge it.
    ///
    /// Nothing is written if any header field mismatches.
    pub fn validate_handshake(&mut self) -> Result<()> {
        TransportHeader::read_validated(&mut self.stream)?;
        tracing::info!(peer = %self.peer, session = %self.id, "received a valid transport header");

        self.peer.write_ack(&mut self.stream)?;
        self.stream.flush()?;
        self.state = SessionState::Acknowledged;
        tracing::info!(peer = %self.peer, "sent acknowledgement of the connection");
        Ok(())
    }

    /// Read the endpoint the peer listens on and classify it.
    pub fn read_peer_announcement(&mut self) -> Result<PeerEndpoint> {
        let endpoint = PeerEndpoint::read_from(&mut self.stream)?;
        let role = endpoint.role();
        self.role = Some(role);

        match role {
            PeerRole::Client => tracing::info!(peer = %self.peer, "the remote peer is a client"),
            PeerRole::Server => tracing::info!(
                peer = %self.peer,
                listen_host = %endpoint.host,
                listen_port = endpoint.port,
                "the remote peer is a server listening for remote invocations"
            ),
        }
        Ok(endpoint)
    }

    /// Decode the call header and check its interface hash against the
    /// announced role.
    pub fn validate_call_message(&mut self) -> Result<CallMessage> {
        let role = self.role.ok_or_else(|| {
            JrmpError::CallHeader("call received before the endpoint announcement".to_string())
        })?;
        let call = CallMessage::read_from(&mut self.stream, role, &self.profile)?;
        self.state = SessionState::CallDecoded;
        tracing::debug!(
            peer = %self.peer,
            operation = %call.operation,
            interface_hash = call.interface_hash,
            "received a valid call header"
        );
        Ok(call)
    }

    /// Decode the arguments of `operation` and write the response.
    ///
    /// No response is written when the arguments fail to decode.
    pub fn dispatch(&mut self, operation: Operation) -> Result<Arguments> {
        match operation {
            Operation::Lookup => self.handle_lookup(),
            Operation::List => self.handle_list(),
            Operation::Bind => self.handle_bind(false),
            Operation::Rebind => self.handle_bind(true),
            Operation::Unbind => self.handle_unbind(),
        }
    }

    fn handle_lookup(&mut self) -> Result<Arguments> {
        let args = Arguments::Lookup {
            key: read_key(&mut self.stream)?,
        };
        tracing::info!(peer = %self.peer, call = %args, "registry call received");
        self.respond(ReturnOutcome::Normal)?;
        Ok(args)
    }

    fn handle_list(&mut self) -> Result<Arguments> {
        let args = Arguments::List;
        tracing::info!(peer = %self.peer, call = %args, "registry call received");
        self.respond(ReturnOutcome::Normal)?;
        Ok(args)
    }

    // The binding is never stored; an exceptional return still delivers the
    // payload as the exception object.
    fn handle_bind(&mut self, rebind: bool) -> Result<Arguments> {
        let bind = BindArguments::read_from(&mut self.stream, self.profile.max_interface_name_len)?;
        let args = if rebind {
            Arguments::Rebind(bind)
        } else {
            Arguments::Bind(bind)
        };
        tracing::info!(peer = %self.peer, call = %args, "registry call received");
        self.respond(ReturnOutcome::Exceptional)?;
        Ok(args)
    }

    fn handle_unbind(&mut self) -> Result<Arguments> {
        let args = Arguments::Unbind {
            key: read_key(&mut self.stream)?,
        };
        tracing::info!(peer = %self.peer, call = %args, "registry call received");
        self.respond(ReturnOutcome::Exceptional)?;
        Ok(args)
    }

    fn respond(&mut self, outcome: ReturnOutcome) -> Result<()> {
        self.write_return_block(outcome)?;
        self.write_payload()
    }

    /// Write the return block header followed by a fresh identifier.
    pub fn write_return_block(&mut self, outcome: ReturnOutcome) -> Result<ReturnBlock> {
        self.stream.write_all(&ReturnBlock::encode_header(outcome))?;
        let identifier = self.write_identifier()?;
        self.responses_written += 1;
        Ok(ReturnBlock::new(outcome, identifier))
    }

    /// Write a fresh identifier and advance the counter.
    pub fn write_identifier(&mut self) -> Result<CallIdentifier> {
        let identifier = self.counter.next_identifier();
        self.stream.write_all(&identifier.encode())?;
        Ok(identifier)
    }

    /// Write the payload and flush.
    pub fn write_payload(&mut self) -> Result<()> {
        self.stream.write_all(self.payload.as_bytes())?;
        self.stream.flush()?;
        self.state = SessionState::Responded;
        tracing::info!(
            peer = %self.peer,
            bytes = self.payload.len(),
            "sent the payload to the remote peer"
        );
        Ok(())
    }

    /// Run all stages for this connection.
    pub fn run(&mut self) -> Result<Arguments> {
        self.validate_handshake()?;
        self.read_peer_announcement()?;
        let call = self.validate_call_message()?;
        self.dispatch(call.operation)
    }

    /// Run all stages and report a failure once.
    ///
    /// The caller closes the stream afterwards whatever the outcome.
    pub fn handle_connection(&mut self) -> Result<Arguments> {
        self.run().inspect_err(|err| {
            self.state = SessionState::Dropped;
            if err.is_protocol_violation() {
                tracing::warn!(peer = %self.peer, session = %self.id, "{err}");
            } else {
                tracing::debug!(peer = %self.peer, session = %self.id, "session ended: {err}");
            }
        })
    }
}
