//! TCP listener running one blocking session per accepted connection.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use super::config::ServerConfig;
use crate::error::{JrmpError, Result};
use crate::payload::Payload;
use crate::protocol::{Arguments, ProtocolProfile, RemoteEndpoint, Session};

/// Registry responder server.
#[derive(Debug, Clone)]
pub struct RegistryServer {
    /// Listener configuration
    config: ServerConfig,
    /// Payload shared by every session
    payload: Payload,
}

impl RegistryServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, payload: Payload) -> Self {
        Self { config, payload }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let addr = self.config.addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| JrmpError::Server(format!("Failed to bind TCP to {addr}: {e}")))?;

        tracing::info!("Registry responder listening on {}", addr);
        tracing::info!("Payload: {} bytes", self.payload.len());

        tokio::select! {
            result = self.serve(listener) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                Ok(())
            }
        }
    }

    /// Accept connections on `listener` forever.
    ///
    /// Each connection gets its own session on a blocking worker; the socket
    /// is closed when the session returns.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    continue;
                },
            };
            tracing::debug!(peer = %addr, "accepted connection");

            let stream = match self.prepare(stream) {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(peer = %addr, "Failed to configure socket: {}", e);
                    continue;
                },
            };

            let payload = self.payload.clone();
            let profile = self.config.profile;
            tokio::task::spawn_blocking(move || {
                // The session has already logged the failure
                if let Err(e) = serve_connection(stream, addr, payload, profile) {
                    tracing::trace!(peer = %addr, "connection closed: {}", e);
                }
            });
        }
    }

    fn prepare(&self, stream: tokio::net::TcpStream) -> std::io::Result<std::net::TcpStream> {
        let stream = stream.into_std()?;
        stream.set_nonblocking(false)?;
        stream.set_nodelay(self.config.nodelay)?;
        stream.set_read_timeout(self.config.read_timeout)?;
        Ok(stream)
    }
}

/// Run one session over a blocking stream, then close it.
pub fn serve_connection(
    stream: std::net::TcpStream,
    peer: SocketAddr,
    payload: Payload,
    profile: ProtocolProfile,
) -> Result<Arguments> {
    let mut session = Session::new(stream, RemoteEndpoint::from(peer), payload).with_profile(profile);
    let result = session.handle_connection();

    let stream = session.into_inner();
    if let Err(e) = stream.shutdown(std::net::Shutdown::Both) {
        tracing::debug!(peer = %peer, "shutdown after session: {}", e);
    }
    result
}
