//! Registry responder server.
//!
//! Accepts TCP connections and runs one [`Session`](crate::protocol::Session)
//! per connection on a blocking worker thread. Sessions share nothing but the
//! read-only payload and registry profile.
//!
//! # Example
//!
//! ```rust,ignore
//! use jrmp::server::{RegistryServer, ServerConfig};
//! use jrmp::Payload;
//!
//! let config = ServerConfig::default().with_port(1099);
//! let payload = Payload::from_file("payload.ser", false)?;
//! RegistryServer::new(config, payload).run().await?;
//! ```

mod config;
mod registry;

pub use config::ServerConfig;
pub use registry::{serve_connection, RegistryServer};
