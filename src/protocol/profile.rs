//! Registry profile: the interface hashes and limits a session checks
//! incoming calls against.

use serde::{Deserialize, Serialize};

use super::constants::{MAX_INTERFACE_NAME_LEN, REGISTRY_CLIENT_HASH, REGISTRY_SERVER_HASH};
use super::handshake::PeerRole;

/// Read-only per-process settings shared by every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolProfile {
    /// Interface hash expected from peers announcing port 0
    pub client_interface_hash: i64,
    /// Interface hash expected from peers announcing a listening port
    pub server_interface_hash: i64,
    /// Longest interface name read from a bind descriptor
    pub max_interface_name_len: u16,
}

impl Default for ProtocolProfile {
    fn default() -> Self {
        Self {
            client_interface_hash: REGISTRY_CLIENT_HASH,
            server_interface_hash: REGISTRY_SERVER_HASH,
            max_interface_name_len: MAX_INTERFACE_NAME_LEN,
        }
    }
}

impl ProtocolProfile {
    /// Hash a call must carry given the peer's role.
    pub fn expected_hash(&self, role: PeerRole) -> i64 {
        match role {
            PeerRole::Client => self.client_interface_hash,
            PeerRole::Server => self.server_interface_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_hash_by_role() {
        let profile = ProtocolProfile::default();
        assert_eq!(profile.expected_hash(PeerRole::Client), REGISTRY_CLIENT_HASH);
        assert_eq!(profile.expected_hash(PeerRole::Server), REGISTRY_SERVER_HASH);
        assert_eq!(REGISTRY_SERVER_HASH, 4_905_912_898_345_647_071);
    }

    #[test]
    fn test_server_hash_override() {
        let profile: ProtocolProfile = toml::from_str("server_interface_hash = -1").unwrap();
        assert_eq!(profile.expected_hash(PeerRole::Server), -1);
        assert_eq!(profile.expected_hash(PeerRole::Client), REGISTRY_CLIENT_HASH);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let profile: ProtocolProfile = toml::from_str("max_interface_name_len = 64").unwrap();
        assert_eq!(profile.max_interface_name_len, 64);
        assert_eq!(profile.client_interface_hash, REGISTRY_CLIENT_HASH);
    }
}
