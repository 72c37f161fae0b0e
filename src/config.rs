//! # Configuration
//!
//! Connection settings for authenticating against a peer node.
//!
//! Loadable from a TOML file or string:
//!
//! ```toml
//! endpoint = "127.0.0.1:7900"
//! client_private_key = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60"
//! server_public_key = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
//! ```
//!
//! Key material stays hex encoded until the typed accessors are called, so
//! malformed keys surface as configuration-time errors rather than failures
//! mid-handshake.

use crate::crypto::{KeyPair, PublicKey};
use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_endpoint() -> String {
    "127.0.0.1:7900".to_string()
}

/// Settings for one peer connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeerConfig {
    /// Peer endpoint as `host:port`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Hex encoded private key used to authenticate as the client.
    pub client_private_key: String,

    /// Hex encoded public key the peer is expected to prove ownership of.
    pub server_public_key: String,
}

impl PeerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ProtocolError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Loads configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::Config(format!("failed to parse TOML: {e}")))
    }

    /// Derives the client key pair from the configured private key.
    pub fn client_key_pair(&self) -> Result<KeyPair> {
        KeyPair::from_hex(&self.client_private_key)
            .map_err(|e| ProtocolError::Config(format!("invalid client private key: {e}")))
    }

    /// Parses the configured server public key.
    pub fn server_public_key(&self) -> Result<PublicKey> {
        PublicKey::from_hex(&self.server_public_key)
            .map_err(|e| ProtocolError::Config(format!("invalid server public key: {e}")))
    }
}
