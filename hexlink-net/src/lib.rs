//! HEXLINK Net - Matchmaking and move relay
//!
//! This crate provides the networked game:
//! - Five-byte command codec
//! - Match registry pairing players two by two
//! - Single-threaded TCP server with one session task per player
//! - Blocking client connection and the client-side game controller

pub mod client;
pub mod controller;
pub mod protocol;
pub mod registry;
mod server;
pub mod session;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub use client::{Client, ClientError};
pub use controller::{ClientController, Phase};
pub use protocol::{Command, ProtocolError};
pub use registry::{MatchRegistry, PlayerId, PlayerRecord};
pub use server::{run_server, spawn_server, Server, ServerHandle};

/// Server configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Longest a session waits before re-checking for outbound commands
    pub tick_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 65431,
            tick_ms: 100,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:65431");
        assert_eq!(config.tick(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_json_config() {
        let config: ServerConfig = serde_json::from_str(r#"{"port": 7000}"#).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.tick_ms, 100);
    }
}
