//! The frozen configuration value consumed by the proxy core.
//!
//! Parsing a user-facing config format and the interactive console live
//! outside the core; this loader exists so the binary can run standalone
//! from a JSON file or from defaults.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Address the Bedrock endpoint binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,
    /// Java edition server to open outbound connections to.
    #[serde(default = "default_remote_address")]
    pub remote_address: String,
    #[serde(default = "default_remote_port")]
    pub remote_port: u16,
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    /// Worker threads for the runtime. 0 means one per CPU.
    #[serde(default)]
    pub thread_pool_size: usize,
    #[serde(default)]
    pub ping_passthrough: bool,
    #[serde(default)]
    pub online_mode: bool,
    #[serde(default = "default_auth_server_url")]
    pub auth_server_url: String,
    #[serde(default = "default_locale")]
    pub default_locale: String,
    #[serde(default = "default_view_distance")]
    pub view_distance: u32,
}

fn default_bind_address() -> String {
    "0.0.0.0".into()
}

fn default_bind_port() -> u16 {
    19132
}

fn default_remote_address() -> String {
    "127.0.0.1".into()
}

fn default_remote_port() -> u16 {
    25565
}

fn default_max_players() -> usize {
    20
}

fn default_auth_server_url() -> String {
    "https://sessionserver.mojang.com".into()
}

fn default_locale() -> String {
    "en_US".into()
}

fn default_view_distance() -> u32 {
    8
}

impl Default for ProxyConfig {
    fn default() -> Self {
        serde_json::from_str("{}").expect("defaults must deserialize")
    }
}

impl ProxyConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config = serde_json::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// The `host:port` pair of the remote Java server.
    pub fn remote_endpoint(&self) -> String {
        format!("{}:{}", self.remote_address, self.remote_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ProxyConfig::default();
        assert_eq!(config.bind_port, 19132);
        assert_eq!(config.remote_port, 25565);
        assert_eq!(config.max_players, 20);
        assert!(!config.online_mode);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ProxyConfig =
            serde_json::from_str(r#"{"max_players": 3, "remote_address": "mc.example.org"}"#)
                .unwrap();
        assert_eq!(config.max_players, 3);
        assert_eq!(config.remote_endpoint(), "mc.example.org:25565");
        assert_eq!(config.view_distance, 8);
    }
}
