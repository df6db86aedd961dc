//! Connector configuration settings

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Main connector configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
}

/// Identity settings for this instance
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    /// Instance name, as registered with the hub
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Public base URL peers use to reach this instance
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Short human-readable description, sent with registration
    #[serde(default = "default_description")]
    pub description: String,
    /// Capabilities advertised to the hub and peers
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

fn default_service_name() -> String {
    format!("agent-{}", uuid::Uuid::new_v4())
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_description() -> String {
    "Autonomous agent instance".to_string()
}

fn default_capabilities() -> Vec<String> {
    vec![
        "voice".to_string(),
        "knowledge".to_string(),
        "calendar".to_string(),
    ]
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            name: default_service_name(),
            public_url: default_public_url(),
            description: default_description(),
            capabilities: default_capabilities(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,
    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: default_host(),
            http_port: default_http_port(),
            workers: default_workers(),
        }
    }
}

/// Hub discovery settings
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    /// Enable hub discovery and registration
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Hub candidates, probed in order
    #[serde(default = "default_hub_candidates")]
    pub hub_candidates: Vec<String>,
    /// Per-candidate probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_sec: u64,
    /// Peer call timeout in seconds
    #[serde(default = "default_call_timeout")]
    pub call_timeout_sec: u64,
    /// Extra known services merged over the built-in table
    #[serde(default)]
    pub known_services: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_hub_candidates() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://hub.local:3000".to_string(),
    ]
}

fn default_probe_timeout() -> u64 {
    3
}

fn default_call_timeout() -> u64 {
    10
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        DiscoverySettings {
            enabled: true,
            hub_candidates: default_hub_candidates(),
            probe_timeout_sec: default_probe_timeout(),
            call_timeout_sec: default_call_timeout(),
            known_services: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from file and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load settings from a specific config file path (without extension)
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref();

        let builder = Config::builder()
            // Add config file if it exists
            .add_source(File::with_name(config_path.to_str().unwrap_or("config")).required(false))
            // Add environment variables with prefix MESH_CONNECTOR_
            .add_source(Environment::with_prefix("MESH_CONNECTOR").separator("__"));

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        // One-shot hub override, tried before every configured candidate
        if let Ok(url) = std::env::var("MESH_HUB_URL") {
            if !url.is_empty() {
                settings.discovery.hub_candidates.insert(0, url);
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.http_port, 8080);
        assert_eq!(settings.discovery.probe_timeout_sec, 3);
        assert_eq!(settings.discovery.call_timeout_sec, 10);
        assert!(settings.discovery.enabled);
        assert!(settings.service.name.starts_with("agent-"));
    }

    #[test]
    fn test_candidate_list_has_priority_order() {
        let settings = Settings::default();
        assert_eq!(
            settings.discovery.hub_candidates.first().map(String::as_str),
            Some("http://localhost:3000")
        );
    }
}
