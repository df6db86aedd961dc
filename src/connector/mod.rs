//! Inter-service connector
//!
//! Discovers the coordination hub, registers this instance, resolves
//! peer addresses, and invokes peer APIs with typed outcomes. Hub
//! absence is a supported operating mode, not a failure.

mod invoker;
mod prober;
mod registrar;
mod registry;

pub use invoker::*;
pub use prober::*;
pub use registry::*;

use std::collections::HashMap;
use std::time::Duration;

use crate::config::Settings;
use crate::models::ServiceIdentity;

/// Connector configuration
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Hub candidates, probed in priority order
    pub hub_candidates: Vec<String>,
    /// Per-candidate probe timeout in seconds
    pub probe_timeout_sec: u64,
    /// Peer call timeout in seconds
    pub call_timeout_sec: u64,
    /// Extra known services merged over the built-in table
    pub known_services: HashMap<String, String>,
    /// Description sent with registration
    pub description: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            hub_candidates: vec!["http://localhost:3000".to_string()],
            probe_timeout_sec: 3,
            call_timeout_sec: 10,
            known_services: HashMap::new(),
            description: "Autonomous agent instance".to_string(),
        }
    }
}

impl ConnectorConfig {
    /// Build a connector configuration from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            hub_candidates: settings.discovery.hub_candidates.clone(),
            probe_timeout_sec: settings.discovery.probe_timeout_sec,
            call_timeout_sec: settings.discovery.call_timeout_sec,
            known_services: settings.discovery.known_services.clone(),
            description: settings.service.description.clone(),
        }
    }
}

/// Process-scoped connector instance
///
/// Constructed once at startup and shared by reference with every
/// caller; holds the single cached hub handle for the process.
pub struct Connector {
    identity: ServiceIdentity,
    description: String,
    prober: HubProber,
    registry: ServiceRegistry,
    http_client: reqwest::Client,
}

impl Connector {
    /// Create a connector for this instance's identity
    pub fn new(identity: ServiceIdentity, config: ConnectorConfig) -> Self {
        let prober = HubProber::new(
            config.hub_candidates,
            Duration::from_secs(config.probe_timeout_sec),
        );
        let registry = ServiceRegistry::with_known(config.known_services);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.call_timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            identity,
            description: config.description,
            prober,
            registry,
            http_client,
        }
    }

    /// Discover the hub, or confirm standalone mode
    pub async fn discover_hub(&self) -> Option<crate::models::HubHandle> {
        self.prober.discover().await
    }

    /// This instance's identity
    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    /// The service registry cache
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Whether standalone mode has been confirmed
    pub fn is_standalone(&self) -> bool {
        self.prober.is_standalone()
    }
}

impl Clone for Connector {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            description: self.description.clone(),
            prober: self.prober.clone(),
            registry: self.registry.clone(),
            http_client: self.http_client.clone(),
        }
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("identity", &self.identity.name)
            .field("prober", &self.prober)
            .finish()
    }
}
