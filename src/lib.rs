//! Mesh Connector - Inter-Service Connector for Agent Instances
//!
//! A client-side connector that lets an agent instance:
//! - Discover a shared coordination hub from a candidate list
//! - Register its identity and capabilities with the hub
//! - Resolve named peer services (static table, cache, hub directory)
//! - Invoke peer APIs with typed, degradation-friendly outcomes
//! - Serve its own health/capability document

pub mod api;
pub mod config;
pub mod connector;
pub mod models;

// Re-export commonly used types
pub use config::Settings;
pub use connector::{CallOptions, Connector, ConnectorConfig, HubProber, ServiceRegistry};
pub use models::{
    CallOutcome, ConnectorError, ConnectorResult, FailureKind, HubHandle, ServiceIdentity,
    ServiceRecord, ServiceStatus,
};

/// Version of the mesh-connector
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
