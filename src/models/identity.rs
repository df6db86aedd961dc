//! Core data types for the connector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a service instance (this one or a peer)
///
/// Immutable for the lifetime of a process; capabilities are fixed at
/// startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceIdentity {
    pub name: String,
    pub base_url: String,
    pub capabilities: Vec<String>,
    pub version: String,
}

impl ServiceIdentity {
    /// Create a new identity with the current crate version
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        capabilities: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            capabilities,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Last-known status of a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Online,
    Unknown,
}

impl Default for ServiceStatus {
    fn default() -> Self {
        ServiceStatus::Unknown
    }
}

/// One cached entry per known peer name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub identity: ServiceIdentity,
    pub status: ServiceStatus,
    pub last_seen: DateTime<Utc>,
}

impl ServiceRecord {
    /// Record for a peer that answered at least once
    pub fn online(identity: ServiceIdentity) -> Self {
        Self {
            identity,
            status: ServiceStatus::Online,
            last_seen: Utc::now(),
        }
    }
}

/// The discovered hub location; at most one per process, never re-probed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubHandle {
    pub base_url: String,
    pub discovered_at: DateTime<Utc>,
}

impl HubHandle {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            discovered_at: Utc::now(),
        }
    }
}

/// Why a peer call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Peer name unresolvable by table, cache, or hub lookup
    NotFound,
    /// Transport failure or non-2xx from a resolved peer
    Unreachable,
    /// 2xx response whose body was not valid JSON
    BadResponse,
}

/// Typed result of a peer invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CallOutcome {
    Success { payload: serde_json::Value },
    Failure { kind: FailureKind, detail: String },
}

impl CallOutcome {
    pub fn success(payload: serde_json::Value) -> Self {
        CallOutcome::Success { payload }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        CallOutcome::Failure {
            kind: FailureKind::NotFound,
            detail: detail.into(),
        }
    }

    pub fn unreachable(detail: impl Into<String>) -> Self {
        CallOutcome::Failure {
            kind: FailureKind::Unreachable,
            detail: detail.into(),
        }
    }

    pub fn bad_response(detail: impl Into<String>) -> Self {
        CallOutcome::Failure {
            kind: FailureKind::BadResponse,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success { .. })
    }

    /// Failure kind, if this is a failure
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CallOutcome::Success { .. } => None,
            CallOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_carries_crate_version() {
        let identity = ServiceIdentity::new("agent-1", "http://localhost:8080", vec![]);
        assert_eq!(identity.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_outcome_helpers() {
        let ok = CallOutcome::success(serde_json::json!({"status": "healthy"}));
        assert!(ok.is_success());
        assert_eq!(ok.failure_kind(), None);

        let failed = CallOutcome::unreachable("HTTP 500");
        assert!(!failed.is_success());
        assert_eq!(failed.failure_kind(), Some(FailureKind::Unreachable));
    }
}
