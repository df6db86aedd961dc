//! Service registry cache
//!
//! Static known-service table first, dynamic cache second. Well-known
//! peers must stay reachable even when the hub is down or the dynamic
//! cache is stale.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::models::{ServiceRecord, ServiceStatus};

/// Built-in addresses for peers that must work with no hub at all
static BUILTIN_KNOWN_SERVICES: Lazy<HashMap<String, String>> = Lazy::new(|| {
    HashMap::from([
        (
            "voice-gateway".to_string(),
            "http://localhost:5101".to_string(),
        ),
        (
            "knowledge-base".to_string(),
            "http://localhost:5102".to_string(),
        ),
        (
            "calendar-sync".to_string(),
            "http://localhost:5103".to_string(),
        ),
    ])
});

/// In-memory registry of known peers
///
/// One record per name, last-write-wins, never evicted automatically.
/// Staleness is discovered lazily on the next failed call.
#[derive(Debug)]
pub struct ServiceRegistry {
    known: HashMap<String, String>,
    records: Arc<RwLock<HashMap<String, ServiceRecord>>>,
}

impl ServiceRegistry {
    /// Create a registry with the built-in known-service table
    pub fn new() -> Self {
        Self::with_known(HashMap::new())
    }

    /// Create a registry with extra known services merged over the built-ins
    pub fn with_known(extra: HashMap<String, String>) -> Self {
        let mut known = BUILTIN_KNOWN_SERVICES.clone();
        known.extend(extra);

        Self {
            known,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolve a name against the known-service table, then the cache
    ///
    /// The static table wins even when a dynamic record exists, so that
    /// well-known peers cannot be shadowed by a stale hub directory.
    /// Records without an address never resolve; a name backed only by
    /// an address-less directory entry stays unresolvable.
    pub fn resolve_local(&self, name: &str) -> Option<String> {
        if let Some(url) = self.known.get(name) {
            return Some(url.clone());
        }

        self.records
            .read()
            .get(name)
            .filter(|r| !r.identity.base_url.is_empty())
            .map(|r| r.identity.base_url.clone())
    }

    /// Insert or overwrite the record for a peer name
    pub fn put(&self, record: ServiceRecord) {
        let mut record = record;

        // An online record must carry a validated, non-empty base URL
        if record.identity.base_url.is_empty() && record.status == ServiceStatus::Online {
            warn!(
                "Demoting record for '{}': online with empty base URL",
                record.identity.name
            );
            record.status = ServiceStatus::Unknown;
        }

        let mut records = self.records.write();
        records.insert(record.identity.name.clone(), record);
    }

    /// Get the full record for a peer name, if cached
    pub fn get(&self, name: &str) -> Option<ServiceRecord> {
        self.records.read().get(name).cloned()
    }

    /// All cached records
    pub fn all(&self) -> Vec<ServiceRecord> {
        self.records.read().values().cloned().collect()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ServiceRegistry {
    fn clone(&self) -> Self {
        Self {
            known: self.known.clone(),
            records: Arc::clone(&self.records),
        }
    }
}
