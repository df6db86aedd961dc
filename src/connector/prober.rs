//! Hub candidate prober
//!
//! Scans an ordered list of hub candidates and caches the first one that
//! answers the stats probe. The result is held for the process lifetime;
//! a hub that moves requires a process restart.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::HubHandle;

/// Hub relationship for this process
///
/// `Discovered` and `Standalone` are terminal; no transition returns to
/// `Probing`.
#[derive(Debug, Clone)]
pub enum HubState {
    Unknown,
    Probing,
    Discovered(HubHandle),
    Standalone,
}

/// Sequential prober over hub candidates
pub struct HubProber {
    candidates: Vec<String>,
    http_client: reqwest::Client,
    state: Arc<RwLock<HubState>>,
}

impl HubProber {
    /// Create a prober over an ordered candidate list
    pub fn new(candidates: Vec<String>, probe_timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(probe_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            candidates,
            http_client,
            state: Arc::new(RwLock::new(HubState::Unknown)),
        }
    }

    /// Discover the hub, or confirm standalone mode
    ///
    /// Candidates are tried strictly in order and the scan short-circuits
    /// on the first acceptance. Concurrent callers may probe redundantly
    /// before the first result lands; at most one handle is ever cached.
    pub async fn discover(&self) -> Option<HubHandle> {
        match &*self.state.read() {
            HubState::Discovered(handle) => return Some(handle.clone()),
            HubState::Standalone => return None,
            _ => {}
        }

        {
            let mut state = self.state.write();
            if matches!(*state, HubState::Unknown) {
                *state = HubState::Probing;
            }
        }

        for candidate in &self.candidates {
            if self.probe(candidate).await {
                let handle = HubHandle::new(candidate.trim_end_matches('/'));

                let mut state = self.state.write();
                if let HubState::Discovered(existing) = &*state {
                    return Some(existing.clone());
                }
                info!("Hub discovered at {}", handle.base_url);
                *state = HubState::Discovered(handle.clone());
                return Some(handle);
            }
        }

        let mut state = self.state.write();
        if let HubState::Discovered(existing) = &*state {
            return Some(existing.clone());
        }
        info!("No hub responded, running standalone");
        *state = HubState::Standalone;
        None
    }

    /// Probe one candidate for the hub stats marker
    async fn probe(&self, candidate: &str) -> bool {
        let url = format!("{}/api/stats", candidate.trim_end_matches('/'));

        let response = match self.http_client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Probe {} failed: {}", url, e);
                return false;
            }
        };

        if !response.status().is_success() {
            debug!("Probe {} rejected: {}", url, response.status());
            return false;
        }

        match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("connectedRepls")
                .map(serde_json::Value::is_number)
                .unwrap_or(false),
            Err(e) => {
                debug!("Probe {} returned non-hub body: {}", url, e);
                false
            }
        }
    }

    /// Currently cached hub handle, without probing
    pub fn current(&self) -> Option<HubHandle> {
        match &*self.state.read() {
            HubState::Discovered(handle) => Some(handle.clone()),
            _ => None,
        }
    }

    /// Whether standalone mode has been confirmed
    pub fn is_standalone(&self) -> bool {
        matches!(*self.state.read(), HubState::Standalone)
    }
}

impl Clone for HubProber {
    fn clone(&self) -> Self {
        Self {
            candidates: self.candidates.clone(),
            http_client: self.http_client.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl std::fmt::Debug for HubProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubProber")
            .field("candidates", &self.candidates)
            .field("state", &*self.state.read())
            .finish()
    }
}
