//! Remote peer invocation
//!
//! Resolution order is known-service table, then the dynamic cache, then
//! one hub directory refresh followed by a single local retry. Calls are
//! single-attempt with no retries or circuit breaking; the caller decides
//! how to degrade on a typed failure.

use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use super::Connector;
use crate::models::{
    CallOutcome, ConnectorError, ConnectorResult, HubHandle, ServiceIdentity, ServiceRecord,
    ServiceStatus,
};

/// Options for a peer call
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl CallOptions {
    /// GET with no headers or body
    pub fn get() -> Self {
        Self::default()
    }

    /// POST with a JSON body
    pub fn post(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// One entry of the hub's peer directory
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl DirectoryEntry {
    fn into_record(self) -> ServiceRecord {
        let status = if self.status.as_deref() == Some("online") && !self.api_base_url.is_empty() {
            ServiceStatus::Online
        } else {
            ServiceStatus::Unknown
        };

        ServiceRecord {
            identity: ServiceIdentity {
                name: self.name,
                base_url: self.api_base_url,
                capabilities: self.capabilities,
                version: self.version.unwrap_or_default(),
            },
            status,
            last_seen: Utc::now(),
        }
    }
}

impl Connector {
    /// Resolve a peer name to its base URL
    ///
    /// Checks the known-service table and the dynamic cache; only on a
    /// miss does it refresh the cache from the hub directory and retry
    /// the local lookups once. Hub failures degrade to a miss.
    pub async fn resolve(&self, name: &str) -> Option<String> {
        if let Some(url) = self.registry().resolve_local(name) {
            return Some(url);
        }

        let hub = self.discover_hub().await?;

        match self.fetch_directory(&hub).await {
            Ok(entries) => {
                debug!("Hub directory returned {} peers", entries.len());
                for entry in entries {
                    self.registry().put(entry.into_record());
                }
            }
            Err(e) => {
                warn!("Hub directory lookup failed: {}", e);
                return None;
            }
        }

        self.registry().resolve_local(name)
    }

    /// Invoke a capability on a named peer
    ///
    /// Single-attempt delivery with a typed outcome; an unresolvable
    /// name fails fast with `NotFound` and no peer request is issued.
    pub async fn call(&self, service_name: &str, path: &str, options: CallOptions) -> CallOutcome {
        let base_url = match self.resolve(service_name).await {
            Some(url) => url,
            None => {
                return CallOutcome::not_found(format!(
                    "No address known for service '{}'",
                    service_name
                ));
            }
        };

        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let mut request = self.http_client.request(options.method.clone(), &url);

        for (name, value) in &options.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return CallOutcome::unreachable(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return CallOutcome::unreachable(format!("HTTP {}", status));
        }

        match response.json::<serde_json::Value>().await {
            Ok(payload) => {
                self.mark_contact(service_name, &base_url);
                CallOutcome::success(payload)
            }
            Err(e) => CallOutcome::bad_response(e.to_string()),
        }
    }

    /// Fetch the hub's peer directory
    pub(crate) async fn fetch_directory(
        &self,
        hub: &HubHandle,
    ) -> ConnectorResult<Vec<DirectoryEntry>> {
        let url = format!("{}/api/repls", hub.base_url);

        let response = self.http_client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ConnectorError::Hub(format!(
                "Directory lookup failed: {}",
                response.status()
            )));
        }

        let entries = response.json().await?;
        Ok(entries)
    }

    /// Record a successful peer contact in the cache
    fn mark_contact(&self, name: &str, base_url: &str) {
        let record = match self.registry().get(name) {
            Some(mut record) => {
                record.status = ServiceStatus::Online;
                record.last_seen = Utc::now();
                record.identity.base_url = base_url.to_string();
                record
            }
            None => ServiceRecord::online(ServiceIdentity {
                name: name.to_string(),
                base_url: base_url.to_string(),
                capabilities: Vec::new(),
                version: String::new(),
            }),
        };

        self.registry().put(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectorConfig;
    use crate::models::FailureKind;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use std::collections::HashMap;

    fn spawn<F>(factory: F) -> String
    where
        F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
    {
        let server = HttpServer::new(move || App::new().configure(factory.clone()))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    fn connector_with_known(known: HashMap<String, String>) -> Connector {
        let identity = ServiceIdentity::new("agent-under-test", "http://localhost:8080", vec![]);
        let config = ConnectorConfig {
            hub_candidates: Vec::new(),
            known_services: known,
            ..Default::default()
        };
        Connector::new(identity, config)
    }

    fn connector_with_hub(hub_url: String) -> Connector {
        let identity = ServiceIdentity::new("agent-under-test", "http://localhost:8080", vec![]);
        let config = ConnectorConfig {
            hub_candidates: vec![hub_url],
            ..Default::default()
        };
        Connector::new(identity, config)
    }

    #[actix_web::test]
    async fn test_unresolvable_name_fails_fast() {
        let connector = connector_with_known(HashMap::new());

        let outcome = connector.call("no-such-peer", "/api/ping", CallOptions::get()).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::NotFound));
    }

    #[actix_web::test]
    async fn test_server_error_maps_to_unreachable_with_status() {
        let peer_url = spawn(|cfg: &mut web::ServiceConfig| {
            cfg.route(
                "/api/ping",
                web::get().to(|| async { HttpResponse::InternalServerError().finish() }),
            );
        });

        let connector =
            connector_with_known(HashMap::from([("peer-err".to_string(), peer_url)]));

        let outcome = connector.call("peer-err", "/api/ping", CallOptions::get()).await;
        match outcome {
            CallOutcome::Failure { kind, detail } => {
                assert_eq!(kind, FailureKind::Unreachable);
                assert!(detail.contains("500"), "detail was: {}", detail);
            }
            CallOutcome::Success { .. } => panic!("expected failure"),
        }
    }

    #[actix_web::test]
    async fn test_unparsable_body_maps_to_bad_response() {
        let peer_url = spawn(|cfg: &mut web::ServiceConfig| {
            cfg.route(
                "/api/ping",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("application/json")
                        .body("not json at all")
                }),
            );
        });

        let connector =
            connector_with_known(HashMap::from([("peer-bad".to_string(), peer_url)]));

        let outcome = connector.call("peer-bad", "/api/ping", CallOptions::get()).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::BadResponse));
    }

    #[actix_web::test]
    async fn test_known_peer_call_without_hub() {
        let peer_url = spawn(|cfg: &mut web::ServiceConfig| {
            cfg.route(
                "/api/health",
                web::get().to(|| async {
                    HttpResponse::Ok().json(serde_json::json!({ "status": "healthy" }))
                }),
            );
        });

        let connector =
            connector_with_known(HashMap::from([("Peer-A".to_string(), peer_url.clone())]));

        assert_eq!(connector.resolve("Peer-A").await, Some(peer_url));

        let outcome = connector.call("Peer-A", "/api/health", CallOptions::get()).await;
        match outcome {
            CallOutcome::Success { payload } => {
                assert_eq!(payload["status"], "healthy");
            }
            CallOutcome::Failure { kind, detail } => {
                panic!("expected success, got {:?}: {}", kind, detail);
            }
        }

        // Successful contact is recorded in the cache
        let record = connector.registry().get("Peer-A").unwrap();
        assert_eq!(record.status, ServiceStatus::Online);
    }

    #[actix_web::test]
    async fn test_hub_directory_resolution() {
        let peer_url = spawn(|cfg: &mut web::ServiceConfig| {
            cfg.route(
                "/api/ping",
                web::get().to(|| async {
                    HttpResponse::Ok().json(serde_json::json!({ "pong": true }))
                }),
            );
        });

        let directory_peer = peer_url.clone();
        let hub_url = spawn(move |cfg: &mut web::ServiceConfig| {
            let peer = directory_peer.clone();
            cfg.route(
                "/api/stats",
                web::get().to(|| async {
                    HttpResponse::Ok().json(serde_json::json!({ "connectedRepls": 1 }))
                }),
            )
            .route(
                "/api/repls",
                web::get().to(move || {
                    let peer = peer.clone();
                    async move {
                        HttpResponse::Ok().json(serde_json::json!([
                            { "name": "peer-x", "apiBaseUrl": peer, "status": "online" }
                        ]))
                    }
                }),
            );
        });

        let connector = connector_with_hub(hub_url);

        let outcome = connector.call("peer-x", "/api/ping", CallOptions::get()).await;
        assert!(outcome.is_success());

        let record = connector.registry().get("peer-x").unwrap();
        assert_eq!(record.identity.base_url, peer_url);
        assert_eq!(record.status, ServiceStatus::Online);
    }

    #[actix_web::test]
    async fn test_directory_entry_without_address_is_not_found() {
        let hub_url = spawn(|cfg: &mut web::ServiceConfig| {
            cfg.route(
                "/api/stats",
                web::get().to(|| async {
                    HttpResponse::Ok().json(serde_json::json!({ "connectedRepls": 1 }))
                }),
            )
            .route(
                "/api/repls",
                web::get().to(|| async {
                    HttpResponse::Ok().json(serde_json::json!([
                        { "name": "peer-y", "status": "online" }
                    ]))
                }),
            );
        });

        let connector = connector_with_hub(hub_url);

        let outcome = connector.call("peer-y", "/api/ping", CallOptions::get()).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::NotFound));
    }

    #[actix_web::test]
    async fn test_post_body_reaches_peer() {
        let peer_url = spawn(|cfg: &mut web::ServiceConfig| {
            cfg.route(
                "/api/echo",
                web::post().to(|body: web::Json<serde_json::Value>| async move {
                    HttpResponse::Ok().json(body.into_inner())
                }),
            );
        });

        let connector =
            connector_with_known(HashMap::from([("peer-echo".to_string(), peer_url)]));

        let outcome = connector
            .call(
                "peer-echo",
                "/api/echo",
                CallOptions::post(serde_json::json!({ "text": "hello" }))
                    .with_header("x-trace-id", "test-1"),
            )
            .await;

        match outcome {
            CallOutcome::Success { payload } => assert_eq!(payload["text"], "hello"),
            CallOutcome::Failure { kind, detail } => {
                panic!("expected success, got {:?}: {}", kind, detail);
            }
        }
    }
}
