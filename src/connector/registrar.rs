//! Hub registration
//!
//! Registration is advisory: every failure is logged and swallowed, and
//! the caller only learns whether the announcement landed.

use tracing::{info, warn};

use super::Connector;
use crate::models::{ConnectorError, ConnectorResult, HubHandle};

impl Connector {
    /// Announce this instance to the hub
    ///
    /// Returns `false` without error when no hub is discoverable or the
    /// POST fails. Safe to retry; the hub keys registrations by name, so
    /// repeated calls simply re-post current state.
    pub async fn register(&self) -> bool {
        let hub = match self.discover_hub().await {
            Some(hub) => hub,
            None => {
                info!("Skipping registration, no hub available");
                return false;
            }
        };

        match self.post_registration(&hub).await {
            Ok(()) => {
                info!("Registered '{}' with hub {}", self.identity.name, hub.base_url);
                true
            }
            Err(e) => {
                warn!("Registration with hub {} failed: {}", hub.base_url, e);
                false
            }
        }
    }

    async fn post_registration(&self, hub: &HubHandle) -> ConnectorResult<()> {
        let url = format!("{}/api/repls", hub.base_url);

        let body = serde_json::json!({
            "name": self.identity.name,
            "apiBaseUrl": self.identity.base_url,
            "status": "online",
            "description": self.description,
            "capabilities": self.identity.capabilities,
        });

        let response = self.http_client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(ConnectorError::Hub(format!(
                "Registration rejected: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectorConfig;
    use crate::models::ServiceIdentity;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use parking_lot::Mutex;
    use std::sync::Arc;

    async fn stats() -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "connectedRepls": 3 }))
    }

    async fn accept_registration(
        seen: web::Data<Arc<Mutex<Vec<serde_json::Value>>>>,
        body: web::Json<serde_json::Value>,
    ) -> HttpResponse {
        seen.lock().push(body.into_inner());
        HttpResponse::Ok().json(serde_json::json!({ "registered": true }))
    }

    fn spawn_hub(seen: Arc<Mutex<Vec<serde_json::Value>>>) -> String {
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(Arc::clone(&seen)))
                .route("/api/stats", web::get().to(stats))
                .route("/api/repls", web::post().to(accept_registration))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    fn dead_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    fn connector(candidates: Vec<String>) -> Connector {
        let identity = ServiceIdentity::new(
            "agent-under-test",
            "http://localhost:8080",
            vec!["voice".to_string()],
        );
        let config = ConnectorConfig {
            hub_candidates: candidates,
            ..Default::default()
        };
        Connector::new(identity, config)
    }

    #[actix_web::test]
    async fn test_register_posts_identity_to_hub() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let hub_url = spawn_hub(Arc::clone(&seen));

        let connector = connector(vec![hub_url]);
        assert!(connector.register().await);

        let posted = seen.lock();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0]["name"], "agent-under-test");
        assert_eq!(posted[0]["apiBaseUrl"], "http://localhost:8080");
        assert_eq!(posted[0]["status"], "online");
        assert_eq!(posted[0]["capabilities"][0], "voice");
    }

    #[actix_web::test]
    async fn test_register_is_idempotent() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let hub_url = spawn_hub(Arc::clone(&seen));

        let connector = connector(vec![hub_url]);
        assert!(connector.register().await);
        assert!(connector.register().await);

        // Both announcements carry the same name; the hub keys by it
        let posted = seen.lock();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0]["name"], posted[1]["name"]);
    }

    #[actix_web::test]
    async fn test_register_without_hub_returns_false() {
        let connector = connector(vec![dead_url()]);
        assert!(!connector.register().await);
        assert!(connector.is_standalone());
    }
}
