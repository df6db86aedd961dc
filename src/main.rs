//! Mesh Connector - Main Entry Point
//!
//! Starts the health HTTP server and performs best-effort hub
//! registration in the background.

use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mesh_connector::api::{configure_health_routes, AppState};
use mesh_connector::config::Settings;
use mesh_connector::connector::{Connector, ConnectorConfig};
use mesh_connector::models::ServiceIdentity;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging with RUST_LOG environment variable support
    // Default: info level for mesh_connector, warn for everything else
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,mesh_connector=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}, using defaults", e);
        Settings::default()
    });

    info!(
        "Starting Mesh Connector v{} ({})",
        env!("CARGO_PKG_VERSION"),
        settings.service.name
    );
    info!("Public URL: {}", settings.service.public_url);
    info!("HTTP: {}:{}", settings.server.host, settings.server.http_port);

    let identity = ServiceIdentity::new(
        &settings.service.name,
        &settings.service.public_url,
        settings.service.capabilities.clone(),
    );

    // One connector per process; the hub handle is cached inside it
    let connector = Arc::new(Connector::new(
        identity.clone(),
        ConnectorConfig::from_settings(&settings),
    ));

    // Best-effort registration; standalone mode is fine
    if settings.discovery.enabled {
        let connector = Arc::clone(&connector);
        actix_web::rt::spawn(async move {
            connector.register().await;
        });
    } else {
        info!("Hub discovery disabled, running standalone");
    }

    let app_state = AppState::new(identity);

    let http_addr = format!("{}:{}", settings.server.host, settings.server.http_port);
    info!("Starting HTTP server on {}", http_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(Arc::clone(&connector)))
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .configure(configure_health_routes)
    })
    .workers(settings.server.workers)
    .bind(&http_addr)?
    .run()
    .await
}
