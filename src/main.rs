//! geoip-headers - demo server
//!
//! Composition root: loads the configuration and the MaxMind database,
//! and serves a small echo app behind the GeoIP middleware.

use axum::{extract::Extension, Router};
use geoip_headers::{load_config, ClientGeo, GeoEnrichmentService, GeoIpLayer, MaxMindGeoLookup};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let header_names = cfg.headers.parse()?;

    let lookup = MaxMindGeoLookup::from_file(&cfg.db_path).map_err(|e| {
        tracing::error!("failed to load GeoIP DB from {}: {:?}", cfg.db_path, e);
        e
    })?;
    tracing::info!(
        "GeoIP DB loaded from {} ({})",
        cfg.db_path,
        lookup.database_type()
    );

    let service = Arc::new(GeoEnrichmentService::new(
        Arc::new(lookup),
        header_names,
        cfg.trust_forwarded_for,
    ));

    if service.trusts_forwarded_for() {
        tracing::warn!("trusting X-Forwarded-For; only safe behind a proxy that rewrites it");
    }

    let app = Router::new()
        .fallback(whoami_handler)
        .layer(GeoIpLayer::new(service))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("geoip-headers listening on {}", cfg.listen_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn whoami_handler(geo: Option<Extension<ClientGeo>>) -> String {
    match geo {
        Some(Extension(geo)) => format!(
            "{} {}\n",
            geo.ip,
            geo.record.country.iso_code.as_deref().unwrap_or("-")
        ),
        None => "unknown\n".to_string(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
