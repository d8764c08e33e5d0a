//! HTTP ingress: owns the listener, the shared middleware stack and the
//! `/health` probe. Feature modules hand in their routes as a plain
//! `axum::Router`.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Router};
use runtime::ServerConfig;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

pub mod request_id;
pub mod shutdown;
pub mod web;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Wrap module routes with `/health` and the middleware stack.
///
/// Outermost to innermost:
/// SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions -> Timeout -> CORS -> BodyLimit
///
/// axum runs the last `.layer()` first, so layers are added innermost first.
pub fn build_router(routes: Router, cfg: &ServerConfig) -> Router {
    tracing::debug!("Building router");
    let mut router = routes.route("/health", get(web::health_check));

    router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));

    if cfg.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    let timeout = match cfg.timeout_sec {
        0 => DEFAULT_TIMEOUT_SECS,
        secs => secs,
    };
    router = router.layer(TimeoutLayer::new(Duration::from_secs(timeout)));

    // Runs inside the trace span so the id lands on it
    router = router.layer(from_fn(request_id::push_req_id_to_extensions));
    router = router.layer(request_id::create_trace_layer());

    let x_request_id = request_id::header();
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
}

/// Bind `cfg.bind_addr()` and serve until SIGINT/SIGTERM.
pub async fn serve(cfg: &ServerConfig, router: Router) -> Result<()> {
    let addr: SocketAddr = cfg
        .bind_addr()
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", cfg.bind_addr()))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("HTTP server bound on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            shutdown::wait_for_shutdown().await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
