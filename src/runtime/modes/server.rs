//! Server mode
//!
//! Configures and starts the HTTP server with all routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::middleware::{RequestIdMiddleware, TimingMiddleware};
use crate::api::services::{AppStartTime, health_routes, json_body_limit, page_routes, share_routes};
use crate::config::{ServerConfig, get_config};
use crate::runtime::lifetime;

/// Upper bound on worker threads
const MAX_WORKERS: usize = 32;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(server: &ServerConfig) {
    if server.cors_allowed_origins.iter().any(|o| o == "*") {
        warn!("CORS allows any origin; every website can call the share API");
    }
}

/// Build CORS middleware from configuration
///
/// Empty origin list keeps the browser's same-origin policy.
fn build_cors_middleware(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::default();
    }

    let mut cors = if allowed_origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors = cors
        .allowed_methods(vec!["GET", "HEAD", "POST", "OPTIONS"])
        .allowed_header(actix_web::http::header::CONTENT_TYPE)
        .allowed_header(actix_web::http::header::ACCEPT)
        .expose_headers(vec!["x-request-id"])
        .max_age(3600);

    cors
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function.
/// Stops on SIGINT / SIGTERM through actix's built-in signal handling.
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();
    let config = get_config();

    let startup = lifetime::startup::prepare_startup(&config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let store = startup.store.clone();
    let share_service = startup.share_service.clone();
    let page_context = startup.page_context.clone();

    let cpu_count = config.server.cpu_count.clamp(1, MAX_WORKERS);
    warn!("Using {} CPU cores for the server", cpu_count);

    validate_cors_config(&config.server);
    let cors_origins = config.server.cors_allowed_origins.clone();
    let max_content_bytes = config.share.max_content_bytes;
    let payload_limit = json_body_limit(max_content_bytes);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate"))
                    .add(("X-Content-Type-Options", "nosniff")),
            )
            .wrap(build_cors_middleware(&cors_origins))
            .wrap(TimingMiddleware) // 记录请求延迟
            .wrap(RequestIdMiddleware) // 最外层，span 覆盖其余中间件
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(share_service.clone()))
            .app_data(web::Data::new(page_context.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(payload_limit))
            .service(share_routes(max_content_bytes))
            .service(page_routes())
            .service(health_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("HTTP server terminated with an error")?;

    warn!("Server stopped");
    Ok(())
}
