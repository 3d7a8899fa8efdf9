//! Server mode
//!
//! Builds the actix-web application and runs it until Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::http::{Method, header};
use actix_web::middleware::Compress;
use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::middleware::RequestLogMiddleware;
use crate::api::response::json_config;
use crate::api::services::{AppStartTime, api_routes, live_routes};
use crate::config::{CorsConfig, LiveConfig};
use crate::runtime::lifetime;

/// CORS 设置（REST 接口与实时通道各一份）
#[derive(Clone, Debug)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<Method>,
    pub max_age: u64,
}

impl CorsSettings {
    pub fn for_rest(config: &CorsConfig) -> Self {
        Self {
            allowed_origins: config.allowed_origins.clone(),
            allowed_methods: vec![Method::GET, Method::HEAD, Method::POST, Method::OPTIONS],
            max_age: config.max_age,
        }
    }

    pub fn for_live(config: &LiveConfig, max_age: u64) -> Self {
        Self {
            allowed_origins: vec![config.allowed_origin.clone()],
            allowed_methods: vec![Method::GET, Method::OPTIONS],
            max_age,
        }
    }

    fn is_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Validate CORS configuration at startup (runs once)
fn validate_cors_settings(name: &str, settings: &CorsSettings) {
    if settings
        .allowed_origins
        .iter()
        .all(|o| o.trim().is_empty())
    {
        warn!(
            "{} CORS has no allowed origins; cross-origin requests will be rejected",
            name
        );
    }
}

/// Build CORS middleware from settings
pub fn build_cors_middleware(settings: &CorsSettings) -> Cors {
    let mut cors = Cors::default();

    if settings.is_any_origin() {
        cors = cors.allow_any_origin();
    } else {
        for origin in settings.allowed_origins.iter().filter(|o| !o.trim().is_empty()) {
            cors = cors.allowed_origin(origin.trim());
        }
    }

    cors.allowed_methods(settings.allowed_methods.clone())
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT, header::CACHE_CONTROL])
        .max_age(settings.max_age as usize)
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = lifetime::startup::prepare_server_startup().await?;

    let config = crate::config::get_config();
    let storage = startup.storage.clone();
    let live_hub = startup.live_hub.clone();
    let scan_service = startup.scan_service.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let rest_cors = CorsSettings::for_rest(&config.cors);
    let live_cors = CorsSettings::for_live(&config.live, config.cors.max_age);
    validate_cors_settings("REST", &rest_cors);
    validate_cors_settings("Live channel", &live_cors);

    if config.server.trusted_proxies.is_empty() {
        warn!("No trusted proxies configured; visitor signatures use the peer address");
    } else {
        warn!(
            "Trusted proxies configured: {:?}",
            config.server.trusted_proxies
        );
    }

    let db_for_shutdown = storage.get_db().clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogMiddleware)
            .app_data(web::Data::new(scan_service.clone()))
            .app_data(web::Data::new(Arc::clone(&live_hub)))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(json_config())
            .service(live_routes().wrap(build_cors_middleware(&live_cors)))
            .service(
                web::scope("")
                    .configure(api_routes)
                    .wrap(Compress::default())
                    .wrap(build_cors_middleware(&rest_cors)),
            )
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    tokio::select! {
        res = server => {
            res.context("HTTP server error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_settings_default_to_any_origin() {
        let settings = CorsSettings::for_rest(&CorsConfig::default());
        assert!(settings.is_any_origin());
        assert!(settings.allowed_methods.contains(&Method::POST));
    }

    #[test]
    fn test_live_settings_use_single_origin() {
        let live = LiveConfig {
            allowed_origin: "https://dash.example.com".to_string(),
            ..LiveConfig::default()
        };
        let settings = CorsSettings::for_live(&live, 600);
        assert_eq!(settings.allowed_origins, vec!["https://dash.example.com"]);
        assert!(!settings.is_any_origin());
        assert!(!settings.allowed_methods.contains(&Method::POST));
    }
}
