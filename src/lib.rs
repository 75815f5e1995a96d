pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod sinks;
pub mod state;
pub mod submission;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::rate_limit::SubmissionRateLimiter;
use crate::sinks::archive::ArchiveSink;
use crate::sinks::email::EmailSink;
use crate::sinks::webhook::WebhookSink;
use crate::sinks::SinkSet;
use crate::state::{AppState, SharedState};

/// Build the sinks the configuration enables, in delivery-report order.
///
/// A sink that cannot be constructed is left out with a warning.
pub fn build_sinks(config: &Config, pool: Option<PgPool>) -> SinkSet {
    let mut sinks = SinkSet::new();

    match &config.webhook_url {
        Some(url) => match WebhookSink::new(url, config.sink_timeout) {
            Ok(sink) => {
                tracing::info!("Webhook sink configured");
                sinks.register(Arc::new(sink));
            }
            Err(e) => tracing::warn!("Webhook sink not available: {e}"),
        },
        None => tracing::warn!("BESTIE_WEBHOOK_URL not set, submissions will not be stored"),
    }

    match &config.smtp {
        Some(smtp) => match EmailSink::new(smtp, &config.notify_email, config.sink_timeout) {
            Ok(sink) => {
                tracing::info!("Email sink configured");
                sinks.register(Arc::new(sink));
            }
            Err(e) => tracing::warn!("Email sink not available: {e}"),
        },
        None => tracing::info!("SMTP not configured, email notifications disabled"),
    }

    if let Some(pool) = pool {
        tracing::info!("Archive sink configured");
        sinks.register(Arc::new(ArchiveSink::new(pool)));
    }

    sinks
}

pub fn build_app(config: Config, sinks: SinkSet) -> (Router, SharedState) {
    let cors = cors_layer(&config.cors_origins);
    let body_limit = DefaultBodyLimit::max(config.max_body_size);
    let static_dir = ServeDir::new(&config.static_dir);

    let state: SharedState = Arc::new(AppState {
        limiter: SubmissionRateLimiter::new(config.rate_limit, config.rate_limit_window),
        config,
        sinks,
    });

    let app = Router::new()
        .merge(routes::submission_routes().layer(body_limit))
        .fallback_service(static_dir)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state.clone());

    (app, state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{origin}': {e}");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
