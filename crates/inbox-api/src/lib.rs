//! # inbox-api
//!
//! HTTP surface of the inbox matching service.
//!
//! Every handler validates its input, takes the tenant from the session and
//! makes exactly one downstream call: a repository operation or a task
//! dispatch.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;

use inbox_core::defaults;

pub use auth::RequireAuth;
pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = inbox_core::new_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(defaults::CORS_MAX_AGE_SECS))
}

/// Build the application router with all routes and middleware.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    use handlers::{document_tags, documents, inbox, teams, users};

    Router::new()
        .route("/health", get(health_check))
        // Inbox
        .route("/api/v1/inbox", get(inbox::list_inbox))
        .route("/api/v1/inbox/search", get(inbox::search_inbox))
        .route("/api/v1/inbox/attachments", post(inbox::process_attachments))
        .route(
            "/api/v1/inbox/:id",
            get(inbox::get_inbox_item)
                .patch(inbox::update_inbox_item)
                .delete(inbox::delete_inbox_item),
        )
        .route("/api/v1/inbox/:id/match", post(inbox::match_transaction))
        .route("/api/v1/inbox/:id/unmatch", post(inbox::unmatch_transaction))
        // Documents & tags
        .route("/api/v1/documents", get(documents::list_documents))
        .route("/api/v1/documents/:id", get(documents::get_document))
        .route(
            "/api/v1/document-tags",
            get(document_tags::list_document_tags).post(document_tags::create_document_tag),
        )
        .route(
            "/api/v1/document-tag-assignments",
            post(document_tags::create_assignment).delete(document_tags::delete_assignment),
        )
        // Teams & users
        .route("/api/v1/teams", post(teams::create_team))
        .route("/api/v1/users/me", get(users::get_me).patch(users::update_me))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.allowed_origins)),
        )
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .with_state(state)
}
