//! API routes
//!
//! # Structure
//!
//! - [`health`] - health checks (public)
//! - [`auth`] - login and current-user info
//! - [`rooms`] - room list/detail/stream and all transitions
//! - [`upload`] - evidence image upload and serving

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub mod auth;
pub mod health;
pub mod rooms;
pub mod upload;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(auth::router())
        .merge(rooms::router())
        .merge(upload::router())
        .merge(health::router())
}

/// Build the fully configured application with middleware.
///
/// Authentication is handled per-handler by the [`CurrentUser`]
/// extractor rather than a router-level middleware, so public routes
/// (health, login, image serving) need no carve-outs here.
///
/// [`CurrentUser`]: crate::auth::CurrentUser
pub fn build_app() -> Router<ServerState> {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
}
