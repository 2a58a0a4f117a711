//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::matching::MatchingEngine;
use crate::domains::notifications::NotificationDispatcher;
use crate::kernel::{BaseEmailService, BaseWebPushService, SessionRegistry};
use crate::server::routes::{
    health_handler, reject_interview_handler, replace_slots_handler, stream_handler,
    submit_request_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub registry: SessionRegistry,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub engine: Arc<MatchingEngine>,
}

/// Build the Axum application router.
///
/// Wires the session registry, dispatcher and matching engine together;
/// the caller owns the cleanup scheduler separately.
pub fn build_app(
    pool: PgPool,
    email: Arc<dyn BaseEmailService>,
    web_push: Arc<dyn BaseWebPushService>,
) -> (Router, AppState) {
    let registry = SessionRegistry::new();

    let dispatcher = Arc::new(NotificationDispatcher::new(
        pool.clone(),
        registry.clone(),
        email,
        web_push,
    ));

    let engine = Arc::new(MatchingEngine::new(pool.clone(), dispatcher.clone()));

    let app_state = AppState {
        db_pool: pool,
        registry,
        dispatcher,
        engine,
    };

    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let router = Router::new()
        .route("/api/requests", post(submit_request_handler))
        .route("/api/requests/:id/slots", put(replace_slots_handler))
        .route("/api/interviews/:id", delete(reject_interview_handler))
        .route("/api/stream/:user_id", get(stream_handler))
        .route("/health", get(health_handler))
        .layer(Extension(app_state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    (router, app_state)
}
