//! API Routes
//!
//! Configures the Axum router with the news, booking and chatbot endpoints.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::bookings::{
    create_booking_handler, delete_booking_handler, list_bookings_handler, update_booking_handler,
};
use super::governor::governor_middleware;
use super::handlers::{
    chatbot_flow_handler, clear_cache_handler, headlines_handler, health_handler,
    news_health_handler, search_handler, sources_handler,
};
use super::AppState;
use crate::booking::MAX_UPLOAD_BYTES;

/// Request body ceiling: one maximal upload plus room for the form fields.
const MAX_BODY_BYTES: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /news/headlines`, `GET /news/search`, `GET /news/sources`
/// - `GET /news/health`, `POST /news/clear-cache`
/// - `POST /consultations`, `GET /consultations`
/// - `PATCH /consultations/:id`, `DELETE /consultations/:id`
/// - `GET /chatbot/flow`
/// - `GET /health` - process liveness check
///
/// # Middleware
/// - Governor: every `/news` route, ahead of the cache
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let news = Router::new()
        .route("/headlines", get(headlines_handler))
        .route("/search", get(search_handler))
        .route("/sources", get(sources_handler))
        .route("/health", get(news_health_handler))
        .route("/clear-cache", post(clear_cache_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            governor_middleware,
        ));

    Router::new()
        .nest("/news", news)
        .route(
            "/consultations",
            post(create_booking_handler).get(list_bookings_handler),
        )
        .route(
            "/consultations/:id",
            patch(update_booking_handler).delete(delete_booking_handler),
        )
        .route("/chatbot/flow", get(chatbot_flow_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
