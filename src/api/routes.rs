//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    decrement_handler, delete_handler, get_handler, health_handler, increment_handler,
    limiter_clear_handler, limiter_hit_handler, limiter_lock_handler, limiter_status_handler,
    override_handler, put_handler, verify_check_handler, verify_clear_handler,
    verify_generate_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET/PUT/PATCH/DELETE /cache/:key` - Read, store, update, forget a key
/// - `POST /cache/:key/increment`, `/cache/:key/decrement` - Counters
/// - `GET/DELETE /limiter/:name`, `POST /limiter/:name/hit`, `/limiter/:name/lock`
/// - `POST/DELETE /verify/:name`, `POST /verify/:name/check`
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/cache/:key",
            get(get_handler)
                .put(put_handler)
                .patch(override_handler)
                .delete(delete_handler),
        )
        .route("/cache/:key/increment", post(increment_handler))
        .route("/cache/:key/decrement", post(decrement_handler))
        .route(
            "/limiter/:name",
            get(limiter_status_handler).delete(limiter_clear_handler),
        )
        .route("/limiter/:name/hit", post(limiter_hit_handler))
        .route("/limiter/:name/lock", post(limiter_lock_handler))
        .route(
            "/verify/:name",
            post(verify_generate_handler).delete(verify_clear_handler),
        )
        .route("/verify/:name/check", post(verify_check_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
