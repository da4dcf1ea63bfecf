pub mod auth;
pub mod extract;
pub mod middleware;
pub mod reports;
pub mod state;

pub use state::AppState;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    BoxError, Router,
};
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::time::Duration;
use serde::Serialize;

use crate::error::AppError;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    time: String,
}

pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/me", get(auth::me))
        .route(
            "/api/reports",
            post(reports::create_report).get(reports::list_reports),
        )
        .route("/api/reports/:id/status", patch(reports::set_report_status))
        .route("/api/reports/:id", delete(reports::delete_report))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES));

    with_timeout(app, timeout)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Requests running past `timeout` are answered with the usual error body.
fn with_timeout<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout_error))
            .timeout(timeout),
    )
}

async fn handle_timeout_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::Internal("request timed out".to_string())
    } else {
        AppError::Internal(format!("unhandled middleware error: {}", err))
    }
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        ok: true,
        time: crate::db::now_iso(),
    })
}
