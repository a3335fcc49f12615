//! API handlers for shelfcal REST endpoints

pub mod calendars;
pub mod health;
pub mod openapi;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Range calendars
        .route("/range-calendars", post(calendars::create_range_calendar))
        .route(
            "/range-calendars/:id",
            get(calendars::get_range_calendar).delete(calendars::delete_range_calendar),
        )
        .route("/range-calendars/:id/activate", post(calendars::activate_range_day))
        .route("/range-calendars/:id/focus", post(calendars::focus_range_day))
        .route("/range-calendars/:id/keydown", post(calendars::range_keydown))
        .route("/range-calendars/:id/navigate", post(calendars::navigate_range_calendar))
        .route("/range-calendars/:id/value", put(calendars::set_range_value))
        // Single and multiple date calendars
        .route("/calendars", post(calendars::create_calendar))
        .route(
            "/calendars/:id",
            get(calendars::get_calendar).delete(calendars::delete_calendar),
        )
        .route("/calendars/:id/activate", post(calendars::activate_day))
        .route("/calendars/:id/focus", post(calendars::focus_day))
        .route("/calendars/:id/keydown", post(calendars::keydown))
        .route("/calendars/:id/navigate", post(calendars::navigate_calendar))
        .route("/calendars/:id/value", put(calendars::set_value))
        .with_state(state);

    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
