//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{calendars, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfcal API",
        version = "0.3.0",
        description = "Server-side date and date-range pickers for the library catalog",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Range calendars
        calendars::create_range_calendar,
        calendars::get_range_calendar,
        calendars::delete_range_calendar,
        calendars::activate_range_day,
        calendars::focus_range_day,
        calendars::range_keydown,
        calendars::navigate_range_calendar,
        calendars::set_range_value,
        // Single and multiple date calendars
        calendars::create_calendar,
        calendars::get_calendar,
        calendars::delete_calendar,
        calendars::activate_day,
        calendars::focus_day,
        calendars::keydown,
        calendars::navigate_calendar,
        calendars::set_value,
    ),
    components(
        schemas(
            // Requests
            crate::models::calendar::CalendarSettings,
            crate::models::calendar::CreateRangeCalendar,
            crate::models::calendar::CreateCalendar,
            crate::models::calendar::DateRequest,
            crate::models::calendar::KeyDownRequest,
            crate::models::calendar::NavigateAction,
            crate::models::calendar::NavigateRequest,
            crate::models::calendar::RangeValueRequest,
            crate::models::calendar::CalendarValueRequest,
            crate::calendar::BlockedRange,
            crate::calendar::SelectionMode,
            crate::calendar::WeekdayFormat,
            // Responses
            crate::models::calendar::CalendarKind,
            crate::models::calendar::CalendarCreated,
            crate::models::calendar::TransitionResponse,
            crate::calendar::CalendarView,
            crate::calendar::MonthView,
            crate::calendar::DayCell,
            crate::calendar::DateKind,
            crate::calendar::Announcement,
            crate::calendar::Politeness,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "range-calendars", description = "Date range pickers"),
        (name = "calendars", description = "Single and multiple date pickers")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
