//! Calendar widget endpoints
//!
//! `/range-calendars` hosts range pickers, `/calendars` single and
//! multiple date pickers. Both families accept the same interaction
//! events and answer with the transition that happened plus the new view.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    calendar::{CalendarView, RangeValue},
    error::AppResult,
    models::calendar::{
        CalendarCreated, CalendarValueRequest, CreateCalendar, CreateRangeCalendar, DateRequest,
        KeyDownRequest, NavigateRequest, RangeValueRequest, TransitionResponse,
    },
    services::calendars::SessionFamily,
    AppState,
};

/// Create a range calendar
#[utoipa::path(
    post,
    path = "/range-calendars",
    tag = "range-calendars",
    request_body = CreateRangeCalendar,
    responses(
        (status = 201, description = "Calendar created", body = CalendarCreated),
        (status = 400, description = "Invalid options", body = crate::error::ErrorResponse),
        (status = 503, description = "Too many open calendars", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_range_calendar(
    State(state): State<AppState>,
    Json(request): Json<CreateRangeCalendar>,
) -> AppResult<(StatusCode, Json<CalendarCreated>)> {
    request.validate()?;
    let created = state.services.calendars.create_range(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get the current view of a range calendar
#[utoipa::path(
    get,
    path = "/range-calendars/{id}",
    tag = "range-calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    responses(
        (status = 200, description = "Calendar view", body = CalendarView),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_range_calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CalendarView>> {
    let view = state.services.calendars.view(SessionFamily::Range, id).await?;
    Ok(Json(view))
}

/// Delete a range calendar
#[utoipa::path(
    delete,
    path = "/range-calendars/{id}",
    tag = "range-calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    responses(
        (status = 204, description = "Calendar deleted"),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_range_calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.calendars.delete(SessionFamily::Range, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Click or keyboard-select a day of a range calendar
#[utoipa::path(
    post,
    path = "/range-calendars/{id}/activate",
    tag = "range-calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    request_body = DateRequest,
    responses(
        (status = 200, description = "Interaction applied", body = TransitionResponse),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn activate_range_day(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DateRequest>,
) -> AppResult<Json<TransitionResponse>> {
    let response = state
        .services
        .calendars
        .activate(SessionFamily::Range, id, request.date)
        .await?;
    Ok(Json(response))
}

/// Hover or focus a day of a range calendar
#[utoipa::path(
    post,
    path = "/range-calendars/{id}/focus",
    tag = "range-calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    request_body = DateRequest,
    responses(
        (status = 200, description = "Focus recorded", body = TransitionResponse),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn focus_range_day(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DateRequest>,
) -> AppResult<Json<TransitionResponse>> {
    let response = state
        .services
        .calendars
        .focus(SessionFamily::Range, id, request.date)
        .await?;
    Ok(Json(response))
}

/// Key press on a day of a range calendar
#[utoipa::path(
    post,
    path = "/range-calendars/{id}/keydown",
    tag = "range-calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    request_body = KeyDownRequest,
    responses(
        (status = 200, description = "Key handled", body = TransitionResponse),
        (status = 400, description = "Target is not a date", body = crate::error::ErrorResponse),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn range_keydown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<KeyDownRequest>,
) -> AppResult<Json<TransitionResponse>> {
    request.validate()?;
    let response = state
        .services
        .calendars
        .keydown(SessionFamily::Range, id, &request.key, &request.target)
        .await?;
    Ok(Json(response))
}

/// Page or jump a range calendar
#[utoipa::path(
    post,
    path = "/range-calendars/{id}/navigate",
    tag = "range-calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Navigation applied", body = TransitionResponse),
        (status = 400, description = "Missing or invalid value", body = crate::error::ErrorResponse),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn navigate_range_calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NavigateRequest>,
) -> AppResult<Json<TransitionResponse>> {
    let response = state
        .services
        .calendars
        .navigate(SessionFamily::Range, id, request)
        .await?;
    Ok(Json(response))
}

/// Replace the selected range
#[utoipa::path(
    put,
    path = "/range-calendars/{id}/value",
    tag = "range-calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    request_body = RangeValueRequest,
    responses(
        (status = 200, description = "Value replaced", body = TransitionResponse),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_range_value(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RangeValueRequest>,
) -> AppResult<Json<TransitionResponse>> {
    let value = RangeValue {
        start: request.start,
        end: request.end,
    };
    let response = state.services.calendars.set_range_value(id, value).await?;
    Ok(Json(response))
}

/// Create a single or multiple date calendar
#[utoipa::path(
    post,
    path = "/calendars",
    tag = "calendars",
    request_body = CreateCalendar,
    responses(
        (status = 201, description = "Calendar created", body = CalendarCreated),
        (status = 400, description = "Invalid options", body = crate::error::ErrorResponse),
        (status = 422, description = "Value does not match the mode", body = crate::error::ErrorResponse),
        (status = 503, description = "Too many open calendars", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_calendar(
    State(state): State<AppState>,
    Json(request): Json<CreateCalendar>,
) -> AppResult<(StatusCode, Json<CalendarCreated>)> {
    request.validate()?;
    let created = state.services.calendars.create_calendar(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get the current view of a calendar
#[utoipa::path(
    get,
    path = "/calendars/{id}",
    tag = "calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    responses(
        (status = 200, description = "Calendar view", body = CalendarView),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CalendarView>> {
    let view = state.services.calendars.view(SessionFamily::Dates, id).await?;
    Ok(Json(view))
}

/// Delete a calendar
#[utoipa::path(
    delete,
    path = "/calendars/{id}",
    tag = "calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    responses(
        (status = 204, description = "Calendar deleted"),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.calendars.delete(SessionFamily::Dates, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Click or keyboard-select a day
#[utoipa::path(
    post,
    path = "/calendars/{id}/activate",
    tag = "calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    request_body = DateRequest,
    responses(
        (status = 200, description = "Interaction applied", body = TransitionResponse),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn activate_day(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DateRequest>,
) -> AppResult<Json<TransitionResponse>> {
    let response = state
        .services
        .calendars
        .activate(SessionFamily::Dates, id, request.date)
        .await?;
    Ok(Json(response))
}

/// Hover or focus a day
#[utoipa::path(
    post,
    path = "/calendars/{id}/focus",
    tag = "calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    request_body = DateRequest,
    responses(
        (status = 200, description = "Focus recorded", body = TransitionResponse),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn focus_day(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DateRequest>,
) -> AppResult<Json<TransitionResponse>> {
    let response = state
        .services
        .calendars
        .focus(SessionFamily::Dates, id, request.date)
        .await?;
    Ok(Json(response))
}

/// Key press on a day
#[utoipa::path(
    post,
    path = "/calendars/{id}/keydown",
    tag = "calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    request_body = KeyDownRequest,
    responses(
        (status = 200, description = "Key handled", body = TransitionResponse),
        (status = 400, description = "Target is not a date", body = crate::error::ErrorResponse),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn keydown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<KeyDownRequest>,
) -> AppResult<Json<TransitionResponse>> {
    request.validate()?;
    let response = state
        .services
        .calendars
        .keydown(SessionFamily::Dates, id, &request.key, &request.target)
        .await?;
    Ok(Json(response))
}

/// Page or jump a calendar
#[utoipa::path(
    post,
    path = "/calendars/{id}/navigate",
    tag = "calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Navigation applied", body = TransitionResponse),
        (status = 400, description = "Missing or invalid value", body = crate::error::ErrorResponse),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn navigate_calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NavigateRequest>,
) -> AppResult<Json<TransitionResponse>> {
    let response = state
        .services
        .calendars
        .navigate(SessionFamily::Dates, id, request)
        .await?;
    Ok(Json(response))
}

/// Replace the selected date(s)
#[utoipa::path(
    put,
    path = "/calendars/{id}/value",
    tag = "calendars",
    params(("id" = Uuid, Path, description = "Calendar ID")),
    request_body = CalendarValueRequest,
    responses(
        (status = 200, description = "Value replaced", body = TransitionResponse),
        (status = 404, description = "Calendar not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Value does not match the mode", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_value(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CalendarValueRequest>,
) -> AppResult<Json<TransitionResponse>> {
    let response = state.services.calendars.set_value(id, request.value).await?;
    Ok(Json(response))
}
