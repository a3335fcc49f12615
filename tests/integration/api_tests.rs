//! API integration tests

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use shelfcal::{api::create_router, config::AppConfig, AppState};

fn app() -> Router {
    create_router(AppState::new(AppConfig::default()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Failed to send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

/// Find a day cell by its value in a view
fn cell<'a>(view: &'a Value, date: &str) -> &'a Value {
    view["months"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|month| month["weeks"].as_array().into_iter().flatten())
        .flat_map(|week| week.as_array().into_iter().flatten())
        .find(|cell| cell["value"] == date)
        .expect("No such cell")
}

async fn create_range(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/range-calendars",
        Some(json!({
            "placeholder": "2024-03-01",
            "today": "2024-03-01",
            "options": { "week_starts_on": 0 },
            "ranges": [{ "start": "2024-03-10", "end": "2024-03-15" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("No id in response").to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["open_calendars"], 0);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["components"]["schemas"]["CreateRangeCalendar"]["properties"]["options"].is_object());
    assert!(body["paths"]["/range-calendars"]["post"].is_object());
}

#[tokio::test]
async fn test_create_range_calendar_view() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/range-calendars",
        Some(json!({
            "placeholder": "2024-03-01",
            "today": "2024-03-01",
            "options": { "week_starts_on": 0, "calendar_label": "Room booking" },
            "ranges": [{ "start": "2024-03-10", "end": "2024-03-15" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["kind"], "range");

    let view = &body["view"];
    assert_eq!(view["heading"], "March 2024");
    assert_eq!(view["full_label"], "Room booking March 2024");
    assert_eq!(view["weekdays"], json!(["S", "M", "T", "W", "T", "F", "S"]));
    assert_eq!(cell(view, "2024-03-12")["selected"], true);
    assert_eq!(cell(view, "2024-03-10")["selection_start"], true);
    assert_eq!(cell(view, "2024-03-01")["today"], true);
    assert_eq!(cell(view, "2024-03-01")["tab_index"], 0);
    assert_eq!(cell(view, "2024-02-25")["disabled"], true);
    assert!(view.get("start").is_none());
}

#[tokio::test]
async fn test_range_selection_redirects_past_reservation() {
    let app = app();
    let id = create_range(&app).await;
    let uri = format!("/api/v1/range-calendars/{}/activate", id);

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "date": "2024-03-05" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transition"], json!({ "kind": "started", "date": "2024-03-05" }));
    assert_eq!(body["view"]["announcement"]["message"], "Selected Date: March 5, 2024");

    let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "date": "2024-03-20" }))).await;
    assert_eq!(body["transition"]["kind"], "redirected");
    assert_eq!(body["view"]["start"], "2024-03-20");
    assert!(body["view"].get("end").is_none());
}

#[tokio::test]
async fn test_range_selection_completes() {
    let app = app();
    let id = create_range(&app).await;
    let uri = format!("/api/v1/range-calendars/{}/activate", id);

    send(&app, Method::POST, &uri, Some(json!({ "date": "2024-03-07" }))).await;
    let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "date": "2024-03-03" }))).await;
    assert_eq!(
        body["transition"],
        json!({ "kind": "completed", "start": "2024-03-03", "end": "2024-03-07" })
    );
    assert_eq!(
        body["view"]["announcement"]["message"],
        "Selected Dates: March 3, 2024 to March 7, 2024"
    );
    assert_eq!(cell(&body["view"], "2024-03-05")["selected"], true);

    let (_, view) = send(&app, Method::GET, &format!("/api/v1/range-calendars/{}", id), None).await;
    assert_eq!(view["start"], "2024-03-03");
    assert_eq!(view["end"], "2024-03-07");
    assert!(view["announcement"].is_null());
}

#[tokio::test]
async fn test_range_hover_highlights() {
    let app = app();
    let id = create_range(&app).await;
    send(
        &app,
        Method::POST,
        &format!("/api/v1/range-calendars/{}/activate", id),
        Some(json!({ "date": "2024-03-02" })),
    )
    .await;
    let (_, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/range-calendars/{}/focus", id),
        Some(json!({ "date": "2024-03-04" })),
    )
    .await;
    assert_eq!(body["transition"]["kind"], "ignored");
    assert_eq!(cell(&body["view"], "2024-03-03")["highlighted"], true);
    assert_eq!(cell(&body["view"], "2024-03-05")["highlighted"], false);
}

#[tokio::test]
async fn test_activation_over_unavailable_days_needs_confirm() {
    let app = app();
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/v1/range-calendars",
        Some(json!({
            "placeholder": "2024-03-01",
            "options": { "unavailable_dates": ["2024-03-07"] }
        })),
    )
    .await;
    let id = body["id"].as_str().expect("No id in response").to_string();
    let uri = format!("/api/v1/range-calendars/{}/activate", id);

    send(&app, Method::POST, &uri, Some(json!({ "date": "2024-03-05" }))).await;
    let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "date": "2024-03-10" }))).await;
    assert_eq!(body["transition"], json!({ "kind": "awaiting_confirm", "date": "2024-03-10" }));
    assert_eq!(body["view"]["start"], "2024-03-05");

    let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "date": "2024-03-10" }))).await;
    assert_eq!(body["transition"], json!({ "kind": "started", "date": "2024-03-10" }));
}

#[tokio::test]
async fn test_focus_outside_grid_is_ignored() {
    let app = app();
    let id = create_range(&app).await;
    send(
        &app,
        Method::POST,
        &format!("/api/v1/range-calendars/{}/activate", id),
        Some(json!({ "date": "2024-03-02" })),
    )
    .await;
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/range-calendars/{}/focus", id),
        Some(json!({ "date": "+200000-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cell(&body["view"], "2024-03-02")["highlighted"], true);
    assert_eq!(cell(&body["view"], "2024-03-03")["highlighted"], false);
}

#[tokio::test]
async fn test_keyboard_protocol() {
    let app = app();
    let id = create_range(&app).await;
    let uri = format!("/api/v1/range-calendars/{}/keydown", id);

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "key": "ArrowRight", "target": "2024-03-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transition"], json!({ "kind": "focused", "date": "2024-03-06" }));
    assert_eq!(body["view"]["placeholder"], "2024-03-06");

    let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "key": "Enter", "target": "2024-03-06" }))).await;
    assert_eq!(body["transition"]["kind"], "started");

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "key": "Enter", "target": "not-a-date" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidDate");
}

#[tokio::test]
async fn test_navigation() {
    let app = app();
    let id = create_range(&app).await;
    let uri = format!("/api/v1/range-calendars/{}/navigate", id);

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "action": "next_page" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transition"], json!({ "kind": "navigated", "placeholder": "2024-04-01" }));
    assert_eq!(body["view"]["heading"], "April 2024");

    let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "action": "set_year", "value": 2026 }))).await;
    assert_eq!(body["view"]["heading"], "April 2026");

    let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "action": "set_month" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_external_range_value() {
    let app = app();
    let id = create_range(&app).await;
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/range-calendars/{}/value", id),
        Some(json!({ "start": "2024-06-20", "end": "2024-06-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["start"], "2024-06-10");
    assert_eq!(body["view"]["end"], "2024-06-20");
    assert_eq!(body["view"]["heading"], "June 2024");
}

#[tokio::test]
async fn test_invalid_options_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/range-calendars",
        Some(json!({ "options": { "number_of_months": 13 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_multiple_calendar() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/calendars",
        Some(json!({
            "mode": "multiple",
            "placeholder": "2024-03-01",
            "value": ["2024-03-02"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["kind"], "multiple");
    let id = body["id"].as_str().expect("No id in response").to_string();

    let (_, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/calendars/{}/activate", id),
        Some(json!({ "date": "2024-03-04" })),
    )
    .await;
    assert_eq!(body["transition"], json!({ "kind": "added", "date": "2024-03-04" }));
    assert_eq!(body["view"]["values"], json!(["2024-03-02", "2024-03-04"]));

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/calendars/{}/value", id),
        Some(json!({ "value": "2024-03-09" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ValueShapeMismatch");
}

#[tokio::test]
async fn test_single_calendar_select_and_clear() {
    let app = app();
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/v1/calendars",
        Some(json!({ "placeholder": "2024-03-01" })),
    )
    .await;
    assert_eq!(body["kind"], "single");
    let id = body["id"].as_str().expect("No id in response").to_string();
    let uri = format!("/api/v1/calendars/{}/activate", id);

    let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "date": "2024-03-08" }))).await;
    assert_eq!(body["transition"]["kind"], "selected");
    let (_, body) = send(&app, Method::POST, &uri, Some(json!({ "date": "2024-03-08" }))).await;
    assert_eq!(body["transition"]["kind"], "cleared");
    assert_eq!(body["view"]["announcement"]["timeout_ms"], 5000);
    assert_eq!(body["view"]["values"], json!([]));
}

#[tokio::test]
async fn test_unknown_and_deleted_calendars() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/range-calendars/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = create_range(&app).await;
    let (status, _) = send(&app, Method::GET, &format!("/api/v1/calendars/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/range-calendars/{}", id);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
