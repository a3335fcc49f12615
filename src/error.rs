//! Error types for the shelfcal server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::calendar::CalendarError;

/// Numeric error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    NoSuchCalendar = 1,
    BadValue = 2,
    InvalidDate = 3,
    ValueShapeMismatch = 4,
    TooManyCalendars = 5,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Too many calendars: {0}")]
    Capacity(String),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchCalendar, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Capacity(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::TooManyCalendars, msg.clone())
            }
            AppError::Calendar(e) => match e {
                CalendarError::InvalidDate { .. } | CalendarError::UnknownDateKind(_) => {
                    (StatusCode::BAD_REQUEST, ErrorCode::InvalidDate, e.to_string())
                }
                CalendarError::SingleValueExpected | CalendarError::MultipleValueExpected => {
                    tracing::warn!("Calendar misconfiguration: {}", e);
                    (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::ValueShapeMismatch, e.to_string())
                }
            },
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
