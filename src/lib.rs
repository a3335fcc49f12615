//! Shelfcal
//!
//! Date and date-range picker engine for the library catalog, with a small
//! REST JSON host that keeps calendar widgets server-side for the
//! server-rendered frontend.

use std::sync::Arc;

pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = services::Services::new(&config);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
