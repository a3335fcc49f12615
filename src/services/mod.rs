//! Business logic services

pub mod calendars;

use crate::config::AppConfig;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub calendars: calendars::CalendarService,
}

impl Services {
    /// Create all services from the loaded configuration
    pub fn new(config: &AppConfig) -> Self {
        Self {
            calendars: calendars::CalendarService::new(config.calendar.clone()),
        }
    }
}
