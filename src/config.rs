//! Configuration management for the shelfcal server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::calendar::{CalendarOptions, WeekdayFormat};

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Options applied to every calendar a request does not override.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalendarDefaults {
    pub locale: String,
    /// 0 = Sunday; unset follows the locale
    pub week_starts_on: Option<u8>,
    pub fixed_weeks: bool,
    pub number_of_months: u32,
    pub paged_navigation: bool,
    pub weekday_format: WeekdayFormat,
    pub prevent_deselect: bool,
    pub disable_days_outside_month: bool,
    pub calendar_label: String,
    /// Live calendars kept in memory at once
    pub max_sessions: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub calendar: CalendarDefaults,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SHELFCAL_SERVER__PORT=9000, SHELFCAL_CALENDAR__LOCALE=fr-FR
            .add_source(
                Environment::with_prefix("SHELFCAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl CalendarDefaults {
    /// Base options for a new calendar.
    pub fn options(&self) -> CalendarOptions {
        CalendarOptions {
            week_starts_on: self.week_starts_on,
            locale: self.locale.clone(),
            fixed_weeks: self.fixed_weeks,
            number_of_months: self.number_of_months,
            paged_navigation: self.paged_navigation,
            weekday_format: self.weekday_format,
            prevent_deselect: self.prevent_deselect,
            disable_days_outside_month: self.disable_days_outside_month,
            calendar_label: self.calendar_label.clone(),
            ..CalendarOptions::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            calendar: CalendarDefaults::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CalendarDefaults {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            week_starts_on: None,
            fixed_weeks: false,
            number_of_months: 1,
            paged_navigation: false,
            weekday_format: WeekdayFormat::Narrow,
            prevent_deselect: false,
            disable_days_outside_month: true,
            calendar_label: "Event".to_string(),
            max_sessions: 1024,
        }
    }
}
