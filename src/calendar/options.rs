//! Host-supplied calendar options

use std::fmt;
use std::sync::Arc;

use super::date::DateValue;
use super::formatter::WeekdayFormat;
use super::month::MonthOptions;

/// Date predicate supplied by the host.
pub type DateMatcher = Arc<dyn Fn(&DateValue) -> bool + Send + Sync>;

/// Matcher that never matches.
pub fn never() -> DateMatcher {
    Arc::new(|_| false)
}

/// Inputs shared by both calendar variants. Each field may change
/// independently over the widget's lifetime.
#[derive(Clone)]
pub struct CalendarOptions {
    pub min_value: Option<DateValue>,
    pub max_value: Option<DateValue>,
    pub is_date_disabled: DateMatcher,
    pub is_date_unavailable: DateMatcher,
    /// Disables the whole calendar
    pub disabled: bool,
    pub readonly: bool,
    pub prevent_deselect: bool,
    /// 0 = Sunday; `None` follows the locale
    pub week_starts_on: Option<u8>,
    pub locale: String,
    /// Always render six weeks per month
    pub fixed_weeks: bool,
    pub number_of_months: u32,
    /// Next/previous jump a whole page of months instead of one month
    pub paged_navigation: bool,
    pub weekday_format: WeekdayFormat,
    pub disable_days_outside_month: bool,
    pub calendar_label: String,
}

impl CalendarOptions {
    pub fn month_options(&self) -> MonthOptions {
        MonthOptions {
            week_starts_on: self.week_starts_on,
            locale: self.locale.clone(),
            fixed_weeks: self.fixed_weeks,
            number_of_months: self.number_of_months.max(1),
        }
    }
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            min_value: None,
            max_value: None,
            is_date_disabled: never(),
            is_date_unavailable: never(),
            disabled: false,
            readonly: false,
            prevent_deselect: false,
            week_starts_on: None,
            locale: "en-US".to_string(),
            fixed_weeks: false,
            number_of_months: 1,
            paged_navigation: false,
            weekday_format: WeekdayFormat::Narrow,
            disable_days_outside_month: true,
            calendar_label: "Event".to_string(),
        }
    }
}

impl fmt::Debug for CalendarOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarOptions")
            .field("min_value", &self.min_value)
            .field("max_value", &self.max_value)
            .field("disabled", &self.disabled)
            .field("readonly", &self.readonly)
            .field("prevent_deselect", &self.prevent_deselect)
            .field("week_starts_on", &self.week_starts_on)
            .field("locale", &self.locale)
            .field("fixed_weeks", &self.fixed_weeks)
            .field("number_of_months", &self.number_of_months)
            .field("paged_navigation", &self.paged_navigation)
            .field("weekday_format", &self.weekday_format)
            .field("disable_days_outside_month", &self.disable_days_outside_month)
            .finish_non_exhaustive()
    }
}
