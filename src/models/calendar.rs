//! Calendar request and response types

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::calendar::{
    BlockedRange, CalendarOptions, CalendarValue, CalendarView, DateMatcher, DateValue, SelectionMode,
    Transition, WeekdayFormat,
};
use crate::config::CalendarDefaults;

/// Which selection model a stored calendar runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    Range,
    Single,
    Multiple,
}

/// Options shared by range and single/multiple calendars. Anything left
/// out falls back to the server's calendar defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CalendarSettings {
    #[schema(value_type = Option<String>, example = "2024-03-01")]
    pub min_value: Option<DateValue>,
    #[schema(value_type = Option<String>, example = "2024-12-31")]
    pub max_value: Option<DateValue>,
    /// Individual days that cannot be selected or focused
    #[schema(value_type = Vec<String>)]
    pub disabled_dates: Vec<DateValue>,
    /// Individual days shown but not selectable
    #[schema(value_type = Vec<String>)]
    pub unavailable_dates: Vec<DateValue>,
    /// Saturdays and Sundays are unavailable
    pub weekends_unavailable: bool,
    pub disabled: Option<bool>,
    pub readonly: Option<bool>,
    pub prevent_deselect: Option<bool>,
    /// 0 = Sunday ... 6 = Saturday
    #[validate(range(max = 6, message = "week_starts_on must be between 0 and 6"))]
    pub week_starts_on: Option<u8>,
    #[validate(length(min = 2, max = 35, message = "Invalid locale tag"))]
    pub locale: Option<String>,
    pub fixed_weeks: Option<bool>,
    #[validate(range(min = 1, max = 12, message = "number_of_months must be between 1 and 12"))]
    pub number_of_months: Option<u32>,
    pub paged_navigation: Option<bool>,
    pub weekday_format: Option<WeekdayFormat>,
    pub disable_days_outside_month: Option<bool>,
    #[validate(length(max = 120))]
    pub calendar_label: Option<String>,
}

fn date_list_matcher(dates: Vec<DateValue>) -> DateMatcher {
    Arc::new(move |date: &DateValue| dates.iter().any(|d| d.is_same_day(date)))
}

impl CalendarSettings {
    /// Merge the request over the server defaults.
    pub fn into_options(self, defaults: &CalendarDefaults) -> CalendarOptions {
        let base = defaults.options();
        let weekends_unavailable = self.weekends_unavailable;
        let unavailable = self.unavailable_dates;
        let is_date_unavailable: DateMatcher = Arc::new(move |date: &DateValue| {
            (weekends_unavailable && matches!(date.day_of_week(), 0 | 6))
                || unavailable.iter().any(|d| d.is_same_day(date))
        });

        CalendarOptions {
            min_value: self.min_value,
            max_value: self.max_value,
            is_date_disabled: date_list_matcher(self.disabled_dates),
            is_date_unavailable,
            disabled: self.disabled.unwrap_or(base.disabled),
            readonly: self.readonly.unwrap_or(base.readonly),
            prevent_deselect: self.prevent_deselect.unwrap_or(base.prevent_deselect),
            week_starts_on: self.week_starts_on.or(base.week_starts_on),
            locale: self.locale.unwrap_or(base.locale),
            fixed_weeks: self.fixed_weeks.unwrap_or(base.fixed_weeks),
            number_of_months: self.number_of_months.unwrap_or(base.number_of_months),
            paged_navigation: self.paged_navigation.unwrap_or(base.paged_navigation),
            weekday_format: self.weekday_format.unwrap_or(base.weekday_format),
            disable_days_outside_month: self
                .disable_days_outside_month
                .unwrap_or(base.disable_days_outside_month),
            calendar_label: self.calendar_label.unwrap_or(base.calendar_label),
        }
    }
}

/// Create a range calendar
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateRangeCalendar {
    /// Date the grid opens on; today when absent
    #[schema(value_type = Option<String>, example = "2024-03-01")]
    pub placeholder: Option<DateValue>,
    /// Pin "today" for rendering
    #[schema(value_type = Option<String>)]
    pub today: Option<DateValue>,
    #[validate(nested)]
    pub options: CalendarSettings,
    /// Existing reservations
    pub ranges: Vec<BlockedRange>,
    /// Report clicks inside a reservation instead of selecting
    pub learn_more: bool,
    pub value: Option<RangeValueRequest>,
}

/// Create a single or multiple date calendar
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCalendar {
    #[serde(default)]
    pub mode: SelectionMode,
    #[schema(value_type = Option<String>, example = "2024-03-01")]
    pub placeholder: Option<DateValue>,
    #[schema(value_type = Option<String>)]
    pub today: Option<DateValue>,
    #[serde(default)]
    #[validate(nested)]
    pub options: CalendarSettings,
    /// `null`, a date, or a list of dates depending on `mode`
    #[schema(value_type = Option<Object>)]
    pub value: Option<CalendarValue>,
}

/// A day cell, identified by its string value
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DateRequest {
    #[schema(value_type = String, example = "2024-03-05")]
    pub date: DateValue,
}

/// A key press on a day cell
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct KeyDownRequest {
    /// DOM `KeyboardEvent.key`, e.g. `ArrowLeft`, `Enter`, ` `
    #[validate(length(min = 1, max = 32))]
    pub key: String,
    /// String value of the focused cell
    #[validate(length(min = 1, max = 64))]
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NavigateAction {
    NextPage,
    PrevPage,
    NextYear,
    PrevYear,
    SetYear,
    SetMonth,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NavigateRequest {
    pub action: NavigateAction,
    /// Year for `set_year`, month (1-12) for `set_month`
    pub value: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RangeValueRequest {
    #[schema(value_type = Option<String>)]
    pub start: Option<DateValue>,
    #[schema(value_type = Option<String>)]
    pub end: Option<DateValue>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CalendarValueRequest {
    /// Absent or `null` clears the selection
    #[schema(value_type = Option<Object>)]
    pub value: Option<CalendarValue>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarCreated {
    pub id: Uuid,
    pub kind: CalendarKind,
    pub view: CalendarView,
}

/// What an interaction did, with the view after it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransitionResponse {
    #[schema(value_type = Object)]
    pub transition: Transition,
    pub view: CalendarView,
}
