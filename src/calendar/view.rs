//! Derived view data handed to the rendering layer

use serde::Serialize;
use utoipa::ToSchema;

use super::announcer::Announcement;
use super::date::DateKind;

/// Everything the host needs to render one day cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DayCell {
    /// Parseable date string, same variant as the calendar's values
    pub value: String,
    #[serde(rename = "type")]
    pub kind: DateKind,
    pub day: u32,
    /// Accessible label, e.g. "Tuesday, March 5, 2024"
    pub label: String,
    pub disabled: bool,
    pub unavailable: bool,
    pub today: bool,
    pub outside_month: bool,
    pub outside_visible_months: bool,
    pub focused: bool,
    pub selected: bool,
    pub selection_start: bool,
    pub selection_end: bool,
    pub highlighted: bool,
    /// 0 for the focused cell, -1 for other reachable cells, absent when disabled
    pub tab_index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthView {
    /// First day of the month
    pub value: String,
    pub heading: String,
    pub weeks: Vec<Vec<DayCell>>,
}

/// Snapshot of a calendar widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CalendarView {
    pub months: Vec<MonthView>,
    pub weekdays: Vec<String>,
    pub heading: String,
    pub full_label: String,
    pub placeholder: String,
    pub invalid: bool,
    pub disabled: bool,
    pub readonly: bool,
    pub next_disabled: bool,
    pub prev_disabled: bool,
    /// Range start (range calendars)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Range end (range calendars)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Selected dates (single/multiple calendars)
    pub values: Vec<String>,
    pub announcement: Option<Announcement>,
}
