//! Calendar date values
//!
//! A [`DateValue`] is a plain date, a local date-time, or a date-time pinned
//! to a UTC offset. The variant is picked once, where the value enters the
//! engine, and every operation preserves it: adding a month to a date-time
//! yields a date-time, parsing a cell string against a zoned reference
//! yields a zoned value, and so on.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use super::CalendarError;

/// Discriminant of a [`DateValue`], as exposed on rendered cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateKind {
    Date,
    DateTime,
    ZonedDateTime,
}

impl DateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DateKind::Date => "date",
            DateKind::DateTime => "datetime",
            DateKind::ZonedDateTime => "zoneddatetime",
        }
    }
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateKind {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(DateKind::Date),
            "datetime" => Ok(DateKind::DateTime),
            "zoneddatetime" => Ok(DateKind::ZonedDateTime),
            other => Err(CalendarError::UnknownDateKind(other.to_string())),
        }
    }
}

/// Calendar arithmetic amount. Months and years are applied first and clamp
/// the day to the target month's length; days and weeks follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateDuration {
    pub years: i32,
    pub months: i32,
    pub weeks: i32,
    pub days: i64,
}

impl DateDuration {
    pub fn days(days: i64) -> Self {
        Self { days, ..Self::default() }
    }

    pub fn weeks(weeks: i32) -> Self {
        Self { weeks, ..Self::default() }
    }

    pub fn months(months: i32) -> Self {
        Self { months, ..Self::default() }
    }

    pub fn years(years: i32) -> Self {
        Self { years, ..Self::default() }
    }

    fn negate(self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            weeks: -self.weeks,
            days: -self.days,
        }
    }
}

/// Immutable, calendar-aware point in time with day granularity or finer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateValue {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl DateValue {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DateValue::Date)
    }

    /// Today's date in the local time zone.
    pub fn today() -> Self {
        DateValue::Date(chrono::Local::now().date_naive())
    }

    pub fn kind(&self) -> DateKind {
        match self {
            DateValue::Date(_) => DateKind::Date,
            DateValue::DateTime(_) => DateKind::DateTime,
            DateValue::Zoned(_) => DateKind::ZonedDateTime,
        }
    }

    /// Calendar-date component, in the value's own offset for zoned values.
    pub fn date(&self) -> NaiveDate {
        match self {
            DateValue::Date(d) => *d,
            DateValue::DateTime(dt) => dt.date(),
            DateValue::Zoned(z) => z.date_naive(),
        }
    }

    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            DateValue::Date(_) => None,
            DateValue::DateTime(dt) => Some(dt.time()),
            DateValue::Zoned(z) => Some(z.time()),
        }
    }

    pub fn has_time(&self) -> bool {
        self.time().is_some()
    }

    pub fn year(&self) -> i32 {
        self.date().year()
    }

    pub fn month(&self) -> u32 {
        self.date().month()
    }

    pub fn day(&self) -> u32 {
        self.date().day()
    }

    /// Day of week, 0 = Sunday through 6 = Saturday.
    pub fn day_of_week(&self) -> u32 {
        self.date().weekday().num_days_from_sunday()
    }

    fn naive_local(&self) -> NaiveDateTime {
        match self {
            DateValue::Date(d) => d.and_time(NaiveTime::MIN),
            DateValue::DateTime(dt) => *dt,
            DateValue::Zoned(z) => z.naive_local(),
        }
    }

    /// Three-way comparison. Two zoned values compare as instants; anything
    /// else compares on local wall-clock time, a plain date sitting at
    /// midnight.
    pub fn compare(&self, other: &DateValue) -> Ordering {
        match (self, other) {
            (DateValue::Zoned(a), DateValue::Zoned(b)) => a.cmp(b),
            _ => self.naive_local().cmp(&other.naive_local()),
        }
    }

    pub fn is_before(&self, reference: &DateValue) -> bool {
        self.compare(reference) == Ordering::Less
    }

    pub fn is_after(&self, reference: &DateValue) -> bool {
        self.compare(reference) == Ordering::Greater
    }

    pub fn is_before_or_same(&self, reference: &DateValue) -> bool {
        self.compare(reference) != Ordering::Greater
    }

    pub fn is_after_or_same(&self, reference: &DateValue) -> bool {
        self.compare(reference) != Ordering::Less
    }

    /// Inclusive on both ends.
    pub fn is_between_inclusive(&self, start: &DateValue, end: &DateValue) -> bool {
        self.is_after_or_same(start) && self.is_before_or_same(end)
    }

    /// Same calendar day, whatever the time of day.
    pub fn is_same_day(&self, other: &DateValue) -> bool {
        self.date() == other.date()
    }

    pub fn is_same_month(&self, other: &DateValue) -> bool {
        let (a, b) = (self.date(), other.date());
        a.year() == b.year() && a.month() == b.month()
    }

    /// Apply `f` to the local wall-clock time and rebuild the same variant.
    fn map_local<F>(self, f: F) -> Option<Self>
    where
        F: FnOnce(NaiveDateTime) -> Option<NaiveDateTime>,
    {
        match self {
            DateValue::Date(d) => f(d.and_time(NaiveTime::MIN)).map(|dt| DateValue::Date(dt.date())),
            DateValue::DateTime(dt) => f(dt).map(DateValue::DateTime),
            DateValue::Zoned(z) => {
                let offset = *z.offset();
                f(z.naive_local())
                    .and_then(|dt| dt.and_local_timezone(offset).single())
                    .map(DateValue::Zoned)
            }
        }
    }

    pub fn checked_add(self, duration: DateDuration) -> Option<Self> {
        self.map_local(|dt| {
            let months = i64::from(duration.years) * 12 + i64::from(duration.months);
            let dt = if months >= 0 {
                dt.checked_add_months(Months::new(u32::try_from(months).ok()?))?
            } else {
                dt.checked_sub_months(Months::new(u32::try_from(-months).ok()?))?
            };
            let days = duration.days + i64::from(duration.weeks) * 7;
            if days >= 0 {
                dt.checked_add_days(Days::new(days.unsigned_abs()))
            } else {
                dt.checked_sub_days(Days::new(days.unsigned_abs()))
            }
        })
    }

    /// Results outside chrono's representable range leave the value as is.
    pub fn add(self, duration: DateDuration) -> Self {
        self.checked_add(duration).unwrap_or(self)
    }

    pub fn subtract(self, duration: DateDuration) -> Self {
        self.add(duration.negate())
    }

    /// Replace the year, clamping the day (29 February becomes the 28th).
    pub fn with_year(self, year: i32) -> Self {
        let current = self.date();
        self.with_date_parts(year, current.month(), current.day())
    }

    /// Replace the month (clamped to 1..=12), clamping the day to its length.
    pub fn with_month(self, month: u32) -> Self {
        let current = self.date();
        self.with_date_parts(current.year(), month.clamp(1, 12), current.day())
    }

    /// Replace the day, clamped to the month: `with_day(35)` is the last day.
    pub fn with_day(self, day: u32) -> Self {
        let current = self.date();
        self.with_date_parts(current.year(), current.month(), day)
    }

    fn with_date_parts(self, year: i32, month: u32, day: u32) -> Self {
        let day = day.clamp(1, days_in_month(year, month));
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            return self;
        };
        self.map_local(|dt| Some(date.and_time(dt.time()))).unwrap_or(self)
    }

    /// Replace the time of day. Plain dates have none and are returned as is.
    pub fn with_time(self, time: NaiveTime) -> Self {
        if !self.has_time() {
            return self;
        }
        self.map_local(|dt| Some(dt.date().and_time(time))).unwrap_or(self)
    }

    /// Keep the time of day of `previous` when both values carry one.
    pub fn with_previous_time(self, previous: Option<&DateValue>) -> Self {
        match previous.and_then(DateValue::time) {
            Some(time) if self.has_time() => self.with_time(time),
            _ => self,
        }
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    pub fn start_of_month(self) -> Self {
        self.with_day(1)
    }

    pub fn end_of_month(self) -> Self {
        let last = self.days_in_month();
        self.with_day(last)
    }

    /// Nearest day at or before `self` falling on `first_day_of_week`
    /// (0 = Sunday).
    pub fn last_first_day_of_week(self, first_day_of_week: u32) -> Self {
        let day = self.day_of_week();
        let first = first_day_of_week % 7;
        if first > day {
            return self.subtract(DateDuration::days(i64::from(day + 7 - first)));
        }
        if first == day {
            return self;
        }
        self.subtract(DateDuration::days(i64::from(day - first)))
    }

    /// Nearest day at or after `self` closing the week that starts on
    /// `first_day_of_week`.
    pub fn next_last_day_of_week(self, first_day_of_week: u32) -> Self {
        let day = self.day_of_week();
        let first = first_day_of_week % 7;
        let last_day_of_week = if first == 0 { 6 } else { first - 1 };
        if day == last_day_of_week {
            return self;
        }
        if day > last_day_of_week {
            return self.add(DateDuration::days(i64::from(7 - day + last_day_of_week)));
        }
        self.add(DateDuration::days(i64::from(last_day_of_week - day)))
    }

    /// Parse `input` into the same variant as `reference`.
    pub fn parse_as(input: &str, reference: &DateValue) -> Result<Self, CalendarError> {
        Self::parse_any(input, reference.kind())
    }

    /// Parse `input` as the given variant.
    pub fn parse_any(input: &str, kind: DateKind) -> Result<Self, CalendarError> {
        let invalid = || CalendarError::InvalidDate {
            input: input.to_string(),
            kind,
        };
        match kind {
            DateKind::Date => input.parse::<NaiveDate>().map(DateValue::Date).map_err(|_| invalid()),
            DateKind::DateTime => input
                .parse::<NaiveDateTime>()
                .map(DateValue::DateTime)
                .map_err(|_| invalid()),
            DateKind::ZonedDateTime => {
                // "2024-03-05T10:00:00+01:00[Europe/Paris]" keeps only the offset
                let rfc3339 = input.split_once('[').map_or(input, |(head, _)| head);
                DateTime::parse_from_rfc3339(rfc3339)
                    .map(DateValue::Zoned)
                    .map_err(|_| invalid())
            }
        }
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DateValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            DateValue::Zoned(z) => f.write_str(&z.to_rfc3339()),
        }
    }
}

/// Infers the variant from the shape of the string: an offset or zone
/// suffix makes it zoned, a `T` separator a date-time, otherwise a date.
impl FromStr for DateValue {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((_, time)) = s.split_once('T') else {
            return Self::parse_any(s, DateKind::Date);
        };
        let zoned = s.contains('[') || time.ends_with('Z') || time.contains(['+', '-']);
        if zoned {
            Self::parse_any(s, DateKind::ZonedDateTime)
        } else {
            Self::parse_any(s, DateKind::DateTime)
        }
    }
}

impl Serialize for DateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

/// Days strictly between `start` and `end`.
pub fn days_between(start: &DateValue, end: &DateValue) -> Vec<DateValue> {
    let mut days = Vec::new();
    let mut current = start.add(DateDuration::days(1));
    while current.is_before(end) {
        days.push(current);
        current = current.add(DateDuration::days(1));
    }
    days
}

/// True when no day strictly between `start` and `end` is unavailable or
/// disabled.
pub fn all_days_between_valid<U, D>(
    start: &DateValue,
    end: &DateValue,
    is_unavailable: U,
    is_disabled: D,
) -> bool
where
    U: Fn(&DateValue) -> bool,
    D: Fn(&DateValue) -> bool,
{
    let mut current = start.add(DateDuration::days(1));
    while current.is_before(end) && !current.is_same_day(end) {
        if is_unavailable(&current) || is_disabled(&current) {
            return false;
        }
        current = current.add(DateDuration::days(1));
    }
    true
}
