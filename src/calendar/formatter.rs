//! Locale-aware date formatting
//!
//! Month and weekday names come from chrono's localized strftime tables;
//! the engine only decides which pattern each piece of text uses.

use chrono::{Locale, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::date::DateValue;

/// Length of the weekday names rendered above the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayFormat {
    #[default]
    Narrow,
    Short,
    Long,
}

/// Regions whose weeks start on Sunday (CLDR `firstDay`).
const SUNDAY_FIRST_REGIONS: &[&str] = &[
    "AG", "AS", "BD", "BR", "BS", "BT", "BW", "BZ", "CA", "CO", "DM", "DO", "ET", "GT", "GU",
    "HK", "HN", "ID", "IL", "IN", "JM", "JP", "KE", "KH", "KR", "LA", "MH", "MM", "MO", "MT",
    "MX", "MZ", "NI", "NP", "PA", "PE", "PH", "PK", "PR", "PT", "PY", "SA", "SG", "SV", "TH",
    "TT", "TW", "UM", "US", "VE", "VI", "WS", "YE", "ZA", "ZW",
];

/// Regions whose weeks start on Saturday.
const SATURDAY_FIRST_REGIONS: &[&str] = &[
    "AE", "AF", "BH", "DJ", "DZ", "EG", "IQ", "IR", "JO", "KW", "LY", "OM", "QA", "SD", "SY",
];

/// Split a BCP 47 (`en-US`) or POSIX (`en_US`) tag into language and region.
fn split_locale(locale: &str) -> (String, Option<String>) {
    let mut parts = locale.split(['-', '_']);
    let language = parts.next().unwrap_or_default().to_ascii_lowercase();
    let region = parts
        .find(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_alphabetic()))
        .map(str::to_ascii_uppercase);
    (language, region)
}

/// Region assumed for a bare language tag.
fn likely_region(language: &str) -> &'static str {
    match language {
        "en" => "US",
        "ja" => "JP",
        "ko" => "KR",
        "zh" => "CN",
        "pt" => "BR",
        "he" => "IL",
        "hi" => "IN",
        "ar" => "EG",
        "fa" => "IR",
        "sv" => "SE",
        "da" => "DK",
        "nb" | "no" => "NO",
        "cs" => "CZ",
        "uk" => "UA",
        "el" => "GR",
        _ => "",
    }
}

/// First day of the week for a locale, 0 = Sunday.
pub fn locale_week_start(locale: &str) -> u32 {
    let (language, region) = split_locale(locale);
    let region = region.unwrap_or_else(|| likely_region(&language).to_string());
    if SUNDAY_FIRST_REGIONS.contains(&region.as_str()) {
        0
    } else if SATURDAY_FIRST_REGIONS.contains(&region.as_str()) {
        6
    } else {
        1
    }
}

/// Resolve a locale tag to chrono's table.
fn resolve_locale(locale: &str) -> Option<Locale> {
    let (language, region) = split_locale(locale);
    let candidates = [
        region.as_ref().map(|r| format!("{language}_{r}")),
        Some(format!("{language}_{}", likely_region(&language))),
        Some(format!("{language}_{}", language.to_ascii_uppercase())),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|tag| Locale::try_from(tag.as_str()).ok())
}

/// chrono table for `locale` and whether English patterns apply. Unknown
/// locales render as `en_US`.
fn resolve_patterns(locale: &str) -> (Locale, bool) {
    match resolve_locale(locale) {
        Some(resolved) => (resolved, split_locale(locale).0 == "en"),
        None => (Locale::en_US, true),
    }
}

/// Formatter bound to a locale that can be swapped at runtime.
#[derive(Debug, Clone)]
pub struct Formatter {
    locale: String,
    resolved: Locale,
    english: bool,
}

impl Formatter {
    pub fn new(locale: &str) -> Self {
        let (resolved, english) = resolve_patterns(locale);
        Self {
            locale: locale.to_string(),
            resolved,
            english,
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: &str) {
        if self.locale == locale {
            return;
        }
        self.locale = locale.to_string();
        (self.resolved, self.english) = resolve_patterns(locale);
    }

    /// Render with a strftime pattern. Zoned values render in their own
    /// offset; everything else as local wall-clock time.
    pub fn custom(&self, date: &DateValue, pattern: &str) -> String {
        match date {
            DateValue::Zoned(z) => z.format_localized(pattern, self.resolved).to_string(),
            _ => {
                let local = date.date().and_time(date.time().unwrap_or(NaiveTime::MIN));
                Utc.from_utc_datetime(&local)
                    .format_localized(pattern, self.resolved)
                    .to_string()
            }
        }
    }

    pub fn full_month(&self, date: &DateValue) -> String {
        self.custom(date, "%B")
    }

    pub fn full_year(&self, date: &DateValue) -> String {
        self.custom(date, "%Y")
    }

    pub fn full_month_and_year(&self, date: &DateValue) -> String {
        self.custom(date, "%B %Y")
    }

    pub fn day_of_week(&self, date: &DateValue, format: WeekdayFormat) -> String {
        match format {
            WeekdayFormat::Long => self.custom(date, "%A"),
            WeekdayFormat::Short => self.custom(date, "%a"),
            WeekdayFormat::Narrow => self
                .custom(date, "%A")
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default(),
        }
    }

    /// Long date, e.g. "March 5, 2024", optionally followed by the time.
    pub fn selected_date(&self, date: &DateValue, include_time: bool) -> String {
        let day = if self.english { "%B %-d, %Y" } else { "%-d %B %Y" };
        if !(include_time && date.has_time()) {
            return self.custom(date, day);
        }
        let time = match (self.english, date) {
            (true, DateValue::Zoned(_)) => "%-I:%M:%S %p UTC%:z",
            (true, _) => "%-I:%M:%S %p",
            (false, DateValue::Zoned(_)) => "%H:%M:%S UTC%:z",
            (false, _) => "%H:%M:%S",
        };
        self.custom(date, &format!("{day} {time}"))
    }

    /// Accessible label of a day cell, e.g. "Tuesday, March 5, 2024".
    pub fn cell_label(&self, date: &DateValue) -> String {
        if self.english {
            self.custom(date, "%A, %B %-d, %Y")
        } else {
            self.custom(date, "%A %-d %B %Y")
        }
    }
}
