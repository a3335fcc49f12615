//! Range selection around existing reservations
//!
//! A [`RangeCalendar`] walks through three states: empty, start only and
//! complete. Every activation is checked against guards in a fixed order
//! before the default advance runs: readonly, disabled or unavailable,
//! learn-more, reservation crossing, deselect, two-step confirm and
//! complete-range deselect.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::announcer::Politeness;
use super::date::{all_days_between_valid, DateDuration, DateValue};
use super::navigation::CalendarCore;
use super::options::CalendarOptions;
use super::view::CalendarView;
use super::{CalendarSelection, Transition};

/// An existing reservation, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BlockedRange {
    #[schema(value_type = String, example = "2024-03-10")]
    pub start: DateValue,
    #[schema(value_type = String, example = "2024-03-15")]
    pub end: DateValue,
}

impl BlockedRange {
    pub fn new(start: DateValue, end: DateValue) -> Self {
        if end.is_before(&start) {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    pub fn contains(&self, date: &DateValue) -> bool {
        date.is_between_inclusive(&self.start, &self.end)
    }
}

/// Committed selection as mirrored to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeValue {
    pub start: Option<DateValue>,
    pub end: Option<DateValue>,
}

impl RangeValue {
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

pub type RangeSelectCallback = Arc<dyn Fn(&RangeValue) + Send + Sync>;
pub type LearnMoreCallback = Arc<dyn Fn(&DateValue, usize) + Send + Sync>;

pub struct RangeCalendar {
    core: CalendarCore,
    start: Option<DateValue>,
    end: Option<DateValue>,
    focused: Option<DateValue>,
    last_pressed: Option<DateValue>,
    ranges: Vec<BlockedRange>,
    on_range_select: Option<RangeSelectCallback>,
    learn_more: Option<LearnMoreCallback>,
}

impl RangeCalendar {
    pub fn new(options: CalendarOptions, placeholder: DateValue) -> Self {
        Self {
            core: CalendarCore::new(options, placeholder),
            start: None,
            end: None,
            focused: None,
            last_pressed: None,
            ranges: Vec::new(),
            on_range_select: None,
            learn_more: None,
        }
    }

    pub fn with_ranges(mut self, ranges: Vec<BlockedRange>) -> Self {
        self.ranges = ranges;
        self
    }

    /// Called every time both endpoints get committed by the user.
    pub fn on_range_select<F>(mut self, callback: F) -> Self
    where
        F: Fn(&RangeValue) + Send + Sync + 'static,
    {
        self.on_range_select = Some(Arc::new(callback));
        self
    }

    /// Turns on learn-more mode: activating a reserved day reports the
    /// reservation instead of selecting.
    pub fn on_learn_more<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DateValue, usize) + Send + Sync + 'static,
    {
        self.learn_more = Some(Arc::new(callback));
        self
    }

    pub fn ranges(&self) -> &[BlockedRange] {
        &self.ranges
    }

    pub fn set_ranges(&mut self, ranges: Vec<BlockedRange>) {
        self.ranges = ranges;
    }

    pub fn start(&self) -> Option<DateValue> {
        self.start
    }

    pub fn end(&self) -> Option<DateValue> {
        self.end
    }

    pub fn focused(&self) -> Option<DateValue> {
        self.focused
    }

    pub fn value(&self) -> RangeValue {
        RangeValue {
            start: self.start,
            end: self.end,
        }
    }

    /// Adopt a value set from outside. A reversed pair is swapped, an
    /// end-only value becomes the start, and the placeholder follows the
    /// start.
    pub fn set_value(&mut self, value: RangeValue) {
        let (start, end) = match (value.start, value.end) {
            (Some(start), Some(end)) if end.is_before(&start) => (Some(end), Some(start)),
            (Some(start), end) => (Some(start), end),
            (None, Some(end)) => (Some(end), None),
            (None, None) => (None, None),
        };
        self.start = start;
        self.end = end;
        self.last_pressed = None;
        if let Some(start) = start {
            self.core.set_placeholder(start);
        }
    }

    fn is_date_invalid(&self, date: &DateValue) -> bool {
        self.core.is_date_unavailable(date) || self.core.is_date_disabled(date)
    }

    /// Provisional range between the start and the focused day, ordered
    /// low to high. Absent once the range is complete, or when a day in
    /// between cannot be selected.
    pub fn highlighted_range(&self) -> Option<(DateValue, DateValue)> {
        if self.end.is_some() {
            return None;
        }
        let (start, focused) = (self.start?, self.focused?);
        let (low, high) = if start.is_before(&focused) { (start, focused) } else { (focused, start) };
        if low.is_same_day(&high) || low.add(DateDuration::days(1)).is_same_day(&high) {
            return Some((low, high));
        }
        all_days_between_valid(
            &low,
            &high,
            |date| self.core.is_date_unavailable(date),
            |date| self.core.is_date_disabled(date),
        )
        .then_some((low, high))
    }

    pub fn is_selection_start(&self, date: &DateValue) -> bool {
        self.ranges.iter().any(|range| date.is_same_day(&range.start))
            || self.start.is_some_and(|start| date.is_same_day(&start))
    }

    pub fn is_selection_end(&self, date: &DateValue) -> bool {
        self.ranges.iter().any(|range| date.is_same_day(&range.end))
            || self.end.is_some_and(|end| date.is_same_day(&end))
    }

    /// Would a range from the current endpoint to `date` straddle a
    /// reservation. Compared on calendar days.
    fn crosses_reservation(&self, date: &DateValue) -> bool {
        let Some(anchor) = self.start.or(self.end) else {
            return false;
        };
        let (anchor, day) = (anchor.date(), date.date());
        self.ranges.iter().any(|range| {
            let (blocked_start, blocked_end) = (range.start.date(), range.end.date());
            (anchor <= blocked_start && day > blocked_start) || (anchor >= blocked_end && day < blocked_end)
        })
    }

    fn announce_date(&mut self, date: &DateValue) {
        let message = format!("Selected Date: {}", self.core.formatter().selected_date(date, false));
        self.core.announcer_mut().announce(message, Politeness::Polite, None);
    }

    fn announce_range(&mut self, start: &DateValue, end: &DateValue) {
        let formatter = self.core.formatter();
        let message = format!(
            "Selected Dates: {} to {}",
            formatter.selected_date(start, false),
            formatter.selected_date(end, false)
        );
        self.core.announcer_mut().announce(message, Politeness::Polite, None);
    }

    fn announce_empty(&mut self) {
        self.core
            .announcer_mut()
            .announce("Selected date is now empty.", Politeness::Polite, None);
    }

    fn begin(&mut self, date: DateValue) -> Transition {
        self.start = Some(date);
        self.end = None;
        self.announce_date(&date);
        Transition::Started { date }
    }

    fn clear_at(&mut self, date: DateValue) -> Transition {
        self.start = None;
        self.end = None;
        self.core.set_placeholder(date);
        self.announce_empty();
        Transition::Cleared { date }
    }

    fn complete(&mut self, start: DateValue, date: DateValue) -> Transition {
        let (start, end) = if date.is_before(&start) { (date, start) } else { (start, date) };
        self.start = Some(start);
        self.end = Some(end);
        self.announce_range(&start, &end);
        self.core.set_placeholder(start);
        tracing::debug!(%start, %end, "range selected");
        if let Some(callback) = self.on_range_select.clone() {
            callback(&self.value());
        }
        Transition::Completed { start, end }
    }
}

impl CalendarSelection for RangeCalendar {
    fn core(&self) -> &CalendarCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CalendarCore {
        &mut self.core
    }

    /// Reserved days count as selected, as do the committed endpoints and
    /// everything between them.
    fn is_selected(&self, date: &DateValue) -> bool {
        if self.ranges.iter().any(|range| range.contains(date)) {
            return true;
        }
        if self.start.is_some_and(|start| start.is_same_day(date)) || self.end.is_some_and(|end| end.is_same_day(date)) {
            return true;
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) => date.is_between_inclusive(&start, &end),
            _ => false,
        }
    }

    fn lead_selection(&self) -> Option<DateValue> {
        self.start
    }

    fn clear(&mut self) {
        self.start = None;
        self.end = None;
        self.last_pressed = None;
    }

    fn activate(&mut self, date: DateValue) -> Transition {
        let options = self.core.options();
        let (readonly, prevent_deselect) = (options.readonly, options.prevent_deselect);
        if readonly || self.is_date_invalid(&date) {
            return Transition::Ignored;
        }

        if let Some(learn_more) = self.learn_more.clone() {
            if let Some(range_index) = self.ranges.iter().position(|range| range.contains(&date)) {
                learn_more(&date, range_index);
                return Transition::LearnMore { date, range_index };
            }
        }

        if self.crosses_reservation(&date) {
            tracing::debug!(%date, "selection would cross a reservation, restarting");
            self.begin(date);
            return Transition::Redirected { date };
        }

        let previous_press = self.last_pressed.replace(date);
        match (self.start, self.end) {
            (Some(start), None) => {
                if start.is_same_day(&date) && !prevent_deselect {
                    return self.clear_at(date);
                }
                if self.focused.is_some() && self.highlighted_range().is_none() {
                    if previous_press.is_some_and(|pressed| pressed.is_same_day(&date)) {
                        return self.begin(date);
                    }
                    return Transition::AwaitingConfirm { date };
                }
                self.complete(start, date)
            }
            (Some(start), Some(end)) => {
                if (start.is_same_day(&date) || end.is_same_day(&date)) && !prevent_deselect {
                    return self.clear_at(date);
                }
                self.begin(date)
            }
            _ => self.begin(date),
        }
    }

    /// Only rendered, enabled cells take focus.
    fn focus(&mut self, date: DateValue) {
        if self.core.is_date_disabled(&date) || self.core.is_outside_visible_months(&date) {
            return;
        }
        self.focused = Some(date);
    }

    /// An endpoint that cannot be selected, or a reversed pair.
    fn is_invalid(&self) -> bool {
        if self.start.is_some_and(|start| self.is_date_invalid(&start)) {
            return true;
        }
        if self.end.is_some_and(|end| self.is_date_invalid(&end)) {
            return true;
        }
        matches!((self.start, self.end), (Some(start), Some(end)) if end.is_before(&start))
    }

    fn view(&self) -> CalendarView {
        let highlight = self.highlighted_range();
        let mut view = self.core.view(|date, cell| {
            cell.selected = self.is_selected(date);
            cell.selection_start = self.is_selection_start(date);
            cell.selection_end = self.is_selection_end(date);
            cell.highlighted = highlight.is_some_and(|(low, high)| date.is_between_inclusive(&low, &high));
        });
        view.invalid = self.is_invalid();
        view.start = self.start.map(|date| date.to_string());
        view.end = self.end.map(|date| date.to_string());
        view
    }
}

impl fmt::Debug for RangeCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeCalendar")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("focused", &self.focused)
            .field("placeholder", &self.core.placeholder())
            .field("ranges", &self.ranges)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::calendar::CalendarKey;

    fn date(y: i32, m: u32, d: u32) -> DateValue {
        DateValue::from_ymd(y, m, d).unwrap()
    }

    fn march(day: u32) -> DateValue {
        date(2024, 3, day)
    }

    fn calendar() -> RangeCalendar {
        RangeCalendar::new(CalendarOptions::default(), march(1))
    }

    fn blocked() -> RangeCalendar {
        calendar().with_ranges(vec![BlockedRange::new(march(10), march(15))])
    }

    fn announcement(calendar: &RangeCalendar) -> String {
        calendar.core().announcer().last().map(|a| a.message.clone()).unwrap_or_default()
    }

    #[test]
    fn test_redirect_past_reservation() {
        let mut calendar = blocked();
        assert_eq!(calendar.activate(march(5)), Transition::Started { date: march(5) });
        assert_eq!(calendar.activate(march(20)), Transition::Redirected { date: march(20) });
        assert_eq!(calendar.start(), Some(march(20)));
        assert_eq!(calendar.end(), None);
        assert_eq!(announcement(&calendar), "Selected Date: March 20, 2024");
    }

    #[test]
    fn test_redirect_backwards_past_reservation() {
        let mut calendar = blocked();
        calendar.activate(march(20));
        assert_eq!(calendar.activate(march(5)), Transition::Redirected { date: march(5) });
        assert_eq!(calendar.value(), RangeValue { start: Some(march(5)), end: None });
    }

    #[test]
    fn test_endpoints_adjacent_to_reservation() {
        // Day before the reservation to the reservation's first day: no crossing
        let mut calendar = blocked();
        calendar.activate(march(9));
        assert_eq!(calendar.activate(march(10)), Transition::Completed { start: march(9), end: march(10) });

        // Day after the reservation back to its last day: no crossing either
        let mut calendar = blocked();
        calendar.activate(march(16));
        assert_eq!(calendar.activate(march(15)), Transition::Completed { start: march(15), end: march(16) });

        // One further on each side does cross
        let mut calendar = blocked();
        calendar.activate(march(9));
        assert_eq!(calendar.activate(march(11)), Transition::Redirected { date: march(11) });

        let mut calendar = blocked();
        calendar.activate(march(16));
        assert_eq!(calendar.activate(march(14)), Transition::Redirected { date: march(14) });
    }

    #[test]
    fn test_endpoint_on_reservation_edge() {
        let mut calendar = blocked();
        calendar.set_value(RangeValue { start: Some(march(10)), end: None });
        assert_eq!(calendar.activate(march(12)), Transition::Redirected { date: march(12) });

        let mut calendar = blocked();
        calendar.set_value(RangeValue { start: Some(march(15)), end: None });
        assert_eq!(calendar.activate(march(11)), Transition::Redirected { date: march(11) });
    }

    #[test]
    fn test_double_activate_returns_to_empty() {
        let mut calendar = calendar();
        calendar.activate(march(5));
        assert_eq!(calendar.activate(march(5)), Transition::Cleared { date: march(5) });
        assert_eq!(calendar.value(), RangeValue::default());
        assert_eq!(announcement(&calendar), "Selected date is now empty.");
    }

    #[test]
    fn test_prevent_deselect_completes_single_day_range() {
        let mut calendar = RangeCalendar::new(
            CalendarOptions { prevent_deselect: true, ..CalendarOptions::default() },
            march(1),
        );
        calendar.activate(march(5));
        assert_eq!(calendar.activate(march(5)), Transition::Completed { start: march(5), end: march(5) });
    }

    #[test]
    fn test_learn_more_never_mutates_selection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let mut calendar = blocked().on_learn_more(move |d, index| {
            assert_eq!(*d, march(12));
            assert_eq!(index, 0);
            seen.fetch_add(1, Ordering::SeqCst);
        });
        calendar.activate(march(3));
        assert_eq!(
            calendar.activate(march(12)),
            Transition::LearnMore { date: march(12), range_index: 0 }
        );
        assert_eq!(calendar.value(), RangeValue { start: Some(march(3)), end: None });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_complete_swaps_and_notifies() {
        let selected = Arc::new(AtomicUsize::new(0));
        let seen = selected.clone();
        let mut calendar = calendar().on_range_select(move |value| {
            assert!(value.is_complete());
            seen.fetch_add(1, Ordering::SeqCst);
        });
        calendar.activate(march(8));
        assert_eq!(calendar.activate(march(5)), Transition::Completed { start: march(5), end: march(8) });
        assert_eq!(announcement(&calendar), "Selected Dates: March 5, 2024 to March 8, 2024");
        assert_eq!(selected.load(Ordering::SeqCst), 1);
        assert_eq!(calendar.core().placeholder(), march(5));
    }

    #[test]
    fn test_complete_range_reclick_clears_or_restarts() {
        let mut calendar = calendar();
        calendar.activate(march(5));
        calendar.activate(march(8));
        assert_eq!(calendar.activate(march(8)), Transition::Cleared { date: march(8) });
        assert_eq!(calendar.value(), RangeValue::default());

        calendar.activate(march(5));
        calendar.activate(march(8));
        assert_eq!(calendar.activate(march(20)), Transition::Started { date: march(20) });
        assert_eq!(calendar.value(), RangeValue { start: Some(march(20)), end: None });
    }

    #[test]
    fn test_disabled_unavailable_and_readonly_are_ignored() {
        let mut calendar = RangeCalendar::new(
            CalendarOptions {
                is_date_disabled: Arc::new(|d: &DateValue| d.day() == 4),
                is_date_unavailable: Arc::new(|d: &DateValue| d.day() == 6),
                min_value: Some(march(2)),
                ..CalendarOptions::default()
            },
            march(1),
        );
        assert!(calendar.activate(march(4)).is_ignored());
        assert!(calendar.activate(march(6)).is_ignored());
        assert!(calendar.activate(march(1)).is_ignored());
        assert!(calendar.core().announcer().last().is_none());

        calendar.core_mut().update_options(|o| o.readonly = true);
        assert!(calendar.activate(march(7)).is_ignored());
        assert_eq!(calendar.value(), RangeValue::default());
    }

    #[test]
    fn test_two_step_confirm_over_unavailable_days() {
        let mut calendar = RangeCalendar::new(
            CalendarOptions {
                is_date_unavailable: Arc::new(|d: &DateValue| d.day() == 7),
                ..CalendarOptions::default()
            },
            march(1),
        );
        calendar.activate(march(5));
        calendar.focus(march(10));
        assert_eq!(calendar.highlighted_range(), None);
        assert_eq!(calendar.activate(march(10)), Transition::AwaitingConfirm { date: march(10) });
        assert_eq!(calendar.value(), RangeValue { start: Some(march(5)), end: None });
        assert_eq!(calendar.activate(march(10)), Transition::Started { date: march(10) });
        assert_eq!(calendar.value(), RangeValue { start: Some(march(10)), end: None });
    }

    #[test]
    fn test_keyboard_select_over_unavailable_days_needs_confirm() {
        let mut calendar = RangeCalendar::new(
            CalendarOptions {
                is_date_unavailable: Arc::new(|d: &DateValue| d.day() == 7),
                ..CalendarOptions::default()
            },
            march(1),
        );
        calendar.activate(march(5));
        assert_eq!(
            calendar.handle_key(CalendarKey::Enter, "2024-03-10").unwrap(),
            Transition::AwaitingConfirm { date: march(10) }
        );
        assert_eq!(calendar.focused(), Some(march(10)));
        assert_eq!(calendar.value(), RangeValue { start: Some(march(5)), end: None });
        assert_eq!(
            calendar.handle_key(CalendarKey::Enter, "2024-03-10").unwrap(),
            Transition::Started { date: march(10) }
        );
    }

    #[test]
    fn test_press_focuses_before_activating() {
        let mut calendar = RangeCalendar::new(
            CalendarOptions {
                is_date_unavailable: Arc::new(|d: &DateValue| d.day() == 7),
                ..CalendarOptions::default()
            },
            march(1),
        );
        calendar.press(march(5));
        assert_eq!(calendar.press(march(10)), Transition::AwaitingConfirm { date: march(10) });
        assert_eq!(calendar.press(march(6)), Transition::Completed { start: march(5), end: march(6) });
    }

    #[test]
    fn test_focus_skips_disabled_and_off_grid_days() {
        let mut calendar = RangeCalendar::new(
            CalendarOptions {
                is_date_disabled: Arc::new(|d: &DateValue| d.day() == 7),
                ..CalendarOptions::default()
            },
            march(1),
        );
        calendar.activate(march(5));
        calendar.focus(march(7));
        assert_eq!(calendar.focused(), None);
        assert_eq!(calendar.highlighted_range(), None);

        calendar.focus(march(6));
        assert_eq!(calendar.highlighted_range(), Some((march(5), march(6))));
        calendar.focus(date(2024, 4, 10));
        calendar.focus(date(200000, 1, 1));
        assert_eq!(calendar.focused(), Some(march(6)));
    }

    #[test]
    fn test_highlighted_range_follows_focus() {
        let mut calendar = calendar();
        calendar.activate(march(8));
        calendar.focus(march(5));
        assert_eq!(calendar.highlighted_range(), Some((march(5), march(8))));
        calendar.focus(march(9));
        assert_eq!(calendar.highlighted_range(), Some((march(8), march(9))));

        let view = calendar.view();
        let cells: Vec<_> = view.months[0].weeks.iter().flatten().filter(|c| c.highlighted).collect();
        assert_eq!(cells.len(), 2);

        calendar.activate(march(9));
        assert_eq!(calendar.highlighted_range(), None);
    }

    #[test]
    fn test_is_selected_covers_reservations_and_range() {
        let mut calendar = blocked();
        calendar.activate(march(2));
        calendar.activate(march(6));
        for day in 2..=6 {
            assert!(calendar.is_selected(&march(day)));
        }
        for day in 10..=15 {
            assert!(calendar.is_selected(&march(day)));
        }
        assert!(!calendar.is_selected(&march(7)));
        assert!(!calendar.is_selected(&march(16)));
        assert!(calendar.is_selection_start(&march(10)));
        assert!(calendar.is_selection_end(&march(6)));
        assert!(!calendar.is_selection_end(&march(2)));
    }

    #[test]
    fn test_external_value_sync() {
        let mut calendar = calendar();
        calendar.set_value(RangeValue { start: Some(date(2024, 6, 20)), end: Some(date(2024, 6, 10)) });
        assert_eq!(calendar.start(), Some(date(2024, 6, 10)));
        assert_eq!(calendar.end(), Some(date(2024, 6, 20)));
        assert_eq!(calendar.core().visible_months(), vec![date(2024, 6, 1)]);

        calendar.set_value(RangeValue { start: None, end: Some(march(4)) });
        assert_eq!(calendar.value(), RangeValue { start: Some(march(4)), end: None });

        calendar.set_value(RangeValue::default());
        assert_eq!(calendar.value(), RangeValue::default());
    }

    #[test]
    fn test_invalid_when_endpoint_disabled() {
        let mut calendar = RangeCalendar::new(
            CalendarOptions {
                is_date_disabled: Arc::new(|d: &DateValue| d.day() == 4),
                ..CalendarOptions::default()
            },
            march(1),
        );
        assert!(!calendar.is_invalid());
        calendar.set_value(RangeValue { start: Some(march(4)), end: Some(march(9)) });
        assert!(calendar.is_invalid());
        assert!(calendar.view().invalid);
    }

    #[test]
    fn test_keyboard_select_matches_click() {
        let mut calendar = calendar();
        assert_eq!(
            calendar.handle_key(CalendarKey::Enter, "2024-03-05").unwrap(),
            Transition::Started { date: march(5) }
        );
        assert_eq!(
            calendar.handle_key(CalendarKey::ArrowRight, "2024-03-05").unwrap(),
            Transition::Focused { date: march(6) }
        );
        assert_eq!(calendar.focused(), Some(march(6)));
        assert_eq!(
            calendar.handle_key(CalendarKey::Space, "2024-03-06").unwrap(),
            Transition::Completed { start: march(5), end: march(6) }
        );
    }

    #[test]
    fn test_view_reports_selection() {
        let mut calendar = calendar();
        calendar.activate(march(5));
        calendar.activate(march(7));
        let view = calendar.view();
        assert_eq!(view.start.as_deref(), Some("2024-03-05"));
        assert_eq!(view.end.as_deref(), Some("2024-03-07"));
        let cell = view.months[0].weeks.iter().flatten().find(|c| c.value == "2024-03-06").unwrap();
        assert!(cell.selected && !cell.selection_start && !cell.selection_end);
        assert_eq!(view.heading, "March 2024");
    }
}
