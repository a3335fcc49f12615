//! Calendar interaction engine
//!
//! Stateful date pickers driven by a host UI layer: the host feeds clicks,
//! key presses and navigation requests in, and renders the derived
//! [`CalendarView`] that comes back out. Two selection models share the
//! same month grid and keyboard navigation:
//!
//! - [`RangeCalendar`] selects a start/end pair around a set of existing
//!   reservations.
//! - [`Calendar`] selects one date, or toggles a set of dates.

pub mod announcer;
pub mod date;
pub mod formatter;
pub mod month;
pub mod navigation;
pub mod options;
pub mod range;
pub mod single;
pub mod view;

use serde::Serialize;
use thiserror::Error;

pub use announcer::{Announcement, Announcer, Politeness};
pub use date::{DateDuration, DateKind, DateValue};
pub use formatter::{Formatter, WeekdayFormat};
pub use month::{build_months, Month, MonthOptions};
pub use navigation::{CalendarCore, KeyIntent};
pub use options::{CalendarOptions, DateMatcher};
pub use range::{BlockedRange, RangeCalendar, RangeValue};
pub use single::{Calendar, CalendarValue, SelectionMode};
pub use view::{CalendarView, DayCell, MonthView};

/// Errors surfaced by the calendar engine.
///
/// Everything else the engine rejects (disabled dates, focus targets that
/// are not on the grid, ...) is a silent no-op reported as
/// [`Transition::Ignored`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid {kind} value: {input:?}")]
    InvalidDate { input: String, kind: DateKind },

    #[error("Unknown date type: {0}")]
    UnknownDateKind(String),

    #[error("Invalid value for single prop: expected a single date")]
    SingleValueExpected,

    #[error("Invalid value for multiple prop: expected a list of dates")]
    MultipleValueExpected,
}

/// Keys the calendar grid reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Other,
}

impl CalendarKey {
    /// Map a DOM `KeyboardEvent.key` name onto a calendar key.
    pub fn from_key(key: &str) -> Self {
        match key {
            "ArrowUp" => CalendarKey::ArrowUp,
            "ArrowDown" => CalendarKey::ArrowDown,
            "ArrowLeft" => CalendarKey::ArrowLeft,
            "ArrowRight" => CalendarKey::ArrowRight,
            "Enter" => CalendarKey::Enter,
            " " | "Space" | "Spacebar" => CalendarKey::Space,
            _ => CalendarKey::Other,
        }
    }

    /// Grid offset for arrow keys: one day sideways, one week up or down.
    pub fn offset(self) -> Option<i32> {
        match self {
            CalendarKey::ArrowDown => Some(7),
            CalendarKey::ArrowUp => Some(-7),
            CalendarKey::ArrowLeft => Some(-1),
            CalendarKey::ArrowRight => Some(1),
            _ => None,
        }
    }

    pub fn is_select(self) -> bool {
        matches!(self, CalendarKey::Enter | CalendarKey::Space)
    }
}

/// Outcome of feeding one input event into a selection machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// Rejected by a guard; nothing changed.
    Ignored,
    /// The date sits inside an existing reservation and the host asked to be
    /// told about it instead of selecting.
    LearnMore { date: DateValue, range_index: usize },
    /// The new date would have straddled a reservation, so it became the new
    /// start of a fresh selection.
    Redirected { date: DateValue },
    /// A first press over an unavailable run of days; press again to commit.
    AwaitingConfirm { date: DateValue },
    /// Selection went back to empty.
    Cleared { date: DateValue },
    /// A range start was committed (end absent).
    Started { date: DateValue },
    /// Both range endpoints are committed.
    Completed { start: DateValue, end: DateValue },
    /// Single-mode value replaced.
    Selected { date: DateValue },
    /// Multiple-mode value gained a date.
    Added { date: DateValue },
    /// Multiple-mode value lost a date.
    Removed { date: DateValue },
    /// Keyboard focus moved to a new cell.
    Focused { date: DateValue },
    /// Paging or a year/month jump moved the placeholder.
    Navigated { placeholder: DateValue },
}

impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Transition::Ignored)
    }
}

/// Behaviour shared by the range and single/multiple calendars.
///
/// Both machines own a [`CalendarCore`] for the grid, paging and keyboard
/// navigation; the provided methods route through it.
pub trait CalendarSelection {
    fn core(&self) -> &CalendarCore;

    fn core_mut(&mut self) -> &mut CalendarCore;

    /// Is the given day part of the current selection.
    fn is_selected(&self, date: &DateValue) -> bool;

    /// Selection lead, or the sole selected day.
    fn lead_selection(&self) -> Option<DateValue>;

    /// Drop the whole selection.
    fn clear(&mut self);

    /// Pointer click or keyboard select on a day cell.
    fn activate(&mut self, date: DateValue) -> Transition;

    /// Pointer hover or focus-in on a day cell.
    fn focus(&mut self, date: DateValue);

    /// A cell receives focus before it is clicked or selected from the
    /// keyboard, so the guards see it as the focus target.
    fn press(&mut self, date: DateValue) -> Transition {
        self.focus(date);
        self.activate(date)
    }

    fn is_invalid(&self) -> bool;

    fn view(&self) -> CalendarView;

    /// Move keyboard focus `add` candidate cells away from `from`, paging
    /// the grid when the target falls off either end.
    fn shift_focus(&mut self, from: &DateValue, add: i32) -> Option<DateValue> {
        let target = self.core_mut().shift_focus(from, add)?;
        self.focus(target);
        Some(target)
    }

    /// Key protocol for the grid. `target` is the string value of the
    /// focused cell; the date is recovered from it so keyboard and pointer
    /// paths resolve the same date.
    fn handle_key(&mut self, key: CalendarKey, target: &str) -> Result<Transition, CalendarError> {
        match self.core().key_intent(key, target)? {
            KeyIntent::Shift { from, add } => Ok(self
                .shift_focus(&from, add)
                .map_or(Transition::Ignored, |date| Transition::Focused { date })),
            KeyIntent::Select(date) => Ok(self.press(date)),
            KeyIntent::None => Ok(Transition::Ignored),
        }
    }

    fn next_page(&mut self) {
        self.core_mut().next_page();
    }

    fn prev_page(&mut self) {
        self.core_mut().prev_page();
    }

    fn next_year(&mut self) {
        self.core_mut().next_year();
    }

    fn prev_year(&mut self) {
        self.core_mut().prev_year();
    }

    fn set_year(&mut self, year: i32) {
        self.core_mut().set_year(year);
    }

    fn set_month(&mut self, month: u32) {
        self.core_mut().set_month(month);
    }
}
