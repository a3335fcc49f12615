//! Single date and multiple date selection

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::announcer::Politeness;
use super::date::DateValue;
use super::navigation::CalendarCore;
use super::options::CalendarOptions;
use super::view::CalendarView;
use super::{CalendarError, CalendarSelection, Transition};

/// How long the "now empty" message stays in the live region.
const EMPTY_ANNOUNCEMENT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Single,
    Multiple,
}

/// Value of a [`Calendar`]. Serializes as `null`, a date string, or an
/// array of date strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalendarValue {
    Single(Option<DateValue>),
    Multiple(Vec<DateValue>),
}

impl CalendarValue {
    pub fn empty(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => CalendarValue::Single(None),
            SelectionMode::Multiple => CalendarValue::Multiple(Vec::new()),
        }
    }

    pub fn dates(&self) -> Vec<DateValue> {
        match self {
            CalendarValue::Single(date) => date.iter().copied().collect(),
            CalendarValue::Multiple(dates) => dates.clone(),
        }
    }
}

pub type DateSelectCallback = Arc<dyn Fn(&DateValue) + Send + Sync>;

pub struct Calendar {
    core: CalendarCore,
    mode: SelectionMode,
    value: CalendarValue,
    on_date_select: Option<DateSelectCallback>,
}

impl Calendar {
    pub fn new(options: CalendarOptions, placeholder: DateValue, mode: SelectionMode) -> Self {
        Self {
            core: CalendarCore::new(options, placeholder),
            mode,
            value: CalendarValue::empty(mode),
            on_date_select: None,
        }
    }

    /// Called whenever single mode selects a date.
    pub fn on_date_select<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DateValue) + Send + Sync + 'static,
    {
        self.on_date_select = Some(Arc::new(callback));
        self
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn value(&self) -> &CalendarValue {
        &self.value
    }

    /// Adopt a value set from outside; the placeholder follows the last
    /// selected date. A value of the wrong shape for the mode is a host
    /// error.
    pub fn set_value(&mut self, value: CalendarValue) -> Result<(), CalendarError> {
        let last = match (self.mode, &value) {
            (SelectionMode::Single, CalendarValue::Single(date)) => *date,
            (SelectionMode::Multiple, CalendarValue::Multiple(dates)) => dates.last().copied(),
            (SelectionMode::Single, CalendarValue::Multiple(_)) => {
                return Err(CalendarError::SingleValueExpected)
            }
            (SelectionMode::Multiple, CalendarValue::Single(_)) => {
                return Err(CalendarError::MultipleValueExpected)
            }
        };
        self.value = value;
        if let Some(date) = last {
            self.core.set_placeholder(date);
        }
        Ok(())
    }

    fn toggle(&mut self, date: DateValue, prevent_deselect: bool) -> Transition {
        let CalendarValue::Multiple(dates) = &mut self.value else {
            return Transition::Ignored;
        };
        match dates.iter().position(|selected| selected.is_same_day(&date)) {
            None => {
                dates.push(date);
                Transition::Added { date }
            }
            Some(_) if prevent_deselect => Transition::Ignored,
            Some(index) => {
                dates.remove(index);
                if dates.is_empty() {
                    self.core.set_placeholder(date);
                }
                Transition::Removed { date }
            }
        }
    }

    fn replace(&mut self, date: DateValue, prevent_deselect: bool) -> Transition {
        let CalendarValue::Single(previous) = &self.value else {
            return Transition::Ignored;
        };
        let previous = *previous;
        if previous.is_some_and(|previous| previous.is_same_day(&date)) && !prevent_deselect {
            self.value = CalendarValue::Single(None);
            self.core.set_placeholder(date);
            self.core.announcer_mut().announce(
                "Selected date is now empty.",
                Politeness::Polite,
                Some(EMPTY_ANNOUNCEMENT_TIMEOUT_MS),
            );
            return Transition::Cleared { date };
        }

        let message = format!("Selected Date: {}", self.core.formatter().selected_date(&date, false));
        self.core.announcer_mut().announce(message, Politeness::Polite, None);
        let next = date.with_previous_time(previous.as_ref());
        self.value = CalendarValue::Single(Some(next));
        tracing::debug!(date = %next, "date selected");
        if let Some(callback) = self.on_date_select.clone() {
            callback(&next);
        }
        Transition::Selected { date: next }
    }
}

impl CalendarSelection for Calendar {
    fn core(&self) -> &CalendarCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CalendarCore {
        &mut self.core
    }

    fn is_selected(&self, date: &DateValue) -> bool {
        match &self.value {
            CalendarValue::Single(selected) => selected.is_some_and(|selected| selected.is_same_day(date)),
            CalendarValue::Multiple(dates) => dates.iter().any(|selected| selected.is_same_day(date)),
        }
    }

    fn lead_selection(&self) -> Option<DateValue> {
        match &self.value {
            CalendarValue::Single(selected) => *selected,
            CalendarValue::Multiple(dates) => dates.last().copied(),
        }
    }

    fn clear(&mut self) {
        self.value = CalendarValue::empty(self.mode);
    }

    fn activate(&mut self, date: DateValue) -> Transition {
        let options = self.core.options();
        let (readonly, prevent_deselect) = (options.readonly, options.prevent_deselect);
        if readonly || self.core.is_date_disabled(&date) || self.core.is_date_unavailable(&date) {
            return Transition::Ignored;
        }
        match self.mode {
            SelectionMode::Single => self.replace(date, prevent_deselect),
            SelectionMode::Multiple => self.toggle(date, prevent_deselect),
        }
    }

    /// Hover carries no state outside range selection.
    fn focus(&mut self, _date: DateValue) {}

    /// A selected date that the host's predicates reject.
    fn is_invalid(&self) -> bool {
        let is_date_disabled = &self.core.options().is_date_disabled;
        self.value
            .dates()
            .iter()
            .any(|date| is_date_disabled(date) || self.core.is_date_unavailable(date))
    }

    fn view(&self) -> CalendarView {
        let mut view = self.core.view(|date, cell| {
            cell.selected = self.is_selected(date);
        });
        view.invalid = self.is_invalid();
        view.values = self.value.dates().iter().map(ToString::to_string).collect();
        view
    }
}

impl fmt::Debug for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calendar")
            .field("mode", &self.mode)
            .field("value", &self.value)
            .field("placeholder", &self.core.placeholder())
            .finish_non_exhaustive()
    }
}
