//! Grid state and navigation shared by every calendar variant
//!
//! [`CalendarCore`] owns the placeholder (the anchor date deciding which
//! months are on screen), the month grid built from it, and the ordered
//! list of cells keyboard focus may land on. It pages the grid, jumps
//! years and months, moves focus for arrow keys and derives the per-cell
//! view flags that do not depend on the selection model.

use chrono::NaiveDate;

use super::announcer::Announcer;
use super::date::{DateDuration, DateValue};
use super::formatter::Formatter;
use super::month::{build_months, Month};
use super::options::CalendarOptions;
use super::view::{CalendarView, DayCell, MonthView};
use super::{CalendarError, CalendarKey};

/// A rendered cell as seen by keyboard navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDescriptor {
    pub date: DateValue,
    pub month_index: usize,
    /// Focusable: not disabled and inside the visible months
    pub enabled: bool,
}

/// What a key press on a day cell asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIntent {
    Shift { from: DateValue, add: i32 },
    Select(DateValue),
    None,
}

/// The first day after the last visible month already lies beyond
/// `max_value`, or the calendar is disabled.
pub fn is_next_button_disabled(max_value: Option<&DateValue>, months: &[Month], disabled: bool) -> bool {
    if disabled {
        return true;
    }
    let (Some(max_value), Some(last)) = (max_value, months.last()) else {
        return false;
    };
    let first_of_next_page = last.value.add(DateDuration::months(1)).with_day(1);
    first_of_next_page.is_after(max_value)
}

/// The last day of the month before the first visible month lies before
/// `min_value`, or the calendar is disabled.
/// Day 35 clamps to that month's last day.
pub fn is_prev_button_disabled(min_value: Option<&DateValue>, months: &[Month], disabled: bool) -> bool {
    if disabled {
        return true;
    }
    let (Some(min_value), Some(first)) = (min_value, months.first()) else {
        return false;
    };
    let last_of_prev_page = first.value.subtract(DateDuration::months(1)).with_day(35);
    last_of_prev_page.is_before(min_value)
}

pub struct CalendarCore {
    options: CalendarOptions,
    placeholder: DateValue,
    months: Vec<Month>,
    cells: Vec<CellDescriptor>,
    formatter: Formatter,
    announcer: Announcer,
    today: Option<NaiveDate>,
}

impl CalendarCore {
    pub fn new(options: CalendarOptions, placeholder: DateValue) -> Self {
        let months = build_months(placeholder, &options.month_options());
        let formatter = Formatter::new(&options.locale);
        let mut core = Self {
            options,
            placeholder,
            months: Vec::new(),
            cells: Vec::new(),
            formatter,
            announcer: Announcer::new(),
            today: None,
        };
        core.set_months(months);
        core.ensure_non_disabled_placeholder(placeholder);
        core
    }

    pub fn options(&self) -> &CalendarOptions {
        &self.options
    }

    /// Change any options; the grid is rebuilt when a layout input changed.
    pub fn update_options<F>(&mut self, update: F)
    where
        F: FnOnce(&mut CalendarOptions),
    {
        let layout = self.options.month_options();
        update(&mut self.options);
        self.formatter.set_locale(&self.options.locale);
        if self.options.month_options() != layout {
            let months = build_months(self.placeholder, &self.options.month_options());
            self.set_months(months);
        } else {
            self.refresh_cells();
        }
    }

    pub fn placeholder(&self) -> DateValue {
        self.placeholder
    }

    /// Move the placeholder. When it leaves the visible months the grid is
    /// rebuilt around it before this returns.
    pub fn set_placeholder(&mut self, date: DateValue) {
        self.placeholder = date;
        if self.months.iter().any(|month| month.contains(&date)) {
            return;
        }
        let months = build_months(date, &self.options.month_options());
        self.set_months(months);
    }

    pub fn months(&self) -> &[Month] {
        &self.months
    }

    pub fn visible_months(&self) -> Vec<DateValue> {
        self.months.iter().map(|month| month.value).collect()
    }

    fn set_months(&mut self, months: Vec<Month>) {
        self.months = months;
        self.refresh_cells();
    }

    fn refresh_cells(&mut self) {
        let cells = self
            .months
            .iter()
            .enumerate()
            .flat_map(|(month_index, month)| {
                month.dates.iter().map(move |date| (month_index, month, *date))
            })
            .map(|(month_index, month, date)| CellDescriptor {
                date,
                month_index,
                enabled: !self.is_cell_disabled(&date, month) && !self.is_outside_visible_months(&date),
            })
            .collect();
        self.cells = cells;
    }

    pub fn cells(&self) -> &[CellDescriptor] {
        &self.cells
    }

    /// Cells keyboard focus may land on, in grid order.
    pub fn candidates(&self) -> Vec<CellDescriptor> {
        self.cells.iter().filter(|cell| cell.enabled).copied().collect()
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    pub fn announcer(&self) -> &Announcer {
        &self.announcer
    }

    pub fn announcer_mut(&mut self) -> &mut Announcer {
        &mut self.announcer
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Pin "today" to a fixed date.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = Some(today);
    }

    pub fn is_date_disabled(&self, date: &DateValue) -> bool {
        if self.options.disabled || (self.options.is_date_disabled)(date) {
            return true;
        }
        self.is_out_of_bounds(date)
    }

    fn is_out_of_bounds(&self, date: &DateValue) -> bool {
        if self.options.min_value.is_some_and(|min| date.is_before(&min)) {
            return true;
        }
        self.options.max_value.is_some_and(|max| date.is_after(&max))
    }

    pub fn is_date_unavailable(&self, date: &DateValue) -> bool {
        (self.options.is_date_unavailable)(date)
    }

    pub fn is_outside_visible_months(&self, date: &DateValue) -> bool {
        !self.months.iter().any(|month| month.contains(date))
    }

    /// Disabled as rendered inside `month`, outside-month padding included.
    pub fn is_cell_disabled(&self, date: &DateValue, month: &Month) -> bool {
        self.is_date_disabled(date) || (self.options.disable_days_outside_month && !month.contains(date))
    }

    /// If the initial placeholder is a disabled date, nothing in the grid
    /// would be tabbable; move it to the first usable day in view.
    fn ensure_non_disabled_placeholder(&mut self, default_placeholder: DateValue) {
        let disabled = (self.options.is_date_disabled)(&default_placeholder)
            || self.is_out_of_bounds(&default_placeholder);
        if !self.placeholder.is_same_day(&default_placeholder) || !disabled {
            return;
        }
        let first_usable = self.months.iter().find_map(|month| {
            month.dates.iter().copied().find(|date| {
                !self.is_cell_disabled(date, month) && !self.is_date_unavailable(date)
            })
        });
        if let Some(date) = first_usable {
            tracing::debug!(%default_placeholder, %date, "placeholder moved off a disabled date");
            self.placeholder = date;
        }
    }

    pub fn is_next_button_disabled(&self) -> bool {
        is_next_button_disabled(self.options.max_value.as_ref(), &self.months, self.options.disabled)
    }

    pub fn is_prev_button_disabled(&self) -> bool {
        is_prev_button_disabled(self.options.min_value.as_ref(), &self.months, self.options.disabled)
    }

    fn page_size(&self) -> i32 {
        i32::try_from(self.options.number_of_months.max(1)).unwrap_or(1)
    }

    /// Paged mode jumps the placeholder a whole page; otherwise the grid
    /// slides by one month and the placeholder goes to its first day.
    pub fn next_page(&mut self) {
        self.page(1);
    }

    pub fn prev_page(&mut self) {
        self.page(-1);
    }

    fn page(&mut self, direction: i32) {
        let Some(first) = self.months.first().map(|month| month.value) else {
            return;
        };
        if self.options.paged_navigation {
            self.set_placeholder(first.add(DateDuration::months(direction * self.page_size())));
            return;
        }
        let months = build_months(first.add(DateDuration::months(direction)), &self.options.month_options());
        let Some(new_first) = months.first().map(|month| month.value.with_day(1)) else {
            return;
        };
        self.set_months(months);
        self.set_placeholder(new_first);
    }

    pub fn next_year(&mut self) {
        self.set_placeholder(self.placeholder.add(DateDuration::years(1)));
    }

    pub fn prev_year(&mut self) {
        self.set_placeholder(self.placeholder.subtract(DateDuration::years(1)));
    }

    pub fn set_year(&mut self, year: i32) {
        self.set_placeholder(self.placeholder.with_year(year));
    }

    pub fn set_month(&mut self, month: u32) {
        self.set_placeholder(self.placeholder.with_month(month));
    }

    fn candidate_index(&self, candidates: &[CellDescriptor], date: &DateValue) -> Option<usize> {
        let same_day = |cell: &CellDescriptor| cell.date.is_same_day(date);
        candidates
            .iter()
            .position(|cell| same_day(cell) && self.months[cell.month_index].contains(&cell.date))
            .or_else(|| candidates.iter().position(same_day))
    }

    /// Move focus `add` candidate cells away from `from`. Falling off the
    /// start or end pages the grid by `number_of_months` (unless that
    /// direction is disabled) and continues counting into the new grid.
    pub fn shift_focus(&mut self, from: &DateValue, add: i32) -> Option<DateValue> {
        let candidates = self.candidates();
        if candidates.is_empty() {
            return None;
        }
        let index = self.candidate_index(&candidates, from)?;
        let next = index as i64 + i64::from(add);
        let len = candidates.len() as i64;

        if (0..len).contains(&next) {
            return self.focus_candidate(&candidates, next);
        }

        let first = self.months.first()?.value;
        let page = DateDuration::months(self.page_size());
        if next < 0 {
            if self.is_prev_button_disabled() {
                return None;
            }
            self.set_placeholder(first.subtract(page));
            let fresh = self.candidates();
            let new_index = fresh.len() as i64 - next.abs();
            tracing::trace!(%from, add, new_index, "focus wrapped to previous page");
            self.focus_candidate(&fresh, new_index)
        } else {
            if self.is_next_button_disabled() {
                return None;
            }
            self.set_placeholder(first.add(page));
            let fresh = self.candidates();
            let new_index = next - len;
            tracing::trace!(%from, add, new_index, "focus wrapped to next page");
            self.focus_candidate(&fresh, new_index)
        }
    }

    fn focus_candidate(&mut self, candidates: &[CellDescriptor], index: i64) -> Option<DateValue> {
        let target = usize::try_from(index).ok().and_then(|i| candidates.get(i))?.date;
        self.set_placeholder(target);
        Some(target)
    }

    /// Arrow keys shift focus, Enter and Space select. The date is parsed
    /// back out of the cell's string value against the placeholder variant.
    pub fn key_intent(&self, key: CalendarKey, target: &str) -> Result<KeyIntent, CalendarError> {
        if key.offset().is_none() && !key.is_select() {
            return Ok(KeyIntent::None);
        }
        let date = DateValue::parse_as(target, &self.placeholder)?;
        Ok(match key.offset() {
            Some(add) => KeyIntent::Shift { from: date, add },
            None => KeyIntent::Select(date),
        })
    }

    /// "March 2024", "March - April 2024" or "December 2024 - January 2025".
    pub fn heading(&self) -> String {
        let (Some(first), Some(last)) = (self.months.first(), self.months.last()) else {
            return String::new();
        };
        if self.months.len() == 1 {
            return self.formatter.full_month_and_year(&first.value);
        }
        let start_month = self.formatter.full_month(&first.value);
        let end_month = self.formatter.full_month(&last.value);
        let start_year = self.formatter.full_year(&first.value);
        let end_year = self.formatter.full_year(&last.value);
        if start_year == end_year {
            format!("{start_month} - {end_month} {end_year}")
        } else {
            format!("{start_month} {start_year} - {end_month} {end_year}")
        }
    }

    pub fn full_label(&self) -> String {
        format!("{} {}", self.options.calendar_label, self.heading())
    }

    /// Localized weekday names, in grid column order.
    pub fn weekdays(&self) -> Vec<String> {
        let Some(first_week) = self.months.first().and_then(|month| month.weeks.first()) else {
            return Vec::new();
        };
        first_week
            .iter()
            .map(|date| self.formatter.day_of_week(date, self.options.weekday_format))
            .collect()
    }

    /// Flags of a cell that do not depend on the selection model.
    pub fn base_cell(&self, date: &DateValue, month: &Month) -> DayCell {
        let disabled = self.is_cell_disabled(date, month);
        let focused = date.is_same_day(&self.placeholder);
        DayCell {
            value: date.to_string(),
            kind: date.kind(),
            day: date.day(),
            label: self.formatter.cell_label(date),
            disabled,
            unavailable: self.is_date_unavailable(date),
            today: date.date() == self.today(),
            outside_month: !month.contains(date),
            outside_visible_months: self.is_outside_visible_months(date),
            focused,
            selected: false,
            selection_start: false,
            selection_end: false,
            highlighted: false,
            tab_index: match (disabled, focused) {
                (true, _) => None,
                (false, true) => Some(0),
                (false, false) => Some(-1),
            },
        }
    }

    /// Build the view; `decorate` fills in the selection flags of each cell.
    pub fn view<F>(&self, decorate: F) -> CalendarView
    where
        F: Fn(&DateValue, &mut DayCell),
    {
        let months = self
            .months
            .iter()
            .map(|month| MonthView {
                value: month.value.to_string(),
                heading: self.formatter.full_month_and_year(&month.value),
                weeks: month
                    .weeks
                    .iter()
                    .map(|week| {
                        week.iter()
                            .map(|date| {
                                let mut cell = self.base_cell(date, month);
                                decorate(date, &mut cell);
                                cell
                            })
                            .collect()
                    })
                    .collect(),
            })
            .collect();

        CalendarView {
            months,
            weekdays: self.weekdays(),
            heading: self.heading(),
            full_label: self.full_label(),
            placeholder: self.placeholder.to_string(),
            invalid: false,
            disabled: self.options.disabled,
            readonly: self.options.readonly,
            next_disabled: self.is_next_button_disabled(),
            prev_disabled: self.is_prev_button_disabled(),
            start: None,
            end: None,
            values: Vec::new(),
            announcement: self.announcer.last().cloned(),
        }
    }
}
