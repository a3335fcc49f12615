//! Month grid builder
//!
//! Given an anchor date, produces the weeks to render for each displayed
//! month, padded with days from the neighbouring months so every week is
//! complete.

use super::date::{days_between, DateDuration, DateValue};
use super::formatter::locale_week_start;

/// Cells in a six-week grid.
pub const FIXED_GRID_CELLS: usize = 42;

/// One displayed month. Rebuilt wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Month {
    /// First day of the month
    pub value: DateValue,
    /// Every cell, padding included
    pub dates: Vec<DateValue>,
    pub weeks: Vec<Vec<DateValue>>,
}

impl Month {
    /// Does `date` belong to this month proper (not its padding).
    pub fn contains(&self, date: &DateValue) -> bool {
        date.is_same_month(&self.value)
    }
}

/// Layout inputs of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthOptions {
    /// 0 = Sunday; `None` follows the locale
    pub week_starts_on: Option<u8>,
    pub locale: String,
    pub fixed_weeks: bool,
    pub number_of_months: u32,
}

impl MonthOptions {
    fn week_start(&self) -> u32 {
        self.week_starts_on
            .map(|day| u32::from(day) % 7)
            .unwrap_or_else(|| locale_week_start(&self.locale))
    }
}

/// Build the grid for the month containing `anchor`.
pub fn build_month(anchor: DateValue, options: &MonthOptions) -> Month {
    let week_start = options.week_start();
    let first_day = anchor.start_of_month();
    let last_day = anchor.end_of_month();

    let in_month: Vec<DateValue> = (1..=anchor.days_in_month()).map(|day| anchor.with_day(day)).collect();

    let grid_start = first_day.last_first_day_of_week(week_start);
    let grid_end = last_day.next_last_day_of_week(week_start);
    let leading = days_between(&grid_start.subtract(DateDuration::days(1)), &first_day);
    let mut trailing = days_between(&last_day, &grid_end.add(DateDuration::days(1)));

    let total = leading.len() + in_month.len() + trailing.len();
    if options.fixed_weeks && total < FIXED_GRID_CELLS {
        let mut extra = FIXED_GRID_CELLS - total;
        // An empty trailing run still has to continue from the next month's 1st
        let start_from = match trailing.last() {
            Some(last) => *last,
            None => {
                let next_first = anchor.add(DateDuration::months(1)).with_day(1);
                trailing.push(next_first);
                extra -= 1;
                next_first
            }
        };
        trailing.extend((1..=extra).map(|i| start_from.add(DateDuration::days(i as i64))));
    }

    let mut dates = leading;
    dates.extend(in_month);
    dates.extend(trailing);
    let weeks = dates.chunks(7).map(<[DateValue]>::to_vec).collect();

    Month {
        value: first_day,
        dates,
        weeks,
    }
}

/// Build `number_of_months` consecutive months starting at `anchor`'s month.
/// Each month is padded independently.
pub fn build_months(anchor: DateValue, options: &MonthOptions) -> Vec<Month> {
    let count = options.number_of_months.max(1);
    tracing::trace!(%anchor, count, "building month grid");
    (0..count)
        .map(|offset| build_month(anchor.add(DateDuration::months(offset as i32)), options))
        .collect()
}
