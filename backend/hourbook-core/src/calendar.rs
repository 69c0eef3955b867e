//! Holiday calendar and calendar-day helpers.
//!
//! The calendar wraps the holiday provider's per-year sets. A year is either
//! loaded (possibly with zero holidays) or absent; computations that touch an
//! absent year report [`crate::EngineError::MissingHolidayYear`] instead of
//! guessing.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;
use tracing::{debug, info};

use crate::models::{Employee, Holiday};

#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    years: BTreeMap<i32, Vec<Holiday>>,
    dates: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads one year's holiday set. Replaces any previous set for the year.
    pub fn insert_year(&mut self, year: i32, holidays: Vec<Holiday>) {
        info!(
            "Loading holiday calendar: year={}, holidays={}",
            year,
            holidays.len()
        );
        if let Some(old) = self.years.remove(&year) {
            for holiday in old {
                self.dates.remove(&holiday.date);
            }
        }
        for holiday in &holidays {
            debug!("Holiday {}: {} ({})", holiday.date, holiday.name, holiday.region);
            self.dates.insert(holiday.date);
        }
        self.years.insert(year, holidays);
    }

    pub fn from_years(years: impl IntoIterator<Item = (i32, Vec<Holiday>)>) -> Self {
        let mut calendar = Self::new();
        for (year, holidays) in years {
            calendar.insert_year(year, holidays);
        }
        calendar
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.years.contains_key(&year)
    }

    /// Years currently loaded, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// A chargeable day is neither a weekend day nor a public holiday: the
    /// only kind of day against which target hours and absence days count.
    /// Only meaningful for dates whose year is loaded.
    pub fn chargeable(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_holiday(date)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Years the caller must load before evaluating a ledger or tracker query
/// for `through_year`: the whole balance chain back to the first work day.
pub fn required_years(employee: &Employee, through_year: i32) -> RangeInclusive<i32> {
    employee.first_work_day.year().min(through_year)..=through_year
}

/// All calendar days of a month, in order. Empty for an invalid year/month.
pub fn days_in_month(year: i32, month: u32) -> impl Iterator<Item = NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let end = first.and_then(|d| d.checked_add_months(Months::new(1)));
    std::iter::successors(first, |d| d.succ_opt())
        .take_while(move |d| matches!(end, Some(e) if *d < e))
}

/// All calendar days of a year, in order.
pub fn days_in_year(year: i32) -> impl Iterator<Item = NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1);
    std::iter::successors(first, |d| d.succ_opt()).take_while(move |d| d.year() == year)
}
