//! Absence apportionment: splitting absence requests into per-day,
//! per-category credited amounts.
//!
//! The walk is strictly day by day, never a date-range subtraction: holidays
//! and weekends must be excluded individually even inside a contiguous
//! multi-week absence. Rejected requests are invisible here; on a day covered
//! by both a pending and an approved request the approved one wins.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::calendar::{days_in_month, days_in_year, HolidayCalendar};
use crate::error::{Diagnostic, EngineError};
use crate::models::{AbsenceKind, AbsenceRequest, AbsenceStatus};

/// Credited days per absence category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AbsenceTotals {
    pub vacation_days: Decimal,
    pub sick_days: Decimal,
    pub time_off_days: Decimal,
}

impl AbsenceTotals {
    fn add(&mut self, kind: AbsenceKind, amount: Decimal) {
        match kind {
            AbsenceKind::Vacation => self.vacation_days += amount,
            AbsenceKind::SickLeave => self.sick_days += amount,
            AbsenceKind::TimeOff => self.time_off_days += amount,
        }
    }
}

/// Result of an apportionment walk, split by request status so callers can
/// treat committed (approved) and at-risk (pending) days differently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Apportionment {
    pub approved: AbsenceTotals,
    pub pending: AbsenceTotals,
    pub diagnostics: Vec<Diagnostic>,
}

impl Apportionment {
    /// Per-category sum over both statuses.
    pub fn combined(&self) -> AbsenceTotals {
        AbsenceTotals {
            vacation_days: self.approved.vacation_days + self.pending.vacation_days,
            sick_days: self.approved.sick_days + self.pending.sick_days,
            time_off_days: self.approved.time_off_days + self.pending.time_off_days,
        }
    }
}

/// Apportions absences over one calendar month.
pub fn apportion_month(
    employee_id: &str,
    requests: &[AbsenceRequest],
    year: i32,
    month: u32,
    calendar: &HolidayCalendar,
) -> Result<Apportionment, EngineError> {
    if !calendar.has_year(year) {
        return Err(EngineError::MissingHolidayYear { year });
    }
    Ok(apportion_days(
        employee_id,
        requests,
        days_in_month(year, month),
        calendar,
    ))
}

/// Apportions absences over a whole calendar year.
pub fn apportion_year(
    employee_id: &str,
    requests: &[AbsenceRequest],
    year: i32,
    calendar: &HolidayCalendar,
) -> Result<Apportionment, EngineError> {
    if !calendar.has_year(year) {
        return Err(EngineError::MissingHolidayYear { year });
    }
    Ok(apportion_days(
        employee_id,
        requests,
        days_in_year(year),
        calendar,
    ))
}

/// Day-by-day walk over an arbitrary day sequence. The caller guarantees the
/// holiday years touched by `days` are loaded.
pub fn apportion_days(
    employee_id: &str,
    requests: &[AbsenceRequest],
    days: impl Iterator<Item = NaiveDate>,
    calendar: &HolidayCalendar,
) -> Apportionment {
    let mut result = Apportionment::default();
    for day in days {
        // Weekends and holidays are never "spent" as absence days.
        if !calendar.chargeable(day) {
            continue;
        }
        let (request, overlap) = covering_request(requests, employee_id, day);
        if overlap {
            warn!(
                "Multiple approved absence requests cover {} for employee {}; counting once",
                day, employee_id
            );
            result
                .diagnostics
                .push(Diagnostic::OverlappingApproved { date: day });
        }
        if let Some(request) = request {
            let bucket = match request.status {
                AbsenceStatus::Approved => &mut result.approved,
                AbsenceStatus::Pending => &mut result.pending,
                AbsenceStatus::Rejected => unreachable!("rejected requests are filtered out"),
            };
            bucket.add(request.kind, request.day_factor());
        }
    }
    result
}

/// Fraction of `date` occupied by an *approved* absence: 0, 0.5 or 1.
/// Used by the ledger to scale the day's target-hours credit.
pub fn approved_portion(
    requests: &[AbsenceRequest],
    employee_id: &str,
    date: NaiveDate,
) -> Decimal {
    requests
        .iter()
        .find(|r| {
            r.employee_id == employee_id && r.status == AbsenceStatus::Approved && r.covers(date)
        })
        .map(AbsenceRequest::day_factor)
        .unwrap_or(Decimal::ZERO)
}

/// Picks the request attributed to `date`: the first approved one if any
/// (flagging a true double-approval), otherwise the first pending one.
fn covering_request<'a>(
    requests: &'a [AbsenceRequest],
    employee_id: &str,
    date: NaiveDate,
) -> (Option<&'a AbsenceRequest>, bool) {
    let mut approved = requests.iter().filter(|r| {
        r.employee_id == employee_id && r.status == AbsenceStatus::Approved && r.covers(date)
    });
    let first_approved = approved.next();
    let overlap = first_approved.is_some() && approved.next().is_some();
    if first_approved.is_some() {
        return (first_approved, overlap);
    }
    let pending = requests.iter().find(|r| {
        r.employee_id == employee_id && r.status == AbsenceStatus::Pending && r.covers(date)
    });
    (pending, false)
}
