//! Monthly balance ledger: composes contract resolution, target hours,
//! worked time, absence credit and manual adjustments into one month's
//! breakdown, chained losslessly to the previous month.
//!
//! The chain is evaluated as an iterative fold from the employee's first
//! work month, never by deep recursion, and every month computed in a
//! session is memoized, so rendering a yearly report does not re-walk the
//! employment history twelve times.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::absence::approved_portion;
use crate::calendar::{days_in_month, HolidayCalendar};
use crate::contract::{daily_target, effective_contract};
use crate::error::Diagnostic;
use crate::models::{
    AbsenceRequest, Employee, EmployeeId, MonthlyBreakdown, TimeBalanceAdjustment, TimeEntry,
};
use crate::worked_time::worked_hours;

/// One evaluation session over immutable input snapshots.
///
/// The memo cache is keyed per employee and month; results are only valid as
/// long as the snapshots they were computed from, so a ledger is created per
/// query session and dropped with it.
#[derive(Debug, Default)]
pub struct MonthLedger {
    cache: HashMap<(EmployeeId, i32, u32), MonthlyBreakdown>,
}

impl MonthLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the breakdown for `(year, month)`, folding the balance
    /// forward from the employee's first work month. Months preceding the
    /// first work month yield zeroed breakdowns.
    #[allow(clippy::too_many_arguments)]
    pub fn monthly_breakdown(
        &mut self,
        employee: &Employee,
        year: i32,
        month: u32,
        entries: &[TimeEntry],
        absences: &[AbsenceRequest],
        adjustments: &[TimeBalanceAdjustment],
        calendar: &HolidayCalendar,
    ) -> MonthlyBreakdown {
        if !(1..=12).contains(&month) {
            warn!("Invalid month {} requested for employee {}", month, employee.id);
            return MonthlyBreakdown::zeroed(&employee.id, year, month);
        }
        let first = employee.first_work_day;
        let chain_start = (first.year(), first.month());
        if (year, month) < chain_start {
            debug!(
                "Month {}/{} precedes first work month of employee {}; zeroed breakdown",
                month, year, employee.id
            );
            return MonthlyBreakdown::zeroed(&employee.id, year, month);
        }

        let mut previous_balance = Decimal::ZERO;
        let mut chain_complete = true;
        let mut current = MonthlyBreakdown::zeroed(&employee.id, year, month);
        for (y, m) in month_sequence(chain_start, (year, month)) {
            let key = (employee.id.clone(), y, m);
            current = match self.cache.get(&key) {
                Some(cached) => {
                    debug!("Ledger cache hit: employee={}, {}/{}", employee.id, m, y);
                    cached.clone()
                }
                None => {
                    let computed = compute_month(
                        employee,
                        y,
                        m,
                        entries,
                        absences,
                        adjustments,
                        calendar,
                        previous_balance,
                        chain_complete,
                    );
                    self.cache.insert(key, computed.clone());
                    computed
                }
            };
            previous_balance = current.end_of_month_balance;
            chain_complete = current.complete;
        }
        current
    }
}

/// Single month computation given the already-folded previous balance.
#[allow(clippy::too_many_arguments)]
fn compute_month(
    employee: &Employee,
    year: i32,
    month: u32,
    entries: &[TimeEntry],
    absences: &[AbsenceRequest],
    adjustments: &[TimeBalanceAdjustment],
    calendar: &HolidayCalendar,
    previous_balance: Decimal,
    chain_complete: bool,
) -> MonthlyBreakdown {
    if !calendar.has_year(year) {
        // Never guess: zero the month, carry the balance through unchanged
        // and mark the result incomplete so the caller can fetch and retry.
        warn!(
            "Holiday data for {} missing; breakdown {}/{} for employee {} is incomplete",
            year, month, year, employee.id
        );
        let mut breakdown = MonthlyBreakdown::zeroed(&employee.id, year, month);
        breakdown.previous_balance = previous_balance;
        breakdown.end_of_month_balance = previous_balance;
        breakdown.complete = false;
        breakdown.diagnostics.push(Diagnostic::MissingHolidayYear { year });
        return breakdown;
    }

    let mut target_hours = Decimal::ZERO;
    let mut absence_holiday_credit = Decimal::ZERO;
    let mut diagnostics = Vec::new();

    for day in days_in_month(year, month) {
        // Days before the first work day carry no schedule and no credit.
        if day < employee.first_work_day {
            continue;
        }
        // Weekends and holidays contribute neither target nor credit.
        if !calendar.chargeable(day) {
            continue;
        }
        let contract = match effective_contract(employee, day) {
            Ok(contract) => contract,
            Err(_) => {
                warn!(
                    "No contract coverage on {} for employee {}; skipping day",
                    day, employee.id
                );
                diagnostics.push(Diagnostic::NoEffectiveContract { date: day });
                continue;
            }
        };
        let day_target = daily_target(contract, day);
        target_hours += day_target;

        // An absent day credits the hours the employee would otherwise have
        // been scheduled for, scaled by the approved portion (0.5 for a
        // half-day). Days with 0 scheduled hours credit 0 even if absent.
        let portion = approved_portion(absences, &employee.id, day);
        if portion > Decimal::ZERO {
            absence_holiday_credit += portion * day_target;
        }
    }

    let (range_start, range_end) = month_bounds(year, month);
    let own_entries = entries.iter().filter(|e| e.employee_id == employee.id);
    let (worked, mut worked_diagnostics) = worked_hours(own_entries, range_start, range_end);
    diagnostics.append(&mut worked_diagnostics);

    let adjustment_total: Decimal = adjustments
        .iter()
        .filter(|a| {
            a.employee_id == employee.id && a.date.year() == year && a.date.month() == month
        })
        .map(|a| a.hours)
        .sum();

    let total_credited = worked + absence_holiday_credit + adjustment_total;
    let monthly_balance = total_credited - target_hours;
    debug!(
        "Breakdown employee={} {}/{}: worked={}, credit={}, adjustments={}, target={}, balance={}",
        employee.id, month, year, worked, absence_holiday_credit, adjustment_total, target_hours,
        monthly_balance
    );

    MonthlyBreakdown {
        employee_id: employee.id.clone(),
        year,
        month,
        worked_hours: worked,
        absence_holiday_credit,
        adjustments: adjustment_total,
        total_credited,
        target_hours,
        monthly_balance,
        previous_balance,
        end_of_month_balance: previous_balance + monthly_balance,
        complete: chain_complete,
        diagnostics,
    }
}

/// Inclusive month walk `start..=end` in chronological order.
fn month_sequence(
    start: (i32, u32),
    end: (i32, u32),
) -> impl Iterator<Item = (i32, u32)> {
    std::iter::successors(Some(start), |&(year, month)| {
        if month == 12 {
            Some((year + 1, 1))
        } else {
            Some((year, month + 1))
        }
    })
    .take_while(move |ym| *ym <= end)
}

/// Half-open datetime range `[first of month, first of next month)`.
fn month_bounds(year: i32, month: u32) -> (NaiveDateTime, NaiveDateTime) {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .expect("month validated before bounds computation");
    let next = first
        .checked_add_months(Months::new(1))
        .expect("month arithmetic within chrono range");
    (first.and_time(NaiveTime::MIN), next.and_time(NaiveTime::MIN))
}
