//! Annual vacation entitlement tracking.
//!
//! Combines the contract history with the apportionment walk to answer "how
//! many vacation days are left this year", and performs the engine's single
//! side effect: computing the prior-year carryover exactly once and freezing
//! it through the entity store. A frozen value is a constant: it is used
//! verbatim and never recomputed.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::absence::apportion_days;
use crate::calendar::{days_in_year, HolidayCalendar};
use crate::contract::effective_contract;
use crate::error::Diagnostic;
use crate::models::{AbsenceRequest, Employee, VacationSummary};
use crate::store::EntityStore;

/// Computes the vacation summary for `year`.
///
/// `as_of` bounds the consumption window (no ambient clock: callers pass the
/// evaluation date explicitly); `requests` is the employee's full absence
/// history. The carryover freeze only happens when prior-year holiday data
/// is already loaded; the decision never reads anything but the supplied
/// snapshot.
pub fn vacation_summary(
    store: &dyn EntityStore,
    employee: &Employee,
    year: i32,
    as_of: NaiveDate,
    requests: &[AbsenceRequest],
    calendar: &HolidayCalendar,
) -> VacationSummary {
    let mut diagnostics = Vec::new();
    let mut complete = true;

    let entitlement = entitlement_for_year(employee, year, &mut diagnostics);
    let carryover = resolve_carryover(
        store,
        employee,
        year,
        requests,
        calendar,
        &mut diagnostics,
        &mut complete,
    );

    let (taken, pending) = if calendar.has_year(year) {
        let window_end = last_day_of_year(year).min(as_of);
        let days = days_in_year(year).take_while(move |d| *d <= window_end);
        let result = apportion_days(&employee.id, requests, days, calendar);
        diagnostics.extend(result.diagnostics);
        (
            result.approved.vacation_days,
            result.pending.vacation_days,
        )
    } else {
        warn!(
            "Holiday data for {} missing; vacation summary for employee {} is incomplete",
            year, employee.id
        );
        diagnostics.push(Diagnostic::MissingHolidayYear { year });
        complete = false;
        (Decimal::ZERO, Decimal::ZERO)
    };

    // Pending days are at risk but not committed; they never reduce
    // `remaining`.
    let remaining = entitlement + carryover - taken;
    debug!(
        "Vacation summary employee={} year={}: entitlement={}, carryover={}, taken={}, pending={}, remaining={}",
        employee.id, year, entitlement, carryover, taken, pending, remaining
    );

    VacationSummary {
        employee_id: employee.id.clone(),
        year,
        entitlement,
        carryover,
        taken,
        pending,
        remaining,
        complete,
        diagnostics,
    }
}

/// Entitlement from the contract effective mid-year (July 1): one
/// representative contract per year even if it changed during the year.
/// Employees hired after July 1 fall back to their first contract version.
fn entitlement_for_year(
    employee: &Employee,
    year: i32,
    diagnostics: &mut Vec<Diagnostic>,
) -> Decimal {
    let reference = NaiveDate::from_ymd_opt(year, 7, 1).expect("July 1 always exists");
    match effective_contract(employee, reference) {
        Ok(contract) => contract.vacation_days,
        Err(_) => match employee.contracts.first() {
            Some(first) => first.vacation_days,
            None => {
                warn!("Employee {} has no contract versions", employee.id);
                diagnostics.push(Diagnostic::NoEffectiveContract { date: reference });
                Decimal::ZERO
            }
        },
    }
}

fn resolve_carryover(
    store: &dyn EntityStore,
    employee: &Employee,
    year: i32,
    requests: &[AbsenceRequest],
    calendar: &HolidayCalendar,
    diagnostics: &mut Vec<Diagnostic>,
    complete: &mut bool,
) -> Decimal {
    let prior = year - 1;
    if let Some(frozen) = employee.vacation_carryover.get(&prior) {
        debug!(
            "Carryover for employee {} year {} already frozen at {} days",
            employee.id, prior, frozen
        );
        return *frozen;
    }
    if employee.first_work_day.year() > prior {
        // No employment in the prior year, nothing to carry.
        return Decimal::ZERO;
    }
    if !calendar.has_year(prior) {
        warn!(
            "Carryover for employee {} needs holiday data for {}; not yet supplied",
            employee.id, prior
        );
        diagnostics.push(Diagnostic::MissingHolidayYear { year: prior });
        *complete = false;
        return Decimal::ZERO;
    }

    let prior_entitlement = entitlement_for_year(employee, prior, diagnostics);
    let taken_prior = apportion_days(&employee.id, requests, days_in_year(prior), calendar)
        .approved
        .vacation_days;
    let carryover = prior_entitlement - taken_prior;

    if carryover >= Decimal::ZERO {
        info!(
            "Computed carryover for employee {} year {}: {} days; freezing",
            employee.id, prior, carryover
        );
        if let Err(e) = store.freeze_vacation_carryover(&employee.id, prior, carryover) {
            // The computed value still stands for this evaluation; only the
            // persistence failed.
            error!(
                "Persisting carryover freeze for employee {} failed: {}",
                employee.id, e
            );
        }
    } else {
        warn!(
            "Computed carryover for employee {} year {} is negative ({}); not freezing",
            employee.id, prior, carryover
        );
    }
    carryover
}

fn last_day_of_year(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).expect("December 31 always exists")
}
