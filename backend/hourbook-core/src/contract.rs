//! Contract timeline resolution and target-hours lookup.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::EngineError;
use crate::models::{ContractVersion, Employee, TargetHours};

/// Resolves the contract version effective on `date`: the one with the
/// greatest `valid_from` not exceeding `date`. Relies on the ascending
/// `valid_from` ordering of the contract history. Stable and side-effect
/// free; same inputs always yield the same version.
pub fn effective_contract(
    employee: &Employee,
    date: NaiveDate,
) -> Result<&ContractVersion, EngineError> {
    employee
        .contracts
        .iter()
        .rev()
        .find(|version| version.valid_from <= date)
        .ok_or_else(|| {
            debug!(
                "No contract version effective on {} for employee {}",
                date, employee.id
            );
            EngineError::NoEffectiveContract {
                employee_id: employee.id.clone(),
                date,
            }
        })
}

/// Scheduled hours for `date` under `contract`.
///
/// Returns the *scheduled* value for the day: a flat daily target applies to
/// every calendar day regardless of weekday; excluding weekends and holidays
/// is the caller's concern. A weekly schedule is keyed by chrono's
/// [`chrono::Weekday`] (Mon..Sun); weekdays without an entry are 0.
pub fn daily_target(contract: &ContractVersion, date: NaiveDate) -> Decimal {
    match &contract.target {
        TargetHours::Daily { hours } => *hours,
        TargetHours::Weekly { schedule } => schedule.hours_for(date.weekday()),
    }
}
