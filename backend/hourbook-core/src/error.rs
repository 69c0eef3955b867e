//! Error taxonomy of the accounting engine.
//!
//! Hard errors ([`EngineError`]) are reserved for missing required inputs;
//! everything that can be recovered per day is downgraded to a
//! [`Diagnostic`] so a single bad record never aborts a whole month's or
//! year's computation. Diagnostics ride inside the derived value objects and
//! serialize with them.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("no contract version effective on {date} for employee {employee_id}")]
    NoEffectiveContract {
        employee_id: String,
        date: NaiveDate,
    },
    #[error("holiday data for year {year} has not been supplied")]
    MissingHolidayYear { year: i32 },
}

/// Per-day findings recovered locally during a computation.
///
/// `MissingHolidayYear` is the only variant that marks a result incomplete;
/// the caller is expected to fetch the year and retry the whole computation.
/// The rest are data-integrity warnings: the affected day contributes its
/// safe default (zero) and the run continues.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("holiday data for year {year} is missing; result is zeroed and incomplete")]
    MissingHolidayYear { year: i32 },
    #[error("no contract version effective on {date}; day skipped")]
    NoEffectiveContract { date: NaiveDate },
    #[error("break exceeds gross duration on entry {entry_id}; worked hours clamped to zero")]
    NegativeBreak { entry_id: String, date: NaiveDate },
    #[error("multiple approved absence requests cover {date}; day counted once")]
    OverlappingApproved { date: NaiveDate },
}
