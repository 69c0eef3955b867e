//! Time & entitlement accounting engine.
//!
//! Turns raw logged events (time entries, absence requests, manual
//! adjustments, contract changes, public holidays) into authoritative
//! numbers: monthly worked/target/balance hours and annual vacation
//! entitlement, consumption and carryover. All computations are pure,
//! synchronous functions over immutable snapshots; every date context is an
//! explicit parameter, the engine never reads a clock and never fetches
//! data. The single observable side effect is the write-once vacation
//! carryover freeze, routed through [`store::EntityStore`].

pub mod absence;
pub mod api;
pub mod calendar;
pub mod contract;
pub mod error;
pub mod ledger;
pub mod models;
pub mod store;
pub mod vacation;
pub mod worked_time;

pub use error::{Diagnostic, EngineError};
pub use models::{
    AbsenceKind, AbsenceRequest, AbsenceStatus, ContractVersion, DayPortion, Employee,
    EmployeeId, EmploymentType, Holiday, MonthlyBreakdown, TargetHours, TimeBalanceAdjustment,
    TimeEntry, VacationSummary, WeeklySchedule,
};

#[cfg(test)]
mod engine_tests;
