//! Entities consumed by the engine and the derived value objects it emits.
//!
//! Entities arrive as immutable snapshots from the entity store; the derived
//! results ([`MonthlyBreakdown`], [`VacationSummary`]) are recomputed on
//! demand and never persisted. All hour and day amounts are
//! [`rust_decimal::Decimal`]; accounting paths carry no floats.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Diagnostic;

pub type EmployeeId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    /// First day the employee is expected to work. The balance chain starts
    /// in this month and the earliest contract version covers this date.
    pub first_work_day: NaiveDate,
    /// Contract versions sorted ascending by `valid_from`. Append-only;
    /// past versions are never mutated.
    pub contracts: Vec<ContractVersion>,
    /// Frozen vacation carryover per year, in days. Write-once per year;
    /// once a value is present it is a constant.
    #[serde(default)]
    pub vacation_carryover: HashMap<i32, Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    WorkingStudent,
}

/// A time-bounded snapshot of an employee's working-hours agreement.
///
/// Effective from `valid_from` (inclusive) until superseded by the next
/// version. Address and contact fields of the source record are
/// presentation-only and not modelled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractVersion {
    pub valid_from: NaiveDate,
    pub employment_type: EmploymentType,
    #[serde(flatten)]
    pub target: TargetHours,
    /// Annual vacation entitlement in days.
    pub vacation_days: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target_model", rename_all = "snake_case")]
pub enum TargetHours {
    /// Flat scheduled hours, the same value for every calendar day.
    Daily { hours: Decimal },
    /// Day-specific weekly schedule.
    Weekly { schedule: WeeklySchedule },
}

/// Scheduled hours per weekday.
///
/// One explicit field per weekday instead of a numeric index: the mapping to
/// chrono's [`Weekday`] (Mon..Sun) is spelled out in [`Self::hours_for`] and
/// cannot drift off by one. Omitted fields deserialize to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(default)]
    pub mon: Decimal,
    #[serde(default)]
    pub tue: Decimal,
    #[serde(default)]
    pub wed: Decimal,
    #[serde(default)]
    pub thu: Decimal,
    #[serde(default)]
    pub fri: Decimal,
    #[serde(default)]
    pub sat: Decimal,
    #[serde(default)]
    pub sun: Decimal,
}

impl WeeklySchedule {
    pub fn hours_for(&self, weekday: Weekday) -> Decimal {
        match weekday {
            Weekday::Mon => self.mon,
            Weekday::Tue => self.tue,
            Weekday::Wed => self.wed,
            Weekday::Thu => self.thu,
            Weekday::Fri => self.fri,
            Weekday::Sat => self.sat,
            Weekday::Sun => self.sun,
        }
    }
}

/// A logged work period, created by clock-in/out or manual entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub employee_id: EmployeeId,
    /// Start of the period. `end > start`, same or following calendar day.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub break_minutes: u32,
    /// Category tags; irrelevant to accounting.
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceKind {
    Vacation,
    SickLeave,
    TimeOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPortion {
    #[default]
    Full,
    Am,
    Pm,
}

/// An absence over an inclusive date range.
///
/// Rejected requests are excluded from every calculation. Pending and
/// approved requests both occupy days for apportionment purposes, but only
/// approved ones count toward vacation consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceRequest {
    pub id: String,
    pub employee_id: EmployeeId,
    pub kind: AbsenceKind,
    pub status: AbsenceStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Meaningful only for single-day vacation requests; ignored otherwise.
    #[serde(default)]
    pub day_portion: DayPortion,
}

impl AbsenceRequest {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Fraction of a day this request occupies on any covered day: 0.5 for a
    /// single-day vacation request with an am/pm portion, otherwise 1.
    pub fn day_factor(&self) -> Decimal {
        let single_day = self.start_date == self.end_date;
        if single_day && self.kind == AbsenceKind::Vacation && self.day_portion != DayPortion::Full
        {
            dec!(0.5)
        } else {
            Decimal::ONE
        }
    }
}

/// Manual correction or payout, applied to the month containing its date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBalanceAdjustment {
    pub id: String,
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    /// Signed hour delta.
    pub hours: Decimal,
    pub reason: String,
}

/// A public holiday, supplied per calendar year by the holiday provider.
/// The engine never computes holidays itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    pub region: String,
}

/// One month's accounting breakdown, chained to the previous month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBreakdown {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub month: u32,
    /// Net worked hours (gross minus breaks) for entries starting in the month.
    pub worked_hours: Decimal,
    /// Target-hours value of chargeable days covered by approved absences.
    pub absence_holiday_credit: Decimal,
    /// Sum of manual adjustment deltas dated within the month.
    pub adjustments: Decimal,
    /// `worked_hours + absence_holiday_credit + adjustments`.
    pub total_credited: Decimal,
    /// Scheduled hours summed over the month's chargeable days.
    pub target_hours: Decimal,
    /// `total_credited - target_hours`.
    pub monthly_balance: Decimal,
    /// Closing balance of the previous month; 0 in the first work month.
    pub previous_balance: Decimal,
    /// `previous_balance + monthly_balance`.
    pub end_of_month_balance: Decimal,
    /// False when a required input (holiday year) was missing anywhere in
    /// the balance chain; the numbers are then zeroed placeholders.
    pub complete: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl MonthlyBreakdown {
    pub fn zeroed(employee_id: &str, year: i32, month: u32) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            year,
            month,
            worked_hours: Decimal::ZERO,
            absence_holiday_credit: Decimal::ZERO,
            adjustments: Decimal::ZERO,
            total_credited: Decimal::ZERO,
            target_hours: Decimal::ZERO,
            monthly_balance: Decimal::ZERO,
            previous_balance: Decimal::ZERO,
            end_of_month_balance: Decimal::ZERO,
            complete: true,
            diagnostics: Vec::new(),
        }
    }
}

/// Annual vacation accounting for one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VacationSummary {
    pub employee_id: EmployeeId,
    pub year: i32,
    /// Entitlement from the contract effective mid-year, in days.
    pub entitlement: Decimal,
    /// Prior-year carryover: the frozen value when present, otherwise
    /// computed from full prior-year data.
    pub carryover: Decimal,
    /// Approved vacation days consumed up to the `as_of` date.
    pub taken: Decimal,
    /// Pending vacation days in the same window; reported separately, never
    /// subtracted from `remaining`.
    pub pending: Decimal,
    /// `entitlement + carryover - taken`.
    pub remaining: Decimal,
    pub complete: bool,
    pub diagnostics: Vec<Diagnostic>,
}
