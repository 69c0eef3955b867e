//! Entity store collaborator.
//!
//! The engine consumes immutable snapshots of the raw entities and writes
//! exactly one thing back: the frozen vacation carryover. [`InMemoryStore`]
//! implements the contract over shared maps and can be populated from a JSON
//! snapshot file; production deployments substitute their own
//! [`EntityStore`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::calendar::HolidayCalendar;
use crate::models::{
    AbsenceRequest, Employee, EmployeeId, Holiday, TimeBalanceAdjustment, TimeEntry,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("employee {0} not found")]
    EmployeeNotFound(String),
}

pub trait EntityStore {
    fn employee(&self, id: &str) -> Option<Employee>;
    fn employees(&self) -> Vec<Employee>;
    fn time_entries(&self, employee_id: &str) -> Vec<TimeEntry>;
    fn absence_requests(&self, employee_id: &str) -> Vec<AbsenceRequest>;
    fn adjustments(&self, employee_id: &str) -> Vec<TimeBalanceAdjustment>;

    /// Freezes the vacation carryover for `(employee, year)`. Write-once:
    /// when a value is already frozen the call is a no-op, so concurrent
    /// recomputation attempts are harmless.
    fn freeze_vacation_carryover(
        &self,
        employee_id: &str,
        year: i32,
        days: Decimal,
    ) -> Result<(), StoreError>;
}

/// One self-contained snapshot of every entity collection the engine reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
    #[serde(default)]
    pub absence_requests: Vec<AbsenceRequest>,
    #[serde(default)]
    pub adjustments: Vec<TimeBalanceAdjustment>,
    /// Holidays keyed by year. A present key with an empty list means the
    /// year is loaded and simply has no holidays in the relevant region.
    #[serde(default)]
    pub holidays: HashMap<i32, Vec<Holiday>>,
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot file {}", path.display()))?;
    let snapshot =
        serde_json::from_str(&raw).with_context(|| format!("parsing snapshot file {}", path.display()))?;
    Ok(snapshot)
}

#[derive(Debug, Default)]
struct StoreData {
    employees: HashMap<EmployeeId, Employee>,
    time_entries: Vec<TimeEntry>,
    absence_requests: Vec<AbsenceRequest>,
    adjustments: Vec<TimeBalanceAdjustment>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<StoreData>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the store and the holiday calendar from one snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> (Self, HolidayCalendar) {
        let calendar = HolidayCalendar::from_years(snapshot.holidays);
        let data = StoreData {
            employees: snapshot
                .employees
                .into_iter()
                .map(|e| (e.id.clone(), e))
                .collect(),
            time_entries: snapshot.time_entries,
            absence_requests: snapshot.absence_requests,
            adjustments: snapshot.adjustments,
        };
        info!(
            "Entity snapshot loaded: {} employees, {} time entries, {} absence requests",
            data.employees.len(),
            data.time_entries.len(),
            data.absence_requests.len()
        );
        (
            Self {
                inner: Arc::new(Mutex::new(data)),
            },
            calendar,
        )
    }
}

impl EntityStore for InMemoryStore {
    fn employee(&self, id: &str) -> Option<Employee> {
        self.inner.lock().unwrap().employees.get(id).cloned()
    }

    fn employees(&self) -> Vec<Employee> {
        self.inner.lock().unwrap().employees.values().cloned().collect()
    }

    fn time_entries(&self, employee_id: &str) -> Vec<TimeEntry> {
        self.inner
            .lock()
            .unwrap()
            .time_entries
            .iter()
            .filter(|e| e.employee_id == employee_id)
            .cloned()
            .collect()
    }

    fn absence_requests(&self, employee_id: &str) -> Vec<AbsenceRequest> {
        self.inner
            .lock()
            .unwrap()
            .absence_requests
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect()
    }

    fn adjustments(&self, employee_id: &str) -> Vec<TimeBalanceAdjustment> {
        self.inner
            .lock()
            .unwrap()
            .adjustments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .cloned()
            .collect()
    }

    fn freeze_vacation_carryover(
        &self,
        employee_id: &str,
        year: i32,
        days: Decimal,
    ) -> Result<(), StoreError> {
        let mut data = self.inner.lock().unwrap();
        let employee = data
            .employees
            .get_mut(employee_id)
            .ok_or_else(|| StoreError::EmployeeNotFound(employee_id.to_string()))?;
        match employee.vacation_carryover.entry(year) {
            Entry::Occupied(existing) => {
                debug!(
                    "Carryover for employee {} year {} already frozen at {}; keeping it",
                    employee_id,
                    year,
                    existing.get()
                );
            }
            Entry::Vacant(slot) => {
                info!(
                    "Freezing carryover for employee {} year {}: {} days",
                    employee_id, year, days
                );
                slot.insert(days);
            }
        }
        Ok(())
    }
}
