//! Read-only HTTP surface over the engine.
//!
//! The presentation layer consumes the derived value objects as-is; no
//! endpoint mutates anything beyond the carryover freeze that evaluating a
//! vacation summary may trigger. Every date parameter is explicit; the
//! service never substitutes "today" for a missing `as_of`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::calendar::HolidayCalendar;
use crate::ledger::MonthLedger;
use crate::models::{MonthlyBreakdown, VacationSummary};
use crate::store::{EntityStore, InMemoryStore};
use crate::vacation::vacation_summary;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InMemoryStore>,
    pub calendar: Arc<HolidayCalendar>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("employee {0} not found")]
    EmployeeNotFound(String),
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        let status = match self {
            ApiError::EmployeeNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidMonth(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/employees", get(handle_list_employees))
        .route("/employees/{id}/balance/{year}/{month}", get(handle_balance))
        .route("/employees/{id}/vacation/{year}", get(handle_vacation));

    Router::new()
        .nest("/api", api_routes)
        .route("/status", get(handle_status))
        .with_state(state)
}

async fn handle_status() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
struct EmployeeInfo {
    id: String,
    name: String,
    first_work_day: NaiveDate,
}

async fn handle_list_employees(State(state): State<AppState>) -> Json<Vec<EmployeeInfo>> {
    let mut employees: Vec<EmployeeInfo> = state
        .store
        .employees()
        .into_iter()
        .map(|e| EmployeeInfo {
            id: e.id,
            name: e.name,
            first_work_day: e.first_work_day,
        })
        .collect();
    employees.sort_by(|a, b| a.id.cmp(&b.id));
    Json(employees)
}

async fn handle_balance(
    State(state): State<AppState>,
    Path((id, year, month)): Path<(String, i32, u32)>,
) -> Result<Json<MonthlyBreakdown>, ApiError> {
    if !(1..=12).contains(&month) {
        return Err(ApiError::InvalidMonth(month));
    }
    let employee = state
        .store
        .employee(&id)
        .ok_or_else(|| ApiError::EmployeeNotFound(id.clone()))?;
    let entries = state.store.time_entries(&id);
    let absences = state.store.absence_requests(&id);
    let adjustments = state.store.adjustments(&id);

    let mut ledger = MonthLedger::new();
    let breakdown = ledger.monthly_breakdown(
        &employee,
        year,
        month,
        &entries,
        &absences,
        &adjustments,
        &state.calendar,
    );
    Ok(Json(breakdown))
}

#[derive(Debug, Deserialize)]
struct VacationQuery {
    /// Evaluation date bounding the consumption window.
    as_of: NaiveDate,
}

async fn handle_vacation(
    State(state): State<AppState>,
    Path((id, year)): Path<(String, i32)>,
    Query(query): Query<VacationQuery>,
) -> Result<Json<VacationSummary>, ApiError> {
    let employee = state
        .store
        .employee(&id)
        .ok_or_else(|| ApiError::EmployeeNotFound(id.clone()))?;
    let requests = state.store.absence_requests(&id);

    let summary = vacation_summary(
        state.store.as_ref(),
        &employee,
        year,
        query.as_of,
        &requests,
        &state.calendar,
    );
    Ok(Json(summary))
}
