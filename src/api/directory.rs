use actix_web::{Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::response::ok;
use crate::error::ApiError;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::filter::{AttendanceQuery, ReportRange, TrendQuery};
use crate::model::roster::Roster;
use crate::report::aggregator::{DepartmentSummary, EmployeePeriodSummary, TrendBucket};
use crate::source::RecordScope;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentDetail {
    #[serde(flatten)]
    pub department: Department,
    #[schema(example = 14)]
    pub employee_count: usize,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Restrict to one department
    pub department_id: Option<i64>,
    /// Only active (true) or inactive (false) employees
    pub is_active: Option<bool>,
}

fn detail(roster: &Roster, department: &Department) -> DepartmentDetail {
    DepartmentDetail {
        department: department.clone(),
        employee_count: roster
            .employees()
            .iter()
            .filter(|e| e.department_id == Some(department.id))
            .count(),
    }
}

fn with_dept_name(roster: &Roster, employee: &Employee) -> Employee {
    let mut employee = employee.clone();
    if employee.dept_name.is_none() {
        employee.dept_name = employee
            .department_id
            .and_then(|id| roster.department(id))
            .map(|d| d.dept_name.clone());
    }
    employee
}

fn department_not_found() -> ApiError {
    ApiError::NotFound("Department not found".to_string())
}

fn employee_not_found() -> ApiError {
    ApiError::NotFound("Employee not found".to_string())
}

/// List departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "All departments with head count", body = [DepartmentDetail]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Directory"
)]
pub async fn list_departments(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    let roster = state.roster().await?;
    let departments: Vec<DepartmentDetail> =
        roster.departments().iter().map(|d| detail(&roster, d)).collect();
    Ok(ok(departments))
}

/// Get one department
#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}",
    params(("id" = i64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department with head count", body = DepartmentDetail),
        (status = 404, description = "Department not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Directory"
)]
pub async fn get_department(state: web::Data<AppState>, path: web::Path<i64>) -> actix_web::Result<impl Responder> {
    let roster = state.roster().await?;
    let department = roster.department(*path).ok_or_else(department_not_found)?;
    Ok(ok(detail(&roster, department)))
}

/// Attendance statistics for one department
#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}/attendance-stats",
    params(("id" = i64, Path, description = "Department ID"), AttendanceQuery),
    responses(
        (status = 200, description = "Department summary over the period", body = DepartmentSummary),
        (status = 400, description = "Invalid filters"),
        (status = 404, description = "Department not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Directory"
)]
pub async fn department_attendance_stats(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();
    let filters = query.validate()?;
    let roster = state.roster().await?;
    roster.department(department_id).ok_or_else(department_not_found)?;

    let records = state
        .records(RecordScope::range(filters.range).department(Some(department_id)))
        .await?;
    let stats = state
        .aggregator
        .department_summary(&records, &roster.for_department(department_id))
        .into_iter()
        .next()
        .ok_or_else(department_not_found)?;

    Ok(ok(stats))
}

/// Employees of one department with their period summary
#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}/employees",
    params(("id" = i64, Path, description = "Department ID"), AttendanceQuery),
    responses(
        (status = 200, description = "One row per employee of the department", body = [EmployeePeriodSummary]),
        (status = 400, description = "Invalid filters"),
        (status = 404, description = "Department not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Directory"
)]
pub async fn department_employees(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();
    let filters = query.validate()?;
    let roster = state.roster().await?;
    roster.department(department_id).ok_or_else(department_not_found)?;

    let records = state
        .records(RecordScope::range(filters.range).department(Some(department_id)))
        .await?;

    Ok(ok(state
        .aggregator
        .period_summary(&records, &roster.for_department(department_id))))
}

/// Monthly attendance trend for one department
#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}/attendance-trend",
    params(("id" = i64, Path, description = "Department ID"), TrendQuery),
    responses(
        (status = 200, description = "Monthly buckets, newest first", body = [TrendBucket]),
        (status = 400, description = "months is not a positive integer"),
        (status = 404, description = "Department not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Directory"
)]
pub async fn department_attendance_trend(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<TrendQuery>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();
    let months = query.months()?;
    state
        .roster()
        .await?
        .department(department_id)
        .ok_or_else(department_not_found)?;

    let range = ReportRange::trailing_months(state.today(), months);
    let records = state
        .records(RecordScope::range(range).department(Some(department_id)))
        .await?;

    Ok(ok(state.aggregator.monthly_trend(&records)))
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employees with their department name", body = [Employee]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Directory"
)]
pub async fn list_employees(
    state: web::Data<AppState>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let roster = state.roster().await?;
    let employees: Vec<Employee> = roster
        .employees()
        .iter()
        .filter(|e| query.department_id.is_none_or(|id| e.department_id == Some(id)))
        .filter(|e| query.is_active.is_none_or(|active| e.is_active == active))
        .map(|e| with_dept_name(&roster, e))
        .collect();

    Ok(ok(employees))
}

/// Get one employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Directory"
)]
pub async fn get_employee(state: web::Data<AppState>, path: web::Path<i64>) -> actix_web::Result<impl Responder> {
    let roster = state.roster().await?;
    let employee = roster.employee(*path).ok_or_else(employee_not_found)?;
    Ok(ok(with_dept_name(&roster, employee)))
}

/// Attendance summary for one employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}/attendance-summary",
    params(("id" = i64, Path, description = "Employee ID"), AttendanceQuery),
    responses(
        (status = 200, description = "Period summary for the employee", body = EmployeePeriodSummary),
        (status = 400, description = "Invalid filters"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Directory"
)]
pub async fn employee_attendance_summary(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let filters = query.validate()?;
    let roster = state.roster().await?;
    roster.employee(employee_id).ok_or_else(employee_not_found)?;

    let records = state
        .records(RecordScope::range(filters.range).employee(Some(employee_id)))
        .await?;
    let summary = state
        .aggregator
        .period_summary(&records, &roster.for_employee(employee_id))
        .into_iter()
        .next()
        .ok_or_else(employee_not_found)?;

    Ok(ok(summary))
}

/// Monthly attendance trend for one employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}/attendance-trend",
    params(("id" = i64, Path, description = "Employee ID"), TrendQuery),
    responses(
        (status = 200, description = "Monthly buckets, newest first", body = [TrendBucket]),
        (status = 400, description = "months is not a positive integer"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Directory"
)]
pub async fn employee_attendance_trend(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<TrendQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let months = query.months()?;
    state
        .roster()
        .await?
        .employee(employee_id)
        .ok_or_else(employee_not_found)?;

    let range = ReportRange::trailing_months(state.today(), months);
    let records = state
        .records(RecordScope::range(range).employee(Some(employee_id)))
        .await?;

    Ok(ok(state.aggregator.monthly_trend(&records)))
}
