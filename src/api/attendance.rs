use actix_web::{Responder, web};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::api::{narrow, response::ok};
use crate::error::ApiError;
use crate::model::filter::{AttendanceQuery, DayQuery, MonthQuery, ReportRange, ViolationQuery};
use crate::model::status::Status;
use crate::report::aggregator::{
    ClassifiedRecord, DailySummary, DepartmentSummary, EmployeePeriodSummary, RepeatedViolation,
    StatusEntry,
};
use crate::source::RecordScope;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeMonthlyReport {
    pub range: ReportRange,
    pub summary: EmployeePeriodSummary,
    /// Classified days, newest first
    pub days: Vec<ClassifiedRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyStats {
    #[schema(example = "2025-03-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub absent_count: usize,
    pub late_count: usize,
    pub early_leave_count: usize,
    pub overtime_count: usize,
    pub absent: Vec<StatusEntry>,
    pub late: Vec<StatusEntry>,
    pub early_leave: Vec<StatusEntry>,
    pub overtime: Vec<StatusEntry>,
}

/// Classified attendance records
#[utoipa::path(
    get,
    path = "/api/v1/attendance/records",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Records with status and absence reason, newest first", body = [ClassifiedRecord]),
        (status = 400, description = "Invalid filters"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn records(
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let filters = query.validate()?;
    let records = state
        .records(
            RecordScope::range(filters.range)
                .employee(filters.employee_id)
                .department(filters.department_id),
        )
        .await?;
    let roster = state.roster().await?;

    Ok(ok(state.aggregator.classified_records(&records, &roster)))
}

/// Per-date attendance counts
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "One row per date, newest first", body = [DailySummary]),
        (status = 400, description = "Invalid filters"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn summary(
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let filters = query.validate()?;
    let records = state
        .records(
            RecordScope::range(filters.range)
                .employee(filters.employee_id)
                .department(filters.department_id),
        )
        .await?;

    Ok(ok(state.aggregator.daily_summary(&records)))
}

/// Per-employee counts over a period
#[utoipa::path(
    get,
    path = "/api/v1/attendance/period",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "One row per employee, including employees without records", body = [EmployeePeriodSummary]),
        (status = 400, description = "Invalid filters"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn period(
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let filters = query.validate()?;
    debug!(period = %filters.period_type, start = %filters.range.start, end = %filters.range.end, "Period summary");

    let records = state
        .records(
            RecordScope::range(filters.range)
                .employee(filters.employee_id)
                .department(filters.department_id),
        )
        .await?;
    let roster = state.roster().await?;
    let roster = narrow(&roster, filters.employee_id, filters.department_id);

    Ok(ok(state.aggregator.period_summary(&records, &roster)))
}

/// Per-department counts
#[utoipa::path(
    get,
    path = "/api/v1/attendance/department-summary",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Departments by attendance percentage, null last", body = [DepartmentSummary]),
        (status = 400, description = "Invalid filters"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn department_summary(
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let filters = query.validate()?;
    let records = state
        .records(RecordScope::range(filters.range).department(filters.department_id))
        .await?;
    let roster = state.roster().await?;
    let roster = narrow(&roster, None, filters.department_id);

    Ok(ok(state.aggregator.department_summary(&records, &roster)))
}

/// One employee's month
#[utoipa::path(
    get,
    path = "/api/v1/attendance/employee-monthly/{id}",
    params(
        ("id" = i64, Path, description = "Employee ID"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Monthly summary and classified days", body = EmployeeMonthlyReport),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn employee_monthly(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let range = query.range_or(state.today())?;

    let roster = state.roster().await?;
    if roster.employee(employee_id).is_none() {
        return Err(ApiError::NotFound("Employee not found".to_string()).into());
    }

    let records = state
        .records(RecordScope::range(range).employee(Some(employee_id)))
        .await?;
    let own = roster.for_employee(employee_id);

    let summary = state
        .aggregator
        .period_summary(&records, &own)
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    Ok(ok(EmployeeMonthlyReport {
        range,
        summary,
        days: state.aggregator.classified_records(&records, &own),
    }))
}

async fn status_list(
    state: &AppState,
    date: NaiveDate,
    department_id: Option<i64>,
    status: Status,
) -> Result<Vec<StatusEntry>, ApiError> {
    let records = state
        .records(RecordScope::range(ReportRange::single(date)).department(department_id))
        .await?;
    let roster = state.roster().await?;
    Ok(state.aggregator.status_list(&records, date, status, &roster))
}

/// Absent employees on a date
#[utoipa::path(
    get,
    path = "/api/v1/attendance/absent",
    params(DayQuery),
    responses(
        (status = 200, description = "Absent records with their reason", body = [StatusEntry]),
        (status = 400, description = "Missing or malformed date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn absent(state: web::Data<AppState>, query: web::Query<DayQuery>) -> actix_web::Result<impl Responder> {
    let date = query.required_date()?;
    Ok(ok(status_list(&state, date, query.department_id, Status::Absent).await?))
}

/// Late employees on a date
#[utoipa::path(
    get,
    path = "/api/v1/attendance/late",
    params(DayQuery),
    responses(
        (status = 200, description = "Late records, most minutes late first", body = [StatusEntry]),
        (status = 400, description = "Missing or malformed date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn late(state: web::Data<AppState>, query: web::Query<DayQuery>) -> actix_web::Result<impl Responder> {
    let date = query.required_date()?;
    Ok(ok(status_list(&state, date, query.department_id, Status::Late).await?))
}

/// Early leavers on a date
#[utoipa::path(
    get,
    path = "/api/v1/attendance/early-leave",
    params(DayQuery),
    responses(
        (status = 200, description = "Early-leave records, earliest departure first", body = [StatusEntry]),
        (status = 400, description = "Missing or malformed date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn early_leave(state: web::Data<AppState>, query: web::Query<DayQuery>) -> actix_web::Result<impl Responder> {
    let date = query.required_date()?;
    Ok(ok(status_list(&state, date, query.department_id, Status::EarlyLeave).await?))
}

/// Overtime on a date
#[utoipa::path(
    get,
    path = "/api/v1/attendance/overtime",
    params(DayQuery),
    responses(
        (status = 200, description = "Overtime records, most extra hours first", body = [StatusEntry]),
        (status = 400, description = "Missing or malformed date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn overtime(state: web::Data<AppState>, query: web::Query<DayQuery>) -> actix_web::Result<impl Responder> {
    let date = query.required_date()?;
    Ok(ok(status_list(&state, date, query.department_id, Status::Overtime).await?))
}

/// All four lists for one date (defaults to today)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/daily-stats",
    params(DayQuery),
    responses(
        (status = 200, description = "Counts and lists for the date", body = DailyStats),
        (status = 400, description = "Malformed date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn daily_stats(state: web::Data<AppState>, query: web::Query<DayQuery>) -> actix_web::Result<impl Responder> {
    let date = query.date_or(state.today())?;
    let records = state
        .records(RecordScope::range(ReportRange::single(date)).department(query.department_id))
        .await?;
    let roster = state.roster().await?;

    let list = |status| state.aggregator.status_list(&records, date, status, &roster);
    let (absent, late, early_leave, overtime) = (
        list(Status::Absent),
        list(Status::Late),
        list(Status::EarlyLeave),
        list(Status::Overtime),
    );

    Ok(ok(DailyStats {
        date,
        absent_count: absent.len(),
        late_count: late.len(),
        early_leave_count: early_leave.len(),
        overtime_count: overtime.len(),
        absent,
        late,
        early_leave,
        overtime,
    }))
}

/// Employees absent or late repeatedly in a month
#[utoipa::path(
    get,
    path = "/api/v1/attendance/repeated-violations",
    params(ViolationQuery),
    responses(
        (status = 200, description = "Employees at or above the violation threshold, most violations first", body = [RepeatedViolation]),
        (status = 400, description = "Invalid month, year or type"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn repeated_violations(
    state: web::Data<AppState>,
    query: web::Query<ViolationQuery>,
) -> actix_web::Result<impl Responder> {
    let (month, kind) = query.validate()?;
    let records = state.records(RecordScope::range(month)).await?;
    let roster = state.roster().await?;

    Ok(ok(state.aggregator.repeated_violations(&records, month, kind, &roster)))
}
