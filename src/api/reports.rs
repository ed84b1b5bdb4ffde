use actix_web::{Responder, web};
use tracing::debug;

use crate::api::{narrow, response::ok};
use crate::model::filter::{AttendanceQuery, ReportRange, TrendQuery};
use crate::report::aggregator::{
    Aggregator, DailySummary, DepartmentSummary, EmployeePeriodSummary, OverallSummary, TodayReport,
    rank_by_attendance,
};
use crate::source::RecordScope;
use crate::state::AppState;

/// Attendance for today, against the active roster
#[utoipa::path(
    get,
    path = "/api/v1/reports/today",
    responses(
        (status = 200, description = "Today's counts with present and absent lists", body = TodayReport),
        (status = 500, description = "Internal server error")
    ),
    tag = "Reports"
)]
pub async fn today(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    let today = state.today();
    let records = state.records(RecordScope::range(ReportRange::single(today))).await?;
    let roster = state.roster().await?;

    Ok(ok(state.aggregator.today_report(&records, today, &roster)))
}

/// Monday of this week up to today
#[utoipa::path(
    get,
    path = "/api/v1/reports/weekly",
    responses(
        (status = 200, description = "One roster-based row per day so far this week", body = [DailySummary]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Reports"
)]
pub async fn weekly(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    let today = state.today();
    let week = ReportRange::new(Aggregator::week_start(today), today);
    let records = state.records(RecordScope::range(week)).await?;
    let roster = state.roster().await?;

    Ok(ok(state.aggregator.weekly_report(&records, today, &roster)))
}

/// Current calendar month
#[utoipa::path(
    get,
    path = "/api/v1/reports/monthly",
    responses(
        (status = 200, description = "Totals for the month so far", body = OverallSummary),
        (status = 500, description = "Internal server error")
    ),
    tag = "Reports"
)]
pub async fn monthly(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    let month = ReportRange::month_of(state.today());
    let records = state.records(RecordScope::range(month)).await?;

    Ok(ok(state.aggregator.overall_summary(&records, month)))
}

/// Daily summary over the last N days
#[utoipa::path(
    get,
    path = "/api/v1/reports/attendance-trend",
    params(TrendQuery),
    responses(
        (status = 200, description = "One row per date with records, newest first", body = [DailySummary]),
        (status = 400, description = "days is not a positive integer"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Reports"
)]
pub async fn attendance_trend(
    state: web::Data<AppState>,
    query: web::Query<TrendQuery>,
) -> actix_web::Result<impl Responder> {
    let days = query.days()?;
    let range = ReportRange::trailing_days(state.today(), days);
    debug!(days, start = %range.start, "Attendance trend");

    let records = state.records(RecordScope::range(range)).await?;
    Ok(ok(state.aggregator.daily_summary(&records)))
}

/// Departments ranked by attendance
#[utoipa::path(
    get,
    path = "/api/v1/reports/department-performance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Departments by attendance percentage, null last", body = [DepartmentSummary]),
        (status = 400, description = "Invalid filters"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Reports"
)]
pub async fn department_performance(
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let filters = query.validate()?;
    let records = state.records(RecordScope::range(filters.range)).await?;
    let roster = state.roster().await?;

    Ok(ok(state.aggregator.department_summary(&records, &roster)))
}

/// Employees ranked by attendance
#[utoipa::path(
    get,
    path = "/api/v1/reports/employee-performance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Employees by attendance percentage, null last", body = [EmployeePeriodSummary]),
        (status = 400, description = "Invalid filters"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Reports"
)]
pub async fn employee_performance(
    state: web::Data<AppState>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let filters = query.validate()?;
    let records = state
        .records(RecordScope::range(filters.range).department(filters.department_id))
        .await?;
    let roster = state.roster().await?;
    let roster = narrow(&roster, None, filters.department_id);

    let mut rows = state.aggregator.period_summary(&records, &roster);
    rank_by_attendance(&mut rows);
    Ok(ok(rows))
}
