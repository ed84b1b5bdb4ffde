use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, test};
use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::report::aggregator::{Aggregator, ReportPolicy, WeekendPolicy};
use crate::report::clock::FixedClock;
use crate::routes;
use crate::source::memory::{Dataset, MemorySource};
use crate::state::AppState;
use crate::utils::directory_cache::DirectoryCache;

fn dataset() -> Dataset {
    serde_json::from_value(json!({
        "departments": [
            { "id": 1, "dept_code": "FIN", "dept_name": "Finance" },
            { "id": 2, "dept_code": "LEG", "dept_name": "Legal" },
            { "id": 3, "dept_code": "RES", "dept_name": "Research" }
        ],
        "employees": [
            { "id": 1, "emp_code": "E001", "first_name": "Ana", "last_name": "Diaz", "department_id": 1 },
            { "id": 2, "emp_code": "E002", "first_name": "Ben", "last_name": "Okafor", "department_id": 1 },
            { "id": 3, "emp_code": "E003", "first_name": "Cleo", "last_name": "Park", "department_id": 2 },
            { "id": 4, "emp_code": "E004", "first_name": "Dan", "last_name": "Ito", "department_id": 2, "is_active": false }
        ],
        "records": [
            { "employee_id": 1, "department_id": 1, "date": "2025-03-03",
              "clock_in": "2025-03-03T08:50:00", "clock_out": "2025-03-03T17:10:00" },
            { "employee_id": 2, "department_id": 1, "date": "2025-03-03",
              "clock_in": null, "clock_out": null, "pay_code_alias": "Sick Leave" },
            { "employee_id": 3, "department_id": 2, "date": "2025-03-03",
              "clock_in": "2025-03-03T09:20:00", "clock_out": "2025-03-03T17:30:00" },

            { "employee_id": 1, "department_id": 1, "date": "2025-03-04",
              "clock_in": "2025-03-04T09:10:00", "clock_out": "2025-03-04T17:30:00" },
            { "employee_id": 2, "department_id": 1, "date": "2025-03-04",
              "clock_in": "2025-03-04T08:00:00", "clock_out": "2025-03-04T16:00:00" },
            { "employee_id": 3, "department_id": 2, "date": "2025-03-04",
              "clock_in": "2025-03-04T09:00:00", "clock_out": "2025-03-04T17:00:00" },

            { "employee_id": 1, "department_id": 1, "date": "2025-03-05",
              "clock_in": "2025-03-05T09:30:00", "clock_out": "2025-03-05T17:30:00" },

            { "employee_id": 1, "department_id": 1, "date": "2025-03-08",
              "clock_in": "2025-03-08T10:00:00", "clock_out": "2025-03-08T14:00:00" }
        ]
    }))
    .unwrap()
}

fn state_with(policy: ReportPolicy) -> Data<AppState> {
    let source = Arc::new(MemorySource::new(dataset()));
    let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    Data::new(AppState {
        source: source.clone(),
        directory: DirectoryCache::new(source, Duration::from_secs(60)),
        clock: Arc::new(FixedClock::on(today)),
        aggregator: Aggregator::new(policy),
    })
}

fn state() -> Data<AppState> {
    state_with(ReportPolicy::default())
}

async fn get(state: Data<AppState>, uri: &str) -> (StatusCode, Value) {
    let limiter = routes::build_limiter(10_000).unwrap();
    let app = test::init_service(
        App::new()
            .wrap(NormalizePath::trim())
            .app_data(state)
            .app_data(routes::query_config())
            .app_data(routes::path_config())
            .configure(|cfg| routes::configure(cfg, "/api/v1", &limiter)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri(uri)
        .peer_addr("127.0.0.1:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

fn by_id<'a>(rows: &'a Value, id: i64) -> &'a Value {
    rows.as_array()
        .unwrap()
        .iter()
        .find(|r| r["employee_id"] == id)
        .unwrap()
}

#[actix_web::test]
async fn missing_start_date_is_a_validation_error() {
    let (status, body) = get(state(), "/api/v1/attendance/records?endDate=2025-03-05").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["message"], "startDate is required");
}

#[actix_web::test]
async fn every_filter_problem_is_reported() {
    let (status, body) = get(state(), "/api/v1/attendance/summary?startDate=2025-3-1&endDate=tomorrow").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn records_are_classified_newest_first() {
    let (status, body) = get(
        state(),
        "/api/v1/attendance/records?startDate=2025-03-03&periodType=day",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["statusCode"], 200);

    let rows = &body["data"];
    assert_eq!(rows.as_array().unwrap().len(), 3);
    assert_eq!(by_id(rows, 1)["status"], "overtime");
    assert_eq!(by_id(rows, 2)["status"], "absent");
    assert_eq!(by_id(rows, 2)["absence_reason"], "sick_leave");
    assert_eq!(by_id(rows, 2)["hours_worked"], Value::Null);
    assert_eq!(by_id(rows, 3)["status"], "late");
    assert_eq!(by_id(rows, 3)["dept_name"], "Legal");
    assert_eq!(by_id(rows, 3)["week_day"], "Monday");
}

#[actix_web::test]
async fn daily_summary_counts_statuses_and_reasons() {
    let (status, body) = get(
        state(),
        "/api/v1/attendance/summary?startDate=2025-03-01&endDate=2025-03-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let days = body["data"].as_array().unwrap();
    assert_eq!(days.len(), 4);
    assert_eq!(days[0]["date"], "2025-03-08");
    assert_eq!(days[0]["is_weekend"], true);

    let monday = &days[3];
    assert_eq!(monday["date"], "2025-03-03");
    assert_eq!(monday["total_employees"], 3);
    assert_eq!(monday["absent"], 1);
    assert_eq!(monday["late"], 1);
    assert_eq!(monday["overtime"], 1);
    assert_eq!(monday["sick_leave"], 1);
    assert_eq!(monday["attendance_percentage"], 66.67);
}

#[actix_web::test]
async fn workweek_policy_hides_saturday() {
    let policy = ReportPolicy {
        weekend: WeekendPolicy::Workweek,
        ..ReportPolicy::default()
    };
    let (_, body) = get(
        state_with(policy),
        "/api/v1/attendance/summary?startDate=2025-03-01&endDate=2025-03-31",
    )
    .await;

    let days = body["data"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["date"], "2025-03-05");
}

#[actix_web::test]
async fn period_summary_lists_employees_without_records() {
    let (_, body) = get(
        state(),
        "/api/v1/attendance/period?startDate=2025-03-03&periodType=day",
    )
    .await;

    let rows = &body["data"];
    assert_eq!(rows.as_array().unwrap().len(), 4);
    let dan = by_id(rows, 4);
    assert_eq!(dan["total_days"], 0);
    assert_eq!(dan["attendance_percentage"], Value::Null);
    assert_eq!(dan["avg_daily_hours"], Value::Null);
    assert_eq!(by_id(rows, 2)["unauthorized_absence"], 0);
}

#[actix_web::test]
async fn department_summary_puts_empty_departments_last() {
    let (_, body) = get(
        state(),
        "/api/v1/attendance/department-summary?startDate=2025-03-01&periodType=month",
    )
    .await;

    let rows = body["data"].as_array().unwrap();
    let names: Vec<_> = rows.iter().map(|r| r["dept_name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Legal", "Finance", "Research"]);
    assert_eq!(rows[1]["attendance_percentage"], 83.33);
    assert_eq!(rows[2]["attendance_percentage"], Value::Null);
    assert_eq!(rows[2]["total_employees"], 0);
}

#[actix_web::test]
async fn employee_monthly_report() {
    let (status, body) = get(state(), "/api/v1/attendance/employee-monthly/1?year=2025&month=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["range"]["start"], "2025-03-01");
    assert_eq!(body["data"]["summary"]["total_days"], 4);
    assert_eq!(body["data"]["summary"]["late"], 3);
    assert_eq!(body["data"]["days"].as_array().unwrap().len(), 4);

    let (status, body) = get(state(), "/api/v1/attendance/employee-monthly/99?year=2025&month=3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Employee not found");
}

#[actix_web::test]
async fn status_lists_need_a_date() {
    let (status, _) = get(state(), "/api/v1/attendance/absent").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(state(), "/api/v1/attendance/late?date=2025-03-04").await;
    assert_eq!(status, StatusCode::OK);
    let late = body["data"].as_array().unwrap();
    assert_eq!(late.len(), 1);
    assert_eq!(late[0]["employee_id"], 1);
    assert_eq!(late[0]["minutes_late"], 10.0);

    let (_, body) = get(state(), "/api/v1/attendance/early-leave?date=2025-03-04&departmentId=1").await;
    assert_eq!(body["data"][0]["minutes_early"], 60.0);
}

#[actix_web::test]
async fn daily_stats_default_to_today() {
    let (status, body) = get(state(), "/api/v1/attendance/daily-stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["date"], "2025-03-05");
    assert_eq!(body["data"]["late_count"], 1);
    assert_eq!(body["data"]["absent_count"], 0);
}

#[actix_web::test]
async fn repeated_late_arrivals() {
    let (status, body) = get(
        state(),
        "/api/v1/attendance/repeated-violations?month=3&year=2025&type=late",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employee_id"], 1);
    assert_eq!(rows[0]["violation_count"], 3);
    assert_eq!(
        rows[0]["violation_dates"],
        json!(["2025-03-04", "2025-03-05", "2025-03-08"])
    );

    let (status, _) = get(
        state(),
        "/api/v1/attendance/repeated-violations?month=3&year=2025&type=napping",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn today_report_uses_the_active_roster() {
    let (status, body) = get(state(), "/api/v1/reports/today").await;
    assert_eq!(status, StatusCode::OK);

    let today = &body["data"];
    assert_eq!(today["date"], "2025-03-05");
    assert_eq!(today["is_weekend"], false);
    assert_eq!(today["total_employees"], 3);
    assert_eq!(today["present_today"], 1);
    assert_eq!(today["absent_today"], 2);
    assert_eq!(today["late_count"], 1);
    assert_eq!(today["attendance_percentage"], 33.33);
    assert_eq!(
        today["absent_employees"][0]["absence_reason"],
        "unauthorized_absence"
    );
}

#[actix_web::test]
async fn weekly_report_stops_at_today() {
    let (_, body) = get(state(), "/api/v1/reports/weekly").await;
    let days = body["data"].as_array().unwrap();
    let dates: Vec<_> = days.iter().map(|d| d["date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec!["2025-03-03", "2025-03-04", "2025-03-05"]);
    assert_eq!(days[1]["attendance_percentage"], 100.0);
}

#[actix_web::test]
async fn monthly_report_covers_the_current_month() {
    let (_, body) = get(state(), "/api/v1/reports/monthly").await;
    let month = &body["data"];
    assert_eq!(month["range"]["end"], "2025-03-31");
    assert_eq!(month["total_employees"], 3);
    assert_eq!(month["total_days"], 8);
    assert_eq!(month["attended"], 7);
}

#[actix_web::test]
async fn trend_parameters_are_validated() {
    let (status, _) = get(state(), "/api/v1/reports/attendance-trend?days=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(state(), "/api/v1/reports/attendance-trend?days=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = get(state(), "/api/v1/reports/attendance-trend?days=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn employee_performance_is_ranked() {
    let (_, body) = get(
        state(),
        "/api/v1/reports/employee-performance?startDate=2025-03-03&endDate=2025-03-04",
    )
    .await;
    let ids: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["employee_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3, 2, 4]);
}

#[actix_web::test]
async fn directory_lookups() {
    let (_, body) = get(state(), "/api/v1/departments/1").await;
    assert_eq!(body["data"]["dept_name"], "Finance");
    assert_eq!(body["data"]["employee_count"], 2);

    let (status, body) = get(state(), "/api/v1/departments/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Department not found");

    let (status, _) = get(state(), "/api/v1/departments/finance").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(state(), "/api/v1/employees?departmentId=2").await;
    let legal = body["data"].as_array().unwrap();
    assert_eq!(legal.len(), 2);
    assert!(legal.iter().all(|e| e["dept_name"] == "Legal"));

    let (_, body) = get(state(), "/api/v1/employees?isActive=false").await;
    assert_eq!(body["data"][0]["first_name"], "Dan");
}

#[actix_web::test]
async fn department_stats_and_trend() {
    let (_, body) = get(
        state(),
        "/api/v1/departments/1/attendance-stats?startDate=2025-03-03&endDate=2025-03-04",
    )
    .await;
    assert_eq!(body["data"]["total_attendance_records"], 4);
    assert_eq!(body["data"]["attendance_percentage"], 75.0);

    let (_, body) = get(state(), "/api/v1/departments/2/attendance-trend?months=3").await;
    let buckets = body["data"].as_array().unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0]["month"], "2025-03-01");
    assert_eq!(buckets[0]["total_days"], 2);

    let (_, body) = get(state(), "/api/v1/employees/1/attendance-summary?startDate=2025-03-01&periodType=week").await;
    assert_eq!(body["data"]["total_days"], 3);
    assert_eq!(body["data"]["overtime"], 1);
    assert_eq!(body["data"]["late"], 2);
}

#[actix_web::test]
async fn period_with_employee_and_department_intersects() {
    let (status, body) = get(
        state(),
        "/api/v1/attendance/period?startDate=2025-03-03&endDate=2025-03-05&employeeId=1&departmentId=2",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = get(
        state(),
        "/api/v1/attendance/period?startDate=2025-03-03&endDate=2025-03-05&employeeId=3&departmentId=2",
    )
    .await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employee_id"], 3);
    assert_eq!(rows[0]["total_days"], 2);
}
