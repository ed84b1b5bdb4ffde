use crate::api::attendance::{DailyStats, EmployeeMonthlyReport};
use crate::api::directory::DepartmentDetail;
use crate::model::department::Department;
use crate::model::employee::{Employee, EmployeeLabel};
use crate::model::filter::{PeriodType, ReportRange};
use crate::model::status::{AbsenceReason, Status, ViolationKind};
use crate::report::aggregator::{
    ClassifiedRecord, DailySummary, DepartmentSummary, EmployeePeriodSummary, OverallSummary,
    ReasonCounts, RepeatedViolation, StatusCounts, StatusEntry, TodayReport, TrendBucket,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Report API",
        version = "1.0.0",
        description = r#"
## Attendance Reporting

Read-only reports over time clock data. Every record is classified as
**present**, **absent**, **late**, **early_leave** or **overtime**, and
absences carry a reason taken from the pay code (sick, vacation, maternal,
annual, business trip, or unauthorized when nobody clocked in).

### Response Format
Every response is wrapped as
`{ "success": bool, "data": ..., "message"?: string | string[], "statusCode": int }`.

### Dates
All dates are `YYYY-MM-DD`. `periodType` is `day`, `week`, `month` or `custom`
(the default, which needs `endDate`).
"#,
    ),
    paths(
        crate::api::attendance::records,
        crate::api::attendance::summary,
        crate::api::attendance::period,
        crate::api::attendance::department_summary,
        crate::api::attendance::employee_monthly,
        crate::api::attendance::absent,
        crate::api::attendance::late,
        crate::api::attendance::early_leave,
        crate::api::attendance::overtime,
        crate::api::attendance::daily_stats,
        crate::api::attendance::repeated_violations,

        crate::api::reports::today,
        crate::api::reports::weekly,
        crate::api::reports::monthly,
        crate::api::reports::attendance_trend,
        crate::api::reports::department_performance,
        crate::api::reports::employee_performance,

        crate::api::directory::list_departments,
        crate::api::directory::get_department,
        crate::api::directory::department_attendance_stats,
        crate::api::directory::department_employees,
        crate::api::directory::department_attendance_trend,
        crate::api::directory::list_employees,
        crate::api::directory::get_employee,
        crate::api::directory::employee_attendance_summary,
        crate::api::directory::employee_attendance_trend
    ),
    components(
        schemas(
            Status,
            AbsenceReason,
            ViolationKind,
            PeriodType,
            ReportRange,
            Employee,
            EmployeeLabel,
            Department,
            DepartmentDetail,
            StatusCounts,
            ReasonCounts,
            ClassifiedRecord,
            StatusEntry,
            DailySummary,
            DailyStats,
            EmployeePeriodSummary,
            EmployeeMonthlyReport,
            DepartmentSummary,
            RepeatedViolation,
            OverallSummary,
            TrendBucket,
            TodayReport
        )
    ),
    tags(
        (name = "Attendance", description = "Classified records, summaries and status lists"),
        (name = "Reports", description = "Dashboard reports relative to today"),
        (name = "Directory", description = "Departments and employees"),
    )
)]
pub struct ApiDoc;
