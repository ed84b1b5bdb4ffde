use crate::api::{attendance, directory, reports};
use crate::error::ApiError;
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter shared by every worker.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<LimiterConfig> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min} requests per minute"))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: &LimiterConfig) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(Governor::new(limiter)) // rate limiting
            .service(
                web::scope("/attendance")
                    .route("/records", web::get().to(attendance::records))
                    .route("/summary", web::get().to(attendance::summary))
                    .route("/period", web::get().to(attendance::period))
                    .route("/department-summary", web::get().to(attendance::department_summary))
                    .route("/employee-monthly/{id}", web::get().to(attendance::employee_monthly))
                    .route("/absent", web::get().to(attendance::absent))
                    .route("/late", web::get().to(attendance::late))
                    .route("/early-leave", web::get().to(attendance::early_leave))
                    .route("/overtime", web::get().to(attendance::overtime))
                    .route("/daily-stats", web::get().to(attendance::daily_stats))
                    .route("/repeated-violations", web::get().to(attendance::repeated_violations)),
            )
            .service(
                web::scope("/reports")
                    .route("/today", web::get().to(reports::today))
                    .route("/weekly", web::get().to(reports::weekly))
                    .route("/monthly", web::get().to(reports::monthly))
                    .route("/attendance-trend", web::get().to(reports::attendance_trend))
                    .route("/department-performance", web::get().to(reports::department_performance))
                    .route("/employee-performance", web::get().to(reports::employee_performance)),
            )
            .service(
                web::scope("/departments")
                    // /departments
                    .route("", web::get().to(directory::list_departments))
                    // /departments/{id}
                    .route("/{id}", web::get().to(directory::get_department))
                    .route("/{id}/attendance-stats", web::get().to(directory::department_attendance_stats))
                    .route("/{id}/employees", web::get().to(directory::department_employees))
                    .route("/{id}/attendance-trend", web::get().to(directory::department_attendance_trend)),
            )
            .service(
                web::scope("/employees")
                    // /employees
                    .route("", web::get().to(directory::list_employees))
                    // /employees/{id}
                    .route("/{id}", web::get().to(directory::get_employee))
                    .route("/{id}/attendance-summary", web::get().to(directory::employee_attendance_summary))
                    .route("/{id}/attendance-trend", web::get().to(directory::employee_attendance_trend)),
            ),
    );
}

/// Malformed query strings become validation errors in the response envelope.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::validation(err.to_string()).into())
}

/// Non-numeric ids in the path become validation errors as well.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| ApiError::validation(err.to_string()).into())
}
