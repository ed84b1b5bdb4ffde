use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::model::status::ViolationKind;

const DATE_FORMAT_HINT: &str = "Invalid date format. Use YYYY-MM-DD";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PeriodType {
    Day,
    Week,
    Month,
    #[default]
    Custom,
}

/// Inclusive calendar range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportRange {
    #[schema(example = "2025-03-01", format = "date", value_type = String)]
    pub start: NaiveDate,
    #[schema(example = "2025-03-31", format = "date", value_type = String)]
    pub end: NaiveDate,
}

impl ReportRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every date in the range, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self::new(start, end)
    }

    pub fn month(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self::month_of)
    }

    /// The last `days` days ending at `today`, inclusive of both ends.
    pub fn trailing_days(today: NaiveDate, days: u32) -> Self {
        let start = today.checked_sub_days(Days::new(days as u64)).unwrap_or(today);
        Self::new(start, today)
    }

    /// From the same day `months` calendar months back up to `today`.
    pub fn trailing_months(today: NaiveDate, months: u32) -> Self {
        let start = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(today);
        Self::new(start, today)
    }
}

/// Filters accepted by the attendance and report endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Restrict to one employee
    pub employee_id: Option<i64>,
    /// Restrict to one department
    pub department_id: Option<i64>,
    /// First day of the period (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Last day of the period (YYYY-MM-DD), required for custom periods
    pub end_date: Option<String>,
    /// day | week | month | custom (default)
    pub period_type: Option<PeriodType>,
}

/// Validated form of [`AttendanceQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceFilters {
    pub employee_id: Option<i64>,
    pub department_id: Option<i64>,
    pub period_type: PeriodType,
    pub range: ReportRange,
}

impl AttendanceQuery {
    pub fn validate(&self) -> Result<AttendanceFilters, ApiError> {
        let mut problems = Vec::new();
        let period_type = self.period_type.unwrap_or_default();

        let start = match self.start_date.as_deref() {
            None => {
                problems.push("startDate is required".to_string());
                None
            }
            Some(raw) => parse_date("startDate", raw).map_err(|e| problems.push(e)).ok(),
        };

        let end = match self.end_date.as_deref() {
            None if period_type == PeriodType::Custom => {
                problems.push("endDate is required for a custom period".to_string());
                None
            }
            None => None,
            Some(raw) => parse_date("endDate", raw).map_err(|e| problems.push(e)).ok(),
        };

        if let (Some(start), Some(end)) = (start, end) {
            if period_type == PeriodType::Custom && end < start {
                problems.push("endDate must not be before startDate".to_string());
            }
        }

        if !problems.is_empty() {
            return Err(ApiError::Validation(problems));
        }

        // both present past this point for custom; start always present
        let start = start.ok_or_else(|| ApiError::validation("startDate is required"))?;
        let range = match period_type {
            PeriodType::Day => ReportRange::single(start),
            PeriodType::Week => ReportRange::new(
                start,
                start.checked_add_days(Days::new(6)).unwrap_or(start),
            ),
            PeriodType::Month => ReportRange::month_of(start),
            PeriodType::Custom => ReportRange::new(
                start,
                end.ok_or_else(|| ApiError::validation("endDate is required for a custom period"))?,
            ),
        };

        Ok(AttendanceFilters {
            employee_id: self.employee_id,
            department_id: self.department_id,
            period_type,
            range,
        })
    }
}

/// Single-day lists (absent, late, early leave, overtime, daily stats).
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DayQuery {
    /// Day to report on (YYYY-MM-DD); defaults to today
    pub date: Option<String>,
    /// Restrict to one department
    pub department_id: Option<i64>,
}

impl DayQuery {
    pub fn date_or(&self, today: NaiveDate) -> Result<NaiveDate, ApiError> {
        match self.date.as_deref() {
            Some(raw) => parse_date("date", raw).map_err(ApiError::validation),
            None => Ok(today),
        }
    }

    pub fn required_date(&self) -> Result<NaiveDate, ApiError> {
        match self.date.as_deref() {
            Some(raw) => parse_date("date", raw).map_err(ApiError::validation),
            None => Err(ApiError::validation(
                "date parameter is required (format: YYYY-MM-DD)",
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ViolationQuery {
    /// Month number, 1-12
    pub month: Option<u32>,
    /// Four digit year
    pub year: Option<i32>,
    /// absent | late
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ViolationQuery {
    pub fn validate(&self) -> Result<(ReportRange, ViolationKind), ApiError> {
        let mut problems = Vec::new();

        let kind = match self.kind.as_deref() {
            Some(raw) => ViolationKind::from_str(raw)
                .map_err(|_| problems.push("type must be one of: absent, late".to_string()))
                .ok(),
            None => {
                problems.push("type is required (absent | late)".to_string());
                None
            }
        };

        let range = match (self.year, self.month) {
            (Some(year), Some(month)) => ReportRange::month(year, month).or_else(|| {
                problems.push("month must be between 1 and 12".to_string());
                None
            }),
            _ => {
                problems.push("month and year are required".to_string());
                None
            }
        };

        match (range, kind) {
            (Some(range), Some(kind)) if problems.is_empty() => Ok((range, kind)),
            _ => Err(ApiError::Validation(problems)),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    /// Four digit year; defaults to the current year
    pub year: Option<i32>,
    /// Month number, 1-12; defaults to the current month
    pub month: Option<u32>,
}

impl MonthQuery {
    pub fn range_or(&self, today: NaiveDate) -> Result<ReportRange, ApiError> {
        let year = self.year.unwrap_or(today.year());
        let month = self.month.unwrap_or(today.month());
        ReportRange::month(year, month)
            .ok_or_else(|| ApiError::validation("month must be between 1 and 12"))
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendQuery {
    /// Number of trailing days (daily trend), default 30
    pub days: Option<i64>,
    /// Number of trailing months (monthly trend), default 6
    pub months: Option<i64>,
}

impl TrendQuery {
    pub fn days(&self) -> Result<u32, ApiError> {
        positive("days", self.days.unwrap_or(30))
    }

    pub fn months(&self) -> Result<u32, ApiError> {
        positive("months", self.months.unwrap_or(6))
    }
}

fn positive(name: &str, value: i64) -> Result<u32, ApiError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ApiError::validation(format!("{name} parameter must be a positive number")))
}

/// Strict `YYYY-MM-DD`.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, String> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !shaped {
        return Err(format!("{field}: {DATE_FORMAT_HINT}"));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| format!("{field}: {DATE_FORMAT_HINT}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn query(start: Option<&str>, end: Option<&str>, period: Option<PeriodType>) -> AttendanceQuery {
        AttendanceQuery {
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            period_type: period,
            ..Default::default()
        }
    }

    fn problems(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(p) => p,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn strict_date_format() {
        assert_eq!(parse_date("startDate", "2025-03-04"), Ok(d(2025, 3, 4)));
        assert!(parse_date("startDate", "2025-3-4").is_err());
        assert!(parse_date("startDate", "04/03/2025").is_err());
        assert!(parse_date("startDate", "2025-02-30").is_err());
        assert!(parse_date("startDate", "+2025-03-04").is_err());
    }

    #[test]
    fn missing_start_is_rejected() {
        let err = query(None, Some("2025-03-10"), None).validate().unwrap_err();
        assert_eq!(problems(err), vec!["startDate is required".to_string()]);
    }

    #[test]
    fn custom_without_end_is_rejected() {
        let err = query(Some("2025-03-01"), None, Some(PeriodType::Custom))
            .validate()
            .unwrap_err();
        assert_eq!(problems(err).len(), 1);

        // custom is also the default
        assert!(query(Some("2025-03-01"), None, None).validate().is_err());
    }

    #[test]
    fn all_problems_are_reported_together() {
        let err = query(Some("bad"), Some("also-bad"), None).validate().unwrap_err();
        assert_eq!(problems(err).len(), 2);
    }

    #[test]
    fn reversed_custom_range_is_rejected() {
        assert!(query(Some("2025-03-10"), Some("2025-03-01"), None).validate().is_err());
    }

    #[test]
    fn periods_resolve_to_ranges() {
        let day = query(Some("2025-03-04"), None, Some(PeriodType::Day)).validate().unwrap();
        assert_eq!(day.range, ReportRange::single(d(2025, 3, 4)));

        let week = query(Some("2025-03-04"), None, Some(PeriodType::Week)).validate().unwrap();
        assert_eq!(week.range, ReportRange::new(d(2025, 3, 4), d(2025, 3, 10)));

        let month = query(Some("2024-02-14"), None, Some(PeriodType::Month)).validate().unwrap();
        assert_eq!(month.range, ReportRange::new(d(2024, 2, 1), d(2024, 2, 29)));

        let custom = query(Some("2025-03-01"), Some("2025-03-05"), None).validate().unwrap();
        assert_eq!(custom.range, ReportRange::new(d(2025, 3, 1), d(2025, 3, 5)));
        assert_eq!(custom.range.dates().count(), 5);
    }

    #[test]
    fn violation_query_validation() {
        let ok = ViolationQuery {
            month: Some(12),
            year: Some(2024),
            kind: Some("late".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok, (ReportRange::new(d(2024, 12, 1), d(2024, 12, 31)), ViolationKind::Late));

        let err = ViolationQuery {
            month: Some(13),
            year: Some(2024),
            kind: Some("sleepy".to_string()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(problems(err).len(), 2);
    }

    #[test]
    fn trend_parameters_must_be_positive() {
        assert_eq!(TrendQuery::default().days().unwrap(), 30);
        assert_eq!(TrendQuery::default().months().unwrap(), 6);
        assert!(TrendQuery { days: Some(0), months: None }.days().is_err());
        assert!(TrendQuery { days: None, months: Some(-2) }.months().is_err());
    }

    #[test]
    fn trailing_months_keeps_the_day_of_month() {
        let range = ReportRange::trailing_months(d(2025, 3, 5), 6);
        assert_eq!(range.start, d(2024, 9, 5));
        assert_eq!(range.end, d(2025, 3, 5));

        let clamped = ReportRange::trailing_months(d(2025, 3, 31), 1);
        assert_eq!(clamped.start, d(2025, 2, 28));
    }
}
