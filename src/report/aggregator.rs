use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, is_weekend, week_day_name};
use crate::model::employee::EmployeeLabel;
use crate::model::filter::ReportRange;
use crate::model::roster::Roster;
use crate::model::status::{AbsenceReason, Status, ViolationKind};
use crate::report::classifier::{self, Classification, ClassifierRules};

/// Which calendar days count towards reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WeekendPolicy {
    /// Every date counts, Saturday and Sunday included.
    #[default]
    Calendar,
    /// Saturday and Sunday are dropped from every count and denominator.
    Workweek,
}

impl WeekendPolicy {
    pub fn counts(&self, date: NaiveDate) -> bool {
        match self {
            WeekendPolicy::Calendar => true,
            WeekendPolicy::Workweek => !is_weekend(date),
        }
    }
}

/// Everything one deployment's reports are computed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportPolicy {
    pub rules: ClassifierRules,
    pub weekend: WeekendPolicy,
    /// Minimum matching days in a month for the repeated-violation report.
    pub violation_threshold: u32,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            rules: ClassifierRules::default(),
            weekend: WeekendPolicy::default(),
            violation_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub early_leave: u32,
    pub overtime: u32,
}

impl StatusCounts {
    fn add(&mut self, status: Status) {
        match status {
            Status::Present => self.present += 1,
            Status::Absent => self.absent += 1,
            Status::Late => self.late += 1,
            Status::EarlyLeave => self.early_leave += 1,
            Status::Overtime => self.overtime += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReasonCounts {
    pub sick_leave: u32,
    pub vacation_leave: u32,
    pub maternal_leave: u32,
    pub annual_leave: u32,
    pub business_trip: u32,
    pub unauthorized_absence: u32,
}

impl ReasonCounts {
    fn add(&mut self, reason: AbsenceReason) {
        match reason {
            AbsenceReason::SickLeave => self.sick_leave += 1,
            AbsenceReason::VacationLeave => self.vacation_leave += 1,
            AbsenceReason::MaternalLeave => self.maternal_leave += 1,
            AbsenceReason::AnnualLeave => self.annual_leave += 1,
            AbsenceReason::BusinessTrip => self.business_trip += 1,
            AbsenceReason::UnauthorizedAbsence => self.unauthorized_absence += 1,
        }
    }
}

/// Running totals for one group of classified records.
#[derive(Debug, Default)]
struct Tally {
    records: u32,
    statuses: StatusCounts,
    reasons: ReasonCounts,
    hours_sum: f64,
    hours_days: u32,
    employees: HashSet<i64>,
}

impl Tally {
    fn add(&mut self, record: &AttendanceRecord, c: Classification) {
        self.records += 1;
        self.statuses.add(c.status);
        if let Some(reason) = c.absence_reason {
            self.reasons.add(reason);
        }
        if let Some(hours) = record.hours_worked() {
            self.hours_sum += hours;
            self.hours_days += 1;
        }
        self.employees.insert(record.employee_id);
    }

    /// Days with a clock-in, whatever their status.
    fn attended(&self) -> u32 {
        self.records - self.statuses.absent
    }

    fn attendance_percentage(&self) -> Option<f64> {
        percentage(self.attended(), self.records)
    }

    fn total_hours(&self) -> f64 {
        round2(self.hours_sum)
    }

    fn avg_hours(&self) -> Option<f64> {
        (self.hours_days > 0).then(|| round2(self.hours_sum / self.hours_days as f64))
    }
}

/// `part / whole * 100` rounded half-up to 2 decimals; `None` when `whole` is 0.
pub fn percentage(part: u32, whole: u32) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    let (part, whole) = (part as u64, whole as u64);
    let hundredths = (part * 20_000 + whole) / (2 * whole);
    Some(hundredths as f64 / 100.0)
}

/// Round half-up to 2 decimals (inputs here are never negative).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySummary {
    #[schema(example = "2025-03-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Tuesday")]
    pub week_day: String,
    pub is_weekend: bool,
    pub total_employees: u32,
    #[serde(flatten)]
    pub statuses: StatusCounts,
    /// Employees who clocked in (any status but absent).
    pub attended: u32,
    #[serde(flatten)]
    pub reasons: ReasonCounts,
    #[schema(example = 92.5, nullable = true)]
    pub attendance_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeePeriodSummary {
    #[serde(flatten)]
    pub employee: EmployeeLabel,
    pub total_days: u32,
    #[serde(flatten)]
    pub statuses: StatusCounts,
    pub attended: u32,
    #[serde(flatten)]
    pub reasons: ReasonCounts,
    #[schema(example = 171.25)]
    pub total_hours_worked: f64,
    #[schema(example = 8.56, nullable = true)]
    pub avg_daily_hours: Option<f64>,
    #[schema(example = 95.0, nullable = true)]
    pub attendance_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DepartmentSummary {
    pub department_id: i64,
    pub dept_code: String,
    pub dept_name: String,
    pub total_employees: u32,
    pub total_attendance_records: u32,
    #[serde(flatten)]
    pub statuses: StatusCounts,
    pub attended: u32,
    #[serde(flatten)]
    pub reasons: ReasonCounts,
    /// `null` when the department has no attendance rows in range.
    #[schema(example = 88.24, nullable = true)]
    pub attendance_percentage: Option<f64>,
    #[schema(example = 8.1, nullable = true)]
    pub avg_hours_worked: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RepeatedViolation {
    #[serde(flatten)]
    pub employee: EmployeeLabel,
    pub violation_count: u32,
    #[schema(value_type = Vec<String>, example = json!(["2025-03-03", "2025-03-05", "2025-03-12"]))]
    pub violation_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OverallSummary {
    pub range: ReportRange,
    pub total_employees: u32,
    pub total_days: u32,
    #[serde(flatten)]
    pub statuses: StatusCounts,
    pub attended: u32,
    #[serde(flatten)]
    pub reasons: ReasonCounts,
    #[schema(nullable = true)]
    pub attendance_percentage: Option<f64>,
    pub total_hours_worked: f64,
    #[schema(nullable = true)]
    pub avg_daily_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrendBucket {
    /// First day of the month the bucket covers.
    #[schema(example = "2025-03-01", format = "date", value_type = String)]
    pub month: NaiveDate,
    pub total_employees: u32,
    pub total_days: u32,
    #[serde(flatten)]
    pub statuses: StatusCounts,
    pub attended: u32,
    #[schema(nullable = true)]
    pub attendance_percentage: Option<f64>,
}

/// One record with its classification, as listed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub employee: EmployeeLabel,
    #[schema(nullable = true)]
    pub department_id: Option<i64>,
    #[schema(example = "2025-03-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub week_day: String,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u32,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub clock_in: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub clock_out: Option<NaiveDateTime>,
    #[schema(example = 8.58, nullable = true)]
    pub hours_worked: Option<f64>,
    #[schema(nullable = true)]
    pub pay_code_alias: Option<String>,
    pub status: Status,
    #[schema(nullable = true)]
    pub absence_reason: Option<AbsenceReason>,
}

/// Classified record plus the measure its status list is ordered by.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatusEntry {
    #[serde(flatten)]
    pub record: ClassifiedRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_late: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_early: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overtime_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TodayReport {
    #[schema(example = "2025-03-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub is_weekend: bool,
    pub total_employees: u32,
    pub present_today: u32,
    pub absent_today: u32,
    pub late_count: u32,
    pub early_leave_count: u32,
    pub overtime_count: u32,
    #[schema(nullable = true)]
    pub attendance_percentage: Option<f64>,
    pub present_employees: Vec<ClassifiedRecord>,
    pub absent_employees: Vec<ClassifiedRecord>,
}

/// Pure report computations over already-fetched records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    policy: ReportPolicy,
}

impl Aggregator {
    pub fn new(policy: ReportPolicy) -> Self {
        Self { policy }
    }

    pub fn classify(&self, record: &AttendanceRecord) -> Classification {
        classifier::classify(record, &self.policy.rules)
    }

    /// Records the weekend policy lets through, with their classification.
    fn classified<'a>(
        &'a self,
        records: &'a [AttendanceRecord],
    ) -> impl Iterator<Item = (&'a AttendanceRecord, Classification)> + 'a {
        records
            .iter()
            .filter(|r| self.policy.weekend.counts(r.date))
            .map(|r| (r, self.classify(r)))
    }

    fn describe(&self, record: &AttendanceRecord, c: Classification, roster: &Roster) -> ClassifiedRecord {
        ClassifiedRecord {
            employee: roster.label(record.employee_id),
            department_id: record.department_id,
            date: record.date,
            week_day: week_day_name(record.date),
            day_of_week: record.day_of_week(),
            clock_in: record.clock_in,
            clock_out: record.clock_out,
            hours_worked: record.hours_worked().map(round2),
            pay_code_alias: record.pay_code_alias.clone(),
            status: c.status,
            absence_reason: c.absence_reason,
        }
    }

    /// Every counted record, newest date first, then by name.
    pub fn classified_records(&self, records: &[AttendanceRecord], roster: &Roster) -> Vec<ClassifiedRecord> {
        let mut out: Vec<ClassifiedRecord> = self
            .classified(records)
            .map(|(r, c)| self.describe(r, c, roster))
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| by_name(&a.employee, &b.employee)));
        out
    }

    /// Per-date counts over the records given, newest date first.
    pub fn daily_summary(&self, records: &[AttendanceRecord]) -> Vec<DailySummary> {
        let mut days: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
        for (record, c) in self.classified(records) {
            days.entry(record.date).or_default().add(record, c);
        }

        days.into_iter()
            .rev()
            .map(|(date, tally)| daily_row(date, &tally, tally.records))
            .collect()
    }

    /// Per-employee counts over a period. Every roster employee gets a row,
    /// with zero counts when they have no records.
    pub fn period_summary(&self, records: &[AttendanceRecord], roster: &Roster) -> Vec<EmployeePeriodSummary> {
        let mut per_employee: HashMap<i64, Tally> =
            roster.employees().iter().map(|e| (e.id, Tally::default())).collect();

        for (record, c) in self.classified(records) {
            per_employee.entry(record.employee_id).or_default().add(record, c);
        }

        let mut out: Vec<EmployeePeriodSummary> = per_employee
            .into_iter()
            .map(|(employee_id, tally)| EmployeePeriodSummary {
                employee: roster.label(employee_id),
                total_days: tally.records,
                statuses: tally.statuses,
                attended: tally.attended(),
                reasons: tally.reasons,
                total_hours_worked: tally.total_hours(),
                avg_daily_hours: tally.avg_hours(),
                attendance_percentage: tally.attendance_percentage(),
            })
            .collect();

        out.sort_by(|a, b| {
            a.employee
                .dept_name
                .cmp(&b.employee.dept_name)
                .then_with(|| by_name(&a.employee, &b.employee))
        });
        out
    }

    /// Per-department counts. Departments without rows in range report a
    /// `null` percentage. Ordered by percentage (highest first, `null` last),
    /// then name.
    pub fn department_summary(&self, records: &[AttendanceRecord], roster: &Roster) -> Vec<DepartmentSummary> {
        let mut headcount: HashMap<i64, u32> = HashMap::new();
        for employee in roster.employees() {
            if let Some(dept) = employee.department_id {
                *headcount.entry(dept).or_default() += 1;
            }
        }

        let mut per_dept: HashMap<i64, Tally> = HashMap::new();
        for (record, c) in self.classified(records) {
            let dept = record
                .department_id
                .or_else(|| roster.employee(record.employee_id).and_then(|e| e.department_id));
            if let Some(dept) = dept {
                per_dept.entry(dept).or_default().add(record, c);
            }
        }

        let mut out: Vec<DepartmentSummary> = roster
            .departments()
            .iter()
            .map(|d| {
                let tally = per_dept.remove(&d.id).unwrap_or_default();
                DepartmentSummary {
                    department_id: d.id,
                    dept_code: d.dept_code.clone(),
                    dept_name: d.dept_name.clone(),
                    total_employees: headcount.get(&d.id).copied().unwrap_or(0),
                    total_attendance_records: tally.records,
                    statuses: tally.statuses,
                    attended: tally.attended(),
                    reasons: tally.reasons,
                    attendance_percentage: tally.attendance_percentage(),
                    avg_hours_worked: tally.avg_hours(),
                }
            })
            .collect();

        out.sort_by(|a, b| {
            by_percentage_desc(a.attendance_percentage, b.attendance_percentage)
                .then_with(|| a.dept_name.cmp(&b.dept_name))
        });
        out
    }

    /// Employees with at least `violation_threshold` matching days in `month`,
    /// most violations first. Dates are ascending.
    pub fn repeated_violations(
        &self,
        records: &[AttendanceRecord],
        month: ReportRange,
        kind: ViolationKind,
        roster: &Roster,
    ) -> Vec<RepeatedViolation> {
        let mut dates: HashMap<i64, Vec<NaiveDate>> = HashMap::new();
        for (record, c) in self.classified(records) {
            if month.contains(record.date) && kind.matches(c.status) {
                dates.entry(record.employee_id).or_default().push(record.date);
            }
        }

        let threshold = self.policy.violation_threshold;
        let mut out: Vec<RepeatedViolation> = dates
            .into_iter()
            .filter(|(_, d)| d.len() as u32 >= threshold)
            .map(|(employee_id, mut d)| {
                d.sort();
                RepeatedViolation {
                    employee: roster.label(employee_id),
                    violation_count: d.len() as u32,
                    violation_dates: d,
                }
            })
            .collect();

        out.sort_by(|a, b| {
            b.violation_count
                .cmp(&a.violation_count)
                .then_with(|| a.employee.dept_name.cmp(&b.employee.dept_name))
                .then_with(|| by_name(&a.employee, &b.employee))
        });
        out
    }

    /// Totals across all records in `range`.
    pub fn overall_summary(&self, records: &[AttendanceRecord], range: ReportRange) -> OverallSummary {
        let mut tally = Tally::default();
        for (record, c) in self.classified(records) {
            if range.contains(record.date) {
                tally.add(record, c);
            }
        }

        OverallSummary {
            range,
            total_employees: tally.employees.len() as u32,
            total_days: tally.records,
            statuses: tally.statuses,
            attended: tally.attended(),
            reasons: tally.reasons,
            attendance_percentage: tally.attendance_percentage(),
            total_hours_worked: tally.total_hours(),
            avg_daily_hours: tally.avg_hours(),
        }
    }

    /// Calendar-month buckets, newest first.
    pub fn monthly_trend(&self, records: &[AttendanceRecord]) -> Vec<TrendBucket> {
        let mut months: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
        for (record, c) in self.classified(records) {
            let month = ReportRange::month_of(record.date).start;
            months.entry(month).or_default().add(record, c);
        }

        months
            .into_iter()
            .rev()
            .map(|(month, tally)| TrendBucket {
                month,
                total_employees: tally.employees.len() as u32,
                total_days: tally.records,
                statuses: tally.statuses,
                attended: tally.attended(),
                attendance_percentage: tally.attendance_percentage(),
            })
            .collect()
    }

    /// Records on `date` with the given status, ordered by how far past the
    /// cutoff they are (absences by department and name).
    pub fn status_list(
        &self,
        records: &[AttendanceRecord],
        date: NaiveDate,
        status: Status,
        roster: &Roster,
    ) -> Vec<StatusEntry> {
        let rules = &self.policy.rules;
        let mut out: Vec<StatusEntry> = self
            .classified(records)
            .filter(|(r, c)| r.date == date && c.status == status)
            .map(|(r, c)| StatusEntry {
                record: self.describe(r, c, roster),
                minutes_late: (status == Status::Late)
                    .then(|| classifier::minutes_late(r, rules))
                    .flatten()
                    .map(round2),
                minutes_early: (status == Status::EarlyLeave)
                    .then(|| classifier::minutes_early(r, rules))
                    .flatten()
                    .map(round2),
                overtime_hours: (status == Status::Overtime)
                    .then(|| r.hours_worked().map(|h| round2(h - rules.overtime_hours)))
                    .flatten(),
            })
            .collect();

        out.sort_by(|a, b| {
            let measure = |e: &StatusEntry| {
                e.minutes_late
                    .or(e.minutes_early)
                    .or(e.overtime_hours)
                    .unwrap_or(0.0)
            };
            measure(b)
                .total_cmp(&measure(a))
                .then_with(|| a.record.employee.dept_name.cmp(&b.record.employee.dept_name))
                .then_with(|| by_name(&a.record.employee, &b.record.employee))
        });
        out
    }

    /// Attendance for `date` measured against the active roster: employees
    /// with no record that day count as absent without authorization.
    pub fn today_report(&self, records: &[AttendanceRecord], date: NaiveDate, roster: &Roster) -> TodayReport {
        let weekend = is_weekend(date);
        if !self.policy.weekend.counts(date) {
            return TodayReport {
                date,
                is_weekend: weekend,
                total_employees: 0,
                present_today: 0,
                absent_today: 0,
                late_count: 0,
                early_leave_count: 0,
                overtime_count: 0,
                attendance_percentage: None,
                present_employees: Vec::new(),
                absent_employees: Vec::new(),
            };
        }

        let day = roster_day(records, date, roster);
        let mut present = Vec::new();
        let mut absent = Vec::new();
        let mut tally = Tally::default();

        for record in &day {
            let c = self.classify(record);
            tally.add(record, c);
            let row = self.describe(record, c, roster);
            if c.status == Status::Absent {
                absent.push(row);
            } else {
                present.push(row);
            }
        }

        present.sort_by(|a, b| by_name(&a.employee, &b.employee));
        absent.sort_by(|a, b| {
            a.employee
                .dept_name
                .cmp(&b.employee.dept_name)
                .then_with(|| by_name(&a.employee, &b.employee))
        });

        TodayReport {
            date,
            is_weekend: weekend,
            total_employees: tally.records,
            present_today: tally.attended(),
            absent_today: tally.statuses.absent,
            late_count: tally.statuses.late,
            early_leave_count: tally.statuses.early_leave,
            overtime_count: tally.statuses.overtime,
            attendance_percentage: tally.attendance_percentage(),
            present_employees: present,
            absent_employees: absent,
        }
    }

    /// One roster-based row per day from Monday of `today`'s week up to
    /// `today`, oldest first.
    pub fn weekly_report(&self, records: &[AttendanceRecord], today: NaiveDate, roster: &Roster) -> Vec<DailySummary> {
        ReportRange::new(Self::week_start(today), today)
            .dates()
            .filter(|d| self.policy.weekend.counts(*d))
            .map(|date| {
                let day = roster_day(records, date, roster);
                let mut tally = Tally::default();
                for record in &day {
                    tally.add(record, self.classify(record));
                }
                daily_row(date, &tally, tally.records)
            })
            .collect()
    }

    /// Start of the week containing `date` (Monday).
    pub fn week_start(date: NaiveDate) -> NaiveDate {
        date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
            .unwrap_or(date)
    }
}

fn daily_row(date: NaiveDate, tally: &Tally, total: u32) -> DailySummary {
    DailySummary {
        date,
        week_day: week_day_name(date),
        is_weekend: is_weekend(date),
        total_employees: total,
        statuses: tally.statuses,
        attended: tally.attended(),
        reasons: tally.reasons,
        attendance_percentage: percentage(tally.attended(), total),
    }
}

/// Records on `date` for active roster employees, plus an empty record for
/// every active employee who has none. Falls back to the raw records for
/// that date when the roster has no active employees.
fn roster_day(records: &[AttendanceRecord], date: NaiveDate, roster: &Roster) -> Vec<AttendanceRecord> {
    let on_date = records.iter().filter(|r| r.date == date);
    let active: Vec<_> = roster.active_employees().collect();
    if active.is_empty() {
        return on_date.cloned().collect();
    }

    let ids: HashSet<i64> = active.iter().map(|e| e.id).collect();
    let mut day: Vec<AttendanceRecord> = on_date.filter(|r| ids.contains(&r.employee_id)).cloned().collect();
    let seen: HashSet<i64> = day.iter().map(|r| r.employee_id).collect();

    day.extend(active.iter().filter(|e| !seen.contains(&e.id)).map(|e| AttendanceRecord {
        employee_id: e.id,
        department_id: e.department_id,
        date,
        clock_in: None,
        clock_out: None,
        payload_duration: None,
        pay_code_alias: None,
    }));
    day
}

fn by_name(a: &EmployeeLabel, b: &EmployeeLabel) -> Ordering {
    a.first_name
        .cmp(&b.first_name)
        .then_with(|| a.last_name.cmp(&b.last_name))
        .then_with(|| a.employee_id.cmp(&b.employee_id))
}

fn by_percentage_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort employee rows by attendance percentage, highest first, `null` last.
pub fn rank_by_attendance(rows: &mut [EmployeePeriodSummary]) {
    rows.sort_by(|a, b| {
        by_percentage_desc(a.attendance_percentage, b.attendance_percentage)
            .then_with(|| by_name(&a.employee, &b.employee))
    });
}
