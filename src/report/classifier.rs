use chrono::NaiveTime;
use serde::Serialize;

use crate::model::attendance::AttendanceRecord;
use crate::model::status::{AbsenceReason, Status};

/// Business-hour thresholds the classifier applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierRules {
    /// Clock-in strictly after this time of day is late.
    pub late_after: NaiveTime,
    /// Clock-out strictly before this time of day is an early leave.
    pub early_leave_before: NaiveTime,
    /// Worked hours strictly above this count as overtime.
    pub overtime_hours: f64,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            late_after: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            early_leave_before: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            overtime_hours: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub status: Status,
    pub absence_reason: Option<AbsenceReason>,
}

/// Classify one record. First matching rule wins:
/// absent, late, early leave, overtime, present.
pub fn classify(record: &AttendanceRecord, rules: &ClassifierRules) -> Classification {
    Classification {
        status: status(record, rules),
        absence_reason: absence_reason(record),
    }
}

pub fn status(record: &AttendanceRecord, rules: &ClassifierRules) -> Status {
    let Some(clock_in) = record.clock_in else {
        return Status::Absent;
    };

    if clock_in.time() > rules.late_after {
        return Status::Late;
    }

    if let Some(clock_out) = record.clock_out {
        if clock_out.time() < rules.early_leave_before {
            return Status::EarlyLeave;
        }
    }

    if record.hours_worked().unwrap_or(0.0) > rules.overtime_hours {
        return Status::Overtime;
    }

    Status::Present
}

/// Leave reason from the pay code alias (case-insensitive, keyword order
/// fixed), else unauthorized when there was no clock-in.
pub fn absence_reason(record: &AttendanceRecord) -> Option<AbsenceReason> {
    if let Some(alias) = record.pay_code_alias.as_deref() {
        let alias = alias.to_lowercase();
        if let Some((_, reason)) = AbsenceReason::KEYWORDS
            .iter()
            .find(|(keyword, _)| alias.contains(keyword))
        {
            return Some(*reason);
        }
    }

    if record.clock_in.is_none() {
        Some(AbsenceReason::UnauthorizedAbsence)
    } else {
        None
    }
}

/// Minutes past the late cutoff, for late records.
pub fn minutes_late(record: &AttendanceRecord, rules: &ClassifierRules) -> Option<f64> {
    record
        .clock_in
        .map(|t| (t.time() - rules.late_after).num_seconds() as f64 / 60.0)
        .filter(|m| *m > 0.0)
}

/// Minutes before the early-leave cutoff, for early leavers.
pub fn minutes_early(record: &AttendanceRecord, rules: &ClassifierRules) -> Option<f64> {
    record
        .clock_out
        .map(|t| (rules.early_leave_before - t.time()).num_seconds() as f64 / 60.0)
        .filter(|m| *m > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    fn record(clock_in: Option<NaiveDateTime>, clock_out: Option<NaiveDateTime>) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: 1,
            department_id: Some(1),
            date: date(),
            clock_in,
            clock_out,
            payload_duration: None,
            pay_code_alias: None,
        }
    }

    #[test]
    fn deterministic() {
        let rules = ClassifierRules::default();
        let r = record(Some(at(9, 30)), Some(at(18, 0)));
        assert_eq!(classify(&r, &rules), classify(&r, &rules));
    }

    #[test]
    fn no_clock_in_is_always_absent() {
        let rules = ClassifierRules::default();
        let mut r = record(None, Some(at(18, 0)));
        r.payload_duration = Some(10.0 * 3600.0);
        r.pay_code_alias = Some("Business trip".to_string());
        assert_eq!(status(&r, &rules), Status::Absent);

        r.payload_duration = Some(0.0);
        assert_eq!(status(&r, &rules), Status::Absent);
    }

    #[test]
    fn late_takes_precedence_over_early_leave() {
        let rules = ClassifierRules::default();
        let r = record(Some(at(9, 30)), Some(at(16, 30)));
        assert_eq!(status(&r, &rules), Status::Late);
    }

    #[test]
    fn clock_in_exactly_at_cutoff_is_not_late() {
        let rules = ClassifierRules::default();
        let r = record(Some(at(9, 0)), Some(at(17, 0)));
        assert_eq!(status(&r, &rules), Status::Present);

        let r = record(Some(date().and_hms_opt(9, 0, 1).unwrap()), Some(at(17, 0)));
        assert_eq!(status(&r, &rules), Status::Late);
    }

    #[test]
    fn early_leave_needs_a_clock_out() {
        let rules = ClassifierRules::default();
        assert_eq!(status(&record(Some(at(8, 0)), None), &rules), Status::Present);
        assert_eq!(
            status(&record(Some(at(8, 0)), Some(at(16, 59))), &rules),
            Status::EarlyLeave
        );
    }

    #[test]
    fn overtime_threshold_is_strict() {
        let rules = ClassifierRules::default();
        let mut r = record(Some(at(8, 0)), Some(at(17, 1)));

        r.payload_duration = Some(8.0 * 3600.0);
        assert_eq!(status(&r, &rules), Status::Present);

        r.payload_duration = Some(8.0001 * 3600.0);
        assert_eq!(status(&r, &rules), Status::Overtime);
    }

    #[test]
    fn overtime_from_clock_pair_without_payload() {
        let rules = ClassifierRules::default();
        let r = record(Some(at(8, 0)), Some(at(18, 0)));
        assert_eq!(status(&r, &rules), Status::Overtime);
    }

    #[test]
    fn reason_keywords_follow_fixed_order() {
        let mut r = record(None, None);
        r.pay_code_alias = Some("Sick and Vacation".to_string());
        assert_eq!(absence_reason(&r), Some(AbsenceReason::SickLeave));

        r.pay_code_alias = Some("ANNUAL business".to_string());
        assert_eq!(absence_reason(&r), Some(AbsenceReason::AnnualLeave));

        r.pay_code_alias = Some("Maternal Leave".to_string());
        assert_eq!(absence_reason(&r), Some(AbsenceReason::MaternalLeave));

        r.pay_code_alias = Some("Business Trip - Berlin".to_string());
        assert_eq!(absence_reason(&r), Some(AbsenceReason::BusinessTrip));
    }

    #[test]
    fn reason_fallbacks() {
        let mut r = record(None, None);
        assert_eq!(absence_reason(&r), Some(AbsenceReason::UnauthorizedAbsence));

        r.pay_code_alias = Some("Training".to_string());
        assert_eq!(absence_reason(&r), Some(AbsenceReason::UnauthorizedAbsence));

        let present = record(Some(at(8, 55)), Some(at(17, 30)));
        assert_eq!(absence_reason(&present), None);
    }

    #[test]
    fn full_day_round_trip() {
        let r = record(Some(at(8, 55)), Some(at(17, 30)));
        let hours = r.hours_worked().unwrap();
        assert!((hours - 8.58).abs() < 0.01);

        // 8.58h is past the default 8h threshold
        let c = classify(&r, &ClassifierRules::default());
        assert_eq!(c.status, Status::Overtime);
        assert_eq!(c.absence_reason, None);

        let relaxed = ClassifierRules {
            overtime_hours: 9.0,
            ..ClassifierRules::default()
        };
        let c = classify(&r, &relaxed);
        assert_eq!(c.status, Status::Present);
        assert_eq!(c.absence_reason, None);
    }

    #[test]
    fn exact_business_day_is_present() {
        let r = record(Some(at(9, 0)), Some(at(17, 0)));
        assert_eq!(status(&r, &ClassifierRules::default()), Status::Present);
    }

    #[test]
    fn custom_rules_move_the_cutoffs() {
        let rules = ClassifierRules {
            late_after: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            early_leave_before: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            overtime_hours: 9.0,
        };
        assert_eq!(status(&record(Some(at(8, 45)), Some(at(17, 0))), &rules), Status::Late);
        assert_eq!(status(&record(Some(at(8, 0)), Some(at(16, 30))), &rules), Status::Present);
    }

    #[test]
    fn minutes_late_and_early() {
        let rules = ClassifierRules::default();
        let r = record(Some(at(9, 45)), Some(at(16, 30)));
        assert_eq!(minutes_late(&r, &rules), Some(45.0));
        assert_eq!(minutes_early(&r, &rules), Some(30.0));

        let on_time = record(Some(at(8, 0)), Some(at(17, 30)));
        assert_eq!(minutes_late(&on_time, &rules), None);
        assert_eq!(minutes_early(&on_time, &rules), None);
    }
}
