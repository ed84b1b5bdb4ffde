use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Outcome of classifying one attendance record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    Present,
    Absent,
    Late,
    EarlyLeave,
    Overtime,
}

/// Why an employee was away, derived from the pay code alias.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AbsenceReason {
    SickLeave,
    VacationLeave,
    MaternalLeave,
    AnnualLeave,
    BusinessTrip,
    UnauthorizedAbsence,
}

impl AbsenceReason {
    /// Keyword matched against the pay code alias, in match order.
    /// `UnauthorizedAbsence` has none: it is the fallback for a missing clock-in.
    pub const KEYWORDS: [(&'static str, AbsenceReason); 5] = [
        ("sick", AbsenceReason::SickLeave),
        ("vacation", AbsenceReason::VacationLeave),
        ("maternal", AbsenceReason::MaternalLeave),
        ("annual", AbsenceReason::AnnualLeave),
        ("business", AbsenceReason::BusinessTrip),
    ];
}

/// Violation tracked by the repeated-violation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViolationKind {
    Absent,
    Late,
}

impl ViolationKind {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            ViolationKind::Absent => status == Status::Absent,
            ViolationKind::Late => status == Status::Late,
        }
    }
}
