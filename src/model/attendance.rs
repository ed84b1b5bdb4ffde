use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One employee's attendance for one working day.
///
/// Built from one or more raw time card rows; extra rows (one per pay code
/// attached to the card) only contribute their `pay_code_alias`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee_id: i64,
    pub department_id: Option<i64>,
    pub date: NaiveDate,
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    /// Worked seconds reported by the terminal payload, if any.
    #[serde(default)]
    pub payload_duration: Option<f64>,
    #[serde(default)]
    pub pay_code_alias: Option<String>,
}

impl AttendanceRecord {
    /// Effective worked seconds: the payload value wins over the clock pair.
    pub fn duration_seconds(&self) -> Option<f64> {
        if let Some(seconds) = self.payload_duration {
            return Some(seconds);
        }
        match (self.clock_in, self.clock_out) {
            (Some(clock_in), Some(clock_out)) => {
                Some((clock_out - clock_in).num_milliseconds() as f64 / 1000.0)
            }
            _ => None,
        }
    }

    pub fn hours_worked(&self) -> Option<f64> {
        self.duration_seconds().map(|s| s / 3600.0)
    }

    /// 0 = Sunday .. 6 = Saturday
    pub fn day_of_week(&self) -> u32 {
        self.date.weekday().num_days_from_sunday()
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn week_day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Raw row as read from the time card tables (one per time card x pay code).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TimeCardRow {
    pub employee_id: i64,
    pub department_id: Option<i64>,
    pub att_date: NaiveDate,
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub payload: Option<String>,
    pub pay_code_alias: Option<String>,
}

/// Pull the worked duration (seconds) out of a time card payload.
///
/// `worked_hrs.duration` is preferred, then `duration.duration`. Terminals
/// write either a number or a numeric string.
pub fn payload_duration(payload: &Value) -> Option<f64> {
    ["worked_hrs", "duration"]
        .iter()
        .find_map(|key| payload.get(key).and_then(|v| v.get("duration")).and_then(as_seconds))
}

fn as_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

impl From<TimeCardRow> for AttendanceRecord {
    fn from(row: TimeCardRow) -> Self {
        let payload_duration = row
            .payload
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .as_ref()
            .and_then(payload_duration);

        Self {
            employee_id: row.employee_id,
            department_id: row.department_id,
            date: row.att_date,
            clock_in: row.clock_in,
            clock_out: row.clock_out,
            payload_duration,
            pay_code_alias: row.pay_code_alias,
        }
    }
}

/// Collapse raw time card rows into one record per (employee, date).
pub fn collapse_rows(rows: Vec<TimeCardRow>) -> Vec<AttendanceRecord> {
    merge_records(rows.into_iter().map(AttendanceRecord::from))
}

/// Merge records sharing an (employee, date) key.
///
/// Input order is kept for the first occurrence of each key. Clock fields
/// and payload come from the first record that has them; distinct pay code
/// aliases are joined with " / ".
pub fn merge_records(records: impl IntoIterator<Item = AttendanceRecord>) -> Vec<AttendanceRecord> {
    let mut merged: Vec<AttendanceRecord> = Vec::new();
    let mut index: HashMap<(i64, NaiveDate), usize> = HashMap::new();

    for record in records {
        let key = (record.employee_id, record.date);
        match index.get(&key) {
            Some(&pos) => {
                let existing = &mut merged[pos];
                existing.clock_in = existing.clock_in.or(record.clock_in);
                existing.clock_out = existing.clock_out.or(record.clock_out);
                existing.payload_duration = existing.payload_duration.or(record.payload_duration);
                existing.department_id = existing.department_id.or(record.department_id);
                if let Some(alias) = record.pay_code_alias {
                    merge_alias(&mut existing.pay_code_alias, alias);
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

fn merge_alias(current: &mut Option<String>, alias: String) {
    match current {
        Some(existing) => {
            if !existing.split(" / ").any(|part| part == alias) {
                existing.push_str(" / ");
                existing.push_str(&alias);
            }
        }
        None => *current = Some(alias),
    }
}
