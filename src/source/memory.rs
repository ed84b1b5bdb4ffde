use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use crate::model::attendance::{AttendanceRecord, merge_records};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::source::{AttendanceSource, RecordScope};

/// Records and directory held in memory, e.g. loaded from a JSON export:
///
/// ```json
/// { "departments": [...], "employees": [...], "records": [...] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Dataset,
}

impl MemorySource {
    /// Rows sharing an (employee, date) are merged into one record.
    pub fn new(mut data: Dataset) -> Self {
        data.records = merge_records(std::mem::take(&mut data.records));
        Self { data }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file {}", path.display()))?;
        let data: Dataset = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse data file {}", path.display()))?;

        log::info!(
            "Loaded {} records, {} employees, {} departments from {}",
            data.records.len(),
            data.employees.len(),
            data.departments.len(),
            path.display()
        );
        Ok(Self::new(data))
    }

    fn department_of(&self, record: &AttendanceRecord) -> Option<i64> {
        record.department_id.or_else(|| {
            self.data
                .employees
                .iter()
                .find(|e| e.id == record.employee_id)
                .and_then(|e| e.department_id)
        })
    }
}

#[async_trait]
impl AttendanceSource for MemorySource {
    async fn records(&self, scope: &RecordScope) -> anyhow::Result<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .data
            .records
            .iter()
            .filter(|r| scope.range.contains(r.date))
            .filter(|r| scope.employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| {
                scope
                    .department_id
                    .is_none_or(|id| self.department_of(r) == Some(id))
            })
            .cloned()
            .collect();

        records.sort_by(|a, b| b.date.cmp(&a.date).then(a.employee_id.cmp(&b.employee_id)));
        Ok(records)
    }

    async fn employees(&self) -> anyhow::Result<Vec<Employee>> {
        Ok(self.data.employees.clone())
    }

    async fn departments(&self) -> anyhow::Result<Vec<Department>> {
        Ok(self.data.departments.clone())
    }
}
