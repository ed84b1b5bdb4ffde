use async_trait::async_trait;

use crate::model::attendance::AttendanceRecord;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::filter::ReportRange;

pub mod memory;
pub mod postgres;

pub use memory::MemorySource;
pub use postgres::PgSource;

/// Which records a report needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordScope {
    pub range: ReportRange,
    pub employee_id: Option<i64>,
    pub department_id: Option<i64>,
}

impl RecordScope {
    pub fn range(range: ReportRange) -> Self {
        Self {
            range,
            employee_id: None,
            department_id: None,
        }
    }

    pub fn employee(mut self, employee_id: Option<i64>) -> Self {
        self.employee_id = employee_id;
        self
    }

    pub fn department(mut self, department_id: Option<i64>) -> Self {
        self.department_id = department_id;
        self
    }
}

/// Where attendance records and the employee directory come from.
#[async_trait]
pub trait AttendanceSource: Send + Sync {
    /// One record per (employee, date) inside `scope`.
    async fn records(&self, scope: &RecordScope) -> anyhow::Result<Vec<AttendanceRecord>>;

    async fn employees(&self) -> anyhow::Result<Vec<Employee>>;

    async fn departments(&self) -> anyhow::Result<Vec<Department>>;
}
