use anyhow::Context;
use async_trait::async_trait;
use futures_util::StreamExt;
use sqlx::PgPool;
use tracing::debug;

use crate::model::attendance::{AttendanceRecord, TimeCardRow, collapse_rows};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::source::{AttendanceSource, RecordScope};
use crate::utils::db_utils::{SqlFilter, SqlValue, bind_all};

const TIME_CARD_SELECT: &str = r#"
    SELECT
        emp.id::bigint AS employee_id,
        emp.department_id::bigint AS department_id,
        att.att_date,
        att.clock_in::timestamp AS clock_in,
        att.clock_out::timestamp AS clock_out,
        att.payload::text AS payload,
        pay.pay_code_alias
    FROM att_payloadtimecard att
    INNER JOIN personnel_employee emp ON att.emp_id = emp.id
    LEFT JOIN att_payloadpaycode pay ON att.id = pay.time_card_id
"#;

const EMPLOYEE_SELECT: &str = r#"
    SELECT
        emp.id::bigint AS id,
        COALESCE(emp.emp_code, '') AS emp_code,
        COALESCE(emp.first_name, '') AS first_name,
        emp.last_name,
        emp.department_id::bigint AS department_id,
        dept.dept_name,
        COALESCE(emp.is_active, true) AS is_active
    FROM personnel_employee emp
    LEFT JOIN personnel_department dept ON emp.department_id = dept.id
    ORDER BY emp.first_name, emp.last_name
"#;

const DEPARTMENT_SELECT: &str = r#"
    SELECT id::bigint AS id, dept_code, dept_name
    FROM personnel_department
    ORDER BY dept_name
"#;

/// Reads the time clock database.
#[derive(Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn time_card_filter(scope: &RecordScope) -> SqlFilter {
    let mut filter = SqlFilter::new();
    filter
        .push("att.att_date", ">=", SqlValue::Date(scope.range.start))
        .push("att.att_date", "<=", SqlValue::Date(scope.range.end))
        .push_eq("emp.id", scope.employee_id.map(SqlValue::I64))
        .push_eq("emp.department_id", scope.department_id.map(SqlValue::I64));
    filter
}

#[async_trait]
impl AttendanceSource for PgSource {
    async fn records(&self, scope: &RecordScope) -> anyhow::Result<Vec<AttendanceRecord>> {
        let filter = time_card_filter(scope);
        let sql = format!(
            "{} {} ORDER BY att.att_date DESC, emp.id, att.id",
            TIME_CARD_SELECT,
            filter.where_clause()
        );

        let query = bind_all(sqlx::query_as::<_, TimeCardRow>(&sql), filter.values());
        let mut stream = query.fetch(&self.pool);

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await {
            rows.push(row.context("Failed to read time card row")?);
        }

        let raw = rows.len();
        let records = collapse_rows(rows);
        debug!(
            start = %scope.range.start,
            end = %scope.range.end,
            raw,
            records = records.len(),
            "Loaded time cards"
        );

        Ok(records)
    }

    async fn employees(&self) -> anyhow::Result<Vec<Employee>> {
        sqlx::query_as::<_, Employee>(EMPLOYEE_SELECT)
            .fetch_all(&self.pool)
            .await
            .context("Failed to load employees")
    }

    async fn departments(&self) -> anyhow::Result<Vec<Department>> {
        sqlx::query_as::<_, Department>(DEPARTMENT_SELECT)
            .fetch_all(&self.pool)
            .await
            .context("Failed to load departments")
    }
}
