use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 12,
        "emp_code": "EMP-012",
        "first_name": "John",
        "last_name": "Doe",
        "department_id": 3,
        "dept_name": "Finance",
        "is_active": true
    })
)]
pub struct Employee {
    #[schema(example = 12)]
    pub id: i64,

    #[schema(example = "EMP-012")]
    pub emp_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe", nullable = true)]
    pub last_name: Option<String>,

    #[schema(example = 3, nullable = true)]
    pub department_id: Option<i64>,

    #[schema(example = "Finance", nullable = true)]
    #[serde(default)]
    pub dept_name: Option<String>,

    #[schema(example = true)]
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

/// Who a report row is about. Flattened into every per-employee output.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeLabel {
    #[schema(example = 12)]
    pub employee_id: i64,
    #[schema(example = "EMP-012", nullable = true)]
    pub emp_code: Option<String>,
    #[schema(example = "John", nullable = true)]
    pub first_name: Option<String>,
    #[schema(example = "Doe", nullable = true)]
    pub last_name: Option<String>,
    #[schema(example = "Finance", nullable = true)]
    pub dept_name: Option<String>,
}

impl EmployeeLabel {
    pub fn unknown(employee_id: i64) -> Self {
        Self {
            employee_id,
            emp_code: None,
            first_name: None,
            last_name: None,
            dept_name: None,
        }
    }
}

impl From<&Employee> for EmployeeLabel {
    fn from(e: &Employee) -> Self {
        Self {
            employee_id: e.id,
            emp_code: Some(e.emp_code.clone()),
            first_name: Some(e.first_name.clone()),
            last_name: e.last_name.clone(),
            dept_name: e.dept_name.clone(),
        }
    }
}
