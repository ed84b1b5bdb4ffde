use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    #[schema(example = 3)]
    pub id: i64,
    #[schema(example = "FIN")]
    pub dept_code: String,
    #[schema(example = "Finance")]
    pub dept_name: String,
}
