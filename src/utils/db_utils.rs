use chrono::NaiveDate;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    I64(i64),
    Date(NaiveDate),
}

/// ===============================
/// WHERE clause container
/// ===============================
#[derive(Debug, Default)]
pub struct SqlFilter {
    conditions: Vec<String>,
    values: Vec<SqlValue>,
}

impl SqlFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `<expr> <op> $n`, numbering placeholders in push order.
    pub fn push(&mut self, expr: &str, op: &str, value: SqlValue) -> &mut Self {
        self.values.push(value);
        self.conditions
            .push(format!("{} {} ${}", expr, op, self.values.len()));
        self
    }

    pub fn push_eq(&mut self, expr: &str, value: Option<SqlValue>) -> &mut Self {
        if let Some(value) = value {
            self.push(expr, "=", value);
        }
        self
    }

    /// `WHERE a AND b ...`, or an empty string when nothing was pushed.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

/// ===============================
/// Bind filter values in order
/// ===============================
pub fn bind_all<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    values: &[SqlValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value {
            SqlValue::I64(v) => query.bind(*v),
            SqlValue::Date(v) => query.bind(*v),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_follow_push_order() {
        let from = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();

        let mut filter = SqlFilter::new();
        filter
            .push("att.att_date", ">=", SqlValue::Date(from))
            .push("att.att_date", "<=", SqlValue::Date(to))
            .push_eq("emp.id", None)
            .push_eq("emp.department_id", Some(SqlValue::I64(4)));

        assert_eq!(
            filter.where_clause(),
            "WHERE att.att_date >= $1 AND att.att_date <= $2 AND emp.department_id = $3"
        );
        assert_eq!(
            filter.values(),
            &[SqlValue::Date(from), SqlValue::Date(to), SqlValue::I64(4)]
        );
    }

    #[test]
    fn empty_filter_has_no_where() {
        assert_eq!(SqlFilter::new().where_clause(), "");
    }
}
