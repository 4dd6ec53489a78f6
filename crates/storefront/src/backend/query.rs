//! Table query builder.
//!
//! Mirrors the query-builder surface the storefront needs: one table,
//! `eq` filters, and an optional ordering. The same value drives the
//! PostgREST URL and the in-memory fake.

use std::cmp::Ordering;

use serde_json::Value;

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

/// Sort order on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A table-scoped query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    columns: String,
    filters: Vec<Filter>,
    order: Option<Order>,
}

impl Query {
    /// Select every column of `table`.
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    /// Restrict the returned columns (PostgREST `select=` syntax).
    #[must_use]
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Keep rows where `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    /// Sort by `column`.
    #[must_use]
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Query-string pairs in PostgREST syntax (values are not yet URL-encoded).
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.clone())];
        params.extend(
            self.filters
                .iter()
                .map(|f| (f.column.clone(), format!("eq.{}", f.value))),
        );
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        params
    }

    /// Filter-only pairs, for mutations where `select` and `order` don't apply.
    #[must_use]
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|f| (f.column.clone(), format!("eq.{}", f.value)))
            .collect()
    }

    /// Whether `row` passes every filter.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| {
            row.get(&f.column)
                .is_some_and(|value| column_text(value) == f.value)
        })
    }

    /// Sort rows in place according to this query's order, if any.
    ///
    /// The sort is stable, so rows with equal keys keep their input order.
    pub fn sort(&self, rows: &mut [Value]) {
        let Some(order) = &self.order else {
            return;
        };
        rows.sort_by(|a, b| {
            let ordering = compare_columns(a.get(&order.column), b.get(&order.column));
            if order.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
}

/// Text form of a column value, as PostgREST compares it against `eq.` filters.
fn column_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn compare_columns(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => column_text(x).cmp(&column_text(y)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_params_encode_filters_and_order() {
        let query = Query::table("cart_items")
            .eq("user_id", "u-1")
            .order("created_at", false);
        assert_eq!(
            query.params(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.u-1".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_filter_params_skip_select_and_order() {
        let query = Query::table("cart_items")
            .eq("id", 7)
            .eq("user_id", "u-1")
            .order("created_at", true);
        assert_eq!(
            query.filter_params(),
            vec![
                ("id".to_string(), "eq.7".to_string()),
                ("user_id".to_string(), "eq.u-1".to_string()),
            ]
        );
    }

    #[test]
    fn test_matches_requires_every_filter() {
        let query = Query::table("cart_items").eq("id", 7).eq("user_id", "u-1");
        assert!(query.matches(&json!({"id": 7, "user_id": "u-1"})));
        assert!(!query.matches(&json!({"id": 7, "user_id": "u-2"})));
        assert!(!query.matches(&json!({"id": 7})));
    }

    #[test]
    fn test_sort_descending_is_stable() {
        let query = Query::table("t").order("created_at", false);
        let mut rows = vec![
            json!({"n": 1, "created_at": "2024-01-01T00:00:00Z"}),
            json!({"n": 2, "created_at": "2024-01-02T00:00:00Z"}),
            json!({"n": 3, "created_at": "2024-01-02T00:00:00Z"}),
        ];
        query.sort(&mut rows);
        let order: Vec<i64> = rows.iter().filter_map(|r| r["n"].as_i64()).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_numbers_numerically() {
        let query = Query::table("products").order("id", true);
        let mut rows = vec![json!({"id": 10}), json!({"id": 9})];
        query.sort(&mut rows);
        assert_eq!(rows[0]["id"], 9);
    }
}
