use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

use crate::api::error::ServiceError;

/// Field name to column name overrides for one table.
/// Fields missing from the table map to a column of the same name.
pub type ColumnMap = [(&'static str, &'static str)];

/// `SET` clause fragment and the values bound to its placeholders
#[derive(Debug, PartialEq)]
pub struct PartialUpdate<V> {
    /// `"col_a"=$1, "col_b"=$2`
    pub set_cols: String,
    pub values: Vec<V>,
}

/// Build the `SET` clause for a partial `UPDATE`.
///
/// `data` yields `(field, value)` pairs; each becomes one `"column"=$n`
/// fragment with `n` counted from 1 in iteration order, and its value is
/// pushed at the same position. Field names are interpolated as quoted
/// identifiers, so they must come from code, never from a request.
///
/// The caller appends its own `WHERE` placeholders after `values.len()`.
///
/// # Returns
/// - `Ok(PartialUpdate)` - clause and values, same order as `data`
/// - `Err(ServiceError::BadRequest)` - `data` was empty
pub fn sql_for_partial_update<'a, V, I>(
    data: I,
    js_to_sql: &ColumnMap,
) -> Result<PartialUpdate<V>, ServiceError>
where
    I: IntoIterator<Item = (&'a str, V)>,
{
    let mut cols = Vec::new();
    let mut values = Vec::new();

    for (idx, (field, value)) in data.into_iter().enumerate() {
        let column: &str = match js_to_sql.iter().find(|(name, _)| *name == field) {
            Some((_, column)) => *column,
            None => field,
        };

        cols.push(format!("\"{}\"=${}", column, idx + 1));
        values.push(value);
    }

    if cols.is_empty() {
        return Err(ServiceError::bad_request("No data"));
    }

    Ok(PartialUpdate {
        set_cols: cols.join(", "),
        values,
    })
}

/// A value headed for a positional placeholder, tagged with its SQL type
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i32),
    Decimal(Decimal),
}

impl SqlValue {
    pub fn bind_to<'q, O>(
        self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        match self {
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Integer(v) => query.bind(v),
            SqlValue::Decimal(v) => query.bind(v),
        }
    }
}
