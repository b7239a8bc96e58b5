use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Columns selected for every job read or `RETURNING` clause
pub const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Database representation of a job posting.
///
/// Serialized with `companyHandle` and with `equity` as a decimal string.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}
