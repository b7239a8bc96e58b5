use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::db::sql::SqlValue;

fn validate_equity(equity: &Decimal) -> Result<(), ValidationError> {
    if *equity < Decimal::ZERO || *equity > Decimal::ONE {
        let mut err = ValidationError::new("equity_range");
        err.message = Some(Cow::from("equity must be between 0 and 1"));
        return Err(err);
    }
    Ok(())
}

/// Body of `POST /jobs`
///
/// The company is named `company_handle` here but `companyHandle` in responses.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewJob {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    #[validate(range(min = 0, message = "salary must be at least 0"))]
    pub salary: Option<i32>,

    #[validate(custom(function = "validate_equity"))]
    pub equity: Option<Decimal>,

    #[validate(length(
        min = 1,
        max = 25,
        message = "company_handle must be between 1 and 25 characters"
    ))]
    pub company_handle: String,
}

// Absent keys fall back to `None` through `#[serde(default)]`; a key sent as
// `null` reaches this and fails, since `T` itself has no null form.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Body of `PATCH /jobs/{id}`; every field optional, at least one required.
/// A key that is present must carry a value; `null` is rejected.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct JobUpdate {
    #[serde(default, deserialize_with = "present")]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present")]
    #[validate(range(min = 0, message = "salary must be at least 0"))]
    pub salary: Option<i32>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_equity"))]
    pub equity: Option<Decimal>,

    #[serde(default, deserialize_with = "present")]
    #[validate(length(
        min = 1,
        max = 25,
        message = "companyHandle must be between 1 and 25 characters"
    ))]
    pub company_handle: Option<String>,
}

impl JobUpdate {
    /// Fields present in the request, keyed by their request names
    pub fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(title) = self.title {
            fields.push(("title", SqlValue::Text(title)));
        }
        if let Some(salary) = self.salary {
            fields.push(("salary", SqlValue::Integer(salary)));
        }
        if let Some(equity) = self.equity {
            fields.push(("equity", SqlValue::Decimal(equity)));
        }
        if let Some(handle) = self.company_handle {
            fields.push(("companyHandle", SqlValue::Text(handle)));
        }
        fields
    }
}

/// Query string of `GET /jobs`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the title
    #[validate(length(max = 255, message = "title filter must be at most 255 characters"))]
    pub title: Option<String>,

    /// Strict lower bound on salary
    #[serde(rename = "minSalary")]
    pub min_salary: Option<i32>,

    /// Only jobs with equity above zero; the value is not inspected
    #[serde(rename = "hasEquity")]
    pub has_equity: Option<String>,

    /// Accepted and ignored
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl JobFilter {
    /// True when no key that narrows the search is present
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.min_salary.is_none() && self.has_equity.is_none()
    }
}
