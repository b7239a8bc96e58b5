use sqlx::{Postgres, QueryBuilder};

use crate::api::job::JobFilter;
use crate::db::models::JOB_COLUMNS;

/// Wrap `value` in `%` for a substring `LIKE`, escaping its own wildcards
pub fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Build the `SELECT` for a job search.
///
/// Each key present in `filter` adds one conjunct, in the order
/// title, hasEquity, minSalary. Values are always bound, never spliced
/// into the SQL text. A filter with no keys selects every job.
pub fn build_filter_query(filter: &JobFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM jobs", JOB_COLUMNS));
    let mut keyword = " WHERE ";

    if let Some(title) = &filter.title {
        qb.push(keyword)
            .push("LOWER(title) LIKE LOWER(")
            .push_bind(like_pattern(title))
            .push(")");
        keyword = " AND ";
    }

    // presence alone turns the filter on
    if filter.has_equity.is_some() {
        qb.push(keyword).push("equity > 0");
        keyword = " AND ";
    }

    if let Some(min_salary) = filter.min_salary {
        qb.push(keyword).push("salary > ").push_bind(min_salary);
    }

    qb.push(" ORDER BY id");
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_value() {
        assert_eq!(like_pattern("sales"), "%sales%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%_fun\\"), "%100\\%\\_fun\\\\%");
    }

    #[test]
    fn test_single_min_salary_conjunct() {
        let filter = JobFilter {
            min_salary: Some(101),
            ..Default::default()
        };

        let qb = build_filter_query(&filter);

        assert_eq!(
            qb.sql(),
            "SELECT id, title, salary, equity, company_handle FROM jobs WHERE salary > $1 ORDER BY id"
        );
    }

    #[test]
    fn test_all_conjuncts_joined_with_and() {
        let filter = JobFilter {
            title: Some("new".to_string()),
            min_salary: Some(50000),
            has_equity: Some("true".to_string()),
            kind: None,
        };

        let qb = build_filter_query(&filter);

        assert_eq!(
            qb.sql(),
            "SELECT id, title, salary, equity, company_handle FROM jobs \
             WHERE LOWER(title) LIKE LOWER($1) AND equity > 0 AND salary > $2 ORDER BY id"
        );
    }

    #[test]
    fn test_has_equity_ignores_value() {
        let filter = JobFilter {
            has_equity: Some("false".to_string()),
            ..Default::default()
        };

        let qb = build_filter_query(&filter);

        assert!(qb.sql().ends_with("WHERE equity > 0 ORDER BY id"));
    }

    #[test]
    fn test_no_keys_has_no_where_clause() {
        let filter = JobFilter {
            kind: Some("full-time".to_string()),
            ..Default::default()
        };

        let qb = build_filter_query(&filter);

        assert!(filter.is_empty());
        assert!(!qb.sql().contains("WHERE"));
    }
}
