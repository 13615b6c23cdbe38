//! Typed values bound to parameterized queries.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// A value bound to a `$n` placeholder.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlParam {
    Text(String),
    Float(Option<f64>),
}

/// Bind every param in order.
pub fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = match p {
            SqlParam::Text(s) => query.bind(s.as_str()),
            SqlParam::Float(f) => query.bind(*f),
        };
    }
    query
}
