//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for the products table.

use crate::model::{NewProduct, Product, ProductColumn, ProductFilter, PRODUCTS_TABLE};
use crate::sql::SqlParam;

/// Quote identifier for PostgreSQL (safe: only from `ProductColumn`).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn table() -> String {
    quoted(PRODUCTS_TABLE)
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: SqlParam) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn select_column_list() -> String {
    ProductColumn::ALL
        .iter()
        .map(|c| quoted(c.column()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key.
pub fn select_by_id(id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(SqlParam::Text(id.to_string()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        select_column_list(),
        table(),
        quoted(ProductColumn::Id.column()),
        n
    );
    q
}

/// SELECT with exact-match filters, ordered by creation, one page.
pub fn select_list(filter: &ProductFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    if let Some(name) = &filter.name {
        let n = q.push_param(SqlParam::Text(name.clone()));
        where_parts.push(format!("{} = ${}", quoted(ProductColumn::Name.column()), n));
    }
    if let Some(price) = filter.price {
        let n = q.push_param(SqlParam::Float(Some(price)));
        where_parts.push(format!("{} = ${}", quoted(ProductColumn::Price.column()), n));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}, {} LIMIT {} OFFSET {}",
        select_column_list(),
        table(),
        where_clause,
        quoted(ProductColumn::CreatedAt.column()),
        quoted(ProductColumn::Id.column()),
        filter.limit(),
        filter.offset()
    );
    q
}

/// INSERT; the id and timestamps come from column defaults.
pub fn insert(product: &NewProduct) -> QueryBuf {
    let mut q = QueryBuf::new();
    let name = q.push_param(SqlParam::Text(product.name.clone()));
    let price = q.push_param(SqlParam::Float(product.price));
    q.sql = format!(
        "INSERT INTO {} ({}, {}) VALUES (${}, ${}) RETURNING {}",
        table(),
        quoted(ProductColumn::Name.column()),
        quoted(ProductColumn::Price.column()),
        name,
        price,
        select_column_list()
    );
    q
}

/// INSERT .. ON CONFLICT DO UPDATE: overwrites every settable column at `id`,
/// or creates the row at `id` when it no longer exists. `created_at` is kept on overwrite.
pub fn upsert(id: &str, product: &NewProduct) -> QueryBuf {
    let mut q = QueryBuf::new();
    let id_n = q.push_param(SqlParam::Text(id.to_string()));
    let name_n = q.push_param(SqlParam::Text(product.name.clone()));
    let price_n = q.push_param(SqlParam::Float(product.price));
    let id_col = quoted(ProductColumn::Id.column());
    let name_col = quoted(ProductColumn::Name.column());
    let price_col = quoted(ProductColumn::Price.column());
    q.sql = format!(
        "INSERT INTO {table} ({id_col}, {name_col}, {price_col}) VALUES (${id_n}, ${name_n}, ${price_n}) \
         ON CONFLICT ({id_col}) DO UPDATE SET {name_col} = EXCLUDED.{name_col}, \
         {price_col} = EXCLUDED.{price_col}, {updated} = NOW()",
        table = table(),
        updated = quoted(ProductColumn::UpdatedAt.column()),
    );
    q
}

/// UPDATE every settable column from an in-memory record.
pub fn update(product: &Product) -> QueryBuf {
    let mut q = QueryBuf::new();
    let name = q.push_param(SqlParam::Text(product.name.clone()));
    let price = q.push_param(SqlParam::Float(product.price));
    let id = q.push_param(SqlParam::Text(product.id.clone()));
    q.sql = format!(
        "UPDATE {} SET {} = ${}, {} = ${}, {} = NOW() WHERE {} = ${} RETURNING {}",
        table(),
        quoted(ProductColumn::Name.column()),
        name,
        quoted(ProductColumn::Price.column()),
        price,
        quoted(ProductColumn::UpdatedAt.column()),
        quoted(ProductColumn::Id.column()),
        id,
        select_column_list()
    );
    q
}

/// DELETE by id.
pub fn delete(id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(SqlParam::Text(id.to_string()));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${} RETURNING {}",
        table(),
        quoted(ProductColumn::Id.column()),
        n,
        select_column_list()
    );
    q
}
