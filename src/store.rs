//! Product persistence contract and table bootstrap.

use crate::error::AppError;
use crate::model::{NewProduct, Product, ProductFilter, PRODUCTS_TABLE};
use async_trait::async_trait;
use sqlx::PgPool;

/// Persistence operations the handlers run against. The datastore is the only
/// source of truth: implementations hold no copies of records.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetch one product by id, `None` when absent.
    async fn find(&self, id: &str) -> Result<Option<Product>, AppError>;

    /// One page of products matching the filter's equality conditions.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError>;

    /// Insert and return the stored row with its generated id.
    async fn create(&self, product: &NewProduct) -> Result<Product, AppError>;

    /// Overwrite every settable field at `id`, creating the row there if it is gone.
    async fn replace(&self, id: &str, product: &NewProduct) -> Result<(), AppError>;

    /// Persist all settable fields of `product` at its id.
    async fn save(&self, product: &Product) -> Result<Product, AppError>;

    /// Hard delete.
    async fn remove(&self, id: &str) -> Result<(), AppError>;

    /// Round trip to the datastore, for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;

    /// Like `find`, but a missing record is `NotFound`.
    async fn get(&self, id: &str) -> Result<Product, AppError> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
    }
}

/// Create the products table if it does not exist. Ids are 24 hex characters
/// generated by the column default.
pub async fn ensure_products_table(pool: &PgPool) -> Result<(), AppError> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            "id" TEXT PRIMARY KEY DEFAULT substr(md5(random()::text || clock_timestamp()::text), 1, 24),
            "name" VARCHAR(128) NOT NULL,
            "price" DOUBLE PRECISION,
            "created_at" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            "updated_at" TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        table = PRODUCTS_TABLE
    );
    sqlx::query(&ddl).execute(pool).await?;
    let index = format!(
        r#"CREATE INDEX IF NOT EXISTS "{table}_name_idx" ON "{table}" ("name")"#,
        table = PRODUCTS_TABLE
    );
    sqlx::query(&index).execute(pool).await?;
    tracing::info!(table = PRODUCTS_TABLE, "table ready");
    Ok(())
}
