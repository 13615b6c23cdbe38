//! Product CRUD execution against PostgreSQL.

use crate::error::AppError;
use crate::model::{NewProduct, Product, ProductFilter};
use crate::sql::{bind_params, delete, insert, select_by_id, select_list, update, upsert, QueryBuf};
use crate::store::ProductStore;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        PgProductStore { pool }
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Product>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_params(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Product::from_row(&r)).transpose()?)
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Product>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_params(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| Product::from_row(r)).collect::<Result<_, _>>()?)
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let done = bind_params(sqlx::query(&q.sql), &q.params)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find(&self, id: &str) -> Result<Option<Product>, AppError> {
        self.fetch_optional(&select_by_id(id)).await
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        self.fetch_all(&select_list(filter)).await
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, AppError> {
        self.fetch_optional(&insert(product))
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn replace(&self, id: &str, product: &NewProduct) -> Result<(), AppError> {
        self.execute(&upsert(id, product)).await?;
        Ok(())
    }

    async fn save(&self, product: &Product) -> Result<Product, AppError> {
        self.fetch_optional(&update(product))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", product.id)))
    }

    async fn remove(&self, id: &str) -> Result<(), AppError> {
        self.fetch_optional(&delete(id))
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
