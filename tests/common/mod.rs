//! In-memory product store and request helpers for driving the router.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use product_api::{app, AppError, AppState, NewProduct, Product, ProductFilter, ProductStore};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct Rows {
    products: Vec<Product>,
    next_id: u64,
}

/// Store double with the same observable semantics as the PostgreSQL store.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Rows>,
    vanish_after_find: AtomicBool,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// The next `find` returns the record and then deletes it, as if another
    /// request removed it right after it was loaded.
    pub fn vanish_after_next_find(&self) {
        self.vanish_after_find.store(true, Ordering::SeqCst);
    }

    /// Every following call fails like a lost connection.
    pub fn go_offline(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().products.len()
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AppError::Db(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find(&self, id: &str) -> Result<Option<Product>, AppError> {
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap();
        let pos = rows.products.iter().position(|p| p.id == id);
        let found = pos.map(|i| rows.products[i].clone());
        if let Some(i) = pos {
            if self.vanish_after_find.swap(false, Ordering::SeqCst) {
                rows.products.remove(i);
            }
        }
        Ok(found)
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        self.check_online()?;
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<Product> = rows.products.iter().filter(|p| matches(filter, p)).cloned().collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching
            .into_iter()
            .skip(usize::try_from(filter.offset()).unwrap_or(usize::MAX))
            .take(filter.limit() as usize)
            .collect())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, AppError> {
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap();
        rows.next_id += 1;
        let now = Utc::now();
        let created = Product {
            id: format!("{:024x}", rows.next_id),
            name: product.name.clone(),
            price: product.price,
            created_at: now,
            updated_at: now,
        };
        rows.products.push(created.clone());
        Ok(created)
    }

    async fn replace(&self, id: &str, product: &NewProduct) -> Result<(), AppError> {
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        match rows.products.iter_mut().find(|p| p.id == id) {
            Some(existing) => {
                existing.name = product.name.clone();
                existing.price = product.price;
                existing.updated_at = now;
            }
            None => rows.products.push(Product {
                id: id.to_string(),
                name: product.name.clone(),
                price: product.price,
                created_at: now,
                updated_at: now,
            }),
        }
        Ok(())
    }

    async fn save(&self, product: &Product) -> Result<Product, AppError> {
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap();
        let existing = rows
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| AppError::NotFound(format!("product {}", product.id)))?;
        existing.name = product.name.clone();
        existing.price = product.price;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), AppError> {
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.products.len();
        rows.products.retain(|p| p.id != id);
        if rows.products.len() == before {
            return Err(AppError::NotFound(format!("product {}", id)));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_online()
    }
}

/// Equality filter as the `WHERE` clause of the SQL list query applies it.
fn matches(filter: &ProductFilter, product: &Product) -> bool {
    filter.name.as_ref().map_or(true, |n| *n == product.name)
        && filter.price.map_or(true, |p| product.price == Some(p))
}

pub fn test_app() -> (Router, Arc<MemoryStore>) {
    test_app_with_body_limit(1024 * 1024)
}

pub fn test_app_with_body_limit(body_limit: usize) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = AppState { store: store.clone() };
    (app(state, body_limit), store)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(v) => send_raw(app, method, uri, Some(v.to_string())).await,
        None => send_raw(app, method, uri, None).await,
    }
}

pub async fn send_raw(app: &Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(s) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(s)
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
