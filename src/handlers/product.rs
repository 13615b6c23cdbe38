//! Product handlers: load, list, create, read, replace, update, remove.

use crate::error::AppError;
use crate::model::{ListQuery, NewProduct, Product, ProductFields, ProductFilter, ProductView};
use crate::service::{ValidationSchema, CREATE_PRODUCT, LIST_PRODUCTS, REPLACE_PRODUCT, UPDATE_PRODUCT};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Resolve the `:productId` segment to a stored product. Runs before every
/// handler addressing a single record; the result is passed to it.
pub async fn load(state: &AppState, id: &str) -> Result<Product, AppError> {
    state.store.get(id).await
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(v)| v).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })
}

fn from_validated<T: DeserializeOwned>(values: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(values)).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn body_fields(schema: &ValidationSchema, body: Result<Json<Value>, JsonRejection>) -> Result<ProductFields, AppError> {
    from_validated(schema.validate_body(json_body(body)?)?)
}

/// Name is required by the create and replace schemas, so this only fails if they drift.
fn new_product(fields: ProductFields) -> Result<NewProduct, AppError> {
    NewProduct::from_fields(fields).ok_or_else(|| AppError::BadRequest("name is required".into()))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<Vec<ProductView>>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let query: ListQuery = from_validated(LIST_PRODUCTS.validate_query(&query)?)?;
    let filter = ProductFilter::from(query);
    let products = state.store.list(&filter).await?;
    Ok(Json(products.iter().map(Product::transform).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductView>), AppError> {
    let product = new_product(body_fields(&CREATE_PRODUCT, body)?)?;
    let saved = state.store.create(&product).await?;
    tracing::info!(id = %saved.id, "product created");
    Ok((StatusCode::CREATED, Json(saved.transform())))
}

pub async fn read(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductView>, AppError> {
    let product = load(&state, &product_id).await?;
    Ok(Json(product.transform()))
}

/// Full overwrite at the loaded product's id. A record deleted between load and
/// write is created again at that id.
pub async fn replace(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProductView>, AppError> {
    REPLACE_PRODUCT.validate_params(&[("productId", product_id.as_str())])?;
    let product = load(&state, &product_id).await?;
    let replacement = new_product(body_fields(&REPLACE_PRODUCT, body)?)?;
    state.store.replace(&product.id, &replacement).await?;
    let saved = state.store.get(&product.id).await?;
    Ok(Json(saved.transform()))
}

pub async fn update(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProductView>, AppError> {
    UPDATE_PRODUCT.validate_params(&[("productId", product_id.as_str())])?;
    let mut product = load(&state, &product_id).await?;
    let fields = body_fields(&UPDATE_PRODUCT, body)?;
    product.merge(fields);
    let saved = state.store.save(&product).await?;
    Ok(Json(saved.transform()))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let product = load(&state, &product_id).await?;
    state.store.remove(&product.id).await?;
    tracing::info!(id = %product.id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
