//! Product routes. Every `:productId` route resolves the product with
//! `handlers::load` before the handler body runs.

use crate::handlers::product::{create, list, read, remove, replace, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn product_routes(state: AppState) -> Router {
    Router::new()
        .route("/products", get(list).post(create))
        .route(
            "/products/:productId",
            get(read).put(replace).patch(update).delete(remove),
        )
        .with_state(state)
}
