//! Route tables and the assembled application router.

pub mod common;
pub mod product;

pub use common::common_routes;
pub use product::product_routes;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

/// Versioned prefix for resource routes.
pub const API_PREFIX: &str = "/v1";

/// Full application: operational routes at the root, resources under `/v1`.
///
/// Oversized bodies surface as a `Json` rejection, so they get the usual error body.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(API_PREFIX, product_routes(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
