//! Product API: REST CRUD for a single product resource backed by PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{AppError, ConfigError, FieldError, Location, ValidationErrors};
pub use model::{NewProduct, Product, ProductFields, ProductFilter, ProductView};
pub use routes::{app, common_routes, product_routes};
pub use service::PgProductStore;
pub use state::AppState;
pub use store::{ensure_products_table, ProductStore};
