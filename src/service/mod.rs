//! PostgreSQL product store and request validation.

mod crud;
mod validation;
pub use crud::PgProductStore;
pub use validation::*;
