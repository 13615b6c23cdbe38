//! Product record, its column mapping, and the externally visible shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PRODUCTS_TABLE: &str = "products";

/// Default and bounds for list pagination.
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u32 = 30;
pub const MAX_PER_PAGE: u32 = 100;

/// Columns of the products table. SQL is only ever built from these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductColumn {
    Id,
    Name,
    Price,
    CreatedAt,
    UpdatedAt,
}

impl ProductColumn {
    pub const ALL: [ProductColumn; 5] = [
        ProductColumn::Id,
        ProductColumn::Name,
        ProductColumn::Price,
        ProductColumn::CreatedAt,
        ProductColumn::UpdatedAt,
    ];

    /// Column name in the table.
    pub const fn column(self) -> &'static str {
        match self {
            ProductColumn::Id => "id",
            ProductColumn::Name => "name",
            ProductColumn::Price => "price",
            ProductColumn::CreatedAt => "created_at",
            ProductColumn::UpdatedAt => "updated_at",
        }
    }
}

/// A persisted product row.
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Settable fields as they arrive in a validated request body.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ProductFields {
    pub name: Option<String>,
    pub price: Option<f64>,
}

/// Settable fields of a product about to be written as a whole (create, replace).
#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: Option<f64>,
}

/// The shape every read path returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn transform(&self) -> ProductView {
        ProductView {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            created_at: self.created_at,
        }
    }

    /// Shallow merge: fields present in `fields` overwrite, the rest are kept.
    pub fn merge(&mut self, fields: ProductFields) {
        if let Some(name) = fields.name {
            self.name = name;
        }
        if let Some(price) = fields.price {
            self.price = Some(price);
        }
    }
}

impl NewProduct {
    /// Full record from body fields. Omitted optional fields become null.
    pub fn from_fields(fields: ProductFields) -> Option<Self> {
        Some(NewProduct {
            name: fields.name?,
            price: fields.price,
        })
    }
}

/// Validated list query.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u32>,
    pub name: Option<String>,
    pub price: Option<f64>,
}

/// Equality filters plus offset pagination for `list`.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub page: u64,
    pub per_page: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter {
            name: None,
            price: None,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl From<ListQuery> for ProductFilter {
    fn from(q: ListQuery) -> Self {
        ProductFilter {
            name: q.name,
            price: q.price,
            page: q.page.unwrap_or(DEFAULT_PAGE).max(1),
            per_page: q.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }
}

impl ProductFilter {
    pub fn limit(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(u64::from(self.per_page))
    }
}
