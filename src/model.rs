//! Data models for the storefront application
//!
//! This module defines the rows exchanged with the remote data service
//! (products, profiles, auth users) and the request/response payloads of the
//! HTTP API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Closed set of product categories accepted at persistence time.
///
/// Free-form input goes through [`crate::catalog::normalize_category`] before
/// it is matched against this set.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bedspread,
    Curtain,
    Pillows,
    Blankets,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Bedspread,
        Category::Curtain,
        Category::Pillows,
        Category::Blankets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bedspread => "bedspread",
            Category::Curtain => "curtain",
            Category::Pillows => "pillows",
            Category::Blankets => "blankets",
        }
    }

    /// Parses an already-normalized category token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == token)
    }

    /// Comma separated list used in validation messages.
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Inventory state shown on cards and in the admin table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In stock",
            StockStatus::LowStock => "Low stock",
            StockStatus::OutOfStock => "Out of stock",
        }
    }

    /// Lenient parse accepting hyphen/space variants such as `Out-of stock`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .to_lowercase()
            .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        match key.as_str() {
            "in_stock" | "instock" | "available" => Some(StockStatus::InStock),
            "low_stock" | "lowstock" => Some(StockStatus::LowStock),
            "out_of_stock" | "outofstock" => Some(StockStatus::OutOfStock),
            _ => None,
        }
    }
}

fn published_by_default() -> bool {
    true
}

/// Parses a stored timestamp. Columns typed `timestamp without time zone`
/// come back without an offset and are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn timestamp_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Utc::now()),
        Some(raw) => parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
    }
}

fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
    }
}

/// `null` reads as published, matching the column default.
fn published_or_default<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A product row as stored by the remote data service
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    /// Opaque identifier assigned by the data service
    pub id: String,

    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,

    /// Stored category token; rows written by this crate always hold a
    /// [`Category`] token, legacy rows may hold anything
    #[serde(default, deserialize_with = "string_or_empty")]
    pub category: String,

    #[serde(default)]
    pub subcategory: Option<String>,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub badge: Option<String>,

    /// Kept as raw text so unexpected values from older rows still load
    #[serde(default)]
    pub stock_status: Option<String>,

    /// Canonical public visibility flag
    #[serde(default = "published_by_default", deserialize_with = "published_or_default")]
    pub is_published: bool,

    #[serde(default)]
    pub whatsapp_url: Option<String>,

    #[serde(default = "Utc::now", deserialize_with = "timestamp_or_now")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Price used for filtering; a missing price counts as zero.
    pub fn price_value(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    pub fn stock(&self) -> StockStatus {
        self.stock_status
            .as_deref()
            .and_then(StockStatus::parse_lenient)
            .unwrap_or_default()
    }

    /// Lower-cased `name + " " + description`, the text facets and search run over.
    pub fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.name,
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// Row written on insert
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub category: Category,
    pub subcategory: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub whatsapp_url: String,
    pub notes: Option<String>,
    pub description: Option<String>,
    pub badge: Option<String>,
    pub stock_status: StockStatus,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for `POST /api/products`
///
/// # Example
/// ```json
/// {
///   "name": "Royal Velvet Bedspread",
///   "category": "Bedspreads",
///   "price": 450,
///   "whatsapp_url": "0554731557"
/// }
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub subcategory: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub whatsapp_url: Option<String>,
    pub notes: Option<String>,
    pub description: Option<String>,
    pub badge: Option<String>,
    pub stock_status: Option<StockStatus>,
    pub is_published: Option<bool>,
}

/// Authenticated user as reported by the data service's auth endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Application-level role attached to an auth user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub const ADMIN_ROLE: &'static str = "admin";

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(Self::ADMIN_ROLE)
    }
}

/// Body of `POST /api/tracking`
#[derive(Deserialize, Debug, Default)]
pub struct TrackRequest {
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
    pub name: Option<String>,
}

/// One row of `GET /api/tracking`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClickStat {
    pub id: String,
    pub name: String,
    pub clicks: u64,
}

/// Body of the bulk admin endpoints
#[derive(Deserialize, Debug, Default)]
pub struct BulkRequest {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub confirm: bool,
    pub stock_status: Option<StockStatus>,
}

/// Public configuration returned by `GET /config`
#[derive(Serialize, Debug)]
pub struct PublicConfig {
    #[serde(rename = "supabaseUrl")]
    pub supabase_url: String,
    #[serde(rename = "supabaseAnonKey")]
    pub supabase_anon_key: String,
}

/// Counts shown on the admin dashboard
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct CatalogStats {
    pub total: usize,
    pub published: usize,
    pub categories: std::collections::BTreeMap<String, usize>,
}

impl CatalogStats {
    pub fn from_products(products: &[Product]) -> Self {
        let mut stats = CatalogStats {
            total: products.len(),
            published: products.iter().filter(|p| p.is_published).count(),
            ..Default::default()
        };
        for product in products {
            let category = if product.category.trim().is_empty() {
                "other".to_string()
            } else {
                product.category.to_lowercase()
            };
            *stats.categories.entry(category).or_insert(0) += 1;
        }
        stats
    }
}
