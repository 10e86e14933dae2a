//! Interface to the hosted data service
//!
//! The storefront never talks to a database directly. Product and profile
//! rows, session validation and image storage all live behind
//! [`DataService`]. [`crate::supabase::SupabaseClient`] speaks the hosted REST
//! API; [`crate::memory::MemoryService`] keeps everything in process.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{AuthUser, NewProduct, Product, Profile};

/// Partial product update, already restricted to whitelisted columns
pub type ProductPatch = Map<String, Value>;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer; `message` is the service's own error text
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("invalid response format: {0}")]
    UnexpectedShape(String),

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("row not found")]
    NotFound,

    #[error("admin client not configured")]
    NotConfigured,
}

impl RemoteError {
    /// Text used when looking for offending column names.
    pub fn message(&self) -> String {
        match self {
            RemoteError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Decodes a row listing; anything other than a JSON array is rejected.
pub fn decode_rows<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, RemoteError> {
    if !body.is_array() {
        return Err(RemoteError::UnexpectedShape("expected array".into()));
    }
    serde_json::from_value(body).map_err(|e| RemoteError::UnexpectedShape(e.to_string()))
}

/// Percent-encodes each segment of a storage object path for use in a URL.
pub fn encode_object_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Which rows a product listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductScope {
    /// Only rows with `is_published = true`
    Published,
    /// Every row, as the admin dashboard and the public API see them
    All,
}

/// An image chosen in the admin form
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait DataService: Send + Sync {
    /// Lists products newest first.
    async fn list_products(&self, scope: ProductScope) -> Result<Vec<Product>, RemoteError>;

    async fn get_product(&self, id: &str) -> Result<Option<Product>, RemoteError>;

    async fn insert_product(&self, row: &NewProduct) -> Result<Product, RemoteError>;

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<Product, RemoteError>;

    /// Deletes one row and returns it.
    async fn delete_product(&self, id: &str) -> Result<Product, RemoteError>;

    /// Resolves a bearer token to its user.
    async fn get_user(&self, token: &str) -> Result<AuthUser, RemoteError>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, RemoteError>;

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, RemoteError>;

    async fn sign_out(&self, token: &str) -> Result<(), RemoteError>;

    /// Stores an object and returns its public URL.
    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        upload: &ImageUpload,
    ) -> Result<String, RemoteError>;

    /// Whether elevated (service role) operations are available.
    fn admin_enabled(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_array_payload_is_rejected() {
        let err = decode_rows::<Product>(json!({"message": "oops"})).unwrap_err();
        assert!(matches!(err, RemoteError::UnexpectedShape(_)));
    }

    #[test]
    fn seed_rows_decode() {
        let rows = decode_rows::<Product>(json!([
            {
                "id": "7c1e",
                "name": "Royal Velvet Bedspread",
                "category": "bedspread",
                "price": 450,
                "created_at": "2026-01-06T14:07:55.053096",
                "is_published": null,
                "stock_status": null
            },
            {
                "id": "7c1f",
                "name": "Door Curtain",
                "category": "curtain",
                "created_at": "2026-01-05T09:00:00+00:00"
            }
        ]))
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_published);
        assert!(rows[0].created_at > rows[1].created_at);
    }

    #[test]
    fn object_paths_are_encoded_per_segment() {
        assert_eq!(encode_object_path("5-my photo #1.jpg"), "5-my%20photo%20%231.jpg");
        assert_eq!(encode_object_path("covers/5-a?.jpg"), "covers/5-a%3F.jpg");
    }

    #[test]
    fn array_payload_decodes() {
        let rows = decode_rows::<Product>(json!([{"id": "1", "name": "Duvet"}])).unwrap();
        assert_eq!(rows[0].name, "Duvet");
    }
}
