//! REST client for a hosted Supabase project
//!
//! Rows go through PostgREST (`/rest/v1`), sessions through GoTrue
//! (`/auth/v1`) and images through the storage API (`/storage/v1`).
//! Public reads use the anon key; writes and profile upserts need the
//! service role key.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{AuthUser, NewProduct, Product, Profile};
use crate::remote::{
    decode_rows, encode_object_path, DataService, ImageUpload, ProductPatch, ProductScope,
    RemoteError,
};

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
    service_key: Option<String>,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str, service_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            service_key: service_key.filter(|k| !k.is_empty()),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Public URL of an object in a public bucket
    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            encode_object_path(path)
        )
    }

    fn upload_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            encode_object_path(path)
        )
    }

    fn admin_key(&self) -> Result<&str, RemoteError> {
        self.service_key.as_deref().ok_or(RemoteError::NotConfigured)
    }

    fn with_key(builder: RequestBuilder, key: &str) -> RequestBuilder {
        builder
            .header("apikey", key)
            .header(header::AUTHORIZATION, format!("Bearer {key}"))
    }

    /// Reads the body of a non-2xx answer into a [`RemoteError::Rejected`].
    async fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| {
                ["message", "msg", "error_description", "error"]
                    .iter()
                    .find_map(|key| body[*key].as_str().map(String::from))
            })
            .unwrap_or_else(|| {
                if text.is_empty() {
                    format!("HTTP {}", status.as_u16())
                } else {
                    text
                }
            });
        debug!(status = status.as_u16(), %message, "data service rejected request");
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    /// Decodes a PostgREST array body, rejecting anything that is not an array.
    async fn rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, RemoteError> {
        let body: Value = Self::check(response).await?.json().await?;
        decode_rows(body)
    }

    async fn single<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        Self::rows::<T>(response)
            .await?
            .into_iter()
            .next()
            .ok_or(RemoteError::NotFound)
    }
}

#[async_trait]
impl DataService for SupabaseClient {
    async fn list_products(&self, scope: ProductScope) -> Result<Vec<Product>, RemoteError> {
        let mut query = vec![("select", "*"), ("order", "created_at.desc")];
        if scope == ProductScope::Published {
            query.push(("is_published", "eq.true"));
        }
        let request = self.http.get(self.rest_url("products")).query(&query);
        let response = Self::with_key(request, &self.anon_key).send().await?;
        Self::rows(response).await
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, RemoteError> {
        let filter = format!("eq.{id}");
        let request = self
            .http
            .get(self.rest_url("products"))
            .query(&[("select", "*"), ("id", filter.as_str())]);
        let response = Self::with_key(request, &self.anon_key).send().await?;
        Ok(Self::rows::<Product>(response).await?.into_iter().next())
    }

    async fn insert_product(&self, row: &NewProduct) -> Result<Product, RemoteError> {
        let request = self
            .http
            .post(self.rest_url("products"))
            .header("Prefer", "return=representation")
            .json(row);
        let response = Self::with_key(request, self.admin_key()?).send().await?;
        Self::single(response).await
    }

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<Product, RemoteError> {
        let filter = format!("eq.{id}");
        let request = self
            .http
            .patch(self.rest_url("products"))
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .json(patch);
        let response = Self::with_key(request, self.admin_key()?).send().await?;
        Self::single(response).await
    }

    async fn delete_product(&self, id: &str) -> Result<Product, RemoteError> {
        let filter = format!("eq.{id}");
        let request = self
            .http
            .delete(self.rest_url("products"))
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation");
        let response = Self::with_key(request, self.admin_key()?).send().await?;
        Self::single(response).await
    }

    async fn get_user(&self, token: &str) -> Result<AuthUser, RemoteError> {
        let key = self.service_key.as_deref().unwrap_or(&self.anon_key);
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", key)
            .bearer_auth(token)
            .send()
            .await?;
        match Self::check(response).await {
            Ok(response) => response
                .json::<AuthUser>()
                .await
                .map_err(|_| RemoteError::InvalidToken),
            Err(RemoteError::Rejected { status: 401 | 403, .. }) => Err(RemoteError::InvalidToken),
            Err(other) => Err(other),
        }
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, RemoteError> {
        let filter = format!("eq.{user_id}");
        let key = self.service_key.as_deref().unwrap_or(&self.anon_key);
        let request = self
            .http
            .get(self.rest_url("profiles"))
            .query(&[("select", "id,email,role,updated_at"), ("id", filter.as_str())]);
        let response = Self::with_key(request, key).send().await?;
        Ok(Self::rows::<Profile>(response).await?.into_iter().next())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, RemoteError> {
        let request = self
            .http
            .post(self.rest_url("profiles"))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(profile);
        let response = Self::with_key(request, self.admin_key()?).send().await?;
        Self::single(response).await
    }

    async fn sign_out(&self, token: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;
        if let Err(e) = Self::check(response).await {
            // An already-expired session is as signed out as it gets.
            warn!("sign out failed: {e}");
        }
        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        upload: &ImageUpload,
    ) -> Result<String, RemoteError> {
        let key = self.service_key.as_deref().unwrap_or(&self.anon_key);
        let request = self
            .http
            .post(self.upload_url(bucket, path))
            .header(header::CONTENT_TYPE, upload.content_type.as_str())
            .header(header::CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(upload.bytes.clone());
        let response = Self::with_key(request, key).send().await?;
        Self::check(response).await?;
        Ok(self.public_object_url(bucket, path))
    }

    fn admin_enabled(&self) -> bool {
        self.service_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_strip_trailing_slash() {
        let client = SupabaseClient::new("https://demo.supabase.co/", "anon", None);
        assert_eq!(client.rest_url("products"), "https://demo.supabase.co/rest/v1/products");
        assert_eq!(
            client.public_object_url("product-images", "1700000000000-a.jpg"),
            "https://demo.supabase.co/storage/v1/object/public/product-images/1700000000000-a.jpg"
        );
    }

    #[test]
    fn object_urls_encode_file_names() {
        let client = SupabaseClient::new("https://demo.supabase.co", "anon", None);
        assert_eq!(
            client.upload_url("product-images", "5-my photo #1.jpg"),
            "https://demo.supabase.co/storage/v1/object/product-images/5-my%20photo%20%231.jpg"
        );
        assert_eq!(
            client.public_object_url("product-images", "5-my photo #1.jpg"),
            "https://demo.supabase.co/storage/v1/object/public/product-images/5-my%20photo%20%231.jpg"
        );
    }

    #[test]
    fn empty_service_key_disables_admin() {
        let client = SupabaseClient::new("https://demo.supabase.co", "anon", Some(String::new()));
        assert!(!client.admin_enabled());
        assert!(matches!(client.admin_key(), Err(RemoteError::NotConfigured)));
    }
}
