//! In-process data service
//!
//! Used when no hosted project is configured and by the test suite. Mirrors the
//! hosted service's observable behavior closely enough for the catalog rules:
//! unknown columns are rejected with a PostgREST-style message, deletes of
//! missing rows fail, and tokens must be registered before they resolve.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::model::{AuthUser, NewProduct, Product, Profile};
use crate::remote::{
    encode_object_path, DataService, ImageUpload, ProductPatch, ProductScope, RemoteError,
};

const PRODUCT_COLUMNS: [&str; 13] = [
    "id",
    "name",
    "category",
    "subcategory",
    "price",
    "image_url",
    "description",
    "notes",
    "badge",
    "stock_status",
    "is_published",
    "whatsapp_url",
    "created_at",
];

#[derive(Default)]
struct Tables {
    products: Vec<Product>,
    profiles: HashMap<String, Profile>,
    sessions: HashMap<String, AuthUser>,
    objects: BTreeMap<String, Vec<u8>>,
    missing_columns: HashSet<String>,
    failing_deletes: HashSet<String>,
    failing_uploads: bool,
    unavailable: bool,
    admin_disabled: bool,
}

#[derive(Default)]
pub struct MemoryService {
    base_url: String,
    tables: Mutex<Tables>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self {
            base_url: "http://localhost/storage".to_string(),
            tables: Mutex::new(Tables::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A panicked writer leaves plain data behind; keep serving it.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn guard_available(&self) -> Result<(), RemoteError> {
        if self.lock().unavailable {
            return Err(RemoteError::Rejected {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.lock().products.extend(products);
        self
    }

    /// Registers a bearer token for `user`.
    pub fn with_session(self, token: &str, user: AuthUser) -> Self {
        self.lock().sessions.insert(token.to_string(), user);
        self
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.lock().profiles.insert(profile.id.clone(), profile);
        self
    }

    /// Makes `column` unknown to the products table.
    pub fn without_column(self, column: &str) -> Self {
        self.lock().missing_columns.insert(column.to_string());
        self
    }

    /// Behaves like a hosted project without a service role key.
    pub fn without_admin(self) -> Self {
        self.lock().admin_disabled = true;
        self
    }

    pub fn fail_delete_of(&self, id: &str) {
        self.lock().failing_deletes.insert(id.to_string());
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.lock().failing_uploads = fail;
    }

    /// Every call answers 503 while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    pub fn object_paths(&self) -> Vec<String> {
        self.lock().objects.keys().cloned().collect()
    }

    pub fn is_signed_in(&self, token: &str) -> bool {
        self.lock().sessions.contains_key(token)
    }
}

fn unknown_column(column: &str) -> RemoteError {
    RemoteError::Rejected {
        status: 400,
        message: format!("Could not find the '{column}' column of 'products' in the schema cache"),
    }
}

#[async_trait]
impl DataService for MemoryService {
    async fn list_products(&self, scope: ProductScope) -> Result<Vec<Product>, RemoteError> {
        self.guard_available()?;
        let mut rows: Vec<Product> = self
            .lock()
            .products
            .iter()
            .filter(|p| scope == ProductScope::All || p.is_published)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>, RemoteError> {
        self.guard_available()?;
        Ok(self.lock().products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&self, row: &NewProduct) -> Result<Product, RemoteError> {
        self.guard_available()?;
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: row.name.clone(),
            category: row.category.as_str().to_string(),
            subcategory: row.subcategory.clone(),
            price: row.price,
            image_url: row.image_url.clone(),
            description: row.description.clone(),
            notes: row.notes.clone(),
            badge: row.badge.clone(),
            stock_status: Some(row.stock_status.as_str().to_string()),
            is_published: row.is_published,
            whatsapp_url: Some(row.whatsapp_url.clone()),
            created_at: row.created_at,
        };
        self.lock().products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<Product, RemoteError> {
        self.guard_available()?;
        let mut tables = self.lock();
        for column in patch.keys() {
            if tables.missing_columns.contains(column) || !PRODUCT_COLUMNS.contains(&column.as_str()) {
                return Err(unknown_column(column));
            }
        }
        let slot = tables
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RemoteError::NotFound)?;

        let mut row = serde_json::to_value(&*slot)
            .map_err(|e| RemoteError::UnexpectedShape(e.to_string()))?;
        if let Value::Object(fields) = &mut row {
            for (key, value) in patch {
                fields.insert(key.clone(), value.clone());
            }
        }
        let updated: Product = serde_json::from_value(row).map_err(|e| RemoteError::Rejected {
            status: 400,
            message: e.to_string(),
        })?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_product(&self, id: &str) -> Result<Product, RemoteError> {
        self.guard_available()?;
        let mut tables = self.lock();
        if tables.failing_deletes.contains(id) {
            return Err(RemoteError::Rejected {
                status: 500,
                message: format!("Failed to delete {id}"),
            });
        }
        let index = tables
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(RemoteError::NotFound)?;
        Ok(tables.products.remove(index))
    }

    async fn get_user(&self, token: &str) -> Result<AuthUser, RemoteError> {
        self.guard_available()?;
        self.lock()
            .sessions
            .get(token)
            .cloned()
            .ok_or(RemoteError::InvalidToken)
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, RemoteError> {
        self.guard_available()?;
        Ok(self.lock().profiles.get(user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, RemoteError> {
        self.guard_available()?;
        let mut stored = profile.clone();
        stored.updated_at.get_or_insert_with(Utc::now);
        self.lock().profiles.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn sign_out(&self, token: &str) -> Result<(), RemoteError> {
        self.lock().sessions.remove(token);
        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        upload: &ImageUpload,
    ) -> Result<String, RemoteError> {
        self.guard_available()?;
        let mut tables = self.lock();
        if tables.failing_uploads {
            return Err(RemoteError::Rejected {
                status: 413,
                message: "Payload too large".into(),
            });
        }
        let key = format!("{bucket}/{path}");
        if tables.objects.contains_key(&key) {
            return Err(RemoteError::Rejected {
                status: 409,
                message: "The resource already exists".into(),
            });
        }
        tables.objects.insert(key, upload.bytes.clone());
        Ok(format!("{}/{}/{}", self.base_url, bucket, encode_object_path(path)))
    }

    fn admin_enabled(&self) -> bool {
        !self.lock().admin_disabled
    }
}
