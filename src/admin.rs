//! Admin back-office controller
//!
//! [`AdminController`] drives one admin session: the authentication gate,
//! product create/edit with an optional image upload, single and bulk
//! deletes, bulk stock changes and the dashboard table. Every mutation goes
//! through [`crate::catalog`] so the HTTP API and the back-office apply the
//! same rules.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{self, is_local_path, parse_category, subcategory_vocabulary};
use crate::error::AppError;
use crate::model::{AuthUser, CatalogStats, NewProductRequest, Product, Profile, StockStatus};
use crate::prefs::{collapse_key, Preferences, GROUP_KEY};
use crate::remote::{DataService, ImageUpload, ProductScope, RemoteError};
use crate::render::{format_price, html_escape, stock_badge, title_case};

pub const LOGIN_PAGE: &str = "/admin/login.html";

/// A verified admin, as attached to requests by the admin middleware
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub user: AuthUser,
    pub profile: Profile,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdminSession {
    #[default]
    Anonymous,
    Authenticating,
    AdminAuthorized { user: AuthUser, profile: Profile },
    Unauthorized(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedOut,
}

/// Validation failure for one form field
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct FormError {
    pub field: &'static str,
    pub message: String,
}

impl FormError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// A bulk operation stopped at its first failure
#[derive(Error, Debug)]
#[error("Stopped at {failed_id} after {completed} completed: {source}")]
pub struct BulkError {
    pub completed: usize,
    pub failed_id: String,
    #[source]
    pub source: AppError,
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Not signed in as admin")]
    NotAuthorized,

    #[error("A save is already in progress")]
    Busy,

    #[error("Confirmation required")]
    NotConfirmed,

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Image upload failed: {0}")]
    Upload(RemoteError),

    #[error(transparent)]
    Bulk(#[from] BulkError),

    #[error(transparent)]
    App(#[from] AppError),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        match self {
            AdminError::App(e) => e.into_response(),
            AdminError::Form(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.message, "field": e.field })),
            )
                .into_response(),
            AdminError::Bulk(e) => {
                let status = e.source.status();
                warn!("bulk operation stopped at {}: {}", e.failed_id, e.source);
                (
                    status,
                    Json(json!({
                        "error": e.to_string(),
                        "completed": e.completed,
                        "failed_id": e.failed_id,
                    })),
                )
                    .into_response()
            }
            other => {
                let status = match other {
                    AdminError::NotAuthorized => StatusCode::UNAUTHORIZED,
                    AdminError::Busy => StatusCode::CONFLICT,
                    AdminError::Upload(_) => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, Json(json!({ "error": other.to_string() }))).into_response()
            }
        }
    }
}

/// Resolves a bearer token to its user.
pub async fn verify_session(service: &dyn DataService, token: &str) -> Result<AuthUser, AppError> {
    if token.trim().is_empty() {
        return Err(AppError::Unauthorized("Missing access token".into()));
    }
    match service.get_user(token).await {
        Ok(user) => Ok(user),
        Err(RemoteError::InvalidToken) => {
            Err(AppError::Unauthorized("Invalid or expired token".into()))
        }
        Err(e) => {
            warn!("session lookup failed: {e}");
            Err(AppError::Unauthorized("Invalid or expired token".into()))
        }
    }
}

/// Upserts an admin profile for `user` if their email is on the allow-list.
pub async fn bootstrap_profile(
    service: &dyn DataService,
    allowed: &[String],
    user: &AuthUser,
) -> Result<Profile, AppError> {
    if !service.admin_enabled() {
        return Err(AppError::NotConfigured);
    }
    let email = user.email.as_deref().unwrap_or_default().trim().to_lowercase();
    if email.is_empty() || !allowed.iter().any(|a| *a == email) {
        return Err(AppError::Forbidden("Email not allowed to bootstrap admin".into()));
    }
    let profile = service
        .upsert_profile(&Profile {
            id: user.id.clone(),
            email: Some(email),
            role: Some(Profile::ADMIN_ROLE.to_string()),
            updated_at: Some(Utc::now()),
        })
        .await?;
    info!(user = %user.id, "admin profile bootstrapped");
    Ok(profile)
}

/// Form backing the create/edit dialog; every field is raw input text.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    /// Set when editing an existing product
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub price: String,
    pub image_url: String,
    pub whatsapp_url: String,
    pub description: String,
    pub notes: String,
    pub badge: String,
    pub stock_status: String,
    pub is_published: bool,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            category: String::new(),
            subcategory: String::new(),
            price: String::new(),
            image_url: String::new(),
            whatsapp_url: String::new(),
            description: String::new(),
            notes: String::new(),
            badge: String::new(),
            stock_status: StockStatus::InStock.as_str().to_string(),
            is_published: true,
        }
    }
}

/// Form input after field validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidForm {
    pub price: Option<f64>,
    pub stock_status: StockStatus,
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ProductForm {
    /// Prefills the form for editing `product`.
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            name: product.name.clone(),
            category: product.category.clone(),
            subcategory: product.subcategory.clone().unwrap_or_default(),
            price: product.price.map(|p| p.to_string()).unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
            whatsapp_url: product.whatsapp_url.clone().unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
            notes: product.notes.clone().unwrap_or_default(),
            badge: product.badge.clone().unwrap_or_default(),
            stock_status: product.stock().as_str().to_string(),
            is_published: product.is_published,
        }
    }

    /// Field-level checks; runs before anything is sent anywhere.
    pub fn validate(&self) -> Result<ValidForm, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::new("name", "Name is required"));
        }
        if parse_category(&self.category).is_err() {
            return Err(FormError::new("category", "Choose a valid category"));
        }
        let price = match self.price.trim() {
            "" => None,
            raw => match raw.parse::<f64>() {
                Ok(p) if p.is_finite() && p >= 0.0 => Some(p),
                _ => return Err(FormError::new("price", "Price must be a non-negative number")),
            },
        };
        if is_local_path(&self.image_url) {
            return Err(FormError::new(
                "image_url",
                "Local file paths are not allowed. Upload the image or use a public https:// URL",
            ));
        }
        Ok(ValidForm {
            price,
            stock_status: StockStatus::parse_lenient(&self.stock_status).unwrap_or_default(),
        })
    }

    fn into_request(self, valid: &ValidForm, image_url: Option<String>) -> NewProductRequest {
        NewProductRequest {
            name: self.name,
            category: self.category,
            subcategory: optional_text(&self.subcategory),
            price: valid.price,
            image_url,
            whatsapp_url: optional_text(&self.whatsapp_url),
            notes: optional_text(&self.notes),
            description: optional_text(&self.description),
            badge: optional_text(&self.badge),
            stock_status: Some(valid.stock_status),
            is_published: Some(self.is_published),
        }
    }

    fn into_patch(self, valid: &ValidForm, image_url: Option<String>) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("name".into(), Value::from(self.name));
        body.insert("category".into(), Value::from(self.category));
        body.insert("subcategory".into(), Value::from(self.subcategory));
        body.insert(
            "price".into(),
            valid.price.map(Value::from).unwrap_or(Value::Null),
        );
        // No new image and no typed URL keeps whatever the row already has.
        if let Some(url) = image_url {
            body.insert("image_url".into(), Value::from(url));
        }
        body.insert("whatsapp_url".into(), Value::from(self.whatsapp_url));
        body.insert("description".into(), Value::from(self.description));
        body.insert("notes".into(), Value::from(self.notes));
        body.insert("badge".into(), Value::from(self.badge));
        body.insert("stock_status".into(), Value::from(valid.stock_status.as_str()));
        body.insert("is_published".into(), Value::from(self.is_published));
        body
    }
}

/// Storage object name for an upload: `<unix-millis>-<file name>`.
pub fn object_name(file_name: &str, millis: i64) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();
    let base = if base.is_empty() { "image" } else { base };
    format!("{millis}-{base}")
}

/// Held while a save is in flight; releases the guard on drop.
pub struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub products: Vec<Product>,
    pub stats: CatalogStats,
}

pub struct AdminController<P: Preferences> {
    service: Arc<dyn DataService>,
    admin_emails: Vec<String>,
    bucket: String,
    session: AdminSession,
    token: Option<String>,
    submitting: AtomicBool,
    prefs: P,
}

impl<P: Preferences> AdminController<P> {
    pub fn new(service: Arc<dyn DataService>, admin_emails: Vec<String>, bucket: &str, prefs: P) -> Self {
        Self {
            service,
            admin_emails,
            bucket: bucket.to_string(),
            session: AdminSession::Anonymous,
            token: None,
            submitting: AtomicBool::new(false),
            prefs,
        }
    }

    /// Starts from an identity the admin middleware already verified.
    pub fn with_identity(mut self, identity: AdminIdentity) -> Self {
        self.token = Some(identity.token);
        self.session = AdminSession::AdminAuthorized {
            user: identity.user,
            profile: identity.profile,
        };
        self
    }

    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self.session, AdminSession::AdminAuthorized { .. })
    }

    /// Runs the authentication gate for `token`.
    ///
    /// A missing or unreadable profile triggers one bootstrap attempt through
    /// the allow-list. Any failure signs the session out.
    pub async fn authenticate(&mut self, token: &str) -> &AdminSession {
        self.session = AdminSession::Authenticating;
        match self.resolve(token).await {
            Ok((user, profile)) => {
                info!(user = %user.id, "admin signed in");
                self.token = Some(token.to_string());
                self.session = AdminSession::AdminAuthorized { user, profile };
            }
            Err(e) => {
                warn!("admin authentication failed: {e}");
                if let Err(e) = self.service.sign_out(token).await {
                    warn!("sign out after failed authentication: {e}");
                }
                self.token = None;
                self.session = AdminSession::Unauthorized(e.to_string());
            }
        }
        &self.session
    }

    async fn resolve(&self, token: &str) -> Result<(AuthUser, Profile), AppError> {
        let service = self.service.as_ref();
        let user = verify_session(service, token).await?;

        let profile = match service.get_profile(&user.id).await {
            Ok(Some(profile)) => profile,
            Ok(None) | Err(_) => {
                bootstrap_profile(service, &self.admin_emails, &user).await?;
                service
                    .get_profile(&user.id)
                    .await?
                    .ok_or_else(|| AppError::Forbidden("Admin access required".into()))?
            }
        };

        if !profile.is_admin() {
            return Err(AppError::Forbidden("Admin access required".into()));
        }
        Ok((user, profile))
    }

    pub async fn logout(&mut self) {
        if let Some(token) = self.token.take() {
            if let Err(e) = self.service.sign_out(&token).await {
                warn!("sign out failed: {e}");
            }
        }
        self.session = AdminSession::Anonymous;
    }

    pub fn on_auth_event(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignedOut => {
                self.token = None;
                self.session = AdminSession::Anonymous;
            }
        }
    }

    fn require_admin(&self) -> Result<(), AdminError> {
        if self.is_authorized() {
            Ok(())
        } else {
            Err(AdminError::NotAuthorized)
        }
    }

    /// Claims the submit guard; fails while another save holds it.
    pub fn begin_submit(&self) -> Result<SubmitGuard<'_>, AdminError> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| SubmitGuard(&self.submitting))
            .map_err(|_| AdminError::Busy)
    }

    /// Creates or updates a product from the form.
    ///
    /// An image, when given, is uploaded first and its public URL replaces
    /// any typed URL; a failed upload leaves the row untouched.
    pub async fn save(
        &self,
        form: ProductForm,
        image: Option<ImageUpload>,
    ) -> Result<Product, AdminError> {
        let _guard = self.begin_submit()?;
        self.require_admin()?;
        let valid = form.validate()?;

        let image_url = match image {
            Some(upload) => {
                let path = object_name(&upload.file_name, Utc::now().timestamp_millis());
                let url = self
                    .service
                    .upload_object(&self.bucket, &path, &upload)
                    .await
                    .map_err(AdminError::Upload)?;
                info!(%path, "image uploaded");
                Some(url)
            }
            None => optional_text(&form.image_url),
        };

        match form.id.clone() {
            Some(id) => {
                let body = form.into_patch(&valid, image_url);
                let outcome = catalog::update(self.service.as_ref(), &id, &body).await?;
                if !outcome.ignored.is_empty() {
                    warn!(ignored = ?outcome.ignored, "update skipped unknown columns");
                }
                Ok(outcome.product)
            }
            None => {
                let request = form.into_request(&valid, image_url);
                Ok(catalog::create(self.service.as_ref(), request).await?)
            }
        }
    }

    pub async fn delete(&self, id: &str, confirmed: bool) -> Result<Product, AdminError> {
        self.require_admin()?;
        if !confirmed {
            return Err(AdminError::NotConfirmed);
        }
        Ok(catalog::delete(self.service.as_ref(), id).await?)
    }

    /// Deletes `ids` one at a time, stopping at the first failure.
    /// Deletes that already went through stay deleted.
    pub async fn bulk_delete(&self, ids: &[String], confirmed: bool) -> Result<usize, AdminError> {
        self.require_admin()?;
        if !confirmed {
            return Err(AdminError::NotConfirmed);
        }
        for (completed, id) in ids.iter().enumerate() {
            if let Err(source) = catalog::delete(self.service.as_ref(), id).await {
                return Err(BulkError {
                    completed,
                    failed_id: id.clone(),
                    source,
                }
                .into());
            }
        }
        info!(count = ids.len(), "bulk delete finished");
        Ok(ids.len())
    }

    /// Sets the stock status of `ids` one at a time, stopping at the first failure.
    pub async fn bulk_stock(&self, ids: &[String], status: StockStatus) -> Result<usize, AdminError> {
        self.require_admin()?;
        let mut body = Map::new();
        body.insert("stock_status".into(), Value::from(status.as_str()));
        for (completed, id) in ids.iter().enumerate() {
            if let Err(source) = catalog::update(self.service.as_ref(), id, &body).await {
                return Err(BulkError {
                    completed,
                    failed_id: id.clone(),
                    source,
                }
                .into());
            }
        }
        info!(count = ids.len(), status = status.as_str(), "bulk stock update finished");
        Ok(ids.len())
    }

    /// Every product, published or not, with dashboard counts.
    pub async fn load_dashboard(&self) -> Result<Dashboard, AdminError> {
        self.require_admin()?;
        let products = self
            .service
            .list_products(ProductScope::All)
            .await
            .map_err(AppError::from)?;
        let stats = CatalogStats::from_products(&products);
        Ok(Dashboard { products, stats })
    }

    pub fn grouped(&self) -> bool {
        self.prefs.get_bool(GROUP_KEY)
    }

    pub fn set_grouped(&mut self, grouped: bool) {
        self.prefs.set_bool(GROUP_KEY, grouped);
    }

    pub fn set_collapsed(&mut self, section: &str, collapsed: bool) {
        let key = collapse_key(section);
        if collapsed {
            self.prefs.set_bool(&key, true);
        } else {
            self.prefs.remove(&key);
        }
    }

    /// Product table in the persisted grouping mode.
    pub fn render_table(&self, products: &[Product]) -> String {
        if !self.grouped() {
            return render_flat_table(products);
        }
        let sections = group_products(products);
        if sections.is_empty() {
            return render_flat_table(products);
        }
        sections
            .iter()
            .map(|(category, subgroups)| {
                let open = if self.prefs.get_bool(&collapse_key(category)) {
                    ""
                } else {
                    " open"
                };
                let count: usize = subgroups.values().map(Vec::len).sum();
                let body = subgroups
                    .iter()
                    .map(|(subcategory, rows)| {
                        format!(
                            r#"<h4 class="subcategory-heading">{} ({})</h4>
{}"#,
                            html_escape(&title_case(subcategory)),
                            rows.len(),
                            render_rows_table(rows)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    r#"<details class="category-group" data-section="{section}"{open}>
<summary>{label} ({count})</summary>
{body}
</details>"#,
                    section = html_escape(category),
                    label = html_escape(&title_case(category)),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    pub fn into_prefs(self) -> P {
        self.prefs
    }
}

/// Groups by category then subcategory, keys sorted; rows keep their order.
pub fn group_products(products: &[Product]) -> BTreeMap<String, BTreeMap<String, Vec<&Product>>> {
    let mut groups: BTreeMap<String, BTreeMap<String, Vec<&Product>>> = BTreeMap::new();
    for product in products {
        let category = match product.category.trim() {
            "" => "uncategorized".to_string(),
            c => c.to_lowercase(),
        };
        let subcategory = match product.subcategory.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => "general".to_string(),
        };
        groups
            .entry(category)
            .or_default()
            .entry(subcategory)
            .or_default()
            .push(product);
    }
    groups
}

fn render_row(product: &Product) -> String {
    let id = html_escape(&product.id);
    let published = if product.is_published { "Yes" } else { "No" };
    format!(
        r#"<tr data-id="{id}">
    <td><input type="checkbox" class="row-select" value="{id}"></td>
    <td>{name}</td>
    <td>{category}</td>
    <td>{subcategory}</td>
    <td>{price}</td>
    <td>{stock}</td>
    <td>{published}</td>
    <td><button class="edit-btn" data-id="{id}">Edit</button> <button class="delete-btn" data-id="{id}">Delete</button></td>
</tr>"#,
        name = html_escape(&product.name),
        category = html_escape(&product.category),
        subcategory = html_escape(product.subcategory.as_deref().unwrap_or_default()),
        price = format_price(product.price),
        stock = stock_badge(product),
    )
}

fn render_rows_table(rows: &[&Product]) -> String {
    let body = rows.iter().map(|p| render_row(p)).collect::<Vec<_>>().join("\n");
    format!(
        r#"<table class="products-table">
<thead><tr><th></th><th>Name</th><th>Category</th><th>Subcategory</th><th>Price</th><th>Stock</th><th>Published</th><th>Actions</th></tr></thead>
<tbody>
{body}
</tbody>
</table>"#
    )
}

/// Newest first.
pub fn render_flat_table(products: &[Product]) -> String {
    let mut rows: Vec<&Product> = products.iter().collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    if rows.is_empty() {
        return r#"<p class="empty-table">No products yet.</p>"#.to_string();
    }
    render_rows_table(&rows)
}

pub fn render_stats(stats: &CatalogStats) -> String {
    let categories = stats
        .categories
        .iter()
        .map(|(name, count)| {
            format!(
                r#"<li><span>{}</span> <strong>{count}</strong></li>"#,
                html_escape(&title_case(name))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"<div class="stats">
    <div class="stat"><span>Total products</span> <strong>{total}</strong></div>
    <div class="stat"><span>Categories</span> <strong>{distinct}</strong></div>
    <div class="stat"><span>Published</span> <strong>{published}</strong></div>
    <ul class="category-counts">
{categories}
    </ul>
</div>"#,
        total = stats.total,
        distinct = stats.categories.len(),
        published = stats.published,
    )
}

/// Subcategory control for the product form: a `<select>` over the closed
/// vocabulary when the category has one, a free text input otherwise.
pub fn render_subcategory_field(category: &str, current: &str) -> String {
    let current = current.trim().to_lowercase();
    match subcategory_vocabulary(category) {
        Some(options) => {
            let options = options
                .iter()
                .map(|value| {
                    let selected = if *value == current { " selected" } else { "" };
                    format!(
                        r#"    <option value="{value}"{selected}>{}</option>"#,
                        title_case(value)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                r#"<select id="subcategory" name="subcategory">
    <option value="">Select type</option>
{options}
</select>"#
            )
        }
        None => format!(
            r#"<input type="text" id="subcategory" name="subcategory" value="{}" placeholder="Subcategory (optional)">"#,
            html_escape(&current)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_validation_is_field_level() {
        let mut form = ProductForm {
            name: "Velvet Curtain".into(),
            category: "Curtains".into(),
            price: "120".into(),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap().price, Some(120.0));

        form.price = "-1".into();
        assert_eq!(form.validate().unwrap_err().field, "price");

        form.price = String::new();
        form.image_url = r"C:\Users\me\curtain.jpg".into();
        assert_eq!(form.validate().unwrap_err().field, "image_url");

        form.image_url = "file:///tmp/a.png".into();
        assert_eq!(form.validate().unwrap_err().field, "image_url");

        form.category = "rugs".into();
        assert_eq!(form.validate().unwrap_err().field, "category");

        form.name = " ".into();
        assert_eq!(form.validate().unwrap_err().field, "name");
    }

    #[test]
    fn object_names_keep_only_the_file_name() {
        assert_eq!(object_name("photo.jpg", 1700000000000), "1700000000000-photo.jpg");
        assert_eq!(object_name(r"C:\fakepath\photo.jpg", 5), "5-photo.jpg");
        assert_eq!(object_name("", 5), "5-image");
    }

    #[test]
    fn subcategory_field_switches_on_category() {
        let select = render_subcategory_field("Curtains", "Door Curtains");
        assert!(select.starts_with("<select"));
        assert!(select.contains(r#"<option value="door curtains" selected>Door Curtains</option>"#));

        let input = render_subcategory_field("bedspread", "Queen");
        assert!(input.starts_with("<input"));
        assert!(input.contains(r#"value="queen""#));
    }

    #[test]
    fn grouping_sorts_keys() {
        let products: Vec<Product> = serde_json::from_value(serde_json::json!([
            {"id": "1", "name": "A", "category": "pillows", "subcategory": "normal cotton"},
            {"id": "2", "name": "B", "category": "curtain", "subcategory": "door curtains"},
            {"id": "3", "name": "C", "category": "curtain"},
        ]))
        .unwrap();
        let groups = group_products(&products);
        let categories: Vec<&String> = groups.keys().collect();
        assert_eq!(categories, vec!["curtain", "pillows"]);
        let curtain: Vec<&String> = groups["curtain"].keys().collect();
        assert_eq!(curtain, vec!["door curtains", "general"]);
    }
}
