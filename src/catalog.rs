//! Catalog rules shared by the HTTP API and the admin controller
//!
//! Category and subcategory normalization, validation of incoming product
//! data, and the create/update/delete operations against the data service.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::AppError;
use crate::model::{Category, NewProduct, NewProductRequest, Product, StockStatus};
use crate::remote::{DataService, ProductPatch, RemoteError};
use crate::whatsapp::normalize_contact;

/// Columns a partial update may touch.
pub const UPDATABLE_FIELDS: [&str; 12] = [
    "name",
    "category",
    "subcategory",
    "price",
    "image_url",
    "whatsapp_url",
    "stock_status",
    "visible",
    "description",
    "notes",
    "badge",
    "is_published",
];

pub const CURTAIN_TYPES: [&str; 4] = ["two in one", "three in one", "door curtains", "bathroom curtains"];
pub const PILLOW_TYPES: [&str; 2] = ["comfortten", "normal cotton"];
pub const BLANKET_TYPES: [&str; 5] = ["duvet", "comforter", "throw", "electric", "weighted"];

/// Canonical category token for free-form input.
///
/// Known singular/plural spellings collapse onto a [`Category`] token, blank
/// input becomes `all`, anything else passes through trimmed and lower-cased.
/// Idempotent.
pub fn normalize_category(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    match lowered.as_str() {
        "" => "all".to_string(),
        "bedspread" | "bedspreads" => Category::Bedspread.as_str().to_string(),
        "curtain" | "curtains" => Category::Curtain.as_str().to_string(),
        "pillow" | "pillows" => Category::Pillows.as_str().to_string(),
        "blanket" | "blankets" => Category::Blankets.as_str().to_string(),
        _ => lowered,
    }
}

/// Validates free-form category input against the closed set.
pub fn parse_category(input: &str) -> Result<Category, AppError> {
    Category::from_token(&normalize_category(input)).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid category '{}'. Allowed: {}",
            input,
            Category::allowed_list()
        ))
    })
}

/// Known subcategories for a category, if it has a closed vocabulary.
pub fn subcategory_vocabulary(category: &str) -> Option<&'static [&'static str]> {
    match Category::from_token(&normalize_category(category))? {
        Category::Curtain => Some(&CURTAIN_TYPES),
        Category::Pillows => Some(&PILLOW_TYPES),
        Category::Blankets => Some(&BLANKET_TYPES),
        Category::Bedspread => None,
    }
}

/// Maps subcategory synonyms onto the category's vocabulary.
///
/// Advisory only: unknown values come back lower-cased, blank input is `None`.
pub fn normalize_subcategory(category: &str, input: &str) -> Option<String> {
    let value = input.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }

    let synonym = match Category::from_token(&normalize_category(category)) {
        Some(Category::Curtain) => match value.as_str() {
            "2 in 1" | "two-in-one" => Some("two in one"),
            "3 in 1" | "three-in-one" => Some("three in one"),
            "door" => Some("door curtains"),
            "bathroom" => Some("bathroom curtains"),
            _ => CURTAIN_TYPES.iter().copied().find(|known| {
                let head = known.split(' ').next().unwrap_or(known);
                value == *known || value.contains(head)
            }),
        },
        Some(Category::Pillows) => match value.as_str() {
            "throw pillow" | "throw" => Some("throw"),
            "lumbar pillow" | "lumbar" => Some("lumbar"),
            "decorative" => Some("decorative"),
            "bolster" => Some("bolster"),
            "standard" => Some("standard"),
            _ => PILLOW_TYPES.iter().copied().find(|known| value.contains(known)),
        },
        Some(Category::Blankets) => match value.as_str() {
            "duvet cover" => Some("duvet"),
            _ => BLANKET_TYPES.iter().copied().find(|known| value.contains(known)),
        },
        _ => None,
    };

    Some(synonym.map(str::to_string).unwrap_or(value))
}

/// Detects local filesystem paths (`C:\`, `C:/`, UNC, `file://`) that a
/// browser cannot resolve.
pub fn is_local_path(input: &str) -> bool {
    let s = input.trim();
    let bytes = s.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    drive || s.starts_with("\\\\") || s.to_lowercase().starts_with("file://")
}

fn reject_local_image(url: Option<&str>) -> Result<(), AppError> {
    match url {
        Some(url) if is_local_path(url) => Err(AppError::BadRequest(
            "Local file paths are not allowed. Upload the image or provide a public URL starting with https://"
                .into(),
        )),
        _ => Ok(()),
    }
}

fn validate_price(price: Option<f64>) -> Result<(), AppError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => {
            Err(AppError::BadRequest("Price must be a non-negative number".into()))
        }
        _ => Ok(()),
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Validates and normalizes a create request into an insertable row.
pub fn prepare_new_product(request: NewProductRequest) -> Result<NewProduct, AppError> {
    let name = request.name.trim().to_string();
    if name.is_empty() || request.category.trim().is_empty() {
        return Err(AppError::BadRequest("Name and category required".into()));
    }
    let category = parse_category(&request.category)?;
    validate_price(request.price)?;
    reject_local_image(request.image_url.as_deref())?;

    Ok(NewProduct {
        name,
        category,
        subcategory: request
            .subcategory
            .as_deref()
            .and_then(|s| normalize_subcategory(category.as_str(), s)),
        price: request.price,
        image_url: trimmed(request.image_url),
        whatsapp_url: request
            .whatsapp_url
            .as_deref()
            .and_then(normalize_contact)
            .unwrap_or_default(),
        notes: trimmed(request.notes),
        description: trimmed(request.description),
        badge: trimmed(request.badge),
        stock_status: request.stock_status.unwrap_or_default(),
        is_published: request.is_published.unwrap_or(true),
        created_at: Utc::now(),
    })
}

pub async fn create(
    service: &dyn DataService,
    request: NewProductRequest,
) -> Result<Product, AppError> {
    if !service.admin_enabled() {
        return Err(AppError::NotConfigured);
    }
    let row = prepare_new_product(request)?;

    match service.insert_product(&row).await {
        Ok(product) => {
            info!(id = %product.id, category = row.category.as_str(), "product created");
            Ok(product)
        }
        Err(e) if e.message().to_lowercase().contains("violates check constraint") => {
            Err(AppError::BadRequest(
                "Database constraint prevented insert. Ensure the category is allowed on the database."
                    .into(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Builds the whitelisted, normalized patch for a partial update.
pub fn prepare_patch(body: &Map<String, Value>) -> Result<ProductPatch, AppError> {
    let mut patch = ProductPatch::new();
    for key in UPDATABLE_FIELDS {
        if let Some(value) = body.get(key) {
            patch.insert(key.to_string(), value.clone());
        }
    }

    // `visible` is the legacy spelling of `is_published`.
    if let Some(visible) = patch.remove("visible") {
        patch.entry("is_published".to_string()).or_insert(visible);
    }

    if let Some(raw) = patch.get("category") {
        let raw = raw.as_str().unwrap_or_default().to_string();
        let category = parse_category(&raw)?;
        patch.insert("category".into(), Value::from(category.as_str()));
    }

    if let Some(raw) = patch.get("subcategory") {
        let category = patch
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let normalized = raw
            .as_str()
            .and_then(|s| normalize_subcategory(&category, s));
        patch.insert("subcategory".into(), normalized.map(Value::from).unwrap_or(Value::Null));
    }

    if let Some(name) = patch.get("name") {
        let name = name.as_str().map(str::trim).unwrap_or_default().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name cannot be empty".into()));
        }
        patch.insert("name".into(), Value::from(name));
    }

    if let Some(price) = patch.get("price") {
        if !price.is_null() {
            let value = price
                .as_f64()
                .or_else(|| price.as_str().and_then(|s| s.trim().parse().ok()))
                .ok_or_else(|| AppError::BadRequest("Price must be a non-negative number".into()))?;
            validate_price(Some(value))?;
            patch.insert("price".into(), Value::from(value));
        }
    }

    if let Some(stock) = patch.get("stock_status") {
        let status = stock
            .as_str()
            .and_then(StockStatus::parse_lenient)
            .ok_or_else(|| {
                AppError::BadRequest("stock_status must be in_stock, low_stock or out_of_stock".into())
            })?;
        patch.insert("stock_status".into(), Value::from(status.as_str()));
    }

    if let Some(url) = patch.get("whatsapp_url") {
        let normalized = url.as_str().and_then(normalize_contact).unwrap_or_default();
        patch.insert("whatsapp_url".into(), Value::from(normalized));
    }

    reject_local_image(patch.get("image_url").and_then(Value::as_str))?;

    if patch.is_empty() {
        return Err(AppError::BadRequest("No valid fields provided for update".into()));
    }
    Ok(patch)
}

/// Column names the data service complained about.
///
/// Picks up identifiers quoted with `"`, `'` or `` ` `` plus a few columns
/// older schemas are known to lack.
pub fn suspect_columns(message: &str) -> Vec<String> {
    let mut suspects: Vec<String> = Vec::new();
    let chars: Vec<char> = message.chars().collect();
    let is_quote = |c: char| c == '"' || c == '\'' || c == '`';
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';

    let mut i = 0;
    while i < chars.len() {
        if is_quote(chars[i]) {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() && is_ident(chars[end]) {
                end += 1;
            }
            if end > start && end < chars.len() && is_quote(chars[end]) {
                let ident: String = chars[start..end].iter().collect();
                if !suspects.contains(&ident) {
                    suspects.push(ident);
                }
                i = end;
                continue;
            }
        }
        i += 1;
    }

    for known in ["stock_status", "visible", "is_published"] {
        if message.contains(known) && !suspects.iter().any(|s| s == known) {
            suspects.push(known.to_string());
        }
    }
    suspects
}

/// Result of a partial update; `ignored` lists columns dropped on retry.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub product: Product,
    pub ignored: Vec<String>,
}

impl UpdateOutcome {
    pub fn to_json(&self) -> Value {
        let mut body = serde_json::to_value(&self.product).unwrap_or(Value::Null);
        if !self.ignored.is_empty() {
            if let Value::Object(fields) = &mut body {
                fields.insert(
                    "note".into(),
                    Value::from(format!(
                        "Some fields were ignored because they do not exist: {}",
                        self.ignored.join(", ")
                    )),
                );
            }
        }
        body
    }
}

/// Applies a partial update, retrying once without columns the service
/// reports as unknown.
pub async fn update(
    service: &dyn DataService,
    id: &str,
    body: &Map<String, Value>,
) -> Result<UpdateOutcome, AppError> {
    if !service.admin_enabled() {
        return Err(AppError::NotConfigured);
    }
    if id.trim().is_empty() {
        return Err(AppError::BadRequest("Product ID required".into()));
    }
    let mut patch = prepare_patch(body)?;

    let error = match service.update_product(id, &patch).await {
        Ok(product) => {
            return Ok(UpdateOutcome {
                product,
                ignored: Vec::new(),
            })
        }
        Err(RemoteError::NotFound) => return Err(AppError::NotFound("Product not found".into())),
        Err(e) => e,
    };

    let removed: Vec<String> = suspect_columns(&error.message())
        .into_iter()
        .filter(|column| patch.remove(column).is_some())
        .collect();

    if removed.is_empty() || patch.is_empty() {
        return Err(error.into());
    }

    warn!(?removed, "retrying update after removing unknown columns");
    let product = service.update_product(id, &patch).await?;
    Ok(UpdateOutcome {
        product,
        ignored: removed,
    })
}

pub async fn delete(service: &dyn DataService, id: &str) -> Result<Product, AppError> {
    if !service.admin_enabled() {
        return Err(AppError::NotConfigured);
    }
    if id.trim().is_empty() {
        return Err(AppError::BadRequest("Product ID required".into()));
    }
    match service.delete_product(id).await {
        Ok(product) => {
            info!(%id, "product deleted");
            Ok(product)
        }
        Err(RemoteError::NotFound) => Err(AppError::NotFound("Product not found".into())),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_normalization_is_idempotent() {
        assert_eq!(normalize_category("Curtains"), "curtain");
        assert_eq!(normalize_category("curtain"), normalize_category("Curtains"));
        assert_eq!(normalize_category(&normalize_category("CURTAIN")), "curtain");
        assert_eq!(normalize_category(" Pillow "), "pillows");
        assert_eq!(normalize_category("Throws"), "throws");
        assert_eq!(normalize_category(""), "all");
    }

    #[test]
    fn invalid_category_is_rejected_not_coerced() {
        assert_eq!(parse_category("Blanket").unwrap(), Category::Blankets);
        let err = parse_category("rugs").unwrap_err();
        assert!(err.to_string().contains("Invalid category 'rugs'"));
    }

    #[test]
    fn subcategory_synonyms() {
        assert_eq!(normalize_subcategory("curtains", "2 in 1").as_deref(), Some("two in one"));
        assert_eq!(normalize_subcategory("curtain", "Door").as_deref(), Some("door curtains"));
        assert_eq!(
            normalize_subcategory("curtain", "three piece set").as_deref(),
            Some("three in one")
        );
        assert_eq!(normalize_subcategory("blankets", "Duvet Cover").as_deref(), Some("duvet"));
        assert_eq!(normalize_subcategory("pillow", "Throw Pillow").as_deref(), Some("throw"));
        assert_eq!(
            normalize_subcategory("bedspread", "Single Bed").as_deref(),
            Some("single bed")
        );
        assert_eq!(normalize_subcategory("curtain", "  "), None);
    }

    #[test]
    fn local_paths_detected() {
        assert!(is_local_path(r"C:\Users\me\bed.jpg"));
        assert!(is_local_path("d:/pics/bed.jpg"));
        assert!(is_local_path(r"\\server\share\bed.jpg"));
        assert!(is_local_path("FILE:///home/me/bed.jpg"));
        assert!(!is_local_path("https://cdn.example.com/bed.jpg"));
    }

    #[test]
    fn patch_whitelists_and_folds_visible() {
        let body = json!({"visible": false, "owner": "x", "category": "Curtains", "subcategory": "2 in 1"});
        let patch = prepare_patch(body.as_object().unwrap()).unwrap();
        assert_eq!(patch.get("is_published"), Some(&json!(false)));
        assert_eq!(patch.get("category"), Some(&json!("curtain")));
        assert_eq!(patch.get("subcategory"), Some(&json!("two in one")));
        assert!(!patch.contains_key("owner"));
        assert!(!patch.contains_key("visible"));
    }

    #[test]
    fn empty_patch_rejected() {
        let body = json!({"owner": "x"});
        assert!(matches!(
            prepare_patch(body.as_object().unwrap()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn suspects_quoted_identifiers() {
        let found = suspect_columns(
            "Could not find the 'stock_status' column of 'products' in the schema cache",
        );
        assert_eq!(found, vec!["stock_status".to_string(), "products".to_string()]);
        assert_eq!(suspect_columns("column visible does not exist"), vec!["visible".to_string()]);
    }

    #[test]
    fn new_product_is_normalized() {
        let row = prepare_new_product(NewProductRequest {
            name: "  Velvet Door Curtain ".into(),
            category: "Curtains".into(),
            subcategory: Some("door".into()),
            whatsapp_url: Some("0554731557".into()),
            price: Some(120.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(row.name, "Velvet Door Curtain");
        assert_eq!(row.category, Category::Curtain);
        assert_eq!(row.subcategory.as_deref(), Some("door curtains"));
        assert_eq!(row.whatsapp_url, "https://wa.me/233554731557");
        assert!(row.is_published);
    }

    #[test]
    fn negative_price_rejected() {
        let err = prepare_new_product(NewProductRequest {
            name: "Throw".into(),
            category: "blankets".into(),
            price: Some(-1.0),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
