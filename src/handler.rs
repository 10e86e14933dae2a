//! HTTP request handlers
//!
//! JSON endpoints for the product API, click tracking and public config, plus
//! the server-rendered storefront and admin pages.

use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::admin::{
    self, render_stats, render_subcategory_field, AdminController, AdminError, AdminIdentity,
    LOGIN_PAGE,
};
use crate::catalog;
use crate::database::{read_clicks, record_click, AppState};
use crate::error::AppError;
use crate::facets::{fabric_blurb, infer};
use crate::filter::{FilterParams, FilterState};
use crate::middleware::{bearer_token, session_token};
use crate::model::{BulkRequest, CatalogStats, NewProductRequest, PublicConfig, TrackRequest};
use crate::prefs::CookiePreferences;
use crate::remote::ProductScope;
use crate::render::html_escape;
use crate::tracking::{click_key, join_clicks};
use crate::view::{Storefront, ViewMode};
use crate::whatsapp::{order_link, OrderRequest};

fn cookie_prefs(headers: &HeaderMap) -> CookiePreferences {
    CookiePreferences::from_header(headers.get(header::COOKIE).and_then(|v| v.to_str().ok()))
}

fn set_cookies(prefs: &CookiePreferences) -> AppendHeaders<Vec<(header::HeaderName, String)>> {
    AppendHeaders(
        prefs
            .set_cookie_headers()
            .into_iter()
            .map(|cookie| (header::SET_COOKIE, cookie))
            .collect(),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/styles.css">
</head>
<body>
{body}
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Lists every product, newest first.
///
/// # Response
///
/// - **200 OK** - JSON array of product rows
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.data.list_products(ProductScope::All).await?;
    Ok(Json(products))
}

/// One product with its inferred facets and fabric description.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .data
        .get_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    let facets = infer(&product);
    Ok(Json(json!({
        "product": product,
        "facets": facets,
        "fabric_description": fabric_blurb(&facets),
    })))
}

/// Creates a product. Admin only.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Royal Velvet Bedspread",
///   "category": "Bedspreads",
///   "price": 450
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - the inserted row
/// - **400 Bad Request** - missing name/category, unknown category, constraint violation
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<NewProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let product = catalog::create(state.data.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Partial update. Admin only.
///
/// Unknown keys are ignored. Columns the data service rejects are dropped
/// and the update retried once; the response then carries a `note`.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = catalog::update(state.data.as_ref(), &id, &body).await?;
    Ok(Json(outcome.to_json()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = catalog::delete(state.data.as_ref(), &id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

fn controller(state: &AppState, identity: AdminIdentity) -> AdminController<CookiePreferences> {
    AdminController::new(
        state.data.clone(),
        state.config.admin_emails.clone(),
        &state.config.storage_bucket,
        CookiePreferences::default(),
    )
    .with_identity(identity)
}

/// Deletes the listed ids in order, stopping at the first failure.
///
/// # Request Body
///
/// ```json
/// { "ids": ["a", "b"], "confirm": true }
/// ```
pub async fn bulk_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Json(payload): Json<BulkRequest>,
) -> Result<impl IntoResponse, AdminError> {
    let deleted = controller(&state, identity)
        .bulk_delete(&payload.ids, payload.confirm)
        .await?;
    Ok(Json(json!({ "deleted": deleted })))
}

/// Sets `stock_status` on the listed ids in order, stopping at the first failure.
pub async fn bulk_stock(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Json(payload): Json<BulkRequest>,
) -> Result<impl IntoResponse, AdminError> {
    let status = payload
        .stock_status
        .ok_or_else(|| AppError::BadRequest("stock_status required".into()))?;
    let updated = controller(&state, identity)
        .bulk_stock(&payload.ids, status)
        .await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn admin_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.data.list_products(ProductScope::All).await?;
    Ok(Json(CatalogStats::from_products(&products)))
}

/// Grants the admin role to the caller if their email is on `ADMIN_EMAILS`.
///
/// # Response
///
/// - **200 OK** - `{ "ok": true, "profile": {...} }`
/// - **401 Unauthorized** - missing or invalid token
/// - **403 Forbidden** - email not on the allow-list
pub async fn bootstrap_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("Missing access token".into()))?;
    let user = admin::verify_session(state.data.as_ref(), &token).await?;
    let profile =
        admin::bootstrap_profile(state.data.as_ref(), &state.config.admin_emails, &user).await?;
    Ok(Json(json!({ "ok": true, "profile": profile })))
}

/// Records one WhatsApp click.
///
/// # Request Body
///
/// ```json
/// { "productId": "0b6f...", "name": "Royal Velvet Bedspread" }
/// ```
pub async fn track_click(
    State(state): State<AppState>,
    Json(payload): Json<TrackRequest>,
) -> Result<impl IntoResponse, AppError> {
    let key = click_key(&payload)?;
    let clicks = record_click(&state.db, &key, payload.name.as_deref())?;
    debug!(%key, clicks, "click recorded");
    Ok(Json(json!({ "ok": true, "clicks": clicks })))
}

/// Click counters joined with product names, most clicked first.
pub async fn list_clicks(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = read_clicks(&state.db)?;
    let products = state
        .data
        .list_products(ProductScope::All)
        .await
        .unwrap_or_else(|e| {
            warn!("click report without product names: {e}");
            Vec::new()
        });
    Ok(Json(join_clicks(rows, &products)))
}

/// Public client configuration. Never includes the service role key.
pub async fn public_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(PublicConfig {
        supabase_url: state.config.supabase_url.clone().unwrap_or_default(),
        supabase_anon_key: state.config.supabase_anon_key.clone(),
    })
}

pub async fn healthz() -> impl IntoResponse {
    "OK"
}

#[derive(Deserialize, Debug, Default)]
pub struct OrderParams {
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: Option<u32>,
}

/// Counts the click and redirects to the WhatsApp deep link for a product.
pub async fn order_redirect(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<OrderParams>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .data
        .get_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let message = OrderRequest {
        product_name: product.name.clone(),
        size: params.size,
        color: params.color,
        quantity: params.quantity.unwrap_or(1).max(1),
    }
    .message();
    let contact = product
        .whatsapp_url
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(&state.config.whatsapp_number);

    record_click(&state.db, &product.id, Some(&product.name))?;
    Ok(Redirect::to(&order_link(contact, &message)))
}

#[derive(Deserialize, Debug, Default)]
pub struct ShopParams {
    pub view: Option<String>,
    pub clear: Option<String>,
}

/// Server-rendered storefront results.
pub async fn shop_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filters): Query<FilterParams>,
    Query(params): Query<ShopParams>,
) -> Response {
    let mut store = Storefront::new(FilterState::from_params(&filters), cookie_prefs(&headers));
    if let Some(mode) = params.view.as_deref().and_then(ViewMode::parse) {
        store.set_view(mode);
    }
    if params.clear.is_some() {
        store.clear_filters();
    }
    store.load(state.data.as_ref()).await;

    let body = page("Shop", &store.render());
    (set_cookies(store.prefs()), Html(body)).into_response()
}

#[derive(Deserialize, Debug, Default)]
pub struct DashboardParams {
    pub grouped: Option<bool>,
    pub collapse: Option<String>,
    pub expand: Option<String>,
}

/// Admin dashboard. Anyone without an admin session is sent to the login page.
pub async fn admin_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DashboardParams>,
) -> Response {
    let Some(token) = session_token(&headers) else {
        return Redirect::to(LOGIN_PAGE).into_response();
    };

    let mut admin = AdminController::new(
        state.data.clone(),
        state.config.admin_emails.clone(),
        &state.config.storage_bucket,
        cookie_prefs(&headers),
    );
    admin.authenticate(&token).await;
    if !admin.is_authorized() {
        return Redirect::to(LOGIN_PAGE).into_response();
    }

    if let Some(grouped) = params.grouped {
        admin.set_grouped(grouped);
    }
    if let Some(section) = params.collapse.as_deref() {
        admin.set_collapsed(section, true);
    }
    if let Some(section) = params.expand.as_deref() {
        admin.set_collapsed(section, false);
    }

    let dashboard = match admin.load_dashboard().await {
        Ok(dashboard) => dashboard,
        Err(e) => return e.into_response(),
    };
    let body = format!(
        "<main class=\"admin\">\n<h1>Products</h1>\n{}\n{}\n</main>",
        render_stats(&dashboard.stats),
        admin.render_table(&dashboard.products)
    );
    let cookies = set_cookies(admin.prefs());
    (cookies, Html(page("Admin Dashboard", &body))).into_response()
}

#[derive(Deserialize, Debug, Default)]
pub struct SubcategoryParams {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub current: String,
}

pub async fn subcategory_field(Query(params): Query<SubcategoryParams>) -> impl IntoResponse {
    Html(render_subcategory_field(&params.category, &params.current))
}
