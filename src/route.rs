//! Route definitions
//!
//! Public JSON endpoints, admin endpoints behind [`require_admin`], the
//! server-rendered pages and the static site with an `index.html` fallback.

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::database::AppState;
use crate::handler::{
    admin_dashboard, admin_stats, bootstrap_profile, bulk_delete, bulk_stock, create_product,
    delete_product, get_product, healthz, list_clicks, list_products, order_redirect,
    public_config, shop_page, subcategory_field, track_click, update_product,
};
use crate::middleware::require_admin;

/// Creates the application router
///
/// # Route Definitions
///
/// - `GET /api/products` - all products (public)
/// - `GET /api/products/{id}` - one product with inferred facets (public)
/// - `POST /api/products` - create (admin)
/// - `PUT /api/products/{id}` - partial update (admin)
/// - `DELETE /api/products/{id}` - delete (admin)
/// - `POST /api/products/bulk/delete`, `POST /api/products/bulk/stock` - bulk edits (admin)
/// - `GET /api/admin/stats` - dashboard counts (admin)
/// - `POST /api/profiles/bootstrap` - grant admin role via the email allow-list
/// - `GET|POST /api/tracking` - WhatsApp click counters
/// - `GET /order/{id}` - count a click and redirect to WhatsApp
/// - `GET /config`, `GET /healthz`
/// - `GET /shop`, `GET /admin/dashboard`, `GET /admin/subcategory-field`
/// - anything else is served from the public directory
///
/// # Arguments
///
/// * `state` - Shared state: click database, data service and configuration
///
/// # Returns
///
/// Configured Axum Router ready to handle requests
///
/// # Example Usage
///
/// ```no_run
/// # use std::sync::Arc;
/// # use storefront::config::Config;
/// # use storefront::database::{init_db, AppState};
/// # use storefront::memory::MemoryService;
/// # use storefront::route::create_app;
/// # let db = init_db("clicks.db").unwrap();
/// let state = AppState::new(db, Arc::new(MemoryService::new()), Config::default());
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/products", post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/products/bulk/delete", post(bulk_delete))
        .route("/products/bulk/stock", post(bulk_stock))
        .route("/admin/stats", get(admin_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let public_routes = Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route("/profiles/bootstrap", post(bootstrap_profile))
        .route("/tracking", get(list_clicks).post(track_click));

    let public_dir = state.config.public_dir.clone();
    let static_files =
        ServeDir::new(&public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    Router::new()
        .nest("/api", admin_routes.merge(public_routes))
        .route("/config", get(public_config))
        .route("/healthz", get(healthz))
        .route("/order/{id}", get(order_redirect))
        .route("/shop", get(shop_page))
        .route("/admin/dashboard", get(admin_dashboard))
        .route("/admin/subcategory-field", get(subcategory_field))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
