//! Admin controller tests
//!
//! Drive [`AdminController`] against the in-memory data service: the
//! authentication gate, two-phase saves and fail-fast bulk operations.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use storefront::admin::{AdminController, AdminError, AdminSession, AuthEvent, ProductForm};
use storefront::config::Config;
use storefront::database::{init_db, AppState};
use storefront::memory::MemoryService;
use storefront::model::{AuthUser, Product, Profile, StockStatus};
use storefront::prefs::{MemoryPreferences, Preferences, GROUP_KEY};
use storefront::remote::{DataService, ImageUpload, ProductScope};
use storefront::route::create_app;

const TOKEN: &str = "admin-token";

fn products(ids: &[&str]) -> Vec<Product> {
    ids.iter()
        .map(|id| {
            serde_json::from_value(json!({
                "id": id,
                "name": format!("Product {id}"),
                "category": "bedspread",
                "price": 100,
            }))
            .unwrap()
        })
        .collect()
}

fn admin_service(rows: Vec<Product>) -> Arc<MemoryService> {
    Arc::new(
        MemoryService::new()
            .with_products(rows)
            .with_session(
                TOKEN,
                AuthUser {
                    id: "u1".into(),
                    email: Some("owner@shop.com".into()),
                },
            )
            .with_profile(Profile {
                id: "u1".into(),
                email: Some("owner@shop.com".into()),
                role: Some("admin".into()),
                updated_at: None,
            }),
    )
}

async fn signed_in(service: Arc<MemoryService>) -> AdminController<MemoryPreferences> {
    let mut admin = AdminController::new(
        service,
        vec!["owner@shop.com".into()],
        "product-images",
        MemoryPreferences::default(),
    );
    admin.authenticate(TOKEN).await;
    assert!(admin.is_authorized());
    admin
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn upload() -> ImageUpload {
    ImageUpload {
        file_name: "curtain.jpg".into(),
        content_type: "image/jpeg".into(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    }
}

#[tokio::test]
async fn test_bulk_delete_stops_at_first_failure() {
    let service = admin_service(products(&["a", "b", "c"]));
    service.fail_delete_of("b");
    let admin = signed_in(service.clone()).await;

    let err = admin
        .bulk_delete(&ids(&["a", "b", "c"]), true)
        .await
        .unwrap_err();
    match err {
        AdminError::Bulk(bulk) => {
            assert_eq!(bulk.completed, 1);
            assert_eq!(bulk.failed_id, "b");
        }
        other => panic!("expected bulk error, got {other:?}"),
    }

    // Follow-up fetch: "a" is gone for good, "b" failed, "c" was never tried.
    let remaining: Vec<String> = service
        .list_products(ProductScope::All)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert!(!remaining.contains(&"a".to_string()));
    assert!(remaining.contains(&"b".to_string()));
    assert!(remaining.contains(&"c".to_string()));
}

#[tokio::test]
async fn test_bulk_delete_requires_confirmation() {
    let service = admin_service(products(&["a"]));
    let admin = signed_in(service.clone()).await;

    let err = admin.bulk_delete(&ids(&["a"]), false).await.unwrap_err();
    assert!(matches!(err, AdminError::NotConfirmed));
    assert_eq!(service.products().len(), 1);

    assert!(matches!(
        admin.delete("a", false).await,
        Err(AdminError::NotConfirmed)
    ));
    assert_eq!(admin.delete("a", true).await.unwrap().id, "a");
}

#[tokio::test]
async fn test_bulk_stock_stops_at_missing_row() {
    let service = admin_service(products(&["a", "c"]));
    let admin = signed_in(service.clone()).await;

    let err = admin
        .bulk_stock(&ids(&["a", "missing", "c"]), StockStatus::LowStock)
        .await
        .unwrap_err();
    let AdminError::Bulk(bulk) = err else {
        panic!("expected bulk error");
    };
    assert_eq!(bulk.completed, 1);
    assert_eq!(bulk.failed_id, "missing");

    let rows = service.products();
    let stock = |id: &str| {
        rows.iter()
            .find(|p| p.id == id)
            .and_then(|p| p.stock_status.clone())
    };
    assert_eq!(stock("a").as_deref(), Some("low_stock"));
    assert_eq!(stock("c"), None);
}

#[tokio::test]
async fn test_bulk_delete_over_http_reports_failing_id() {
    let service = admin_service(products(&["a", "b", "c"]));
    service.fail_delete_of("b");
    let temp_db = NamedTempFile::new().unwrap();
    let db = init_db(temp_db.path().to_str().unwrap()).unwrap();
    let app = create_app(AppState::new(db, service.clone(), Config::default()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/products/bulk/delete")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {TOKEN}"))
                .body(Body::from(
                    json!({ "ids": ["a", "b", "c"], "confirm": true }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["failed_id"], "b");
    assert_eq!(body["completed"], 1);
    assert_eq!(service.products().len(), 2);
}

#[tokio::test]
async fn test_save_uploads_image_before_insert() {
    let service = admin_service(Vec::new());
    let admin = signed_in(service.clone()).await;

    let form = ProductForm {
        name: "Sheer Curtain".into(),
        category: "curtains".into(),
        subcategory: "two-in-one".into(),
        price: "75".into(),
        image_url: "https://example.com/typed.jpg".into(),
        ..Default::default()
    };
    let product = admin.save(form, Some(upload())).await.unwrap();

    let paths = service.object_paths();
    assert_eq!(paths.len(), 1);
    let object = paths[0].strip_prefix("product-images/").unwrap();
    let (millis, name) = object.split_once('-').unwrap();
    assert!(millis.parse::<i64>().is_ok());
    assert_eq!(name, "curtain.jpg");

    let url = product.image_url.unwrap();
    assert!(url.ends_with(object));
    assert_eq!(product.subcategory.as_deref(), Some("two in one"));
    assert_eq!(product.price, Some(75.0));
}

#[tokio::test]
async fn test_uploaded_file_name_is_url_encoded() {
    let service = admin_service(Vec::new());
    let admin = signed_in(service.clone()).await;

    let form = ProductForm {
        name: "Lace Panel".into(),
        category: "curtain".into(),
        ..Default::default()
    };
    let image = ImageUpload {
        file_name: "my photo #1.jpg".into(),
        ..upload()
    };
    let product = admin.save(form, Some(image)).await.unwrap();

    let url = product.image_url.unwrap();
    assert!(url.ends_with("-my%20photo%20%231.jpg"), "{url}");
    assert!(!url.contains('#'));
    assert!(service.object_paths()[0].ends_with("-my photo #1.jpg"));
}

#[tokio::test]
async fn test_failed_upload_leaves_catalog_untouched() {
    let service = admin_service(Vec::new());
    service.fail_uploads(true);
    let admin = signed_in(service.clone()).await;

    let form = ProductForm {
        name: "Sheer Curtain".into(),
        category: "curtain".into(),
        ..Default::default()
    };
    let err = admin.save(form, Some(upload())).await.unwrap_err();
    assert!(matches!(err, AdminError::Upload(_)));
    assert!(service.products().is_empty());
}

#[tokio::test]
async fn test_invalid_form_makes_no_remote_call() {
    let service = admin_service(Vec::new());
    let admin = signed_in(service.clone()).await;

    let form = ProductForm {
        name: "Duvet".into(),
        category: "blankets".into(),
        image_url: r"\\nas\share\duvet.png".into(),
        ..Default::default()
    };
    let err = admin.save(form, Some(upload())).await.unwrap_err();
    match err {
        AdminError::Form(e) => assert_eq!(e.field, "image_url"),
        other => panic!("expected form error, got {other:?}"),
    }
    assert!(service.object_paths().is_empty());
    assert!(service.products().is_empty());
}

#[tokio::test]
async fn test_edit_without_new_image_keeps_url() {
    let mut rows = products(&["a"]);
    rows[0].image_url = Some("https://cdn.example.com/a.jpg".into());
    let service = admin_service(rows);
    let admin = signed_in(service.clone()).await;

    let mut form = ProductForm::from_product(&service.products()[0]);
    form.image_url.clear();
    form.price = "120".into();
    let updated = admin.save(form, None).await.unwrap();

    assert_eq!(updated.price, Some(120.0));
    assert_eq!(
        updated.image_url.as_deref(),
        Some("https://cdn.example.com/a.jpg")
    );
}

#[tokio::test]
async fn test_second_submit_is_rejected_while_saving() {
    let service = admin_service(Vec::new());
    let admin = signed_in(service.clone()).await;
    let form = ProductForm {
        name: "Throw".into(),
        category: "blankets".into(),
        ..Default::default()
    };

    let guard = admin.begin_submit().unwrap();
    assert!(matches!(
        admin.save(form.clone(), None).await,
        Err(AdminError::Busy)
    ));
    drop(guard);

    assert!(admin.save(form, None).await.is_ok());
    assert_eq!(service.products().len(), 1);
}

#[tokio::test]
async fn test_authentication_gate_states() {
    let service = admin_service(Vec::new());
    let mut admin = AdminController::new(
        service.clone(),
        Vec::new(),
        "product-images",
        MemoryPreferences::default(),
    );
    assert_eq!(admin.session(), &AdminSession::Anonymous);

    let state = admin.authenticate("bogus").await.clone();
    assert!(matches!(state, AdminSession::Unauthorized(_)));
    assert!(matches!(
        admin.save(ProductForm::default(), None).await,
        Err(AdminError::NotAuthorized)
    ));

    admin.authenticate(TOKEN).await;
    assert!(admin.is_authorized());

    admin.on_auth_event(AuthEvent::SignedOut);
    assert_eq!(admin.session(), &AdminSession::Anonymous);

    admin.authenticate(TOKEN).await;
    admin.logout().await;
    assert_eq!(admin.session(), &AdminSession::Anonymous);
    assert!(!service.is_signed_in(TOKEN));
}

#[tokio::test]
async fn test_bootstrap_once_for_allow_listed_user() {
    let service = Arc::new(MemoryService::new().with_session(
        "new-owner",
        AuthUser {
            id: "u9".into(),
            email: Some("owner@shop.com".into()),
        },
    ));
    let mut admin = AdminController::new(
        service.clone(),
        vec!["owner@shop.com".into()],
        "product-images",
        MemoryPreferences::default(),
    );
    admin.authenticate("new-owner").await;
    assert!(admin.is_authorized());

    let profile = service.get_profile("u9").await.unwrap().unwrap();
    assert!(profile.is_admin());
}

#[tokio::test]
async fn test_dashboard_table_grouping_preference() {
    let mut rows = products(&["a", "b"]);
    rows[1].category = "curtain".into();
    rows[1].subcategory = Some("door curtains".into());
    let service = admin_service(rows);
    let mut admin = signed_in(service).await;

    let dashboard = admin.load_dashboard().await.unwrap();
    assert_eq!(dashboard.stats.total, 2);

    let flat = admin.render_table(&dashboard.products);
    assert!(flat.contains("products-table"));
    assert!(!flat.contains("category-group"));

    admin.set_grouped(true);
    admin.set_collapsed("curtain", true);
    let grouped = admin.render_table(&dashboard.products);
    assert!(grouped.contains(r#"data-section="bedspread" open"#));
    assert!(grouped.contains(r#"data-section="curtain">"#));
    assert!(grouped.find("Bedspread (1)").unwrap() < grouped.find("Curtain (1)").unwrap());
    assert!(admin.prefs().get_bool(GROUP_KEY));
}
