//! Handler tests for the catalog domain
//!
//! These drive the product router directly with `oneshot`:
//! - request extraction (JSON bodies, ids, query strings, uploads)
//! - status codes
//! - response and error bodies

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{CREATOR, CSV_HEADER, seeded_repo};
use domain_catalog::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

async fn app() -> Router {
    handlers::router(ProductService::new(seeded_repo().await))
}

async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn widget_json(sku: &str, slug: &str) -> Value {
    json!({
        "sku": sku,
        "slug": slug,
        "name": "Widget",
        "price": "9.99",
        "quantity": 5,
        "unitId": 1,
        "categoryId": 1,
        "brandId": 1,
        "subCategoryId": 1,
        "storeId": 1,
        "warehouseId": 1
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-id", CREATOR.to_string())
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_create_returns_201_with_projection() {
    let app = app().await;

    let response = app
        .oneshot(post_json("/", &widget_json("SKU1", "sku1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["sku"], "SKU1");
    assert_eq!(body["status"], "active");
    assert_eq!(body["price"], "9.99");
    assert_eq!(body["unit_short_name"], "pc");
    assert_eq!(body["created_by"], CREATOR);
    assert_eq!(body["created_by_name"], "Jordan");
}

#[tokio::test]
async fn test_duplicate_sku_returns_409_with_field() {
    let app = app().await;

    let first = app
        .clone()
        .oneshot(post_json("/", &widget_json("SKU1", "sku1")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(post_json("/", &widget_json("SKU1", "sku1-b")))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = json_body(second.into_body()).await;
    assert_eq!(body["error"], "DUPLICATE_KEY");
    assert_eq!(body["message"], "SKU already in use");
    assert_eq!(body["details"]["field"], "sku");
    assert_eq!(body["details"]["value"], "SKU1");
}

#[tokio::test]
async fn test_invalid_enum_lists_allowed_values() {
    let app = app().await;
    let mut input = widget_json("SKU1", "sku1");
    input["barcodeSymbology"] = json!("pdf417");

    let response = app.oneshot(post_json("/", &input)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_ENUM");
    assert_eq!(body["details"]["field"], "barcode_symbology");
    assert_eq!(body["details"]["allowed"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_missing_reference_returns_400() {
    let app = app().await;
    let mut input = widget_json("SKU1", "sku1");
    input["unitId"] = json!(77);

    let response = app.oneshot(post_json("/", &input)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "REFERENCE_NOT_FOUND");
    assert_eq!(body["message"], "Unit not found");
    assert_eq!(body["details"]["kind"], "unit");
    assert_eq!(body["details"]["id"], 77);
}

#[tokio::test]
async fn test_body_validation_failure_returns_400() {
    let app = app().await;
    let mut input = widget_json("SKU1", "sku1");
    input["sku"] = json!("");

    let response = app.oneshot(post_json("/", &input)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_unknown_and_malformed_ids() {
    let app = app().await;

    let missing = app.clone().oneshot(empty("GET", "/999")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body = json_body(missing.into_body()).await;
    assert_eq!(body["message"], "Product 999 not found");

    let malformed = app.oneshot(empty("GET", "/abc")).await.unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    let body = json_body(malformed.into_body()).await;
    assert_eq!(body["error"], "INVALID_ID");
}

#[tokio::test]
async fn test_delete_answers_with_message_and_hides_product() {
    let app = app().await;
    let created = app
        .clone()
        .oneshot(post_json("/", &widget_json("SKU1", "sku1")))
        .await
        .unwrap();
    let id = json_body(created.into_body()).await["id"].as_i64().unwrap();

    let deleted = app
        .clone()
        .oneshot(empty("DELETE", &format!("/{id}")))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(
        json_body(deleted.into_body()).await,
        json!({ "message": "Product deleted" })
    );

    let fetched = app
        .clone()
        .oneshot(empty("GET", &format!("/{id}")))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::NOT_FOUND);

    let listing = app.oneshot(empty("GET", "/?status=DELETED")).await.unwrap();
    assert_eq!(listing.status(), StatusCode::OK);
    assert_eq!(json_body(listing.into_body()).await["total_items"], 0);
}

#[tokio::test]
async fn test_update_status_via_query_string() {
    let app = app().await;
    let created = app
        .clone()
        .oneshot(post_json("/", &widget_json("SKU1", "sku1")))
        .await
        .unwrap();
    let id = json_body(created.into_body()).await["id"].as_i64().unwrap();

    let ok = app
        .clone()
        .oneshot(empty("PUT", &format!("/{id}/status?status=inactive")))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(json_body(ok.into_body()).await["status"], "inactive");

    let bad = app
        .oneshot(empty("PUT", &format!("/{id}/status?status=DELETED")))
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    let body = json_body(bad.into_body()).await;
    assert_eq!(body["error"], "INVALID_STATUS");
    assert_eq!(body["message"], "Invalid status: must be 'active' or 'inactive'");
}

#[tokio::test]
async fn test_partial_update_via_put() {
    let app = app().await;
    let created = app
        .clone()
        .oneshot(post_json("/", &widget_json("SKU1", "sku1")))
        .await
        .unwrap();
    let id = json_body(created.into_body()).await["id"].as_i64().unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/{id}"))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "quantity": 0, "qtyAlert": 2 }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["quantity"], 0);
    assert_eq!(body["qty_alert"], 2);
    assert_eq!(body["name"], "Widget");
}

#[tokio::test]
async fn test_duplicate_returns_201() {
    let app = app().await;
    let created = app
        .clone()
        .oneshot(post_json("/", &widget_json("SKU1", "sku1")))
        .await
        .unwrap();
    let id = json_body(created.into_body()).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(empty("POST", &format!("/{id}/duplicate")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["slug"], "sku1-copy");
    assert_ne!(body["id"].as_i64().unwrap(), id);
}

#[tokio::test]
async fn test_barcode_data_without_symbology_is_400() {
    let app = app().await;
    let created = app
        .clone()
        .oneshot(post_json("/", &widget_json("SKU1", "sku1")))
        .await
        .unwrap();
    let id = json_body(created.into_body()).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(empty("GET", &format!("/{id}/barcode-data")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "BARCODE_UNAVAILABLE");
}

#[tokio::test]
async fn test_low_stocks_and_listing_metadata() {
    let app = app().await;
    let mut low = widget_json("LOW", "low");
    low["quantity"] = json!(3);
    low["qtyAlert"] = json!(5);
    app.clone().oneshot(post_json("/", &low)).await.unwrap();
    let mut plenty = widget_json("PLENTY", "plenty");
    plenty["quantity"] = json!(10);
    plenty["qtyAlert"] = json!(5);
    app.clone().oneshot(post_json("/", &plenty)).await.unwrap();

    let response = app.clone().oneshot(empty("GET", "/low-stocks")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["items"][0]["sku"], "LOW");

    let response = app
        .clone()
        .oneshot(empty("GET", "/?size=1&page=1&sortBy=sku&sortDir=asc"))
        .await
        .unwrap();
    let body = json_body(response.into_body()).await;
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["items"][0]["sku"], "PLENTY");

    let response = app.clone().oneshot(empty("GET", "/?size=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(empty("GET", "/?page=9223372036854775807&size=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_text_body() {
    let app = app().await;
    let csv = format!("{CSV_HEADER}\nA,IMP1,imp-1,1.00,1,1,1,1,1,1,1\nB,IMP2,imp-2,oops,1,1,1,1,1,1,1");

    let request = Request::builder()
        .method("POST")
        .uri("/import")
        .header("content-type", "text/csv")
        .body(Body::from(csv))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["total_rows"], 2);
    assert_eq!(body["imported"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0], "Row 2: Invalid price: 'oops'");
}

#[tokio::test]
async fn test_import_with_missing_column_is_rejected() {
    let app = app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/import")
        .body(Body::from("name,sku\nA,B"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "IMPORT_REJECTED");
    assert_eq!(body["message"], "Missing required column: slug");
}

#[tokio::test]
async fn test_import_file_upload() {
    let app = app().await;
    let csv = format!("{CSV_HEADER}\nA,IMP1,imp-1,1.00,1,1,1,1,1,1,1");
    let boundary = "catalog-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"products.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{boundary}--\r\n"
    );

    let request = Request::builder()
        .method("POST")
        .uri("/import-file")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["imported"], 1);
    assert_eq!(body["failed"], 0);
}
