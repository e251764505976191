use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, IdPath, Principal, ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse, PayloadTooLargeResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult};
use crate::import::ImportReport;
use crate::lifecycle::ProductStatus;
use crate::models::{
    BarcodeSymbology, CreateProduct, DiscountType, ExpiredParams, ImportFile, LowStockParams,
    MessageResponse, ProductListParams, ProductType, SellingType, StatusParams, StockParams,
    TaxType, UpdateProduct,
};
use crate::projection::{BarcodeData, ProductPage, ProductView};
use crate::repository::ProductRepository;
use crate::service::ProductService;

pub const TAG: &str = "products";

/// Room for multipart framing on top of the CSV payload itself.
const IMPORT_BODY_SLACK: usize = 64 * 1024;

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        manage_stock,
        low_stocks,
        expired_products,
        import_csv,
        import_csv_file,
        get_product,
        update_product,
        delete_product,
        duplicate_product,
        update_status,
        barcode_data,
    ),
    components(
        schemas(
            ProductView,
            ProductPage,
            CreateProduct,
            UpdateProduct,
            ImportReport,
            ImportFile,
            BarcodeData,
            MessageResponse,
            ProductStatus,
            BarcodeSymbology,
            SellingType,
            ProductType,
            TaxType,
            DiscountType,
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            ConflictResponse,
            PayloadTooLargeResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Create the product router with all HTTP endpoints
pub fn router<R: ProductRepository>(service: ProductService<R>) -> Router {
    let import_limit = service.config().max_import_bytes + IMPORT_BODY_SLACK;
    let shared_service = Arc::new(service);

    let import_routes = Router::new()
        .route("/import", post(import_csv))
        .route("/import-file", post(import_csv_file))
        .layer(DefaultBodyLimit::max(import_limit));

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/stocks", get(manage_stock))
        .route("/low-stocks", get(low_stocks))
        .route("/expired", get(expired_products))
        .merge(import_routes)
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/duplicate", post(duplicate_product))
        .route("/{id}/status", put(update_status))
        .route("/{id}/barcode-data", get(barcode_data))
        .with_state(shared_service)
}

fn product_resource(id: i64) -> Option<String> {
    Some(format!("product:{}", id))
}

/// List products with optional filters
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ProductListParams),
    responses(
        (status = 200, description = "Page of products", body = ProductPage),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<ProductListParams>,
) -> ProductResult<Json<ProductPage>> {
    let page = service.list_products(params).await?;
    Ok(Json(page))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = ProductView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Principal(actor): Principal,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input, actor).await?;

    AuditEvent::new(
        actor,
        "product.create",
        product_resource(product.id),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .with_details(json!({ "sku": product.sku, "slug": product.slug }))
    .log();

    Ok((StatusCode::CREATED, Json(product)))
}

/// Stock management listing
#[utoipa::path(
    get,
    path = "/stocks",
    tag = TAG,
    params(StockParams),
    responses(
        (status = 200, description = "Page of products", body = ProductPage),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn manage_stock<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<StockParams>,
) -> ProductResult<Json<ProductPage>> {
    let page = service.manage_stock(params).await?;
    Ok(Json(page))
}

/// Products at or below their low-stock threshold
#[utoipa::path(
    get,
    path = "/low-stocks",
    tag = TAG,
    params(LowStockParams),
    responses(
        (status = 200, description = "Page of low-stock products", body = ProductPage),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn low_stocks<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<LowStockParams>,
) -> ProductResult<Json<ProductPage>> {
    let page = service.low_stocks(params).await?;
    Ok(Json(page))
}

/// Products expired on or before today
#[utoipa::path(
    get,
    path = "/expired",
    tag = TAG,
    params(ExpiredParams),
    responses(
        (status = 200, description = "Page of expired products", body = ProductPage),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn expired_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<ExpiredParams>,
) -> ProductResult<Json<ProductPage>> {
    let page = service.expired_products(params).await?;
    Ok(Json(page))
}

fn audit_import(actor: Option<i64>, headers: &HeaderMap, report: &ImportReport) {
    AuditEvent::new(actor, "product.import", None, AuditOutcome::Success)
        .with_request(headers)
        .with_details(json!({
            "total_rows": report.total_rows,
            "imported": report.imported,
            "failed": report.failed,
        }))
        .log();
}

/// Bulk import from CSV text
#[utoipa::path(
    post,
    path = "/import",
    tag = TAG,
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 400, response = BadRequestValidationResponse),
        (status = 413, response = PayloadTooLargeResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn import_csv<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Principal(actor): Principal,
    headers: HeaderMap,
    body: String,
) -> ProductResult<Json<ImportReport>> {
    let report = service.import_csv(&body, actor).await?;
    audit_import(actor, &headers, &report);
    Ok(Json(report))
}

/// Bulk import from an uploaded CSV file in the `file` field
#[utoipa::path(
    post,
    path = "/import-file",
    tag = TAG,
    request_body(content = ImportFile, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 400, response = BadRequestValidationResponse),
        (status = 413, response = PayloadTooLargeResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn import_csv_file<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Principal(actor): Principal,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ProductResult<Json<ImportReport>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ProductError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content = field
            .bytes()
            .await
            .map_err(|e| ProductError::Validation(format!("Unreadable file: {}", e)))?;

        let report = service.import_bytes(&content, actor).await?;
        audit_import(actor, &headers, &report);
        return Ok(Json(report));
    }

    Err(ProductError::Validation(
        "Missing multipart field: file".to_string(),
    ))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductView),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<ProductView>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Partially update a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = ProductView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Principal(actor): Principal,
    headers: HeaderMap,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<ProductView>> {
    let product = service.update_product(id, input).await?;

    AuditEvent::new(actor, "product.update", product_resource(id), AuditOutcome::Success)
        .with_request(&headers)
        .log();

    Ok(Json(product))
}

/// Soft-delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Principal(actor): Principal,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> ProductResult<Json<MessageResponse>> {
    service.delete_product(id).await?;

    AuditEvent::new(actor, "product.delete", product_resource(id), AuditOutcome::Success)
        .with_request(&headers)
        .log();

    Ok(Json(MessageResponse::new("Product deleted")))
}

/// Copy a product under new unique keys
#[utoipa::path(
    post,
    path = "/{id}/duplicate",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 201, description = "Copy created", body = ProductView),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn duplicate_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Principal(actor): Principal,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> ProductResult<impl IntoResponse> {
    let copy = service.duplicate_product(id).await?;

    AuditEvent::new(
        actor,
        "product.duplicate",
        product_resource(copy.id),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .with_details(json!({ "source_id": id, "sku": copy.sku }))
    .log();

    Ok((StatusCode::CREATED, Json(copy)))
}

/// Switch a product between active and inactive
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID"),
        StatusParams
    ),
    responses(
        (status = 200, description = "Status updated", body = ProductView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_status<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Principal(actor): Principal,
    headers: HeaderMap,
    IdPath(id): IdPath,
    Query(params): Query<StatusParams>,
) -> ProductResult<Json<ProductView>> {
    let product = service.update_status(id, &params.status).await?;

    AuditEvent::new(actor, "product.status", product_resource(id), AuditOutcome::Success)
        .with_request(&headers)
        .with_details(json!({ "status": product.status.to_string() }))
        .log();

    Ok(Json(product))
}

/// Data a barcode renderer needs
#[utoipa::path(
    get,
    path = "/{id}/barcode-data",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Barcode data", body = BarcodeData),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn barcode_data<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<BarcodeData>> {
    let data = service.barcode_data(id).await?;
    Ok(Json(data))
}
