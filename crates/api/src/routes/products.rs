//! Product catalog routes: listing, inbound supply, restock, soft delete.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use vendra_db::repositories::product::{CreateProductInput, ProductError, ProductRepository};
use vendra_shared::types::PageRequest;

/// Creates the product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products", post(create_product))
        .route("/products/{sku}/restock", post(restock_product))
        .route("/products/{sku}", delete(delete_product))
}

/// Request body for creating a product (inbound supply).
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// SKU, unique within the company.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Opening quantity.
    pub quantity: i64,
    /// Selling price per unit.
    pub selling_price: Decimal,
    /// Cost price per unit.
    pub cost_price: Decimal,
    /// Optional supplier reference.
    pub supplier_id: Option<Uuid>,
}

/// Request body for a restock.
#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    /// Quantity to add; must be positive.
    pub quantity: i64,
}

/// GET `/products` - List live products, newest first.
async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Response {
    let repo = ProductRepository::new((*state.db).clone());
    match repo.list(&auth.scope(), &page).await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(err) => {
            error!(error = %err, "Failed to list products");
            internal_error_response()
        }
    }
}

/// POST `/products` - Create a product.
async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateProductRequest>,
) -> Response {
    let repo = ProductRepository::new((*state.db).clone());
    let input = CreateProductInput {
        sku: body.sku,
        name: body.name,
        quantity: body.quantity,
        selling_price: body.selling_price,
        cost_price: body.cost_price,
        supplier_id: body.supplier_id,
    };

    match repo.create(&auth.scope(), &input).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(err) => product_error_response(&err),
    }
}

/// POST `/products/{sku}/restock` - Add stock to an existing product.
async fn restock_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(sku): Path<String>,
    Json(body): Json<RestockRequest>,
) -> Response {
    let repo = ProductRepository::new((*state.db).clone());
    match repo.restock(&auth.scope(), &sku, body.quantity).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(err) => product_error_response(&err),
    }
}

/// DELETE `/products/{sku}` - Soft-delete a product.
async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(sku): Path<String>,
) -> Response {
    let repo = ProductRepository::new((*state.db).clone());
    match repo.soft_delete(&auth.scope(), &sku).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => product_error_response(&err),
    }
}

fn product_error_response(err: &ProductError) -> Response {
    let (status, code) = match err {
        ProductError::NotFound(_) => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
        ProductError::AlreadyExists(_) => (StatusCode::CONFLICT, "PRODUCT_ALREADY_EXISTS"),
        ProductError::NonPositiveRestock(_) => (StatusCode::BAD_REQUEST, "NON_POSITIVE_QUANTITY"),
        ProductError::Stock(_) | ProductError::Database(_) => {
            error!(error = %err, "Product operation failed");
            return internal_error_response();
        }
    };

    (
        status,
        Json(json!({
            "error": code,
            "message": err.to_string()
        })),
    )
        .into_response()
}

fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
