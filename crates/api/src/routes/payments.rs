//! Payment recording and price correction routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{patch, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use vendra_db::CheckoutRepository;

use super::sales::{checkout_error_response, invalid_payment_response, parse_method};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions/{transaction_id}/payments", post(record_payment))
        .route("/items/{item_id}/price", patch(correct_price))
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Payment amount; must not exceed the outstanding balance.
    pub amount: Decimal,
    /// Payment method: cash, card, transfer, cheque.
    pub method: String,
    /// Optional bank account reference.
    pub bank_account: Option<String>,
}

/// Request body for a price correction.
#[derive(Debug, Deserialize)]
pub struct CorrectPriceRequest {
    /// The item's new total price.
    pub new_total_price: Decimal,
}

/// POST `/transactions/{transaction_id}/payments` - Record a payment
/// against the transaction's plan.
async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Json(body): Json<RecordPaymentRequest>,
) -> Response {
    let Some(method) = parse_method(&body.method) else {
        return invalid_payment_response();
    };

    let checkout = CheckoutRepository::new((*state.db).clone());
    match checkout
        .record_payment(
            &auth.scope(),
            transaction_id,
            body.amount,
            method,
            body.bank_account,
        )
        .await
    {
        Ok((plan, invoice)) => (
            StatusCode::OK,
            Json(json!({
                "plan": plan.plan,
                "payment": plan.latest,
                "invoice": invoice,
            })),
        )
            .into_response(),
        Err(err) => checkout_error_response(&err),
    }
}

/// PATCH `/items/{item_id}/price` - Correct a sold item's price.
///
/// Only permitted while the owning plan has no outstanding balance.
async fn correct_price(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(body): Json<CorrectPriceRequest>,
) -> Response {
    let checkout = CheckoutRepository::new((*state.db).clone());
    match checkout
        .correct_price(&auth.scope(), item_id, body.new_total_price)
        .await
    {
        Ok((item, plan, invoice)) => (
            StatusCode::OK,
            Json(json!({
                "item": item,
                "plan": plan.plan,
                "payment": plan.latest,
                "invoice": invoice,
            })),
        )
            .into_response(),
        Err(err) => checkout_error_response(&err),
    }
}
