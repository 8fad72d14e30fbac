//! Checkout routes: sales, bulk sales, swaps, and buybacks.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use vendra_db::CheckoutRepository;
use vendra_db::entities::sea_orm_active_enums::{PaymentFrequency, PaymentMethod};
use vendra_db::repositories::checkout::{
    BuybackInput, BulkSellInput, CheckoutError, CheckoutReceipt, CustomerInput, IncomingItem,
    PaymentInput, SaleLine, SellInput, SwapInput,
};

/// Creates the checkout routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", post(create_sale))
        .route("/sales/bulk", post(create_bulk_sale))
        .route("/swaps", post(create_swap))
        .route("/buybacks", post(create_buyback))
        .route("/transactions/{transaction_id}", get(get_transaction))
}

// ============================================================================
// Request Types
// ============================================================================

/// Customer details accompanying a checkout operation.
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    /// Customer name.
    pub name: String,
    /// Customer phone (upsert key).
    pub phone: String,
    /// Optional customer email.
    pub email: Option<String>,
}

/// Payment terms for an operation that opens a plan.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Outstanding balance left after the first installment.
    #[serde(default)]
    pub balance_owed: Decimal,
    /// Payment method: cash, card, transfer, cheque.
    pub method: String,
    /// Installment frequency: one_time, weekly, biweekly, monthly, quarterly.
    pub frequency: Option<String>,
    /// Optional VAT added on top of the total.
    pub vat: Option<Decimal>,
    /// Optional bank account reference.
    pub bank_account: Option<String>,
    /// Invoice payment date (YYYY-MM-DD).
    pub due_date: Option<NaiveDate>,
}

/// Request body for a single-item sale.
#[derive(Debug, Deserialize)]
pub struct SellRequest {
    /// Product SKU.
    pub sku: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Price per unit.
    pub price_per_unit: Decimal,
    /// Payment terms.
    pub payment: PaymentRequest,
    /// Optional customer.
    pub customer: Option<CustomerRequest>,
}

/// One line of a bulk sale.
#[derive(Debug, Deserialize)]
pub struct SaleLineRequest {
    /// Product SKU.
    pub sku: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Price per unit.
    pub price_per_unit: Decimal,
}

/// Request body for a bulk sale.
#[derive(Debug, Deserialize)]
pub struct BulkSellRequest {
    /// Sale lines.
    pub lines: Vec<SaleLineRequest>,
    /// Payment terms for the batch total.
    pub payment: PaymentRequest,
    /// Optional customer.
    pub customer: Option<CustomerRequest>,
}

/// The outgoing side of a swap.
#[derive(Debug, Deserialize)]
pub struct OutgoingRequest {
    /// Product SKU.
    pub sku: String,
    /// Quantity leaving stock.
    pub quantity: i64,
    /// Price per unit.
    pub price_per_unit: Decimal,
}

/// An incoming product on a swap.
#[derive(Debug, Deserialize)]
pub struct IncomingRequest {
    /// SKU if the product already exists.
    pub sku: Option<String>,
    /// Product name.
    pub name: String,
    /// Quantity received.
    pub quantity: i64,
    /// Cost price per unit.
    pub cost_price: Decimal,
    /// Selling price for a newly created product.
    pub selling_price: Decimal,
    /// Supplier name for a newly created product.
    pub supplier_name: Option<String>,
    /// Supplier phone.
    pub supplier_phone: Option<String>,
}

/// Request body for a swap.
#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    /// Outgoing product.
    pub outgoing: OutgoingRequest,
    /// Incoming products.
    pub incoming: Vec<IncomingRequest>,
    /// Payment terms if the price difference is financed.
    pub payment: Option<PaymentRequest>,
    /// Optional customer.
    pub customer: Option<CustomerRequest>,
}

/// Request body for a buyback.
#[derive(Debug, Deserialize)]
pub struct BuybackRequest {
    /// Product SKU.
    pub sku: String,
    /// Quantity bought back.
    pub quantity: i64,
    /// Refund per unit.
    pub price_per_unit: Decimal,
    /// Optional customer.
    pub customer: Option<CustomerRequest>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/sales` - Sell a single product.
async fn create_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SellRequest>,
) -> Response {
    let Some(payment) = parse_payment(&body.payment) else {
        return invalid_payment_response();
    };

    let input = SellInput {
        sku: body.sku,
        quantity: body.quantity,
        price_per_unit: body.price_per_unit,
        payment,
        customer: body.customer.map(customer_input),
    };

    let checkout = CheckoutRepository::new((*state.db).clone());
    match checkout.sell(&auth.scope(), auth.user_id(), &input).await {
        Ok(receipt) => {
            spawn_invoice_email(&state, &receipt);
            (StatusCode::CREATED, Json(receipt_json(&receipt))).into_response()
        }
        Err(err) => checkout_error_response(&err),
    }
}

/// POST `/sales/bulk` - Sell a batch of lines as one transaction.
async fn create_bulk_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<BulkSellRequest>,
) -> Response {
    let Some(payment) = parse_payment(&body.payment) else {
        return invalid_payment_response();
    };

    let input = BulkSellInput {
        lines: body
            .lines
            .into_iter()
            .map(|l| SaleLine {
                sku: l.sku,
                quantity: l.quantity,
                price_per_unit: l.price_per_unit,
            })
            .collect(),
        payment,
        customer: body.customer.map(customer_input),
    };

    let checkout = CheckoutRepository::new((*state.db).clone());
    match checkout
        .bulk_sell(&auth.scope(), auth.user_id(), &input)
        .await
    {
        Ok(receipt) => {
            spawn_invoice_email(&state, &receipt);
            (StatusCode::CREATED, Json(receipt_json(&receipt))).into_response()
        }
        Err(err) => checkout_error_response(&err),
    }
}

/// POST `/swaps` - Swap an outgoing product for incoming products.
async fn create_swap(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SwapRequest>,
) -> Response {
    let payment = match &body.payment {
        Some(p) => match parse_payment(p) {
            Some(parsed) => Some(parsed),
            None => return invalid_payment_response(),
        },
        None => None,
    };

    let input = SwapInput {
        outgoing_sku: body.outgoing.sku,
        outgoing_quantity: body.outgoing.quantity,
        outgoing_price_per_unit: body.outgoing.price_per_unit,
        incoming: body
            .incoming
            .into_iter()
            .map(|i| IncomingItem {
                sku: i.sku,
                name: i.name,
                quantity: i.quantity,
                cost_price: i.cost_price,
                selling_price: i.selling_price,
                supplier_name: i.supplier_name,
                supplier_phone: i.supplier_phone,
            })
            .collect(),
        payment,
        customer: body.customer.map(customer_input),
    };

    let checkout = CheckoutRepository::new((*state.db).clone());
    match checkout.swap(&auth.scope(), auth.user_id(), &input).await {
        Ok(receipt) => {
            spawn_invoice_email(&state, &receipt);
            (StatusCode::CREATED, Json(receipt_json(&receipt))).into_response()
        }
        Err(err) => checkout_error_response(&err),
    }
}

/// POST `/buybacks` - Buy stock back from a customer.
async fn create_buyback(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<BuybackRequest>,
) -> Response {
    let input = BuybackInput {
        sku: body.sku,
        quantity: body.quantity,
        price_per_unit: body.price_per_unit,
        customer: body.customer.map(customer_input),
    };

    let checkout = CheckoutRepository::new((*state.db).clone());
    match checkout
        .buy_back(&auth.scope(), auth.user_id(), &input)
        .await
    {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt_json(&receipt))).into_response(),
        Err(err) => checkout_error_response(&err),
    }
}

/// GET `/transactions/{transaction_id}` - Load a committed transaction
/// with its plan and invoice.
async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> Response {
    let checkout = CheckoutRepository::new((*state.db).clone());
    match checkout.get(&auth.scope(), transaction_id).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt_json(&receipt))).into_response(),
        Err(err) => checkout_error_response(&err),
    }
}

// ============================================================================
// Helpers (shared with the other checkout route modules)
// ============================================================================

/// Maps a checkout error to a JSON error response with its stable code.
pub(crate) fn checkout_error_response(err: &CheckoutError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!(error = %err, "Checkout operation failed");
        return (
            status,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

pub(crate) fn parse_method(method: &str) -> Option<PaymentMethod> {
    match method.to_lowercase().as_str() {
        "cash" => Some(PaymentMethod::Cash),
        "card" => Some(PaymentMethod::Card),
        "transfer" => Some(PaymentMethod::Transfer),
        "cheque" => Some(PaymentMethod::Cheque),
        _ => None,
    }
}

fn parse_frequency(frequency: &str) -> Option<PaymentFrequency> {
    match frequency.to_lowercase().as_str() {
        "one_time" => Some(PaymentFrequency::OneTime),
        "weekly" => Some(PaymentFrequency::Weekly),
        "biweekly" => Some(PaymentFrequency::Biweekly),
        "monthly" => Some(PaymentFrequency::Monthly),
        "quarterly" => Some(PaymentFrequency::Quarterly),
        _ => None,
    }
}

fn parse_payment(payment: &PaymentRequest) -> Option<PaymentInput> {
    let method = parse_method(&payment.method)?;
    let frequency = match &payment.frequency {
        Some(f) => parse_frequency(f)?,
        None => PaymentFrequency::OneTime,
    };

    Some(PaymentInput {
        balance_owed: payment.balance_owed,
        method,
        frequency,
        vat: payment.vat,
        bank_account: payment.bank_account.clone(),
        due_date: payment.due_date,
    })
}

pub(crate) fn invalid_payment_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "INVALID_PAYMENT",
            "message": "Unknown payment method or frequency"
        })),
    )
        .into_response()
}

fn customer_input(customer: CustomerRequest) -> CustomerInput {
    CustomerInput {
        name: customer.name,
        phone: customer.phone,
        email: customer.email,
    }
}

/// Serializes a receipt for the response body.
pub(crate) fn receipt_json(receipt: &CheckoutReceipt) -> serde_json::Value {
    json!({
        "transaction": receipt.transaction.transaction,
        "items": receipt.transaction.items,
        "plan": receipt.plan.as_ref().map(|p| &p.plan),
        "payment": receipt.plan.as_ref().map(|p| &p.latest),
        "invoice": receipt.invoice,
        "customer": receipt.customer,
    })
}

/// Emits the post-commit "send invoice" event when the customer has an
/// email. Fire-and-forget: failures are logged, never surfaced, and the
/// committed transaction is unaffected.
fn spawn_invoice_email(state: &AppState, receipt: &CheckoutReceipt) {
    let (Some(customer), Some(invoice), Some(plan)) =
        (&receipt.customer, &receipt.invoice, &receipt.plan)
    else {
        return;
    };
    let Some(email) = customer.email.clone() else {
        return;
    };

    let service = state.email_service.clone();
    let invoice_no = invoice.invoice_no.clone();
    let total = plan.latest.total_amount;

    tokio::spawn(async move {
        if let Err(err) = service.send_invoice_email(&email, &invoice_no, total).await {
            warn!(error = %err, invoice_no = %invoice_no, "Failed to send invoice email");
        }
    });
}
