//! Invoice maintenance routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde_json::json;

use crate::{AppState, middleware::AuthUser};
use vendra_db::CheckoutRepository;

use super::sales::checkout_error_response;

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/invoices/sweep-overdue", post(sweep_overdue))
}

/// POST `/invoices/sweep-overdue` - Mark draft invoices past their
/// payment date as overdue.
async fn sweep_overdue(State(state): State<AppState>, auth: AuthUser) -> Response {
    let checkout = CheckoutRepository::new((*state.db).clone());
    match checkout
        .mark_overdue(&auth.scope(), Utc::now().date_naive())
        .await
    {
        Ok(swept) => (StatusCode::OK, Json(json!({ "swept": swept }))).into_response(),
        Err(err) => checkout_error_response(&err),
    }
}
