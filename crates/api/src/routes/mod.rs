//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod health;
pub mod invoices;
pub mod payments;
pub mod products;
pub mod sales;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require an authenticated tenant context
    let protected_routes = Router::new()
        .merge(products::routes())
        .merge(sales::routes())
        .merge(payments::routes())
        .merge(invoices::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new().merge(health::routes()).merge(protected_routes)
}
