//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Every repository read and write is scoped by `(tenant_id, company_id)`;
//! the [`repositories::Scope`] type carries that pair.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    CheckoutRepository, CustomerRepository, InvoiceRepository, PaymentPlanRepository,
    ProductRepository, Scope, StockRepository, SupplierRepository, TransactionRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
