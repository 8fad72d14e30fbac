//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Methods that participate in a larger unit of work take a
//! `&DatabaseTransaction`; the orchestrator in [`checkout`] owns the
//! begin/commit boundary.

use uuid::Uuid;

pub mod checkout;
pub mod customer;
pub mod invoice;
pub mod payment_plan;
pub mod product;
pub mod stock;
pub mod supplier;
pub mod transaction;

pub use checkout::{
    BuybackInput, BulkSellInput, CheckoutError, CheckoutReceipt, CheckoutRepository,
    CustomerInput, IncomingItem, PaymentInput, SaleLine, SellInput, SwapInput,
};
pub use customer::CustomerRepository;
pub use invoice::{InvoiceError, InvoiceRepository};
pub use payment_plan::{PaymentPlanError, PaymentPlanRepository, PlanWithLatestPayment};
pub use product::{CreateProductInput, ProductError, ProductRepository};
pub use stock::{StockLedgerError, StockRepository};
pub use supplier::SupplierRepository;
pub use transaction::{NewItem, TransactionRepository, TransactionWithItems};

/// The (tenant, company) pair every read and write is filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    /// Top-level isolation boundary.
    pub tenant_id: Uuid,
    /// Business unit within the tenant.
    pub company_id: Uuid,
}

impl Scope {
    /// Creates a new scope.
    #[must_use]
    pub const fn new(tenant_id: Uuid, company_id: Uuid) -> Self {
        Self {
            tenant_id,
            company_id,
        }
    }
}
