//! Transaction orchestrator.
//!
//! Each public operation composes the stock ledger, transaction recorder,
//! payment plan state machine, and invoice allocator inside one atomic
//! unit of work, in that write order. Any failure aborts the whole unit;
//! only a [`CheckoutError::Invoice`] sequence conflict is retried, with
//! the same input, a bounded number of times.

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    TransactionTrait,
};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use vendra_core::transaction::{TransactionError, line_total};

use super::customer::CustomerRepository;
use super::invoice::{InvoiceError, InvoiceRepository};
use super::payment_plan::{PaymentPlanError, PaymentPlanRepository, PlanWithLatestPayment};
use super::product::{CreateProductInput, ProductError, ProductRepository};
use super::stock::{StockLedgerError, StockRepository};
use super::supplier::SupplierRepository;
use super::transaction::{NewItem, RecordError, TransactionRepository, TransactionWithItems};
use super::Scope;
use crate::entities::{
    companies, customers, invoices, products,
    sea_orm_active_enums::{ItemDirection, PaymentFrequency, PaymentMethod, TransactionKind},
};

/// How many times a unit of work is re-run after a sequence conflict.
const SEQUENCE_RETRY_ATTEMPTS: u32 = 3;

/// Default payment terms when the caller gives no due date.
const DEFAULT_PAYMENT_TERMS_DAYS: i64 = 30;

/// Error types for orchestrated checkout operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Company missing for the scope.
    #[error("Company not found: {0}")]
    CompanyNotFound(Uuid),

    /// Transaction missing in scope.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Stock ledger failure.
    #[error(transparent)]
    Stock(#[from] StockLedgerError),

    /// Recorder failure (shape validation or persistence).
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Payment plan failure.
    #[error(transparent)]
    Plan(#[from] PaymentPlanError),

    /// Invoice failure.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Product creation failure during a swap.
    #[error(transparent)]
    Product(#[from] ProductError),

    /// Input validation failure before any write.
    #[error(transparent)]
    Validation(#[from] TransactionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl CheckoutError {
    /// Returns the stable error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CompanyNotFound(_) => "COMPANY_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::Stock(err) => match err {
                StockLedgerError::NotFound(_) => "PRODUCT_NOT_FOUND",
                StockLedgerError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
                StockLedgerError::InvalidBatch(inner) => inner.error_code(),
                StockLedgerError::Database(_) => "DATABASE_ERROR",
            },
            Self::Record(err) => match err {
                RecordError::NotFound(_) => "TRANSACTION_NOT_FOUND",
                RecordError::Validation(inner) => inner.error_code(),
                RecordError::Database(_) => "DATABASE_ERROR",
            },
            Self::Plan(err) => match err {
                PaymentPlanError::PlanNotFound(_) => "PLAN_NOT_FOUND",
                PaymentPlanError::ItemNotFound(_) => "ITEM_NOT_FOUND",
                PaymentPlanError::NoPayments(_) => "INTERNAL_ERROR",
                PaymentPlanError::Payment(inner) => inner.error_code(),
                PaymentPlanError::Database(_) => "DATABASE_ERROR",
            },
            Self::Invoice(err) => match err {
                InvoiceError::SequenceConflict => "SEQUENCE_CONFLICT",
                InvoiceError::NotFound(_) => "INVOICE_NOT_FOUND",
                InvoiceError::Number(inner) => inner.error_code(),
                InvoiceError::Database(_) => "DATABASE_ERROR",
            },
            Self::Product(err) => match err {
                ProductError::NotFound(_) => "PRODUCT_NOT_FOUND",
                ProductError::AlreadyExists(_) => "PRODUCT_ALREADY_EXISTS",
                ProductError::NonPositiveRestock(_) => "NON_POSITIVE_QUANTITY",
                ProductError::Stock(_) | ProductError::Database(_) => "DATABASE_ERROR",
            },
            Self::Validation(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::CompanyNotFound(_) | Self::TransactionNotFound(_) => 404,
            Self::Stock(err) => match err {
                StockLedgerError::NotFound(_) => 404,
                StockLedgerError::InsufficientStock { .. } => 422,
                StockLedgerError::InvalidBatch(inner) => inner.http_status_code(),
                StockLedgerError::Database(_) => 500,
            },
            Self::Record(err) => match err {
                RecordError::NotFound(_) => 404,
                RecordError::Validation(inner) => inner.http_status_code(),
                RecordError::Database(_) => 500,
            },
            Self::Plan(err) => match err {
                PaymentPlanError::PlanNotFound(_) | PaymentPlanError::ItemNotFound(_) => 404,
                PaymentPlanError::NoPayments(_) | PaymentPlanError::Database(_) => 500,
                PaymentPlanError::Payment(inner) => inner.http_status_code(),
            },
            Self::Invoice(err) => match err {
                InvoiceError::SequenceConflict => 409,
                InvoiceError::NotFound(_) => 404,
                InvoiceError::Number(inner) => inner.http_status_code(),
                InvoiceError::Database(_) => 500,
            },
            Self::Product(err) => match err {
                ProductError::NotFound(_) => 404,
                ProductError::AlreadyExists(_) => 409,
                ProductError::NonPositiveRestock(_) => 400,
                ProductError::Stock(_) | ProductError::Database(_) => 500,
            },
            Self::Validation(err) => err.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns true if the operation may be retried with the same input.
    ///
    /// Business validation failures are never retried; only the invoice
    /// sequence conflict is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Invoice(InvoiceError::SequenceConflict))
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Customer details for an upsert alongside a checkout operation.
#[derive(Debug, Clone)]
pub struct CustomerInput {
    /// Customer name.
    pub name: String,
    /// Phone, the upsert key within the scope.
    pub phone: String,
    /// Optional email; enables the post-commit invoice mail.
    pub email: Option<String>,
}

/// Payment terms for an operation that opens a plan.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    /// The part of the total left outstanding. Zero settles immediately.
    pub balance_owed: Decimal,
    /// Payment method for the first installment.
    pub method: PaymentMethod,
    /// Installment frequency.
    pub frequency: PaymentFrequency,
    /// Optional VAT added on top of the line total.
    pub vat: Option<Decimal>,
    /// Optional bank account reference.
    pub bank_account: Option<String>,
    /// Invoice payment date; defaults to 30 days out.
    pub due_date: Option<NaiveDate>,
}

/// Input for a single-item sale.
#[derive(Debug, Clone)]
pub struct SellInput {
    /// Product SKU.
    pub sku: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Price per unit.
    pub price_per_unit: Decimal,
    /// Payment terms.
    pub payment: PaymentInput,
    /// Optional customer.
    pub customer: Option<CustomerInput>,
}

/// One line of a bulk sale.
#[derive(Debug, Clone)]
pub struct SaleLine {
    /// Product SKU.
    pub sku: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Price per unit.
    pub price_per_unit: Decimal,
}

/// Input for a bulk sale.
#[derive(Debug, Clone)]
pub struct BulkSellInput {
    /// The sale lines; stock sufficiency is checked for the whole batch
    /// before any mutation.
    pub lines: Vec<SaleLine>,
    /// Payment terms covering the batch total.
    pub payment: PaymentInput,
    /// Optional customer.
    pub customer: Option<CustomerInput>,
}

/// An incoming product on a swap.
#[derive(Debug, Clone)]
pub struct IncomingItem {
    /// SKU if known; a missing SKU creates a new product with a
    /// generated one.
    pub sku: Option<String>,
    /// Product name, used when a new product is created.
    pub name: String,
    /// Quantity received.
    pub quantity: i64,
    /// Cost price per unit; this is the item's recorded price.
    pub cost_price: Decimal,
    /// Selling price for a newly created product.
    pub selling_price: Decimal,
    /// Supplier for a newly created product.
    pub supplier_name: Option<String>,
    /// Supplier phone, if a supplier is named.
    pub supplier_phone: Option<String>,
}

/// Input for a swap.
#[derive(Debug, Clone)]
pub struct SwapInput {
    /// SKU of the outgoing product.
    pub outgoing_sku: String,
    /// Outgoing quantity.
    pub outgoing_quantity: i64,
    /// Outgoing price per unit.
    pub outgoing_price_per_unit: Decimal,
    /// Incoming products.
    pub incoming: Vec<IncomingItem>,
    /// Payment terms when the price difference is financed.
    pub payment: Option<PaymentInput>,
    /// Optional customer.
    pub customer: Option<CustomerInput>,
}

/// Input for a buyback.
#[derive(Debug, Clone)]
pub struct BuybackInput {
    /// Product SKU.
    pub sku: String,
    /// Quantity bought back.
    pub quantity: i64,
    /// Refund per unit.
    pub price_per_unit: Decimal,
    /// Optional customer.
    pub customer: Option<CustomerInput>,
}

/// Everything a committed checkout operation produced.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    /// The recorded transaction with its items.
    pub transaction: TransactionWithItems,
    /// The payment plan, when one was opened.
    pub plan: Option<PlanWithLatestPayment>,
    /// The invoice, when one was issued.
    pub invoice: Option<invoices::Model>,
    /// The upserted customer, when one was given.
    pub customer: Option<customers::Model>,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Transaction orchestrator.
///
/// Owns the begin/commit boundary; the component repositories do the
/// per-entity work inside it.
#[derive(Debug, Clone)]
pub struct CheckoutRepository {
    db: DatabaseConnection,
    stock: StockRepository,
    transactions: TransactionRepository,
    plans: PaymentPlanRepository,
    invoices: InvoiceRepository,
    customers: CustomerRepository,
    suppliers: SupplierRepository,
    products: ProductRepository,
}

impl CheckoutRepository {
    /// Creates a new orchestrator over a shared connection pool.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            stock: StockRepository::new(),
            transactions: TransactionRepository::new(db.clone()),
            plans: PaymentPlanRepository::new(db.clone()),
            invoices: InvoiceRepository::new(db.clone()),
            customers: CustomerRepository::new(db.clone()),
            suppliers: SupplierRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            db,
        }
    }

    /// Sells one product: stock out, SALE transaction, plan, invoice.
    ///
    /// # Errors
    ///
    /// Validation and stock failures abort with no partial writes.
    pub async fn sell(
        &self,
        scope: &Scope,
        created_by: Uuid,
        input: &SellInput,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        validate_sku(&input.sku)?;
        validate_quantity(input.quantity)?;

        self.with_sequence_retry(|| self.sell_once(scope, created_by, input))
            .await
    }

    async fn sell_once(
        &self,
        scope: &Scope,
        created_by: Uuid,
        input: &SellInput,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let txn = self.db.begin().await?;
        let company = self.find_company(&txn, scope).await?;

        let product = self
            .stock
            .adjust(&txn, scope, &input.sku, -input.quantity)
            .await?;

        let customer = self.upsert_customer(&txn, scope, input.customer.as_ref()).await?;
        let customer_id = customer.as_ref().map(|c| c.id);

        let recorded = self
            .transactions
            .record(
                &txn,
                scope,
                TransactionKind::Sale,
                created_by,
                customer_id,
                &[NewItem {
                    product_id: product.id,
                    quantity: input.quantity,
                    price_per_unit: input.price_per_unit,
                    direction: ItemDirection::Debit,
                }],
            )
            .await?;

        let total = line_total(input.quantity, input.price_per_unit)?
            + input.payment.vat.unwrap_or(Decimal::ZERO);

        let (plan, invoice) = self
            .open_plan_and_invoice(
                &txn,
                scope,
                &company,
                recorded.transaction.id,
                customer_id,
                total,
                &input.payment,
            )
            .await?;

        txn.commit().await?;

        info!(
            transaction_id = %recorded.transaction.id,
            invoice_no = %invoice.invoice_no,
            sku = %input.sku,
            quantity = input.quantity,
            "Sale committed"
        );

        Ok(CheckoutReceipt {
            transaction: recorded,
            plan: Some(plan),
            invoice: Some(invoice),
            customer,
        })
    }

    /// Sells a batch of lines as one BULK_SALE transaction.
    ///
    /// Stock sufficiency is validated for the whole batch against one
    /// snapshot before any quantity changes.
    ///
    /// # Errors
    ///
    /// Validation and stock failures abort with no partial writes.
    pub async fn bulk_sell(
        &self,
        scope: &Scope,
        created_by: Uuid,
        input: &BulkSellInput,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        if input.lines.is_empty() {
            return Err(TransactionError::InvalidShape {
                kind: vendra_core::transaction::TransactionKind::BulkSale,
                reason: "at least one item, all debit",
            }
            .into());
        }
        for line in &input.lines {
            validate_sku(&line.sku)?;
            validate_quantity(line.quantity)?;
        }

        self.with_sequence_retry(|| self.bulk_sell_once(scope, created_by, input))
            .await
    }

    async fn bulk_sell_once(
        &self,
        scope: &Scope,
        created_by: Uuid,
        input: &BulkSellInput,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let txn = self.db.begin().await?;
        let company = self.find_company(&txn, scope).await?;

        let deltas: Vec<vendra_core::stock::StockDelta> = input
            .lines
            .iter()
            .map(|l| vendra_core::stock::StockDelta::new(l.sku.clone(), -l.quantity))
            .collect();

        let adjusted = self.stock.adjust_many(&txn, scope, &deltas).await?;
        let by_sku: std::collections::HashMap<&str, &products::Model> =
            adjusted.iter().map(|p| (p.sku.as_str(), p)).collect();

        let customer = self.upsert_customer(&txn, scope, input.customer.as_ref()).await?;
        let customer_id = customer.as_ref().map(|c| c.id);

        let mut items = Vec::with_capacity(input.lines.len());
        let mut total = Decimal::ZERO;
        for line in &input.lines {
            let product = by_sku
                .get(line.sku.as_str())
                .ok_or_else(|| StockLedgerError::NotFound(line.sku.clone()))?;
            total += line_total(line.quantity, line.price_per_unit)?;
            items.push(NewItem {
                product_id: product.id,
                quantity: line.quantity,
                price_per_unit: line.price_per_unit,
                direction: ItemDirection::Debit,
            });
        }
        total += input.payment.vat.unwrap_or(Decimal::ZERO);

        let recorded = self
            .transactions
            .record(
                &txn,
                scope,
                TransactionKind::BulkSale,
                created_by,
                customer_id,
                &items,
            )
            .await?;

        let (plan, invoice) = self
            .open_plan_and_invoice(
                &txn,
                scope,
                &company,
                recorded.transaction.id,
                customer_id,
                total,
                &input.payment,
            )
            .await?;

        txn.commit().await?;

        info!(
            transaction_id = %recorded.transaction.id,
            invoice_no = %invoice.invoice_no,
            lines = input.lines.len(),
            "Bulk sale committed"
        );

        Ok(CheckoutReceipt {
            transaction: recorded,
            plan: Some(plan),
            invoice: Some(invoice),
            customer,
        })
    }

    /// Swaps one outgoing product for one or more incoming products.
    ///
    /// Incoming items increment an existing product or create a new one
    /// (generating a SKU and resolving a supplier when named). When a
    /// positive price difference is financed, a plan and invoice are
    /// opened for it.
    ///
    /// # Errors
    ///
    /// Validation and stock failures abort with no partial writes.
    pub async fn swap(
        &self,
        scope: &Scope,
        created_by: Uuid,
        input: &SwapInput,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        validate_sku(&input.outgoing_sku)?;
        validate_quantity(input.outgoing_quantity)?;
        if input.incoming.is_empty() {
            return Err(TransactionError::InvalidShape {
                kind: vendra_core::transaction::TransactionKind::Swap,
                reason: "exactly one debit item and at least one credit item",
            }
            .into());
        }
        for inc in &input.incoming {
            validate_quantity(inc.quantity)?;
        }

        self.with_sequence_retry(|| self.swap_once(scope, created_by, input))
            .await
    }

    async fn swap_once(
        &self,
        scope: &Scope,
        created_by: Uuid,
        input: &SwapInput,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let txn = self.db.begin().await?;
        let company = self.find_company(&txn, scope).await?;

        let outgoing = self
            .stock
            .adjust(&txn, scope, &input.outgoing_sku, -input.outgoing_quantity)
            .await?;

        let customer = self.upsert_customer(&txn, scope, input.customer.as_ref()).await?;
        let customer_id = customer.as_ref().map(|c| c.id);

        let mut items = vec![NewItem {
            product_id: outgoing.id,
            quantity: input.outgoing_quantity,
            price_per_unit: input.outgoing_price_per_unit,
            direction: ItemDirection::Debit,
        }];

        let mut incoming_total = Decimal::ZERO;
        for inc in &input.incoming {
            let product = self.receive_incoming(&txn, scope, inc).await?;
            incoming_total += line_total(inc.quantity, inc.cost_price)?;
            items.push(NewItem {
                product_id: product.id,
                quantity: inc.quantity,
                price_per_unit: inc.cost_price,
                direction: ItemDirection::Credit,
            });
        }

        let recorded = self
            .transactions
            .record(
                &txn,
                scope,
                TransactionKind::Swap,
                created_by,
                customer_id,
                &items,
            )
            .await?;

        let outgoing_total = line_total(input.outgoing_quantity, input.outgoing_price_per_unit)?;

        let mut plan = None;
        let mut invoice = None;
        if let Some(payment) = &input.payment {
            let financed =
                outgoing_total - incoming_total + payment.vat.unwrap_or(Decimal::ZERO);
            if financed > Decimal::ZERO {
                let (p, i) = self
                    .open_plan_and_invoice(
                        &txn,
                        scope,
                        &company,
                        recorded.transaction.id,
                        customer_id,
                        financed,
                        payment,
                    )
                    .await?;
                plan = Some(p);
                invoice = Some(i);
            }
        }

        txn.commit().await?;

        info!(
            transaction_id = %recorded.transaction.id,
            outgoing_sku = %input.outgoing_sku,
            incoming = input.incoming.len(),
            financed = invoice.is_some(),
            "Swap committed"
        );

        Ok(CheckoutReceipt {
            transaction: recorded,
            plan,
            invoice,
            customer,
        })
    }

    /// Buys stock back from a customer: stock in, one CREDIT item, no
    /// invoice and no plan.
    ///
    /// # Errors
    ///
    /// Validation and stock failures abort with no partial writes.
    pub async fn buy_back(
        &self,
        scope: &Scope,
        created_by: Uuid,
        input: &BuybackInput,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        validate_sku(&input.sku)?;
        validate_quantity(input.quantity)?;

        let txn = self.db.begin().await?;

        let product = self
            .stock
            .adjust(&txn, scope, &input.sku, input.quantity)
            .await?;

        let customer = self.upsert_customer(&txn, scope, input.customer.as_ref()).await?;
        let customer_id = customer.as_ref().map(|c| c.id);

        let recorded = self
            .transactions
            .record(
                &txn,
                scope,
                TransactionKind::Buyback,
                created_by,
                customer_id,
                &[NewItem {
                    product_id: product.id,
                    quantity: input.quantity,
                    price_per_unit: input.price_per_unit,
                    direction: ItemDirection::Credit,
                }],
            )
            .await?;

        txn.commit().await?;

        info!(
            transaction_id = %recorded.transaction.id,
            sku = %input.sku,
            quantity = input.quantity,
            "Buyback committed"
        );

        Ok(CheckoutReceipt {
            transaction: recorded,
            plan: None,
            invoice: None,
            customer,
        })
    }

    /// Records a payment against a transaction's plan and synchronizes
    /// the invoice status in the same unit of work.
    ///
    /// Fails fast without touching stock.
    ///
    /// # Errors
    ///
    /// `NoOutstandingBalance`/`Overpayment` from the state machine;
    /// `PlanNotFound` if the transaction has no plan.
    pub async fn record_payment(
        &self,
        scope: &Scope,
        transaction_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        bank_account: Option<String>,
    ) -> Result<(PlanWithLatestPayment, invoices::Model), CheckoutError> {
        let txn = self.db.begin().await?;

        let plan = self
            .plans
            .record_payment(&txn, scope, transaction_id, amount, method, bank_account)
            .await?;

        let invoice = self
            .invoices
            .set_status_from_balance(&txn, scope, transaction_id, plan.latest.balance_owed)
            .await?;

        txn.commit().await?;

        info!(
            transaction_id = %transaction_id,
            balance_owed = %plan.latest.balance_owed,
            installment = plan.latest.installment_no,
            "Payment recorded"
        );

        Ok((plan, invoice))
    }

    /// Corrects a sold item's price, guarded by the balance-zero
    /// precondition, and synchronizes the invoice status.
    ///
    /// # Errors
    ///
    /// `OutstandingBalance` when the plan is not settled.
    pub async fn correct_price(
        &self,
        scope: &Scope,
        item_id: Uuid,
        new_total_price: Decimal,
    ) -> Result<
        (
            crate::entities::transaction_items::Model,
            PlanWithLatestPayment,
            invoices::Model,
        ),
        CheckoutError,
    > {
        let txn = self.db.begin().await?;

        let (item, plan) = self
            .plans
            .correct_price(&txn, scope, item_id, new_total_price)
            .await?;

        let invoice = self
            .invoices
            .set_status_from_balance(&txn, scope, item.transaction_id, plan.latest.balance_owed)
            .await?;

        txn.commit().await?;

        info!(
            item_id = %item_id,
            new_total = %new_total_price,
            balance_owed = %plan.latest.balance_owed,
            "Price corrected"
        );

        Ok((item, plan, invoice))
    }

    /// Marks draft invoices past their payment date as overdue.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_overdue(&self, scope: &Scope, today: NaiveDate) -> Result<u64, CheckoutError> {
        let swept = self.invoices.mark_overdue(scope, today).await?;
        if swept > 0 {
            info!(swept, "Overdue sweep");
        }
        Ok(swept)
    }

    /// Loads a committed transaction with its plan and invoice.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if the transaction is not in scope.
    pub async fn get(
        &self,
        scope: &Scope,
        transaction_id: Uuid,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let transaction = match self.transactions.get(scope, transaction_id).await {
            Ok(t) => t,
            Err(RecordError::NotFound(id)) => return Err(CheckoutError::TransactionNotFound(id)),
            Err(err) => return Err(err.into()),
        };
        let plan = self.plans.find_by_transaction(scope, transaction_id).await?;
        let invoice = self
            .invoices
            .find_by_transaction(scope, transaction_id)
            .await?;

        Ok(CheckoutReceipt {
            transaction,
            plan,
            invoice,
            customer: None,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Runs a unit of work, retrying only on a sequence conflict.
    async fn with_sequence_retry<F, Fut>(&self, op: F) -> Result<CheckoutReceipt, CheckoutError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<CheckoutReceipt, CheckoutError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(err) if err.is_retryable() && attempt < SEQUENCE_RETRY_ATTEMPTS => {
                    warn!(attempt, "Invoice sequence conflict, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn find_company(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
    ) -> Result<companies::Model, CheckoutError> {
        companies::Entity::find_by_id(scope.company_id)
            .filter(companies::Column::TenantId.eq(scope.tenant_id))
            .one(txn)
            .await?
            .ok_or(CheckoutError::CompanyNotFound(scope.company_id))
    }

    async fn upsert_customer(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        input: Option<&CustomerInput>,
    ) -> Result<Option<customers::Model>, CheckoutError> {
        let Some(input) = input else {
            return Ok(None);
        };
        let customer = self
            .customers
            .upsert(txn, scope, &input.name, &input.phone, input.email.as_deref())
            .await?;
        Ok(Some(customer))
    }

    /// Increments an existing incoming product or creates a new one.
    async fn receive_incoming(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        inc: &IncomingItem,
    ) -> Result<products::Model, CheckoutError> {
        if let Some(sku) = &inc.sku {
            match self.stock.adjust(txn, scope, sku, inc.quantity).await {
                Ok(product) => return Ok(product),
                Err(StockLedgerError::NotFound(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }

        let supplier_id = match &inc.supplier_name {
            Some(name) => Some(
                self.suppliers
                    .get_or_create(txn, scope, name, inc.supplier_phone.as_deref())
                    .await?
                    .id,
            ),
            None => None,
        };

        let sku = inc.sku.clone().unwrap_or_else(generate_swap_sku);

        let product = self
            .products
            .create_in_txn(
                txn,
                scope,
                &CreateProductInput {
                    sku,
                    name: inc.name.clone(),
                    quantity: inc.quantity,
                    selling_price: inc.selling_price,
                    cost_price: inc.cost_price,
                    supplier_id,
                },
            )
            .await?;

        Ok(product)
    }

    /// Opens a plan for a financed total and issues its invoice.
    #[allow(clippy::too_many_arguments)]
    async fn open_plan_and_invoice(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        company: &companies::Model,
        transaction_id: Uuid,
        customer_id: Option<Uuid>,
        total: Decimal,
        payment: &PaymentInput,
    ) -> Result<(PlanWithLatestPayment, invoices::Model), CheckoutError> {
        let plan = self
            .plans
            .open(
                txn,
                scope,
                transaction_id,
                customer_id,
                total,
                payment.balance_owed,
                payment.method.clone(),
                payment.frequency.clone(),
                payment.bank_account.clone(),
            )
            .await?;

        let today = Utc::now().date_naive();
        let invoice_no = self
            .invoices
            .next_invoice_no(txn, scope, &company.name, today)
            .await?;

        let payment_date = payment
            .due_date
            .unwrap_or_else(|| today + Duration::days(DEFAULT_PAYMENT_TERMS_DAYS));

        let invoice = self
            .invoices
            .create(
                txn,
                scope,
                transaction_id,
                &invoice_no,
                plan.latest.balance_owed,
                payment_date,
            )
            .await?;

        Ok((plan, invoice))
    }
}

fn validate_sku(sku: &str) -> Result<(), TransactionError> {
    if sku.trim().is_empty() {
        return Err(TransactionError::MissingRequiredField("sku"));
    }
    Ok(())
}

fn validate_quantity(quantity: i64) -> Result<(), TransactionError> {
    if quantity <= 0 {
        return Err(TransactionError::NonPositiveQuantity);
    }
    Ok(())
}

/// Generates a SKU for a product introduced by a swap.
fn generate_swap_sku() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("SW-{}", &id[..8].to_uppercase())
}
