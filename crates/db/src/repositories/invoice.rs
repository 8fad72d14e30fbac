//! Invoice repository: gap-free number allocation and status upkeep.
//!
//! Allocation reads a per-(tenant, company, period) counter row under an
//! exclusive lock instead of scanning for the greatest issued number, so
//! two concurrent allocations serialize on the row. The unique index on
//! `(tenant_id, invoice_no)` is the backstop: a violation surfaces as
//! [`InvoiceError::SequenceConflict`], which the orchestrator retries a
//! bounded number of times.

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QuerySelect, Set, SqlErr,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use vendra_core::invoice::{InvoiceStatus as CoreStatus, compose_invoice_no, company_initials, period_of};

use super::Scope;
use crate::entities::{invoice_sequences, invoices, sea_orm_active_enums::InvoiceStatus};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Two allocations raced on the same scope; retry with a fresh number.
    #[error("Invoice number conflict, please retry")]
    SequenceConflict,

    /// No invoice exists for this transaction in scope.
    #[error("Invoice not found for transaction {0}")]
    NotFound(Uuid),

    /// Invoice number derivation failed.
    #[error(transparent)]
    Number(#[from] vendra_core::invoice::InvoiceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl InvoiceError {
    /// Returns true if the operation may be retried with the same input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SequenceConflict)
    }
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Allocates the next invoice number for the scope and date.
    ///
    /// The counter row is locked for the rest of the enclosing unit of
    /// work, so concurrent allocations in the same scope serialize and the
    /// issued numbers are gap-free per (tenant, company, month).
    ///
    /// # Errors
    ///
    /// `SequenceConflict` if the first-use insert races another
    /// transaction; number derivation errors for an empty company name.
    pub async fn next_invoice_no(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        company_name: &str,
        date: NaiveDate,
    ) -> Result<String, InvoiceError> {
        let initials = company_initials(company_name)?;
        let period = period_of(date);

        let existing = invoice_sequences::Entity::find_by_id((
            scope.tenant_id,
            scope.company_id,
            period.clone(),
        ))
        .lock_exclusive()
        .one(txn)
        .await?;

        let seq = match existing {
            Some(row) => {
                let next = row.last_seq + 1;
                let mut active: invoice_sequences::ActiveModel = row.into();
                active.last_seq = Set(next);
                active.updated_at = Set(Utc::now().into());
                active.update(txn).await?;
                next
            }
            None => {
                let now = Utc::now().into();
                let insert = invoice_sequences::ActiveModel {
                    tenant_id: Set(scope.tenant_id),
                    company_id: Set(scope.company_id),
                    period: Set(period),
                    last_seq: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await;

                match insert {
                    Ok(_) => 0,
                    Err(err) if is_unique_violation(&err) => {
                        return Err(InvoiceError::SequenceConflict);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        #[allow(clippy::cast_sign_loss)]
        Ok(compose_invoice_no(&initials, date, seq as u32))
    }

    /// Creates the invoice row for a transaction.
    ///
    /// # Errors
    ///
    /// A duplicate invoice number in the tenant surfaces as
    /// `SequenceConflict`.
    pub async fn create(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        transaction_id: Uuid,
        invoice_no: &str,
        balance_owed: Decimal,
        payment_date: NaiveDate,
    ) -> Result<invoices::Model, InvoiceError> {
        let now = Utc::now().into();
        let insert = invoices::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(scope.tenant_id),
            company_id: Set(scope.company_id),
            transaction_id: Set(transaction_id),
            invoice_no: Set(invoice_no.to_string()),
            status: Set(status_from_balance(balance_owed)),
            payment_date: Set(payment_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await;

        match insert {
            Ok(invoice) => Ok(invoice),
            Err(err) if is_unique_violation(&err) => Err(InvoiceError::SequenceConflict),
            Err(err) => Err(err.into()),
        }
    }

    /// Updates the invoice status for a transaction from its new balance.
    ///
    /// PAID iff the balance is zero, PART_PAID otherwise. Runs in the same
    /// unit of work as the payment append; the two writes are never
    /// observable apart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the transaction has no invoice in scope.
    pub async fn set_status_from_balance(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        transaction_id: Uuid,
        balance_owed: Decimal,
    ) -> Result<invoices::Model, InvoiceError> {
        let invoice = invoices::Entity::find()
            .filter(invoices::Column::TenantId.eq(scope.tenant_id))
            .filter(invoices::Column::CompanyId.eq(scope.company_id))
            .filter(invoices::Column::TransactionId.eq(transaction_id))
            .one(txn)
            .await?
            .ok_or(InvoiceError::NotFound(transaction_id))?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(status_from_balance(balance_owed));
        active.updated_at = Set(Utc::now().into());
        let invoice = active.update(txn).await?;

        Ok(invoice)
    }

    /// Finds the invoice for a transaction within scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_transaction(
        &self,
        scope: &Scope,
        transaction_id: Uuid,
    ) -> Result<Option<invoices::Model>, DbErr> {
        invoices::Entity::find()
            .filter(invoices::Column::TenantId.eq(scope.tenant_id))
            .filter(invoices::Column::CompanyId.eq(scope.company_id))
            .filter(invoices::Column::TransactionId.eq(transaction_id))
            .one(&self.db)
            .await
    }

    /// Marks draft invoices past their payment date as overdue.
    ///
    /// Returns the number of invoices swept.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_overdue(&self, scope: &Scope, today: NaiveDate) -> Result<u64, InvoiceError> {
        let result = invoices::Entity::update_many()
            .col_expr(invoices::Column::Status, InvoiceStatus::Overdue.as_enum())
            .col_expr(invoices::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(invoices::Column::TenantId.eq(scope.tenant_id))
            .filter(invoices::Column::CompanyId.eq(scope.company_id))
            .filter(invoices::Column::Status.eq(InvoiceStatus::Draft))
            .filter(invoices::Column::PaymentDate.lt(today))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

/// Maps a balance to the database status enum via the core rule.
fn status_from_balance(balance_owed: Decimal) -> InvoiceStatus {
    match CoreStatus::from_balance(balance_owed) {
        CoreStatus::Paid => InvoiceStatus::Paid,
        _ => InvoiceStatus::PartPaid,
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
