//! Transaction recorder: immutable transaction + line-item records.
//!
//! The recorder validates the kind-specific item shape and persists the
//! transaction with its nested items inside the caller's unit of work. It
//! never mutates stock; the orchestrator adjusts quantities before
//! recording so a stock failure aborts before any transaction row exists.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use vendra_core::transaction::{
    ItemDirection as CoreDirection, TransactionError, TransactionKind as CoreKind, line_total,
    validate_shape,
};

use super::Scope;
use crate::entities::{
    sea_orm_active_enums::{ItemDirection, TransactionKind},
    transaction_items, transactions,
};

/// A line item to record.
#[derive(Debug, Clone)]
pub struct NewItem {
    /// The product the line refers to.
    pub product_id: Uuid,
    /// Positive quantity.
    pub quantity: i64,
    /// Price per unit.
    pub price_per_unit: Decimal,
    /// Debit (stock out) or credit (stock in).
    pub direction: ItemDirection,
}

/// A transaction with its ordered items.
#[derive(Debug, Clone)]
pub struct TransactionWithItems {
    /// Transaction header.
    pub transaction: transactions::Model,
    /// Line items in recording order.
    pub items: Vec<transaction_items::Model>,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a transaction with its items in the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns a shape validation error if the item composition does not
    /// match the kind, or the underlying database error.
    pub async fn record(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        kind: TransactionKind,
        created_by: Uuid,
        customer_id: Option<Uuid>,
        items: &[NewItem],
    ) -> Result<TransactionWithItems, RecordError> {
        let directions: Vec<CoreDirection> = items
            .iter()
            .map(|i| match i.direction {
                ItemDirection::Debit => CoreDirection::Debit,
                ItemDirection::Credit => CoreDirection::Credit,
            })
            .collect();
        validate_shape(core_kind(&kind), &directions)?;

        let now = Utc::now().into();
        let transaction_id = Uuid::new_v4();

        let transaction = transactions::ActiveModel {
            id: Set(transaction_id),
            tenant_id: Set(scope.tenant_id),
            company_id: Set(scope.company_id),
            kind: Set(kind),
            customer_id: Set(customer_id),
            created_by: Set(created_by),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;

        let mut recorded = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let total_price = line_total(item.quantity, item.price_per_unit)?;

            let row = transaction_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                transaction_id: Set(transaction_id),
                product_id: Set(item.product_id),
                position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
                quantity: Set(item.quantity),
                price_per_unit: Set(item.price_per_unit),
                total_price: Set(total_price),
                direction: Set(item.direction.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(txn)
            .await?;

            recorded.push(row);
        }

        Ok(TransactionWithItems {
            transaction,
            items: recorded,
        })
    }

    /// Gets a transaction with its items within the scope.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the transaction does not exist in scope.
    pub async fn get(
        &self,
        scope: &Scope,
        transaction_id: Uuid,
    ) -> Result<TransactionWithItems, RecordError> {
        let transaction = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::TenantId.eq(scope.tenant_id))
            .filter(transactions::Column::CompanyId.eq(scope.company_id))
            .one(&self.db)
            .await?
            .ok_or(RecordError::NotFound(transaction_id))?;

        let items = transaction_items::Entity::find()
            .filter(transaction_items::Column::TransactionId.eq(transaction_id))
            .order_by_asc(transaction_items::Column::Position)
            .all(&self.db)
            .await?;

        Ok(TransactionWithItems { transaction, items })
    }
}

/// Error types for the transaction recorder.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Transaction not found in scope.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Shape or item validation failed.
    #[error(transparent)]
    Validation(#[from] TransactionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

fn core_kind(kind: &TransactionKind) -> CoreKind {
    match kind {
        TransactionKind::Sale => CoreKind::Sale,
        TransactionKind::BulkSale => CoreKind::BulkSale,
        TransactionKind::Swap => CoreKind::Swap,
        TransactionKind::Buyback => CoreKind::Buyback,
    }
}
