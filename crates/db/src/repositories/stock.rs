//! Stock ledger: signed quantity deltas applied atomically.
//!
//! The guard and the update are one statement, so two concurrent sales can
//! never both pass a stale stock check. Batch adjustments lock the product
//! rows first and validate the cumulative effect against that snapshot
//! before applying anything.

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QuerySelect,
};
use tracing::debug;

use vendra_core::stock::{StockDelta, StockError, admit_batch};

use super::Scope;
use crate::entities::products;

/// Error types for stock ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum StockLedgerError {
    /// No product matches the SKU within the scope.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// The adjustment would drive the quantity negative.
    #[error("Insufficient stock for {sku}: on hand {on_hand}, requested {requested}")]
    InsufficientStock {
        /// The product SKU.
        sku: String,
        /// Quantity on hand when the adjustment was attempted.
        on_hand: i64,
        /// Net outgoing quantity requested.
        requested: i64,
    },

    /// The batch itself is invalid (empty, zero deltas).
    #[error("Invalid stock batch: {0}")]
    InvalidBatch(StockError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<StockError> for StockLedgerError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::NotFound(sku) => Self::NotFound(sku),
            StockError::InsufficientStock {
                sku,
                on_hand,
                requested,
            } => Self::InsufficientStock {
                sku,
                on_hand,
                requested,
            },
            other => Self::InvalidBatch(other),
        }
    }
}

/// Stock ledger repository.
///
/// All methods operate inside the caller's transaction; the ledger never
/// owns a unit of work itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockRepository;

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies one signed delta to a product's quantity.
    ///
    /// The non-negative guard is part of the UPDATE itself: the statement
    /// matches zero rows rather than writing a negative quantity, and the
    /// updated row is returned on success.
    ///
    /// # Errors
    ///
    /// `NotFound` if no live product matches the SKU in scope,
    /// `InsufficientStock` if the delta would overdraw it.
    pub async fn adjust(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        sku: &str,
        delta: i64,
    ) -> Result<products::Model, StockLedgerError> {
        let mut update = products::Entity::update_many()
            .col_expr(
                products::Column::Quantity,
                Expr::col(products::Column::Quantity).add(delta),
            )
            .col_expr(
                products::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(products::Column::TenantId.eq(scope.tenant_id))
            .filter(products::Column::CompanyId.eq(scope.company_id))
            .filter(products::Column::Sku.eq(sku))
            .filter(products::Column::IsDeleted.eq(false));

        if delta < 0 {
            update = update.filter(products::Column::Quantity.gte(-delta));
        }

        let result = update.exec(txn).await?;

        // The re-read happens inside our transaction and sees our own
        // write; on zero rows it tells a missing product apart from a
        // rejected delta.
        let existing = products::Entity::find()
            .filter(products::Column::TenantId.eq(scope.tenant_id))
            .filter(products::Column::CompanyId.eq(scope.company_id))
            .filter(products::Column::Sku.eq(sku))
            .filter(products::Column::IsDeleted.eq(false))
            .one(txn)
            .await?;

        match existing {
            Some(product) if result.rows_affected > 0 => {
                debug!(sku, delta, quantity = product.quantity, "Adjusted stock");
                Ok(product)
            }
            Some(product) => Err(StockLedgerError::InsufficientStock {
                sku: sku.to_string(),
                on_hand: product.quantity,
                requested: -delta,
            }),
            None => Err(StockLedgerError::NotFound(sku.to_string())),
        }
    }

    /// Applies a batch of deltas, admitted as a whole.
    ///
    /// The product rows are locked FOR UPDATE, the cumulative effect per
    /// SKU is validated against that snapshot, and only then are the net
    /// deltas applied. A batch that nets to an overdraw on any SKU is
    /// rejected without touching stock.
    ///
    /// # Errors
    ///
    /// Propagates admission failures (`NotFound`, `InsufficientStock`,
    /// `InvalidBatch`) and database errors.
    pub async fn adjust_many(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        deltas: &[StockDelta],
    ) -> Result<Vec<products::Model>, StockLedgerError> {
        let skus: Vec<&str> = deltas.iter().map(|d| d.sku.as_str()).collect();

        let rows = products::Entity::find()
            .filter(products::Column::TenantId.eq(scope.tenant_id))
            .filter(products::Column::CompanyId.eq(scope.company_id))
            .filter(products::Column::Sku.is_in(skus))
            .filter(products::Column::IsDeleted.eq(false))
            .lock_exclusive()
            .all(txn)
            .await?;

        let snapshot: HashMap<String, i64> =
            rows.iter().map(|p| (p.sku.clone(), p.quantity)).collect();

        let admitted = admit_batch(&snapshot, deltas)?;

        let mut updated = Vec::with_capacity(admitted.len());
        for d in &admitted {
            updated.push(self.adjust(txn, scope, &d.sku, d.delta).await?);
        }

        Ok(updated)
    }
}
