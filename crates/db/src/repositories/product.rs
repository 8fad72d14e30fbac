//! Product repository: creation (inbound supply), restock, listing, and
//! soft deletion.
//!
//! Products referenced by transactions are never hard-deleted; the
//! `is_deleted` flag hides them from the catalog instead.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use vendra_shared::types::{PageRequest, PageResponse};

use super::stock::{StockLedgerError, StockRepository};
use super::Scope;
use crate::entities::products;

/// Error types for product operations.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// No product matches the SKU within the scope.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// A product with this SKU already exists in the scope.
    #[error("Product already exists: {0}")]
    AlreadyExists(String),

    /// Restock quantities must be positive.
    #[error("Restock quantity must be positive, got {0}")]
    NonPositiveRestock(i64),

    /// Restock delegated to the stock ledger failed.
    #[error(transparent)]
    Stock(#[from] StockLedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// SKU, unique within the scope.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Opening quantity. This is the only absolute quantity write a
    /// product ever sees; everything after creation is a signed delta.
    pub quantity: i64,
    /// Selling price per unit.
    pub selling_price: Decimal,
    /// Cost price per unit.
    pub cost_price: Decimal,
    /// Optional supplier reference.
    pub supplier_id: Option<Uuid>,
}

/// Product repository.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
    stock: StockRepository,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            stock: StockRepository::new(),
        }
    }

    /// Creates a product inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the SKU is taken within the scope.
    pub async fn create_in_txn(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        input: &CreateProductInput,
    ) -> Result<products::Model, ProductError> {
        let taken = products::Entity::find()
            .filter(products::Column::TenantId.eq(scope.tenant_id))
            .filter(products::Column::CompanyId.eq(scope.company_id))
            .filter(products::Column::Sku.eq(&input.sku))
            .one(txn)
            .await?;

        if taken.is_some() {
            return Err(ProductError::AlreadyExists(input.sku.clone()));
        }

        let now = Utc::now().into();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(scope.tenant_id),
            company_id: Set(scope.company_id),
            sku: Set(input.sku.clone()),
            name: Set(input.name.clone()),
            quantity: Set(input.quantity),
            selling_price: Set(input.selling_price),
            cost_price: Set(input.cost_price),
            supplier_id: Set(input.supplier_id),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;

        Ok(product)
    }

    /// Creates a product in its own unit of work.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the SKU is taken within the scope.
    pub async fn create(
        &self,
        scope: &Scope,
        input: &CreateProductInput,
    ) -> Result<products::Model, ProductError> {
        let txn = self.db.begin().await?;
        let product = self.create_in_txn(&txn, scope, input).await?;
        txn.commit().await?;
        Ok(product)
    }

    /// Restocks a product by a positive delta.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveRestock` for a zero or negative quantity and
    /// `NotFound` if the SKU is unknown within the scope.
    pub async fn restock(
        &self,
        scope: &Scope,
        sku: &str,
        quantity: i64,
    ) -> Result<products::Model, ProductError> {
        if quantity <= 0 {
            return Err(ProductError::NonPositiveRestock(quantity));
        }

        let txn = self.db.begin().await?;
        let product = self.stock.adjust(&txn, scope, sku, quantity).await?;
        txn.commit().await?;
        Ok(product)
    }

    /// Finds a live product by SKU within the scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_sku(
        &self,
        scope: &Scope,
        sku: &str,
    ) -> Result<Option<products::Model>, DbErr> {
        products::Entity::find()
            .filter(products::Column::TenantId.eq(scope.tenant_id))
            .filter(products::Column::CompanyId.eq(scope.company_id))
            .filter(products::Column::Sku.eq(sku))
            .filter(products::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
    }

    /// Lists live products in the scope, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        scope: &Scope,
        page: &PageRequest,
    ) -> Result<PageResponse<products::Model>, DbErr> {
        let query = products::Entity::find()
            .filter(products::Column::TenantId.eq(scope.tenant_id))
            .filter(products::Column::CompanyId.eq(scope.company_id))
            .filter(products::Column::IsDeleted.eq(false));

        let total = query.clone().count(&self.db).await?;

        let data = query
            .order_by_desc(products::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Soft-deletes a product by SKU.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the SKU is unknown within the scope.
    pub async fn soft_delete(&self, scope: &Scope, sku: &str) -> Result<(), ProductError> {
        let product = self
            .find_by_sku(scope, sku)
            .await?
            .ok_or_else(|| ProductError::NotFound(sku.to_string()))?;

        let mut active: products::ActiveModel = product.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        Ok(())
    }
}
