//! Supplier directory contract.
//!
//! Swaps that introduce a new incoming product without an existing
//! supplier call `get_or_create`; nothing else here mutates suppliers.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use super::Scope;
use crate::entities::suppliers;

/// Supplier repository.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    db: DatabaseConnection,
}

impl SupplierRepository {
    /// Creates a new supplier repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a supplier by (scope, name) or creates one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_or_create(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        name: &str,
        phone: Option<&str>,
    ) -> Result<suppliers::Model, DbErr> {
        let existing = suppliers::Entity::find()
            .filter(suppliers::Column::TenantId.eq(scope.tenant_id))
            .filter(suppliers::Column::CompanyId.eq(scope.company_id))
            .filter(suppliers::Column::Name.eq(name))
            .one(txn)
            .await?;

        if let Some(supplier) = existing {
            return Ok(supplier);
        }

        let now = Utc::now().into();
        suppliers::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(scope.tenant_id),
            company_id: Set(scope.company_id),
            name: Set(name.to_string()),
            phone: Set(phone.map(ToString::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await
    }

    /// Finds a supplier by ID within the scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        scope: &Scope,
        id: Uuid,
    ) -> Result<Option<suppliers::Model>, DbErr> {
        suppliers::Entity::find_by_id(id)
            .filter(suppliers::Column::TenantId.eq(scope.tenant_id))
            .filter(suppliers::Column::CompanyId.eq(scope.company_id))
            .one(&self.db)
            .await
    }
}
