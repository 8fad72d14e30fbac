//! Customer directory contract.
//!
//! The engine only upserts by (scope, phone) and reads back; customer CRUD
//! beyond that belongs to the directory service.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use super::Scope;
use crate::entities::customers;

/// Customer repository.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upserts a customer by (scope, phone) and returns its ID.
    ///
    /// An existing customer keeps its ID; name and email are refreshed
    /// from the input. Nothing else is mutated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn upsert(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> Result<customers::Model, DbErr> {
        let existing = customers::Entity::find()
            .filter(customers::Column::TenantId.eq(scope.tenant_id))
            .filter(customers::Column::CompanyId.eq(scope.company_id))
            .filter(customers::Column::Phone.eq(phone))
            .one(txn)
            .await?;

        let now = Utc::now().into();

        if let Some(customer) = existing {
            let mut active: customers::ActiveModel = customer.into();
            active.name = Set(name.to_string());
            if let Some(email) = email {
                active.email = Set(Some(email.to_string()));
            }
            active.updated_at = Set(now);
            return active.update(txn).await;
        }

        customers::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(scope.tenant_id),
            company_id: Set(scope.company_id),
            name: Set(name.to_string()),
            phone: Set(phone.to_string()),
            email: Set(email.map(ToString::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await
    }

    /// Finds a customer by ID within the scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        scope: &Scope,
        id: Uuid,
    ) -> Result<Option<customers::Model>, DbErr> {
        customers::Entity::find_by_id(id)
            .filter(customers::Column::TenantId.eq(scope.tenant_id))
            .filter(customers::Column::CompanyId.eq(scope.company_id))
            .one(&self.db)
            .await
    }
}
