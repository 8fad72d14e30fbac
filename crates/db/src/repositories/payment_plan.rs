//! Payment plan repository: installment history and classification.
//!
//! The plan row is locked before the latest payment is read, so two
//! concurrent payments against one plan serialize. The latest payment row
//! is the plan's authoritative balance; `installment_count` and
//! `customer_type` are only ever updated together with an append.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use vendra_core::payment::{PaymentError, PaymentState, open_plan, record_payment};

use super::Scope;
use crate::entities::{
    payment_plans, payments,
    sea_orm_active_enums::{CustomerType, PaymentFrequency, PaymentMethod},
    transaction_items, transactions,
};

/// Error types for payment plan operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentPlanError {
    /// No plan exists for this transaction in scope.
    #[error("Payment plan not found for transaction {0}")]
    PlanNotFound(Uuid),

    /// No transaction item with this ID in scope.
    #[error("Transaction item not found: {0}")]
    ItemNotFound(Uuid),

    /// A plan exists but has no payment rows.
    #[error("Payment plan {0} has no payments")]
    NoPayments(Uuid),

    /// Business rule violation from the state machine.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A plan together with its latest (authoritative) payment.
#[derive(Debug, Clone)]
pub struct PlanWithLatestPayment {
    /// The plan header.
    pub plan: payment_plans::Model,
    /// The payment row with the highest installment number.
    pub latest: payments::Model,
}

impl PlanWithLatestPayment {
    /// The plan's current balance, always read from the latest payment.
    #[must_use]
    pub const fn current_balance(&self) -> Decimal {
        self.latest.balance_owed
    }
}

/// Payment plan repository.
#[derive(Debug, Clone)]
pub struct PaymentPlanRepository {
    db: DatabaseConnection,
}

impl PaymentPlanRepository {
    /// Creates a new payment plan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a plan for a transaction with its first payment.
    ///
    /// # Errors
    ///
    /// Returns a state machine error for invalid amounts, or the
    /// underlying database error.
    #[allow(clippy::too_many_arguments)]
    pub async fn open(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        transaction_id: Uuid,
        customer_id: Option<Uuid>,
        total_amount: Decimal,
        balance_owed: Decimal,
        method: PaymentMethod,
        frequency: PaymentFrequency,
        bank_account: Option<String>,
    ) -> Result<PlanWithLatestPayment, PaymentPlanError> {
        let state = open_plan(total_amount, balance_owed)?;
        let now = Utc::now().into();

        let plan = payment_plans::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(scope.tenant_id),
            company_id: Set(scope.company_id),
            transaction_id: Set(transaction_id),
            customer_id: Set(customer_id),
            installment_count: Set(state.installment_no),
            frequency: Set(frequency),
            customer_type: Set(db_customer_type(&state)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;

        let payment = self
            .append_payment(txn, plan.id, &state, method, bank_account)
            .await?;

        Ok(PlanWithLatestPayment {
            plan,
            latest: payment,
        })
    }

    /// Records a payment against the plan owned by a transaction.
    ///
    /// The plan row is locked first; the latest payment is then read and
    /// the new installment appended, with `installment_count` and
    /// `customer_type` updated in the same unit of work.
    ///
    /// # Errors
    ///
    /// `PlanNotFound` if the transaction has no plan in scope;
    /// `NoOutstandingBalance`/`Overpayment` from the state machine.
    pub async fn record_payment(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        transaction_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        bank_account: Option<String>,
    ) -> Result<PlanWithLatestPayment, PaymentPlanError> {
        let plan = self.lock_plan(txn, scope, transaction_id).await?;
        let latest = self.latest_payment(txn, plan.id).await?;

        let next = record_payment(&payment_state(&latest), amount)?;
        let payment = self
            .append_payment(txn, plan.id, &next, method, bank_account)
            .await?;

        let mut active: payment_plans::ActiveModel = plan.into();
        active.installment_count = Set(next.installment_no);
        active.customer_type = Set(db_customer_type(&next));
        active.updated_at = Set(Utc::now().into());
        let plan = active.update(txn).await?;

        Ok(PlanWithLatestPayment {
            plan,
            latest: payment,
        })
    }

    /// Corrects a sold item's price on a settled plan.
    ///
    /// Rewrites `price_per_unit` and `total_price` together and adjusts
    /// the latest payment's `total_amount` by the delta. An increase
    /// reopens the plan with the difference owed.
    ///
    /// # Errors
    ///
    /// `ItemNotFound` if the item is not in scope, `OutstandingBalance`
    /// if the plan is not settled.
    pub async fn correct_price(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        item_id: Uuid,
        new_total_price: Decimal,
    ) -> Result<(transaction_items::Model, PlanWithLatestPayment), PaymentPlanError> {
        let item = transaction_items::Entity::find_by_id(item_id)
            .one(txn)
            .await?
            .ok_or(PaymentPlanError::ItemNotFound(item_id))?;

        // Scope check through the owning transaction.
        let owner = transactions::Entity::find_by_id(item.transaction_id)
            .filter(transactions::Column::TenantId.eq(scope.tenant_id))
            .filter(transactions::Column::CompanyId.eq(scope.company_id))
            .one(txn)
            .await?
            .ok_or(PaymentPlanError::ItemNotFound(item_id))?;

        let plan = self.lock_plan(txn, scope, owner.id).await?;
        let latest = self.latest_payment(txn, plan.id).await?;

        let correction = vendra_core::payment::correct_price(
            &payment_state(&latest),
            item.total_price,
            new_total_price,
        )?;

        let now = Utc::now().into();

        let quantity = Decimal::from(item.quantity);
        let mut item_active: transaction_items::ActiveModel = item.into();
        item_active.price_per_unit = Set((new_total_price / quantity).round_dp(4));
        item_active.total_price = Set(new_total_price);
        item_active.updated_at = Set(now);
        let item = item_active.update(txn).await?;

        let mut payment_active: payments::ActiveModel = latest.into();
        payment_active.total_amount = Set(correction.amended.total_amount);
        payment_active.balance_owed = Set(correction.amended.balance_owed);
        payment_active.updated_at = Set(now);
        let latest = payment_active.update(txn).await?;

        let mut plan_active: payment_plans::ActiveModel = plan.into();
        plan_active.customer_type = Set(db_customer_type(&correction.amended));
        plan_active.updated_at = Set(now);
        let plan = plan_active.update(txn).await?;

        Ok((item, PlanWithLatestPayment { plan, latest }))
    }

    /// Finds a plan (with its latest payment) by transaction within scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_transaction(
        &self,
        scope: &Scope,
        transaction_id: Uuid,
    ) -> Result<Option<PlanWithLatestPayment>, PaymentPlanError> {
        let plan = payment_plans::Entity::find()
            .filter(payment_plans::Column::TenantId.eq(scope.tenant_id))
            .filter(payment_plans::Column::CompanyId.eq(scope.company_id))
            .filter(payment_plans::Column::TransactionId.eq(transaction_id))
            .one(&self.db)
            .await?;

        let Some(plan) = plan else {
            return Ok(None);
        };

        let latest = payments::Entity::find()
            .filter(payments::Column::PlanId.eq(plan.id))
            .order_by_desc(payments::Column::InstallmentNo)
            .limit(1)
            .one(&self.db)
            .await?
            .ok_or(PaymentPlanError::NoPayments(plan.id))?;

        Ok(Some(PlanWithLatestPayment { plan, latest }))
    }

    /// Finds and locks the plan row for a transaction.
    async fn lock_plan(
        &self,
        txn: &DatabaseTransaction,
        scope: &Scope,
        transaction_id: Uuid,
    ) -> Result<payment_plans::Model, PaymentPlanError> {
        payment_plans::Entity::find()
            .filter(payment_plans::Column::TenantId.eq(scope.tenant_id))
            .filter(payment_plans::Column::CompanyId.eq(scope.company_id))
            .filter(payment_plans::Column::TransactionId.eq(transaction_id))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(PaymentPlanError::PlanNotFound(transaction_id))
    }

    /// Reads the latest payment row for a plan.
    async fn latest_payment(
        &self,
        txn: &DatabaseTransaction,
        plan_id: Uuid,
    ) -> Result<payments::Model, PaymentPlanError> {
        payments::Entity::find()
            .filter(payments::Column::PlanId.eq(plan_id))
            .order_by_desc(payments::Column::InstallmentNo)
            .limit(1)
            .one(txn)
            .await?
            .ok_or(PaymentPlanError::NoPayments(plan_id))
    }

    /// Appends one payment row from a state machine transition.
    async fn append_payment(
        &self,
        txn: &DatabaseTransaction,
        plan_id: Uuid,
        state: &PaymentState,
        method: PaymentMethod,
        bank_account: Option<String>,
    ) -> Result<payments::Model, PaymentPlanError> {
        let now = Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            plan_id: Set(plan_id),
            installment_no: Set(state.installment_no),
            total_amount: Set(state.total_amount),
            balance_owed: Set(state.balance_owed),
            balance_paid: Set(state.balance_paid),
            total_pay: Set(state.total_pay),
            method: Set(method),
            bank_account: Set(bank_account),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;

        Ok(payment)
    }
}

/// Maps a state machine snapshot back from a payment row.
fn payment_state(row: &payments::Model) -> PaymentState {
    PaymentState {
        total_amount: row.total_amount,
        balance_owed: row.balance_owed,
        balance_paid: row.balance_paid,
        total_pay: row.total_pay,
        installment_no: row.installment_no,
    }
}

/// Maps the state machine's classification to the database enum.
fn db_customer_type(state: &PaymentState) -> CustomerType {
    match state.customer_type() {
        vendra_core::payment::CustomerType::Customer => CustomerType::Customer,
        vendra_core::payment::CustomerType::Debtor => CustomerType::Debtor,
    }
}
