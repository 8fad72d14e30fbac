//! `SeaORM` Entity for payments table.
//!
//! Append-only installment history; the row with the highest
//! `installment_no` carries the plan's authoritative balance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentMethod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub plan_id: Uuid,
    pub installment_no: i32,
    pub total_amount: Decimal,
    pub balance_owed: Decimal,
    pub balance_paid: Decimal,
    pub total_pay: Decimal,
    pub method: PaymentMethod,
    pub bank_account: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payment_plans::Entity",
        from = "Column::PlanId",
        to = "super::payment_plans::Column::Id"
    )]
    PaymentPlans,
}

impl Related<super::payment_plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentPlans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
