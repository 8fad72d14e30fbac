//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction kind.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Single-item sale.
    #[sea_orm(string_value = "sale")]
    Sale,
    /// Multi-line sale.
    #[sea_orm(string_value = "bulk_sale")]
    BulkSale,
    /// Outgoing product exchanged for incoming products.
    #[sea_orm(string_value = "swap")]
    Swap,
    /// Stock bought back from a customer.
    #[sea_orm(string_value = "buyback")]
    Buyback,
}

/// Direction of a transaction item.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "item_direction")]
#[serde(rename_all = "lowercase")]
pub enum ItemDirection {
    /// Stock decreases, revenue in.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Stock increases, money out.
    #[sea_orm(string_value = "credit")]
    Credit,
}

/// Customer classification carried on the payment plan.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "customer_type")]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    /// No outstanding balance.
    #[sea_orm(string_value = "customer")]
    Customer,
    /// Outstanding balance on the latest installment.
    #[sea_orm(string_value = "debtor")]
    Debtor,
}

/// Payment plan frequency.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_frequency")]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    /// Single settlement.
    #[sea_orm(string_value = "one_time")]
    OneTime,
    /// Weekly installments.
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Biweekly installments.
    #[sea_orm(string_value = "biweekly")]
    Biweekly,
    /// Monthly installments.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Quarterly installments.
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
}

/// Payment method.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash payment.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Card payment.
    #[sea_orm(string_value = "card")]
    Card,
    /// Bank transfer.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Cheque payment.
    #[sea_orm(string_value = "cheque")]
    Cheque,
}

/// Invoice status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Issued, no payment recorded yet.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Partially paid.
    #[sea_orm(string_value = "part_paid")]
    PartPaid,
    /// Fully paid.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Draft invoice past its payment date.
    #[sea_orm(string_value = "overdue")]
    Overdue,
}
