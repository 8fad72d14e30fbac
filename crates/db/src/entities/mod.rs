//! `SeaORM` entity definitions.

pub mod companies;
pub mod customers;
pub mod invoice_sequences;
pub mod invoices;
pub mod payment_plans;
pub mod payments;
pub mod products;
pub mod sea_orm_active_enums;
pub mod suppliers;
pub mod tenants;
pub mod transaction_items;
pub mod transactions;
pub mod users;
