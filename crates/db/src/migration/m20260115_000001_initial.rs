//! Initial database migration.
//!
//! Creates all core tables, enums, and indexes for the transaction and
//! payment-plan engine.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY
        // ============================================================
        db.execute_unprepared(TENANTS_SQL).await?;
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: DIRECTORIES
        // ============================================================
        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(SUPPLIERS_SQL).await?;

        // ============================================================
        // PART 4: INVENTORY
        // ============================================================
        db.execute_unprepared(PRODUCTS_SQL).await?;

        // ============================================================
        // PART 5: TRANSACTIONS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_ITEMS_SQL).await?;

        // ============================================================
        // PART 6: PAYMENT PLANS
        // ============================================================
        db.execute_unprepared(PAYMENT_PLANS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        // ============================================================
        // PART 7: INVOICES & SEQUENCES
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_SEQUENCES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Transaction kind
CREATE TYPE transaction_kind AS ENUM (
    'sale',
    'bulk_sale',
    'swap',
    'buyback'
);

-- Transaction item direction
CREATE TYPE item_direction AS ENUM ('debit', 'credit');

-- Customer classification
CREATE TYPE customer_type AS ENUM ('customer', 'debtor');

-- Payment plan frequency
CREATE TYPE payment_frequency AS ENUM (
    'one_time',
    'weekly',
    'biweekly',
    'monthly',
    'quarterly'
);

-- Payment method
CREATE TYPE payment_method AS ENUM ('cash', 'card', 'transfer', 'cheque');

-- Invoice status
CREATE TYPE invoice_status AS ENUM ('draft', 'part_paid', 'paid', 'overdue');
";

const TENANTS_SQL: &str = r"
CREATE TABLE tenants (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, name)
);

CREATE INDEX idx_companies_tenant ON companies(tenant_id);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_tenant ON users(tenant_id);
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    phone VARCHAR(50) NOT NULL,
    email VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, company_id, phone)
);

CREATE INDEX idx_customers_scope ON customers(tenant_id, company_id);
";

const SUPPLIERS_SQL: &str = r"
CREATE TABLE suppliers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    phone VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, company_id, name)
);

CREATE INDEX idx_suppliers_scope ON suppliers(tenant_id, company_id);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    sku VARCHAR(100) NOT NULL,
    name VARCHAR(255) NOT NULL,
    quantity BIGINT NOT NULL DEFAULT 0,
    selling_price NUMERIC(19, 4) NOT NULL,
    cost_price NUMERIC(19, 4) NOT NULL,
    -- Weak supplier reference: deleting a supplier nulls this, never
    -- cascades into the product.
    supplier_id UUID REFERENCES suppliers(id) ON DELETE SET NULL,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_quantity_non_negative CHECK (quantity >= 0),
    CONSTRAINT chk_prices_non_negative CHECK (selling_price >= 0 AND cost_price >= 0),
    UNIQUE (tenant_id, company_id, sku)
);

CREATE INDEX idx_products_scope ON products(tenant_id, company_id) WHERE is_deleted = false;
CREATE INDEX idx_products_supplier ON products(supplier_id) WHERE supplier_id IS NOT NULL;
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    kind transaction_kind NOT NULL,
    customer_id UUID REFERENCES customers(id),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_txn_scope_created ON transactions(tenant_id, company_id, created_at DESC);
CREATE INDEX idx_txn_customer ON transactions(customer_id) WHERE customer_id IS NOT NULL;
";

const TRANSACTION_ITEMS_SQL: &str = r"
CREATE TABLE transaction_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    product_id UUID NOT NULL REFERENCES products(id),
    position INTEGER NOT NULL,
    quantity BIGINT NOT NULL,
    price_per_unit NUMERIC(19, 4) NOT NULL,
    total_price NUMERIC(19, 4) NOT NULL,
    direction item_direction NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_item_quantity_positive CHECK (quantity > 0),
    CONSTRAINT chk_item_price_non_negative CHECK (price_per_unit >= 0),
    CONSTRAINT chk_item_total_non_negative CHECK (total_price >= 0),
    UNIQUE (transaction_id, position)
);

CREATE INDEX idx_items_transaction ON transaction_items(transaction_id);
CREATE INDEX idx_items_product ON transaction_items(product_id);
";

const PAYMENT_PLANS_SQL: &str = r"
CREATE TABLE payment_plans (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    customer_id UUID REFERENCES customers(id),
    installment_count INTEGER NOT NULL DEFAULT 1,
    frequency payment_frequency NOT NULL DEFAULT 'one_time',
    customer_type customer_type NOT NULL DEFAULT 'customer',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_installment_count_positive CHECK (installment_count > 0),
    UNIQUE (transaction_id)
);

CREATE INDEX idx_plans_scope ON payment_plans(tenant_id, company_id);
CREATE INDEX idx_plans_customer ON payment_plans(customer_id) WHERE customer_id IS NOT NULL;
CREATE INDEX idx_plans_debtors ON payment_plans(tenant_id, company_id) WHERE customer_type = 'debtor';
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    plan_id UUID NOT NULL REFERENCES payment_plans(id) ON DELETE CASCADE,
    installment_no INTEGER NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL,
    balance_owed NUMERIC(19, 4) NOT NULL,
    balance_paid NUMERIC(19, 4) NOT NULL,
    total_pay NUMERIC(19, 4) NOT NULL,
    method payment_method NOT NULL,
    bank_account VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_balance_owed_non_negative CHECK (balance_owed >= 0),
    CONSTRAINT chk_balance_paid_non_negative CHECK (balance_paid >= 0),
    CONSTRAINT chk_installment_no_positive CHECK (installment_no > 0),
    UNIQUE (plan_id, installment_no)
);

CREATE INDEX idx_payments_plan ON payments(plan_id, installment_no DESC);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    invoice_no VARCHAR(50) NOT NULL,
    status invoice_status NOT NULL DEFAULT 'draft',
    payment_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, invoice_no),
    UNIQUE (transaction_id)
);

CREATE INDEX idx_invoices_scope ON invoices(tenant_id, company_id);
CREATE INDEX idx_invoices_due ON invoices(tenant_id, company_id, payment_date) WHERE status = 'draft';
";

const INVOICE_SEQUENCES_SQL: &str = r"
CREATE TABLE invoice_sequences (
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    period CHAR(4) NOT NULL,
    last_seq INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_last_seq_non_negative CHECK (last_seq >= 0),
    PRIMARY KEY (tenant_id, company_id, period)
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS invoice_sequences CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS payment_plans CASCADE;
DROP TABLE IF EXISTS transaction_items CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS products CASCADE;
DROP TABLE IF EXISTS suppliers CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS companies CASCADE;
DROP TABLE IF EXISTS tenants CASCADE;

DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS payment_frequency;
DROP TYPE IF EXISTS customer_type;
DROP TYPE IF EXISTS item_direction;
DROP TYPE IF EXISTS transaction_kind;
";
