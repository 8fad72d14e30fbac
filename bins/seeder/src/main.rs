//! Database seeder for Vendra development and testing.
//!
//! Seeds a demo tenant, company, clerk, supplier, and a small product
//! catalog for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use vendra_db::entities::{companies, products, suppliers, tenants, users};

/// Demo tenant ID (consistent for all seeds)
const DEMO_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo company ID (consistent for all seeds)
const DEMO_COMPANY_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Demo clerk ID (consistent for all seeds)
const DEMO_USER_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Demo supplier ID (consistent for all seeds)
const DEMO_SUPPLIER_ID: &str = "00000000-0000-0000-0000-000000000004";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = vendra_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo tenant...");
    seed_tenant(&db).await;

    println!("Seeding demo company...");
    seed_company(&db).await;

    println!("Seeding demo clerk...");
    seed_user(&db).await;

    println!("Seeding demo supplier...");
    seed_supplier(&db).await;

    println!("Seeding demo products...");
    seed_products(&db).await;

    println!("Seeding complete!");
}

fn demo_tenant_id() -> Uuid {
    Uuid::parse_str(DEMO_TENANT_ID).unwrap()
}

fn demo_company_id() -> Uuid {
    Uuid::parse_str(DEMO_COMPANY_ID).unwrap()
}

fn demo_user_id() -> Uuid {
    Uuid::parse_str(DEMO_USER_ID).unwrap()
}

fn demo_supplier_id() -> Uuid {
    Uuid::parse_str(DEMO_SUPPLIER_ID).unwrap()
}

async fn seed_tenant(db: &DatabaseConnection) {
    if tenants::Entity::find_by_id(demo_tenant_id())
        .one(db)
        .await
        .expect("query tenant")
        .is_some()
    {
        println!("  Demo tenant already exists, skipping");
        return;
    }

    tenants::ActiveModel {
        id: Set(demo_tenant_id()),
        name: Set("Demo Tenant".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert tenant");
}

async fn seed_company(db: &DatabaseConnection) {
    if companies::Entity::find_by_id(demo_company_id())
        .one(db)
        .await
        .expect("query company")
        .is_some()
    {
        println!("  Demo company already exists, skipping");
        return;
    }

    let now = Utc::now().into();
    companies::ActiveModel {
        id: Set(demo_company_id()),
        tenant_id: Set(demo_tenant_id()),
        name: Set("General Tech".to_string()),
        email: Set(Some("hello@generaltech.example".to_string())),
        phone: Set(Some("0700000000".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert company");
}

async fn seed_user(db: &DatabaseConnection) {
    if users::Entity::find_by_id(demo_user_id())
        .one(db)
        .await
        .expect("query user")
        .is_some()
    {
        println!("  Demo clerk already exists, skipping");
        return;
    }

    users::ActiveModel {
        id: Set(demo_user_id()),
        tenant_id: Set(demo_tenant_id()),
        email: Set("clerk@generaltech.example".to_string()),
        full_name: Set("Demo Clerk".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert user");
}

async fn seed_supplier(db: &DatabaseConnection) {
    if suppliers::Entity::find_by_id(demo_supplier_id())
        .one(db)
        .await
        .expect("query supplier")
        .is_some()
    {
        println!("  Demo supplier already exists, skipping");
        return;
    }

    let now = Utc::now().into();
    suppliers::ActiveModel {
        id: Set(demo_supplier_id()),
        tenant_id: Set(demo_tenant_id()),
        company_id: Set(demo_company_id()),
        name: Set("Wholesale Electronics Ltd".to_string()),
        phone: Set(Some("0711111111".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert supplier");
}

async fn seed_products(db: &DatabaseConnection) {
    let catalog: &[(&str, &str, i64, i64, i64)] = &[
        ("TV-1001", "55\" Smart TV", 10, 500, 350),
        ("RD-2002", "FM Radio", 25, 120, 70),
        ("FN-3003", "Ceiling Fan", 15, 150, 90),
        ("AC-4004", "Air Conditioner", 5, 900, 650),
    ];

    let now = Utc::now();
    for (sku, name, quantity, selling, cost) in catalog {
        let result = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(demo_tenant_id()),
            company_id: Set(demo_company_id()),
            sku: Set((*sku).to_string()),
            name: Set((*name).to_string()),
            quantity: Set(*quantity),
            selling_price: Set(Decimal::from(*selling)),
            cost_price: Set(Decimal::from(*cost)),
            supplier_id: Set(Some(demo_supplier_id())),
            is_deleted: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await;

        match result {
            Ok(_) => println!("  Seeded {sku}"),
            Err(_) => println!("  {sku} already exists, skipping"),
        }
    }
}
