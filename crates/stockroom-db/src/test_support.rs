//! Fixtures shared by the repository tests.

use chrono::Utc;
use stockroom_core::{Order, OrderStatus, Product, Supplier};

use crate::repository::order::generate_order_id;
use crate::repository::product::generate_product_id;
use crate::repository::supplier::generate_supplier_id;
use crate::Database;

pub async fn seed_supplier(db: &Database, email: Option<&str>) -> Supplier {
    let now = Utc::now();
    let supplier = Supplier {
        id: generate_supplier_id(),
        name: "Acme Fasteners".to_string(),
        contact_number: "+1 555 0100".to_string(),
        email: email.map(str::to_string),
        address: None,
        products_supplied: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    db.suppliers().insert(&supplier).await.unwrap()
}

pub async fn seed_product(db: &Database, supplier_id: &str, quantity: i64, threshold: i64) -> Product {
    let now = Utc::now();
    let id = generate_product_id();
    let product = Product {
        sku: format!("SKU-{}", &id[..8]),
        id,
        name: "Hex bolt M6".to_string(),
        description: None,
        category: Some("hardware".to_string()),
        quantity,
        threshold,
        total_price_cents: quantity * 25,
        supplier_id: supplier_id.to_string(),
        last_notification_sent: None,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap()
}

pub fn new_order(product_id: &str, quantity: i64, status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id: generate_order_id(),
        product_id: product_id.to_string(),
        quantity,
        issued_to: "Line 3".to_string(),
        purpose: "maintenance".to_string(),
        issued_by: None,
        total_price_cents: quantity * 25,
        status,
        created_at: now,
        updated_at: now,
    }
}
