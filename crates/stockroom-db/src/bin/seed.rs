//! # Seed Data Generator
//!
//! Populates a database with demo suppliers and products.
//!
//! ## Usage
//! ```bash
//! cargo run -p stockroom-db --bin seed
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db --per-supplier 20
//! ```
//!
//! Every third product starts at or below its threshold, so the first order
//! placed against it triggers a low-stock alert.

use chrono::Utc;
use std::env;
use stockroom_core::{Product, Supplier, DEFAULT_LOW_STOCK_THRESHOLD};
use stockroom_db::{generate_product_id, generate_supplier_id, Database, DbConfig};

/// (name, contact number, email, category, product names)
const SUPPLIERS: &[(&str, &str, &str, &str, &[&str])] = &[
    (
        "Northwind Fasteners",
        "+1 555 0101",
        "orders@northwind.example",
        "hardware",
        &["Hex Bolt M6", "Hex Bolt M8", "Wing Nut M6", "Washer 8mm", "Lock Nut M10"],
    ),
    (
        "Bluebird Office Supply",
        "+1 555 0102",
        "sales@bluebird.example",
        "stationery",
        &["A4 Paper Ream", "Ballpoint Pen", "Stapler", "Toner Cartridge", "Sticky Notes"],
    ),
    (
        "Harbor Safety Co",
        "+1 555 0103",
        "restock@harborsafety.example",
        "safety",
        &["Nitrile Gloves", "Safety Goggles", "Ear Plugs", "Hi-Vis Vest", "Hard Hat"],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockroom_dev.db");
    let mut per_supplier: usize = 5;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--per-supplier" | "-n" => {
                if i + 1 < args.len() {
                    per_supplier = args[i + 1].parse().unwrap_or(per_supplier);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>            Database file path (default: ./stockroom_dev.db)");
                println!("  -n, --per-supplier <N>     Products per supplier (default: 5)");
                println!("  -h, --help                 Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products, skipping seed", existing);
        return Ok(());
    }

    let mut generated = 0;
    for (s_idx, (name, phone, email, category, products)) in SUPPLIERS.iter().enumerate() {
        let now = Utc::now();
        let supplier = db
            .suppliers()
            .insert(&Supplier {
                id: generate_supplier_id(),
                name: name.to_string(),
                contact_number: phone.to_string(),
                email: Some(email.to_string()),
                address: None,
                products_supplied: Vec::new(),
                created_at: now,
                updated_at: now,
            })
            .await?;

        for n in 0..per_supplier {
            let base = products[n % products.len()];
            let product = generate_product(&supplier.id, category, base, s_idx * 1000 + n);

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.sku, e);
                continue;
            }
            generated += 1;
        }

        println!("  {} → {} products", supplier.name, per_supplier);
    }

    println!();
    println!("✓ Seeded {} suppliers, {} products", SUPPLIERS.len(), generated);
    Ok(())
}

fn generate_product(supplier_id: &str, category: &str, base: &str, seed: usize) -> Product {
    let now = Utc::now();

    let prefix: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .collect::<String>()
        .to_uppercase();

    // Every third product starts low
    let quantity = if seed % 3 == 0 {
        (seed % 4) as i64
    } else {
        20 + (seed * 7 % 80) as i64
    };
    let unit_cents = 50 + (seed * 37 % 1950) as i64;

    Product {
        id: generate_product_id(),
        name: base.to_string(),
        sku: format!("{}-{:04}", prefix, seed),
        description: None,
        category: Some(category.to_string()),
        quantity,
        threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        total_price_cents: quantity * unit_cents,
        supplier_id: supplier_id.to_string(),
        last_notification_sent: None,
        created_at: now,
        updated_at: now,
    }
}
