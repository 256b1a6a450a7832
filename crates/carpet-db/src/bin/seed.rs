//! # Seed Data Generator
//!
//! Populates a database with carpet stock and one demo customer for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 items (default)
//! cargo run -p carpet-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p carpet-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p carpet-db --bin seed -- --db ./data/carpet.db
//! ```
//!
//! ## Generated Items
//! Every combination of weave, color and size until `--count` is reached:
//! - Unique SKU: `{WEAVE}-{COLOR}-{INDEX}`
//! - Barcode: `869{INDEX:010}`
//! - Price grows with the rug's area
//! - Stock 0 - 24, thresholds 3 / 40

use carpet_core::{InventoryItem, NewCustomer};
use carpet_db::{Database, DbConfig};
use chrono::Utc;
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Weave code, display name, material, base price per m² in cents.
const WEAVES: &[(&str, &str, &str, i64)] = &[
    ("PER", "Persian", "Wool", 12_000),
    ("KAS", "Kashan", "Silk", 25_000),
    ("TAB", "Tabriz", "Wool", 14_000),
    ("KIL", "Kilim", "Cotton", 4_500),
    ("SHG", "Shaggy", "Polypropylene", 3_000),
    ("BOK", "Bokhara", "Wool", 9_500),
];

const COLORS: &[&str] = &["Red", "Navy", "Ivory", "Beige", "Green", "Rust", "Charcoal"];

/// Size label and area in cm².
const SIZES: &[(&str, i64)] = &[
    ("60x90", 5_400),
    ("120x180", 21_600),
    ("160x230", 36_800),
    ("200x300", 60_000),
    ("250x350", 87_500),
    ("300x400", 120_000),
];

const LOCATION: &str = "main";
const SEED_ACTOR: &str = "seed";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./carpet_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Carpet POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./carpet_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Carpet POS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.inventory().count().await?;
    if existing > 0 {
        println!("Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut index = 0;

    'outer: for weave in WEAVES {
        for color in COLORS {
            for size in SIZES {
                if generated >= count {
                    break 'outer;
                }
                index += 1;

                let item = generate_item(*weave, color, *size, index);
                if let Err(e) = db.inventory().insert(&item).await {
                    eprintln!("Failed to insert {}: {}", item.sku, e);
                    continue;
                }

                generated += 1;
                if generated % 100 == 0 {
                    println!("  Generated {} items...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("Generated {} items in {:?}", generated, elapsed);

    let customer = db
        .customers()
        .create(&NewCustomer {
            name: "Demo Customer".to_string(),
            email: "demo@carpet.local".to_string(),
            phone: "0000000000".to_string(),
            address: "N/A".to_string(),
            city: "N/A".to_string(),
            location: LOCATION.to_string(),
            tax_number: None,
            credit_limit_cents: None,
            payment_terms: None,
            created_by: SEED_ACTOR.to_string(),
        })
        .await?;
    println!("Demo customer: {} ({})", customer.name, customer.id);

    let low = db.inventory().list_low_stock().await?;
    println!("Low stock items: {}", low.len());

    println!();
    println!("Seed complete!");

    Ok(())
}

/// Builds one rug with deterministic pseudo-random stock.
fn generate_item(
    (code, weave, material, price_per_m2): (&str, &str, &str, i64),
    color: &str,
    (size, area_cm2): (&str, i64),
    index: usize,
) -> InventoryItem {
    let now = Utc::now();

    let sku = format!("{}-{}-{:04}", code, &color[..3].to_uppercase(), index);
    let barcode = format!("869{:010}", index);

    let unit_price_cents = price_per_m2 * area_cm2 / 10_000;
    let cost_pct = 55 + (index % 20) as i64;
    let cost_price_cents = unit_price_cents * cost_pct / 100;

    InventoryItem {
        id: Uuid::new_v4().to_string(),
        sku,
        barcode,
        name: format!("{} {} {}", weave, color, size),
        item_type: weave.to_string(),
        color: color.to_string(),
        size: size.to_string(),
        material: material.to_string(),
        location: LOCATION.to_string(),
        supplier: None,
        description: None,
        unit_price_cents,
        cost_price_cents,
        stock_quantity: ((index * 7) % 25) as i64,
        minimum_stock: 3,
        maximum_stock: 40,
        created_by: SEED_ACTOR.to_string(),
        created_at: now,
        updated_at: now,
        version: 0,
    }
}
