//! # Seed Data Generator
//!
//! Populates the database with bilingual products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p kirana-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p kirana-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p kirana-db --bin seed -- --db ./data/kirana.db
//! ```
//!
//! ## Generated Products
//! Each product has:
//! - English name plus pack size: `Rice 1kg`
//! - Tamil name plus pack size: `அரிசி 1kg`
//! - Price: base price scaled by pack size
//! - Stock: 0 - 60, so some land in the low-stock listing

use std::env;

use kirana_core::{Money, NewProduct, StockAdjustment, DEFAULT_MIN_STOCK_LEVEL};
use kirana_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (English, Tamil, base price in paise)
const STAPLES: &[(&str, &str, i64)] = &[
    ("Rice", "அரிசி", 6_000),
    ("Toor Dal", "துவரம் பருப்பு", 14_000),
    ("Sugar", "சர்க்கரை", 4_500),
    ("Salt", "உப்பு", 2_000),
    ("Wheat Flour", "கோதுமை மாவு", 5_500),
    ("Sunflower Oil", "சூரியகாந்தி எண்ணெய்", 16_000),
    ("Tea Powder", "தேயிலை தூள்", 12_000),
    ("Coffee Powder", "காபி தூள்", 18_000),
    ("Milk", "பால்", 2_800),
    ("Curd", "தயிர்", 3_000),
    ("Chips", "சிப்ஸ்", 1_000),
    ("Biscuits", "பிஸ்கட்", 1_500),
    ("Soap", "சோப்பு", 4_000),
    ("Toothpaste", "பற்பசை", 9_500),
    ("Tamarind", "புளி", 7_000),
    ("Jaggery", "வெல்லம்", 6_500),
    ("Mustard Seeds", "கடுகு", 3_500),
    ("Turmeric Powder", "மஞ்சள் தூள்", 4_200),
    ("Chilli Powder", "மிளகாய் தூள்", 5_000),
    ("Coconut Oil", "தேங்காய் எண்ணெய்", 20_000),
];

/// (Pack label, price multiplier in percent)
const PACKS: &[(&str, i64)] = &[
    ("250g", 25),
    ("500g", 50),
    ("1kg", 100),
    ("2kg", 190),
    ("5kg", 450),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./kirana_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("Kirana Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./kirana_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, count, "Seeding products");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products; skipping seed");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut restock = Vec::with_capacity(count);

    for (seed, (staple, pack)) in STAPLES
        .iter()
        .flat_map(|staple| PACKS.iter().map(move |pack| (staple, pack)))
        .cycle()
        .take(count)
        .enumerate()
    {
        let product = generate_product(staple, pack, seed);
        match db.products().create(&product).await {
            Ok(created) => restock.push(StockAdjustment {
                product_id: created.id,
                quantity: (seed as i64 * 7) % 61,
            }),
            Err(e) => warn!(name = %product.name, error = %e, "Failed to insert product"),
        }
    }

    let results = db.products().bulk_adjust_stock(&restock).await?;
    let stocked = results.iter().filter(|r| r.success).count();

    let low = db.products().list_low_stock().await?;
    info!(
        products = restock.len(),
        stocked,
        low_stock = low.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );

    Ok(())
}

/// Builds one product; `seed` only varies the numbers.
fn generate_product(
    (name, localized_name, base_paise): &(&str, &str, i64),
    (pack, percent): &(&str, i64),
    seed: usize,
) -> NewProduct {
    let cycle = (seed / (STAPLES.len() * PACKS.len())) as i64;
    let suffix = if cycle == 0 {
        String::new()
    } else {
        format!(" #{}", cycle + 1)
    };

    // Round to the nearest 50 paise
    let price = (base_paise * percent / 100 + 25) / 50 * 50;

    NewProduct {
        name: format!("{name} {pack}{suffix}"),
        localized_name: format!("{localized_name} {pack}{suffix}"),
        price: Money::from_paise(price.max(50)),
        min_stock_level: DEFAULT_MIN_STOCK_LEVEL + (seed as i64 % 3) * 5,
    }
}
