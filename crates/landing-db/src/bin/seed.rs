//! # Seed Data Generator
//!
//! Populates the database with sample supplement products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 25 products (default)
//! cargo run -p landing-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p landing-db --bin seed -- --count 100
//!
//! # Specify database path (otherwise LANDING_DB_PATH or ./landing.db)
//! cargo run -p landing-db --bin seed -- --db ./data/landing_dev.db
//! ```
//!
//! Each product is created together with its ingredients and "why choose"
//! items in one transaction, then the dashboard summary is printed as JSON.

use std::env;

use landing_core::{NewIngredient, NewProduct, NewWhyChoose};
use landing_db::{Database, DbConfig, DbError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Public ids are three digits, so the catalog tops out well below 900.
const MAX_COUNT: usize = 300;

const DEFAULT_COUNT: usize = 25;

/// (name, description, ingredients)
const LINES: &[(&str, &str, &[&str])] = &[
    (
        "Keto Burn",
        "Thermogenic support for low-carb diets",
        &["Green Tea Extract", "Caffeine", "L-Carnitine"],
    ),
    (
        "Night Slim",
        "Evening formula that helps you burn while you rest",
        &["Melatonin", "Chamomile", "Magnesium"],
    ),
    (
        "Gluco Balance",
        "Supports healthy blood sugar levels",
        &["Berberine", "Cinnamon Bark", "Chromium"],
    ),
    (
        "Joint Flex",
        "Daily comfort and mobility for active joints",
        &["Glucosamine", "Turmeric", "Boswellia"],
    ),
    (
        "Brain Boost",
        "Focus & memory support",
        &["Bacopa", "Ginkgo Biloba", "L-Theanine"],
    ),
];

const VARIANTS: &[&str] = &["Original", "Max", "Plus", "Pro", "Lite"];

const REASONS: &[(&str, &str)] = &[
    ("Natural Ingredients", "No artificial fillers or binders"),
    ("Lab Tested", "Every batch verified by a third-party lab"),
    ("Money-Back Guarantee", "Try it risk free"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Landing Catalog Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: {DEFAULT_COUNT}, max: {MAX_COUNT})");
                println!("  -d, --db <PATH>    Database file path (default: $LANDING_DB_PATH or ./landing.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let count = count.min(MAX_COUNT);

    let mut config = DbConfig::from_env()?;
    if let Some(path) = db_path {
        config.database_path = path.into();
    }

    info!(path = %config.database_path.display(), count, "Seeding database");

    let db = Database::new(config).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    let catalog = db.catalog();
    let start = std::time::Instant::now();
    let mut generated = 0;

    for index in 0..count {
        let (product, ingredients, reasons) = sample(index);

        match catalog
            .create_product_with_content(&product, &ingredients, &reasons)
            .await
        {
            Ok(_) => generated += 1,
            Err(e @ DbError::IdentifierExhausted { .. }) => {
                warn!(error = %e, "Public id space is crowded, stopping early");
                break;
            }
            Err(e) => warn!(name = %product.name, error = %e, "Failed to insert product"),
        }
    }

    info!(generated, elapsed = ?start.elapsed(), "Seed complete");

    let stats = db.catalog().dashboard_stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    db.close().await;
    Ok(())
}

/// Builds the `index`-th sample product with its children.
fn sample(index: usize) -> (NewProduct, Vec<NewIngredient>, Vec<NewWhyChoose>) {
    let (name, description, ingredients) = LINES[index % LINES.len()];
    let variant = VARIANTS[(index / LINES.len()) % VARIANTS.len()];
    let batch = index / (LINES.len() * VARIANTS.len());

    let full_name = if batch == 0 {
        format!("{name} {variant}")
    } else {
        format!("{name} {variant} {}", batch + 1)
    };

    let product = NewProduct::new(
        full_name,
        description,
        format!("https://shop.example/checkout?sku={}", index + 1),
    )
    .image_path(format!("uploads/products/{}.webp", index + 1))
    .money_back_days([30, 60, 90, 180][index % 4]);

    let ingredients = ingredients
        .iter()
        .map(|title| NewIngredient::new(*title, format!("{title} in every serving of {name}")))
        .collect();

    let reasons = REASONS
        .iter()
        .take(1 + index % REASONS.len())
        .map(|(title, text)| NewWhyChoose::new(*title, *text))
        .collect();

    (product, ingredients, reasons)
}

/// Installs the tracing subscriber; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,landing=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
