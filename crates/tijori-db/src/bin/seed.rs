//! # Seed Data Generator
//!
//! Populates a database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./tijori_dev.db
//! cargo run -p tijori-db --bin seed
//!
//! # Specify database path
//! cargo run -p tijori-db --bin seed -- --db ./data/tijori.db
//! ```
//!
//! ## Generated Data
//! - Customers across a few cities
//! - Suppliers with GSTINs
//! - Items per supplier: `{BRAND}-{INDEX}` SKUs, cost 60-80% of price,
//!   GST 5/12/18%, some stock below the reorder level
//! - One sales order for the first customer, left in draft

use chrono::Local;
use std::env;
use tijori_core::form::DocumentForm;
use tijori_core::{DocumentKind, NewCustomer, NewItem, NewSupplier};
use tijori_db::{Database, DbConfig};

/// (name, city, mobile)
const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Asha Traders", "Pune", "98220 11001"),
    ("Bharat Textiles", "Surat", "98250 22002"),
    ("Chetan General Stores", "Pune", "98220 33003"),
    ("Deepa Fabrics", "Mumbai", "98200 44004"),
    ("Eshan Retail", "Nashik", "98230 55005"),
    ("Farah Boutique", "Mumbai", "98200 66006"),
];

/// (name, brand code, GSTIN, items)
const SUPPLIERS: &[(&str, &str, &str, &[&str])] = &[
    (
        "Mehta Mills",
        "MM",
        "27AAPFM0939F1ZV",
        &["Cotton T-Shirt", "Polo Shirt", "Denim Jeans", "Chino Trousers"],
    ),
    (
        "Sharma Hosiery",
        "SH",
        "24AAKCS1234H1Z2",
        &["Socks (3 Pair)", "Vest", "Boxer Shorts", "Thermal Top"],
    ),
    (
        "Kumar Accessories",
        "KA",
        "29AAGCK5678K1Z9",
        &["Leather Belt", "Cotton Cap", "Wallet", "Handkerchief (Pack)"],
    ),
];

/// GST rates in percent
const GST_RATES: &[f64] = &[5.0, 12.0, 18.0];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tijori_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tijori Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./tijori_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tijori Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.customers().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} customers", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating customers...");
    let mut customer_ids = Vec::new();
    for (name, city, mobile) in CUSTOMERS {
        let customer = db
            .customers()
            .create(&NewCustomer {
                name: name.to_string(),
                city: Some(city.to_string()),
                mobile: Some(mobile.to_string()),
                state: Some("Maharashtra".to_string()),
                country: Some("India".to_string()),
                ..Default::default()
            })
            .await?;
        customer_ids.push(customer.id);
    }
    println!("  ✓ {} customers", customer_ids.len());

    println!("Creating suppliers and items...");
    let mut item_ids = Vec::new();
    let mut seed = 0usize;
    for (name, brand, gstin, items) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                name: name.to_string(),
                gstin: Some(gstin.to_string()),
                ..Default::default()
            })
            .await?;

        for (index, item_name) in items.iter().enumerate() {
            let item = generate_item(brand, item_name, index, seed, supplier.id);
            match db.items().create(&item).await {
                Ok(created) => item_ids.push(created.id),
                Err(e) => eprintln!("Failed to insert {}: {}", item_name, e),
            }
            seed += 1;
        }
    }
    println!("  ✓ {} suppliers, {} items", SUPPLIERS.len(), item_ids.len());

    if let (Some(customer), [first, second, ..]) = (customer_ids.first(), item_ids.as_slice()) {
        println!("Creating a sales order...");
        let mut form = DocumentForm {
            counterparty_id: Some(*customer),
            notes: Some("Demo order".to_string()),
            ..Default::default()
        };
        form.push_line(*first, 3.0, 450.0, 10.0, 0.0);
        form.push_line(*second, 2.0, 799.0, 0.0, 0.0);

        let draft = form.into_draft(DocumentKind::SalesOrder, Local::now().date_naive())?;
        let header = db.documents().create(&draft).await?;
        println!("  ✓ {} for ₹{:.2}", header.number, header.grand_total);
    }

    let summary = db.reports().dashboard().await?;
    println!();
    println!("✓ Seed complete!");
    println!("  Low-stock items: {}", summary.low_stock.len());
    println!("  Stock value: ₹{:.2}", summary.stock_value);

    Ok(())
}

/// Builds one item with deterministic, realistic-looking figures.
fn generate_item(brand: &str, name: &str, index: usize, seed: usize, supplier_id: i64) -> NewItem {
    // ₹199 - ₹998 in whole rupees
    let selling_price = (199 + (seed * 137) % 800) as f64;
    // 60-80% of price
    let cost_pct = 60 + (seed * 7) % 21;
    let cost_price = (selling_price * cost_pct as f64 / 100.0).round();

    let reorder_level = 10.0;
    // Every third item starts below its reorder level
    let stock_qty = if seed % 3 == 0 { 4.0 } else { 25.0 + (seed % 5) as f64 * 10.0 };

    NewItem {
        sku: Some(format!("{}-{:03}", brand, index + 1)),
        name: name.to_string(),
        uom: Some("Nos".to_string()),
        cost_price,
        selling_price,
        stock_qty,
        reorder_level,
        hsn_code: Some("6109".to_string()),
        gst_rate: GST_RATES[seed % GST_RATES.len()],
        supplier_id: Some(supplier_id),
        brand: Some(brand.to_string()),
        ..Default::default()
    }
}
