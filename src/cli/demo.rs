use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::models::Transaction;
use crate::settings::load_settings;

const YEAR: i32 = 2021;
const MONTHS: std::ops::RangeInclusive<u32> = 1..=6;

struct DemoProduct {
    category_code: &'static str,
    brand: &'static str,
    price: f64,
}

const CATALOG: &[DemoProduct] = &[
    DemoProduct { category_code: "electronics.smartphone", brand: "samsung", price: 462.55 },
    DemoProduct { category_code: "electronics.smartphone", brand: "apple", price: 989.00 },
    DemoProduct { category_code: "electronics.video.tv", brand: "lg", price: 514.85 },
    DemoProduct { category_code: "electronics.audio.headphone", brand: "sony", price: 128.90 },
    DemoProduct { category_code: "computers.notebook", brand: "hp", price: 411.83 },
    DemoProduct { category_code: "computers.notebook", brand: "lenovo", price: 379.99 },
    DemoProduct { category_code: "computers.peripherals.mouse", brand: "logitech", price: 24.49 },
    DemoProduct { category_code: "appliances.kitchen.refrigerator", brand: "bosch", price: 649.00 },
    DemoProduct { category_code: "appliances.kitchen.blender", brand: "philips", price: 54.75 },
    DemoProduct { category_code: "appliances.environment.vacuum", brand: "dyson", price: 299.95 },
    DemoProduct { category_code: "furniture.living_room.sofa", brand: "", price: 820.00 },
    DemoProduct { category_code: "apparel.shoes", brand: "nike", price: 89.90 },
];

const USERS: &[&str] = &[
    "512386086",
    "253299396",
    "520088904",
    "530496790",
    "561587266",
    "579970209",
    "595411904",
    "612407936",
];

/// Weighted event types: mostly views, some carts, some purchases.
fn pick_event_type(rng: &mut impl Rng) -> &'static str {
    match rng.gen_range(0..10) {
        0..=5 => "view",
        6..=7 => "cart",
        _ => "purchase",
    }
}

fn generate_transactions(rng: &mut impl Rng) -> Vec<Transaction> {
    let mut rows = Vec::new();
    for user in USERS {
        for month in MONTHS {
            for _ in 0..rng.gen_range(1..=3) {
                let session = format!("{:08x}-{:04x}", rng.gen::<u32>(), rng.gen::<u16>());
                let day = rng.gen_range(1..=28);
                for _ in 0..rng.gen_range(1..=5) {
                    let product = CATALOG.choose(rng).unwrap();
                    let event_time = Utc
                        .with_ymd_and_hms(
                            YEAR,
                            month,
                            day,
                            rng.gen_range(0..24),
                            rng.gen_range(0..60),
                            rng.gen_range(0..60),
                        )
                        .unwrap();
                    rows.push(Transaction {
                        id: 0,
                        event_time,
                        event_type: pick_event_type(rng).to_string(),
                        amount: product.price,
                        user_id: user.to_string(),
                        category_code: product.category_code.to_string(),
                        brand: product.brand.to_string(),
                        user_session: session.clone(),
                    });
                }
            }
        }
    }
    rows.sort_by_key(|t| t.event_time);
    rows
}

fn write_transactions(path: &Path, rows: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    // "price" matches the upstream export this viewer was built for
    wtr.write_record([
        "event_time",
        "event_type",
        "category_code",
        "brand",
        "price",
        "user_id",
        "user_session",
    ])?;
    for t in rows {
        wtr.write_record([
            t.event_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            t.event_type.clone(),
            t.category_code.clone(),
            t.brand.clone(),
            format!("{:.2}", t.amount),
            t.user_id.clone(),
            t.user_session.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_predictions(path: &Path, rows: &[Transaction], rng: &mut impl Rng) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["User_id", "Prediction"])?;
    let month_span = MONTHS.count() as f64;
    let mut written = 0;
    for user in USERS {
        let total: f64 = rows
            .iter()
            .filter(|t| t.user_id == *user && t.is_purchase())
            .map(|t| t.amount)
            .sum();
        let jitter = rng.gen_range(0.8..1.2);
        let prediction = total / month_span * jitter;
        wtr.write_record([user.to_string(), format!("{prediction:.2}")])?;
        written += 1;
    }
    wtr.flush()?;
    Ok(written)
}

pub fn run(dir: Option<String>) -> Result<()> {
    let settings = load_settings();
    let dir = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&settings.data_dir));
    std::fs::create_dir_all(&dir)?;

    let tx_path = dir.join(&settings.transactions_file);
    let pred_path = dir.join(&settings.predictions_file);

    // Idempotency guard
    if tx_path.exists() {
        println!(
            "Demo data already present at {} (delete it to regenerate).",
            tx_path.display()
        );
        return Ok(());
    }

    let mut rng = rand::thread_rng();
    let rows = generate_transactions(&mut rng);
    write_transactions(&tx_path, &rows)?;
    let predicted = write_predictions(&pred_path, &rows, &mut rng)?;

    println!("Demo data written!");
    println!("  Transactions: {} ({} rows)", tx_path.display(), rows.len());
    println!("  Predictions:  {} ({} users)", pred_path.display(), predicted);
    println!();
    println!("Try these next:");
    println!("  kiosk browse");
    println!("  kiosk search electronics");
    println!("  kiosk search {}", USERS[0]);
    println!("  kiosk report revenue --query {}", USERS[0]);
    println!("  kiosk status");

    Ok(())
}
