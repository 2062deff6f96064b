use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::fmt::{format_bytes, number};
use crate::loader::load_dataset;
use crate::settings::load_settings;

fn file_line(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => format!("{} ({})", path.display(), format_bytes(meta.len())),
        Err(_) => format!("{} (not found)", path.display()),
    }
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let tx_path = settings.transactions_path();
    let pred_path = settings.predictions_path();

    println!("Data dir:      {}", settings.data_dir);
    println!("Transactions:  {}", file_line(&tx_path));
    println!("Predictions:   {}", file_line(&pred_path));

    let dataset = load_dataset(&tx_path, &pred_path);
    if dataset.transactions.is_empty() && !dataset.warnings.is_empty() {
        println!();
        println!("No data loaded. Run `kiosk demo` to generate sample files.");
        return Ok(());
    }

    let mut users: Vec<&str> = dataset
        .transactions
        .iter()
        .map(|t| t.user_id.as_str())
        .collect();
    users.sort_unstable();
    users.dedup();

    let mut by_type: HashMap<&str, u64> = HashMap::new();
    for t in &dataset.transactions {
        *by_type.entry(t.event_type.as_str()).or_insert(0) += 1;
    }
    let mut by_type: Vec<(&str, u64)> = by_type.into_iter().collect();
    by_type.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    let types = by_type
        .iter()
        .map(|(name, count)| format!("{name}: {}", number(*count)))
        .collect::<Vec<_>>()
        .join(", ");

    let first = dataset.transactions.iter().map(|t| t.event_time).min();
    let last = dataset.transactions.iter().map(|t| t.event_time).max();

    println!();
    println!("Transactions:  {}", number(dataset.transactions.len() as u64));
    println!("Users:         {}", number(users.len() as u64));
    if let (Some(first), Some(last)) = (first, last) {
        println!(
            "Date range:    {} .. {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d"),
        );
    }
    if !types.is_empty() {
        println!("Event types:   {types}");
    }
    println!("Predictions:   {}", number(dataset.predictions.len() as u64));

    Ok(())
}
