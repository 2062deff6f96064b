use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{save_settings, Settings};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = Settings::default();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }

    std::fs::create_dir_all(PathBuf::from(&settings.data_dir))?;
    save_settings(&settings)?;

    println!("kiosk is set up.");
    println!("  Data dir:     {}", settings.data_dir);
    println!("  Transactions: {}", settings.transactions_path().display());
    println!("  Predictions:  {}", settings.predictions_path().display());
    println!();
    println!("Drop the two CSV files there, or run `kiosk demo` for sample data.");
    Ok(())
}
