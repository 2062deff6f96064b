pub mod browse;
pub mod demo;
pub mod init;
pub mod report;
pub mod search;
pub mod status;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use crate::settings::load_settings;

/// Data file flags shared by every reading command; explicit paths override
/// the configured data directory.
#[derive(Args, Debug)]
pub struct DataArgs {
    /// Path to the transactions CSV (default: <data_dir>/transactions.csv)
    #[arg(long)]
    pub file: Option<String>,
    /// Path to the predictions CSV (default: <data_dir>/predictions.csv)
    #[arg(long)]
    pub predictions: Option<String>,
}

impl DataArgs {
    pub fn resolve(&self) -> (PathBuf, PathBuf) {
        let settings = load_settings();
        let tx = self
            .file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| settings.transactions_path());
        let pred = self
            .predictions
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| settings.predictions_path());
        (tx, pred)
    }
}

/// Report load warnings on stderr. A failed load is never fatal: the
/// affected piece of the dataset simply stays empty.
pub fn print_warnings(warnings: &[String]) {
    for w in warnings {
        eprintln!("{} {w}", "Warning:".yellow().bold());
    }
}

#[derive(Parser)]
#[command(name = "kiosk", about = "Terminal viewer for e-commerce transaction logs.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up kiosk: choose the directory holding the two data files.
    Init {
        /// Path for kiosk data (default: ~/Documents/kiosk)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Interactively browse transactions.
    Browse {
        #[command(flatten)]
        data: DataArgs,
        /// Initial search query
        #[arg(long)]
        query: Option<String>,
        /// Rows per page (5, 10, 20 or 100)
        #[arg(long = "page-size", default_value_t = 5)]
        page_size: usize,
    },
    /// Print one page of the filtered transaction table.
    Search {
        /// Free text matches category/brand/session/event type; a number is
        /// an exact user-ID lookup
        query: Option<String>,
        /// Page to print
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Rows per page
        #[arg(long = "page-size", default_value_t = 5)]
        page_size: usize,
        #[command(flatten)]
        data: DataArgs,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show data file locations and summary statistics.
    Status,
    /// Write a sample transactions/predictions pair to explore kiosk.
    Demo {
        /// Directory to write into (default: the configured data dir)
        #[arg(long)]
        dir: Option<String>,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Monthly revenue, optionally filtered; a user-ID query adds the
    /// predicted revenue column.
    Revenue {
        /// Filter query, same semantics as `kiosk search`
        #[arg(long)]
        query: Option<String>,
        #[command(flatten)]
        data: DataArgs,
    },
}
