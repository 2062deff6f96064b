mod browser;
mod cli;
mod error;
mod filter;
mod fmt;
mod loader;
mod models;
mod pager;
mod revenue;
mod settings;
mod tui;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{Cli, Commands, ReportCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Browse {
            data,
            query,
            page_size,
        } => cli::browse::run(&data, query, page_size),
        Commands::Search {
            query,
            page,
            page_size,
            data,
        } => cli::search::run(&data, query.as_deref().unwrap_or(""), page, page_size),
        Commands::Report { command } => match command {
            ReportCommands::Revenue { query, data } => {
                cli::report::revenue(&data, query.as_deref())
            }
        },
        Commands::Status => cli::status::run(),
        Commands::Demo { dir } => cli::demo::run(dir),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "kiosk", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
