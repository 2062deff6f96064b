use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{print_warnings, DataArgs};
use crate::error::Result;
use crate::filter;
use crate::fmt::money;
use crate::loader::load_dataset;
use crate::pager::Pager;

pub fn run(data: &DataArgs, query: &str, page: usize, page_size: usize) -> Result<()> {
    let (tx_path, pred_path) = data.resolve();
    let dataset = load_dataset(&tx_path, &pred_path);
    print_warnings(&dataset.warnings);

    let outcome = filter::filter(&dataset.transactions, query);
    let count = outcome.rows.len();

    let mut pager = Pager::new(page_size);
    pager.set_page(page, count);
    let slice = pager.slice(&outcome.rows);

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Amount", "Event Time", "Type", "User ID", "Category", "Brand", "Session",
    ]);
    for t in slice {
        let amount = if t.is_purchase() {
            money(t.amount).green().to_string()
        } else {
            money(t.amount)
        };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(amount),
            Cell::new(t.event_time.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(&t.event_type),
            Cell::new(&t.user_id),
            Cell::new(&t.category_code),
            Cell::new(&t.brand),
            Cell::new(&t.user_session),
        ]);
    }
    println!("{table}");

    println!(
        "Page {} of {} ({} row{})",
        pager.page(),
        pager.total_pages(count),
        count,
        if count == 1 { "" } else { "s" },
    );
    if let Some(user) = &outcome.selected_user {
        println!("{}", format!("User-ID lookup: {user}").bold());
    }
    Ok(())
}
