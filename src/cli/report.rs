use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{print_warnings, DataArgs};
use crate::error::Result;
use crate::filter;
use crate::fmt::money;
use crate::loader::load_dataset;
use crate::revenue::monthly_revenue;

pub fn revenue(data: &DataArgs, query: Option<&str>) -> Result<()> {
    let (tx_path, pred_path) = data.resolve();
    let dataset = load_dataset(&tx_path, &pred_path);
    print_warnings(&dataset.warnings);

    let outcome = filter::filter(&dataset.transactions, query.unwrap_or(""));
    let points = monthly_revenue(
        &outcome.rows,
        &dataset.predictions,
        outcome.selected_user.as_deref(),
    );

    let mut table = Table::new();
    if outcome.user_mode {
        table.set_header(vec!["Month", "Actual", "Predicted"]);
    } else {
        table.set_header(vec!["Month", "Actual"]);
    }

    let mut total = 0.0;
    for point in &points {
        total += point.actual;
        let mut row = vec![Cell::new(&point.month), Cell::new(money(point.actual))];
        if outcome.user_mode {
            row.push(Cell::new(
                point.predicted.map(money).unwrap_or_default(),
            ));
        }
        table.add_row(row);
    }
    let mut total_row = vec![Cell::new("Total".bold()), Cell::new(money(total))];
    if outcome.user_mode {
        total_row.push(Cell::new(""));
    }
    table.add_row(total_row);

    println!("Monthly Revenue\n{table}");

    if let Some(user) = &outcome.selected_user {
        if !dataset.predictions.contains_key(user) {
            println!("{}", format!("(no prediction for user {user})").dimmed());
        }
    }
    Ok(())
}
