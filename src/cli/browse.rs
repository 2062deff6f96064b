use super::{print_warnings, DataArgs};
use crate::browser::DatasetBrowser;
use crate::error::{KioskError, Result};
use crate::loader::load_dataset;
use crate::pager::PAGE_SIZES;

pub fn run(data: &DataArgs, query: Option<String>, page_size: usize) -> Result<()> {
    if !PAGE_SIZES.contains(&page_size) {
        return Err(KioskError::Other(format!(
            "page size must be one of 5, 10, 20, 100 (got {page_size})"
        )));
    }
    let (tx_path, pred_path) = data.resolve();
    let dataset = load_dataset(&tx_path, &pred_path);
    print_warnings(&dataset.warnings);

    let mut browser = DatasetBrowser::new(
        dataset.transactions,
        dataset.predictions,
        query.unwrap_or_default(),
        page_size,
    );
    if !dataset.warnings.is_empty() {
        browser.set_status(dataset.warnings.join("; "));
    }
    browser.run()
}
