use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// One recorded customer event (view/purchase). Immutable once loaded;
/// `id` is the 1-based ordinal assigned by the loader.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: u64,
    pub event_time: DateTime<Utc>,
    pub event_type: String,
    pub amount: f64,
    pub user_id: String,
    pub category_code: String,
    pub brand: String,
    pub user_session: String,
}

impl Transaction {
    /// UTC year-month grouping key, e.g. "2021-01".
    pub fn month_key(&self) -> String {
        self.event_time.format("%Y-%m").to_string()
    }

    pub fn is_purchase(&self) -> bool {
        self.event_type == "purchase"
    }
}

/// Pre-computed expected revenue per user, loaded from the predictions file.
pub type PredictionMap = HashMap<String, f64>;

/// One point of the revenue timeline. `predicted` is set only on the point
/// carrying the selected user's predicted revenue.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRevenuePoint {
    pub month: String,
    pub actual: f64,
    pub predicted: Option<f64>,
}
