use std::collections::BTreeMap;

use chrono::Utc;

use crate::models::{MonthlyRevenuePoint, PredictionMap, Transaction};

/// Build the monthly revenue series for an (already filtered) set of
/// transactions.
///
/// Every record contributes its month to the series; `actual` sums amounts
/// over purchase events only, so a month of views shows up with 0 revenue.
/// The series is ordered ascending by month key.
///
/// When a user is selected and a prediction exists for them, the predicted
/// value is attached to the most recent month of the series; with no months
/// to attach to, a zero-revenue point for the current UTC month is appended
/// so the prediction still has somewhere to land. A user without a
/// prediction simply gets none.
pub fn monthly_revenue(
    rows: &[Transaction],
    predictions: &PredictionMap,
    selected_user: Option<&str>,
) -> Vec<MonthlyRevenuePoint> {
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for t in rows {
        let actual = by_month.entry(t.month_key()).or_insert(0.0);
        if t.is_purchase() {
            *actual += t.amount;
        }
    }

    let mut points: Vec<MonthlyRevenuePoint> = by_month
        .into_iter()
        .map(|(month, actual)| MonthlyRevenuePoint {
            month,
            actual,
            predicted: None,
        })
        .collect();

    if let Some(user) = selected_user {
        if let Some(&prediction) = predictions.get(user) {
            match points.last_mut() {
                Some(last) => last.predicted = Some(prediction),
                None => points.push(MonthlyRevenuePoint {
                    month: Utc::now().format("%Y-%m").to_string(),
                    actual: 0.0,
                    predicted: Some(prediction),
                }),
            }
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_event_time;

    fn txn(event_time: &str, event_type: &str, amount: f64, user_id: &str) -> Transaction {
        Transaction {
            id: 0,
            event_time: parse_event_time(event_time).unwrap(),
            event_type: event_type.to_string(),
            amount,
            user_id: user_id.to_string(),
            category_code: String::new(),
            brand: String::new(),
            user_session: String::new(),
        }
    }

    #[test]
    fn test_views_contribute_nothing() {
        // one purchase and one view in the same month
        let rows = vec![
            txn("2021-01-05", "purchase", 10.0, "7"),
            txn("2021-01-06", "view", 20.0, "7"),
        ];
        let points = monthly_revenue(&rows, &PredictionMap::new(), None);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].month, "2021-01");
        assert_eq!(points[0].actual, 10.0);
        assert_eq!(points[0].predicted, None);
    }

    #[test]
    fn test_purchase_amounts_sum_exactly() {
        let rows = vec![
            txn("2021-03-01", "purchase", 1.25, "7"),
            txn("2021-03-15", "purchase", 2.50, "7"),
            txn("2021-03-31", "purchase", 4.00, "7"),
        ];
        let points = monthly_revenue(&rows, &PredictionMap::new(), None);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].actual, 7.75);
    }

    #[test]
    fn test_months_are_sorted() {
        let rows = vec![
            txn("2021-03-01", "purchase", 3.0, "7"),
            txn("2021-01-01", "purchase", 1.0, "7"),
            txn("2021-02-01", "view", 0.0, "7"),
            txn("2020-12-01", "purchase", 12.0, "7"),
        ];
        let points = monthly_revenue(&rows, &PredictionMap::new(), None);
        let months: Vec<&str> = points.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2020-12", "2021-01", "2021-02", "2021-03"]);
        // the view-only month is present with zero revenue
        assert_eq!(points[2].actual, 0.0);
    }

    #[test]
    fn test_prediction_lands_on_latest_month() {
        let rows = vec![
            txn("2021-01-05", "purchase", 10.0, "7"),
            txn("2021-02-05", "purchase", 20.0, "7"),
        ];
        let mut predictions = PredictionMap::new();
        predictions.insert("7".to_string(), 99.5);
        let points = monthly_revenue(&rows, &predictions, Some("7"));
        assert_eq!(points[0].predicted, None);
        assert_eq!(points[1].month, "2021-02");
        assert_eq!(points[1].predicted, Some(99.5));
    }

    #[test]
    fn test_prediction_with_empty_series_appends_current_month() {
        let mut predictions = PredictionMap::new();
        predictions.insert("44".to_string(), 42.0);
        let points = monthly_revenue(&[], &predictions, Some("44"));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].actual, 0.0);
        assert_eq!(points[0].predicted, Some(42.0));
        assert_eq!(points[0].month.len(), 7); // YYYY-MM
    }

    #[test]
    fn test_missing_prediction_is_silent() {
        let rows = vec![txn("2021-01-05", "purchase", 10.0, "44")];
        let points = monthly_revenue(&rows, &PredictionMap::new(), Some("44"));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].predicted, None);
    }

    #[test]
    fn test_no_selected_user_no_prediction() {
        let rows = vec![txn("2021-01-05", "purchase", 10.0, "7")];
        let mut predictions = PredictionMap::new();
        predictions.insert("7".to_string(), 50.0);
        let points = monthly_revenue(&rows, &predictions, None);
        assert!(points.iter().all(|p| p.predicted.is_none()));
    }
}
