use crate::models::Transaction;

/// How a query string is interpreted. Classification happens once, before
/// the scan; the filter predicate itself carries no state.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
    /// Empty query: no filtering.
    Empty,
    /// Free text, held lowercased for case-insensitive substring matching.
    Text(String),
    /// Numeric-looking query: exact user-ID lookup with the raw string.
    UserId(String),
}

impl QueryKind {
    /// Classify a raw query. The numeric test is deliberately loose, same
    /// as the viewer this replaces: a trimmed-empty or float-parseable
    /// string takes the user-ID path, so "123" is a user ID, "123abc" is
    /// text, and " " is (uselessly but consistently) a user ID.
    pub fn classify(raw: &str) -> QueryKind {
        if raw.is_empty() {
            QueryKind::Empty
        } else if is_loose_number(raw) {
            QueryKind::UserId(raw.to_string())
        } else {
            QueryKind::Text(raw.to_lowercase())
        }
    }
}

fn is_loose_number(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.parse::<f64>().is_ok()
}

/// Result of running a query against the full set.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub rows: Vec<Transaction>,
    pub selected_user: Option<String>,
    pub user_mode: bool,
}

/// The fields searched by a free-text query.
fn search_fields(t: &Transaction) -> [&str; 4] {
    [&t.category_code, &t.brand, &t.user_session, &t.event_type]
}

/// Filter the transaction set by a query string.
///
/// Empty queries return the full set. Text queries match when ANY of
/// category_code, brand, user_session or event_type contains the query,
/// case-insensitively. Numeric-looking queries compare the untrimmed query
/// for exact equality against user_id and flag user mode. An unmatched
/// query is an empty result, never an error.
pub fn filter(transactions: &[Transaction], query: &str) -> FilterOutcome {
    match QueryKind::classify(query) {
        QueryKind::Empty => FilterOutcome {
            rows: transactions.to_vec(),
            selected_user: None,
            user_mode: false,
        },
        QueryKind::Text(needle) => FilterOutcome {
            rows: transactions
                .iter()
                .filter(|t| {
                    search_fields(t)
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect(),
            selected_user: None,
            user_mode: false,
        },
        QueryKind::UserId(user) => FilterOutcome {
            rows: transactions
                .iter()
                .filter(|t| t.user_id == user)
                .cloned()
                .collect(),
            selected_user: Some(user),
            user_mode: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn txn(id: u64, event_type: &str, user_id: &str, category: &str, brand: &str, session: &str) -> Transaction {
        Transaction {
            id,
            event_time: Utc.with_ymd_and_hms(2021, 1, 5, 12, 0, 0).unwrap(),
            event_type: event_type.to_string(),
            amount: 10.0,
            user_id: user_id.to_string(),
            category_code: category.to_string(),
            brand: brand.to_string(),
            user_session: session.to_string(),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn(1, "view", "7", "electronics.video.tv", "LG", "abc-123"),
            txn(2, "purchase", "7", "computers.notebook", "hp", "abc-123"),
            txn(3, "purchase", "44", "appliances.kitchen", "bosch", "def-456"),
        ]
    }

    #[test]
    fn test_classify() {
        assert_eq!(QueryKind::classify(""), QueryKind::Empty);
        assert_eq!(QueryKind::classify("123"), QueryKind::UserId("123".into()));
        assert_eq!(QueryKind::classify("123abc"), QueryKind::Text("123abc".into()));
        assert_eq!(QueryKind::classify("LG"), QueryKind::Text("lg".into()));
        // numeric-parseable-but-odd strings follow the loose test
        assert_eq!(QueryKind::classify(" "), QueryKind::UserId(" ".into()));
        assert_eq!(QueryKind::classify(" 7 "), QueryKind::UserId(" 7 ".into()));
        assert_eq!(QueryKind::classify("1.5"), QueryKind::UserId("1.5".into()));
    }

    #[test]
    fn test_empty_query_returns_all() {
        let all = sample();
        let out = filter(&all, "");
        assert_eq!(out.rows.len(), all.len());
        assert!(!out.user_mode);
        assert!(out.selected_user.is_none());
    }

    #[test]
    fn test_text_query_matches_any_of_four_fields() {
        let all = sample();
        // brand, case-insensitive
        let out = filter(&all, "lg");
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].id, 1);
        // category substring
        let out = filter(&all, "kitchen");
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].id, 3);
        // event type
        let out = filter(&all, "PURCHASE");
        assert_eq!(out.rows.len(), 2);
        // session
        let out = filter(&all, "def-");
        assert_eq!(out.rows.len(), 1);
        assert!(!out.user_mode);
    }

    #[test]
    fn test_text_query_never_matches_user_id() {
        // "44" is numeric so it can't hit the text path, but "4e" is text
        // and must not match user_id "44" by substring
        let all = sample();
        let out = filter(&all, "4e");
        assert!(out.rows.is_empty());
    }

    #[test]
    fn test_numeric_query_is_exact_user_lookup() {
        let all = sample();
        let out = filter(&all, "7");
        assert_eq!(out.rows.len(), 2);
        assert!(out.rows.iter().all(|t| t.user_id == "7"));
        assert!(out.user_mode);
        assert_eq!(out.selected_user.as_deref(), Some("7"));
        // exact match, not substring: "4" must not match "44"
        let out = filter(&all, "4");
        assert!(out.rows.is_empty());
        assert!(out.user_mode);
    }

    #[test]
    fn test_unmatched_numeric_query_is_empty_not_error() {
        let all = sample();
        let out = filter(&all, "44");
        assert_eq!(out.rows.len(), 1);
        let out = filter(&all, "9999");
        assert!(out.rows.is_empty());
        assert!(out.user_mode);
        assert_eq!(out.selected_user.as_deref(), Some("9999"));
    }

    #[test]
    fn test_untrimmed_user_query_matches_nothing() {
        let all = sample();
        let out = filter(&all, " 7 ");
        assert!(out.rows.is_empty());
        assert!(out.user_mode);
    }

    #[test]
    fn test_filter_is_pure() {
        let all = sample();
        let a = filter(&all, "purchase");
        let b = filter(&all, "purchase");
        assert_eq!(a.rows.len(), b.rows.len());
        assert!(a
            .rows
            .iter()
            .zip(b.rows.iter())
            .all(|(x, y)| x.id == y.id));
        assert_eq!(all.len(), 3);
    }
}
