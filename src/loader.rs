use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{KioskError, Result};
use crate::models::{PredictionMap, Transaction};

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// Loose decimal parse: strips commas, quotes and currency symbols, reads
/// parenthesized values as negative. Garbage parses as 0.0, so a malformed
/// amount keeps its row rather than dropping it.
pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -inner.trim().parse::<f64>().unwrap_or(0.0);
    }
    s.parse().unwrap_or(0.0)
}

/// Parse an event timestamp into UTC. The upstream export writes
/// "2020-04-24 11:50:39 UTC"; RFC 3339 and date-only forms are accepted too.
pub fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S UTC") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

// ---------------------------------------------------------------------------
// Transactions file
// ---------------------------------------------------------------------------

struct TxnColumns {
    event_time: usize,
    event_type: usize,
    amount: usize,
    user_id: usize,
    category_code: usize,
    brand: usize,
    user_session: usize,
}

impl TxnColumns {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self> {
        let find = |names: &[&str]| -> Option<usize> {
            headers
                .iter()
                .position(|h| names.contains(&h.trim()))
        };
        let missing = |name: &str| {
            KioskError::MissingColumn(name.to_string(), path.display().to_string())
        };
        Ok(Self {
            event_time: find(&["event_time"]).ok_or_else(|| missing("event_time"))?,
            event_type: find(&["event_type"]).ok_or_else(|| missing("event_type"))?,
            // The upstream dataset names this column "price"
            amount: find(&["amount", "price"]).ok_or_else(|| missing("amount"))?,
            user_id: find(&["user_id"]).ok_or_else(|| missing("user_id"))?,
            category_code: find(&["category_code"]).ok_or_else(|| missing("category_code"))?,
            brand: find(&["brand"]).ok_or_else(|| missing("brand"))?,
            user_session: find(&["user_session"]).ok_or_else(|| missing("user_session"))?,
        })
    }
}

/// Load the transactions file. Rows with an unparseable timestamp are
/// skipped; every other field is taken as-is.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let cols = TxnColumns::from_headers(rdr.headers()?, path)?;
    let min_cols = [
        cols.event_time,
        cols.event_type,
        cols.amount,
        cols.user_id,
        cols.category_code,
        cols.brand,
        cols.user_session,
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
        + 1;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        if record.len() < min_cols {
            continue;
        }
        let Some(event_time) = parse_event_time(&record[cols.event_time]) else {
            continue;
        };
        rows.push(Transaction {
            id: rows.len() as u64 + 1,
            event_time,
            event_type: record[cols.event_type].trim().to_string(),
            amount: parse_amount(&record[cols.amount]),
            user_id: record[cols.user_id].trim().to_string(),
            category_code: record[cols.category_code].trim().to_string(),
            brand: record[cols.brand].trim().to_string(),
            user_session: record[cols.user_session].trim().to_string(),
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Predictions file
// ---------------------------------------------------------------------------

/// Load the per-user predicted revenue file, keyed by its `User_id` and
/// `Prediction` columns. Rows whose prediction fails to parse are skipped.
pub fn load_predictions(path: &Path) -> Result<PredictionMap> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let headers = rdr.headers()?;
    let idx_user = headers
        .iter()
        .position(|h| h.trim() == "User_id")
        .ok_or_else(|| {
            KioskError::MissingColumn("User_id".to_string(), path.display().to_string())
        })?;
    let idx_pred = headers
        .iter()
        .position(|h| h.trim() == "Prediction")
        .ok_or_else(|| {
            KioskError::MissingColumn("Prediction".to_string(), path.display().to_string())
        })?;
    let min_cols = idx_user.max(idx_pred) + 1;

    let mut map = PredictionMap::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        if record.len() < min_cols {
            continue;
        }
        let user = record[idx_user].trim().to_string();
        if user.is_empty() {
            continue;
        }
        let Ok(prediction) = record[idx_pred].trim().parse::<f64>() else {
            continue;
        };
        map.insert(user, prediction);
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// The full in-memory dataset. The two loads are independent: a failure
/// leaves that piece empty and is reported as a warning, never an error.
pub struct Dataset {
    pub transactions: Vec<Transaction>,
    pub predictions: PredictionMap,
    pub warnings: Vec<String>,
}

pub fn load_dataset(tx_path: &Path, pred_path: &Path) -> Dataset {
    let mut warnings = Vec::new();

    let transactions = match load_transactions(tx_path) {
        Ok(rows) => rows,
        Err(e) => {
            warnings.push(format!("could not load {}: {e}", tx_path.display()));
            Vec::new()
        }
    };

    let predictions = match load_predictions(pred_path) {
        Ok(map) => map,
        Err(e) => {
            warnings.push(format!("could not load {}: {e}", pred_path.display()));
            PredictionMap::new()
        }
    };

    Dataset {
        transactions,
        predictions,
        warnings,
    }
}
