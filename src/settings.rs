use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{KioskError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_transactions_file")]
    pub transactions_file: String,
    #[serde(default = "default_predictions_file")]
    pub predictions_file: String,
}

fn default_transactions_file() -> String {
    "transactions.csv".to_string()
}

fn default_predictions_file() -> String {
    "predictions.csv".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            transactions_file: default_transactions_file(),
            predictions_file: default_predictions_file(),
        }
    }
}

impl Settings {
    pub fn transactions_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.transactions_file)
    }

    pub fn predictions_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.predictions_file)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("kiosk")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("kiosk")
}

/// Load settings, falling back to defaults when the file is missing or
/// unreadable. Reading settings never fails.
pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| KioskError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            transactions_file: "tx.csv".to_string(),
            predictions_file: "pred.csv".to_string(),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.transactions_path(), PathBuf::from("/tmp/test/tx.csv"));
        assert_eq!(loaded.predictions_path(), PathBuf::from("/tmp/test/pred.csv"));
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(!s.data_dir.is_empty());
        assert_eq!(s.transactions_file, "transactions.csv");
        assert_eq!(s.predictions_file, "predictions.csv");
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.transactions_file, "transactions.csv");
        assert_eq!(s.predictions_file, "predictions.csv");
    }
}
