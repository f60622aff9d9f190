use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::LedgerError;

pub const STORAGE_URI_ENV: &str = "POLICY_LEDGER_STORAGE_URI";
pub const SHEET_NAME_ENV: &str = "POLICY_LEDGER_SHEET_NAME";

/// What the writer does with record keys the established header lacks.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    #[default]
    Drop,
    Error,
    Extend,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ColorConfig {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LinkFieldConfig {
    pub aliases: Vec<String>,
    pub sentinel: String,
    pub label: String,
    pub color: ColorConfig,
    pub underline: bool,
}

impl Default for LinkFieldConfig {
    fn default() -> Self {
        Self {
            aliases: vec![
                "PDF Link".to_string(),
                "pdf_link".to_string(),
                "PDF_Link".to_string(),
            ],
            sentinel: "No PDF attached".to_string(),
            label: "View PDF".to_string(),
            color: ColorConfig {
                red: 0.066,
                green: 0.333,
                blue: 0.8,
            },
            underline: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DocumentConfig {
    pub folder: String,
    pub public_base_url: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            folder: "Policy Data".to_string(),
            public_base_url: "http://localhost:8000/documents".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SheetsApiConfig {
    pub spreadsheet_id: String,
    pub access_token: Option<String>,
    pub access_token_env: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for SheetsApiConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            access_token: None,
            access_token_env: "GOOGLE_SHEETS_ACCESS_TOKEN".to_string(),
            endpoint: "https://sheets.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SheetsApiConfig {
    /// Inline token first, then the configured environment variable.
    pub fn resolve_token(&self) -> Result<String, LedgerError> {
        if let Some(token) = self.access_token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }
        std::env::var(&self.access_token_env).map_err(|_| {
            LedgerError::Config(format!(
                "no access token configured and {} is not set",
                self.access_token_env
            ))
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    pub storage_uri: String,
    pub sheet_name: String,
    pub sheet_id: i64,
    pub link_fields: LinkFieldConfig,
    pub unknown_fields: UnknownFieldPolicy,
    pub date_columns: Vec<String>,
    pub documents: DocumentConfig,
    pub sheets_api: Option<SheetsApiConfig>,
    pub log_filter: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            storage_uri: "memory://".to_string(),
            sheet_name: "Sheet1".to_string(),
            sheet_id: 0,
            link_fields: LinkFieldConfig::default(),
            unknown_fields: UnknownFieldPolicy::default(),
            date_columns: default_date_columns(),
            documents: DocumentConfig::default(),
            sheets_api: None,
            log_filter: None,
        }
    }
}

pub fn default_date_columns() -> Vec<String> {
    [
        "date",
        "policy date",
        "start date",
        "policy start date",
        "date of issue",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl LedgerConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: LedgerConfig =
            serde_yaml::from_str(yaml).context("Invalid ledger configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: LedgerConfig =
            serde_yaml::from_str(&text).context("Invalid ledger configuration")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from a JSON value, then applies environment overrides.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut config: LedgerConfig =
            serde_json::from_value(value).context("Invalid ledger configuration")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(uri) = std::env::var(STORAGE_URI_ENV) {
            if !uri.is_empty() {
                self.storage_uri = uri;
            }
        }
        if let Ok(name) = std::env::var(SHEET_NAME_ENV) {
            if !name.is_empty() {
                self.sheet_name = name;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sheet_name.trim().is_empty() {
            anyhow::bail!("sheet_name must not be empty");
        }
        if self.storage_uri.trim().is_empty() {
            anyhow::bail!("storage_uri must not be empty");
        }
        if let Some(api) = &self.sheets_api {
            if api.spreadsheet_id.trim().is_empty() {
                anyhow::bail!("sheets_api.spreadsheet_id must not be empty");
            }
            if api.timeout_secs == 0 {
                anyhow::bail!("sheets_api.timeout_secs must be positive");
            }
        }
        Ok(())
    }
}
