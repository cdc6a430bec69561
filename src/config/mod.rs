use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub cleaning: CleaningConfig,
}

/// Input schema: how to find the interesting columns in the delimited source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Field delimiter; the source exports use `;`.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    #[serde(default = "default_price_column")]
    pub price_column: String,

    /// Candidate names for the discount column, tried in order. The source
    /// exports disagree between `desconto` and `descontos`.
    #[serde(default = "default_discount_columns")]
    pub discount_columns: Vec<String>,
}

/// Cleaning policies
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CleaningConfig {
    #[serde(default)]
    pub on_unparsable_price: UnparsablePricePolicy,
}

/// What to do with a row whose price cannot be normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnparsablePricePolicy {
    /// Skip the row, warn, and count it in the load report.
    #[default]
    Drop,
    /// Abort the whole load.
    Fail,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_delimiter() -> String {
    ";".to_string()
}
fn default_price_column() -> String {
    "preco2".to_string()
}
fn default_discount_columns() -> Vec<String> {
    vec!["desconto".to_string(), "descontos".to_string()]
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("SHEIN").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl DataConfig {
    /// The configured delimiter as the single byte the reader needs.
    pub fn delimiter_byte(&self) -> Result<u8, LoadError> {
        match self.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => Err(LoadError::InvalidDelimiter {
                got: self.delimiter.clone(),
            }),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            cleaning: CleaningConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            price_column: default_price_column(),
            discount_columns: default_discount_columns(),
        }
    }
}
