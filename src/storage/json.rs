//! JSON file store.

use super::PortfolioStore;
use crate::error::{Error, Result};
use crate::pricing;
use crate::state::{Portfolio, ROW_COUNT, Row};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Current file format version.
pub const CURRENT_VERSION: u16 = 1;

/// On-disk layout.
#[derive(Debug, Serialize, Deserialize)]
struct PortfolioFile {
    version: u16,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    deposited: String,
    #[serde(default)]
    rows: Vec<RowRecord>,
}

/// One non-blank row, amounts kept as entered text.
#[derive(Debug, Serialize, Deserialize)]
struct RowRecord {
    index: usize,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    invested: String,
    #[serde(default)]
    holdings: String,
    #[serde(default)]
    wallet: String,
}

/// Stores the portfolio as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PortfolioStore for JsonFileStore {
    fn load(&self) -> Result<Portfolio> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No saved portfolio");
            return Ok(Portfolio::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let file: PortfolioFile = serde_json::from_str(&content)?;
        if file.version > CURRENT_VERSION {
            return Err(Error::storage(format!(
                "{} has format version {}, newest supported is {CURRENT_VERSION}",
                self.path.display(),
                file.version
            )));
        }

        Ok(from_file(file))
    }

    fn save(&self, portfolio: &Portfolio) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&to_file(portfolio))?;
        let temp = self.temp_path();
        fs::write(&temp, content)?;
        fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), "Portfolio saved");
        Ok(())
    }
}

fn to_file(portfolio: &Portfolio) -> PortfolioFile {
    let rows = portfolio
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.is_blank())
        .map(|(index, row)| RowRecord {
            index,
            symbol: row.symbol().to_string(),
            invested: amount_text(row.invested()),
            holdings: amount_text(row.holdings()),
            wallet: row.wallet().to_string(),
        })
        .collect();

    PortfolioFile {
        version: CURRENT_VERSION,
        saved_at: Some(Utc::now()),
        deposited: amount_text(portfolio.deposited()),
        rows,
    }
}

fn from_file(file: PortfolioFile) -> Portfolio {
    let mut portfolio = Portfolio::default();

    let deposited = load_amount("deposited", None, &file.deposited);
    if let Err(e) = portfolio.set_deposited(deposited) {
        warn!(error = %e, "Ignoring saved deposited amount");
    }

    for record in file.rows {
        let Ok(slot) = portfolio.row_mut(record.index) else {
            warn!(index = record.index, "Ignoring saved row outside 0..{ROW_COUNT}");
            continue;
        };

        let invested = load_amount("invested", Some(record.index), &record.invested);
        let holdings = load_amount("holdings", Some(record.index), &record.holdings);
        match Row::new(&record.symbol, invested, holdings) {
            Ok(mut row) => {
                row.set_wallet(&record.wallet);
                *slot = row;
            }
            Err(e) => warn!(index = record.index, error = %e, "Ignoring saved row"),
        }
    }

    portfolio
}

fn amount_text(value: Decimal) -> String {
    value.normalize().to_string()
}

fn load_amount(field: &str, row: Option<usize>, text: &str) -> Decimal {
    pricing::parse_amount(text).unwrap_or_else(|e| {
        warn!(field, ?row, value = text, error = %e, "Unreadable saved amount, using 0");
        Decimal::ZERO
    })
}
