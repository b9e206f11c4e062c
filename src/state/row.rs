//! A single tracked position.

use crate::error::{Error, Result};
use crate::exchange::normalize_symbol;
use crate::pricing::{self, RowFigures};
use rust_decimal::Decimal;

/// One grid row: user-entered position data plus the last fetched price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Normalized exchange symbol. Empty means unconfigured.
    symbol: String,
    /// Amount invested. Never negative.
    invested: Decimal,
    /// Quantity held. Never negative.
    holdings: Decimal,
    /// Wallet label.
    wallet: String,
    /// Last raw price from the exchange.
    last_price: Option<Decimal>,
    /// Display form of `last_price`.
    formatted_price: Option<String>,
}

impl Row {
    /// Create a row for a position.
    pub fn new(symbol: &str, invested: Decimal, holdings: Decimal) -> Result<Self> {
        let mut row = Self::default();
        row.set_symbol(symbol);
        row.set_invested(invested)?;
        row.set_holdings(holdings)?;
        Ok(row)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether a coin has been entered for this row.
    pub fn is_configured(&self) -> bool {
        !self.symbol.is_empty()
    }

    /// Set the symbol. A different symbol forgets the recorded price.
    pub fn set_symbol(&mut self, symbol: &str) {
        let symbol = normalize_symbol(symbol);
        if symbol != self.symbol {
            self.symbol = symbol;
            self.clear_price();
        }
    }

    pub fn invested(&self) -> Decimal {
        self.invested
    }

    pub fn set_invested(&mut self, invested: Decimal) -> Result<()> {
        self.invested = non_negative("invested", invested)?;
        Ok(())
    }

    pub fn holdings(&self) -> Decimal {
        self.holdings
    }

    pub fn set_holdings(&mut self, holdings: Decimal) -> Result<()> {
        self.holdings = non_negative("holdings", holdings)?;
        Ok(())
    }

    pub fn wallet(&self) -> &str {
        &self.wallet
    }

    pub fn set_wallet(&mut self, wallet: &str) {
        self.wallet = wallet.trim().to_uppercase();
    }

    pub fn last_price(&self) -> Option<Decimal> {
        self.last_price
    }

    pub fn formatted_price(&self) -> Option<&str> {
        self.formatted_price.as_deref()
    }

    /// Record a successful fetch.
    pub fn record_price(&mut self, raw: Decimal, formatted: String) {
        self.last_price = Some(raw);
        self.formatted_price = Some(formatted);
    }

    pub fn clear_price(&mut self) {
        self.last_price = None;
        self.formatted_price = None;
    }

    /// Derived figures, `None` without a position or a price.
    pub fn figures(&self) -> Option<RowFigures> {
        pricing::compute_row(self.invested, self.holdings, self.last_price?)
    }

    pub fn break_even(&self) -> Option<Decimal> {
        self.figures().map(|f| f.break_even)
    }

    pub fn balance(&self) -> Option<Decimal> {
        self.figures().map(|f| f.balance)
    }

    pub fn profit(&self) -> Option<Decimal> {
        self.figures().map(|f| f.profit)
    }

    /// True when nothing the user can enter has been set.
    pub fn is_blank(&self) -> bool {
        self.symbol.is_empty()
            && self.wallet.is_empty()
            && self.invested.is_zero()
            && self.holdings.is_zero()
    }
}

fn non_negative(field: &str, value: Decimal) -> Result<Decimal> {
    if value < Decimal::ZERO {
        Err(Error::invalid_input(format!(
            "{field} must not be negative, got {value}"
        )))
    } else {
        Ok(value)
    }
}
