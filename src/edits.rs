//! User edits to portfolio rows.
//!
//! Every edit goes through [`PortfolioEditor`], which validates the input,
//! updates the shared portfolio, republishes the affected labels and saves
//! the result.

use crate::error::{Error, Result};
use crate::events::UpdateSender;
use crate::exchange::{ExchangeClient, normalize_symbol};
use crate::pricing::{self, INVALID_LABEL, INVALID_PAIR_LABEL, LOADING_LABEL};
use crate::state::{Column, SharedPortfolio};
use crate::storage::PortfolioStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Applies user input to the portfolio.
pub struct PortfolioEditor {
    exchange: Arc<dyn ExchangeClient>,
    portfolio: SharedPortfolio,
    updates: UpdateSender,
    store: Option<Arc<dyn PortfolioStore>>,
}

impl PortfolioEditor {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        portfolio: SharedPortfolio,
        updates: UpdateSender,
    ) -> Self {
        Self {
            exchange,
            portfolio,
            updates,
            store: None,
        }
    }

    /// Save after every successful edit.
    pub fn with_store(mut self, store: Arc<dyn PortfolioStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Point a row at a new trading pair and price it right away.
    pub async fn set_symbol(&self, row: usize, text: &str) -> Result<()> {
        let symbol = normalize_symbol(text);
        self.portfolio
            .write(|p| p.row_mut(row).map(|r| r.set_symbol(&symbol)))?;
        self.updates.cell(row, Column::Coin, symbol.as_str())?;
        self.persist();

        if symbol.is_empty() {
            self.updates.cell(row, Column::Price, LOADING_LABEL)?;
            return self.updates.publish_figures(&self.portfolio, row);
        }

        if !self.exchange.is_valid_symbol(&symbol).await {
            info!(row, symbol = %symbol, "Exchange does not list symbol");
            self.updates.cell(row, Column::Price, INVALID_PAIR_LABEL)?;
            return self.updates.publish_figures(&self.portfolio, row);
        }

        let formatted = match self.exchange.fetch_price(&symbol).await {
            Ok(raw) => pricing::format_price(raw).map(|formatted| (raw, formatted)),
            Err(e) => {
                debug!(row, symbol = %symbol, error = %e, "Price fetch failed");
                None
            }
        };
        let Some((raw, formatted)) = formatted else {
            self.updates.cell(row, Column::Price, INVALID_LABEL)?;
            return self.updates.publish_figures(&self.portfolio, row);
        };

        if self
            .portfolio
            .write(|p| p.record_price(row, &symbol, raw, formatted))
        {
            self.updates.publish_row(&self.portfolio, row)
        } else {
            debug!(row, symbol = %symbol, "Row changed during fetch, discarding price");
            Ok(())
        }
    }

    pub fn set_invested(&self, row: usize, text: &str) -> Result<()> {
        let invested = pricing::parse_amount(text)?;
        self.portfolio
            .write(|p| p.row_mut(row).and_then(|r| r.set_invested(invested)))?;
        self.updates
            .cell(row, Column::Invested, pricing::format_currency(invested))?;
        self.persist();
        self.updates.publish_figures(&self.portfolio, row)
    }

    pub fn set_holdings(&self, row: usize, text: &str) -> Result<()> {
        let holdings = pricing::parse_amount(text)?;
        self.portfolio
            .write(|p| p.row_mut(row).and_then(|r| r.set_holdings(holdings)))?;
        self.updates
            .cell(row, Column::Holdings, holdings.normalize().to_string())?;
        self.persist();
        self.updates.publish_figures(&self.portfolio, row)
    }

    pub fn set_wallet(&self, row: usize, text: &str) -> Result<()> {
        let wallet = self.portfolio.write(|p| {
            p.row_mut(row).map(|r| {
                r.set_wallet(text);
                r.wallet().to_string()
            })
        })?;
        self.updates.cell(row, Column::Wallet, wallet)?;
        self.persist();
        Ok(())
    }

    /// Update the deposited amount and the net value label.
    pub fn set_deposited(&self, text: &str) -> Result<()> {
        let deposited = pricing::parse_amount(text)?;
        let label = self.portfolio.write(|p| {
            p.set_deposited(deposited)?;
            Ok::<_, Error>(p.net_value_label())
        })?;
        self.updates.net_value(label)?;
        self.persist();
        Ok(())
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let snapshot = self.portfolio.snapshot();
        if let Err(e) = store.save(&snapshot) {
            warn!(error = %e, "Failed to save portfolio");
        }
    }
}
