//! The 30-row portfolio and its shared handle.

use super::{Column, ROW_COUNT, Row};
use crate::error::{Error, Result};
use crate::pricing::{self, INVALID_LABEL, LOADING_LABEL};
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};

/// Fixed table of rows plus the deposited amount.
///
/// Total profit and net value are computed from the rows on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Portfolio {
    rows: [Row; ROW_COUNT],
    deposited: Decimal,
}

impl Portfolio {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get a row by index.
    pub fn row(&self, index: usize) -> Result<&Row> {
        self.rows.get(index).ok_or_else(|| out_of_range(index))
    }

    /// Get a mutable row by index.
    pub fn row_mut(&mut self, index: usize) -> Result<&mut Row> {
        self.rows.get_mut(index).ok_or_else(|| out_of_range(index))
    }

    pub fn deposited(&self) -> Decimal {
        self.deposited
    }

    pub fn set_deposited(&mut self, deposited: Decimal) -> Result<()> {
        if deposited < Decimal::ZERO {
            return Err(Error::invalid_input(format!(
                "deposited must not be negative, got {deposited}"
            )));
        }
        self.deposited = deposited;
        Ok(())
    }

    /// Record a fetched price, but only if the row still holds `symbol`.
    ///
    /// Returns false when the row was re-pointed at another coin while the
    /// fetch was in flight.
    pub fn record_price(&mut self, index: usize, symbol: &str, raw: Decimal, formatted: String) -> bool {
        match self.rows.get_mut(index) {
            Some(row) if row.symbol() == symbol => {
                row.record_price(raw, formatted);
                true
            }
            _ => false,
        }
    }

    /// Sum of profit over rows with a position and a price. `None` on
    /// overflow.
    pub fn total_profit(&self) -> Option<Decimal> {
        pricing::compute_total_profit(&self.rows)
    }

    /// Total profit minus deposited.
    pub fn net_value(&self) -> Option<Decimal> {
        pricing::compute_net_value(self.total_profit(), Some(self.deposited))
    }

    pub fn net_value_label(&self) -> String {
        pricing::format_net_value(self.net_value())
    }

    /// Number of rows with a coin entered.
    pub fn configured_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_configured()).count()
    }

    /// Whether every configured row has a recorded price.
    pub fn all_configured_priced(&self) -> bool {
        self.rows
            .iter()
            .filter(|row| row.is_configured())
            .all(|row| row.last_price().is_some())
    }

    /// Price cell text for a row.
    pub fn price_label(&self, index: usize) -> Result<String> {
        let row = self.row(index)?;
        Ok(match row.formatted_price() {
            Some(formatted) => pricing::price_label(formatted),
            None if row.is_configured() => INVALID_LABEL.to_string(),
            None => LOADING_LABEL.to_string(),
        })
    }

    /// Break-even, balance and profit cell text for a row.
    pub fn figure_labels(&self, index: usize) -> Result<[(Column, String); 3]> {
        let figures = self.row(index)?.figures();
        Ok([
            (
                Column::BreakEven,
                pricing::format_figure(figures.map(|f| f.break_even)),
            ),
            (Column::Balance, pricing::format_figure(figures.map(|f| f.balance))),
            (Column::Profit, pricing::format_figure(figures.map(|f| f.profit))),
        ])
    }
}

fn out_of_range(index: usize) -> Error {
    Error::invalid_input(format!(
        "row {index} is out of range (0..{ROW_COUNT})"
    ))
}

/// Portfolio shared between the UI side and the price worker.
///
/// Access goes through short closures so no lock is ever held across an
/// await point.
#[derive(Debug, Clone, Default)]
pub struct SharedPortfolio {
    inner: Arc<RwLock<Portfolio>>,
}

impl SharedPortfolio {
    pub fn new(portfolio: Portfolio) -> Self {
        Self {
            inner: Arc::new(RwLock::new(portfolio)),
        }
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&Portfolio) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    /// Run `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut Portfolio) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Clone the current state.
    pub fn snapshot(&self) -> Portfolio {
        self.read(Portfolio::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn portfolio_with(rows: &[(usize, &str, Decimal, Decimal, Option<Decimal>)]) -> Portfolio {
        let mut portfolio = Portfolio::default();
        for (index, symbol, invested, holdings, price) in rows {
            let row = portfolio.row_mut(*index).unwrap();
            *row = Row::new(symbol, *invested, *holdings).unwrap();
            if let Some(price) = price {
                row.record_price(*price, pricing::format_price(*price).unwrap());
            }
        }
        portfolio
    }

    #[test]
    fn test_default_has_thirty_rows() {
        let portfolio = Portfolio::default();
        assert_eq!(portfolio.rows().len(), ROW_COUNT);
        assert_eq!(portfolio.configured_count(), 0);
        assert_eq!(portfolio.deposited(), Decimal::ZERO);
    }

    #[test]
    fn test_row_out_of_range() {
        let mut portfolio = Portfolio::default();
        assert!(portfolio.row(ROW_COUNT).is_err());
        assert!(portfolio.row_mut(99).is_err());
        assert!(portfolio.row(ROW_COUNT - 1).is_ok());
    }

    #[test]
    fn test_net_value_matches_fresh_aggregation() {
        let mut portfolio = portfolio_with(&[
            (0, "BTCUSDT", dec!(1000), dec!(2), Some(dec!(600))),
            (3, "ETHUSDT", dec!(500), dec!(1), Some(dec!(550.5))),
            (7, "SOLUSDT", Decimal::ZERO, dec!(3), Some(dec!(20))),
        ]);
        portfolio.set_deposited(dec!(100)).unwrap();

        assert_eq!(portfolio.total_profit(), Some(dec!(250.5)));
        assert_eq!(portfolio.net_value(), Some(dec!(150.5)));
        assert_eq!(portfolio.net_value_label(), "NET VALUE - $150.50");

        // A price change is reflected immediately; nothing is cached.
        portfolio.record_price(3, "ETHUSDT", dec!(550), "550.00".to_string());
        assert_eq!(portfolio.net_value(), Some(dec!(150)));
        assert_eq!(portfolio.net_value_label(), "NET VALUE - $150");
        assert_eq!(
            portfolio.net_value(),
            pricing::compute_net_value(
                pricing::compute_total_profit(portfolio.rows()),
                Some(portfolio.deposited())
            )
        );
    }

    #[test]
    fn test_overflowing_total_renders_placeholder() {
        let price = dec!(1000000000000000);
        let mut portfolio = portfolio_with(&[
            (0, "BTCUSDT", Decimal::ONE, dec!(50000000000000), Some(price)),
            (1, "BTCUSDT", Decimal::ONE, dec!(50000000000000), Some(price)),
        ]);
        assert!(portfolio.row(0).unwrap().profit().is_some());
        assert_eq!(portfolio.total_profit(), None);
        assert_eq!(portfolio.net_value(), None);
        assert_eq!(portfolio.net_value_label(), "NET VALUE - $0.00");

        portfolio.row_mut(1).unwrap().clear_price();
        assert!(portfolio.net_value().is_some());
    }

    #[test]
    fn test_record_price_ignores_stale_symbol() {
        let mut portfolio = portfolio_with(&[(2, "BTCUSDT", dec!(10), dec!(1), None)]);
        assert!(!portfolio.record_price(2, "ETHUSDT", dec!(5), "5.00".to_string()));
        assert_eq!(portfolio.row(2).unwrap().last_price(), None);
        assert!(portfolio.record_price(2, "BTCUSDT", dec!(5), "5.00".to_string()));
        assert!(!portfolio.record_price(ROW_COUNT, "BTCUSDT", dec!(5), "5.00".to_string()));
    }

    #[test]
    fn test_all_configured_priced() {
        let mut portfolio = portfolio_with(&[
            (0, "BTCUSDT", dec!(10), dec!(1), Some(dec!(50000))),
            (1, "ETHUSDT", dec!(10), dec!(1), None),
        ]);
        assert!(!portfolio.all_configured_priced());

        portfolio.record_price(1, "ETHUSDT", dec!(3000), "3,000.00".to_string());
        assert!(portfolio.all_configured_priced());

        assert!(Portfolio::default().all_configured_priced());
    }

    #[test]
    fn test_labels() {
        let portfolio = portfolio_with(&[
            (0, "BTCUSDT", dec!(1000), dec!(2), Some(dec!(600))),
            (1, "ETHUSDT", Decimal::ZERO, Decimal::ZERO, Some(dec!(3000))),
            (2, "DOGEUSDT", dec!(10), dec!(100), None),
        ]);

        assert_eq!(portfolio.price_label(0).unwrap(), "$600.00");
        assert_eq!(
            portfolio.figure_labels(0).unwrap(),
            [
                (Column::BreakEven, "$500".to_string()),
                (Column::Balance, "$1,200".to_string()),
                (Column::Profit, "$200".to_string()),
            ]
        );
        assert_eq!(
            portfolio.figure_labels(1).unwrap(),
            [
                (Column::BreakEven, "Invalid".to_string()),
                (Column::Balance, "Invalid".to_string()),
                (Column::Profit, "Invalid".to_string()),
            ]
        );
        assert_eq!(portfolio.price_label(2).unwrap(), "Invalid");
        assert_eq!(portfolio.price_label(3).unwrap(), "Loading...");
    }

    #[test]
    fn test_negative_deposited_rejected() {
        let mut portfolio = Portfolio::default();
        assert!(portfolio.set_deposited(dec!(-10)).is_err());
        assert_eq!(portfolio.deposited(), Decimal::ZERO);
    }

    #[test]
    fn test_shared_portfolio_is_shared() {
        let shared = SharedPortfolio::default();
        let other = shared.clone();
        other.write(|p| p.set_deposited(dec!(42))).unwrap();
        assert_eq!(shared.read(|p| p.deposited()), dec!(42));
        assert_eq!(shared.snapshot().deposited(), dec!(42));
    }
}
