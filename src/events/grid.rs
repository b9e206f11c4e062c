//! In-memory grid: the cell texts a widget layer would render.

use super::UpdateSink;
use crate::pricing;
use crate::state::{COLUMN_COUNT, Column, Portfolio, ROW_COUNT};
use rust_decimal::Decimal;

/// Text of every grid cell plus the net value label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridModel {
    cells: [[String; COLUMN_COUNT]; ROW_COUNT],
    net_value: String,
    /// Bumped whenever an update actually changes some text.
    revision: u64,
}

impl Default for GridModel {
    fn default() -> Self {
        Self {
            cells: Default::default(),
            net_value: pricing::format_net_value(Some(Decimal::ZERO)),
            revision: 0,
        }
    }
}

impl GridModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the grid from persisted user input, before any price arrives.
    ///
    /// Derived figures show what the portfolio can compute right now, which
    /// is `Invalid` for every row until it has a price.
    pub fn from_portfolio(portfolio: &Portfolio) -> Self {
        let mut grid = Self::default();

        for (index, row) in portfolio.rows().iter().enumerate() {
            let cells = &mut grid.cells[index];
            cells[Column::Coin.index()] = row.symbol().to_string();
            cells[Column::Invested.index()] = pricing::format_currency(row.invested());
            cells[Column::Holdings.index()] = row.holdings().normalize().to_string();
            cells[Column::Wallet.index()] = row.wallet().to_string();
            if let Ok(figures) = portfolio.figure_labels(index) {
                for (column, text) in figures {
                    cells[column.index()] = text;
                }
            }
        }
        grid.net_value = portfolio.net_value_label();
        grid
    }

    /// Text of a cell; empty for rows out of range.
    pub fn cell(&self, row: usize, column: Column) -> &str {
        self.cells
            .get(row)
            .map(|cells| cells[column.index()].as_str())
            .unwrap_or_default()
    }

    pub fn net_value(&self) -> &str {
        &self.net_value
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl UpdateSink for GridModel {
    fn on_update(&mut self, row: usize, column: Column, text: &str) {
        let Some(cells) = self.cells.get_mut(row) else {
            tracing::warn!(row, %column, "Dropping update for row out of range");
            return;
        };
        let cell = &mut cells[column.index()];
        if cell.as_str() != text {
            text.clone_into(cell);
            self.revision += 1;
        }
    }

    fn on_net_value_update(&mut self, text: &str) {
        if self.net_value != text {
            text.clone_into(&mut self.net_value);
            self.revision += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Row;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_grid() {
        let grid = GridModel::new();
        assert_eq!(grid.net_value(), "NET VALUE - $0");
        assert_eq!(grid.cell(0, Column::Price), "");
        assert_eq!(grid.cell(99, Column::Price), "");
    }

    #[test]
    fn test_updates_bump_revision_only_on_change() {
        let mut grid = GridModel::new();
        grid.on_update(1, Column::Price, "$2.00");
        grid.on_update(1, Column::Price, "$2.00");
        grid.on_net_value_update("NET VALUE - $0");
        assert_eq!(grid.revision(), 1);
        assert_eq!(grid.cell(1, Column::Price), "$2.00");

        grid.on_net_value_update("NET VALUE - $10");
        assert_eq!(grid.revision(), 2);
        assert_eq!(grid.net_value(), "NET VALUE - $10");
    }

    #[test]
    fn test_out_of_range_update_ignored() {
        let mut grid = GridModel::new();
        grid.on_update(ROW_COUNT, Column::Price, "$1.00");
        assert_eq!(grid.revision(), 0);
    }

    #[test]
    fn test_from_portfolio() {
        let mut portfolio = Portfolio::default();
        let row = portfolio.row_mut(0).unwrap();
        *row = Row::new("btcusdt", dec!(1500), dec!(0.25)).unwrap();
        row.set_wallet("trezor");

        let grid = GridModel::from_portfolio(&portfolio);
        assert_eq!(grid.cell(0, Column::Coin), "BTCUSDT");
        assert_eq!(grid.cell(0, Column::Invested), "$1,500");
        assert_eq!(grid.cell(0, Column::Holdings), "0.25");
        assert_eq!(grid.cell(0, Column::Wallet), "TREZOR");
        assert_eq!(grid.cell(0, Column::Profit), "Invalid");
        assert_eq!(grid.cell(0, Column::BreakEven), "Invalid");
        assert_eq!(grid.cell(5, Column::Balance), "Invalid");
        assert_eq!(grid.net_value(), "NET VALUE - $0");
    }

    #[test]
    fn test_from_portfolio_shows_known_figures() {
        let mut portfolio = Portfolio::default();
        let row = portfolio.row_mut(2).unwrap();
        *row = Row::new("BTCUSDT", dec!(1000), dec!(2)).unwrap();
        row.record_price(dec!(600), "600.00".to_string());

        let grid = GridModel::from_portfolio(&portfolio);
        assert_eq!(grid.cell(2, Column::BreakEven), "$500");
        assert_eq!(grid.cell(2, Column::Profit), "$200");
        assert_eq!(grid.net_value(), "NET VALUE - $200");
    }
}
