//! Portfolio state for coingrid.
//!
//! The grid is a fixed table of [`ROW_COUNT`] positions. Rows are addressed
//! by index; columns by [`Column`].

mod portfolio;
mod row;

pub use portfolio::{Portfolio, SharedPortfolio};
pub use row::Row;

/// Number of rows in the grid.
pub const ROW_COUNT: usize = 30;

/// Number of grid columns.
pub const COLUMN_COUNT: usize = 9;

/// Grid columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Coin,
    Icon,
    Price,
    BreakEven,
    Balance,
    Profit,
    Invested,
    Holdings,
    Wallet,
}

impl Column {
    /// All columns, in display order.
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Coin,
        Column::Icon,
        Column::Price,
        Column::BreakEven,
        Column::Balance,
        Column::Profit,
        Column::Invested,
        Column::Holdings,
        Column::Wallet,
    ];

    /// Position of the column in the grid.
    pub fn index(self) -> usize {
        match self {
            Column::Coin => 0,
            Column::Icon => 1,
            Column::Price => 2,
            Column::BreakEven => 3,
            Column::Balance => 4,
            Column::Profit => 5,
            Column::Invested => 6,
            Column::Holdings => 7,
            Column::Wallet => 8,
        }
    }

    /// Column at a grid position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Header text.
    pub fn title(self) -> &'static str {
        match self {
            Column::Coin => "COINS",
            Column::Icon => "ICONS",
            Column::Price => "PRICE",
            Column::BreakEven => "BREAK EVEN",
            Column::Balance => "BALANCE",
            Column::Profit => "PROFIT",
            Column::Invested => "INVESTED",
            Column::Holdings => "HOLDINGS",
            Column::Wallet => "WALLET",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
