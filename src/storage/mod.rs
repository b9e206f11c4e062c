//! Portfolio persistence.

mod json;

pub use json::{CURRENT_VERSION, JsonFileStore};

use crate::error::Result;
use crate::state::Portfolio;

/// Loads and saves the user-entered part of a portfolio.
///
/// Prices and derived figures are never persisted.
pub trait PortfolioStore: Send + Sync {
    fn load(&self) -> Result<Portfolio>;

    fn save(&self, portfolio: &Portfolio) -> Result<()>;
}
