//! Exchange integration.
//!
//! The poller only needs "symbol in, price or failure out", expressed by
//! [`ExchangeClient`]. [`BinanceClient`] implements it against the public
//! Binance REST API.

mod binance;

pub use binance::BinanceClient;

use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Price lookup against a remote exchange.
///
/// Symbols are case-insensitive and whitespace is ignored. Every failure
/// (unknown symbol, transport, malformed response) comes back as `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Whether the exchange lists this trading pair.
    async fn is_valid_symbol(&self, symbol: &str) -> bool;

    /// Current price for a trading pair.
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal>;
}

/// Upper-case a symbol and remove all whitespace.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
