//! Binance public REST client.

use super::{ExchangeClient, normalize_symbol};
use crate::config::ExchangeConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";
const EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";

/// Price lookups against Binance spot market data endpoints.
///
/// Only unauthenticated endpoints are used.
pub struct BinanceClient {
    config: ExchangeConfig,
    http: Client,
}

impl BinanceClient {
    /// Create a new client.
    pub fn new(config: ExchangeConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_exchange_info(&self, symbol: &str) -> Result<ExchangeInfo> {
        let response = self
            .http
            .get(self.url(EXCHANGE_INFO_PATH))
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(describe_failure(symbol, status, &body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::api(format!("Malformed exchange info for {symbol}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    symbol: String,
    price: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    async fn is_valid_symbol(&self, symbol: &str) -> bool {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return false;
        }

        match self.get_exchange_info(&symbol).await {
            Ok(info) => info.symbols.iter().any(|s| s.symbol == symbol),
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "Symbol lookup failed");
                false
            }
        }
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(Error::invalid_input("empty symbol"));
        }

        let response = self
            .http
            .get(self.url(TICKER_PRICE_PATH))
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(describe_failure(&symbol, status, &body)));
        }

        let ticker: TickerPrice = response
            .json()
            .await
            .map_err(|e| Error::api(format!("Malformed ticker for {symbol}: {e}")))?;

        if ticker.symbol != symbol {
            return Err(Error::api(format!(
                "Asked for {symbol}, exchange answered for {}",
                ticker.symbol
            )));
        }

        parse_price(&symbol, &ticker.price)
    }
}

/// Parse a ticker price string. Zero and negative prices are failures.
fn parse_price(symbol: &str, price: &str) -> Result<Decimal> {
    let value: Decimal = price
        .trim()
        .parse()
        .map_err(|e| Error::api(format!("Invalid price format for {symbol}: {e}")))?;

    if value <= Decimal::ZERO {
        return Err(Error::api(format!("Non-positive price for {symbol}: {value}")));
    }
    Ok(value)
}

/// Turn a non-success response into a readable message, preferring the
/// exchange's own `{"code": .., "msg": ..}` body.
fn describe_failure(symbol: &str, status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => format!("{symbol}: {} (code {}, HTTP {status})", err.msg, err.code),
        Err(_) => format!("{symbol}: HTTP {status}"),
    }
}
