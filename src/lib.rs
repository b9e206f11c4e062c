//! # coingrid - live crypto portfolio grid
//!
//! Tracks up to 30 positions against Binance spot prices and keeps a grid
//! of prices, break-even points, balances and profit current, together
//! with an aggregate net value.
//!
//! ## Architecture
//!
//! - **Exchange**: price lookup behind the [`ExchangeClient`] trait
//! - **Pricing**: display formatting and derived-value arithmetic
//! - **State**: the 30-row portfolio behind a shared handle
//! - **Poller**: background worker that refreshes prices
//! - **Events**: ordered update queue between the worker and the UI
//! - **Edits**: validated user input
//! - **Storage**: portfolio persistence
//! - **Config**: configuration management

pub mod app;
pub mod config;
pub mod edits;
pub mod error;
pub mod events;
pub mod exchange;
pub mod poller;
pub mod pricing;
pub mod state;
pub mod storage;

pub use app::App;
pub use config::Config;
pub use edits::PortfolioEditor;
pub use error::{Error, Result};
pub use events::{GridModel, UpdateEvent, UpdateSink};
pub use exchange::{BinanceClient, ExchangeClient};
pub use poller::{PollerState, PricePoller};
pub use state::{Column, Portfolio, Row, SharedPortfolio};
pub use storage::{JsonFileStore, PortfolioStore};
