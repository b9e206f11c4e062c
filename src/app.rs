//! Main application module.
//!
//! [`App`] wires the exchange client, the portfolio store, the price poller
//! and the grid model together, and drives the UI tick that drains the
//! update queue.

use crate::config::Config;
use crate::edits::PortfolioEditor;
use crate::error::Result;
use crate::events::{GridModel, UpdateReceiver, update_channel};
use crate::exchange::{BinanceClient, ExchangeClient};
use crate::poller::PricePoller;
use crate::state::SharedPortfolio;
use crate::storage::{JsonFileStore, PortfolioStore};
use std::future::Future;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// The main application.
pub struct App {
    /// Configuration.
    config: Config,
    /// Rows shared with the poller and the editor.
    portfolio: SharedPortfolio,
    /// Where the portfolio is loaded from and saved to. `None` when the
    /// saved file could not be read, so it is never overwritten.
    store: Option<Arc<dyn PortfolioStore>>,
    /// Background price worker.
    poller: PricePoller,
    /// Applies user input.
    editor: PortfolioEditor,
    /// UI end of the update queue.
    updates: UpdateReceiver,
    /// Rendered cell text.
    grid: GridModel,
}

impl App {
    /// Create the application against Binance and the configured JSON file.
    pub fn new(config: Config) -> Result<Self> {
        let exchange = Arc::new(BinanceClient::new(config.exchange.clone())?);
        let store = Arc::new(JsonFileStore::new(config.storage.portfolio_path()?));
        Ok(Self::with_parts(config, exchange, store))
    }

    /// Create the application from explicit collaborators.
    pub fn with_parts(
        config: Config,
        exchange: Arc<dyn ExchangeClient>,
        store: Arc<dyn PortfolioStore>,
    ) -> Self {
        let (loaded, store) = match store.load() {
            Ok(loaded) => (loaded, Some(store)),
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to load saved portfolio, starting empty; changes will not be saved"
                );
                (Default::default(), None)
            }
        };
        info!(rows = loaded.configured_count(), "Portfolio loaded");

        let grid = GridModel::from_portfolio(&loaded);
        let portfolio = SharedPortfolio::new(loaded);
        let (tx, updates) = update_channel();

        let poller = PricePoller::new(
            Arc::clone(&exchange),
            portfolio.clone(),
            tx.clone(),
            config.polling.clone(),
        );
        let mut editor = PortfolioEditor::new(exchange, portfolio.clone(), tx);
        if let Some(store) = &store {
            editor = editor.with_store(Arc::clone(store));
        }

        Self {
            config,
            portfolio,
            store,
            poller,
            editor,
            updates,
            grid,
        }
    }

    /// Run until Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Poll prices and drain updates on every UI tick until `shutdown`
    /// resolves, then stop the poller and save.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        self.poller.start()?;

        let mut ticker = tokio::time::interval(self.config.ui.tick_rate());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.drain_updates();
                }
            }
        }

        self.shutdown().await
    }

    /// Apply every queued update to the grid. Returns the number applied.
    pub fn drain_updates(&mut self) -> usize {
        let before = self.grid.net_value().to_string();
        let applied = self.updates.drain_into(&mut self.grid);
        if self.grid.net_value() != before {
            debug!("{}", self.grid.net_value());
        }
        applied
    }

    async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down");
        self.poller.stop().await?;
        self.drain_updates();
        match &self.store {
            Some(store) => store.save(&self.portfolio.snapshot()),
            None => {
                warn!("Not saving portfolio; the saved file could not be read at startup");
                Ok(())
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn portfolio(&self) -> &SharedPortfolio {
        &self.portfolio
    }

    pub fn editor(&self) -> &PortfolioEditor {
        &self.editor
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn poller(&self) -> &PricePoller {
        &self.poller
    }
}
