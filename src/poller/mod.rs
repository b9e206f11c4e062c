//! Background price polling.
//!
//! [`PricePoller`] owns the lifecycle of a single worker task. The worker
//! walks every row in index order, fetches prices, publishes labels on the
//! update queue and paces itself between cycles.

mod progress;
mod worker;

pub use progress::{ProgressLogger, ProgressReport};
pub use worker::next_delay;

use crate::config::PollingConfig;
use crate::error::{Error, Result};
use crate::events::UpdateSender;
use crate::exchange::ExchangeClient;
use crate::state::SharedPortfolio;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use worker::Worker;

/// Lifecycle state of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Built but never started.
    Idle,
    /// Worker task spawned.
    Running,
    /// Stopped; cannot be restarted.
    Stopped,
}

impl std::fmt::Display for PollerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Owns the polling worker.
pub struct PricePoller {
    state: PollerState,
    exchange: Arc<dyn ExchangeClient>,
    portfolio: SharedPortfolio,
    updates: UpdateSender,
    config: PollingConfig,
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl PricePoller {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        portfolio: SharedPortfolio,
        updates: UpdateSender,
        config: PollingConfig,
    ) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            state: PollerState::Idle,
            exchange,
            portfolio,
            updates,
            config,
            stop_tx,
            handle: None,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Spawn the worker. A no-op while running; a stopped poller cannot be
    /// started again.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            PollerState::Running => Ok(()),
            PollerState::Stopped => Err(Error::invalid_state(
                "poller has been stopped; build a new one to restart",
            )),
            PollerState::Idle => {
                let worker = Worker::new(
                    Arc::clone(&self.exchange),
                    self.portfolio.clone(),
                    self.updates.clone(),
                    self.config.clone(),
                    self.stop_tx.subscribe(),
                );
                self.handle = Some(tokio::spawn(worker.run()));
                self.state = PollerState::Running;
                info!("Price poller started");
                Ok(())
            }
        }
    }

    /// Signal the worker and wait up to the stop timeout for it to exit.
    ///
    /// A worker that does not exit in time is left to finish on its own.
    pub async fn stop(&mut self) -> Result<()> {
        self.stop_tx.send_replace(true);
        self.state = PollerState::Stopped;

        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        let timeout = self.config.stop_timeout();
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => info!("Price poller stopped"),
            Ok(Err(e)) => warn!(error = %e, "Price worker ended abnormally"),
            Err(_) => warn!(?timeout, "Price worker did not stop in time, detaching"),
        }
        Ok(())
    }

    /// Whether no worker is running, either never started or finished.
    pub fn is_worker_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for PricePoller {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{UpdateEvent, UpdateReceiver, update_channel};
    use crate::exchange::MockExchangeClient;
    use crate::state::{Column, Portfolio, ROW_COUNT, Row};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_test::assert_err;

    /// Exchange whose fetches never complete.
    struct HangingExchange;

    #[async_trait]
    impl ExchangeClient for HangingExchange {
        async fn is_valid_symbol(&self, _symbol: &str) -> bool {
            true
        }

        async fn fetch_price(&self, _symbol: &str) -> Result<Decimal> {
            std::future::pending().await
        }
    }

    fn btc_portfolio() -> SharedPortfolio {
        let mut portfolio = Portfolio::default();
        *portfolio.row_mut(0).unwrap() = Row::new("BTCUSDT", dec!(1000), dec!(2)).unwrap();
        SharedPortfolio::new(portfolio)
    }

    fn poller(exchange: Arc<dyn ExchangeClient>) -> (PricePoller, UpdateReceiver) {
        let (tx, rx) = update_channel();
        let poller = PricePoller::new(exchange, btc_portfolio(), tx, PollingConfig::default());
        (poller, rx)
    }

    fn price_mock() -> MockExchangeClient {
        let mut exchange = MockExchangeClient::new();
        exchange.expect_fetch_price().returning(|_| Ok(dec!(600)));
        exchange
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle() {
        let (mut poller, _rx) = poller(Arc::new(price_mock()));
        assert_eq!(poller.state(), PollerState::Idle);
        assert!(poller.is_worker_finished());

        poller.start().unwrap();
        assert_eq!(poller.state(), PollerState::Running);
        assert!(!poller.is_worker_finished());

        // Second start is a no-op.
        poller.start().unwrap();
        assert_eq!(poller.state(), PollerState::Running);

        poller.stop().await.unwrap();
        assert_eq!(poller.state(), PollerState::Stopped);
        assert!(poller.is_worker_finished());

        assert_err!(poller.start());
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let (mut poller, _rx) = poller(Arc::new(MockExchangeClient::new()));
        poller.stop().await.unwrap();
        assert_eq!(poller.state(), PollerState::Stopped);
        assert!(poller.start().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_publishes_prices() {
        let (mut poller, mut rx) = poller(Arc::new(price_mock()));
        poller.start().unwrap();

        assert_eq!(
            rx.recv().await,
            Some(UpdateEvent::cell(0, Column::Price, "$600.00"))
        );
        poller.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_hanging_fetch() {
        let (mut poller, _rx) = poller(Arc::new(HangingExchange));
        poller.start().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        poller.stop().await.unwrap();
        assert!(started.elapsed() < PollingConfig::default().sleep_increment());
        assert!(poller.is_worker_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_sleep_is_prompt() {
        let (mut poller, mut rx) = poller(Arc::new(price_mock()));
        poller.start().unwrap();

        // Wait for the first cycle to finish; the worker is now sleeping.
        while let Some(event) = rx.recv().await {
            if event == UpdateEvent::cell(ROW_COUNT - 1, Column::Price, "Loading...") {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(130)).await;

        let started = Instant::now();
        poller.stop().await.unwrap();
        assert!(started.elapsed() <= PollingConfig::default().sleep_increment());
        assert!(poller.is_worker_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_exits_when_receiver_dropped() {
        let (mut poller, rx) = poller(Arc::new(price_mock()));
        drop(rx);
        poller.start().unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(poller.is_worker_finished());
        poller.stop().await.unwrap();
    }
}
