//! The background price polling cycle.

use super::progress::ProgressLogger;
use crate::config::PollingConfig;
use crate::events::{UpdateEvent, UpdateSender};
use crate::exchange::ExchangeClient;
use crate::pricing::{self, INVALID_LABEL, LOADING_LABEL};
use crate::state::{Column, Portfolio, ROW_COUNT, SharedPortfolio};
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, trace};

/// Delay before the next cycle: the short cooldown once every configured
/// row has a price, the long interval while some are still missing.
pub fn next_delay(portfolio: &Portfolio, config: &PollingConfig) -> Duration {
    if portfolio.all_configured_priced() {
        config.short_cooldown()
    } else {
        config.long_interval()
    }
}

/// Owns everything the polling task touches.
pub(crate) struct Worker {
    exchange: Arc<dyn ExchangeClient>,
    portfolio: SharedPortfolio,
    updates: UpdateSender,
    config: PollingConfig,
    stop: watch::Receiver<bool>,
    progress: ProgressLogger,
    /// `Loading...`/`Invalid` labels held back until the row pass ends.
    status_labels: VecDeque<UpdateEvent>,
}

impl Worker {
    pub(crate) fn new(
        exchange: Arc<dyn ExchangeClient>,
        portfolio: SharedPortfolio,
        updates: UpdateSender,
        config: PollingConfig,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let progress = ProgressLogger::new(config.report_interval());
        Self {
            exchange,
            portfolio,
            updates,
            config,
            stop,
            progress,
            status_labels: VecDeque::with_capacity(ROW_COUNT),
        }
    }

    /// Poll until stopped.
    pub(crate) async fn run(mut self) {
        info!("Price polling started");
        loop {
            if self.updates.is_closed() {
                debug!("Update queue closed");
                break;
            }
            let ControlFlow::Continue(delay) = self.run_cycle().await else {
                break;
            };
            trace!(?delay, "Cycle complete");
            if self.pause(delay).await.is_break() {
                break;
            }
            self.progress.report_if_due(Instant::now());
        }
        info!("Price polling stopped");
    }

    /// One pass over every row. Yields the delay before the next pass, or
    /// breaks when a stop was requested or the UI went away.
    pub(crate) async fn run_cycle(&mut self) -> ControlFlow<(), Duration> {
        for row in 0..ROW_COUNT {
            if self.stop_requested() {
                return ControlFlow::Break(());
            }
            self.poll_row(row).await?;
        }
        self.flush_status_labels()?;

        ControlFlow::Continue(self.portfolio.read(|p| next_delay(p, &self.config)))
    }

    async fn poll_row(&mut self, row: usize) -> ControlFlow<()> {
        let symbol = self
            .portfolio
            .read(|p| p.rows()[row].symbol().to_string());

        if symbol.is_empty() {
            self.queue_status(row, LOADING_LABEL);
            return ControlFlow::Continue(());
        }

        self.progress.record_attempt();
        let fetched = tokio::select! {
            biased;
            _ = self.stop.changed() => return ControlFlow::Break(()),
            fetched = self.exchange.fetch_price(&symbol) => fetched,
        };

        let raw = match fetched {
            Ok(raw) => raw,
            Err(e) => {
                debug!(
                    row,
                    symbol = %symbol,
                    error = %e,
                    recoverable = e.is_recoverable(),
                    "Price fetch failed"
                );
                self.queue_status(row, INVALID_LABEL);
                return ControlFlow::Continue(());
            }
        };

        let Some(formatted) = pricing::format_price(raw) else {
            debug!(row, symbol = %symbol, price = %raw, "Price below display precision");
            self.queue_status(row, INVALID_LABEL);
            return ControlFlow::Continue(());
        };

        self.progress.record_success();
        let recorded = self
            .portfolio
            .write(|p| p.record_price(row, &symbol, raw, formatted));
        if !recorded {
            debug!(row, symbol = %symbol, "Row changed during fetch, discarding price");
            return ControlFlow::Continue(());
        }

        match self.updates.publish_row(&self.portfolio, row) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                debug!(error = %e, "Update queue closed");
                ControlFlow::Break(())
            }
        }
    }

    fn queue_status(&mut self, row: usize, text: &str) {
        self.status_labels
            .push_back(UpdateEvent::cell(row, Column::Price, text));
    }

    fn flush_status_labels(&mut self) -> ControlFlow<()> {
        while let Some(event) = self.status_labels.pop_front() {
            if self.updates.send(event).is_err() {
                debug!("Update queue closed");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Sleep for `total` in increments, each racing the stop signal.
    async fn pause(&mut self, total: Duration) -> ControlFlow<()> {
        let increment = self.config.sleep_increment();
        let mut remaining = total;

        while !remaining.is_zero() {
            if self.stop_requested() {
                return ControlFlow::Break(());
            }
            let step = remaining.min(increment);
            tokio::select! {
                biased;
                _ = self.stop.changed() => return ControlFlow::Break(()),
                _ = tokio::time::sleep(step) => {}
            }
            remaining = remaining.saturating_sub(step);
        }

        if self.stop_requested() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// A stop was signalled, or the poller that owns the signal is gone.
    fn stop_requested(&self) -> bool {
        *self.stop.borrow() || self.stop.has_changed().is_err()
    }
}
