//! Worker-to-UI update events.
//!
//! The price worker and the entry editor never touch widget state. They
//! push [`UpdateEvent`]s onto an unbounded, ordered queue; the UI drains
//! it on its own tick into an [`UpdateSink`].

mod grid;

pub use grid::GridModel;

use crate::error::{Error, Result};
use crate::state::{Column, SharedPortfolio};
use tokio::sync::mpsc;

/// A single display change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    /// Replace the text of one grid cell.
    Cell {
        row: usize,
        column: Column,
        text: String,
    },
    /// Replace the net value label.
    NetValue(String),
}

impl UpdateEvent {
    pub fn cell(row: usize, column: Column, text: impl Into<String>) -> Self {
        Self::Cell {
            row,
            column,
            text: text.into(),
        }
    }

    /// Deliver this event to a sink.
    pub fn apply<S: UpdateSink + ?Sized>(&self, sink: &mut S) {
        match self {
            Self::Cell { row, column, text } => sink.on_update(*row, *column, text),
            Self::NetValue(text) => sink.on_net_value_update(text),
        }
    }
}

/// Receives display changes. Implemented by the grid widget.
pub trait UpdateSink {
    /// A cell's text changed.
    fn on_update(&mut self, row: usize, column: Column, text: &str);

    /// The net value label changed.
    fn on_net_value_update(&mut self, text: &str);
}

/// Create a connected sender/receiver pair.
pub fn update_channel() -> (UpdateSender, UpdateReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UpdateSender { tx }, UpdateReceiver { rx })
}

/// Producer side of the update queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UpdateSender {
    tx: mpsc::UnboundedSender<UpdateEvent>,
}

impl UpdateSender {
    /// Queue an event. Fails only when the receiver is gone.
    pub fn send(&self, event: UpdateEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|e| Error::channel(e.to_string()))
    }

    pub fn cell(&self, row: usize, column: Column, text: impl Into<String>) -> Result<()> {
        self.send(UpdateEvent::cell(row, column, text))
    }

    pub fn net_value(&self, text: impl Into<String>) -> Result<()> {
        self.send(UpdateEvent::NetValue(text.into()))
    }

    /// Queue a row's price, its derived figures and the net value.
    pub fn publish_row(&self, portfolio: &SharedPortfolio, row: usize) -> Result<()> {
        let (price, figures, net_value) = portfolio.read(|p| {
            Ok::<_, Error>((p.price_label(row)?, p.figure_labels(row)?, p.net_value_label()))
        })?;

        self.cell(row, Column::Price, price)?;
        for (column, text) in figures {
            self.cell(row, column, text)?;
        }
        self.net_value(net_value)
    }

    /// Queue a row's derived figures and the net value.
    pub fn publish_figures(&self, portfolio: &SharedPortfolio, row: usize) -> Result<()> {
        let (figures, net_value) =
            portfolio.read(|p| Ok::<_, Error>((p.figure_labels(row)?, p.net_value_label())))?;

        for (column, text) in figures {
            self.cell(row, column, text)?;
        }
        self.net_value(net_value)
    }

    /// Whether the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the update queue, owned by the UI.
#[derive(Debug)]
pub struct UpdateReceiver {
    rx: mpsc::UnboundedReceiver<UpdateEvent>,
}

impl UpdateReceiver {
    /// Apply every queued event to `sink` in arrival order without
    /// blocking. Returns the number applied.
    pub fn drain_into<S: UpdateSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            event.apply(sink);
            applied += 1;
        }
        applied
    }

    /// Take the next event without blocking.
    pub fn try_recv(&mut self) -> Option<UpdateEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next event. `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<UpdateEvent> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Portfolio, Row};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<String>,
    }

    impl UpdateSink for RecordingSink {
        fn on_update(&mut self, row: usize, column: Column, text: &str) {
            self.calls.push(format!("{row}:{}={text}", column.index()));
        }

        fn on_net_value_update(&mut self, text: &str) {
            self.calls.push(format!("net={text}"));
        }
    }

    #[test]
    fn test_drain_is_fifo() {
        let (tx, mut rx) = update_channel();
        tx.cell(3, Column::Price, "$1.00").unwrap();
        tx.net_value("NET VALUE - $5").unwrap();
        tx.cell(0, Column::Price, "Loading...").unwrap();

        let mut sink = RecordingSink::default();
        assert_eq!(rx.drain_into(&mut sink), 3);
        assert_eq!(
            sink.calls,
            vec!["3:2=$1.00", "net=NET VALUE - $5", "0:2=Loading..."]
        );
        assert_eq!(rx.drain_into(&mut sink), 0);
    }

    #[test]
    fn test_send_fails_when_receiver_dropped() {
        let (tx, rx) = update_channel();
        drop(rx);
        assert!(tx.is_closed());
        assert!(tx.cell(0, Column::Price, "x").is_err());
    }

    #[test]
    fn test_publish_row() {
        let mut portfolio = Portfolio::default();
        let row = portfolio.row_mut(4).unwrap();
        *row = Row::new("BTCUSDT", dec!(1000), dec!(2)).unwrap();
        row.record_price(dec!(600), "600.00".to_string());
        let shared = SharedPortfolio::new(portfolio);

        let (tx, mut rx) = update_channel();
        tx.publish_row(&shared, 4).unwrap();

        let events: Vec<UpdateEvent> = std::iter::from_fn(|| rx.try_recv()).collect();
        assert_eq!(
            events,
            vec![
                UpdateEvent::cell(4, Column::Price, "$600.00"),
                UpdateEvent::cell(4, Column::BreakEven, "$500"),
                UpdateEvent::cell(4, Column::Balance, "$1,200"),
                UpdateEvent::cell(4, Column::Profit, "$200"),
                UpdateEvent::NetValue("NET VALUE - $200".to_string()),
            ]
        );
    }

    #[test]
    fn test_publish_row_out_of_range() {
        let (tx, mut rx) = update_channel();
        assert!(tx.publish_row(&SharedPortfolio::default(), 30).is_err());
        assert_eq!(rx.try_recv(), None);
    }

    #[tokio::test]
    async fn test_recv_ends_when_senders_dropped() {
        let (tx, mut rx) = update_channel();
        tx.net_value("NET VALUE - $0").unwrap();
        drop(tx);
        assert_eq!(
            rx.recv().await,
            Some(UpdateEvent::NetValue("NET VALUE - $0".to_string()))
        );
        assert_eq!(rx.recv().await, None);
    }
}
