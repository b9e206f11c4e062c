//! Price display and profit/loss arithmetic.
//!
//! Everything here is a pure function of its inputs: the poller and the
//! entry editor call into it after every row change.

mod calculator;
mod format;

pub use calculator::{RowFigures, compute_net_value, compute_row, compute_total_profit};
pub use format::{
    INVALID_LABEL, INVALID_PAIR_LABEL, LOADING_LABEL, NET_VALUE_PREFIX, format_currency,
    format_figure, format_net_value, format_price, group_thousands, parse_amount, price_label,
};
