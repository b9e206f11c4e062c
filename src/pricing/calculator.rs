//! Break-even, balance, profit and net value.

use crate::state::Row;
use rust_decimal::Decimal;

/// Derived figures for one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFigures {
    /// Price per unit at which the balance equals the invested amount.
    pub break_even: Decimal,
    /// Current market value of the holdings.
    pub balance: Decimal,
    /// Balance minus invested amount. May be negative.
    pub profit: Decimal,
}

/// Compute a row's derived figures.
///
/// Returns `None` when there is no position (`invested` or `holdings` not
/// positive), which callers render as `Invalid` rather than zero. Overflow
/// is treated the same way.
pub fn compute_row(invested: Decimal, holdings: Decimal, raw_price: Decimal) -> Option<RowFigures> {
    if invested <= Decimal::ZERO || holdings <= Decimal::ZERO {
        return None;
    }

    let break_even = invested.checked_div(holdings)?;
    let balance = raw_price.checked_mul(holdings)?;
    let profit = balance.checked_sub(invested)?;

    Some(RowFigures {
        break_even,
        balance,
        profit,
    })
}

/// Sum the profit of every row that has a position and a known price.
/// Other rows contribute nothing. `None` if the sum overflows.
pub fn compute_total_profit<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Option<Decimal> {
    rows.into_iter()
        .filter_map(Row::figures)
        .try_fold(Decimal::ZERO, |total, figures| total.checked_add(figures.profit))
}

/// Net value is total profit minus the deposited amount. `None` only when
/// an input is missing.
pub fn compute_net_value(total_profit: Option<Decimal>, deposited: Option<Decimal>) -> Option<Decimal> {
    total_profit?.checked_sub(deposited?)
}
