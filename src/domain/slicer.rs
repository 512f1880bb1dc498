//! Position slicer: partitions the ledger into per-ticker slices and tags
//! each slice opened or closed.
//!
//! A slice is a maximal run of a ticker's chronologically-ordered
//! transactions between two points where the cumulative buy quantity
//! equals the cumulative sell quantity. The slice counter is shared across
//! all tickers and never reset, so slices of different tickers never share
//! an index.

use crate::domain::ledger::Ledger;
use crate::domain::schema::{ColumnHandle, Operation, SliceState};
use crate::domain::table::{Table, Value};
use std::collections::BTreeMap;

/// Running state threaded through the per-ticker walk.
#[derive(Debug, Clone, Copy)]
struct SliceAccumulator {
    next_index: usize,
    buy_qty: f64,
    sell_qty: f64,
    rows_seen: usize,
}

impl SliceAccumulator {
    fn new() -> Self {
        SliceAccumulator {
            next_index: 0,
            buy_qty: 0.0,
            sell_qty: 0.0,
            rows_seen: 0,
        }
    }

    /// `rows_seen` counts rows of the current ticker, not of the current
    /// slice; it decides when the ticker's last row forces closure.
    fn start_ticker(&mut self) {
        self.buy_qty = 0.0;
        self.sell_qty = 0.0;
        self.rows_seen = 0;
    }

    fn close_slice(&mut self) {
        self.next_index += 1;
        self.buy_qty = 0.0;
        self.sell_qty = 0.0;
    }
}

/// Row indices in ascending date order. The sort is stable, so rows
/// sharing a date keep their original relative order — a load-bearing
/// tie-break: it decides which rows land in which slice.
pub fn date_sorted_order(table: &Table, date: ColumnHandle) -> Vec<usize> {
    let mut order: Vec<usize> = (0..table.row_count()).collect();
    order.sort_by_key(|&row| table.value(row, date).as_date());
    order
}

/// Assign `slice_index` and `slice_state` to every ledger row. Returns the
/// number of slices created.
///
/// Runs to completion on any reconciled table, including the empty one.
pub fn assign_slices(ledger: &mut Ledger) -> usize {
    let order = date_sorted_order(&ledger.table, ledger.cols.date);
    let tickers = ledger.tickers();
    let slice_index = ledger.cols.slice_index;
    let ticker_col = ledger.cols.ticker;

    let mut acc = SliceAccumulator::new();
    for ticker in &tickers {
        let rows: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&row| {
                ledger
                    .table
                    .value(row, ticker_col)
                    .as_text()
                    .is_some_and(|t| t == ticker)
            })
            .collect();
        let total = rows.len();

        acc.start_ticker();
        for row in rows {
            match ledger.operation_at(row) {
                Some(Operation::Buy) => acc.buy_qty += ledger.quantity_at(row),
                Some(Operation::Sell) => acc.sell_qty += ledger.quantity_at(row),
                _ => {}
            }
            ledger
                .table
                .set_value(row, slice_index, Value::Num(acc.next_index as f64));
            acc.rows_seen += 1;

            // Exact f64 equality, including the initial 0 == 0 when a
            // slice opens with a non-buy/sell row. The ticker's last row
            // always closes, so a trailing open slice still consumes an
            // index and the counter stays unique across tickers.
            if acc.buy_qty == acc.sell_qty || acc.rows_seen == total {
                acc.close_slice();
            }
        }
    }

    assign_states(ledger);
    acc.next_index
}

/// A slice is closed iff its buy-quantity sum equals its sell-quantity
/// sum. Both sums are zero for a slice made only of non-buy/sell rows, so
/// such a slice is closed by definition.
fn assign_states(ledger: &mut Ledger) {
    let mut balances: BTreeMap<usize, (f64, f64)> = BTreeMap::new();
    for row in 0..ledger.table.row_count() {
        let index = match ledger.table.value(row, ledger.cols.slice_index).as_num() {
            Some(n) => n as usize,
            None => continue,
        };
        let entry = balances.entry(index).or_insert((0.0, 0.0));
        match ledger.operation_at(row) {
            Some(Operation::Buy) => entry.0 += ledger.quantity_at(row),
            Some(Operation::Sell) => entry.1 += ledger.quantity_at(row),
            _ => {}
        }
    }

    let slice_index = ledger.cols.slice_index;
    let slice_state = ledger.cols.slice_state;
    for row in 0..ledger.table.row_count() {
        let index = match ledger.table.value(row, slice_index).as_num() {
            Some(n) => n as usize,
            None => continue,
        };
        let (buy, sell) = balances[&index];
        let state = if buy == sell {
            SliceState::Closed
        } else {
            SliceState::Opened
        };
        ledger
            .table
            .set_value(row, slice_state, Value::Text(state.label().to_string()));
    }
}

/// Rows of each slice, keyed by ascending slice index, in processing
/// (date-sorted) order.
pub fn slice_rows(ledger: &Ledger) -> BTreeMap<usize, Vec<usize>> {
    let order = date_sorted_order(&ledger.table, ledger.cols.date);
    let mut slices: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for row in order {
        if let Some(index) = ledger.table.value(row, ledger.cols.slice_index).as_num() {
            slices.entry(index as usize).or_default().push(row);
        }
    }
    slices
}

/// State of one slice, read off its first row.
pub fn slice_state(ledger: &Ledger, rows: &[usize]) -> Option<SliceState> {
    rows.first().and_then(|&row| {
        ledger
            .table
            .value(row, ledger.cols.slice_state)
            .as_text()
            .and_then(SliceState::parse)
    })
}
