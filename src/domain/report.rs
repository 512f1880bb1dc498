//! Closed-position aggregator.
//!
//! Two-phase pipeline over the sliced ledger: a row-wise phase extracts
//! per-slice facts (first values, min/max bounds, restricted sums) into one
//! report row per closed slice, then a column-wise phase derives the
//! economics (mean prices, cost bases, margins) with table arithmetic.
//! Rows follow ascending slice index, i.e. ascending time of first
//! occurrence.

use crate::domain::ledger::Ledger;
use crate::domain::schema::{ColumnHandle, Operation, ReportSchema, SliceState};
use crate::domain::slicer::{slice_rows, slice_state};
use crate::domain::table::{Table, Value};

/// One closed-position slice of the ledger, in processing order.
struct SliceView<'a> {
    ledger: &'a Ledger,
    rows: &'a [usize],
}

impl SliceView<'_> {
    fn first_value(&self, handle: ColumnHandle) -> Value {
        self.rows
            .first()
            .map(|&row| self.ledger.table.value(row, handle).clone())
            .unwrap_or(Value::Missing)
    }

    /// Sum of a numeric column, optionally restricted to one operation.
    /// Missing cells contribute nothing.
    fn sum(&self, handle: ColumnHandle, op: Option<Operation>) -> f64 {
        self.rows
            .iter()
            .filter(|&&row| op.is_none() || self.ledger.operation_at(row) == op)
            .filter_map(|&row| self.ledger.table.value(row, handle).as_num())
            .sum()
    }

    /// Min and max of a numeric column over buy rows; (0.0, 0.0) when the
    /// slice has no buy rows.
    fn buy_min_max(&self, handle: ColumnHandle) -> (f64, f64) {
        let mut bounds: Option<(f64, f64)> = None;
        for &row in self.rows {
            if self.ledger.operation_at(row) != Some(Operation::Buy) {
                continue;
            }
            if let Some(n) = self.ledger.table.value(row, handle).as_num() {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(n), hi.max(n)),
                    None => (n, n),
                });
            }
        }
        bounds.unwrap_or((0.0, 0.0))
    }

    /// Min and max of a date column over all rows; Missing when no row
    /// carries a date.
    fn date_bounds(&self, handle: ColumnHandle) -> (Value, Value) {
        let dates: Vec<_> = self
            .rows
            .iter()
            .filter_map(|&row| self.ledger.table.value(row, handle).as_date())
            .collect();
        match (dates.iter().min(), dates.iter().max()) {
            (Some(&lo), Some(&hi)) => (Value::Date(lo), Value::Date(hi)),
            _ => (Value::Missing, Value::Missing),
        }
    }
}

/// Build the closed-position report table from a sliced ledger.
///
/// An empty ledger, or one with no closed slices, yields an empty report.
pub fn closed_position_report(ledger: &Ledger) -> Table {
    let (schema, rc) = ReportSchema::build();
    let mut report = Table::empty(schema);

    for (_, rows) in slice_rows(ledger) {
        if slice_state(ledger, &rows) != Some(SliceState::Closed) {
            continue;
        }
        append_slice_row(&mut report, &rc, SliceView { ledger, rows: &rows });
    }

    derive_report_columns(&mut report, &rc);
    report
}

/// Row-wise phase: one report row per closed slice.
fn append_slice_row(report: &mut Table, rc: &ReportSchema, slice: SliceView<'_>) {
    let lc = &slice.ledger.cols;
    let row = report.push_empty_row();

    report.set_value(row, rc.market, slice.first_value(lc.market));
    report.set_value(row, rc.ticker, slice.first_value(lc.ticker));
    report.set_value(row, rc.indexer, slice.first_value(lc.indexer));

    let (yield_min, yield_max) = slice.buy_min_max(lc.hired_rate);
    report.set_value(row, rc.yield_min, Value::Num(yield_min));
    report.set_value(row, rc.yield_max, Value::Num(yield_max));

    let (initial, last) = slice.date_bounds(lc.date);
    report.set_value(row, rc.initial_date, initial);
    report.set_value(row, rc.final_date, last);

    let buy = Some(Operation::Buy);
    report.set_value(row, rc.buy_quantity, Value::Num(slice.sum(lc.quantity, buy)));
    report.set_value(
        row,
        rc.total_buy_amount,
        Value::Num(slice.sum(lc.buy_amount, buy)),
    );
    report.set_value(
        row,
        rc.buy_withholding_tax,
        Value::Num(slice.sum(lc.withholding_tax, buy)),
    );
    report.set_value(row, rc.buy_taxes, Value::Num(slice.sum(lc.taxes, buy)));

    let sell = Some(Operation::Sell);
    report.set_value(
        row,
        rc.sell_quantity,
        Value::Num(slice.sum(lc.quantity, sell)),
    );
    report.set_value(
        row,
        rc.total_sell_amount,
        Value::Num(slice.sum(lc.sell_amount, sell)),
    );
    report.set_value(
        row,
        rc.sell_withholding_tax,
        Value::Num(slice.sum(lc.withholding_tax, sell)),
    );
    report.set_value(row, rc.sell_taxes, Value::Num(slice.sum(lc.taxes, sell)));

    report.set_value(row, rc.total_taxes, Value::Num(slice.sum(lc.taxes, None)));
    report.set_value(
        row,
        rc.total_withholding_tax,
        Value::Num(slice.sum(lc.withholding_tax, None)),
    );
    report.set_value(row, rc.dividends, Value::Num(slice.sum(lc.dividends, None)));
    report.set_value(
        row,
        rc.interest_income,
        Value::Num(slice.sum(lc.interest_income, None)),
    );
}

/// Column-wise phase, run once after all rows are emitted.
fn derive_report_columns(report: &mut Table, rc: &ReportSchema) {
    // Per-side costs.
    report.sum_into(rc.buy_taxes, rc.buy_withholding_tax, rc.buy_costs);
    report.sum_into(rc.sell_taxes, rc.sell_withholding_tax, rc.sell_costs);

    // Buy side: costs raise the effective buy price.
    report.divide_into(rc.total_buy_amount, rc.buy_quantity, rc.mean_buy_price);
    report.sum_into(rc.total_buy_amount, rc.buy_costs, rc.buy_cost_basis);
    report.divide_into(rc.buy_cost_basis, rc.buy_quantity, rc.mean_buy_price_with_costs);

    // Sell side: costs reduce what the seller nets.
    report.divide_into(rc.total_sell_amount, rc.sell_quantity, rc.mean_sell_price);
    report.subtract_into(rc.total_sell_amount, rc.sell_costs, rc.sell_net_proceeds);
    report.divide_into(
        rc.sell_net_proceeds,
        rc.sell_quantity,
        rc.mean_sell_price_with_costs,
    );

    report.sum_into(rc.total_taxes, rc.total_withholding_tax, rc.total_costs);

    // additional = total - (buy-side + sell-side), staged through the
    // output column itself.
    report.sum_into(rc.buy_taxes, rc.sell_taxes, rc.additional_taxes);
    report.subtract_into(rc.total_taxes, rc.additional_taxes, rc.additional_taxes);
    report.sum_into(
        rc.buy_withholding_tax,
        rc.sell_withholding_tax,
        rc.additional_withholding_tax,
    );
    report.subtract_into(
        rc.total_withholding_tax,
        rc.additional_withholding_tax,
        rc.additional_withholding_tax,
    );

    report.sum_into(rc.dividends, rc.interest_income, rc.total_earnings);

    report.subtract_into(rc.total_sell_amount, rc.total_buy_amount, rc.delta);
    report.sum_into(rc.delta, rc.total_earnings, rc.gross_margin);
    report.divide_into(rc.gross_margin, rc.total_buy_amount, rc.gross_margin_pct);
    report.subtract_into(rc.gross_margin, rc.total_costs, rc.net_margin);
    report.divide_into(rc.net_margin, rc.total_buy_amount, rc.net_margin_pct);
}
