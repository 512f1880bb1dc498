//! The reconciled transaction table and its once-per-load derived columns.

use crate::domain::error::FolioError;
use crate::domain::schema::{ColumnHandle, LedgerSchema, Operation};
use crate::domain::table::{RawTable, Table, Value};

/// An investment-transaction table reconciled to the ledger schema, with
/// all derived columns computed.
///
/// Derived columns are recomputed in full on every load; nothing is
/// patched incrementally.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub table: Table,
    pub cols: LedgerSchema,
}

impl Ledger {
    pub fn empty() -> Ledger {
        let (schema, cols) = LedgerSchema::build();
        Ledger {
            table: Table::empty(schema),
            cols,
        }
    }

    pub fn from_raw(raw: &RawTable) -> Result<Ledger, FolioError> {
        let (schema, cols) = LedgerSchema::build();
        let table = Table::reconcile(raw, schema)?;
        let mut ledger = Ledger { table, cols };
        ledger.compute_derived_columns();
        Ok(ledger)
    }

    /// `total_price`, `total_costs` and `total_earnings` are computed only
    /// when the input file did not carry them already; the four
    /// operation-conditioned amount columns are always rebuilt.
    fn compute_derived_columns(&mut self) {
        let c = self.cols.clone();

        if !self.table.is_user_supplied(c.total_price) {
            self.table
                .multiply_into(c.quantity, c.unit_price, c.total_price);
        }
        if !self.table.is_user_supplied(c.total_costs) {
            self.table
                .sum_into(c.withholding_tax, c.taxes, c.total_costs);
        }
        if !self.table.is_user_supplied(c.total_earnings) {
            self.table
                .sum_into(c.dividends, c.interest_income, c.total_earnings);
        }

        self.set_amount_column(Operation::Contribution, c.contribution_amount);
        self.set_amount_column(Operation::Rescue, c.rescue_amount);
        self.set_amount_column(Operation::Buy, c.buy_amount);
        self.set_amount_column(Operation::Sell, c.sell_amount);
    }

    /// Copy `total_price` into `target`, then blank out every row whose
    /// operation does not match.
    fn set_amount_column(&mut self, op: Operation, target: ColumnHandle) {
        let c = self.cols.clone();
        self.table.copy_into(c.total_price, target);
        self.table.replace_except(
            target,
            Value::Missing,
            c.operation,
            &Value::Text(op.label().to_string()),
        );
    }

    /// Distinct tickers present in the ledger, ascending.
    pub fn tickers(&self) -> Vec<String> {
        self.table
            .non_duplicate_values(self.cols.ticker, true, true)
            .into_iter()
            .filter_map(|v| v.as_text().map(str::to_string))
            .collect()
    }

    pub fn operation_at(&self, row: usize) -> Option<Operation> {
        self.table
            .value(row, self.cols.operation)
            .as_text()
            .and_then(Operation::parse)
    }

    /// Quantity with missing values read as zero.
    pub fn quantity_at(&self, row: usize) -> f64 {
        self.table
            .value(row, self.cols.quantity)
            .as_num()
            .unwrap_or(0.0)
    }
}
