//! Typed, column-oriented table with in-place column arithmetic.
//!
//! [`Table::reconcile`] turns an arbitrary raw input table into a table
//! matching a [`Schema`]: missing columns are created filled with the
//! type's empty value, extra columns are dropped, and each kept column is
//! coerced to its declared type. All arithmetic helpers recompute their
//! output column from scratch, so re-running them with the same inputs is
//! idempotent.

use crate::domain::error::FolioError;
use crate::domain::schema::{ColumnHandle, ColumnType, Schema};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// A single cell. `Missing` is the explicit no-data marker, distinct from
/// `0.0` and from the empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Text(String),
    Date(NaiveDate),
    Num(f64),
}

impl Value {
    /// Canonical empty value for a column type: empty string for text,
    /// 0.0 for the numeric types. An empty date has no in-band
    /// representation, so date columns fall back to `Missing` (rendered
    /// blank).
    pub fn empty_for(ty: ColumnType) -> Value {
        match ty {
            ColumnType::Text => Value::Text(String::new()),
            ColumnType::Date => Value::Missing,
            ColumnType::Currency | ColumnType::Percentage | ColumnType::Number => Value::Num(0.0),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Total ordering for sorting distinct values. Values of the same
    /// variant compare naturally; mixed variants order by variant.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Missing => 0,
                Value::Text(_) => 1,
                Value::Date(_) => 2,
                Value::Num(_) => 3,
            }
        }
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Num(a), Value::Num(b)) => a.total_cmp(b),
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }

    fn coerce(raw: &str, ty: ColumnType) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::empty_for(ty);
        }
        match ty {
            ColumnType::Text => Value::Text(trimmed.to_string()),
            ColumnType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Value::Date)
                .unwrap_or_else(|_| Value::empty_for(ty)),
            ColumnType::Currency | ColumnType::Percentage | ColumnType::Number => trimmed
                .parse::<f64>()
                .map(Value::Num)
                .unwrap_or_else(|_| Value::empty_for(ty)),
        }
    }
}

/// Unreconciled tabular input: header names plus string rows, exactly as an
/// ingestion adapter produced them.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Whether a column's data came from the input file or was created at
/// reconcile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    UserSupplied,
    ComputedDefault,
}

/// Column-major table conforming to a [`Schema`].
#[derive(Debug, Clone)]
pub struct Table {
    schema: Schema,
    columns: Vec<Vec<Value>>,
    provenance: Vec<Provenance>,
    rows: usize,
}

impl Table {
    pub fn empty(schema: Schema) -> Self {
        let n = schema.len();
        Table {
            schema,
            columns: vec![Vec::new(); n],
            provenance: vec![Provenance::ComputedDefault; n],
            rows: 0,
        }
    }

    /// Reconcile a raw input table against `schema`.
    ///
    /// Fails only when the input is not tabular (a row with a different
    /// cell count than the header row).
    pub fn reconcile(raw: &RawTable, schema: Schema) -> Result<Table, FolioError> {
        for (i, row) in raw.rows.iter().enumerate() {
            if row.len() != raw.headers.len() {
                return Err(FolioError::SchemaMismatch {
                    reason: format!(
                        "row {} has {} cells, expected {}",
                        i + 1,
                        row.len(),
                        raw.headers.len()
                    ),
                });
            }
        }

        let rows = raw.rows.len();
        let mut columns = Vec::with_capacity(schema.len());
        let mut provenance = Vec::with_capacity(schema.len());

        for handle in schema.handles() {
            let name = schema.name(handle);
            let ty = schema.column_type(handle);
            match raw.headers.iter().position(|h| h == name) {
                Some(pos) => {
                    columns.push(
                        raw.rows
                            .iter()
                            .map(|row| Value::coerce(&row[pos], ty))
                            .collect(),
                    );
                    provenance.push(Provenance::UserSupplied);
                }
                None => {
                    columns.push(vec![Value::empty_for(ty); rows]);
                    provenance.push(Provenance::ComputedDefault);
                }
            }
        }

        Ok(Table {
            schema,
            columns,
            provenance,
            rows,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn is_user_supplied(&self, handle: ColumnHandle) -> bool {
        self.provenance[handle.0] == Provenance::UserSupplied
    }

    pub fn value(&self, row: usize, handle: ColumnHandle) -> &Value {
        &self.columns[handle.0][row]
    }

    pub fn set_value(&mut self, row: usize, handle: ColumnHandle, value: Value) {
        self.columns[handle.0][row] = value;
    }

    pub fn column(&self, handle: ColumnHandle) -> &[Value] {
        &self.columns[handle.0]
    }

    /// Append a row of per-type empty values; returns the new row's index.
    pub fn push_empty_row(&mut self) -> usize {
        for handle in self.schema.handles() {
            let empty = Value::empty_for(self.schema.column_type(handle));
            self.columns[handle.0].push(empty);
        }
        self.rows += 1;
        self.rows - 1
    }

    fn binary_op<F>(&mut self, a: ColumnHandle, b: ColumnHandle, out: ColumnHandle, op: F)
    where
        F: Fn(f64, f64) -> Value,
    {
        for row in 0..self.rows {
            let result = match (&self.columns[a.0][row], &self.columns[b.0][row]) {
                (Value::Num(x), Value::Num(y)) => op(*x, *y),
                _ => Value::Missing,
            };
            self.columns[out.0][row] = result;
        }
    }

    pub fn sum_into(&mut self, a: ColumnHandle, b: ColumnHandle, out: ColumnHandle) {
        self.binary_op(a, b, out, |x, y| Value::Num(x + y));
    }

    pub fn subtract_into(&mut self, a: ColumnHandle, b: ColumnHandle, out: ColumnHandle) {
        self.binary_op(a, b, out, |x, y| Value::Num(x - y));
    }

    pub fn multiply_into(&mut self, a: ColumnHandle, b: ColumnHandle, out: ColumnHandle) {
        self.binary_op(a, b, out, |x, y| Value::Num(x * y));
    }

    /// Divide `a` by `b`; a zero or missing denominator yields `Missing`,
    /// never an error and never infinity.
    pub fn divide_into(&mut self, a: ColumnHandle, b: ColumnHandle, out: ColumnHandle) {
        self.binary_op(a, b, out, |x, y| {
            if y == 0.0 {
                Value::Missing
            } else {
                Value::Num(x / y)
            }
        });
    }

    pub fn copy_into(&mut self, src: ColumnHandle, out: ColumnHandle) {
        self.columns[out.0] = self.columns[src.0].clone();
    }

    /// Set every cell of `target` to `value`, except on rows where
    /// `cond` equals `cond_value`.
    pub fn replace_except(
        &mut self,
        target: ColumnHandle,
        value: Value,
        cond: ColumnHandle,
        cond_value: &Value,
    ) {
        for row in 0..self.rows {
            if &self.columns[cond.0][row] != cond_value {
                self.columns[target.0][row] = value.clone();
            }
        }
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: Fn(usize) -> bool,
    {
        let kept: Vec<usize> = (0..self.rows).filter(|&row| keep(row)).collect();
        for column in &mut self.columns {
            *column = kept.iter().map(|&row| column[row].clone()).collect();
        }
        self.rows = kept.len();
    }

    /// Distinct values of a column, in first-occurrence order unless
    /// `sorted`.
    pub fn non_duplicate_values(
        &self,
        handle: ColumnHandle,
        drop_missing: bool,
        sorted: bool,
    ) -> Vec<Value> {
        let mut seen: Vec<Value> = Vec::new();
        for value in &self.columns[handle.0] {
            if drop_missing && value.is_missing() {
                continue;
            }
            if !seen.contains(value) {
                seen.push(value.clone());
            }
        }
        if sorted {
            seen.sort_by(|a, b| a.sort_cmp(b));
        }
        seen
    }
}
