//! Shared helpers for integration tests.

#![allow(dead_code)]

use folio::domain::ledger::Ledger;
use folio::domain::slicer::assign_slices;
use folio::domain::table::RawTable;
use chrono::NaiveDate;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One transaction row for building test ledgers.
#[derive(Debug, Clone)]
pub struct Tx {
    pub date: String,
    pub market: String,
    pub ticker: String,
    pub operation: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub taxes: f64,
    pub withholding_tax: f64,
    pub dividends: f64,
    pub interest_income: f64,
    pub hired_rate: f64,
    pub indexer: String,
}

pub fn tx(date: &str, ticker: &str, operation: &str, quantity: f64, unit_price: f64) -> Tx {
    Tx {
        date: date.to_string(),
        market: "stocks".to_string(),
        ticker: ticker.to_string(),
        operation: operation.to_string(),
        quantity,
        unit_price,
        taxes: 0.0,
        withholding_tax: 0.0,
        dividends: 0.0,
        interest_income: 0.0,
        hired_rate: 0.0,
        indexer: String::new(),
    }
}

impl Tx {
    pub fn taxes(mut self, taxes: f64) -> Tx {
        self.taxes = taxes;
        self
    }

    pub fn withholding(mut self, withholding_tax: f64) -> Tx {
        self.withholding_tax = withholding_tax;
        self
    }

    pub fn dividends(mut self, dividends: f64) -> Tx {
        self.dividends = dividends;
        self
    }

    pub fn interest(mut self, interest_income: f64) -> Tx {
        self.interest_income = interest_income;
        self
    }

    pub fn hired_rate(mut self, hired_rate: f64) -> Tx {
        self.hired_rate = hired_rate;
        self
    }

    pub fn indexer(mut self, indexer: &str) -> Tx {
        self.indexer = indexer.to_string();
        self
    }
}

pub fn raw_table(rows: &[Tx]) -> RawTable {
    RawTable {
        headers: vec![
            "date".into(),
            "market".into(),
            "ticker".into(),
            "operation".into(),
            "quantity".into(),
            "unit_price".into(),
            "taxes".into(),
            "withholding_tax".into(),
            "dividends".into(),
            "interest_income".into(),
            "hired_rate".into(),
            "indexer".into(),
        ],
        rows: rows
            .iter()
            .map(|tx| {
                vec![
                    tx.date.clone(),
                    tx.market.clone(),
                    tx.ticker.clone(),
                    tx.operation.clone(),
                    tx.quantity.to_string(),
                    tx.unit_price.to_string(),
                    tx.taxes.to_string(),
                    tx.withholding_tax.to_string(),
                    tx.dividends.to_string(),
                    tx.interest_income.to_string(),
                    tx.hired_rate.to_string(),
                    tx.indexer.clone(),
                ]
            })
            .collect(),
    }
}

/// Ledger with derived columns and slice tags, ready for aggregation.
pub fn sliced_ledger(rows: &[Tx]) -> Ledger {
    let mut ledger = Ledger::from_raw(&raw_table(rows)).unwrap();
    assign_slices(&mut ledger);
    ledger
}

/// Ledger rows as CSV text, for the adapter and CLI tests.
pub fn ledger_csv(rows: &[Tx]) -> String {
    let raw = raw_table(rows);
    let mut out = raw.headers.join(",");
    out.push('\n');
    for row in &raw.rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
