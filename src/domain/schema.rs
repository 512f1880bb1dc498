//! Column schemas for the ledger and report tables.
//!
//! A [`Schema`] is an ordered list of named, typed columns. Registration
//! order is significant: it defines both the display order and the order in
//! which a raw input table is reconciled.

/// The value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Date,
    Currency,
    Percentage,
    Number,
}

/// Opaque reference to a column within its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHandle(pub(crate) usize);

#[derive(Debug, Clone)]
struct ColumnDef {
    name: String,
    ty: ColumnType,
}

/// Ordered, typed column registry.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, ty: ColumnType) -> ColumnHandle {
        self.columns.push(ColumnDef {
            name: name.to_string(),
            ty,
        });
        ColumnHandle(self.columns.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn name(&self, handle: ColumnHandle) -> &str {
        &self.columns[handle.0].name
    }

    pub fn column_type(&self, handle: ColumnHandle) -> ColumnType {
        self.columns[handle.0].ty
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn handles(&self) -> impl Iterator<Item = ColumnHandle> {
        (0..self.columns.len()).map(ColumnHandle)
    }

    pub fn handle_of(&self, name: &str) -> Option<ColumnHandle> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .map(ColumnHandle)
    }
}

/// Transaction kind recorded in the `operation` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Buy,
    Sell,
    Rescue,
    Contribution,
    Income,
    Charge,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Buy,
        Operation::Sell,
        Operation::Rescue,
        Operation::Contribution,
        Operation::Income,
        Operation::Charge,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Operation::Buy => "buy",
            Operation::Sell => "sell",
            Operation::Rescue => "rescue",
            Operation::Contribution => "contribution",
            Operation::Income => "income",
            Operation::Charge => "charge",
        }
    }

    pub fn parse(s: &str) -> Option<Operation> {
        Operation::ALL.into_iter().find(|op| op.label() == s)
    }
}

/// Whether a slice's buy and sell quantities balance out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceState {
    Opened,
    Closed,
}

impl SliceState {
    pub fn label(&self) -> &'static str {
        match self {
            SliceState::Opened => "opened",
            SliceState::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<SliceState> {
        match s {
            "opened" => Some(SliceState::Opened),
            "closed" => Some(SliceState::Closed),
            _ => None,
        }
    }
}

/// Handles for every column of the transaction table.
///
/// The first block is what the user's ledger file carries; the rest is
/// derived once per load (`total_price` through `sell_amount`) or by the
/// slicer (`slice_index`, `slice_state`).
#[derive(Debug, Clone)]
pub struct LedgerSchema {
    pub date: ColumnHandle,
    pub market: ColumnHandle,
    pub ticker: ColumnHandle,
    pub operation: ColumnHandle,
    pub hired_rate: ColumnHandle,
    pub indexer: ColumnHandle,
    pub due_date: ColumnHandle,
    pub quantity: ColumnHandle,
    pub unit_price: ColumnHandle,
    pub taxes: ColumnHandle,
    pub withholding_tax: ColumnHandle,
    pub dividends: ColumnHandle,
    pub interest_income: ColumnHandle,
    pub notes: ColumnHandle,
    pub total_price: ColumnHandle,
    pub total_costs: ColumnHandle,
    pub total_earnings: ColumnHandle,
    pub contribution_amount: ColumnHandle,
    pub rescue_amount: ColumnHandle,
    pub buy_amount: ColumnHandle,
    pub sell_amount: ColumnHandle,
    pub slice_index: ColumnHandle,
    pub slice_state: ColumnHandle,
}

impl LedgerSchema {
    pub fn build() -> (Schema, LedgerSchema) {
        let mut s = Schema::new();
        let cols = LedgerSchema {
            date: s.define("date", ColumnType::Date),
            market: s.define("market", ColumnType::Text),
            ticker: s.define("ticker", ColumnType::Text),
            operation: s.define("operation", ColumnType::Text),
            hired_rate: s.define("hired_rate", ColumnType::Percentage),
            indexer: s.define("indexer", ColumnType::Text),
            due_date: s.define("due_date", ColumnType::Date),
            quantity: s.define("quantity", ColumnType::Number),
            unit_price: s.define("unit_price", ColumnType::Currency),
            taxes: s.define("taxes", ColumnType::Currency),
            withholding_tax: s.define("withholding_tax", ColumnType::Currency),
            dividends: s.define("dividends", ColumnType::Currency),
            interest_income: s.define("interest_income", ColumnType::Currency),
            notes: s.define("notes", ColumnType::Text),
            total_price: s.define("total_price", ColumnType::Currency),
            total_costs: s.define("total_costs", ColumnType::Currency),
            total_earnings: s.define("total_earnings", ColumnType::Currency),
            contribution_amount: s.define("contribution_amount", ColumnType::Currency),
            rescue_amount: s.define("rescue_amount", ColumnType::Currency),
            buy_amount: s.define("buy_amount", ColumnType::Currency),
            sell_amount: s.define("sell_amount", ColumnType::Currency),
            slice_index: s.define("slice_index", ColumnType::Number),
            slice_state: s.define("slice_state", ColumnType::Text),
        };
        (s, cols)
    }
}

/// Handles for every column of the closed-position report table.
#[derive(Debug, Clone)]
pub struct ReportSchema {
    pub market: ColumnHandle,
    pub ticker: ColumnHandle,
    pub indexer: ColumnHandle,
    pub yield_min: ColumnHandle,
    pub yield_max: ColumnHandle,
    pub initial_date: ColumnHandle,
    pub final_date: ColumnHandle,
    pub buy_quantity: ColumnHandle,
    pub mean_buy_price: ColumnHandle,
    pub buy_taxes: ColumnHandle,
    pub buy_withholding_tax: ColumnHandle,
    pub buy_costs: ColumnHandle,
    pub mean_buy_price_with_costs: ColumnHandle,
    pub total_buy_amount: ColumnHandle,
    pub buy_cost_basis: ColumnHandle,
    pub sell_quantity: ColumnHandle,
    pub mean_sell_price: ColumnHandle,
    pub sell_taxes: ColumnHandle,
    pub sell_withholding_tax: ColumnHandle,
    pub sell_costs: ColumnHandle,
    pub mean_sell_price_with_costs: ColumnHandle,
    pub total_sell_amount: ColumnHandle,
    pub sell_net_proceeds: ColumnHandle,
    pub additional_taxes: ColumnHandle,
    pub total_taxes: ColumnHandle,
    pub additional_withholding_tax: ColumnHandle,
    pub total_withholding_tax: ColumnHandle,
    pub total_costs: ColumnHandle,
    pub dividends: ColumnHandle,
    pub interest_income: ColumnHandle,
    pub total_earnings: ColumnHandle,
    pub delta: ColumnHandle,
    pub gross_margin: ColumnHandle,
    pub gross_margin_pct: ColumnHandle,
    pub net_margin: ColumnHandle,
    pub net_margin_pct: ColumnHandle,
}

impl ReportSchema {
    pub fn build() -> (Schema, ReportSchema) {
        let mut s = Schema::new();
        let cols = ReportSchema {
            market: s.define("market", ColumnType::Text),
            ticker: s.define("ticker", ColumnType::Text),
            indexer: s.define("indexer", ColumnType::Text),
            yield_min: s.define("yield_min", ColumnType::Percentage),
            yield_max: s.define("yield_max", ColumnType::Percentage),
            initial_date: s.define("initial_date", ColumnType::Date),
            final_date: s.define("final_date", ColumnType::Date),
            buy_quantity: s.define("buy_quantity", ColumnType::Number),
            mean_buy_price: s.define("mean_buy_price", ColumnType::Currency),
            buy_taxes: s.define("buy_taxes", ColumnType::Currency),
            buy_withholding_tax: s.define("buy_withholding_tax", ColumnType::Currency),
            buy_costs: s.define("buy_costs", ColumnType::Currency),
            mean_buy_price_with_costs: s.define("mean_buy_price_with_costs", ColumnType::Currency),
            total_buy_amount: s.define("total_buy_amount", ColumnType::Currency),
            buy_cost_basis: s.define("buy_cost_basis", ColumnType::Currency),
            sell_quantity: s.define("sell_quantity", ColumnType::Number),
            mean_sell_price: s.define("mean_sell_price", ColumnType::Currency),
            sell_taxes: s.define("sell_taxes", ColumnType::Currency),
            sell_withholding_tax: s.define("sell_withholding_tax", ColumnType::Currency),
            sell_costs: s.define("sell_costs", ColumnType::Currency),
            mean_sell_price_with_costs: s
                .define("mean_sell_price_with_costs", ColumnType::Currency),
            total_sell_amount: s.define("total_sell_amount", ColumnType::Currency),
            sell_net_proceeds: s.define("sell_net_proceeds", ColumnType::Currency),
            additional_taxes: s.define("additional_taxes", ColumnType::Currency),
            total_taxes: s.define("total_taxes", ColumnType::Currency),
            additional_withholding_tax: s
                .define("additional_withholding_tax", ColumnType::Currency),
            total_withholding_tax: s.define("total_withholding_tax", ColumnType::Currency),
            total_costs: s.define("total_costs", ColumnType::Currency),
            dividends: s.define("dividends", ColumnType::Currency),
            interest_income: s.define("interest_income", ColumnType::Currency),
            total_earnings: s.define("total_earnings", ColumnType::Currency),
            delta: s.define("delta", ColumnType::Currency),
            gross_margin: s.define("gross_margin", ColumnType::Currency),
            gross_margin_pct: s.define("gross_margin_pct", ColumnType::Percentage),
            net_margin: s.define("net_margin", ColumnType::Currency),
            net_margin_pct: s.define("net_margin_pct", ColumnType::Percentage),
        };
        (s, cols)
    }
}
