//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_ledger_adapter::CsvLedgerAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::FolioError;
use crate::domain::ledger::Ledger;
use crate::domain::report::closed_position_report;
use crate::domain::schema::SliceState;
use crate::domain::slicer::assign_slices;
use crate::domain::statistics::FlowStatistics;
use crate::domain::table::Table;
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerSource;
use crate::ports::report_port::ReportSink;

#[derive(Parser, Debug)]
#[command(name = "folio", about = "Closed-position analysis for an investment ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the closed-position report from a ledger file
    Report {
        #[arg(short, long)]
        ledger: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the ledger history tagged with slice index and state
    History {
        #[arg(short, long)]
        ledger: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Keep only opened or closed slices
        #[arg(long)]
        state: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Contribution/rescue and buy/sell flow statistics
    Stats {
        #[arg(short, long)]
        ledger: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List distinct tickers present in the ledger
    Tickers {
        #[arg(short, long)]
        ledger: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Report {
            ledger,
            config,
            output,
        } => run_report(ledger, config, output),
        Command::History {
            ledger,
            config,
            state,
            output,
        } => run_history(ledger, config, state.as_deref(), output),
        Command::Stats { ledger, config } => run_stats(ledger, config),
        Command::Tickers { ledger, config } => run_tickers(ledger, config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn load_optional_config(
    config: Option<&PathBuf>,
) -> Result<Option<FileConfigAdapter>, FolioError> {
    match config {
        Some(path) => Ok(Some(load_config(path)?)),
        None => Ok(None),
    }
}

/// The ledger file comes from the flag when given, otherwise from
/// `[ledger] path` in the config file.
fn resolve_ledger_path(
    flag: Option<PathBuf>,
    config: Option<&FileConfigAdapter>,
) -> Result<PathBuf, FolioError> {
    if let Some(path) = flag {
        return Ok(path);
    }
    config
        .and_then(|c| c.get_string("ledger", "path"))
        .map(PathBuf::from)
        .ok_or_else(|| FolioError::ConfigMissing {
            section: "ledger".into(),
            key: "path".into(),
        })
}

/// Output destination: the flag, else `[report] output` from the config
/// file, else stdout.
fn resolve_output(flag: Option<PathBuf>, config: Option<&FileConfigAdapter>) -> Option<PathBuf> {
    flag.or_else(|| {
        config
            .and_then(|c| c.get_string("report", "output"))
            .map(PathBuf::from)
    })
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, FolioError> {
    FileConfigAdapter::from_file(path).map_err(|e| FolioError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_sliced_ledger(path: &PathBuf) -> Result<Ledger, FolioError> {
    eprintln!("Loading ledger from {}", path.display());
    let raw = CsvLedgerAdapter::new().load(path)?;
    let mut ledger = Ledger::from_raw(&raw)?;
    let slices = assign_slices(&mut ledger);
    eprintln!(
        "Loaded {} transactions across {} slices",
        ledger.table.row_count(),
        slices
    );
    Ok(ledger)
}

fn emit_table(table: &Table, output: Option<PathBuf>) -> Result<(), FolioError> {
    let sink = CsvReportAdapter::new();
    match output {
        Some(path) => {
            sink.write(table, &path)?;
            eprintln!("Wrote {}", path.display());
            Ok(())
        }
        None => {
            print!("{}", sink.render(table)?);
            Ok(())
        }
    }
}

fn run_report(
    ledger_flag: Option<PathBuf>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), FolioError> {
    let cfg = load_optional_config(config.as_ref())?;
    let path = resolve_ledger_path(ledger_flag, cfg.as_ref())?;
    let ledger = load_sliced_ledger(&path)?;
    let report = closed_position_report(&ledger);
    eprintln!("{} closed positions", report.row_count());
    emit_table(&report, resolve_output(output, cfg.as_ref()))
}

fn run_history(
    ledger_flag: Option<PathBuf>,
    config: Option<PathBuf>,
    state: Option<&str>,
    output: Option<PathBuf>,
) -> Result<(), FolioError> {
    let wanted = match state {
        Some(s) => Some(SliceState::parse(s).ok_or_else(|| FolioError::ConfigInvalid {
            section: "history".into(),
            key: "state".into(),
            reason: format!("expected 'opened' or 'closed', got '{s}'"),
        })?),
        None => None,
    };

    let cfg = load_optional_config(config.as_ref())?;
    let path = resolve_ledger_path(ledger_flag, cfg.as_ref())?;
    let ledger = load_sliced_ledger(&path)?;

    let mut table = ledger.table.clone();
    if let Some(state) = wanted {
        let state_col = ledger.cols.slice_state;
        table.retain_rows(|row| {
            ledger
                .table
                .value(row, state_col)
                .as_text()
                .and_then(SliceState::parse)
                == Some(state)
        });
    }
    emit_table(&table, resolve_output(output, cfg.as_ref()))
}

fn run_stats(ledger_flag: Option<PathBuf>, config: Option<PathBuf>) -> Result<(), FolioError> {
    let cfg = load_optional_config(config.as_ref())?;
    let path = resolve_ledger_path(ledger_flag, cfg.as_ref())?;
    let ledger = load_sliced_ledger(&path)?;

    let flows = FlowStatistics::from_columns(
        &ledger.table,
        ledger.cols.contribution_amount,
        ledger.cols.rescue_amount,
    );
    let trades = FlowStatistics::from_columns(
        &ledger.table,
        ledger.cols.buy_amount,
        ledger.cols.sell_amount,
    );

    println!(
        "contributions: {:.2} [{}]",
        flows.positive_sum, flows.positive_count
    );
    println!(
        "rescues:       {:.2} [{}]",
        flows.negative_sum, flows.negative_count
    );
    println!(
        "net flow:      {:.2} [{}]",
        flows.delta_sum(),
        flows.delta_count()
    );
    println!(
        "buys:          {:.2} [{}]",
        trades.positive_sum, trades.positive_count
    );
    println!(
        "sells:         {:.2} [{}]",
        trades.negative_sum, trades.negative_count
    );
    println!(
        "net traded:    {:.2} [{}]",
        trades.delta_sum(),
        trades.delta_count()
    );
    Ok(())
}

fn run_tickers(ledger_flag: Option<PathBuf>, config: Option<PathBuf>) -> Result<(), FolioError> {
    let cfg = load_optional_config(config.as_ref())?;
    let path = resolve_ledger_path(ledger_flag, cfg.as_ref())?;
    let raw = CsvLedgerAdapter::new().load(&path)?;
    let ledger = Ledger::from_raw(&raw)?;
    for ticker in ledger.tickers() {
        println!("{ticker}");
    }
    Ok(())
}

/// Convenience for tests and embedding: full pipeline from a CSV file on
/// disk to the rendered closed-position report.
pub fn report_from_file(path: &PathBuf) -> Result<String, FolioError> {
    let ledger = load_sliced_ledger(path)?;
    let report = closed_position_report(&ledger);
    CsvReportAdapter::new().render(&report)
}
