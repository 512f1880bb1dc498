//! CLI integration tests for command dispatch and file wiring.
//!
//! Tests cover:
//! - Ledger path resolution (flag vs `[ledger] path` in the config file)
//! - The report pipeline end to end against real files on disk
//! - History filtering by slice state
//! - Exit codes for config, ledger and schema failures

mod common;

use common::*;
use folio::cli::{self, Cli, run};
use folio::domain::error::FolioError;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ExitCode doesn't implement PartialEq, so compare Debug renderings.
fn assert_exit(actual: ExitCode, expected: u8) {
    assert_eq!(
        format!("{actual:?}"),
        format!("{:?}", ExitCode::from(expected))
    );
}

fn assert_success(actual: ExitCode) {
    assert_eq!(format!("{actual:?}"), format!("{:?}", ExitCode::SUCCESS));
}

/// One closed ABC4 round trip plus a still-open XYZ9 buy.
fn mixed_ledger_csv() -> String {
    ledger_csv(&[
        tx("2024-01-02", "ABC4", "buy", 100.0, 10.0),
        tx("2024-02-15", "ABC4", "sell", 100.0, 12.0),
        tx("2024-03-01", "XYZ9", "buy", 50.0, 20.0),
    ])
}

mod report_command {
    use super::*;

    #[test]
    fn report_with_ledger_flag_succeeds() {
        let ledger = write_temp_file(&mixed_ledger_csv());
        let cli = Cli::parse_from([
            "folio",
            "report",
            "--ledger",
            ledger.path().to_str().unwrap(),
        ]);
        assert_success(run(cli));
    }

    #[test]
    fn report_writes_output_file() {
        let ledger = write_temp_file(&mixed_ledger_csv());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("closed.csv");

        let cli = Cli::parse_from([
            "folio",
            "report",
            "--ledger",
            ledger.path().to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_success(run(cli));

        let written = std::fs::read_to_string(&out).unwrap();
        let mut lines = written.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("market,ticker,indexer,yield_min"));
        // One closed position: the ABC4 round trip.
        assert_eq!(lines.count(), 1);
        assert!(written.contains("ABC4"));
        assert!(!written.contains("XYZ9"));
    }

    #[test]
    fn report_from_file_renders_closed_positions() {
        let ledger = write_temp_file(&mixed_ledger_csv());
        let rendered = cli::report_from_file(&ledger.path().to_path_buf()).unwrap();

        assert!(rendered.contains("stocks,ABC4"));
        // total buy 1000, total sell 1200, delta 200.
        assert!(rendered.contains("1000"));
        assert!(rendered.contains("1200"));
    }

    #[test]
    fn missing_ledger_file_exits_with_ledger_code() {
        let cli = Cli::parse_from(["folio", "report", "--ledger", "/no/such/ledger.csv"]);
        assert_exit(run(cli), 3);
    }

    #[test]
    fn ragged_row_exits_with_schema_code() {
        let mut csv = mixed_ledger_csv();
        csv.push_str("2024-04-01,stocks,ABC4\n");
        let ledger = write_temp_file(&csv);

        let err = cli::report_from_file(&ledger.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, FolioError::SchemaMismatch { .. }));

        let cli = Cli::parse_from([
            "folio",
            "report",
            "--ledger",
            ledger.path().to_str().unwrap(),
        ]);
        assert_exit(run(cli), 4);
    }
}

mod config_resolution {
    use super::*;

    #[test]
    fn ledger_path_comes_from_config_file() {
        let ledger = write_temp_file(&mixed_ledger_csv());
        let ini = format!("[ledger]\npath = {}\n", ledger.path().display());
        let config = write_temp_file(&ini);

        let cli = Cli::parse_from([
            "folio",
            "report",
            "--config",
            config.path().to_str().unwrap(),
        ]);
        assert_success(run(cli));
    }

    #[test]
    fn ledger_flag_wins_over_config() {
        let ledger = write_temp_file(&mixed_ledger_csv());
        let ini = "[ledger]\npath = /no/such/ledger.csv\n";
        let config = write_temp_file(ini);

        let cli = Cli::parse_from([
            "folio",
            "report",
            "--ledger",
            ledger.path().to_str().unwrap(),
            "--config",
            config.path().to_str().unwrap(),
        ]);
        assert_success(run(cli));
    }

    #[test]
    fn output_path_comes_from_config_file() {
        let ledger = write_temp_file(&mixed_ledger_csv());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("from_config.csv");
        let ini = format!(
            "[ledger]\npath = {}\n\n[report]\noutput = {}\n",
            ledger.path().display(),
            out.display()
        );
        let config = write_temp_file(&ini);

        let cli = Cli::parse_from([
            "folio",
            "report",
            "--config",
            config.path().to_str().unwrap(),
        ]);
        assert_success(run(cli));
        assert!(out.exists());
    }

    #[test]
    fn missing_path_key_exits_with_config_code() {
        let config = write_temp_file("[ledger]\nother = value\n");
        let cli = Cli::parse_from([
            "folio",
            "report",
            "--config",
            config.path().to_str().unwrap(),
        ]);
        assert_exit(run(cli), 2);
    }

    #[test]
    fn no_ledger_and_no_config_exits_with_config_code() {
        let cli = Cli::parse_from(["folio", "report"]);
        assert_exit(run(cli), 2);
    }

    #[test]
    fn unreadable_config_is_parse_error() {
        let missing = PathBuf::from("/no/such/folio.ini");
        let err = cli::load_config(&missing).unwrap_err();
        assert!(matches!(err, FolioError::ConfigParse { .. }));
    }
}

mod history_command {
    use super::*;

    #[test]
    fn history_filters_to_closed_slices() {
        let ledger = write_temp_file(&mixed_ledger_csv());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("history.csv");

        let cli = Cli::parse_from([
            "folio",
            "history",
            "--ledger",
            ledger.path().to_str().unwrap(),
            "--state",
            "closed",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_success(run(cli));

        let written = std::fs::read_to_string(&out).unwrap();
        // Header plus the two rows of the closed ABC4 slice.
        assert_eq!(written.lines().count(), 3);
        assert!(written.contains("ABC4"));
        assert!(!written.contains("XYZ9"));
        assert!(written.contains("closed"));
    }

    #[test]
    fn history_without_filter_keeps_every_row() {
        let ledger = write_temp_file(&mixed_ledger_csv());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("history.csv");

        let cli = Cli::parse_from([
            "folio",
            "history",
            "--ledger",
            ledger.path().to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_success(run(cli));

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written.lines().count(), 4);
        assert!(written.contains("opened"));
        assert!(written.contains("closed"));
    }

    #[test]
    fn invalid_state_value_exits_with_config_code() {
        let ledger = write_temp_file(&mixed_ledger_csv());
        let cli = Cli::parse_from([
            "folio",
            "history",
            "--ledger",
            ledger.path().to_str().unwrap(),
            "--state",
            "half-open",
        ]);
        assert_exit(run(cli), 2);
    }
}

mod stats_and_tickers {
    use super::*;

    #[test]
    fn stats_runs_on_a_valid_ledger() {
        let csv = ledger_csv(&[
            tx("2024-01-02", "", "contribution", 0.0, 0.0),
            tx("2024-01-03", "ABC4", "buy", 100.0, 10.0),
            tx("2024-02-15", "ABC4", "sell", 100.0, 12.0),
        ]);
        let ledger = write_temp_file(&csv);
        let cli = Cli::parse_from([
            "folio",
            "stats",
            "--ledger",
            ledger.path().to_str().unwrap(),
        ]);
        assert_success(run(cli));
    }

    #[test]
    fn tickers_runs_on_a_valid_ledger() {
        let ledger = write_temp_file(&mixed_ledger_csv());
        let cli = Cli::parse_from([
            "folio",
            "tickers",
            "--ledger",
            ledger.path().to_str().unwrap(),
        ]);
        assert_success(run(cli));
    }
}
