//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use cedula_core::{ThresholdConfig, WorkPaper};
use tempfile::TempDir;

use crate::commands::{self, truncate, OutputFormat};

const LEDGER: &str = "Sucursal,Categoría,Descripción,Fecha,Monto\n\
                      Centro,Mantenimiento,Pintura fachada,03/01/2025,\"45,000.00\"\n\
                      Centro,Cafetería,Merienda personal,11/01/2025,350\n\
                      Centro,Seguros,Seguro ARS reembolso,20/01/2025,1200\n\
                      Norte,Limpieza,Detergente,07/01/2025,2000\n\
                      Norte,Limpieza,Detergente,07/01/2025,oops\n";

/// Write a ledger and an explicit config into a temp dir so results never
/// depend on a user override on the test machine
fn setup(config: &ThresholdConfig) -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let ledger = dir.path().join("ledger.csv");
    fs::write(&ledger, LEDGER).unwrap();
    let config_path = dir.path().join("thresholds.toml");
    fs::write(&config_path, config.to_toml_string().unwrap()).unwrap();
    (dir, ledger, config_path)
}

fn test_config() -> ThresholdConfig {
    ThresholdConfig {
        critical_amount: 40_000.0,
        moderate_amount: 5_000.0,
        amount_cutoff: 30_000.0,
        participation_cutoff_pct: 90.0,
        low_doc_terms: ["sin factura".to_string()].into_iter().collect(),
        ..Default::default()
    }
}

fn paper_for(ledger: &Path, config: &Path) -> WorkPaper {
    let engine = commands::load_engine(Some(config)).unwrap();
    let ledger = commands::read_ledger(ledger).unwrap();
    engine.work_paper(&ledger).unwrap()
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer description", 10), "a longe...");
    // Accented characters are never split
    assert_eq!(truncate("Reparación eléctrica", 12), "Reparació...");
}

#[test]
fn test_output_format_parse() {
    assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
    assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
    assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    assert!("xlsx".parse::<OutputFormat>().is_err());
}

#[test]
fn test_read_ledger_missing_file() {
    let result = commands::read_ledger(Path::new("/nonexistent/ledger.csv"));
    assert!(result.is_err());
}

#[test]
fn test_load_engine_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[tiers]\ncritical_amount = 10.0\nmoderate_amount = 20.0\n").unwrap();
    assert!(commands::load_engine(Some(path.as_path())).is_err());
}

// ========== Audit Command Tests ==========

#[test]
fn test_cmd_audit_csv_output() {
    let (dir, ledger, config) = setup(&test_config());
    let output = dir.path().join("paper.csv");

    commands::cmd_audit(
        Some(config.as_path()),
        &ledger,
        "csv",
        Some(output.as_path()),
        false,
    )
    .unwrap();

    let csv = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    // Header plus four good rows; the bad amount is reported, not written
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("id,branch,category"));
    assert!(lines[0].ends_with("verified,not_verified,auditor_comment"));
    // Norte has a single valid row, so it leads at 100%
    assert!(lines[1].starts_with("3,Norte,Limpieza,Detergente,07/01/2025"));
}

#[test]
fn test_cmd_audit_flagged_only() {
    let (dir, ledger, config) = setup(&test_config());
    let output = dir.path().join("flagged.csv");

    commands::cmd_audit(
        Some(config.as_path()),
        &ledger,
        "csv",
        Some(output.as_path()),
        true,
    )
    .unwrap();

    let csv = fs::read_to_string(&output).unwrap();
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r.contains(",yes,")));
}

#[test]
fn test_cmd_audit_json_output() {
    let (dir, ledger, config) = setup(&test_config());
    let output = dir.path().join("paper.json");

    commands::cmd_audit(
        Some(config.as_path()),
        &ledger,
        "json",
        Some(output.as_path()),
        false,
    )
    .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["stats"]["records"], 4);
    assert_eq!(json["stats"]["rejected_rows"], 1);
    assert_eq!(json["rejected_rows"][0]["kind"], "ValueError");
    assert_eq!(json["rejected_rows"][0]["row"], 4);
}

#[test]
fn test_cmd_audit_json_ends_with_newline() {
    let (dir, ledger, config) = setup(&test_config());
    let audit = dir.path().join("paper.json");
    let summary = dir.path().join("summary.json");

    commands::cmd_audit(Some(config.as_path()), &ledger, "json", Some(audit.as_path()), false)
        .unwrap();
    commands::cmd_summary(Some(config.as_path()), &ledger, "json", Some(summary.as_path()))
        .unwrap();

    assert!(fs::read_to_string(&audit).unwrap().ends_with("}\n"));
    assert!(fs::read_to_string(&summary).unwrap().ends_with("]\n"));
}

#[test]
fn test_cmd_audit_flagged_only_keeps_header_when_nothing_flagged() {
    let quiet = ThresholdConfig {
        amount_cutoff: 1_000_000.0,
        critical_amount: 1_000_000.0,
        moderate_amount: 500_000.0,
        participation_cutoff_pct: 100.0,
        low_doc_terms: Default::default(),
        insurance_terms: Default::default(),
        ..Default::default()
    };
    let (dir, ledger, config) = setup(&quiet);
    let output = dir.path().join("flagged.csv");

    commands::cmd_audit(Some(config.as_path()), &ledger, "csv", Some(output.as_path()), true)
        .unwrap();

    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(csv.lines().count(), 1);
    assert!(csv.starts_with("id,branch,category"));
    assert!(csv.contains("verified,not_verified,auditor_comment"));
}

#[test]
fn test_cmd_audit_unknown_format() {
    let (_dir, ledger, config) = setup(&test_config());
    let result = commands::cmd_audit(Some(config.as_path()), &ledger, "xlsx", None, false);
    assert!(result.is_err());
}

#[test]
fn test_cmd_audit_missing_config_file() {
    let (dir, ledger, _config) = setup(&test_config());
    let missing = dir.path().join("missing.toml");
    let result = commands::cmd_audit(Some(missing.as_path()), &ledger, "csv", None, false);
    assert!(result.is_err());
}

#[test]
fn test_render_audit_table() {
    let (_dir, ledger, config) = setup(&test_config());
    let paper = paper_for(&ledger, &config);

    let table = commands::render_audit_table(&paper, false);
    assert!(table.contains("Audit Work Paper"));
    assert!(table.contains("Records: 4"));
    assert!(table.contains("Rejected rows: 1"));
    assert!(table.contains("Coverage: 03/01/2025 → 20/01/2025"));
    assert!(table.contains("Pintura fachada"));
    // Reasons are spelled out under flagged rows
    assert!(table.contains("└─"));

    let flagged = commands::render_audit_table(&paper, true);
    assert!(!flagged.contains("Merienda personal"));
}

#[test]
fn test_render_audit_table_empty() {
    let paper = WorkPaper::assemble(Vec::new(), Vec::new());
    let table = commands::render_audit_table(&paper, false);
    assert!(table.contains("No expense records found"));
}

// ========== Summary Command Tests ==========

#[test]
fn test_cmd_summary_json_output() {
    let (dir, ledger, config) = setup(&test_config());
    let output = dir.path().join("summary.json");

    commands::cmd_summary(Some(config.as_path()), &ledger, "json", Some(output.as_path()))
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json[0]["category"], "Mantenimiento");
    assert_eq!(json[0]["risk_tier"], "critical");
    assert_eq!(json[1]["category"], "Limpieza");
    assert_eq!(json[1]["record_count"], 1);
}

#[test]
fn test_cmd_summary_rejects_csv() {
    let (_dir, ledger, config) = setup(&test_config());
    assert!(commands::cmd_summary(Some(config.as_path()), &ledger, "csv", None).is_err());
}

#[test]
fn test_render_summary_table() {
    let (_dir, ledger, config) = setup(&test_config());
    let engine = commands::load_engine(Some(config.as_path())).unwrap();
    let ledger = commands::read_ledger(&ledger).unwrap();
    let summary = engine.summarize_by_category(&ledger.records).unwrap();

    let table = commands::render_summary_table(&summary);
    assert!(table.contains("Spending by Category"));
    assert!(table.contains("Mantenimiento"));
    assert!(table.contains("2025-01"));
    assert!(table.contains("48550.00"));
}

// ========== Config Command Tests ==========

#[test]
fn test_cmd_config_check() {
    let (_dir, _ledger, config) = setup(&test_config());
    assert!(commands::cmd_config(Some(config.as_path()), true).is_ok());
    assert!(commands::cmd_config(Some(config.as_path()), false).is_ok());
}

#[test]
fn test_cmd_config_rejects_unknown_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("typo.toml");
    fs::write(&path, "[flags]\namount_cutof = 10.0\n").unwrap();
    assert!(commands::cmd_config(Some(path.as_path()), true).is_err());
}

#[test]
fn test_config_source() {
    let path = Path::new("/tmp/custom.toml");
    assert_eq!(commands::config_source(Some(path)), "/tmp/custom.toml");
}
