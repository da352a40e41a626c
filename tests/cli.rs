//! End-to-end tests for the `salesboard` binary.

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::tempdir;

const REFERENCE_EXPORT: &str = "\
Date,TOTAL,Account manager,Product,Category
01/04/2025,\"100,00\",Ana,Plano X,Assinatura
01/04/2025,\"50,00\",Ana,Aula Experimental,
";

fn write_export(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write export fixture");
    path
}

#[test]
fn analyze_prints_kpis_and_rankings() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(&dir, "sales.csv", REFERENCE_EXPORT);

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["analyze", "-i", export.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            contains("Total sales")
                .and(contains("R$ 150,00"))
                .and(contains("Contracts"))
                .and(contains("Average ticket"))
                .and(contains("Consultant ranking"))
                .and(contains("Ana"))
                .and(contains("100.0%"))
                .and(contains("Top products"))
                .and(contains("Plano X"))
                .and(contains("01/04")),
        );
}

#[test]
fn analyze_counts_contracts_from_category_columns() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(&dir, "sales.csv", REFERENCE_EXPORT);

    // Only the first row has a non-blank Category, so one contract and one
    // trial class
    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["analyze", "-i", export.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .stdout(
            contains("\"contracts\": 1")
                .and(contains("\"trial_classes\": 1"))
                .and(contains("\"subscriptions\": 0")),
        );
}

#[test]
fn analyze_writes_json_report_to_file() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(&dir, "sales.csv", REFERENCE_EXPORT);
    let out = dir.path().join("report.json");

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args([
            "analyze",
            "-i",
            export.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("read report")).expect("valid JSON");
    assert_eq!(report["kpis"]["total_sales"], serde_json::json!("150.00"));
    assert_eq!(report["roles"]["total"], serde_json::json!("TOTAL"));
    assert_eq!(report["consultants"][0]["name"], serde_json::json!("Ana"));
}

#[test]
fn analyze_reads_stdin_with_dash() {
    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["analyze", "-i", "-"])
        .write_stdin(REFERENCE_EXPORT)
        .assert()
        .success()
        .stdout(contains("R$ 150,00"));
}

#[test]
fn analyze_resolves_tsv_delimiter_from_extension() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(
        &dir,
        "sales.tsv",
        "Data\tValor\n01/04/2025\t100,00\n02/04/2025\t200,00\n",
    );

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["analyze", "-i", export.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("R$ 300,00"));
}

#[test]
fn analyze_shows_target_attainment() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(&dir, "sales.csv", REFERENCE_EXPORT);

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args([
            "analyze",
            "-i",
            export.to_str().unwrap(),
            "--target",
            "300",
        ])
        .assert()
        .success()
        .stdout(contains("Target").and(contains("50.0%")));
}

#[test]
fn naive_split_preserves_legacy_misalignment() {
    let dir = tempdir().expect("temp dir");
    // The quoted comma splits under the legacy splitter, shifting "100,00"
    // out of the TOTAL column
    let export = write_export(
        &dir,
        "sales.csv",
        "Name,TOTAL\n\"Silva, Ana\",\"100,00\"\n",
    );

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args([
            "analyze",
            "-i",
            export.to_str().unwrap(),
            "--naive-split",
            "--json",
        ])
        .assert()
        .success()
        .stdout(contains("\"total_sales\": \"0\"").and(contains("\"bad_amount_cells\": 1")));
}

#[test]
fn quoted_parsing_is_the_default() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(
        &dir,
        "sales.csv",
        "Name,TOTAL\n\"Silva, Ana\",\"100,00\"\n",
    );

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["analyze", "-i", export.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .stdout(contains("\"total_sales\": \"100.00\""));
}

#[test]
fn analyze_fails_on_empty_export() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(&dir, "empty.csv", "");

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["analyze", "-i", export.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("error"));
}

#[test]
fn analyze_fails_on_header_only_export() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(&dir, "headers.csv", "Date,TOTAL\n");

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["analyze", "-i", export.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn analyze_rejects_duplicate_headers() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(&dir, "dupes.csv", "Total,Total\n1,2\n");

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["analyze", "-i", export.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn columns_lists_resolved_roles() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(&dir, "sales.csv", REFERENCE_EXPORT);

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["columns", "-i", export.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            contains("total")
                .and(contains("TOTAL"))
                .and(contains("consultant"))
                .and(contains("Account manager"))
                .and(contains("category"))
                .and(contains("Category")),
        );
}

#[test]
fn columns_reports_unresolved_roles_as_none() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(&dir, "other.csv", "Foo,Bar\n1,2\n");

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["columns", "-i", export.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("(none)"));
}

#[test]
fn preview_limits_rows() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(
        &dir,
        "sales.csv",
        "Name,Valor\nAna,1\nBia,2\nCaio,3\nDuda,4\n",
    );

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args(["preview", "-i", export.to_str().unwrap(), "--rows", "2"])
        .assert()
        .success()
        .stdout(contains("Ana").and(contains("Bia")).and(contains("Caio").not()));
}

#[test]
fn limit_caps_analyzed_rows() {
    let dir = tempdir().expect("temp dir");
    let export = write_export(
        &dir,
        "sales.csv",
        "Valor\n100\n200\n300\n",
    );

    Command::cargo_bin("salesboard")
        .expect("binary exists")
        .args([
            "analyze",
            "-i",
            export.to_str().unwrap(),
            "--limit",
            "2",
            "--json",
        ])
        .assert()
        .success()
        .stdout(contains("\"total_sales\": \"300\""));
}
