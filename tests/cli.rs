use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

fn cofre(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cofre").unwrap();
    cmd.env("COFRE_DATA_DIR", data_dir).env("NO_COLOR", "1");
    cmd
}

fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("cofre")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("categories"));
}

#[test]
fn people_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    cofre(dir.path()).args(["people", "add", "Ana"]).assert().success();
    cofre(dir.path())
        .args(["people", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana"));
}

#[test]
fn import_dry_run_reports_unknown_person() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        "gastos.csv",
        "Data,Valor,Pessoa,Categoria\n2024-01-01,100,João,Alimentação\n",
    );
    cofre(dir.path())
        .args(["import", csv.to_str().unwrap(), "--type", "expense", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pessoa não cadastrada: 'João'"))
        .stdout(predicate::str::contains("1 validation errors"));
}

#[test]
fn import_succeeds_and_is_audited() {
    let dir = tempfile::tempdir().unwrap();
    cofre(dir.path()).args(["people", "add", "Ana"]).assert().success();
    let csv = write_csv(
        dir.path(),
        "gastos.csv",
        "Data,Valor,Pessoa,Categoria\n15/03/2024,\"127,61\",Ana,Alimentação\n2024-03-16,50,ana,Transporte\n",
    );
    cofre(dir.path())
        .args(["import", csv.to_str().unwrap(), "--type", "expense"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2/2"));
    cofre(dir.path())
        .args(["logs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gastos.csv"))
        .stdout(predicate::str::contains("success"));
}

#[test]
fn reimporting_same_file_requires_force() {
    let dir = tempfile::tempdir().unwrap();
    cofre(dir.path()).args(["people", "add", "Ana"]).assert().success();
    let csv = write_csv(
        dir.path(),
        "gastos.csv",
        "Data,Valor,Pessoa,Categoria\n2024-01-01,100,Ana,Alimentação\n",
    );
    let args = ["import", csv.to_str().unwrap(), "--type", "expense"];
    cofre(dir.path()).args(args).assert().success();
    cofre(dir.path())
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("already imported"));
    cofre(dir.path())
        .args(["import", csv.to_str().unwrap(), "--type", "expense", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1/1"));
}

#[test]
fn validation_failure_blocks_import_and_logs_error() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        "gastos.csv",
        "Data,Valor,Pessoa,Categoria\nnot-a-date,abc,João,Esportes\n",
    );
    cofre(dir.path())
        .args(["import", csv.to_str().unwrap(), "--type", "expense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation errors"));
    cofre(dir.path())
        .args(["logs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("error"));
}

#[test]
fn error_display_caps_at_fifty_with_remainder_count() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = String::from("Data,Valor,Pessoa,Categoria\n");
    for i in 0..60 {
        content.push_str(&format!("2024-01-01,100,Desconhecido{i},Alimentação\n"));
    }
    let csv = write_csv(dir.path(), "gastos.csv", &content);

    let assert = cofre(dir.path())
        .args(["import", csv.to_str().unwrap(), "--type", "expense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("60 validation errors"));
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert_eq!(
        stdout.matches("Pessoa não cadastrada").count(),
        50,
        "error table shows only the first 50 rows"
    );
    assert!(stdout.contains("... and 10 more"), "stdout: {stdout}");

    // The audit row records the full count, not the display cap
    cofre(dir.path())
        .args(["logs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("60 validation errors"));
}

#[test]
fn missing_required_mapping_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "short.csv", "Data,Valor\n2024-01-01,100\n");
    cofre(dir.path())
        .args(["import", csv.to_str().unwrap(), "--type", "expense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pessoa"))
        .stderr(predicate::str::contains("Categoria"));
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "gastos.pdf", "not a spreadsheet");
    cofre(dir.path())
        .args(["import", path.to_str().unwrap(), "--type", "expense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn unknown_import_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        "gastos.csv",
        "Data,Valor,Pessoa,Categoria\n2024-01-01,100,Ana,Alimentação\n",
    );
    cofre(dir.path())
        .args(["import", csv.to_str().unwrap(), "--type", "transfer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown import type"));
}
