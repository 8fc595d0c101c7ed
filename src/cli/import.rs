use std::path::Path;
use std::str::FromStr;

use colored::Colorize;
use comfy_table::{Cell as TableCell, Table};
use sha2::{Digest, Sha256};

use crate::cli::open_db;
use crate::committer::{commit, find_prior_import, record_import_log, ImportStatus};
use crate::decoder::{decode, read_file, Sheet};
use crate::error::{CofreError, Result};
use crate::fmt::money;
use crate::mapping::{ColumnMapping, Field};
use crate::models::TxnType;
use crate::validator::{validate, Lookups, ValidationError};

/// Row-level errors shown before the table is cut off with a remainder count.
const ERROR_DISPLAY_CAP: usize = 50;

pub fn run(
    file: &str,
    txn_type: &str,
    maps: &[String],
    ignores: &[usize],
    dry_run: bool,
    force: bool,
) -> Result<()> {
    let txn_type = TxnType::from_str(txn_type)?;
    let file_path = Path::new(file);
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file)
        .to_string();

    // One read feeds both the decoder and the audit checksum, so the log
    // row always describes the bytes that were actually imported.
    let (format, bytes) = read_file(file_path)?;
    let sheet = decode(&bytes, format)?;
    let checksum = compute_checksum(&bytes);
    let mapping = build_mapping(&sheet, maps, ignores)?;

    let missing = mapping.missing_required_fields();
    if !missing.is_empty() {
        return Err(CofreError::MissingFields(
            missing.iter().map(|f| f.label().to_string()).collect(),
        ));
    }

    let mut conn = open_db()?;

    if !force && !dry_run {
        if let Some(prior) = find_prior_import(&conn, &checksum)? {
            println!(
                "This file was already imported as '{prior}'. Use --force to import again."
            );
            return Ok(());
        }
    }

    let lookups = Lookups::load(&conn, txn_type)?;
    let errors = validate(&sheet, &mapping, &lookups);

    print_mapping(&sheet, &mapping);

    if !errors.is_empty() {
        print_errors(&errors);
        if dry_run {
            println!("{}", format!("{} rows, {} validation errors", sheet.rows.len(), errors.len()).red());
            return Ok(());
        }
        record_import_log(
            &conn,
            &file_name,
            txn_type,
            sheet.rows.len(),
            0,
            ImportStatus::Error,
            Some(&format!("{} validation errors", errors.len())),
            Some(&checksum),
        )?;
        return Err(CofreError::Other(format!(
            "{} validation errors; nothing imported",
            errors.len()
        )));
    }

    let total_amount: f64 = preview_total(&sheet, &mapping);
    if dry_run {
        println!(
            "{}",
            format!(
                "{} rows ready to import as {} ({})",
                sheet.rows.len(),
                txn_type.key(),
                money(total_amount)
            )
            .green()
        );
        return Ok(());
    }

    let outcome = commit(&mut conn, &sheet, &mapping, &lookups, txn_type, &file_name, Some(&checksum))?;
    match outcome.status {
        ImportStatus::Success => {
            println!(
                "{}",
                format!(
                    "Imported {}/{} {} rows ({})",
                    outcome.imported,
                    outcome.total,
                    txn_type.key(),
                    money(total_amount)
                )
                .green()
            );
            Ok(())
        }
        ImportStatus::Error => Err(CofreError::Other(
            "import failed; batch rolled back, see `cofre logs`".to_string(),
        )),
    }
}

/// Positional auto-mapping, then `--map field=COL` overrides (1-based),
/// then `--ignore COL`.
fn build_mapping(sheet: &Sheet, maps: &[String], ignores: &[usize]) -> Result<ColumnMapping> {
    let ncols = sheet.column_count();
    let mut mapping = ColumnMapping::auto(ncols);

    for entry in maps {
        let (field_part, col_part) = entry
            .split_once('=')
            .ok_or_else(|| CofreError::Other(format!("bad --map '{entry}' (expected field=COLUMN)")))?;
        let field = Field::from_key(field_part)
            .ok_or_else(|| CofreError::Other(format!("unknown field '{field_part}'")))?;
        let col: usize = col_part
            .trim()
            .parse()
            .map_err(|_| CofreError::Other(format!("bad column number '{col_part}'")))?;
        if col == 0 || col > ncols {
            return Err(CofreError::Other(format!(
                "column {col} out of range (file has {ncols} columns)"
            )));
        }
        mapping.assign(col - 1, Some(field));
    }

    for &col in ignores {
        if col == 0 || col > ncols {
            return Err(CofreError::Other(format!(
                "column {col} out of range (file has {ncols} columns)"
            )));
        }
        mapping.assign(col - 1, None);
    }

    Ok(mapping)
}

fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn print_mapping(sheet: &Sheet, mapping: &ColumnMapping) {
    let mut table = Table::new();
    table.set_header(vec!["Column", "Header", "Field"]);
    for col in 0..sheet.column_count() {
        table.add_row(vec![
            TableCell::new(col + 1),
            TableCell::new(&sheet.headers[col]),
            TableCell::new(
                mapping
                    .field_at(col)
                    .map(|f| f.label())
                    .unwrap_or("(ignored)"),
            ),
        ]);
    }
    println!("Column mapping\n{table}");
}

fn print_errors(errors: &[ValidationError]) {
    let mut table = Table::new();
    table.set_header(vec!["Row", "Field", "Problem"]);
    for e in errors.iter().take(ERROR_DISPLAY_CAP) {
        table.add_row(vec![
            TableCell::new(e.row),
            TableCell::new(e.field),
            TableCell::new(&e.message),
        ]);
    }
    println!("Validation errors\n{table}");
    if errors.len() > ERROR_DISPLAY_CAP {
        println!("... and {} more", errors.len() - ERROR_DISPLAY_CAP);
    }
}

fn preview_total(sheet: &Sheet, mapping: &ColumnMapping) -> f64 {
    let Some(col) = mapping.column_of(Field::Amount) else {
        return 0.0;
    };
    (0..sheet.rows.len())
        .filter_map(|i| crate::parsers::amount_from_cell(sheet.cell(i, col)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{decode, FileFormat};

    fn sheet(content: &str) -> Sheet {
        decode(content.as_bytes(), FileFormat::Csv).unwrap()
    }

    #[test]
    fn test_build_mapping_applies_overrides() {
        let s = sheet("A,B,C,D,E\n1,2,3,4,5\n");
        let mapping = build_mapping(&s, &["amount=5".to_string()], &[]).unwrap();
        assert_eq!(mapping.column_of(Field::Amount), Some(4));
        // Column 2 lost its auto-assignment to amount
        assert_eq!(mapping.field_at(1), None);
    }

    #[test]
    fn test_build_mapping_ignore() {
        let s = sheet("A,B,C,D\n1,2,3,4\n");
        let mapping = build_mapping(&s, &[], &[4]).unwrap();
        assert_eq!(mapping.field_at(3), None);
    }

    #[test]
    fn test_build_mapping_rejects_bad_input() {
        let s = sheet("A,B\n1,2\n");
        assert!(build_mapping(&s, &["amount".to_string()], &[]).is_err());
        assert!(build_mapping(&s, &["banana=1".to_string()], &[]).is_err());
        assert!(build_mapping(&s, &["amount=3".to_string()], &[]).is_err());
        assert!(build_mapping(&s, &["amount=0".to_string()], &[]).is_err());
        assert!(build_mapping(&s, &[], &[9]).is_err());
    }

    #[test]
    fn test_checksum_is_over_the_given_bytes() {
        // sha256("abc")
        assert_eq!(
            compute_checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(compute_checksum(b"abc"), compute_checksum(b"abc"));
        assert_ne!(compute_checksum(b"abc"), compute_checksum(b"abd"));
    }

    #[test]
    fn test_preview_total_sums_parseable_amounts() {
        let s = sheet("Data,Valor\n2024-01-01,\"127,61\"\n2024-01-02,\"2,39\"\n");
        let mapping = ColumnMapping::auto(2);
        assert!((preview_total(&s, &mapping) - 130.0).abs() < 1e-9);
    }
}
