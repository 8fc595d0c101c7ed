use rusqlite::Connection;

use crate::decoder::Sheet;
use crate::error::{CofreError, Result};
use crate::mapping::{ColumnMapping, Field};
use crate::models::{NewTransaction, TxnType};
use crate::parsers::{amount_from_cell, date_from_cell};
use crate::validator::Lookups;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    Success,
    Error,
}

impl ImportStatus {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub total: usize,
    pub imported: usize,
    pub status: ImportStatus,
}

/// Resolve every row to a transaction payload using the same lookup snapshot
/// the validator ran against. Only called after validation passed, so a
/// resolution failure here means the sheet and lookups drifted — treated as
/// a commit failure, not a panic.
pub fn build_payloads(
    sheet: &Sheet,
    mapping: &ColumnMapping,
    lookups: &Lookups,
    txn_type: TxnType,
) -> Result<Vec<NewTransaction>> {
    let mut payloads = Vec::with_capacity(sheet.rows.len());
    for i in 0..sheet.rows.len() {
        let row_number = i + 2;
        let fail = |what: &str| {
            CofreError::Other(format!("row {row_number}: unresolved {what} at commit time"))
        };

        let date_col = mapping.column_of(Field::Date).ok_or_else(|| fail("date"))?;
        let date = date_from_cell(sheet.cell(i, date_col)).ok_or_else(|| fail("date"))?;

        let amount_col = mapping.column_of(Field::Amount).ok_or_else(|| fail("amount"))?;
        let amount = amount_from_cell(sheet.cell(i, amount_col)).ok_or_else(|| fail("amount"))?;

        let person_col = mapping.column_of(Field::Person).ok_or_else(|| fail("person"))?;
        let person_id = lookups
            .person_id(&sheet.cell(i, person_col).raw())
            .ok_or_else(|| fail("person"))?;

        let category_col = mapping.column_of(Field::Category).ok_or_else(|| fail("category"))?;
        let category_id = lookups
            .category_id(&sheet.cell(i, category_col).raw())
            .ok_or_else(|| fail("category"))?;

        let subcategory_id = match mapping.column_of(Field::Subcategory) {
            Some(col) => {
                let cell = sheet.cell(i, col);
                if cell.is_blank() {
                    None
                } else {
                    Some(lookups.subcategory_id(&cell.raw()).ok_or_else(|| fail("subcategory"))?)
                }
            }
            None => None,
        };

        let notes = mapping.column_of(Field::Notes).and_then(|col| {
            let cell = sheet.cell(i, col);
            if cell.is_blank() {
                None
            } else {
                Some(cell.raw())
            }
        });

        payloads.push(NewTransaction {
            txn_type,
            date: date.format("%Y-%m-%d").to_string(),
            amount,
            person_id,
            category_id,
            subcategory_id,
            notes,
        });
    }
    Ok(payloads)
}

/// All-or-nothing commit: one bulk insert wrapped in a single SQLite
/// transaction, plus exactly one import log row recording the outcome. Any
/// failure rolls the batch back and is logged with `imported = 0`.
pub fn commit(
    conn: &mut Connection,
    sheet: &Sheet,
    mapping: &ColumnMapping,
    lookups: &Lookups,
    txn_type: TxnType,
    file_name: &str,
    checksum: Option<&str>,
) -> Result<ImportOutcome> {
    let total = sheet.rows.len();

    let attempt = build_payloads(sheet, mapping, lookups, txn_type)
        .and_then(|payloads| insert_batch(conn, &payloads, txn_type, file_name, checksum));

    match attempt {
        Ok(imported) => Ok(ImportOutcome { total, imported, status: ImportStatus::Success }),
        Err(e) => {
            record_import_log(
                conn,
                file_name,
                txn_type,
                total,
                0,
                ImportStatus::Error,
                Some(&e.to_string()),
                checksum,
            )?;
            Ok(ImportOutcome { total, imported: 0, status: ImportStatus::Error })
        }
    }
}

/// Insert the log row and the transactions in one database transaction so a
/// mid-batch failure leaves neither. The success log row is written first to
/// obtain the import id the transactions link back to.
fn insert_batch(
    conn: &mut Connection,
    payloads: &[NewTransaction],
    txn_type: TxnType,
    file_name: &str,
    checksum: Option<&str>,
) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO import_logs (file_name, txn_type, total_records, imported_records, status, checksum)
         VALUES (?1, ?2, ?3, ?4, 'success', ?5)",
        rusqlite::params![file_name, txn_type.key(), payloads.len() as i64, payloads.len() as i64, checksum],
    )?;
    let import_id = tx.last_insert_rowid();
    {
        let mut stmt = tx.prepare(
            "INSERT INTO transactions (txn_type, date, amount, person_id, category_id, subcategory_id, notes, import_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for p in payloads {
            stmt.execute(rusqlite::params![
                p.txn_type.key(),
                p.date,
                p.amount,
                p.person_id,
                p.category_id,
                p.subcategory_id,
                p.notes,
                import_id,
            ])?;
        }
    }
    tx.commit()?;
    Ok(payloads.len())
}

/// Standalone audit entry, used for failed attempts and validation-gated
/// aborts. Import logs are insert-only.
#[allow(clippy::too_many_arguments)]
pub fn record_import_log(
    conn: &Connection,
    file_name: &str,
    txn_type: TxnType,
    total: usize,
    imported: usize,
    status: ImportStatus,
    error_details: Option<&str>,
    checksum: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO import_logs (file_name, txn_type, total_records, imported_records, status, error_details, checksum)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            file_name,
            txn_type.key(),
            total as i64,
            imported as i64,
            status.key(),
            error_details,
            checksum,
        ],
    )?;
    Ok(())
}

/// Checksum of a prior successful import of the same bytes, if any.
pub fn find_prior_import(conn: &Connection, checksum: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare(
        "SELECT file_name FROM import_logs WHERE checksum = ?1 AND status = 'success' LIMIT 1",
    )?;
    let mut rows = stmt.query_map([checksum], |row| row.get::<_, String>(0))?;
    match rows.next() {
        Some(name) => Ok(Some(name?)),
        None => Ok(None),
    }
}
