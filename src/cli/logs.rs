use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::models::ImportLog;

pub fn run() -> Result<()> {
    let conn = open_db()?;
    let mut stmt = conn.prepare(
        "SELECT id, file_name, txn_type, total_records, imported_records, status,
                error_details, created_at
         FROM import_logs ORDER BY id DESC",
    )?;
    let logs: Vec<ImportLog> = stmt
        .query_map([], |row| {
            Ok(ImportLog {
                id: row.get(0)?,
                file_name: row.get(1)?,
                txn_type: row.get(2)?,
                total_records: row.get(3)?,
                imported_records: row.get(4)?,
                status: row.get(5)?,
                error_details: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if logs.is_empty() {
        println!("No imports yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "When", "File", "Type", "Rows", "Imported", "Status", "Details"]);
    for log in logs {
        table.add_row(vec![
            Cell::new(log.id),
            Cell::new(log.created_at),
            Cell::new(log.file_name),
            Cell::new(log.txn_type),
            Cell::new(log.total_records),
            Cell::new(log.imported_records),
            Cell::new(log.status),
            Cell::new(log.error_details.unwrap_or_default()),
        ]);
    }
    println!("Import log\n{table}");
    Ok(())
}
