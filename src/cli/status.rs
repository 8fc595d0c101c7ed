use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::settings::get_data_dir;

pub fn run() -> Result<()> {
    let data_dir = get_data_dir();
    let db_path = data_dir.join("cofre.db");

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let people: i64 = conn.query_row("SELECT count(*) FROM people", [], |r| r.get(0))?;
        let categories: i64 = conn.query_row("SELECT count(*) FROM categories", [], |r| r.get(0))?;
        let transactions: i64 =
            conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
        let imports: i64 = conn.query_row("SELECT count(*) FROM import_logs", [], |r| r.get(0))?;
        let expenses: f64 = conn.query_row(
            "SELECT coalesce(sum(amount), 0) FROM transactions WHERE txn_type = 'expense'",
            [],
            |r| r.get(0),
        )?;
        let income: f64 = conn.query_row(
            "SELECT coalesce(sum(amount), 0) FROM transactions WHERE txn_type = 'income'",
            [],
            |r| r.get(0),
        )?;

        println!();
        println!("People:        {people}");
        println!("Categories:    {categories}");
        println!("Transactions:  {transactions}");
        println!("Imports:       {imports}");
        println!("Expenses:      {}", money(expenses));
        println!("Income:        {}", money(income));
    } else {
        println!();
        println!("Database not found. Run `cofre init` to set up.");
    }

    Ok(())
}
