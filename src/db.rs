use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS people (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE,
    category_type TEXT NOT NULL CHECK (category_type IN ('expense', 'income')),
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    UNIQUE (name, category_type)
);

CREATE TABLE IF NOT EXISTS subcategories (
    id INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES categories(id)
);

CREATE TABLE IF NOT EXISTS import_logs (
    id INTEGER PRIMARY KEY,
    file_name TEXT NOT NULL,
    txn_type TEXT NOT NULL,
    total_records INTEGER NOT NULL,
    imported_records INTEGER NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('success', 'error')),
    error_details TEXT,
    checksum TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    txn_type TEXT NOT NULL CHECK (txn_type IN ('expense', 'income')),
    date TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount > 0),
    person_id INTEGER NOT NULL,
    category_id INTEGER NOT NULL,
    subcategory_id INTEGER,
    notes TEXT,
    import_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (person_id) REFERENCES people(id),
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (subcategory_id) REFERENCES subcategories(id),
    FOREIGN KEY (import_id) REFERENCES import_logs(id)
);
";

// (name, category_type)
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    // Expenses
    ("Alimentação", "expense"),
    ("Moradia", "expense"),
    ("Transporte", "expense"),
    ("Saúde", "expense"),
    ("Educação", "expense"),
    ("Lazer", "expense"),
    ("Vestuário", "expense"),
    ("Contas e Assinaturas", "expense"),
    ("Impostos e Taxas", "expense"),
    ("Outros Gastos", "expense"),
    // Income
    ("Salário", "income"),
    ("Freelance", "income"),
    ("Investimentos", "income"),
    ("Presentes", "income"),
    ("Outras Receitas", "income"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (name, category_type) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, category_type) VALUES (?1, ?2)",
                rusqlite::params![name, category_type],
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["people", "categories", "subcategories", "transactions", "import_logs"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_init_db_seeds_categories() {
        let (_dir, conn) = test_db();
        let expense: i64 = conn.query_row(
            "SELECT count(*) FROM categories WHERE category_type = 'expense'", [], |r| r.get(0),
        ).unwrap();
        let income: i64 = conn.query_row(
            "SELECT count(*) FROM categories WHERE category_type = 'income'", [], |r| r.get(0),
        ).unwrap();
        assert!(expense >= 10, "expected >= 10 expense categories, got {expense}");
        assert!(income >= 5, "expected >= 5 income categories, got {income}");
    }

    #[test]
    fn test_category_names_unique_per_type_case_insensitive() {
        let (_dir, conn) = test_db();
        let dup = conn.execute(
            "INSERT INTO categories (name, category_type) VALUES ('alimentação', 'expense')",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn test_transactions_reject_nonpositive_amount() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO people (name) VALUES ('Ana')", []).unwrap();
        let bad = conn.execute(
            "INSERT INTO transactions (txn_type, date, amount, person_id, category_id)
             VALUES ('expense', '2024-01-01', 0.0, 1, 1)",
            [],
        );
        assert!(bad.is_err());
    }
}
