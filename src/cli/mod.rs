pub mod categories;
pub mod demo;
pub mod import;
pub mod init;
pub mod logs;
pub mod people;
pub mod status;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::db_path;

/// Open the database at the configured data dir, creating the schema on
/// first use so every subcommand works after a bare `cofre init`.
pub(crate) fn open_db() -> Result<Connection> {
    let path = db_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = get_connection(&path)?;
    init_db(&conn)?;
    Ok(conn)
}

#[derive(Parser)]
#[command(name = "cofre", about = "Family finance CLI: import spreadsheets of expenses and income.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Cofre: choose a data directory and initialize the database.
    Init {
        /// Path for Cofre data (default: ~/Documents/cofre)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage people (who a transaction belongs to).
    People {
        #[command(subcommand)]
        command: PeopleCommands,
    },
    /// Manage categories and subcategories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Import a CSV/XLSX file of transactions.
    Import {
        /// Path to CSV or XLSX file to import
        file: String,
        /// Import type applied to every row: expense or income
        #[arg(long = "type")]
        txn_type: String,
        /// Override the positional auto-mapping: field=COLUMN (1-based),
        /// e.g. --map amount=5. Fields: date, amount, person, category,
        /// subcategory, notes.
        #[arg(long = "map")]
        maps: Vec<String>,
        /// Ignore a column (1-based), repeatable.
        #[arg(long = "ignore")]
        ignores: Vec<usize>,
        /// Validate and show the preview without writing anything.
        #[arg(long)]
        dry_run: bool,
        /// Import even if this exact file was already imported.
        #[arg(long)]
        force: bool,
    },
    /// List import audit log entries.
    Logs,
    /// Show current database and summary statistics.
    Status,
    /// Load sample people and subcategories to explore Cofre.
    Demo,
}

#[derive(Subcommand)]
pub enum PeopleCommands {
    /// Add a person.
    Add {
        /// Person name (unique, case-insensitive)
        name: String,
    },
    /// List people.
    List,
    /// Deactivate a person (kept for history, hidden from imports).
    Disable {
        /// Person id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category.
    Add {
        /// Category name (unique per type, case-insensitive)
        name: String,
        /// Category type: expense or income
        #[arg(long = "type")]
        category_type: String,
    },
    /// Add a subcategory under an existing category.
    AddSub {
        /// Parent category name
        category: String,
        /// Subcategory name
        name: String,
    },
    /// List categories with their subcategories.
    List,
    /// Deactivate a category.
    Disable {
        /// Category id
        id: i64,
    },
}
