use std::str::FromStr;

use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{CofreError, Result};
use crate::models::TxnType;

pub fn add(name: &str, category_type: &str) -> Result<()> {
    let txn_type = TxnType::from_str(category_type)?;
    let conn = open_db()?;
    conn.execute(
        "INSERT INTO categories (name, category_type) VALUES (?1, ?2)",
        rusqlite::params![name, txn_type.key()],
    )?;
    println!("Added {} category: {name}", txn_type.key());
    Ok(())
}

pub fn add_sub(category: &str, name: &str) -> Result<()> {
    let conn = open_db()?;
    let category_id: i64 = conn
        .query_row(
            "SELECT id FROM categories WHERE name = ?1 AND is_active = 1",
            [category],
            |row| row.get(0),
        )
        .map_err(|_| CofreError::UnknownCategory(category.to_string()))?;
    conn.execute(
        "INSERT INTO subcategories (category_id, name) VALUES (?1, ?2)",
        rusqlite::params![category_id, name],
    )?;
    println!("Added subcategory {name} under {category}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.category_type, c.is_active,
                coalesce(group_concat(s.name, ', '), '')
         FROM categories c
         LEFT JOIN subcategories s ON s.category_id = c.id AND s.is_active = 1
         GROUP BY c.id
         ORDER BY c.category_type, c.name",
    )?;
    let rows: Vec<(i64, String, String, bool, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Active", "Subcategories"]);
    for (id, name, category_type, active, subs) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(category_type),
            Cell::new(if active { "yes" } else { "no" }),
            Cell::new(subs),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn disable(id: i64) -> Result<()> {
    let conn = open_db()?;
    let changed = conn.execute("UPDATE categories SET is_active = 0 WHERE id = ?1", [id])?;
    if changed == 0 {
        println!("No category with id {id}");
    } else {
        println!("Disabled category {id}");
    }
    Ok(())
}
