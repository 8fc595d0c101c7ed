use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;

pub fn add(name: &str) -> Result<()> {
    let conn = open_db()?;
    conn.execute("INSERT INTO people (name) VALUES (?1)", [name])?;
    println!("Added person: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut stmt = conn.prepare("SELECT id, name, is_active FROM people ORDER BY name")?;
    let rows: Vec<(i64, String, bool)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Active"]);
    for (id, name, active) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(if active { "yes" } else { "no" }),
        ]);
    }
    println!("People\n{table}");
    Ok(())
}

pub fn disable(id: i64) -> Result<()> {
    let conn = open_db()?;
    let changed = conn.execute("UPDATE people SET is_active = 0 WHERE id = ?1", [id])?;
    if changed == 0 {
        println!("No person with id {id}");
    } else {
        println!("Disabled person {id}");
    }
    Ok(())
}
