use rusqlite::Connection;

use crate::decoder::Sheet;
use crate::error::Result;
use crate::mapping::{ColumnMapping, Field};
use crate::models::TxnType;
use crate::parsers::{amount_from_cell, date_from_cell};

/// One failing cell. `row` is 1-based and offset past the header, so the
/// first data row reports as row 2.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub row: usize,
    pub field: &'static str,
    pub message: String,
}

/// In-memory snapshot of the active lookup tables, loaded once per import so
/// preview and commit resolve names against identical data.
#[derive(Debug, Clone)]
pub struct Lookups {
    pub people: Vec<(i64, String)>,
    pub categories: Vec<(i64, String)>,
    pub subcategories: Vec<(i64, String)>,
}

impl Lookups {
    pub fn new(
        people: Vec<(i64, String)>,
        categories: Vec<(i64, String)>,
        subcategories: Vec<(i64, String)>,
    ) -> Self {
        Self { people, categories, subcategories }
    }

    /// Active people, active categories of the declared type, active
    /// subcategories.
    pub fn load(conn: &Connection, txn_type: TxnType) -> Result<Self> {
        let people = load_pairs(conn, "SELECT id, name FROM people WHERE is_active = 1", &[])?;
        let categories = load_pairs(
            conn,
            "SELECT id, name FROM categories WHERE is_active = 1 AND category_type = ?1",
            &[&txn_type.key()],
        )?;
        let subcategories =
            load_pairs(conn, "SELECT id, name FROM subcategories WHERE is_active = 1", &[])?;
        Ok(Self::new(people, categories, subcategories))
    }

    pub fn person_id(&self, name: &str) -> Option<i64> {
        find_ci(&self.people, name)
    }

    pub fn category_id(&self, name: &str) -> Option<i64> {
        find_ci(&self.categories, name)
    }

    pub fn subcategory_id(&self, name: &str) -> Option<i64> {
        find_ci(&self.subcategories, name)
    }
}

fn load_pairs(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<(i64, String)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn find_ci(pairs: &[(i64, String)], name: &str) -> Option<i64> {
    let wanted = name.trim().to_lowercase();
    pairs
        .iter()
        .find(|(_, n)| n.to_lowercase() == wanted)
        .map(|(id, _)| *id)
}

/// Check every mapped cell of every row, accumulating one error per failing
/// cell. Never stops early: the caller gets the complete worklist. An empty
/// result is the precondition for commit.
pub fn validate(sheet: &Sheet, mapping: &ColumnMapping, lookups: &Lookups) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (i, _) in sheet.rows.iter().enumerate() {
        let row_number = i + 2;
        let mut push = |field: Field, message: String| {
            errors.push(ValidationError { row: row_number, field: field.label(), message });
        };

        if let Some(col) = mapping.column_of(Field::Date) {
            let cell = sheet.cell(i, col);
            if cell.is_blank() {
                push(Field::Date, "Data vazia".to_string());
            } else if date_from_cell(cell).is_none() {
                push(Field::Date, format!("Data inválida: '{}'", cell.raw()));
            }
        }

        if let Some(col) = mapping.column_of(Field::Amount) {
            let cell = sheet.cell(i, col);
            match amount_from_cell(cell) {
                Some(v) if v > 0.0 => {}
                _ => push(Field::Amount, format!("Valor inválido: '{}'", cell.raw())),
            }
        }

        if let Some(col) = mapping.column_of(Field::Person) {
            let cell = sheet.cell(i, col);
            if cell.is_blank() {
                push(Field::Person, "Pessoa vazia".to_string());
            } else if lookups.person_id(&cell.raw()).is_none() {
                push(Field::Person, format!("Pessoa não cadastrada: '{}'", cell.raw()));
            }
        }

        if let Some(col) = mapping.column_of(Field::Category) {
            let cell = sheet.cell(i, col);
            if cell.is_blank() {
                push(Field::Category, "Categoria vazia".to_string());
            } else if lookups.category_id(&cell.raw()).is_none() {
                push(
                    Field::Category,
                    format!("Categoria não cadastrada: '{}'", cell.raw()),
                );
            }
        }

        // Subcategory is optional: blank is fine, unknown is not.
        if let Some(col) = mapping.column_of(Field::Subcategory) {
            let cell = sheet.cell(i, col);
            if !cell.is_blank() && lookups.subcategory_id(&cell.raw()).is_none() {
                push(
                    Field::Subcategory,
                    format!("Subcategoria não cadastrada: '{}'", cell.raw()),
                );
            }
        }
    }

    errors
}
