use crate::cli::open_db;
use crate::error::Result;

const DEMO_PEOPLE: &[&str] = &["Ana", "Bruno", "Carla"];

// (parent category, subcategory)
const DEMO_SUBCATEGORIES: &[(&str, &str)] = &[
    ("Alimentação", "Mercado"),
    ("Alimentação", "Restaurante"),
    ("Transporte", "Combustível"),
    ("Transporte", "Aplicativo"),
    ("Lazer", "Streaming"),
];

pub fn run() -> Result<()> {
    let conn = open_db()?;

    for name in DEMO_PEOPLE {
        conn.execute("INSERT OR IGNORE INTO people (name) VALUES (?1)", [name])?;
    }
    for (category, name) in DEMO_SUBCATEGORIES {
        conn.execute(
            "INSERT OR IGNORE INTO subcategories (category_id, name)
             SELECT id, ?2 FROM categories WHERE name = ?1 AND category_type = 'expense'",
            rusqlite::params![category, name],
        )?;
    }

    println!("Seeded {} people and {} subcategories.", DEMO_PEOPLE.len(), DEMO_SUBCATEGORIES.len());
    println!("Try a file with headers: Data,Valor,Pessoa,Categoria,Subcategoria,Observações");
    println!("then: cofre import gastos.csv --type expense --dry-run");
    Ok(())
}
