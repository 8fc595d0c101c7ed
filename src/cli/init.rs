use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{get_data_dir, save_settings, Settings};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let dir = match &data_dir {
        Some(d) => PathBuf::from(d),
        None => get_data_dir(),
    };
    std::fs::create_dir_all(&dir)?;

    let conn = get_connection(&dir.join("cofre.db"))?;
    init_db(&conn)?;

    // COFRE_DATA_DIR runs are throwaway; don't persist them as the default.
    if std::env::var("COFRE_DATA_DIR").is_err() {
        let settings = Settings {
            data_dir: dir.to_string_lossy().to_string(),
            ..Settings::default()
        };
        save_settings(&settings)?;
    }

    println!("Initialized Cofre data in {}", dir.display());
    println!("Next: `cofre people add NAME`, then `cofre import FILE --type expense`");
    Ok(())
}
