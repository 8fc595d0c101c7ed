use thiserror::Error;

#[derive(Error, Debug)]
pub enum CofreError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] calamine::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("File has no usable rows")]
    EmptyFile,

    #[error("Required fields not mapped to any column: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Unknown import type: {0} (expected 'expense' or 'income')")]
    UnknownType(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CofreError>;
