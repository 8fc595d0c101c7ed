use std::fmt;
use std::path::Path;

use crate::error::{CofreError, Result};

/// Uploaded files over this size are rejected before decoding.
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// One decoded cell. Spreadsheet-native numbers stay tagged so downstream
/// parsing does not run string heuristics on values the file already typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Text(s) if s.is_empty())
    }

    /// The value as the user saw it, for error messages and previews.
    pub fn raw(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw())
    }
}

/// Rectangular decode result: one header per usable column, every row padded
/// or truncated to the same width, blank rows already dropped.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row][col]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    #[cfg(feature = "xlsx")]
    Excel,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            #[cfg(feature = "xlsx")]
            "xlsx" | "xls" => Ok(Self::Excel),
            _ => Err(CofreError::UnsupportedFormat(ext)),
        }
    }
}

/// Read a file once, enforcing the extension and size gates before any bytes
/// are parsed. Callers that also need the raw bytes (checksums) take them
/// from here so the decoded sheet and the audit trail describe the same read.
pub fn read_file(path: &Path) -> Result<(FileFormat, Vec<u8>)> {
    let format = FileFormat::from_path(path)?;
    let size = std::fs::metadata(path)?.len();
    if size > MAX_FILE_BYTES {
        return Err(CofreError::FileTooLarge { size, limit: MAX_FILE_BYTES });
    }
    let bytes = std::fs::read(path)?;
    Ok((format, bytes))
}

/// Decode a file from disk.
pub fn decode_file(path: &Path) -> Result<Sheet> {
    let (format, bytes) = read_file(path)?;
    decode(&bytes, format)
}

pub fn decode(bytes: &[u8], format: FileFormat) -> Result<Sheet> {
    let (headers, rows) = match format {
        FileFormat::Csv => read_csv(bytes)?,
        #[cfg(feature = "xlsx")]
        FileFormat::Excel => read_workbook(bytes)?,
    };
    finish(headers, rows)
}

fn read_csv(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<Cell>>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let cells: Vec<Cell> = record
            .iter()
            .map(|f| Cell::Text(f.trim().to_string()))
            .collect();
        if headers.is_none() {
            headers = Some(cells.iter().map(Cell::raw).collect());
        } else {
            rows.push(cells);
        }
    }
    let headers = headers.ok_or(CofreError::EmptyFile)?;
    Ok((headers, rows))
}

#[cfg(feature = "xlsx")]
fn read_workbook(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<Cell>>)> {
    use calamine::{Data, Reader};

    fn cell_from_data(d: &Data) -> Cell {
        match d {
            Data::String(s) => Cell::Text(s.trim().to_string()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.trim().to_string()),
            Data::Empty | Data::Error(_) => Cell::Text(String::new()),
        }
    }

    let cursor = std::io::Cursor::new(bytes.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(CofreError::EmptyFile)??;

    let mut row_iter = range
        .rows()
        .map(|r| r.iter().map(cell_from_data).collect::<Vec<Cell>>());
    let headers = match row_iter.next() {
        Some(cells) => cells.iter().map(Cell::raw).collect(),
        None => return Err(CofreError::EmptyFile),
    };
    let rows = row_iter.collect();
    Ok((headers, rows))
}

/// Truncate to the usable column set and drop blank rows. The column count is
/// the longest contiguous run of non-empty headers starting at column 0.
fn finish(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Sheet> {
    let ncols = headers.iter().take_while(|h| !h.trim().is_empty()).count();
    if ncols == 0 {
        return Err(CofreError::EmptyFile);
    }
    let headers: Vec<String> = headers
        .into_iter()
        .take(ncols)
        .map(|h| h.trim().to_string())
        .collect();

    let mut kept = Vec::new();
    for mut row in rows {
        row.truncate(ncols);
        while row.len() < ncols {
            row.push(Cell::Text(String::new()));
        }
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        kept.push(row);
    }
    if kept.is_empty() {
        return Err(CofreError::EmptyFile);
    }
    Ok(Sheet { headers, rows: kept })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_csv(content: &str) -> Result<Sheet> {
        decode(content.as_bytes(), FileFormat::Csv)
    }

    #[test]
    fn test_decode_basic_csv() {
        let sheet = decode_csv("Data,Valor,Pessoa\n2024-01-01,100,Ana\n").unwrap();
        assert_eq!(sheet.headers, vec!["Data", "Valor", "Pessoa"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.cell(0, 2), &Cell::Text("Ana".into()));
    }

    #[test]
    fn test_trailing_blank_headers_truncate_columns() {
        let sheet = decode_csv("Data,Valor,,Notas\n2024-01-01,100,x,y\n").unwrap();
        assert_eq!(sheet.headers, vec!["Data", "Valor"]);
        assert_eq!(sheet.rows[0].len(), 2);
    }

    #[test]
    fn test_blank_rows_dropped() {
        let sheet = decode_csv("Data,Valor\n2024-01-01,100\n,\n  ,  \n2024-01-02,200\n").unwrap();
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn test_short_rows_padded() {
        let sheet = decode_csv("Data,Valor,Pessoa\n2024-01-01,100\n").unwrap();
        assert_eq!(sheet.rows[0].len(), 3);
        assert!(sheet.cell(0, 2).is_blank());
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(matches!(decode_csv(""), Err(CofreError::EmptyFile)));
        assert!(matches!(decode_csv("Data,Valor\n"), Err(CofreError::EmptyFile)));
        assert!(matches!(
            decode_csv(",,\nx,y,z\n"),
            Err(CofreError::EmptyFile)
        ));
        // Only blank data rows is as empty as no data rows
        assert!(matches!(
            decode_csv("Data,Valor\n,\n"),
            Err(CofreError::EmptyFile)
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("a.csv")).unwrap(),
            FileFormat::Csv
        );
        assert_eq!(
            FileFormat::from_path(Path::new("A.CSV")).unwrap(),
            FileFormat::Csv
        );
        #[cfg(feature = "xlsx")]
        {
            assert_eq!(
                FileFormat::from_path(Path::new("a.xlsx")).unwrap(),
                FileFormat::Excel
            );
            assert_eq!(
                FileFormat::from_path(Path::new("a.xls")).unwrap(),
                FileFormat::Excel
            );
        }
        assert!(FileFormat::from_path(Path::new("a.pdf")).is_err());
        assert!(FileFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_decode_file_enforces_size_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.csv");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_FILE_BYTES + 1).unwrap();
        assert!(matches!(
            decode_file(&path),
            Err(CofreError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_read_file_returns_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gastos.csv");
        let content = "Data,Valor\n2024-01-01,100\n";
        std::fs::write(&path, content).unwrap();
        let (format, bytes) = read_file(&path).unwrap();
        assert_eq!(format, FileFormat::Csv);
        assert_eq!(bytes, content.as_bytes());
    }

    #[test]
    fn test_cell_raw_rendering() {
        assert_eq!(Cell::Number(44000.0).raw(), "44000");
        assert_eq!(Cell::Number(127.61).raw(), "127.61");
        assert_eq!(Cell::Text("abc".into()).raw(), "abc");
    }
}
