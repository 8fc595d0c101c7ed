use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::decoder::Cell;

// Spreadsheet serial dates are only trusted inside this window (roughly
// 1982..2064); anything outside is more likely a stray number than a date.
const SERIAL_MIN: f64 = 30000.0;
const SERIAL_MAX: f64 = 60000.0;

fn re(cell: &'static OnceLock<Regex>, pattern: &'static str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

/// Normalize a heterogeneous date representation to a calendar date.
///
/// Accepted shapes: ISO `YYYY-MM-DD`; `D/M/Y`, `D-M-Y`, `D.M.Y` with a 2- or
/// 4-digit year (2-digit years pivot at 50: <=50 is 20xx, >50 is 19xx); a bare
/// Excel serial in the plausible range. Anything else is `None` — the caller
/// decides whether that is an error.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    static ISO: OnceLock<Regex> = OnceLock::new();
    if re(&ISO, r"^\d{4}-\d{2}-\d{2}$").is_match(raw) {
        return NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
    }

    static SERIAL: OnceLock<Regex> = OnceLock::new();
    if re(&SERIAL, r"^\d+(\.\d+)?$").is_match(raw) {
        return excel_serial_to_date(raw.parse::<f64>().ok()?);
    }

    let sep = ['/', '-', '.'].into_iter().find(|s| raw.contains(*s))?;
    let parts: Vec<&str> = raw.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year_raw = parts[2].trim();
    let year: i32 = match year_raw.len() {
        2 => {
            let yy: i32 = year_raw.parse().ok()?;
            if yy <= 50 {
                2000 + yy
            } else {
                1900 + yy
            }
        }
        4 => year_raw.parse().ok()?,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Convert an Excel 1900-system serial to a date. The 1899-12-30 base
/// absorbs the historical 1900 leap-year bug.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(SERIAL_MIN..=SERIAL_MAX).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial as i64))
}

/// Normalize a heterogeneous monetary string to a non-negative 2-decimal
/// number.
///
/// Currency symbols and whitespace are stripped, then the separator pattern
/// decides the convention: `1.234,56` is Brazilian, `1,234.56` is US,
/// `127,61` and `127.61` are plain decimals. A lone separator followed by
/// exactly one group of 3 digits (`1,234`, `1.234`) is ambiguous without a
/// locale and is rejected instead of guessed. Negatives are rejected.
pub fn parse_flexible_amount(raw: &str) -> Option<f64> {
    let mut s = raw.trim().to_string();
    for sym in ["R$", "r$", "US$", "$", "€", "£"] {
        if s.contains(sym) {
            s = s.replace(sym, "");
        }
    }
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let normalized = normalize_separators(&s)?;
    let value: f64 = normalized.parse().ok()?;
    if value < 0.0 {
        return None;
    }
    Some(round2(value))
}

fn normalize_separators(s: &str) -> Option<String> {
    static BR_GROUPED: OnceLock<Regex> = OnceLock::new();
    static US_GROUPED: OnceLock<Regex> = OnceLock::new();
    static DOT_AMBIGUOUS: OnceLock<Regex> = OnceLock::new();
    static DOT_THOUSANDS: OnceLock<Regex> = OnceLock::new();
    static DOT_DECIMAL: OnceLock<Regex> = OnceLock::new();
    static COMMA_AMBIGUOUS: OnceLock<Regex> = OnceLock::new();
    static COMMA_THOUSANDS: OnceLock<Regex> = OnceLock::new();
    static COMMA_DECIMAL: OnceLock<Regex> = OnceLock::new();
    static PLAIN: OnceLock<Regex> = OnceLock::new();

    match (s.contains('.'), s.contains(',')) {
        (true, true) => {
            if re(&BR_GROUPED, r"^\d{1,3}(\.\d{3})+,\d+$").is_match(s) {
                Some(s.replace('.', "").replace(',', "."))
            } else if re(&US_GROUPED, r"^\d{1,3}(,\d{3})+\.\d+$").is_match(s) {
                Some(s.replace(',', ""))
            } else {
                None
            }
        }
        (true, false) => {
            if re(&DOT_AMBIGUOUS, r"^\d{1,3}\.\d{3}$").is_match(s) {
                // "1.234": thousands in BR, a 3-decimal fraction in US.
                None
            } else if re(&DOT_THOUSANDS, r"^\d{1,3}(\.\d{3}){2,}$").is_match(s) {
                Some(s.replace('.', ""))
            } else if re(&DOT_DECIMAL, r"^\d+\.\d+$").is_match(s) {
                Some(s.to_string())
            } else {
                None
            }
        }
        (false, true) => {
            if re(&COMMA_AMBIGUOUS, r"^\d{1,3},\d{3}$").is_match(s) {
                None
            } else if re(&COMMA_THOUSANDS, r"^\d{1,3}(,\d{3}){2,}$").is_match(s) {
                Some(s.replace(',', ""))
            } else if re(&COMMA_DECIMAL, r"^\d+,\d+$").is_match(s) {
                Some(s.replace(',', "."))
            } else {
                None
            }
        }
        (false, false) => {
            if re(&PLAIN, r"^\d+$").is_match(s) {
                Some(s.to_string())
            } else {
                None
            }
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Cell-aware date parse: spreadsheet-native numbers skip string sniffing
/// and go straight to the serial branch.
pub fn date_from_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Text(s) => parse_flexible_date(s),
        Cell::Number(n) => excel_serial_to_date(*n),
    }
}

/// Cell-aware amount parse: native numbers are taken as-is (rejecting
/// negatives, rounding to 2 decimals), text goes through the sniffer.
pub fn amount_from_cell(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Text(s) => parse_flexible_amount(s),
        Cell::Number(n) => {
            if *n < 0.0 {
                None
            } else {
                Some(round2(*n))
            }
        }
    }
}
