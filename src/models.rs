use std::fmt;
use std::str::FromStr;

use crate::error::CofreError;

/// Declared type of an import batch; applied uniformly to every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnType {
    Expense,
    Income,
}

impl TxnType {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TxnType {
    type Err = CofreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" | "despesa" => Ok(Self::Expense),
            "income" | "receita" => Ok(Self::Income),
            other => Err(CofreError::UnknownType(other.to_string())),
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub category_type: String,
    pub is_active: bool,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Subcategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub is_active: bool,
}

/// Fully resolved transaction payload, ready for the bulk insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub txn_type: TxnType,
    pub date: String,
    pub amount: f64,
    pub person_id: i64,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub notes: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ImportLog {
    pub id: i64,
    pub file_name: String,
    pub txn_type: String,
    pub total_records: i64,
    pub imported_records: i64,
    pub status: String,
    pub error_details: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txn_type_from_str() {
        assert_eq!("expense".parse::<TxnType>().unwrap(), TxnType::Expense);
        assert_eq!("Income".parse::<TxnType>().unwrap(), TxnType::Income);
        assert_eq!("despesa".parse::<TxnType>().unwrap(), TxnType::Expense);
        assert_eq!("receita".parse::<TxnType>().unwrap(), TxnType::Income);
        assert!("transfer".parse::<TxnType>().is_err());
    }
}
