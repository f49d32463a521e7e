//! Column metadata and type information

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inferred cell type for a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    #[default]
    Null,
    Bool,
    Int,
    Float,
    String,
    Date,
    DateTime,
    /// Nested object or array
    Json,
    Mixed,
}

impl CellType {
    /// Widen the type to accommodate another type
    pub fn widen(self, other: CellType) -> CellType {
        if self == other {
            return self;
        }

        match (self, other) {
            (CellType::Null, t) | (t, CellType::Null) => t,
            (CellType::Int, CellType::Float) | (CellType::Float, CellType::Int) => CellType::Float,
            (CellType::Date, CellType::DateTime) | (CellType::DateTime, CellType::Date) => {
                CellType::DateTime
            }
            _ => CellType::Mixed,
        }
    }

    /// Classify a single JSON cell value
    pub fn of_value(value: &Value) -> CellType {
        match value {
            Value::Null => CellType::Null,
            Value::Bool(_) => CellType::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    CellType::Int
                } else {
                    CellType::Float
                }
            }
            Value::String(s) => classify_string(s),
            Value::Array(_) | Value::Object(_) => CellType::Json,
        }
    }
}

fn classify_string(s: &str) -> CellType {
    if chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
        return CellType::Date;
    }
    if chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
    {
        return CellType::DateTime;
    }
    CellType::String
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellType::Null => write!(f, "null"),
            CellType::Bool => write!(f, "bool"),
            CellType::Int => write!(f, "int"),
            CellType::Float => write!(f, "float"),
            CellType::String => write!(f, "string"),
            CellType::Date => write!(f, "date"),
            CellType::DateTime => write!(f, "datetime"),
            CellType::Json => write!(f, "json"),
            CellType::Mixed => write!(f, "mixed"),
        }
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (key of the first row)
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
    /// Inferred type from exported data
    pub inferred_type: CellType,
}

impl Column {
    /// Create a column with a specified type
    pub fn with_type(name: impl Into<String>, index: usize, cell_type: CellType) -> Self {
        Self {
            name: name.into(),
            index,
            inferred_type: cell_type,
        }
    }
}
