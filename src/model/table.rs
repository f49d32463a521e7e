//! Table references and row data structures

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server-assigned table identifier, kept textually
///
/// The listing may return numeric or string IDs; both are rendered
/// verbatim into resource paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct TableId(String);

impl TableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<Value> for TableId {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => Ok(TableId(n.to_string())),
            Value::String(s) => Ok(TableId(s)),
            other => Err(format!("table id must be a number or string, got {}", other)),
        }
    }
}

impl From<TableId> for String {
    fn from(id: TableId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A table as returned by the workspace listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    pub id: TableId,
    pub name: String,
}

impl TableRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: TableId::new(id),
            name: name.into(),
        }
    }
}

/// One record of table content, keyed by column name in server order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: IndexMap<String, Value>,
}

impl Row {
    /// Get a cell value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// Column names in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_id_from_number_or_string() {
        let numeric: TableRef = serde_json::from_value(json!({"id": 7, "name": "users"})).unwrap();
        assert_eq!(numeric.id.as_str(), "7");

        let textual: TableRef =
            serde_json::from_value(json!({"id": "abc", "name": "orders"})).unwrap();
        assert_eq!(textual.id.to_string(), "abc");

        let bad = serde_json::from_value::<TableRef>(json!({"id": [1], "name": "x"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_table_ref_ignores_extra_fields() {
        let table: TableRef = serde_json::from_value(
            json!({"id": 3, "name": "posts", "created_at": 1700000000, "auth": false}),
        )
        .unwrap();
        assert_eq!(table, TableRef::new("3", "posts"));
    }

    #[test]
    fn test_row_preserves_key_order() {
        let row: Row =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": {"b": 1, "a": 2}}"#).unwrap();
        let keys: Vec<&str> = row.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(row.get("alpha"), Some(&json!(2)));
        assert_eq!(row.len(), 3);
        assert!(!row.is_empty());
        assert!(Row::default().is_empty());
    }
}
