//! Cell and file name normalization

use serde_json::Value;

/// Render a cell for a delimited field
///
/// Nested objects and arrays become compact JSON text, strings pass
/// through untouched, and null or missing cells are empty.
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => nested.to_string(),
    }
}

/// Turn a table name into a file stem that stays inside the export directory
pub fn file_stem(table_name: &str) -> String {
    let stem: String = table_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => format!("_{}", stem),
        _ => stem,
    }
}
