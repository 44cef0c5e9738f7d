//! JSON reader: an array of flat objects, or a single object.

use aidata_shared::{AiDataError, Result};
use serde_json::Value;

use crate::mapper::RawRow;

/// Read rows from a JSON document.
///
/// Array elements that are not objects become `MalformedRecord` errors.
pub(crate) fn read_rows(content: &str, origin: &str) -> Result<(Vec<RawRow>, Vec<AiDataError>)> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| AiDataError::parse(format!("{origin}: invalid JSON: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        Value::Null => Vec::new(),
        other => {
            return Err(AiDataError::parse(format!(
                "{origin}: expected an array of objects, found {}",
                kind_of(&other)
            )));
        }
    };

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (i, item) in items.into_iter().enumerate() {
        let row = i + 1;
        let map = match item {
            Value::Object(map) => map,
            other => {
                errors.push(AiDataError::malformed(
                    row,
                    format!("{origin}: expected an object, found {}", kind_of(&other)),
                ));
                continue;
            }
        };

        let mut raw = RawRow::new(row);
        for (key, value) in &map {
            if let Some(cell) = cell_text(value) {
                raw.insert(key, &cell);
            }
        }
        rows.push(raw);
    }

    Ok((rows, errors))
}

/// Flatten a JSON value into cell text. Arrays join with `|` (the tag separator).
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(cell_text).collect();
            Some(parts.join("|"))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
