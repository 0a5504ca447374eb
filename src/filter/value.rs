//! Filter values and their scalar predicates.
//!
//! A filter mapping is a JSON object. Values that are objects are relational
//! predicates handled by the compiler; everything else turns into a scalar
//! predicate on one column:
//!
//! | JSON value            | Predicate                      |
//! |-----------------------|--------------------------------|
//! | string, number, bool  | `col = value`                  |
//! | `null`                | `col IS NULL`                  |
//! | array of scalars      | `col IN (...)`                 |
//! | string with `*`       | `col LIKE '%..%'` (wildcards)  |

use crate::error::DeepFilterError;
use sea_query::{Expr, ExprTrait, Value};
use serde_json::Value as JsonValue;

/// A filter mapping: column name to scalar, array or nested filter
pub type Filter = serde_json::Map<String, JsonValue>;

/// Convert a JSON value into a filter mapping
///
/// # Errors
///
/// Returns `InvalidValue` when the value is not a JSON object.
///
/// # Example
///
/// ```no_run
/// use deepguard::filter::into_filter;
/// use serde_json::json;
///
/// let filter = into_filter(json!({ "group": { "name": "Eng" } })).unwrap();
/// assert!(filter.contains_key("group"));
/// ```
pub fn into_filter(value: JsonValue) -> Result<Filter, DeepFilterError> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(DeepFilterError::InvalidValue {
            field: String::new(),
            reason: format!("expected a filter object, got {}", json_kind(&other)),
        }),
    }
}

/// Whether a value is a nested filter (a relational predicate)
pub fn is_nested(value: &JsonValue) -> bool {
    value.is_object()
}

/// LIKE pattern for a wildcard string, `None` if it contains no `*`
pub fn wildcard_pattern(value: &str) -> Option<String> {
    value.contains('*').then(|| value.replace('*', "%"))
}

/// Build the predicate for one scalar filter entry
///
/// `column` is the already-qualified column expression.
pub fn scalar_predicate(
    column: Expr,
    field: &str,
    value: &JsonValue,
    wildcards: bool,
) -> Result<Expr, DeepFilterError> {
    match value {
        JsonValue::Null => Ok(column.is_null()),
        JsonValue::Array(items) => {
            let values = items
                .iter()
                .map(|item| scalar_value(field, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(column.is_in(values))
        }
        JsonValue::String(s) if wildcards => match wildcard_pattern(s) {
            Some(pattern) => Ok(column.like(pattern)),
            None => Ok(column.eq(s.clone())),
        },
        JsonValue::Object(_) => Err(DeepFilterError::InvalidValue {
            field: field.to_string(),
            reason: "a nested filter is not a scalar value".to_string(),
        }),
        other => Ok(column.eq(scalar_value(field, other)?)),
    }
}

/// Convert a JSON scalar into a SQL value
pub fn scalar_value(field: &str, value: &JsonValue) -> Result<Value, DeepFilterError> {
    match value {
        JsonValue::Bool(b) => Ok(Value::from(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                n.as_f64().map(Value::from).ok_or_else(|| DeepFilterError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("number {n} is not representable"),
                })
            }
        }
        JsonValue::String(s) => Ok(Value::from(s.clone())),
        other => Err(DeepFilterError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a scalar, got {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
