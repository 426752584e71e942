//! TypeScript spelling of graph types and literal values.

use crate::graph::ParamKind;
use serde_json::Value;

pub fn ts_type(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::Number => "number",
        ParamKind::String => "string",
        ParamKind::Boolean => "boolean",
        ParamKind::Object | ParamKind::Exec | ParamKind::Select => "any",
    }
}

/// Type of a literal, as declared for variables and inferred returns.
pub fn literal_type(value: &Value) -> &'static str {
    match value {
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Null | Value::Array(_) | Value::Object(_) => "any",
    }
}

/// JSON text is a valid TypeScript expression for every JSON value.
pub fn render_literal(value: &Value) -> String {
    value.to_string()
}

pub fn string_literal(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literals() {
        assert_eq!(render_literal(&json!(42)), "42");
        assert_eq!(render_literal(&json!(1.5)), "1.5");
        assert_eq!(render_literal(&json!("say \"hi\"")), r#""say \"hi\"""#);
        assert_eq!(render_literal(&json!(null)), "null");
        assert_eq!(render_literal(&json!({"a": [1, true]})), r#"{"a":[1,true]}"#);
    }

    #[test]
    fn test_types() {
        assert_eq!(ts_type(ParamKind::Number), "number");
        assert_eq!(ts_type(ParamKind::Select), "any");
        assert_eq!(literal_type(&json!(false)), "boolean");
        assert_eq!(literal_type(&json!([1])), "any");
    }
}
