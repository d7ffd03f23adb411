//! Loading raw bytes as a YAML document, with the two format-error cases
//! the rest of the compiler relies on: unparseable and empty.

use blueprint_dsl_types::{codes, DslParsingError, DslResult};
use serde_yaml::Value;

/// Parse `text` as YAML. `context` names what was being parsed, for the
/// error message only.
pub fn load_yaml(text: &str, context: &str) -> DslResult<Value> {
    let parsed: Option<Value> = serde_yaml::from_str(text).map_err(|e| {
        DslParsingError::format(codes::YAML_MALFORMED, format!("{context}: Illegal yaml; {e}"))
    })?;

    match parsed {
        Some(Value::Null) | None => Err(DslParsingError::format(
            codes::YAML_EMPTY,
            format!("{context}: Empty yaml"),
        )),
        Some(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_document() {
        let err = load_yaml("", "Failed to parse DSL").unwrap_err();
        assert_eq!(err.err_code(), codes::YAML_EMPTY);
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = load_yaml("key: [unterminated", "Failed to parse DSL").unwrap_err();
        assert_eq!(err.err_code(), codes::YAML_MALFORMED);
    }

    #[test]
    fn parses_a_mapping() {
        let value = load_yaml("a: 1\n", "ctx").unwrap();
        assert_eq!(value.get("a").and_then(|v| v.as_i64()), Some(1));
    }
}
