//! JSON-schema validation for the blueprint DSL.
//!
//! The DSL is authored as YAML; validation itself runs over the equivalent
//! `serde_json::Value` so we can lean on the `jsonschema` crate rather than
//! hand-rolling shape checks.

mod schemas;

use blueprint_dsl_types::{codes, DslParsingError, DslResult};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;
use tracing::debug;

pub use schemas::{DSL_SCHEMA_JSON, IMPORTS_SCHEMA_JSON};

static DSL_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    let schema: JsonValue =
        serde_json::from_str(DSL_SCHEMA_JSON).expect("DSL_SCHEMA_JSON is valid JSON");
    JSONSchema::compile(&schema).expect("DSL_SCHEMA_JSON is a valid JSON schema")
});

static IMPORTS_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    let schema: JsonValue =
        serde_json::from_str(IMPORTS_SCHEMA_JSON).expect("IMPORTS_SCHEMA_JSON is valid JSON");
    JSONSchema::compile(&schema).expect("IMPORTS_SCHEMA_JSON is a valid JSON schema")
});

fn to_json(value: &serde_yaml::Value) -> DslResult<JsonValue> {
    serde_json::to_value(value).map_err(|e| {
        DslParsingError::format(codes::SCHEMA_DSL, format!("Could not convert DSL to JSON for validation: {e}"))
    })
}

fn first_error_path(errors: jsonschema::ErrorIterator<'_>) -> String {
    errors
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}; Path to error: {}", e, path.trim_start_matches('/').replace('/', "."))
            }
        })
        .next()
        .unwrap_or_else(|| "schema validation failed".to_string())
}

/// Validate the fully combined DSL document. Run once, after imports merge.
pub fn validate_dsl_schema(combined: &serde_yaml::Value) -> DslResult<()> {
    debug!("validating combined DSL against the full schema");
    let instance = to_json(combined)?;
    DSL_SCHEMA
        .validate(&instance)
        .map_err(first_error_path)
        .map_err(|msg| DslParsingError::format(codes::SCHEMA_DSL, msg))
}

/// Validate one document's `imports` section in isolation.
pub fn validate_imports_schema(
    imports_section: &serde_yaml::Value,
    dsl_location: Option<&str>,
) -> DslResult<()> {
    let instance = to_json(imports_section)?;
    IMPORTS_SCHEMA.validate(&instance).map_err(|errors| {
        let msg = first_error_path(errors);
        let located = match dsl_location {
            Some(loc) => format!("Improper \"imports\" section in yaml {loc}; {msg}"),
            None => format!("Improper \"imports\" section; {msg}"),
        };
        DslParsingError::format(codes::SCHEMA_IMPORTS, located)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    #[test]
    fn accepts_minimal_blueprint() {
        let doc: Value = serde_yaml::from_str(
            "blueprint:\n  name: app\n  topology:\n    - name: n\n      type: T\n",
        )
        .unwrap();
        assert!(validate_dsl_schema(&doc).is_ok());
    }

    #[test]
    fn rejects_missing_topology() {
        let doc: Value = serde_yaml::from_str("blueprint:\n  name: app\n").unwrap();
        let err = validate_dsl_schema(&doc).unwrap_err();
        assert_eq!(err.err_code(), codes::SCHEMA_DSL);
    }

    #[test]
    fn rejects_non_string_imports_entries() {
        let doc: Value = serde_yaml::from_str("- 1\n- 2\n").unwrap();
        let err = validate_imports_schema(&doc, Some("file:blueprint.yaml")).unwrap_err();
        assert_eq!(err.err_code(), codes::SCHEMA_IMPORTS);
    }
}
