//! The two fixed JSON schemas the compiler validates against: the full DSL
//! shape (run once, after all imports are combined) and the `imports`
//! section shape (run per source document, before combination).

/// Schema for the fully combined DSL document.
pub const DSL_SCHEMA_JSON: &str = r#"
{
  "type": "object",
  "required": ["blueprint"],
  "properties": {
    "blueprint": {
      "type": "object",
      "required": ["name", "topology"],
      "properties": {
        "name": { "type": "string" },
        "topology": {
          "type": "array",
          "items": {
            "type": "object",
            "required": ["name", "type"],
            "properties": {
              "name": { "type": "string" },
              "type": { "type": "string" },
              "instances": { "type": "object" },
              "relationships": { "type": "array" },
              "properties": { "type": "object" },
              "workflows": { "type": "object" },
              "interfaces": { "type": "array" },
              "policies": { "type": "array" }
            }
          }
        }
      }
    },
    "imports": { "type": "array", "items": { "type": "string" } },
    "types": { "type": "object" },
    "relationships": { "type": "object" },
    "plugins": { "type": "object" },
    "interfaces": { "type": "object" },
    "workflows": { "type": "object" },
    "policies": {
      "type": "object",
      "properties": {
        "types": { "type": "object" },
        "rules": { "type": "object" }
      }
    }
  }
}
"#;

/// Schema for a single document's `imports` section.
pub const IMPORTS_SCHEMA_JSON: &str = r#"
{
  "type": "array",
  "items": { "type": "string" }
}
"#;
