//! Workflow and policy value processing: resolving the `{ref: ...}` /
//! inline-key shape that workflows and policy events share.
//!
//! By the time this runs, any `ref` has already been replaced with raw text
//! (see `ref_inline`); this step only picks which field holds the value.

use blueprint_dsl_types::{codes, DslParsingError, DslResult, ProcessedPolicyEvent};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;

const REF_KEY: &str = "ref";

/// Resolve a `{ref: "..."}` or `{<inline_key>: "..."}` value to its string.
pub fn process_ref_or_inline_value(obj: &Value, inline_key: &str) -> DslResult<String> {
    if let Some(ref_value) = obj.get(REF_KEY).and_then(|v| v.as_str()) {
        return Ok(ref_value.to_string());
    }
    obj.get(inline_key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            DslParsingError::logic(
                codes::SCHEMA_DSL,
                format!("expected a \"ref\" or \"{inline_key}\" value, found neither"),
            )
        })
}

pub fn process_workflows(workflows: &Mapping) -> DslResult<HashMap<String, String>> {
    workflows
        .iter()
        .map(|(name, flow)| {
            let name = name.as_str().unwrap_or_default().to_string();
            let value = process_ref_or_inline_value(flow, "radial")?;
            Ok((name, value))
        })
        .collect()
}

pub fn process_policies(
    policies: &Value,
) -> DslResult<(HashMap<String, ProcessedPolicyEvent>, HashMap<String, Value>)> {
    let mut events = HashMap::new();
    let mut rules = HashMap::new();

    if let Some(types) = policies.get("types").and_then(|v| v.as_mapping()) {
        for (name, event) in types {
            let name = name.as_str().unwrap_or_default().to_string();
            let message = event.get("message").and_then(|v| v.as_str()).unwrap_or_default().to_string();
            let policy = process_ref_or_inline_value(event, "policy")?;
            events.insert(name, ProcessedPolicyEvent { message, policy });
        }
    }

    if let Some(rule_map) = policies.get("rules").and_then(|v| v.as_mapping()) {
        for (name, rule) in rule_map {
            let name = name.as_str().unwrap_or_default().to_string();
            rules.insert(name, rule.clone());
        }
    }

    Ok((events, rules))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_ref_over_inline() {
        let v: Value = serde_yaml::from_str("ref: from-ref\nradial: from-inline\n").unwrap();
        assert_eq!(process_ref_or_inline_value(&v, "radial").unwrap(), "from-ref");
    }

    #[test]
    fn falls_back_to_inline_key() {
        let v: Value = serde_yaml::from_str("radial: from-inline\n").unwrap();
        assert_eq!(process_ref_or_inline_value(&v, "radial").unwrap(), "from-inline");
    }
}
