//! Cross-node structural validation that doesn't belong to any single
//! node's own processing: unique node names and globally unique interface
//! names.

use blueprint_dsl_types::{codes, get_dict_prop, DslParsingError, DslResult, INTERFACES, RELATIONSHIPS};
use serde_yaml::Value;
use std::collections::HashSet;

pub fn validate_no_duplicate_nodes(nodes: &[Value]) -> DslResult<()> {
    let mut seen = HashSet::new();
    for node in nodes {
        let name = node.get("name").and_then(|v| v.as_str()).unwrap_or_default();
        if !seen.insert(name.to_string()) {
            return Err(DslParsingError::logic(
                codes::DUPLICATE_NODE_NAME,
                format!("Duplicate node definition detected, there are nodes with name {name} defined more than once"),
            )
            .with_duplicate_node_name(name.to_string()));
        }
    }
    Ok(())
}

fn add_interface_name_or_throw(rel: &Value, seen: &mut HashSet<String>) -> DslResult<()> {
    let Some(name) = rel.get("interface").and_then(|v| v.get("name")).and_then(|v| v.as_str()) else {
        return Ok(());
    };
    if !seen.insert(name.to_string()) {
        return Err(DslParsingError::logic(
            codes::DUPLICATE_INTERFACE_NAME_GLOBAL,
            format!("Illegal duplicate - interface {name} is defined more than once"),
        ));
    }
    Ok(())
}

/// Interface names must be unique across top-level `interfaces`, top-level
/// `relationships[*].interface`, and per-node `relationships[*].interface`.
pub fn validate_no_duplicate_interfaces(combined: &Value, nodes: &[Value]) -> DslResult<()> {
    let top_level_interfaces = get_dict_prop(combined, INTERFACES);
    let top_level_relationships = get_dict_prop(combined, RELATIONSHIPS);

    let mut seen: HashSet<String> = top_level_interfaces.keys().filter_map(|k| k.as_str()).map(str::to_string).collect();

    for (_, rel) in top_level_relationships {
        add_interface_name_or_throw(rel, &mut seen)?;
    }

    for node in nodes {
        if let Some(relationships) = node.get(RELATIONSHIPS).and_then(|v| v.as_sequence()) {
            for rel in relationships {
                add_interface_name_or_throw(rel, &mut seen)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_node_names_are_rejected() {
        let nodes: Vec<Value> = serde_yaml::from_str("[{name: n}, {name: n}]").unwrap();
        let err = validate_no_duplicate_nodes(&nodes).unwrap_err();
        assert_eq!(err.err_code(), codes::DUPLICATE_NODE_NAME);
    }

    #[test]
    fn unique_node_names_pass() {
        let nodes: Vec<Value> = serde_yaml::from_str("[{name: a}, {name: b}]").unwrap();
        validate_no_duplicate_nodes(&nodes).unwrap();
    }

    #[test]
    fn duplicate_interface_across_top_level_and_node_is_rejected() {
        let combined: Value = serde_yaml::from_str(
            "interfaces:\n  iface_a: {}\nrelationships: {}\n",
        )
        .unwrap();
        let nodes: Vec<Value> = serde_yaml::from_str(
            "[{name: n, relationships: [{interface: {name: iface_a}}]}]",
        )
        .unwrap();
        let err = validate_no_duplicate_interfaces(&combined, &nodes).unwrap_err();
        assert_eq!(err.err_code(), codes::DUPLICATE_INTERFACE_NAME_GLOBAL);
    }
}
