//! Node processor: resolves a node declaration's type, merges it with the
//! node's own overrides, attaches plugins/operations, processes relationship
//! instances, and validates node-level policies.

use crate::autowire::{autowire_plugin, autowire_type};
use crate::inheritance::{extract_complete, merge_type};
use crate::relationship::process_node_relationships;
use crate::workflow::process_workflows;
use blueprint_dsl_types::{
    codes, DslParsingError, DslResult, InterfaceElement, ProcessedNode, ProcessedPlugin,
    ProcessedPolicyEvent, ProcessedRelationshipType, INTERFACES, POLICIES, PROPERTIES, WORKFLOWS,
};
use serde_yaml::{Mapping, Value};
use std::collections::{HashMap, HashSet};

/// `_extract_complete_node_type`: flatten the node's declared type against
/// its ancestor chain, then merge the node's own overrides on top using the
/// same per-field type-merge rules.
fn extract_complete_node_type(
    node_type: &Mapping,
    node_type_name: &str,
    types: &Mapping,
    node: &Mapping,
) -> DslResult<Mapping> {
    let mut visited = Vec::new();
    let complete_type = extract_complete(node_type, node_type_name, types, merge_type, &mut visited, "type")?;
    Ok(merge_type(&complete_type, node))
}

fn validate_no_duplicate_interfaces_for_node(interfaces: &[Value], node_name: &str) -> DslResult<()> {
    let mut seen = HashSet::new();
    for element in interfaces {
        let Some(parsed) = InterfaceElement::from_value(element) else {
            continue;
        };
        let name = parsed.interface_name().to_string();
        if !seen.insert(name.clone()) {
            return Err(DslParsingError::logic(
                codes::DUPLICATE_INTERFACE_NAME_NODE,
                format!("Duplicate interface definition detected on node {node_name}, interface {name} has duplicate definition"),
            )
            .with_duplicate_interface_name(name, node_name.to_string()));
        }
    }
    Ok(())
}

fn validate_node_policies(
    policies: &[Value],
    node_name: &str,
    policies_events: &HashMap<String, ProcessedPolicyEvent>,
    rules: &HashMap<String, Value>,
) -> DslResult<()> {
    for policy in policies {
        let policy_name = policy.get("name").and_then(|v| v.as_str()).unwrap_or_default();
        if !policies_events.contains_key(policy_name) {
            return Err(DslParsingError::logic(
                codes::NODE_POLICY_UNDEFINED,
                format!("Failed to parse node {node_name}: policy {policy_name} not defined"),
            ));
        }
        if let Some(rule_list) = policy.get("rules").and_then(|v| v.as_sequence()) {
            for rule in rule_list {
                let rule_type = rule.get("type").and_then(|v| v.as_str()).unwrap_or_default();
                if !rules.contains_key(rule_type) {
                    return Err(DslParsingError::logic(
                        codes::NODE_POLICY_RULE_UNDEFINED,
                        format!("Failed to parse node {node_name}: rule {rule_type} under policy {policy_name} not defined"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn process_plugin(plugin: &Mapping, plugin_name: &str) -> DslResult<ProcessedPlugin> {
    crate::plugin::process_plugin(plugin, plugin_name)
}

#[allow(clippy::too_many_arguments)]
pub fn process_node(
    node: &Value,
    app_name: &str,
    types: &Mapping,
    types_descendants: &HashMap<String, Vec<String>>,
    interfaces: &Mapping,
    plugins: &Mapping,
    node_names_set: &HashSet<String>,
    top_level_relationships: &HashMap<String, ProcessedRelationshipType>,
    top_level_policies_events: &HashMap<String, ProcessedPolicyEvent>,
    top_level_rules: &HashMap<String, Value>,
) -> DslResult<ProcessedNode> {
    let node_map = node.as_mapping().cloned().unwrap_or_default();
    let node_name = node.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let declared_type = node.get("type").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let id = format!("{app_name}.{node_name}");

    if !types_descendants.contains_key(&declared_type) {
        let known: Vec<&str> = types.keys().filter_map(|k| k.as_str()).collect();
        return Err(DslParsingError::logic(
            codes::NODE_TYPE_NOT_FOUND,
            format!("Could not locate node type: {declared_type}; existing types: {known:?}"),
        ));
    }

    let node_type_name = autowire_type(&declared_type, types_descendants)?;
    let node_type = types
        .get(node_type_name.as_str())
        .and_then(|v| v.as_mapping())
        .cloned()
        .unwrap_or_default();
    let complete = extract_complete_node_type(&node_type, &node_type_name, types, &node_map)?;

    let properties = complete.get(PROPERTIES).and_then(|v| v.as_mapping()).cloned().unwrap_or_default();
    let workflows_raw = complete.get(WORKFLOWS).and_then(|v| v.as_mapping()).cloned().unwrap_or_default();
    let policies = complete.get(POLICIES).and_then(|v| v.as_sequence()).cloned().unwrap_or_default();
    let interfaces_list = complete.get(INTERFACES).and_then(|v| v.as_sequence()).cloned().unwrap_or_default();

    if !interfaces_list.is_empty() && plugins.is_empty() {
        return Err(DslParsingError::logic(
            codes::INTERFACES_WITHOUT_PLUGINS,
            "Must provide plugins section when providing interfaces section",
        ));
    }

    validate_no_duplicate_interfaces_for_node(&interfaces_list, &node_name)?;

    let mut node_plugins: HashMap<String, ProcessedPlugin> = HashMap::new();
    let mut operations: HashMap<String, Option<String>> = HashMap::new();

    for element in &interfaces_list {
        let parsed = InterfaceElement::from_value(element).ok_or_else(|| {
            DslParsingError::logic(codes::SCHEMA_DSL, "interfaces list element must be a string or a single-entry mapping")
        })?;

        let (interface_name, plugin_name) = match &parsed {
            InterfaceElement::Explicit { interface, plugin } => {
                let plugin_data = plugins.get(plugin.as_str()).and_then(|v| v.as_mapping()).ok_or_else(|| {
                    DslParsingError::logic(
                        codes::EXPLICIT_PLUGIN_NOT_DEFINED,
                        format!(
                            "Missing definition for plugin {plugin} which is explicitly declared to implement interface {interface} for type {node_type_name}"
                        ),
                    )
                })?;
                let declared_interface = plugin_data
                    .get(PROPERTIES)
                    .and_then(|v| v.as_mapping())
                    .and_then(|p| p.get("interface"))
                    .and_then(|v| v.as_str());
                if declared_interface != Some(interface.as_str()) {
                    return Err(DslParsingError::logic(
                        codes::EXPLICIT_PLUGIN_WRONG_INTERFACE,
                        format!(
                            "Illegal explicit plugin declaration for type {node_type_name}: the plugin {plugin} does not implement interface {interface}"
                        ),
                    ));
                }
                (interface.clone(), plugin.clone())
            }
            InterfaceElement::Implicit(name) => {
                let plugin_name = autowire_plugin(plugins, name, &node_type_name)?;
                (name.clone(), plugin_name)
            }
        };

        let plugin_mapping = plugins.get(plugin_name.as_str()).and_then(|v| v.as_mapping()).cloned().unwrap_or_default();
        let processed_plugin = process_plugin(&plugin_mapping, &plugin_name)?;
        node_plugins.insert(plugin_name.clone(), processed_plugin);

        let interface_def = interfaces.get(interface_name.as_str()).and_then(|v| v.as_mapping()).ok_or_else(|| {
            DslParsingError::logic(codes::INTERFACE_NOT_DEFINED, format!("Missing interface {interface_name} definition"))
        })?;
        let ops = interface_def.get("operations").and_then(|v| v.as_sequence()).cloned().unwrap_or_default();
        for op in ops {
            let op_name = op.as_str().unwrap_or_default().to_string();
            if operations.contains_key(&op_name) {
                operations.insert(op_name, None);
            } else {
                operations.insert(op_name, Some(plugin_name.clone()));
            }
            operations.insert(format!("{interface_name}.{}", op.as_str().unwrap_or_default()), Some(plugin_name.clone()));
        }
    }

    let operations: HashMap<String, String> =
        operations.into_iter().filter_map(|(k, v)| v.map(|plugin| (k, plugin))).collect();

    let relationships =
        process_node_relationships(app_name, node, &node_name, node_names_set, plugins, top_level_relationships)?;

    let mut properties = properties;
    properties.insert(Value::String("cloudify_runtime".to_string()), Value::Mapping(Mapping::new()));

    let workflows = process_workflows(&workflows_raw)?;

    validate_node_policies(&policies, &node_name, top_level_policies_events, top_level_rules)?;

    let instances = node
        .get("instances")
        .and_then(|v| v.as_mapping())
        .cloned()
        .unwrap_or_else(|| {
            let mut m = Mapping::new();
            m.insert(Value::String("deploy".to_string()), Value::Number(serde_yaml::Number::from(1)));
            m
        });

    Ok(ProcessedNode {
        id,
        declared_type,
        node_type: node_type_name,
        properties,
        workflows,
        policies,
        interfaces: None,
        plugins: node_plugins,
        operations,
        relationships,
        host_id: None,
        plugins_to_install: None,
        dependents: None,
        instances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping_from_yaml(yaml: &str) -> Mapping {
        serde_yaml::from_str::<Value>(yaml).unwrap().as_mapping().unwrap().clone()
    }

    #[test]
    fn minimal_node_gets_cloudify_runtime_and_default_instances() {
        let types = mapping_from_yaml("T:\n  properties:\n    p: 1\n");
        let descendants = HashMap::from([("T".to_string(), Vec::new())]);
        let node: Value = serde_yaml::from_str("name: n\ntype: T\n").unwrap();
        let node_names = HashSet::from(["n".to_string()]);
        let processed = process_node(
            &node,
            "app",
            &types,
            &descendants,
            &Mapping::new(),
            &Mapping::new(),
            &node_names,
            &HashMap::new(),
            &HashMap::new(),
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(processed.id, "app.n");
        assert_eq!(processed.node_type, "T");
        assert!(processed.properties.contains_key("cloudify_runtime"));
        assert_eq!(processed.properties.get("p").unwrap().as_i64(), Some(1));
        assert_eq!(processed.instances.get("deploy").unwrap().as_i64(), Some(1));
    }

    #[test]
    fn unknown_declared_type_raises_7() {
        let types = Mapping::new();
        let descendants = HashMap::new();
        let node: Value = serde_yaml::from_str("name: n\ntype: Missing\n").unwrap();
        let node_names = HashSet::from(["n".to_string()]);
        let err = process_node(
            &node,
            "app",
            &types,
            &descendants,
            &Mapping::new(),
            &Mapping::new(),
            &node_names,
            &HashMap::new(),
            &HashMap::new(),
            &HashMap::new(),
        )
        .unwrap_err();
        assert_eq!(err.err_code(), codes::NODE_TYPE_NOT_FOUND);
    }
}
