//! Cross-node post-processing: plugin installation, `dependents`,
//! transitive `host_id`, and `plugins_to_install` aggregation.

use blueprint_dsl_types::{
    codes, plugins_to_install_exclude_list, DslParsingError, DslResult, ProcessedNode, CONTAINED_IN_REL_TYPE,
    HOST_TYPE,
};
use serde_yaml::Mapping;
use std::collections::{HashMap, HashSet};

fn is_derived_from(type_name: &str, types: &Mapping, target: &str) -> bool {
    if type_name == target {
        return true;
    }
    match types.get(type_name).and_then(|t| t.get("derived_from")).and_then(|v| v.as_str()) {
        Some(parent) => is_derived_from(parent, types, target),
        None => false,
    }
}

/// `{t | t derived transitively from `target`}`, `target` itself included.
fn build_family_descendants_set(types: &Mapping, target: &str) -> HashSet<String> {
    types
        .keys()
        .filter_map(|k| k.as_str())
        .filter(|name| is_derived_from(name, types, target))
        .map(str::to_string)
        .collect()
}

fn extract_node_host_id(
    node: &ProcessedNode,
    by_id: &HashMap<String, usize>,
    nodes: &[ProcessedNode],
    host_types: &HashSet<String>,
    contained_in_rel_types: &HashSet<String>,
) -> Option<String> {
    if host_types.contains(&node.node_type) {
        return Some(node.id.clone());
    }
    let relationships = node.relationships.as_ref()?;
    for rel in relationships {
        if contained_in_rel_types.contains(&rel.rel_type) {
            let target_idx = *by_id.get(&rel.target_id)?;
            return extract_node_host_id(&nodes[target_idx], by_id, nodes, host_types, contained_in_rel_types);
        }
    }
    None
}

fn add_dependent(node: &mut ProcessedNode, dependent_id: &str) {
    let dependents = node.dependents.get_or_insert_with(Vec::new);
    if !dependents.iter().any(|d| d == dependent_id) {
        dependents.push(dependent_id.to_string());
    }
}

/// Computes `host_id`, `plugins_to_install`, and `dependents` in place, and
/// validates every agent-plugin node is transitively contained in a host.
pub fn post_process_nodes(
    nodes: &mut [ProcessedNode],
    types: &Mapping,
    relationships: &Mapping,
    plugins: &Mapping,
) -> DslResult<()> {
    let by_id: HashMap<String, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id.clone(), i)).collect();

    // Install relationship-declared plugins onto the correct endpoint, and
    // record each relationship's target as depending on its source.
    let mut plugin_installs: Vec<(String, String, blueprint_dsl_types::ProcessedPlugin)> = Vec::new();
    let mut dependent_pairs: Vec<(String, String)> = Vec::new();

    for node in nodes.iter() {
        let Some(rels) = &node.relationships else { continue };
        for rel in rels {
            if let Some(plugin_name) = &rel.plugin {
                let target_node_id = if rel.run_on_node.as_deref() == Some("target") {
                    rel.target_id.clone()
                } else {
                    node.id.clone()
                };
                let plugin_def = plugins
                    .get(plugin_name.as_str())
                    .and_then(|v| v.as_mapping())
                    .cloned()
                    .unwrap_or_default();
                let processed = crate::plugin::process_plugin(&plugin_def, plugin_name)?;
                plugin_installs.push((target_node_id, plugin_name.clone(), processed));
            }
            dependent_pairs.push((rel.target_id.clone(), node.id.clone()));
        }
    }

    for (target_id, plugin_name, processed) in plugin_installs {
        if let Some(&idx) = by_id.get(&target_id) {
            nodes[idx].plugins.insert(plugin_name, processed);
        }
    }
    for (target_id, dependent_id) in dependent_pairs {
        if let Some(&idx) = by_id.get(&target_id) {
            add_dependent(&mut nodes[idx], &dependent_id);
        }
    }

    let host_types = build_family_descendants_set(types, HOST_TYPE);
    let contained_in_rel_types = build_family_descendants_set(relationships, CONTAINED_IN_REL_TYPE);

    let snapshot: Vec<ProcessedNode> = nodes.to_vec();
    for node in nodes.iter_mut() {
        if let Some(host_id) = extract_node_host_id(node, &by_id, &snapshot, &host_types, &contained_in_rel_types) {
            node.host_id = Some(host_id);
        }
    }

    let exclude = plugins_to_install_exclude_list();
    let snapshot: Vec<ProcessedNode> = nodes.to_vec();
    for node in nodes.iter_mut() {
        if !host_types.contains(&node.node_type) {
            continue;
        }
        let mut to_install: HashMap<String, blueprint_dsl_types::ProcessedPlugin> = HashMap::new();
        for other in &snapshot {
            if other.host_id.as_deref() != Some(node.id.as_str()) {
                continue;
            }
            for (plugin_name, plugin) in &other.plugins {
                if plugin.agent_plugin == "true" && !exclude.contains(&plugin.name.as_str()) {
                    to_install.insert(plugin_name.clone(), plugin.clone());
                }
            }
        }
        node.plugins_to_install = Some(to_install.into_values().collect());
    }

    validate_agent_plugins_on_host_nodes(nodes)
}

fn validate_agent_plugins_on_host_nodes(nodes: &[ProcessedNode]) -> DslResult<()> {
    for node in nodes {
        if node.host_id.is_some() {
            continue;
        }
        for plugin in node.plugins.values() {
            if plugin.agent_plugin == "true" {
                return Err(DslParsingError::logic(
                    codes::AGENT_PLUGIN_WITHOUT_HOST,
                    format!(
                        "node {} has no relationship which makes it contained within a host and it has an agent plugin named {}, agent plugins must be installed on a host",
                        node.id, plugin.name
                    ),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;
    use std::collections::HashMap as Map;

    fn node(id: &str, node_type: &str) -> ProcessedNode {
        ProcessedNode {
            id: id.to_string(),
            declared_type: node_type.to_string(),
            node_type: node_type.to_string(),
            properties: Mapping::new(),
            workflows: Map::new(),
            policies: Vec::new(),
            interfaces: None,
            plugins: Map::new(),
            operations: Map::new(),
            relationships: None,
            host_id: None,
            plugins_to_install: None,
            dependents: None,
            instances: Mapping::new(),
        }
    }

    #[test]
    fn host_node_gets_its_own_id_as_host() {
        let types = serde_yaml::from_str::<Value>("host_t:\n  derived_from: cloudify.types.host\n")
            .unwrap()
            .as_mapping()
            .unwrap()
            .clone();
        let mut nodes = vec![node("app.h", "host_t")];
        post_process_nodes(&mut nodes, &types, &Mapping::new(), &Mapping::new()).unwrap();
        assert_eq!(nodes[0].host_id.as_deref(), Some("app.h"));
    }

    #[test]
    fn agent_plugin_without_host_is_rejected() {
        let mut n = node("app.n", "plain_t");
        n.plugins.insert(
            "p1".to_string(),
            blueprint_dsl_types::ProcessedPlugin {
                name: "p1".to_string(),
                agent_plugin: "true".to_string(),
                properties: Mapping::new(),
            },
        );
        let mut nodes = vec![n];
        let err = post_process_nodes(&mut nodes, &Mapping::new(), &Mapping::new(), &Mapping::new()).unwrap_err();
        assert_eq!(err.err_code(), codes::AGENT_PLUGIN_WITHOUT_HOST);
    }
}
