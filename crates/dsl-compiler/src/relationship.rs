//! Relationship processing: top-level relationship types (inheritance +
//! field validation) and per-node relationship instances (merge with the
//! type, target qualification, workflow re-processing).

use crate::inheritance::{extract_complete, merge_relationship};
use crate::workflow::process_ref_or_inline_value;
use blueprint_dsl_types::{
    codes, get_dict_prop, DslParsingError, DslResult, ProcessedRelationship, ProcessedRelationshipType, PLUGINS,
    RELATIONSHIPS,
};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;

const BIND_AT_VALUES: [&str; 2] = ["pre_started", "post_started"];
const RUN_ON_NODE_VALUES: [&str; 2] = ["source", "target"];

/// Validates `plugin`/`bind_at`/`run_on_node`, shared by top-level
/// relationship types and per-node relationship instances.
pub fn validate_relationship_fields(rel: &Value, plugins: &Mapping, rel_label: &str) -> DslResult<()> {
    if let Some(plugin_name) = rel.get("plugin").and_then(|v| v.as_str()) {
        if !plugins.contains_key(plugin_name) {
            return Err(DslParsingError::logic(
                codes::RELATIONSHIP_PLUGIN_UNDEFINED,
                format!("Missing definition for plugin {plugin_name}, which is declared for relationship {rel_label}"),
            ));
        }
    }
    if let Some(bind_at) = rel.get("bind_at").and_then(|v| v.as_str()) {
        if !BIND_AT_VALUES.contains(&bind_at) {
            return Err(DslParsingError::logic(
                codes::RELATIONSHIP_BIND_AT_ILLEGAL,
                format!(
                    "Relationship {rel_label} has an illegal \"bind_at\" value {bind_at}; value must be either pre_started or post_started"
                ),
            ));
        }
    }
    if let Some(run_on_node) = rel.get("run_on_node").and_then(|v| v.as_str()) {
        if !RUN_ON_NODE_VALUES.contains(&run_on_node) {
            return Err(DslParsingError::logic(
                codes::RELATIONSHIP_RUN_ON_NODE_ILLEGAL,
                format!(
                    "Relationship {rel_label} has an illegal \"run_on_node\" value {run_on_node}; value must be either source or target"
                ),
            ));
        }
    }
    Ok(())
}

pub fn process_relationships(combined: &Value) -> DslResult<HashMap<String, ProcessedRelationshipType>> {
    let relationships = get_dict_prop(combined, RELATIONSHIPS);
    let plugins = get_dict_prop(combined, PLUGINS);
    let mut processed = HashMap::new();

    for (name, _) in relationships {
        let name_str = name.as_str().unwrap_or_default().to_string();
        let obj = relationships.get(name_str.as_str()).unwrap().as_mapping().cloned().unwrap_or_default();
        let mut visited = Vec::new();
        let complete = extract_complete(&obj, &name_str, relationships, merge_relationship, &mut visited, "relationship")?;

        validate_relationship_fields(&Value::Mapping(complete.clone()), &plugins, &name_str)?;

        let mut final_map = complete;
        final_map.remove("derived_from");

        let workflow = match final_map.get("workflow") {
            Some(w) => Some(process_ref_or_inline_value(w, "radial")?),
            None => None,
        };

        processed.insert(
            name_str.clone(),
            ProcessedRelationshipType {
                name: name_str,
                plugin: final_map.get("plugin").and_then(|v| v.as_str()).map(str::to_string),
                bind_at: final_map.get("bind_at").and_then(|v| v.as_str()).map(str::to_string),
                run_on_node: final_map.get("run_on_node").and_then(|v| v.as_str()).map(str::to_string),
                workflow,
                interface: final_map.get("interface").cloned(),
                extra: final_map,
            },
        );
    }

    Ok(processed)
}

/// Merge each relationship instance declared under a node with its
/// top-level type, target-qualify it, and re-process its workflow.
pub fn process_node_relationships(
    app_name: &str,
    node: &Value,
    node_name: &str,
    node_names_set: &std::collections::HashSet<String>,
    plugins: &Mapping,
    top_level_relationships: &HashMap<String, ProcessedRelationshipType>,
) -> DslResult<Option<Vec<ProcessedRelationship>>> {
    let Some(relationships) = node.get(RELATIONSHIPS).and_then(|v| v.as_sequence()) else {
        return Ok(None);
    };

    let mut processed = Vec::with_capacity(relationships.len());

    for relationship in relationships {
        let rel_type = relationship
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DslParsingError::logic(codes::RELATIONSHIP_TYPE_UNDEFINED, "relationship instance missing \"type\""))?
            .to_string();

        validate_relationship_fields(relationship, plugins, &rel_type)?;

        let target = relationship
            .get("target")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DslParsingError::logic(codes::RELATIONSHIP_TARGET_UNDEFINED, "relationship instance missing \"target\""))?
            .to_string();

        if !node_names_set.contains(&target) {
            return Err(DslParsingError::logic(
                codes::RELATIONSHIP_TARGET_UNDEFINED,
                format!("a relationship instance under node {node_name} of type {rel_type} declares an undefined target node {target}"),
            ));
        }
        if target == node_name {
            return Err(DslParsingError::logic(
                codes::RELATIONSHIP_SELF_TARGET,
                format!("a relationship instance under node {node_name} of type {rel_type} illegally declares the source node as the target node"),
            ));
        }

        let base = top_level_relationships.get(&rel_type).ok_or_else(|| {
            DslParsingError::logic(
                codes::RELATIONSHIP_TYPE_UNDEFINED,
                format!("a relationship instance under node {node_name} declares an undefined relationship type {rel_type}"),
            )
        })?;

        // The instance's own `workflow`, if present and non-null, always wins and is
        // re-processed here; the inherited `workflow` was already processed when the
        // top-level relationship type was built and is reused verbatim otherwise.
        let workflow = match relationship.get("workflow") {
            Some(w) if !matches!(w, Value::Null) => process_ref_or_inline_value(w, "radial")?,
            _ => base
                .workflow
                .clone()
                .filter(|w| !w.is_empty())
                .unwrap_or_else(|| "define stub_workflow\n\t".to_string()),
        };

        let plugin = relationship.get("plugin").and_then(|v| v.as_str()).map(str::to_string).or_else(|| base.plugin.clone());
        let bind_at = relationship.get("bind_at").and_then(|v| v.as_str()).map(str::to_string).or_else(|| base.bind_at.clone());
        let run_on_node = relationship.get("run_on_node").and_then(|v| v.as_str()).map(str::to_string).or_else(|| base.run_on_node.clone());
        let interface = relationship.get("interface").cloned().or_else(|| base.interface.clone());

        let mut extra = base.extra.clone();
        if let Some(instance_map) = relationship.as_mapping() {
            for (k, v) in instance_map {
                extra.insert(k.clone(), v.clone());
            }
        }
        for stripped in ["name", "target", "type", "workflow", "plugin", "bind_at", "run_on_node", "interface"] {
            extra.remove(stripped);
        }

        processed.push(ProcessedRelationship {
            rel_type,
            target_id: format!("{app_name}.{target}"),
            state: "reachable".to_string(),
            workflow,
            plugin,
            bind_at,
            run_on_node,
            interface,
            extra,
        });
    }

    Ok(Some(processed))
}
