//! Blueprint DSL compiler: ingests a YAML blueprint document and produces a
//! fully normalized, self-contained deployment plan.
//!
//! The three public entry points (`parse`, `parse_from_path`,
//! `parse_from_url`) are pure functions of their inputs plus whatever the
//! supplied [`ByteFetcher`] observes at call time: one parse, one plan, no
//! state carried between invocations.

mod autowire;
mod context;
mod imports;
mod inheritance;
mod node;
mod plugin;
mod postprocess;
mod ref_inline;
mod relationship;
mod validate;
mod workflow;
mod yaml;

use blueprint_dsl_resolver::{AliasMapper, ByteFetcher, DefaultFetcher};
use blueprint_dsl_schema::validate_dsl_schema;
use blueprint_dsl_types::{
    codes, get_dict_prop, DslParsingError, DslResult, Plan, BLUEPRINT, INTERFACES, PLUGINS, POLICIES,
    RELATIONSHIPS, TYPES, WORKFLOWS,
};
use context::CompileContext;
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Parse a blueprint given as a YAML string. No document location is known,
/// so relative imports can only resolve against `resources_base_url`.
pub fn parse(
    dsl_string: &str,
    alias_mapping_dict: Option<HashMap<String, String>>,
    alias_mapping_url: Option<&str>,
    resources_base_url: Option<&str>,
) -> DslResult<Plan> {
    let fetcher = DefaultFetcher;
    parse_with_fetcher(dsl_string, None, alias_mapping_dict, alias_mapping_url, resources_base_url, &fetcher)
}

/// Parse a blueprint read from a local file. The file's own path becomes
/// its document location, so its imports resolve relative to it.
pub fn parse_from_path(
    path: &Path,
    alias_mapping_dict: Option<HashMap<String, String>>,
    alias_mapping_url: Option<&str>,
    resources_base_url: Option<&str>,
) -> DslResult<Plan> {
    let dsl_string = std::fs::read_to_string(path).map_err(|e| {
        DslParsingError::format(codes::YAML_MALFORMED, format!("Failed to read DSL file {}: {e}", path.display()))
    })?;
    let fetcher = DefaultFetcher;
    let location = path.to_string_lossy().into_owned();
    parse_with_fetcher(
        &dsl_string,
        Some(location),
        alias_mapping_dict,
        alias_mapping_url,
        resources_base_url,
        &fetcher,
    )
}

/// List the transitive import closure a DSL file would pull in, in DFS
/// root-first order, without performing a full compile. A diagnostic built
/// directly on the import graph builder (see `imports::discover_import_urls`).
pub fn list_imports_from_path(
    path: &Path,
    alias_mapping_dict: Option<HashMap<String, String>>,
    alias_mapping_url: Option<&str>,
    resources_base_url: Option<&str>,
) -> DslResult<Vec<String>> {
    let dsl_string = std::fs::read_to_string(path).map_err(|e| {
        DslParsingError::format(codes::YAML_MALFORMED, format!("Failed to read DSL file {}: {e}", path.display()))
    })?;
    let fetcher = DefaultFetcher;
    let alias_mapping = AliasMapper::load(alias_mapping_dict, alias_mapping_url, &fetcher)?;
    let ctx = CompileContext {
        alias_mapping,
        resources_base_url: resources_base_url.map(str::to_string),
        fetcher: &fetcher,
    };

    let parsed_dsl = yaml::load_yaml(&dsl_string, "Failed to parse DSL")?;
    let location = path.to_string_lossy().into_owned();
    let dsl_location_url = ctx.resolve_location(&location, None).ok_or_else(|| {
        DslParsingError::logic(
            codes::DSL_LOCATION_UNRESOLVABLE,
            format!("Failed on converting dsl location to url - no suitable location found for dsl {location}"),
        )
        .with_failed_import(location.clone())
    })?;

    imports::discover_import_urls(&parsed_dsl, Some(&dsl_location_url), &ctx)
}

/// Parse a blueprint fetched from a URL. The URL becomes its document
/// location.
pub fn parse_from_url(
    dsl_url: &str,
    alias_mapping_dict: Option<HashMap<String, String>>,
    alias_mapping_url: Option<&str>,
    resources_base_url: Option<&str>,
) -> DslResult<Plan> {
    let fetcher = DefaultFetcher;
    let bytes = fetcher.fetch(dsl_url).map_err(|e| {
        DslParsingError::logic(codes::IMPORT_UNRESOLVABLE, format!("Failed to fetch DSL at {dsl_url}: {e}"))
            .with_failed_import(dsl_url)
    })?;
    let dsl_string = String::from_utf8_lossy(&bytes).into_owned();
    parse_with_fetcher(
        &dsl_string,
        Some(dsl_url.to_string()),
        alias_mapping_dict,
        alias_mapping_url,
        resources_base_url,
        &fetcher,
    )
}

fn parse_with_fetcher(
    dsl_string: &str,
    dsl_location: Option<String>,
    alias_mapping_dict: Option<HashMap<String, String>>,
    alias_mapping_url: Option<&str>,
    resources_base_url: Option<&str>,
    fetcher: &dyn ByteFetcher,
) -> DslResult<Plan> {
    let alias_mapping = AliasMapper::load(alias_mapping_dict, alias_mapping_url, fetcher)?;
    let ctx = CompileContext {
        alias_mapping,
        resources_base_url: resources_base_url.map(str::to_string),
        fetcher,
    };

    let parsed_dsl = yaml::load_yaml(dsl_string, "Failed to parse DSL")?;

    let dsl_location_url = match dsl_location {
        Some(loc) => Some(ctx.resolve_location(&loc, None).ok_or_else(|| {
            DslParsingError::logic(
                codes::DSL_LOCATION_UNRESOLVABLE,
                format!("Failed on converting dsl location to url - no suitable location found for dsl {loc}"),
            )
            .with_failed_import(loc.clone())
        })?),
        None => None,
    };

    let combined = imports::combine_imports(&parsed_dsl, dsl_location_url.as_deref(), &ctx)?;
    debug!("combined DSL document assembled, validating against schema");
    validate_dsl_schema(&combined)?;

    let blueprint = combined.get(BLUEPRINT).ok_or_else(|| {
        DslParsingError::format(codes::SCHEMA_DSL, "missing required top-level \"blueprint\" section")
    })?;
    let app_name = blueprint.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let topology = blueprint
        .get("topology")
        .and_then(|v| v.as_sequence())
        .cloned()
        .unwrap_or_default();

    validate::validate_no_duplicate_nodes(&topology)?;
    validate::validate_no_duplicate_interfaces(&combined, &topology)?;

    let top_level_relationships = relationship::process_relationships(&combined)?;

    let (top_level_policies_events, top_level_rules) = match combined.get(POLICIES) {
        Some(policies) => workflow::process_policies(policies)?,
        None => (HashMap::new(), HashMap::new()),
    };

    let types = get_dict_prop(&combined, TYPES).clone();
    let interfaces = get_dict_prop(&combined, INTERFACES).clone();
    let plugins = get_dict_prop(&combined, PLUGINS).clone();
    let relationships_section = get_dict_prop(&combined, RELATIONSHIPS).clone();
    let types_descendants = autowire::build_descendants(&types);

    let node_names_set: HashSet<String> = topology
        .iter()
        .filter_map(|n| n.get("name").and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect();

    info!("processing {} node(s) for blueprint {app_name}", topology.len());
    let mut processed_nodes = Vec::with_capacity(topology.len());
    for node in &topology {
        let processed = node::process_node(
            node,
            &app_name,
            &types,
            &types_descendants,
            &interfaces,
            &plugins,
            &node_names_set,
            &top_level_relationships,
            &top_level_policies_events,
            &top_level_rules,
        )?;
        processed_nodes.push(processed);
    }

    postprocess::post_process_nodes(&mut processed_nodes, &types, &relationships_section, &plugins)?;

    let top_level_workflows = match combined.get(WORKFLOWS).and_then(|v| v.as_mapping()) {
        Some(m) => workflow::process_workflows(m)?,
        None => HashMap::new(),
    };

    let policies_by_node: HashMap<String, Vec<Value>> =
        processed_nodes.iter().map(|n| (n.id.clone(), n.policies.clone())).collect();

    Ok(Plan {
        name: app_name,
        nodes: processed_nodes,
        relationships: top_level_relationships,
        workflows: top_level_workflows,
        policies: policies_by_node,
        policies_events: top_level_policies_events,
        rules: top_level_rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_minimal_blueprint() {
        let dsl = "\
blueprint:
  name: app
  topology:
    - name: n
      type: T
types:
  T:
    properties:
      p: 1
    workflows: {}
    interfaces: []
    policies: []
";
        let plan = parse(dsl, None, None, None).unwrap();
        assert_eq!(plan.name, "app");
        assert_eq!(plan.nodes.len(), 1);
        let node = &plan.nodes[0];
        assert_eq!(node.id, "app.n");
        assert_eq!(node.node_type, "T");
        assert_eq!(node.properties.get("p").unwrap().as_i64(), Some(1));
        assert!(node.properties.get("cloudify_runtime").unwrap().as_mapping().unwrap().is_empty());
        assert_eq!(node.instances.get("deploy").unwrap().as_i64(), Some(1));
        assert!(node.relationships.is_none());
    }

    #[test]
    fn s2_inheritance_override() {
        let dsl = "\
blueprint:
  name: app
  topology:
    - name: n
      type: B
types:
  A:
    properties:
      x: 1
      y: 1
  B:
    derived_from: A
    properties:
      y: 2
      z: 3
";
        let plan = parse(dsl, None, None, None).unwrap();
        let props = &plan.nodes[0].properties;
        assert_eq!(props.get("x").unwrap().as_i64(), Some(1));
        assert_eq!(props.get("y").unwrap().as_i64(), Some(2));
        assert_eq!(props.get("z").unwrap().as_i64(), Some(3));
    }

    #[test]
    fn s3_autowire_leaf() {
        let dsl = "\
blueprint:
  name: app
  topology:
    - name: n
      type: A
types:
  A: {}
  B:
    derived_from: A
";
        let plan = parse(dsl, None, None, None).unwrap();
        assert_eq!(plan.nodes[0].node_type, "B");
        assert_eq!(plan.nodes[0].declared_type, "A");
    }

    #[test]
    fn s4_relationship_merge_and_host() {
        let dsl = "\
blueprint:
  name: app
  topology:
    - name: n1
      type: host_t
    - name: n2
      type: plain_t
      relationships:
        - type: contained_in_derived
          target: n1
types:
  cloudify.types.host: {}
  host_t:
    derived_from: cloudify.types.host
  plain_t: {}
relationships:
  cloudify.relationships.contained_in: {}
  contained_in_derived:
    derived_from: cloudify.relationships.contained_in
";
        let plan = parse(dsl, None, None, None).unwrap();
        let n1 = plan.nodes.iter().find(|n| n.id == "app.n1").unwrap();
        let n2 = plan.nodes.iter().find(|n| n.id == "app.n2").unwrap();
        assert_eq!(n2.host_id.as_deref(), Some("app.n1"));
        assert_eq!(n1.dependents.as_deref(), Some(&["app.n2".to_string()][..]));
    }

    #[test]
    fn s5_duplicate_import_key_is_fatal() {
        struct MapFetcher(HashMap<&'static str, &'static str>);
        impl ByteFetcher for MapFetcher {
            fn fetch(&self, url: &str) -> std::io::Result<Vec<u8>> {
                self.0
                    .get(url)
                    .map(|s| s.as_bytes().to_vec())
                    .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, url.to_string()))
            }
        }
        let mut files = HashMap::new();
        files.insert("file:a.yaml", "types:\n  T:\n    properties: {}\n");
        files.insert("file:b.yaml", "types:\n  T:\n    properties: {}\n");
        let fetcher = MapFetcher(files);
        let dsl = "\
imports:
  - file:a.yaml
  - file:b.yaml
blueprint:
  name: app
  topology: []
";
        let err = parse_with_fetcher(dsl, None, None, None, None, &fetcher).unwrap_err();
        assert_eq!(err.err_code(), codes::IMPORT_MERGE_CONFLICT);
    }

    #[test]
    fn s6_agent_plugin_without_host_is_rejected() {
        let dsl = "\
blueprint:
  name: app
  topology:
    - name: n
      type: T
      interfaces:
        - plumbing
types:
  T: {}
interfaces:
  plumbing:
    operations: [install]
plugins:
  plumbing_plugin:
    derived_from: cloudify.plugins.agent_plugin
    properties:
      interface: plumbing
";
        let err = parse(dsl, None, None, None).unwrap_err();
        assert_eq!(err.err_code(), codes::AGENT_PLUGIN_WITHOUT_HOST);
    }

    #[test]
    fn idempotent_reparse_yields_equal_plan() {
        let dsl = "\
blueprint:
  name: app
  topology:
    - name: n
      type: T
types:
  T:
    properties:
      p: 1
";
        let first = parse(dsl, None, None, None).unwrap();
        let second = parse(dsl, None, None, None).unwrap();
        assert_eq!(
            serde_yaml::to_string(&first).unwrap(),
            serde_yaml::to_string(&second).unwrap()
        );
    }
}
