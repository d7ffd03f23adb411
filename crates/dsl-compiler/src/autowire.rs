//! Type and plugin autowiring: substituting a declared name with the
//! unique candidate the DSL leaves implicit.

use blueprint_dsl_types::{codes, DslParsingError, DslResult, PROPERTIES};
use serde_yaml::Mapping;
use std::collections::HashMap;

/// `derived_from` child index: every declared type name maps to the list
/// of types that directly derive from it, in declaration order.
pub fn build_descendants(types: &Mapping) -> HashMap<String, Vec<String>> {
    let mut descendants: HashMap<String, Vec<String>> =
        types.keys().filter_map(|k| k.as_str()).map(|k| (k.to_string(), Vec::new())).collect();

    for (name, content) in types {
        let Some(name) = name.as_str() else { continue };
        if let Some(parent) = content.get("derived_from").and_then(|v| v.as_str()) {
            descendants.entry(parent.to_string()).or_default().push(name.to_string());
        }
    }
    descendants
}

/// Walk the descendant index from `declared_name` down to its unique leaf.
pub fn autowire_type(declared_name: &str, descendants: &HashMap<String, Vec<String>>) -> DslResult<String> {
    let mut path = vec![declared_name.to_string()];
    let mut current = declared_name.to_string();

    loop {
        let children = descendants.get(&current).cloned().unwrap_or_default();
        if children.is_empty() {
            return Ok(current);
        }
        if children.len() > 1 {
            return Err(DslParsingError::logic(
                codes::AUTOWIRE_TYPE_AMBIGUOUS,
                format!(
                    "Ambiguous autowiring of type {declared_name} detected, more than one candidate - {children:?}"
                ),
            )
            .with_descendants(children));
        }
        let candidate = children.into_iter().next().unwrap();
        if path.contains(&candidate) {
            path.push(candidate);
            path.reverse();
            return Err(DslParsingError::logic(
                codes::CIRCULAR_DEPENDENCY,
                format!("Failed parsing type {declared_name}, Circular dependency detected: {}", path.join(" --> ")),
            )
            .with_circular_dependency(path));
        }
        path.push(candidate.clone());
        current = candidate;
    }
}

/// Select the unique plugin whose `properties.interface` matches `interface_name`.
pub fn autowire_plugin(plugins: &Mapping, interface_name: &str, type_name: &str) -> DslResult<String> {
    let matching: Vec<String> = plugins
        .iter()
        .filter_map(|(name, data)| {
            let implements = data
                .get(PROPERTIES)
                .and_then(|p| p.get("interface"))
                .and_then(|v| v.as_str());
            if implements == Some(interface_name) {
                name.as_str().map(|s| s.to_string())
            } else {
                None
            }
        })
        .collect();

    match matching.len() {
        0 => Err(DslParsingError::logic(
            codes::AUTOWIRE_PLUGIN_MISS,
            format!(
                "Failed to find a plugin which implements interface {interface_name} as implicitly declared for type {type_name}"
            ),
        )),
        1 => Ok(matching.into_iter().next().unwrap()),
        _ => Err(DslParsingError::logic(
            codes::AUTOWIRE_PLUGIN_AMBIGUOUS,
            format!(
                "Ambiguous implicit declaration for interface {interface_name} implementation under type {type_name} - Found multiple matching plugins: ({})",
                matching.join(",")
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn types_from_yaml(yaml: &str) -> Mapping {
        serde_yaml::from_str::<Value>(yaml).unwrap().as_mapping().unwrap().clone()
    }

    #[test]
    fn autowires_to_unique_leaf() {
        let types = types_from_yaml("A: {}\nB:\n  derived_from: A\n");
        let descendants = build_descendants(&types);
        assert_eq!(autowire_type("A", &descendants).unwrap(), "B");
    }

    #[test]
    fn leaf_with_no_descendants_is_itself() {
        let types = types_from_yaml("A: {}\n");
        let descendants = build_descendants(&types);
        assert_eq!(autowire_type("A", &descendants).unwrap(), "A");
    }

    #[test]
    fn ambiguous_descendants_raise_103() {
        let types = types_from_yaml("A: {}\nB:\n  derived_from: A\nC:\n  derived_from: A\n");
        let descendants = build_descendants(&types);
        let err = autowire_type("A", &descendants).unwrap_err();
        assert_eq!(err.err_code(), codes::AUTOWIRE_TYPE_AMBIGUOUS);
    }

    #[test]
    fn plugin_autowire_miss_and_ambiguous() {
        let plugins = types_from_yaml(
            "p1:\n  properties:\n    interface: iface\np2:\n  properties:\n    interface: iface\n",
        );
        let err = autowire_plugin(&plugins, "iface", "T").unwrap_err();
        assert_eq!(err.err_code(), codes::AUTOWIRE_PLUGIN_AMBIGUOUS);

        let empty = Mapping::new();
        let err = autowire_plugin(&empty, "iface", "T").unwrap_err();
        assert_eq!(err.err_code(), codes::AUTOWIRE_PLUGIN_MISS);
    }
}
