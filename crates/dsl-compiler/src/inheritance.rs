//! Flattening a type (or relationship) against its `derived_from` ancestor
//! chain, with cycle detection carried by value along the recursion.

use blueprint_dsl_types::{codes, DslParsingError, DslResult, InterfaceElement};
use serde_yaml::{Mapping, Value};

const DERIVED_FROM: &str = "derived_from";

/// Recursively resolves `name`'s ancestor chain within `container`, folding
/// each level into the next via `merge_fn`, and returns the fully merged
/// object. `visited` accumulates the path walked so far so a repeat can be
/// reported with the full trail.
pub fn extract_complete(
    obj: &Mapping,
    name: &str,
    container: &Mapping,
    merge_fn: impl Fn(&Mapping, &Mapping) -> Mapping + Copy,
    visited: &mut Vec<String>,
    kind: &str,
) -> DslResult<Mapping> {
    if visited.iter().any(|v| v == name) {
        visited.push(name.to_string());
        return Err(DslParsingError::logic(
            codes::CIRCULAR_DEPENDENCY,
            format!(
                "Failed parsing {kind} {name}, Circular dependency detected: {}",
                visited.join(" --> ")
            ),
        )
        .with_circular_dependency(visited.clone()));
    }
    visited.push(name.to_string());

    let current = obj.clone();
    let super_name = match current.get(DERIVED_FROM).and_then(|v| v.as_str()) {
        Some(s) => s.to_string(),
        None => return Ok(current),
    };

    let super_type = container
        .get(super_name.as_str())
        .and_then(|v| v.as_mapping())
        .ok_or_else(|| {
            DslParsingError::logic(
                codes::DERIVED_FROM_MISSING,
                format!(
                    "Missing definition for {kind} {super_name} which is declared as derived by {kind} {name}"
                ),
            )
        })?;

    let complete_super = extract_complete(super_type, &super_name, container, merge_fn, visited, kind)?;
    Ok(merge_fn(&complete_super, &current))
}

/// Relationship merge: a shallow key override, current wins.
pub fn merge_relationship(ancestor: &Mapping, current: &Mapping) -> Mapping {
    let mut merged = ancestor.clone();
    for (k, v) in current {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

/// Type merge: properties/workflows dict-merge (current wins), policies
/// name-keyed list-merge (current wins by name), interfaces merged by
/// interface-name identity preserving ancestor order.
pub fn merge_type(ancestor: &Mapping, current: &Mapping) -> Mapping {
    let mut merged = current.clone();

    merge_dict_field(ancestor, &mut merged, "properties");
    merge_dict_field(ancestor, &mut merged, "workflows");
    merge_named_list_field(ancestor, &mut merged, "policies");
    merge_interfaces_field(ancestor, &mut merged);

    merged
}

fn merge_dict_field(ancestor: &Mapping, merged: &mut Mapping, field: &str) {
    let ancestor_sub = ancestor.get(field).and_then(|v| v.as_mapping()).cloned().unwrap_or_default();
    let current_sub = merged.get(field).and_then(|v| v.as_mapping()).cloned().unwrap_or_default();

    let mut result = ancestor_sub;
    for (k, v) in current_sub {
        result.insert(k, v);
    }
    merged.insert(Value::String(field.to_string()), Value::Mapping(result));
}

fn merge_named_list_field(ancestor: &Mapping, merged: &mut Mapping, field: &str) {
    let ancestor_list = ancestor.get(field).and_then(|v| v.as_sequence()).cloned().unwrap_or_default();
    let current_list = merged.get(field).and_then(|v| v.as_sequence()).cloned().unwrap_or_default();

    let mut by_name: Vec<(String, Value)> = Vec::new();
    for entry in ancestor_list.into_iter().chain(current_list) {
        let name = entry
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if let Some(slot) = by_name.iter_mut().find(|(n, _)| n == &name) {
            slot.1 = entry;
        } else {
            by_name.push((name, entry));
        }
    }
    let result: Vec<Value> = by_name.into_iter().map(|(_, v)| v).collect();
    merged.insert(Value::String(field.to_string()), Value::Sequence(result));
}

fn merge_interfaces_field(ancestor: &Mapping, merged: &mut Mapping) {
    let ancestor_list = ancestor.get("interfaces").and_then(|v| v.as_sequence()).cloned().unwrap_or_default();
    let current_list = merged.get("interfaces").and_then(|v| v.as_sequence()).cloned().unwrap_or_default();

    let mut result: Vec<Value> = ancestor_list;
    for element in current_list {
        let Some(parsed) = InterfaceElement::from_value(&element) else {
            continue;
        };
        let existing_idx = result.iter().position(|e| {
            InterfaceElement::from_value(e).map(|p| p.interface_name().to_string())
                == Some(parsed.interface_name().to_string())
        });
        let rendered = parsed.to_value();
        match existing_idx {
            Some(idx) => result[idx] = rendered,
            None => result.push(rendered),
        }
    }
    merged.insert(Value::String("interfaces".to_string()), Value::Sequence(result));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping_from_yaml(yaml: &str) -> Mapping {
        serde_yaml::from_str::<Value>(yaml).unwrap().as_mapping().unwrap().clone()
    }

    #[test]
    fn type_merge_overrides_and_extends_properties() {
        let mut container = Mapping::new();
        container.insert(
            Value::String("A".to_string()),
            Value::Mapping(mapping_from_yaml("properties:\n  x: 1\n  y: 1\n")),
        );
        container.insert(
            Value::String("B".to_string()),
            Value::Mapping(mapping_from_yaml("derived_from: A\nproperties:\n  y: 2\n  z: 3\n")),
        );
        let b = container.get("B").unwrap().as_mapping().unwrap();
        let mut visited = Vec::new();
        let complete = extract_complete(b, "B", &container, merge_type, &mut visited, "type").unwrap();
        let props = complete.get("properties").unwrap().as_mapping().unwrap();
        assert_eq!(props.get("x").unwrap().as_i64(), Some(1));
        assert_eq!(props.get("y").unwrap().as_i64(), Some(2));
        assert_eq!(props.get("z").unwrap().as_i64(), Some(3));
    }

    #[test]
    fn missing_ancestor_raises_derived_from_missing() {
        let mut container = Mapping::new();
        container.insert(
            Value::String("B".to_string()),
            Value::Mapping(mapping_from_yaml("derived_from: Missing\n")),
        );
        let b = container.get("B").unwrap().as_mapping().unwrap();
        let mut visited = Vec::new();
        let err = extract_complete(b, "B", &container, merge_type, &mut visited, "type").unwrap_err();
        assert_eq!(err.err_code(), codes::DERIVED_FROM_MISSING);
    }

    #[test]
    fn cycle_is_detected_with_full_trail() {
        let mut container = Mapping::new();
        container.insert(Value::String("A".to_string()), Value::Mapping(mapping_from_yaml("derived_from: B\n")));
        container.insert(Value::String("B".to_string()), Value::Mapping(mapping_from_yaml("derived_from: A\n")));
        let a = container.get("A").unwrap().as_mapping().unwrap();
        let mut visited = Vec::new();
        let err = extract_complete(a, "A", &container, merge_type, &mut visited, "type").unwrap_err();
        assert_eq!(err.err_code(), codes::CIRCULAR_DEPENDENCY);
    }
}
