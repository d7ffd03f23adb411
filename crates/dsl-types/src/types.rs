//! The output data model: a fully normalized, self-contained deployment
//! plan, plus the small sum types the DSL needs for interface declarations.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashMap;

/// An element of a type's `interfaces` list: either a bare interface name
/// (implicit autowire) or a single-entry mapping naming the implementing
/// plugin explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElement {
    Implicit(String),
    Explicit { interface: String, plugin: String },
}

impl InterfaceElement {
    pub fn interface_name(&self) -> &str {
        match self {
            InterfaceElement::Implicit(name) => name,
            InterfaceElement::Explicit { interface, .. } => interface,
        }
    }

    /// Parse a raw YAML interfaces-list element.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(InterfaceElement::Implicit(s.clone())),
            Value::Mapping(map) => {
                let (k, v) = map.iter().next()?;
                Some(InterfaceElement::Explicit {
                    interface: k.as_str()?.to_string(),
                    plugin: v.as_str()?.to_string(),
                })
            }
            _ => None,
        }
    }

    /// Render back to the raw YAML shape, used when merging interface lists.
    pub fn to_value(&self) -> Value {
        match self {
            InterfaceElement::Implicit(name) => Value::String(name.clone()),
            InterfaceElement::Explicit { interface, plugin } => {
                let mut map = serde_yaml::Mapping::new();
                map.insert(Value::String(interface.clone()), Value::String(plugin.clone()));
                Value::Mapping(map)
            }
        }
    }
}

/// A fully processed plugin binding, ready for a node's `plugins` map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedPlugin {
    pub name: String,
    pub agent_plugin: String,
    #[serde(flatten)]
    pub properties: serde_yaml::Mapping,
}

/// A flattened relationship instance attached to a processed node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedRelationship {
    #[serde(rename = "type")]
    pub rel_type: String,
    pub target_id: String,
    pub state: String,
    pub workflow: String,
    pub plugin: Option<String>,
    pub bind_at: Option<String>,
    pub run_on_node: Option<String>,
    pub interface: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

/// A processed top-level relationship type (after inheritance merge).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedRelationshipType {
    pub name: String,
    pub plugin: Option<String>,
    pub bind_at: Option<String>,
    pub run_on_node: Option<String>,
    pub workflow: Option<String>,
    pub interface: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

/// One instantiated node, fully resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedNode {
    pub id: String,
    pub declared_type: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub properties: serde_yaml::Mapping,
    pub workflows: HashMap<String, String>,
    pub policies: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<Value>>,
    pub plugins: HashMap<String, ProcessedPlugin>,
    pub operations: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<ProcessedRelationship>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins_to_install: Option<Vec<ProcessedPlugin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependents: Option<Vec<String>>,
    pub instances: serde_yaml::Mapping,
}

/// A processed policy-event definition (`message` + resolved `policy` text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedPolicyEvent {
    pub message: String,
    pub policy: String,
}

/// The compiler's final, self-contained output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub nodes: Vec<ProcessedNode>,
    pub relationships: HashMap<String, ProcessedRelationshipType>,
    pub workflows: HashMap<String, String>,
    pub policies: HashMap<String, Vec<Value>>,
    pub policies_events: HashMap<String, ProcessedPolicyEvent>,
    pub rules: HashMap<String, Value>,
}
