//! Plugin normalization: turning a raw plugin declaration into the flat
//! shape a node's `plugins` map stores.

use blueprint_dsl_types::{codes, DslParsingError, DslResult, ProcessedPlugin, AGENT_PLUGIN, PROPERTIES, REMOTE_PLUGIN};
use serde_yaml::{Mapping, Value};

pub fn process_plugin(plugin: &Mapping, plugin_name: &str) -> DslResult<ProcessedPlugin> {
    let derived_from = plugin
        .get("derived_from")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    if derived_from != AGENT_PLUGIN && derived_from != REMOTE_PLUGIN {
        return Err(DslParsingError::logic(
            codes::PLUGIN_ILLEGAL_DERIVED_FROM,
            format!(
                "plugin {plugin_name} has an illegal \"derived_from\" value {derived_from}; value must be either {AGENT_PLUGIN} or {REMOTE_PLUGIN}"
            ),
        ));
    }

    let properties = plugin
        .get(PROPERTIES)
        .and_then(|v| v.as_mapping())
        .cloned()
        .unwrap_or_default();

    Ok(ProcessedPlugin {
        name: plugin_name.to_string(),
        agent_plugin: (derived_from == AGENT_PLUGIN).to_string(),
        properties,
    })
}
