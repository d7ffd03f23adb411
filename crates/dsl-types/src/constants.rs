//! Well-known top-level keys and type/plugin names recognized by the DSL.

pub const BLUEPRINT: &str = "blueprint";
pub const IMPORTS: &str = "imports";
pub const TYPES: &str = "types";
pub const PLUGINS: &str = "plugins";
pub const INTERFACES: &str = "interfaces";
pub const WORKFLOWS: &str = "workflows";
pub const POLICIES: &str = "policies";
pub const RELATIONSHIPS: &str = "relationships";
pub const PROPERTIES: &str = "properties";

/// Top-level keys that may be merged across imports without override.
pub const MERGE_NO_OVERRIDE: &[&str] =
    &[INTERFACES, TYPES, PLUGINS, WORKFLOWS, RELATIONSHIPS];

/// Top-level keys merged one nesting level deep, still without override.
pub const MERGE_ONE_NESTED_LEVEL_NO_OVERRIDE: &[&str] = &[POLICIES];

pub const HOST_TYPE: &str = "cloudify.types.host";
pub const CONTAINED_IN_REL_TYPE: &str = "cloudify.relationships.contained_in";
pub const PLUGIN_INSTALLER_PLUGIN: &str = "cloudify.plugins.plugin_installer";
pub const KV_STORE_PLUGIN: &str = "cloudify.plugins.kv_store";

pub const AGENT_PLUGIN: &str = "cloudify.plugins.agent_plugin";
pub const REMOTE_PLUGIN: &str = "cloudify.plugins.remote_plugin";

/// Plugin names excluded from the `plugins_to_install` aggregation.
pub fn plugins_to_install_exclude_list() -> [&'static str; 2] {
    [PLUGIN_INSTALLER_PLUGIN, KV_STORE_PLUGIN]
}
