//! Small helpers for walking a `serde_yaml::Value` document without losing
//! scalar typing. The DSL tree is heterogeneous (mappings, sequences,
//! scalars, and post-`ref` inlined text); we operate on it via pattern
//! matching rather than coercing it into a dynamic string-keyed map.

use serde_yaml::{Mapping, Value};

/// `dictionary.get(key, {})`, mirroring `_get_dict_prop`.
pub fn get_dict_prop<'a>(dictionary: &'a Value, key: &str) -> &'a Mapping {
    static EMPTY: once_cell::sync::Lazy<Mapping> = once_cell::sync::Lazy::new(Mapping::new);
    dictionary.get(key).and_then(|v| v.as_mapping()).unwrap_or(&*EMPTY)
}
