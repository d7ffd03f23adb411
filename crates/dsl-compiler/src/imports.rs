//! Import graph discovery and merge.
//!
//! Discovery is a DFS over each document's `imports` list, deduplicated by
//! resolved URL and producing a root-first order; every discovered document
//! is parsed once during discovery; the later merge pass walks that same
//! cached set rather than re-reading anything, so a transient change on the
//! filesystem or the far end of an HTTP fetch cannot produce a plan that
//! disagrees with itself.

use crate::context::CompileContext;
use crate::ref_inline::inline_refs;
use crate::yaml::load_yaml;
use blueprint_dsl_schema::validate_imports_schema;
use blueprint_dsl_types::{
    codes, DslParsingError, DslResult, IMPORTS, MERGE_NO_OVERRIDE, MERGE_ONE_NESTED_LEVEL_NO_OVERRIDE,
};
use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Discover the transitive import closure in DFS, root-first order, without
/// merging anything. Used by diagnostics that want to see the import graph
/// a document would pull in without paying for a full compile.
pub fn discover_import_urls(
    parsed_dsl: &Value,
    dsl_location: Option<&str>,
    ctx: &CompileContext,
) -> DslResult<Vec<String>> {
    if parsed_dsl.get(IMPORTS).is_none() {
        return Ok(Vec::new());
    }
    validate_imports_schema(parsed_dsl.get(IMPORTS).unwrap(), dsl_location)?;

    let mut ordered_urls: Vec<String> = Vec::new();
    let mut ordered_docs: Vec<(String, Value)> = Vec::new();
    discover(parsed_dsl, dsl_location, true, &mut ordered_urls, &mut ordered_docs, ctx)?;

    if dsl_location.is_some() && !ordered_urls.is_empty() {
        ordered_urls.remove(0);
    }
    Ok(ordered_urls)
}

pub fn combine_imports(
    parsed_dsl: &Value,
    dsl_location: Option<&str>,
    ctx: &CompileContext,
) -> DslResult<Value> {
    let mut combined = parsed_dsl.clone();
    inline_refs(&mut combined, dsl_location, ctx)?;

    let imports_value = match parsed_dsl.get(IMPORTS) {
        Some(v) => v,
        None => return Ok(combined),
    };
    validate_imports_schema(imports_value, dsl_location)?;

    let mut ordered_urls: Vec<String> = Vec::new();
    let mut ordered_docs: Vec<(String, Value)> = Vec::new();
    discover(parsed_dsl, dsl_location, true, &mut ordered_urls, &mut ordered_docs, ctx)?;

    debug!("merging {} imported document(s)", ordered_docs.len());
    for (url, mut doc) in ordered_docs {
        inline_refs(&mut doc, Some(&url), ctx)?;
        merge_document(&mut combined, &doc, &url)?;
    }

    if let Some(map) = combined.as_mapping_mut() {
        map.remove(IMPORTS);
    }

    Ok(combined)
}

fn discover(
    doc: &Value,
    current_import: Option<&str>,
    is_root: bool,
    ordered_urls: &mut Vec<String>,
    ordered_docs: &mut Vec<(String, Value)>,
    ctx: &CompileContext,
) -> DslResult<()> {
    if let Some(cur) = current_import {
        ordered_urls.push(cur.to_string());
        if !is_root {
            ordered_docs.push((cur.to_string(), doc.clone()));
        }
    }

    let imports = match doc.get(IMPORTS).and_then(|v| v.as_sequence()) {
        Some(seq) => seq.clone(),
        None => return Ok(()),
    };

    if !is_root {
        validate_imports_schema(doc.get(IMPORTS).unwrap(), current_import)?;
    }

    for entry in &imports {
        let name = entry.as_str().ok_or_else(|| {
            DslParsingError::logic(codes::IMPORT_UNRESOLVABLE, "an \"imports\" entry must be a string")
        })?;

        let import_url = ctx.resolve_location(name, current_import).ok_or_else(|| {
            DslParsingError::logic(
                codes::IMPORT_UNRESOLVABLE,
                format!("Failed on import - no suitable location found for import {name}"),
            )
            .with_failed_import(name)
        })?;

        if ordered_urls.contains(&import_url) {
            continue;
        }

        let bytes = ctx.fetcher.fetch(&import_url).map_err(|e| {
            DslParsingError::logic(
                codes::IMPORT_UNRESOLVABLE,
                format!("Failed on import - Unable to open import url {import_url}; {e}"),
            )
            .with_failed_import(import_url.clone())
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let imported_dsl = load_yaml(&text, &format!("Failed to parse import {name} (via {import_url})"))?;

        discover(&imported_dsl, Some(&import_url), false, ordered_urls, ordered_docs, ctx)?;
    }

    Ok(())
}

fn merge_document(combined: &mut Value, imported: &Value, source_url: &str) -> DslResult<()> {
    let imported_map = match imported.as_mapping() {
        Some(m) => m.clone(),
        None => return Ok(()),
    };

    for (key, value) in imported_map {
        if key.as_str() == Some(IMPORTS) {
            continue;
        }
        let key_str = key.as_str().unwrap_or("").to_string();

        let combined_map = combined
            .as_mapping_mut()
            .expect("combined DSL document is always a mapping");

        if !combined_map.contains_key(key_str.as_str()) {
            combined_map.insert(key.clone(), value);
            continue;
        }

        if MERGE_NO_OVERRIDE.contains(&key_str.as_str()) {
            let from_map = value.as_mapping().cloned().unwrap_or_default();
            let to_map = combined_map
                .get_mut(key_str.as_str())
                .and_then(|v| v.as_mapping_mut())
                .ok_or_else(|| {
                    DslParsingError::logic(
                        codes::IMPORT_MERGE_CONFLICT,
                        format!("Failed on import {source_url}: {key_str} is not a mapping"),
                    )
                })?;
            merge_into_or_throw(&from_map, to_map, &key_str, &[])?;
        } else if MERGE_ONE_NESTED_LEVEL_NO_OVERRIDE.contains(&key_str.as_str()) {
            let from_map = value.as_mapping().cloned().unwrap_or_default();
            let to_map = combined_map
                .get_mut(key_str.as_str())
                .and_then(|v| v.as_mapping_mut())
                .ok_or_else(|| {
                    DslParsingError::logic(
                        codes::IMPORT_MERGE_CONFLICT,
                        format!("Failed on import {source_url}: {key_str} is not a mapping"),
                    )
                })?;
            for (nested_key, nested_value) in from_map {
                let nested_key_str = nested_key.as_str().unwrap_or("").to_string();
                if !to_map.contains_key(nested_key_str.as_str()) {
                    to_map.insert(nested_key, nested_value);
                } else {
                    let nested_from = nested_value.as_mapping().cloned().unwrap_or_default();
                    let nested_to = to_map
                        .get_mut(nested_key_str.as_str())
                        .and_then(|v| v.as_mapping_mut())
                        .ok_or_else(|| {
                            DslParsingError::logic(
                                codes::IMPORT_MERGE_CONFLICT,
                                format!("Failed on import {source_url}: {key_str}.{nested_key_str} is not a mapping"),
                            )
                        })?;
                    merge_into_or_throw(&nested_from, nested_to, &key_str, &[nested_key_str])?;
                }
            }
        } else {
            return Err(DslParsingError::logic(
                codes::IMPORT_NON_MERGEABLE_FIELD,
                format!("Failed on import {source_url}: non-mergeable field {key_str}"),
            ));
        }
    }

    Ok(())
}

fn merge_into_or_throw(
    from_map: &Mapping,
    to_map: &mut Mapping,
    top_level_key: &str,
    path_prefix: &[String],
) -> DslResult<()> {
    for (key, value) in from_map {
        let key_str = key.as_str().unwrap_or("?");
        if !to_map.contains_key(key_str) {
            to_map.insert(key.clone(), value.clone());
        } else {
            let mut path: Vec<String> = path_prefix.to_vec();
            path.push(key.as_str().unwrap_or("?").to_string());
            return Err(DslParsingError::logic(
                codes::IMPORT_MERGE_CONFLICT,
                format!(
                    "Failed on import: Could not merge {top_level_key} due to conflict on path {}",
                    path.join(" --> ")
                ),
            ));
        }
    }
    Ok(())
}
