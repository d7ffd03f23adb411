//! Replaces every mapping entry `ref: <name>` with the raw text fetched
//! from the resource `<name>` resolves to. The substitution is textual,
//! not structural: a `ref` value is never re-parsed, since downstream
//! consumers (e.g. a `radial` workflow body) treat it as an opaque string.

use crate::context::CompileContext;
use blueprint_dsl_types::{codes, DslParsingError, DslResult};
use serde_yaml::Value;

const REF_KEY: &str = "ref";

pub fn inline_refs(value: &mut Value, context_url: Option<&str>, ctx: &CompileContext) -> DslResult<()> {
    match value {
        Value::Sequence(items) => {
            for item in items.iter_mut() {
                inline_refs(item, context_url, ctx)?;
            }
            Ok(())
        }
        Value::Mapping(map) => {
            for (key, entry) in map.iter_mut() {
                if key.as_str() == Some(REF_KEY) {
                    let name = entry
                        .as_str()
                        .ok_or_else(|| {
                            DslParsingError::logic(
                                codes::REF_UNRESOLVABLE,
                                "Failed on ref - ref value must be a string",
                            )
                        })?
                        .to_string();
                    let text = fetch_ref(&name, context_url, ctx)?;
                    *entry = Value::String(text);
                } else {
                    inline_refs(entry, context_url, ctx)?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn fetch_ref(name: &str, context_url: Option<&str>, ctx: &CompileContext) -> DslResult<String> {
    let url = ctx.resolve_location(name, context_url).ok_or_else(|| {
        DslParsingError::logic(
            codes::REF_UNRESOLVABLE,
            format!("Failed on ref - Unable to locate ref {name}"),
        )
    })?;
    let bytes = ctx.fetcher.fetch(&url).map_err(|e| {
        DslParsingError::logic(
            codes::REF_UNRESOLVABLE,
            format!("Failed on ref - Unable to open file {name} (searched for {url}): {e}"),
        )
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_dsl_resolver::{AliasMapper, ByteFetcher, DefaultFetcher};
    use std::io;

    struct StaticFetcher(&'static str);
    impl ByteFetcher for StaticFetcher {
        fn fetch(&self, _url: &str) -> io::Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    #[test]
    fn inlines_ref_values_as_text() {
        let fetcher = StaticFetcher("define stub_workflow\n\t");
        let ctx = CompileContext {
            alias_mapping: AliasMapper::default(),
            resources_base_url: Some("http://example.com/".to_string()),
            fetcher: &fetcher,
        };
        let mut doc: Value = serde_yaml::from_str("workflows:\n  install:\n    ref: install.radial\n").unwrap();
        inline_refs(&mut doc, None, &ctx).unwrap();
        let resolved = doc
            .get("workflows")
            .unwrap()
            .get("install")
            .unwrap()
            .get("ref")
            .unwrap()
            .as_str()
            .unwrap();
        assert_eq!(resolved, "define stub_workflow\n\t");
    }

    #[test]
    fn leaves_non_ref_values_untouched() {
        let fetcher = DefaultFetcher;
        let ctx = CompileContext {
            alias_mapping: AliasMapper::default(),
            resources_base_url: None,
            fetcher: &fetcher,
        };
        let mut doc: Value = serde_yaml::from_str("a:\n  b: 1\n").unwrap();
        inline_refs(&mut doc, None, &ctx).unwrap();
        assert_eq!(doc.get("a").unwrap().get("b").unwrap().as_i64(), Some(1));
    }
}
