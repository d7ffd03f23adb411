//! Alias mapping: a flat `name -> name` substitution applied before every
//! import and `ref` resolution. Composed from two optional sources, in
//! order, with later entries winning.

use crate::fetcher::ByteFetcher;
use blueprint_dsl_types::{codes, DslParsingError, DslResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct AliasMapper {
    aliases: HashMap<String, String>,
}

impl AliasMapper {
    /// Compose the alias table from a URL-loaded mapping and/or an inline
    /// mapping. The inline mapping is applied last, so it wins on conflict.
    pub fn load(
        alias_mapping_dict: Option<HashMap<String, String>>,
        alias_mapping_url: Option<&str>,
        fetcher: &dyn ByteFetcher,
    ) -> DslResult<Self> {
        let mut aliases = HashMap::new();

        if let Some(url) = alias_mapping_url {
            let bytes = fetcher.fetch(url).map_err(|e| {
                DslParsingError::format(
                    codes::YAML_MALFORMED,
                    format!("Failed to fetch alias-mapping at {url}: {e}"),
                )
            })?;
            let text = String::from_utf8_lossy(&bytes);
            let loaded: HashMap<String, String> = serde_yaml::from_str(&text).map_err(|e| {
                DslParsingError::format(
                    codes::YAML_MALFORMED,
                    format!("Failed to parse alias-mapping: {e}"),
                )
            })?;
            aliases.extend(loaded);
        }

        if let Some(dict) = alias_mapping_dict {
            aliases.extend(dict);
        }

        Ok(Self { aliases })
    }

    pub fn apply(&self, name: &str) -> String {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct StaticFetcher(&'static str);
    impl ByteFetcher for StaticFetcher {
        fn fetch(&self, _url: &str) -> io::Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    #[test]
    fn inline_overrides_url_loaded() {
        let fetcher = StaticFetcher("foo: bar\nbaz: qux\n");
        let mut inline = HashMap::new();
        inline.insert("foo".to_string(), "override".to_string());

        let mapper =
            AliasMapper::load(Some(inline), Some("http://example.com/aliases.yaml"), &fetcher)
                .unwrap();

        assert_eq!(mapper.apply("foo"), "override");
        assert_eq!(mapper.apply("baz"), "qux");
        assert_eq!(mapper.apply("unmapped"), "unmapped");
    }

    #[test]
    fn empty_mapper_is_identity() {
        let mapper = AliasMapper::default();
        assert_eq!(mapper.apply("anything"), "anything");
    }
}
