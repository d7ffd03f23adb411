//! The ambient, read-only state threaded through a single parse: no
//! process-wide globals, just a plain struct passed by reference.

use blueprint_dsl_resolver::{AliasMapper, ByteFetcher};

pub struct CompileContext<'a> {
    pub alias_mapping: AliasMapper,
    pub resources_base_url: Option<String>,
    pub fetcher: &'a dyn ByteFetcher,
}

impl<'a> CompileContext<'a> {
    pub fn resolve_location(&self, name: &str, context_url: Option<&str>) -> Option<String> {
        let aliased = self.alias_mapping.apply(name);
        blueprint_dsl_resolver::resolve(
            &aliased,
            self.resources_base_url.as_deref(),
            context_url,
            self.fetcher,
        )
    }
}
