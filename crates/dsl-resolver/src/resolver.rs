//! Maps a logical resource name to an absolute URL.
//!
//! Resolution order: pass-through for already-qualified schemes, then a
//! local-filesystem existence probe, then a join against the URL of the
//! document that referenced the name, then a configured base URL fallback.

use crate::fetcher::{urlencoding_encode, ByteFetcher};
use std::path::Path;

const QUALIFIED_SCHEMES: [&str; 3] = ["http:", "ftp:", "file:"];

/// Resolve `name` to an absolute URL, or `None` if nothing could locate it.
pub fn resolve(
    name: &str,
    base_url: Option<&str>,
    context_url: Option<&str>,
    fetcher: &dyn ByteFetcher,
) -> Option<String> {
    if QUALIFIED_SCHEMES.iter().any(|scheme| name.starts_with(scheme)) {
        return Some(name.to_string());
    }

    if Path::new(name).exists() {
        return Some(format!("file:{}", urlencoding_encode(name)));
    }

    if let Some(context_url) = context_url {
        let base = &context_url[..context_url.rfind('/').map(|i| i + 1).unwrap_or(0)];
        let candidate = format!("{base}{name}");
        if fetcher.exists(&candidate) {
            return Some(candidate);
        }
    }

    if let Some(base_url) = base_url {
        return Some(format!("{base_url}{name}"));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::DefaultFetcher;
    use std::io;

    struct NeverExists;
    impl ByteFetcher for NeverExists {
        fn fetch(&self, _url: &str) -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::NotFound, "nope"))
        }
    }

    #[test]
    fn qualified_schemes_pass_through() {
        let f = NeverExists;
        assert_eq!(
            resolve("http://example.com/a.yaml", None, None, &f),
            Some("http://example.com/a.yaml".to_string())
        );
        assert_eq!(
            resolve("file:/tmp/a.yaml", None, None, &f),
            Some("file:/tmp/a.yaml".to_string())
        );
    }

    #[test]
    fn existing_local_file_becomes_file_url() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap().to_string();
        let f = NeverExists;
        let resolved = resolve(&path, None, None, &f).unwrap();
        assert!(resolved.starts_with("file:"));
    }

    #[test]
    fn falls_back_to_base_url() {
        let f = NeverExists;
        let resolved = resolve(
            "missing.yaml",
            Some("http://example.com/base/"),
            None,
            &f,
        );
        assert_eq!(resolved, Some("http://example.com/base/missing.yaml".to_string()));
    }

    #[test]
    fn returns_none_when_nothing_resolves() {
        let f = NeverExists;
        assert_eq!(resolve("missing.yaml", None, None, &f), None);
    }

    #[test]
    fn default_fetcher_is_constructible() {
        let _ = DefaultFetcher;
    }
}
