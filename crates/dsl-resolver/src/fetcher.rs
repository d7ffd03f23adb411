//! Byte-level fetching for the three schemes the resolver recognizes.
//!
//! Each fetch opens, reads fully, and closes before returning; nothing is
//! cached across calls, matching the DSL compiler's stateless-per-invocation
//! contract.

use std::io;
use std::path::Path;
use tracing::debug;

/// Reads the bytes at a resolved URL. Implementations are expected to be
/// cheap to construct; the default one is a thin wrapper over `reqwest`
/// (blocking) and `std::fs`.
pub trait ByteFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> io::Result<Vec<u8>>;

    /// Probe policy: success means "exists". Failures are silent to callers.
    fn exists(&self, url: &str) -> bool {
        self.fetch(url).is_ok()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFetcher;

impl ByteFetcher for DefaultFetcher {
    fn fetch(&self, url: &str) -> io::Result<Vec<u8>> {
        if let Some(path) = url.strip_prefix("file:") {
            let decoded = urlencoding_decode(path);
            return std::fs::read(Path::new(&decoded));
        }
        if url.starts_with("http:") || url.starts_with("https:") {
            debug!("fetching remote resource {url}");
            return reqwest::blocking::get(url)
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.bytes())
                .map(|b| b.to_vec())
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        }
        if url.starts_with("ftp:") {
            // ftp fetching has no counterpart in the blocking reqwest client
            // available to this compiler; recognized for pass-through
            // resolution only (see DESIGN.md).
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "ftp resource fetching is not supported",
            ));
        }
        // A bare local path that hasn't been turned into a file: url yet.
        std::fs::read(Path::new(url))
    }
}

fn urlencoding_decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            let hi = chars.next();
            let lo = chars.next();
            if let (Some(hi), Some(lo)) = (hi, lo) {
                if let Ok(byte) = u8::from_str_radix(&format!("{hi}{lo}"), 16) {
                    out.push(byte as char);
                    continue;
                }
            }
            out.push('%');
        } else {
            out.push(c);
        }
    }
    out
}

pub fn urlencoding_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
