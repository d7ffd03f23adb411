//! Resource resolution for the blueprint DSL: turning a logical import or
//! `ref` name into bytes, via URL resolution, alias substitution, and
//! scheme-aware fetching.

mod alias;
mod fetcher;
mod resolver;

pub use alias::AliasMapper;
pub use fetcher::{urlencoding_encode, ByteFetcher, DefaultFetcher};
pub use resolver::resolve;
