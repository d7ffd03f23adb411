//! Error model: numeric-coded format and logic exceptions.
//!
//! Format errors (negative or small codes) mean the document could not be
//! parsed at all. Logic errors mean the document parsed but violates one of
//! the DSL's semantic invariants. Both carry a stable `err_code` that is part
//! of the public contract; only the message text is free to change.

use std::fmt;

/// Structured context attached to specific logic error codes so callers can
/// react programmatically instead of scraping the message text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    pub failed_import: Option<String>,
    pub circular_dependency: Option<Vec<String>>,
    pub duplicate_node_name: Option<String>,
    pub duplicate_interface_name: Option<String>,
    pub node_name: Option<String>,
    pub descendants: Option<Vec<String>>,
}

impl ErrorContext {
    fn is_empty(&self) -> bool {
        self == &ErrorContext::default()
    }
}

/// A format error: the input bytes do not parse into a well-formed,
/// schema-valid DSL document at all.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[format {err_code}] {message}")]
pub struct DslFormatError {
    pub err_code: i32,
    pub message: String,
}

/// A logic error: the document parses, but violates a semantic invariant.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[logic {err_code}] {message}")]
pub struct DslLogicError {
    pub err_code: i32,
    pub message: String,
    pub context: ErrorContext,
}

/// The top-level error type returned by every compiler entry point.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DslParsingError {
    #[error(transparent)]
    Format(#[from] DslFormatError),
    #[error(transparent)]
    Logic(#[from] DslLogicError),
}

impl DslParsingError {
    /// The stable numeric error code for this failure.
    pub fn err_code(&self) -> i32 {
        match self {
            DslParsingError::Format(e) => e.err_code,
            DslParsingError::Logic(e) => e.err_code,
        }
    }

    pub fn format(code: i32, message: impl Into<String>) -> Self {
        DslParsingError::Format(DslFormatError {
            err_code: code,
            message: message.into(),
        })
    }

    pub fn logic(code: i32, message: impl Into<String>) -> Self {
        DslParsingError::Logic(DslLogicError {
            err_code: code,
            message: message.into(),
            context: ErrorContext::default(),
        })
    }

    pub fn with_failed_import(mut self, url: impl Into<String>) -> Self {
        if let DslParsingError::Logic(e) = &mut self {
            e.context.failed_import = Some(url.into());
        }
        self
    }

    pub fn with_circular_dependency(mut self, trail: Vec<String>) -> Self {
        if let DslParsingError::Logic(e) = &mut self {
            e.context.circular_dependency = Some(trail);
        }
        self
    }

    pub fn with_duplicate_node_name(mut self, name: impl Into<String>) -> Self {
        if let DslParsingError::Logic(e) = &mut self {
            e.context.duplicate_node_name = Some(name.into());
        }
        self
    }

    pub fn with_duplicate_interface_name(
        mut self,
        interface_name: impl Into<String>,
        node_name: impl Into<String>,
    ) -> Self {
        if let DslParsingError::Logic(e) = &mut self {
            e.context.duplicate_interface_name = Some(interface_name.into());
            e.context.node_name = Some(node_name.into());
        }
        self
    }

    pub fn with_descendants(mut self, descendants: Vec<String>) -> Self {
        if let DslParsingError::Logic(e) = &mut self {
            e.context.descendants = Some(descendants);
        }
        self
    }

    /// Structured context attached to this error, if any was recorded.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            DslParsingError::Logic(e) if !e.context.is_empty() => Some(&e.context),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(v) = &self.failed_import {
            parts.push(format!("failed_import={v}"));
        }
        if let Some(v) = &self.circular_dependency {
            parts.push(format!("circular_dependency={v:?}"));
        }
        if let Some(v) = &self.duplicate_node_name {
            parts.push(format!("duplicate_node_name={v}"));
        }
        if let Some(v) = &self.duplicate_interface_name {
            parts.push(format!("duplicate_interface_name={v}"));
        }
        if let Some(v) = &self.node_name {
            parts.push(format!("node_name={v}"));
        }
        if let Some(v) = &self.descendants {
            parts.push(format!("descendants={v:?}"));
        }
        write!(f, "{}", parts.join(", "))
    }
}

pub type DslResult<T> = Result<T, DslParsingError>;

/// Error codes, named for readability at call sites. Values are part of the
/// public contract and must never be renumbered.
pub mod codes {
    pub const YAML_MALFORMED: i32 = -1;
    pub const YAML_EMPTY: i32 = 0;
    pub const SCHEMA_DSL: i32 = 1;
    pub const SCHEMA_IMPORTS: i32 = 2;
    pub const IMPORT_NON_MERGEABLE_FIELD: i32 = 3;
    pub const IMPORT_MERGE_CONFLICT: i32 = 4;
    pub const INTERFACES_WITHOUT_PLUGINS: i32 = 5;
    pub const EXPLICIT_PLUGIN_WRONG_INTERFACE: i32 = 6;
    pub const NODE_TYPE_NOT_FOUND: i32 = 7;
    pub const INTERFACE_NOT_DEFINED: i32 = 9;
    pub const EXPLICIT_PLUGIN_NOT_DEFINED: i32 = 10;
    pub const AUTOWIRE_PLUGIN_MISS: i32 = 11;
    pub const AUTOWIRE_PLUGIN_AMBIGUOUS: i32 = 12;
    pub const IMPORT_UNRESOLVABLE: i32 = 13;
    pub const DERIVED_FROM_MISSING: i32 = 14;
    pub const NODE_POLICY_UNDEFINED: i32 = 16;
    pub const NODE_POLICY_RULE_UNDEFINED: i32 = 17;
    pub const PLUGIN_ILLEGAL_DERIVED_FROM: i32 = 18;
    pub const RELATIONSHIP_PLUGIN_UNDEFINED: i32 = 19;
    pub const RELATIONSHIP_BIND_AT_ILLEGAL: i32 = 20;
    pub const RELATIONSHIP_RUN_ON_NODE_ILLEGAL: i32 = 21;
    pub const DUPLICATE_INTERFACE_NAME_GLOBAL: i32 = 22;
    pub const RELATIONSHIP_SELF_TARGET: i32 = 23;
    pub const AGENT_PLUGIN_WITHOUT_HOST: i32 = 24;
    pub const RELATIONSHIP_TARGET_UNDEFINED: i32 = 25;
    pub const RELATIONSHIP_TYPE_UNDEFINED: i32 = 26;
    pub const DSL_LOCATION_UNRESOLVABLE: i32 = 30;
    pub const REF_UNRESOLVABLE: i32 = 31;
    pub const CIRCULAR_DEPENDENCY: i32 = 100;
    pub const DUPLICATE_NODE_NAME: i32 = 101;
    pub const DUPLICATE_INTERFACE_NAME_NODE: i32 = 102;
    pub const AUTOWIRE_TYPE_AMBIGUOUS: i32 = 103;
}
