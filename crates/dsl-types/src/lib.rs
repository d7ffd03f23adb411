//! Shared data model for the blueprint DSL: well-known constants, the
//! `Value`-based tree helpers the rest of the compiler walks with, and the
//! typed, serializable output of a successful compile (the `Plan`).

pub mod constants;
pub mod error;
pub mod types;
pub mod value_ext;

pub use constants::*;
pub use error::{codes, DslFormatError, DslLogicError, DslParsingError, DslResult, ErrorContext};
pub use types::{
    InterfaceElement, Plan, ProcessedNode, ProcessedPlugin, ProcessedPolicyEvent,
    ProcessedRelationship, ProcessedRelationshipType,
};
pub use value_ext::get_dict_prop;

pub use serde_yaml::Value;
