//! Relation definition module for storing relationship metadata.
//!
//! This module provides the types produced by the relation classifier:
//! the `RelationInfo` struct and the `RelationKind` enum.

pub mod types;
pub mod struct_def;

// Re-export public types
#[doc(inline)]
pub use types::{Junction, RelationKind};
#[doc(inline)]
pub use struct_def::RelationInfo;
