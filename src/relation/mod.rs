//! Relation module for entity relationships.
//!
//! This module discovers which fields of an entity are relationships and how
//! to join them back to their owner:
//! - to-one: the owner holds a foreign key to the related row
//! - to-many: related rows hold a foreign key back to the owner
//! - many-to-many: owner and related rows are linked through a junction table
//!
//! # Architecture
//!
//! - **Def**: Relation metadata types (`RelationInfo`, `RelationKind`, `Junction`)
//! - **Classify**: Field-to-relation classification from shape and annotations
//! - **Cache**: Process-wide memoization of reflected entities
//! - **Helpers**: Identifier and sub-query building blocks

// Relation definitions
pub mod def;
#[doc(inline)]
pub use def::{Junction, RelationInfo, RelationKind};

// Classification
pub mod classify;
#[doc(inline)]
pub use classify::classify;

// Cache
pub mod cache;
#[doc(inline)]
pub use cache::{reflect, reset_cache, EntityRelations, RelationCache};

// Helper functions
pub mod helpers;
#[doc(inline)]
pub use helpers::{qualified, scoped_select};
