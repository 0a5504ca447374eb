//! Schema reflection for deep filtering.
//!
//! Rust has no runtime reflection, so entities describe themselves through
//! [`DeepEntity::schema`]. The description is an ordered list of declared
//! fields with their type shape and relation annotations, which is exactly
//! what the relation classifier needs.
//!
//! Schemas are usually generated by `#[derive(DeepEntity)]`, but can be
//! built by hand:
//!
//! ```no_run
//! use deepguard::schema::{EntityRef, EntitySchema, FieldDef, FieldType};
//!
//! fn group_schema() -> EntitySchema {
//!     EntitySchema::new("Group")
//!         .field(FieldDef::new("id", FieldType::scalar("i64")).primary_key())
//!         .field(FieldDef::new("name", FieldType::scalar("String")))
//! }
//!
//! let person = EntitySchema::new("Person")
//!     .field(FieldDef::new("id", FieldType::scalar("i64")))
//!     .field(FieldDef::new("group_ref", FieldType::scalar("i64")))
//!     .field(
//!         FieldDef::new("group", FieldType::entity(EntityRef::new("Group", group_schema)))
//!             .foreign_key("group_ref"),
//!     );
//! ```

pub mod entity;
pub mod field;

#[doc(inline)]
pub use entity::{DeepEntity, EntityRef, EntitySchema};
#[doc(inline)]
pub use field::{FieldDef, FieldShape, FieldType, RelationAnnotations};
