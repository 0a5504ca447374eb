//! Procedural macros for deepguard
//!
//! This crate provides the `DeepEntity` derive, which describes a struct's
//! fields (names, column overrides, type shapes and relation annotations) so
//! deep filters can discover its relations at runtime.

mod attributes;
mod macros;
mod type_analysis;

use proc_macro::TokenStream;

/// Derive macro for `DeepEntity` - generates the entity schema description
///
/// Struct attributes:
/// - `#[table_name = "..."]` - explicit table name
///
/// Field attributes:
/// - `#[primary_key]` - primary key column (defaults to the field named `id`)
/// - `#[column_name = "..."]` - explicit column name
/// - `#[relation]` - the field's element type is another `DeepEntity`
/// - `#[relation(foreign_key = "...")]` - to-one / to-many through a foreign key
/// - `#[relation(many_to_many = "...")]` - many-to-many through a junction table
///
/// See `deepguard-derive/tests/test_derive_deep_entity.rs` for usage examples.
#[proc_macro_derive(DeepEntity, attributes(table_name, column_name, primary_key, relation))]
pub fn derive_deep_entity(input: TokenStream) -> TokenStream {
    macros::derive_deep_entity(input)
}
