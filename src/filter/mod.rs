//! Deep filtering.
//!
//! Filter mappings on a root entity are partitioned into scalar predicates
//! on its own columns and relational predicates on its relations; relational
//! predicates compile recursively into nested sub-queries.
//!
//! # Example
//!
//! ```no_run
//! use deepguard::filter::{compile_filters, into_filter};
//! use deepguard::naming::SnakeCaseNaming;
//! use deepguard::schema::EntitySchema;
//! use sea_query::PostgresQueryBuilder;
//! use serde_json::json;
//!
//! # fn person_schema() -> EntitySchema { unimplemented!() }
//! let naming = SnakeCaseNaming::new();
//! let schema = person_schema();
//! let filter = into_filter(json!({ "group": { "name": "Eng" } })).unwrap();
//!
//! let sql = compile_filters(&schema, &naming, &[filter])
//!     .unwrap()
//!     .select_all(&schema, &naming)
//!     .to_string(PostgresQueryBuilder);
//! ```

pub mod compile;
pub mod partition;
pub mod value;

pub use compile::{add_deep_filters, compile_filters, CompiledFilter, DeepFilter, DeepFilterOptions};
pub use partition::{partition, Partition, RelationalEntry, ScalarEntry};
pub use value::{into_filter, Filter};
