//! # Deepguard
//!
//! Deep relational filtering for sea-query: filter maps that reach through
//! an entity's relations are compiled into correlated `IN (SELECT ...)`
//! sub-queries.
//!
//! ```no_run
//! use deepguard::filter::{compile_filters, into_filter};
//! use deepguard::naming::SnakeCaseNaming;
//! use deepguard::DeepEntity;
//! use sea_query::PostgresQueryBuilder;
//! use serde_json::json;
//!
//! #[derive(DeepEntity)]
//! pub struct Group {
//!     pub id: i64,
//!     pub name: String,
//! }
//!
//! #[derive(DeepEntity)]
//! pub struct Person {
//!     pub id: i64,
//!     pub name: String,
//!     pub group_ref: i64,
//!     #[relation(foreign_key = "GroupRef")]
//!     pub group: Option<Box<Group>>,
//! }
//!
//! let naming = SnakeCaseNaming::new();
//! let filter = into_filter(json!({ "group": { "name": "Eng" } }))?;
//! let sql = compile_filters(&Person::schema(), &naming, &[filter])?
//!     .select_all(&Person::schema(), &naming)
//!     .to_string(PostgresQueryBuilder);
//! // SELECT * FROM "people" WHERE "people"."group_ref" IN
//! //   (SELECT "groups"."id" FROM "groups" WHERE "groups"."name" = 'Eng')
//! # Ok::<(), deepguard::DeepFilterError>(())
//! ```

extern crate self as deepguard;

pub mod config;
pub mod error;
pub mod filter;
pub mod naming;
pub mod query;
pub mod relation;
pub mod schema;

pub use config::DeepFilterConfig;
pub use error::DeepFilterError;
pub use filter::{
    add_deep_filters, compile_filters, CompiledFilter, DeepFilter, DeepFilterOptions, Filter,
};
pub use naming::{NamingStrategy, SnakeCaseNaming};
pub use query::{DeepFilterPlugin, QueryPlugin, SelectQuery};
pub use relation::{reset_cache, RelationCache};
pub use schema::{DeepEntity, EntitySchema};

pub use deepguard_derive::DeepEntity;
