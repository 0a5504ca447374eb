//! Query building for deep-filterable entities.
//!
//! This module provides a small SELECT builder and the plugin hook through
//! which deep filtering plugs into it.
//!
//! # Architecture
//!
//! - **Hook**: WHERE clause tree, plugin trait and the deep filter plugin
//! - **Select**: SELECT query builder (`SelectQuery`)
//!
//! # Examples
//!
//! ```no_run
//! use deepguard::filter::into_filter;
//! use deepguard::query::{DeepFilterPlugin, SelectQuery};
//! use sea_query::PostgresQueryBuilder;
//! use serde_json::json;
//!
//! # #[derive(deepguard::DeepEntity)]
//! # struct Person { id: i64, name: String }
//! let sql = SelectQuery::<Person>::new()
//!     .use_plugin(DeepFilterPlugin::new())
//!     .where_map(into_filter(json!({ "name": "Jo" })).unwrap())
//!     .to_string(PostgresQueryBuilder)?;
//! # Ok::<(), deepguard::DeepFilterError>(())
//! ```

// Plugin hook
pub mod hook;
#[doc(inline)]
pub use hook::{DeepFilterPlugin, QueryContext, QueryPlugin, WhereExpr};

// SELECT query builder
pub mod select;
#[doc(inline)]
pub use select::SelectQuery;
