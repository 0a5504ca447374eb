//! Helper functions for relationship sub-queries.
//!
//! This module provides the small building blocks the sub-query compiler
//! composes: owned identifiers, table-qualified column expressions and fresh
//! single-column SELECT scopes.

use sea_query::{DynIden, Expr, Query, SelectStatement};

/// Owned identifier for a runtime table or column name
pub fn iden(name: &str) -> DynIden {
    DynIden::from(name.to_owned())
}

/// Table-qualified column expression: `table.column`
///
/// # Example
///
/// ```no_run
/// use deepguard::relation::helpers::qualified;
/// use sea_query::ExprTrait;
///
/// // "people"."group_ref" = 1
/// let expr = qualified("people", "group_ref").eq(1);
/// ```
pub fn qualified(table: &str, column: &str) -> Expr {
    Expr::col((iden(table), iden(column)))
}

/// A new SELECT scope projecting one column of one table
///
/// Every call builds an independent statement: `SELECT table.column FROM table`.
pub fn scoped_select(table: &str, column: &str) -> SelectStatement {
    Query::select()
        .column((iden(table), iden(column)))
        .from(iden(table))
        .to_owned()
}
