//! Query plugins and the deep filter hook.
//!
//! A [`SelectQuery`](crate::query::SelectQuery) collects its WHERE clause as a
//! tree of [`WhereExpr`] nodes. Before the statement is built every registered
//! [`QueryPlugin`] gets to rewrite that tree through a [`QueryContext`].
//! [`DeepFilterPlugin`] uses this to turn equality clauses whose value is a
//! nested filter into relational sub-queries.

use crate::config::DeepFilterConfig;
use crate::error::DeepFilterError;
use crate::filter::value::{scalar_predicate, wildcard_pattern, Filter};
use crate::filter::{DeepFilter, DeepFilterOptions};
use crate::naming::NamingStrategy;
use crate::relation::helpers::qualified;
use crate::schema::EntitySchema;
use sea_query::Condition;
use serde_json::Value as JsonValue;

/// Node of a WHERE clause tree
#[derive(Debug, Clone)]
pub enum WhereExpr {
    /// Conjunction of the child nodes
    And(Vec<WhereExpr>),
    /// `column = value`, where `value` may still be a nested filter
    Eq { column: String, value: JsonValue },
    /// An already built condition
    Condition(Condition),
}

impl WhereExpr {
    pub fn eq(column: impl Into<String>, value: JsonValue) -> Self {
        WhereExpr::Eq {
            column: column.into(),
            value,
        }
    }

    /// One `Eq` node per entry of a filter mapping, combined with AND
    pub fn from_filter(filter: Filter) -> Self {
        WhereExpr::And(
            filter
                .into_iter()
                .map(|(column, value)| WhereExpr::Eq { column, value })
                .collect(),
        )
    }

    /// Lower the tree into a condition on `table`
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for an `Eq` node that still holds a nested
    /// filter, i.e. one no plugin rewrote.
    pub fn into_condition(self, table: &str) -> Result<Condition, DeepFilterError> {
        match self {
            WhereExpr::And(items) => items
                .into_iter()
                .try_fold(Condition::all(), |cond, item| {
                    Ok::<_, DeepFilterError>(cond.add(item.into_condition(table)?))
                }),
            WhereExpr::Eq { column, value } => {
                let predicate =
                    scalar_predicate(qualified(table, &column), &column, &value, false)?;
                Ok(Condition::all().add(predicate))
            }
            WhereExpr::Condition(cond) => Ok(cond),
        }
    }
}

/// State shared with plugins while a query is prepared
pub struct QueryContext<'a> {
    schema: &'a EntitySchema,
    naming: &'a dyn NamingStrategy,
    clauses: Vec<WhereExpr>,
    errors: Vec<DeepFilterError>,
}

impl<'a> QueryContext<'a> {
    pub fn new(
        schema: &'a EntitySchema,
        naming: &'a dyn NamingStrategy,
        clauses: Vec<WhereExpr>,
    ) -> Self {
        Self {
            schema,
            naming,
            clauses,
            errors: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'a EntitySchema {
        self.schema
    }

    pub fn naming(&self) -> &'a dyn NamingStrategy {
        self.naming
    }

    pub fn clauses(&self) -> &[WhereExpr] {
        &self.clauses
    }

    pub fn clauses_mut(&mut self) -> &mut Vec<WhereExpr> {
        &mut self.clauses
    }

    pub fn add_error(&mut self, error: DeepFilterError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[DeepFilterError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_parts(self) -> (Vec<WhereExpr>, Vec<DeepFilterError>) {
        (self.clauses, self.errors)
    }
}

/// A hook run before a query statement is built
pub trait QueryPlugin: Send + Sync {
    /// Unique plugin name; a query registers each name once
    fn name(&self) -> &str;

    /// Inspect or rewrite the pending WHERE clause
    fn before_query(&self, ctx: &mut QueryContext<'_>);
}

/// Rewrites nested-filter equality clauses into relational sub-queries
///
/// # Example
///
/// ```no_run
/// use deepguard::query::{DeepFilterPlugin, SelectQuery};
/// use deepguard::filter::into_filter;
/// use serde_json::json;
///
/// # #[derive(deepguard::DeepEntity)]
/// # struct Person { id: i64, name: String }
/// let sql = SelectQuery::<Person>::new()
///     .use_plugin(DeepFilterPlugin::new().with_wildcards(true))
///     .where_map(into_filter(json!({ "name": "J*" })).unwrap())
///     .to_string(sea_query::PostgresQueryBuilder)
///     .unwrap();
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DeepFilterPlugin {
    options: DeepFilterOptions,
}

impl DeepFilterPlugin {
    pub const NAME: &'static str = "deepfilter";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wildcards(mut self, enabled: bool) -> Self {
        self.options = self.options.wildcards(enabled);
        self
    }

    pub fn from_config(config: &DeepFilterConfig) -> Self {
        Self {
            options: config.options(),
        }
    }

    fn wants(&self, value: &JsonValue) -> bool {
        match value {
            JsonValue::Object(_) => true,
            JsonValue::String(s) => self.options.wildcards && wildcard_pattern(s).is_some(),
            _ => false,
        }
    }

    fn rewrite(
        &self,
        expr: &WhereExpr,
        ctx: &QueryContext<'_>,
    ) -> Result<WhereExpr, DeepFilterError> {
        match expr {
            WhereExpr::And(items) => items
                .iter()
                .map(|item| self.rewrite(item, ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(WhereExpr::And),
            WhereExpr::Eq { column, value } if self.wants(value) => {
                log::trace!("{}: rewriting {}.{}", Self::NAME, ctx.schema().name, column);
                let mut filter = Filter::new();
                filter.insert(column.clone(), value.clone());
                let compiled = DeepFilter::new(ctx.naming())
                    .with_options(self.options)
                    .compile(ctx.schema(), &[filter])?;
                Ok(WhereExpr::Condition(compiled.into_condition()))
            }
            other => Ok(other.clone()),
        }
    }
}

impl QueryPlugin for DeepFilterPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_query(&self, ctx: &mut QueryContext<'_>) {
        if ctx.has_errors() {
            return;
        }

        // Leave the clauses untouched unless every one of them rewrites
        let rewritten = ctx
            .clauses()
            .iter()
            .map(|clause| self.rewrite(clause, ctx))
            .collect::<Result<Vec<_>, _>>();
        match rewritten {
            Ok(clauses) => *ctx.clauses_mut() = clauses,
            Err(err) => {
                log::debug!("{} failed on {}: {}", Self::NAME, ctx.schema().name, err);
                ctx.add_error(err);
            }
        }
    }
}
