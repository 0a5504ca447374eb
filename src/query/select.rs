//! Select query builder for deep-filterable entities.
//!
//! `SelectQuery<E>` collects WHERE clauses, ordering and pagination for the
//! table of `E`. Registered plugins run when the statement is built, so
//! clauses holding nested filters are only valid with the
//! [`DeepFilterPlugin`](crate::query::DeepFilterPlugin) registered.

use crate::error::DeepFilterError;
use crate::filter::value::Filter;
use crate::naming::{ColumnResolver, NamingStrategy, SnakeCaseNaming};
use crate::query::hook::{QueryContext, QueryPlugin, WhereExpr};
use crate::relation::helpers::iden;
use crate::schema::{DeepEntity, EntitySchema};
use sea_query::{Asterisk, Condition, IntoCondition, Order, Query, QueryBuilder, SelectStatement};
use std::marker::PhantomData;

/// Query builder for selecting records of `E`
///
/// # Example
///
/// ```no_run
/// use deepguard::query::{DeepFilterPlugin, SelectQuery};
/// use deepguard::filter::into_filter;
/// use sea_query::{Order, PostgresQueryBuilder};
/// use serde_json::json;
///
/// # #[derive(deepguard::DeepEntity)]
/// # struct Person { id: i64, name: String }
/// // People in the "Eng" group, newest first
/// let sql = SelectQuery::<Person>::new()
///     .use_plugin(DeepFilterPlugin::new())
///     .where_map(into_filter(json!({ "group": { "name": "Eng" } })).unwrap())
///     .order_by("id", Order::Desc)
///     .limit(10)
///     .to_string(PostgresQueryBuilder)?;
/// # Ok::<(), deepguard::DeepFilterError>(())
/// ```
pub struct SelectQuery<E>
where
    E: DeepEntity,
{
    naming: Box<dyn NamingStrategy>,
    plugins: Vec<Box<dyn QueryPlugin>>,
    clauses: Vec<WhereExpr>,
    orders: Vec<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    _phantom: PhantomData<E>,
}

impl<E> Default for SelectQuery<E>
where
    E: DeepEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> SelectQuery<E>
where
    E: DeepEntity,
{
    /// Create a new select query using snake_case naming
    pub fn new() -> Self {
        Self {
            naming: Box::new(SnakeCaseNaming::new()),
            plugins: Vec::new(),
            clauses: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            _phantom: PhantomData,
        }
    }

    /// Replace the naming strategy used for tables and columns
    pub fn with_naming<N>(mut self, naming: N) -> Self
    where
        N: NamingStrategy + 'static,
    {
        self.naming = Box::new(naming);
        self
    }

    /// Register a plugin
    ///
    /// A second plugin with an already registered name is ignored.
    pub fn use_plugin<P>(mut self, plugin: P) -> Self
    where
        P: QueryPlugin + 'static,
    {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            log::warn!("plugin '{}' is already registered", plugin.name());
            return self;
        }
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Add a prebuilt filter condition
    ///
    /// Accepts anything implementing `IntoCondition`: an `Expr` from
    /// `Expr::col()` or a `Condition` from `Condition::all()` / `any()`.
    pub fn filter<F>(mut self, condition: F) -> Self
    where
        F: IntoCondition,
    {
        self.clauses.push(WhereExpr::Condition(condition.into_condition()));
        self
    }

    /// Add one equality clause per entry of `filter`
    ///
    /// Entries whose value is a nested filter are left for plugins to rewrite.
    pub fn where_map(mut self, filter: Filter) -> Self {
        self.clauses.push(WhereExpr::from_filter(filter));
        self
    }

    /// Add an ORDER BY clause on a column of `E`
    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.orders.push((column.into(), order));
        self
    }

    /// Add a LIMIT clause
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add an OFFSET clause
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Run the plugins and build the statement
    ///
    /// # Errors
    ///
    /// Returns the first error a plugin recorded, or the error raised while
    /// lowering a clause (for example a nested filter no plugin rewrote).
    pub fn into_statement(self) -> Result<SelectStatement, DeepFilterError> {
        let schema: EntitySchema = E::schema();
        let table = ColumnResolver::new(&*self.naming).table(&schema);

        let mut ctx = QueryContext::new(&schema, &*self.naming, self.clauses);
        for plugin in &self.plugins {
            plugin.before_query(&mut ctx);
        }
        let (clauses, errors) = ctx.into_parts();
        if let Some(err) = errors.into_iter().next() {
            return Err(err);
        }

        let mut query = Query::select().column(Asterisk).from(iden(&table)).to_owned();
        if !clauses.is_empty() {
            let condition = clauses
                .into_iter()
                .try_fold(Condition::all(), |cond, clause| {
                    Ok::<_, DeepFilterError>(cond.add(clause.into_condition(&table)?))
                })?;
            query.cond_where(condition);
        }
        for (column, order) in self.orders {
            query.order_by((iden(&table), iden(&column)), order);
        }
        if let Some(limit) = self.limit {
            query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query.offset(offset);
        }
        Ok(query)
    }

    /// Build the statement and render it with `builder`
    pub fn to_string<B: QueryBuilder>(self, builder: B) -> Result<String, DeepFilterError> {
        Ok(self.into_statement()?.to_string(builder))
    }
}
