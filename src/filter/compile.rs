//! Correlated sub-query compiler.
//!
//! Turns filter mappings into predicates on the root entity. Relational
//! predicates become `IN (SELECT ...)` membership tests, one sub-query per
//! nesting level:
//!
//! ```text
//! to-one        P.fk IN (SELECT R.pk FROM R WHERE ...)
//! to-many       P.pk IN (SELECT R.fk FROM R WHERE ...)
//! many-to-many  P.pk IN (SELECT J.owner_key FROM J
//!                        WHERE J.related_key IN (SELECT R.pk FROM R WHERE ...))
//! ```
//!
//! Each level builds its own statement and hands back plain predicate values,
//! so nothing from one level leaks into another.

use crate::error::DeepFilterError;
use crate::filter::partition::{partition, RelationalEntry};
use crate::filter::value::Filter;
use crate::naming::{ColumnResolver, NamingStrategy};
use crate::relation::cache::{EntityRelations, RelationCache};
use crate::relation::def::{Junction, RelationKind};
use crate::relation::helpers::{iden, qualified, scoped_select};
use crate::schema::{DeepEntity, EntitySchema};
use sea_query::{Asterisk, Condition, Expr, ExprTrait, Query, SelectStatement};
use std::slice;

/// Compilation options
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeepFilterOptions {
    /// Treat `*` in string values as a LIKE wildcard
    pub wildcards: bool,
}

impl DeepFilterOptions {
    pub fn wildcards(mut self, enabled: bool) -> Self {
        self.wildcards = enabled;
        self
    }
}

/// Deep filter compiler
///
/// Holds the naming strategy used for the whole compilation, the relation
/// cache (the process-wide one unless replaced) and the options.
///
/// # Example
///
/// ```no_run
/// use deepguard::filter::{into_filter, DeepFilter, DeepFilterOptions};
/// use deepguard::naming::SnakeCaseNaming;
/// use deepguard::schema::{EntitySchema, FieldDef, FieldType};
/// use serde_json::json;
///
/// let schema = EntitySchema::new("Person")
///     .field(FieldDef::new("id", FieldType::scalar("i64")))
///     .field(FieldDef::new("name", FieldType::scalar("String")));
/// let naming = SnakeCaseNaming::new();
///
/// let compiled = DeepFilter::new(&naming)
///     .with_options(DeepFilterOptions::default().wildcards(true))
///     .compile(&schema, &[into_filter(json!({ "name": "J*" })).unwrap()])
///     .unwrap();
/// assert_eq!(compiled.predicates().len(), 1);
/// ```
#[derive(Clone, Copy)]
pub struct DeepFilter<'a> {
    naming: &'a dyn NamingStrategy,
    cache: &'a RelationCache,
    options: DeepFilterOptions,
}

impl<'a> DeepFilter<'a> {
    pub fn new(naming: &'a dyn NamingStrategy) -> Self {
        Self {
            naming,
            cache: RelationCache::global(),
            options: DeepFilterOptions::default(),
        }
    }

    pub fn with_cache(mut self, cache: &'a RelationCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_options(mut self, options: DeepFilterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> DeepFilterOptions {
        self.options
    }

    /// Compile filter mappings for the root entity described by `schema`
    ///
    /// All mappings are combined with AND. An empty list (or only empty
    /// mappings) yields an empty [`CompiledFilter`].
    ///
    /// # Errors
    ///
    /// Any error at any nesting depth aborts the whole compilation.
    pub fn compile(
        &self,
        schema: &EntitySchema,
        filters: &[Filter],
    ) -> Result<CompiledFilter, DeepFilterError> {
        #[cfg(feature = "tracing")]
        let _span =
            tracing::debug_span!("deep_filter", entity = %schema.name, filters = filters.len())
                .entered();

        let resolver = ColumnResolver::new(self.naming);
        let predicates = self.compile_level(schema, &resolver, filters)?;
        log::debug!(
            "compiled {} deep filter predicate(s) for {}",
            predicates.len(),
            schema.name
        );
        Ok(CompiledFilter { predicates })
    }

    fn compile_level(
        &self,
        schema: &EntitySchema,
        resolver: &ColumnResolver<'_>,
        filters: &[Filter],
    ) -> Result<Vec<Expr>, DeepFilterError> {
        let relations = self.cache.get(schema, resolver)?;
        let parts = partition(schema, &relations, resolver, filters)?;

        let mut predicates = parts.scalar_predicates(&relations.table, self.options.wildcards)?;
        for entry in &parts.relations {
            predicates.push(self.relational_predicate(&relations, resolver, entry)?);
        }
        Ok(predicates)
    }

    fn relational_predicate(
        &self,
        parent: &EntityRelations,
        resolver: &ColumnResolver<'_>,
        entry: &RelationalEntry<'_>,
    ) -> Result<Expr, DeepFilterError> {
        let related_schema = entry.relation.related.schema();
        let related = self.cache.get(&related_schema, resolver)?;
        let nested = self.compile_level(&related_schema, resolver, slice::from_ref(entry.filter))?;

        log::trace!(
            "{}.{}: {} sub-query on {}",
            parent.entity,
            entry.column,
            entry.relation.kind.label(),
            related.table
        );

        let predicate = match &entry.relation.kind {
            RelationKind::ToOne => {
                let sub = filtered(scoped_select(&related.table, &related.primary_key), nested);
                qualified(&parent.table, &entry.relation.foreign_key).in_subquery(sub)
            }
            RelationKind::ToMany => {
                let scope = scoped_select(&related.table, &entry.relation.foreign_key);
                qualified(&parent.table, &parent.primary_key).in_subquery(filtered(scope, nested))
            }
            RelationKind::ManyToMany(junction) => {
                let related_ids =
                    filtered(scoped_select(&related.table, &related.primary_key), nested);
                qualified(&parent.table, &parent.primary_key)
                    .in_subquery(through_junction(junction, related_ids))
            }
        };
        Ok(predicate)
    }
}

/// Attach predicates to a freshly built scope; none leaves it unfiltered
fn filtered(mut scope: SelectStatement, predicates: Vec<Expr>) -> SelectStatement {
    if !predicates.is_empty() {
        scope.cond_where(all_of(predicates));
    }
    scope
}

fn through_junction(junction: &Junction, related_ids: SelectStatement) -> SelectStatement {
    let mut scope = scoped_select(&junction.table, &junction.owner_key);
    scope.and_where(qualified(&junction.table, &junction.related_key).in_subquery(related_ids));
    scope
}

fn all_of(predicates: Vec<Expr>) -> Condition {
    predicates
        .into_iter()
        .fold(Condition::all(), |cond, predicate| cond.add(predicate))
}

/// Compiled predicates on the root entity, combined with AND
#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    predicates: Vec<Expr>,
}

impl CompiledFilter {
    pub fn predicates(&self) -> &[Expr] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn into_predicates(self) -> Vec<Expr> {
        self.predicates
    }

    pub fn into_condition(self) -> Condition {
        all_of(self.predicates)
    }

    /// Add every predicate to an existing statement's WHERE clause
    pub fn apply(self, query: &mut SelectStatement) {
        if !self.is_empty() {
            query.cond_where(self.into_condition());
        }
    }

    /// `SELECT * FROM <root table>` restricted by the compiled predicates
    pub fn select_all(self, schema: &EntitySchema, naming: &dyn NamingStrategy) -> SelectStatement {
        let table = ColumnResolver::new(naming).table(schema);
        let mut query = Query::select().column(Asterisk).from(iden(&table)).to_owned();
        self.apply(&mut query);
        query
    }
}

/// Compile filters with the process-wide relation cache and default options
///
/// # Errors
///
/// See [`DeepFilter::compile`].
pub fn compile_filters(
    schema: &EntitySchema,
    naming: &dyn NamingStrategy,
    filters: &[Filter],
) -> Result<CompiledFilter, DeepFilterError> {
    DeepFilter::new(naming).compile(schema, filters)
}

/// Typed form of [`compile_filters`] for a [`DeepEntity`]
pub fn add_deep_filters<E: DeepEntity>(
    naming: &dyn NamingStrategy,
    filters: &[Filter],
) -> Result<CompiledFilter, DeepFilterError> {
    compile_filters(&EntitySchema::of::<E>(), naming, filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::value::into_filter;
    use crate::naming::SnakeCaseNaming;
    use crate::schema::{EntityRef, FieldDef, FieldType};
    use sea_query::SqliteQueryBuilder;
    use serde_json::{json, Value as JsonValue};

    fn group_schema() -> EntitySchema {
        EntitySchema::new("Group")
            .field(FieldDef::new("id", FieldType::scalar("i64")))
            .field(FieldDef::new("name", FieldType::scalar("String")))
            .field(
                FieldDef::new(
                    "people",
                    FieldType::list(FieldType::entity(EntityRef::new("Person", person_schema))),
                )
                .foreign_key("GroupRef"),
            )
    }

    fn tag_schema() -> EntitySchema {
        EntitySchema::new("Tag")
            .field(FieldDef::new("id", FieldType::scalar("i64")))
            .field(FieldDef::new("key", FieldType::scalar("String")))
    }

    fn person_schema() -> EntitySchema {
        EntitySchema::new("Person")
            .field(FieldDef::new("id", FieldType::scalar("i64")))
            .field(FieldDef::new("name", FieldType::scalar("String")))
            .field(FieldDef::new("group_ref", FieldType::scalar("i64")))
            .field(
                FieldDef::new(
                    "group",
                    FieldType::pointer(FieldType::entity(EntityRef::new("Group", group_schema))),
                )
                .foreign_key("GroupRef"),
            )
            .field(
                FieldDef::new(
                    "tags",
                    FieldType::list(FieldType::entity(EntityRef::new("Tag", tag_schema))),
                )
                .many_to_many("person_tags"),
            )
    }

    fn filters(values: Vec<JsonValue>) -> Vec<Filter> {
        values.into_iter().map(|v| into_filter(v).unwrap()).collect()
    }

    fn sql(compiled: CompiledFilter) -> String {
        compiled
            .select_all(&person_schema(), &SnakeCaseNaming::new())
            .to_string(SqliteQueryBuilder)
    }

    fn compile(values: Vec<JsonValue>) -> Result<CompiledFilter, DeepFilterError> {
        let naming = SnakeCaseNaming::new();
        let cache = RelationCache::new();
        DeepFilter::new(&naming)
            .with_cache(&cache)
            .compile(&person_schema(), &filters(values))
    }

    #[test]
    fn test_no_filters() {
        let compiled = compile(vec![]).expect("compiled");
        assert!(compiled.is_empty());
        assert_eq!(sql(compiled), r#"SELECT * FROM "people""#);
    }

    #[test]
    fn test_to_one_subquery() {
        let compiled = compile(vec![json!({ "group": { "name": "Eng" } })]).expect("compiled");
        assert_eq!(
            sql(compiled),
            r#"SELECT * FROM "people" WHERE "people"."group_ref" IN (SELECT "groups"."id" FROM "groups" WHERE "groups"."name" = 'Eng')"#
        );
    }

    #[test]
    fn test_to_many_subquery() {
        let naming = SnakeCaseNaming::new();
        let cache = RelationCache::new();
        let compiled = DeepFilter::new(&naming)
            .with_cache(&cache)
            .compile(&group_schema(), &filters(vec![json!({ "people": { "name": "Jo" } })]))
            .expect("compiled");

        let sql = compiled.select_all(&group_schema(), &naming).to_string(SqliteQueryBuilder);
        assert_eq!(
            sql,
            r#"SELECT * FROM "groups" WHERE "groups"."id" IN (SELECT "people"."group_ref" FROM "people" WHERE "people"."name" = 'Jo')"#
        );
    }

    #[test]
    fn test_many_to_many_subquery() {
        let compiled = compile(vec![json!({ "tags": { "key": "a" } })]).expect("compiled");
        assert_eq!(
            sql(compiled),
            r#"SELECT * FROM "people" WHERE "people"."id" IN (SELECT "person_tags"."person_id" FROM "person_tags" WHERE "person_tags"."tag_id" IN (SELECT "tags"."id" FROM "tags" WHERE "tags"."key" = 'a'))"#
        );
    }

    #[test]
    fn test_empty_nested_filter_has_no_where() {
        let compiled = compile(vec![json!({ "group": {} })]).expect("compiled");
        assert!(sql(compiled).ends_with(r#"IN (SELECT "groups"."id" FROM "groups")"#));
    }

    #[test]
    fn test_two_hop_nesting_uses_independent_scopes() {
        let compiled = compile(vec![json!({
            "group": { "people": { "name": "Jo" } }
        })])
        .expect("compiled");
        assert_eq!(
            sql(compiled),
            r#"SELECT * FROM "people" WHERE "people"."group_ref" IN (SELECT "groups"."id" FROM "groups" WHERE "groups"."id" IN (SELECT "people"."group_ref" FROM "people" WHERE "people"."name" = 'Jo'))"#
        );
    }

    #[test]
    fn test_multiple_mappings_are_conjunctive() {
        let split = compile(vec![json!({ "name": "Jo" }), json!({ "group": { "name": "Eng" } })])
            .expect("split");
        let joined =
            compile(vec![json!({ "name": "Jo", "group": { "name": "Eng" } })]).expect("joined");
        assert_eq!(split.predicates().len(), 2);
        assert_eq!(sql(split), sql(joined));
    }

    #[test]
    fn test_error_at_depth_aborts() {
        let err = compile(vec![json!({
            "name": "Jo",
            "group": { "people": { "nickname": "J" } }
        })])
        .unwrap_err();
        assert_eq!(
            err,
            DeepFilterError::UnknownField {
                entity: "Person".into(),
                field: "nickname".into(),
            }
        );
    }

    #[test]
    fn test_wildcards_apply_at_every_level() {
        let naming = SnakeCaseNaming::new();
        let cache = RelationCache::new();
        let compiler = DeepFilter::new(&naming)
            .with_cache(&cache)
            .with_options(DeepFilterOptions::default().wildcards(true));
        assert!(compiler.options().wildcards);
        assert!(!DeepFilter::new(&naming).options().wildcards);

        let compiled = compiler
            .compile(
                &person_schema(),
                &filters(vec![json!({ "name": "J*", "group": { "name": "*ng" } })]),
            )
            .expect("compiled");

        let sql = sql(compiled);
        assert!(sql.contains(r#""people"."name" LIKE 'J%'"#));
        assert!(sql.contains(r#""groups"."name" LIKE '%ng'"#));
    }

    #[test]
    fn test_into_condition_and_apply_match() {
        let compiled = compile(vec![json!({ "name": "Jo", "id": [1, 2] })]).expect("compiled");

        let mut via_condition = Query::select().column(Asterisk).from(iden("people")).to_owned();
        via_condition.cond_where(compiled.clone().into_condition());

        let mut via_predicates = Query::select().column(Asterisk).from(iden("people")).to_owned();
        let predicates = compiled.clone().into_predicates();
        assert_eq!(predicates.len(), 2);
        for predicate in predicates {
            via_predicates.and_where(predicate);
        }

        let mut via_apply = Query::select().column(Asterisk).from(iden("people")).to_owned();
        compiled.apply(&mut via_apply);

        let rendered = via_condition.to_string(SqliteQueryBuilder);
        assert_eq!(rendered, via_apply.to_string(SqliteQueryBuilder));
        assert_eq!(rendered, via_predicates.to_string(SqliteQueryBuilder));
    }

    #[test]
    fn test_compile_uses_cache() {
        let naming = SnakeCaseNaming::new();
        let cache = RelationCache::new();
        let compiler = DeepFilter::new(&naming).with_cache(&cache);
        let input = filters(vec![json!({ "group": { "name": "Eng" } })]);

        compiler.compile(&person_schema(), &input).expect("first");
        let reflected = cache.reflections();
        compiler.compile(&person_schema(), &input).expect("second");
        assert_eq!(cache.reflections(), reflected);
        assert_eq!(cache.len(), 2);
    }
}
