//! Process-wide cache of discovered relations.
//!
//! Reflecting an entity walks every declared field and classifies the
//! struct-shaped ones. The result only depends on the schema and the naming
//! strategy, so it is computed once per (entity, naming fingerprint) and
//! shared by every later compilation. Entries never expire; tests reset the
//! cache explicitly with [`reset_cache`] or [`RelationCache::reset`].

use crate::error::DeepFilterError;
use crate::naming::ColumnResolver;
use crate::relation::classify::classify;
use crate::relation::def::RelationInfo;
use crate::schema::{EntitySchema, FieldType};
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

static GLOBAL_CACHE: Lazy<RelationCache> = Lazy::new(RelationCache::new);

/// Reflected filtering metadata of one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRelations {
    /// Declared entity name
    pub entity: String,
    /// Resolved table name
    pub table: String,
    /// Resolved primary key column
    pub primary_key: String,
    /// Relational fields keyed by resolved column name
    pub relations: HashMap<String, RelationInfo>,
    /// Plain columns that accept scalar filters
    pub columns: BTreeSet<String>,
}

impl EntityRelations {
    pub fn relation(&self, column: &str) -> Option<&RelationInfo> {
        self.relations.get(column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    entity: String,
    naming: String,
}

/// Concurrent relation cache
///
/// Lookups take the read lock; a miss reflects without holding any lock
/// and inserts under the write lock. Two threads missing at the same time
/// both reflect and the first insert wins, so an entry is always complete.
pub struct RelationCache {
    entries: RwLock<HashMap<CacheKey, Arc<EntityRelations>>>,
    reflections: AtomicUsize,
}

impl Default for RelationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            reflections: AtomicUsize::new(0),
        }
    }

    /// The process-wide cache used by the free entry points
    pub fn global() -> &'static RelationCache {
        &GLOBAL_CACHE
    }

    /// Relations of `schema`, reflecting it on first use
    ///
    /// # Errors
    ///
    /// Returns `NameCollision` when two fields, at least one of them a
    /// relation, resolve to the same name. Failed reflections are not cached.
    pub fn get(
        &self,
        schema: &EntitySchema,
        resolver: &ColumnResolver<'_>,
    ) -> Result<Arc<EntityRelations>, DeepFilterError> {
        let key = CacheKey {
            entity: schema.name.clone(),
            naming: resolver.naming().fingerprint(),
        };

        if let Some(found) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            log::trace!("relation cache hit for {}", schema.name);
            return Ok(Arc::clone(found));
        }

        self.reflections.fetch_add(1, Ordering::Relaxed);
        let reflected = Arc::new(reflect(schema, resolver)?);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(key).or_insert(reflected);
        Ok(Arc::clone(entry))
    }

    /// Drop every cached entry
    pub fn reset(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        log::debug!("relation cache reset");
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of reflections performed so far
    pub fn reflections(&self) -> usize {
        self.reflections.load(Ordering::Relaxed)
    }
}

/// Reset the process-wide cache
pub fn reset_cache() {
    RelationCache::global().reset();
}

/// Reflect an entity without touching any cache
///
/// Fields that are struct-shaped but cannot be classified are skipped:
/// discovering "all relations" is best effort. Scalar fields and plain value
/// structs (timestamps, UUIDs) become filterable columns.
pub fn reflect(
    schema: &EntitySchema,
    resolver: &ColumnResolver<'_>,
) -> Result<EntityRelations, DeepFilterError> {
    let mut relations = HashMap::new();
    let mut columns = BTreeSet::new();

    for field in &schema.fields {
        let column = resolver.column(schema, field);

        let is_value_struct =
            matches!(field.ty.element(), FieldType::Struct(_)) && field.annotations.is_empty();
        if field.ty.shape().is_none() || is_value_struct {
            columns.insert(column);
            continue;
        }

        match classify(schema, field, resolver) {
            Ok(info) => {
                log::trace!(
                    "{}.{} is a {} relation to {}",
                    schema.name,
                    field.name,
                    info.kind.label(),
                    info.related.name()
                );
                if relations.contains_key(&column) {
                    return Err(DeepFilterError::NameCollision {
                        entity: schema.name.clone(),
                        column,
                    });
                }
                relations.insert(column, info);
            }
            Err(err) => {
                log::trace!("skipping field {}.{}: {}", schema.name, field.name, err);
            }
        }
    }

    if let Some(column) = relations.keys().find(|c| columns.contains(*c)) {
        return Err(DeepFilterError::NameCollision {
            entity: schema.name.clone(),
            column: column.clone(),
        });
    }

    log::debug!(
        "reflected {}: {} column(s), {} relation(s)",
        schema.name,
        columns.len(),
        relations.len()
    );

    Ok(EntityRelations {
        entity: schema.name.clone(),
        table: resolver.table(schema),
        primary_key: resolver.primary_key(schema),
        relations,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::SnakeCaseNaming;
    use crate::relation::def::RelationKind;
    use crate::schema::{EntityRef, FieldDef};
    use std::thread;

    fn tag_schema() -> EntitySchema {
        EntitySchema::new("Tag")
            .field(FieldDef::new("id", FieldType::scalar("i64")))
            .field(FieldDef::new("key", FieldType::scalar("String")))
            .field(FieldDef::new("simple_struct_ref", FieldType::scalar("i64")))
    }

    fn simple_schema() -> EntitySchema {
        EntitySchema::new("SimpleStruct")
            .field(FieldDef::new("id", FieldType::scalar("i64")))
            .field(FieldDef::new("name", FieldType::pointer(FieldType::scalar("String"))))
            .field(FieldDef::new("created_at", FieldType::Struct("NaiveDateTime")))
            .field(FieldDef::new("tag_ref", FieldType::scalar("i64")))
            .field(
                FieldDef::new(
                    "tag",
                    FieldType::pointer(FieldType::entity(EntityRef::new("Tag", tag_schema))),
                )
                .foreign_key("TagRef"),
            )
            .field(
                FieldDef::new(
                    "tags",
                    FieldType::pointer(FieldType::list(FieldType::pointer(FieldType::entity(
                        EntityRef::new("Tag", tag_schema),
                    )))),
                )
                .foreign_key("SimpleStructRef"),
            )
            .field(FieldDef::new(
                "untagged",
                FieldType::entity(EntityRef::new("Tag", tag_schema)),
            ))
    }

    #[test]
    fn test_reflect_ignores_simple_types() {
        let naming = SnakeCaseNaming::new();
        let resolver = ColumnResolver::new(&naming);
        let schema = EntitySchema::new("Plain")
            .field(FieldDef::new("name", FieldType::scalar("String")))
            .field(FieldDef::new("occupation", FieldType::scalar("String")));

        let reflected = reflect(&schema, &resolver).expect("reflected");
        assert!(reflected.relations.is_empty());
        assert_eq!(reflected.columns.len(), 2);
        assert_eq!(reflected.table, "plains");
    }

    #[test]
    fn test_reflect_returns_struct_and_slice_fields() {
        let naming = SnakeCaseNaming::new();
        let resolver = ColumnResolver::new(&naming);

        let reflected = reflect(&simple_schema(), &resolver).expect("reflected");
        assert_eq!(reflected.relations.len(), 2);

        let tag = reflected.relation("tag").expect("tag relation");
        assert_eq!(tag.kind, RelationKind::ToOne);
        assert_eq!(tag.foreign_key, "tag_ref");

        let tags = reflected.relation("tags").expect("tags relation");
        assert_eq!(tags.kind, RelationKind::ToMany);
        assert_eq!(tags.foreign_key, "simple_struct_ref");

        // Unannotated entity fields are skipped, value structs are columns
        assert!(reflected.relation("untagged").is_none());
        assert!(!reflected.has_column("untagged"));
        assert!(reflected.has_column("created_at"));
        assert!(reflected.has_column("name"));
    }

    #[test]
    fn test_cache_returns_same_entry_without_reflecting_again() {
        let naming = SnakeCaseNaming::new();
        let resolver = ColumnResolver::new(&naming);
        let cache = RelationCache::new();

        let first = cache.get(&simple_schema(), &resolver).expect("first");
        let second = cache.get(&simple_schema(), &resolver).expect("second");

        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.reflections(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_keys_include_naming_fingerprint() {
        let plural = SnakeCaseNaming::new();
        let singular = SnakeCaseNaming::new().singular();
        let cache = RelationCache::new();

        let a = cache.get(&simple_schema(), &ColumnResolver::new(&plural)).expect("plural");
        let b = cache.get(&simple_schema(), &ColumnResolver::new(&singular)).expect("singular");

        assert_eq!(a.table, "simple_structs");
        assert_eq!(b.table, "simple_struct");
        assert_eq!(cache.reflections(), 2);
    }

    #[test]
    fn test_reset_forces_reflection() {
        let naming = SnakeCaseNaming::new();
        let resolver = ColumnResolver::new(&naming);
        let cache = RelationCache::new();

        cache.get(&simple_schema(), &resolver).expect("first");
        cache.reset();
        assert!(cache.is_empty());
        cache.get(&simple_schema(), &resolver).expect("second");
        assert_eq!(cache.reflections(), 2);
    }

    #[test]
    fn test_name_collision_is_not_cached() {
        let naming = SnakeCaseNaming::new();
        let resolver = ColumnResolver::new(&naming);
        let cache = RelationCache::new();
        let schema = EntitySchema::new("Clash")
            .field(FieldDef::new("tag", FieldType::scalar("String")))
            .field(
                FieldDef::new("tag_link", FieldType::entity(EntityRef::new("Tag", tag_schema)))
                    .column_name("tag")
                    .foreign_key("tag"),
            );

        let err = cache.get(&schema, &resolver).unwrap_err();
        assert_eq!(
            err,
            DeepFilterError::NameCollision {
                entity: "Clash".into(),
                column: "tag".into(),
            }
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_relations_sharing_a_column_collide() {
        let naming = SnakeCaseNaming::new();
        let resolver = ColumnResolver::new(&naming);
        let cache = RelationCache::new();
        let schema = EntitySchema::new("Clash")
            .field(FieldDef::new("tag_ref", FieldType::scalar("i64")))
            .field(
                FieldDef::new("tag", FieldType::entity(EntityRef::new("Tag", tag_schema)))
                    .foreign_key("TagRef"),
            )
            .field(
                FieldDef::new("label", FieldType::entity(EntityRef::new("Tag", tag_schema)))
                    .column_name("tag")
                    .foreign_key("TagRef"),
            );

        let err = cache.get(&schema, &resolver).unwrap_err();
        assert_eq!(
            err,
            DeepFilterError::NameCollision {
                entity: "Clash".into(),
                column: "tag".into(),
            }
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_first_access() {
        let cache = Arc::new(RelationCache::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let naming = SnakeCaseNaming::new();
                    let resolver = ColumnResolver::new(&naming);
                    cache.get(&simple_schema(), &resolver).expect("reflected")
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().expect("thread")).collect();
        for entry in &results {
            assert_eq!(entry.relations.len(), 2);
            assert_eq!(**entry, *results[0]);
        }
        assert_eq!(cache.len(), 1);
        assert!(cache.reflections() >= 1);
    }
}
