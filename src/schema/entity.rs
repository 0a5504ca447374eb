//! Entity descriptions and the `DeepEntity` trait.

use crate::schema::field::FieldDef;
use std::fmt;

/// Trait implemented by every entity that can be deep filtered
///
/// Usually derived:
///
/// ```no_run
/// use deepguard::DeepEntity;
///
/// #[derive(DeepEntity)]
/// pub struct Group {
///     #[primary_key]
///     pub id: i64,
///     pub name: String,
/// }
///
/// #[derive(DeepEntity)]
/// #[table_name = "people"]
/// pub struct Person {
///     #[primary_key]
///     pub id: i64,
///     pub name: String,
///     pub group_ref: i64,
///     #[relation(foreign_key = "group_ref")]
///     pub group: Option<Box<Group>>,
/// }
/// ```
pub trait DeepEntity {
    /// Declared type name, used as the cache key and for junction column names
    const NAME: &'static str;

    /// Describe the entity's declared fields
    fn schema() -> EntitySchema;
}

/// Zero-value constructor of a related entity
///
/// Holds the related type's name and a function producing its schema. The
/// schema is only built when a nested filter actually reaches that entity,
/// so mutually referencing entities do not recurse at definition time.
#[derive(Clone, Copy)]
pub struct EntityRef {
    name: &'static str,
    schema: fn() -> EntitySchema,
}

impl EntityRef {
    pub fn new(name: &'static str, schema: fn() -> EntitySchema) -> Self {
        Self { name, schema }
    }

    /// Reference to a `DeepEntity` type
    pub fn of<E: DeepEntity>() -> Self {
        Self {
            name: E::NAME,
            schema: E::schema,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build the related entity's schema
    pub fn schema(&self) -> EntitySchema {
        (self.schema)()
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&self.name).finish()
    }
}

// Function pointers are not reliably comparable; the type name identifies the entity.
impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for EntityRef {}

/// Ordered description of an entity's declared fields
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    /// Declared type name
    pub name: String,
    /// Explicit table name, overriding the naming strategy
    pub table_name: Option<String>,
    /// Declared fields in declaration order
    pub fields: Vec<FieldDef>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            fields: Vec::new(),
        }
    }

    /// Schema of a `DeepEntity` type
    pub fn of<E: DeepEntity>() -> Self {
        E::schema()
    }

    pub fn with_table_name(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    /// Append a field
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a declared field by name
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The field flagged as primary key, or a field named `id`
    pub fn primary_key_field(&self) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.primary_key)
            .or_else(|| self.get_field("id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::FieldType;

    fn item_schema() -> EntitySchema {
        EntitySchema::new("Item")
            .field(FieldDef::new("uid", FieldType::scalar("i64")).primary_key())
            .field(FieldDef::new("id", FieldType::scalar("i64")))
    }

    #[test]
    fn test_entity_ref_builds_schema_lazily() {
        let item = EntityRef::new("Item", item_schema);
        assert_eq!(item.name(), "Item");
        assert_eq!(item.schema().fields.len(), 2);
    }

    #[test]
    fn test_entity_ref_equality_by_name() {
        assert_eq!(
            EntityRef::new("Item", item_schema),
            EntityRef::new("Item", || EntitySchema::new("Item"))
        );
        assert_ne!(
            EntityRef::new("Item", item_schema),
            EntityRef::new("Other", item_schema)
        );
    }

    #[test]
    fn test_primary_key_prefers_flagged_field() {
        let schema = item_schema();
        assert_eq!(schema.primary_key_field().map(|f| f.name.as_str()), Some("uid"));
    }

    #[test]
    fn test_primary_key_falls_back_to_id() {
        let schema = EntitySchema::new("Plain")
            .field(FieldDef::new("name", FieldType::scalar("String")))
            .field(FieldDef::new("id", FieldType::scalar("i64")));
        assert_eq!(schema.primary_key_field().map(|f| f.name.as_str()), Some("id"));

        let none =
            EntitySchema::new("NoKey").field(FieldDef::new("name", FieldType::scalar("String")));
        assert!(none.primary_key_field().is_none());
    }

    #[test]
    fn test_get_field_by_declared_name() {
        let schema = item_schema().with_table_name("stock_items");
        assert!(schema.get_field("uid").is_some());
        assert!(schema.get_field("missing").is_none());
        assert_eq!(schema.table_name.as_deref(), Some("stock_items"));
    }
}
