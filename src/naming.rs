//! Naming conventions for tables and columns.
//!
//! A [`NamingStrategy`] maps declared entity and field names to database
//! names. [`ColumnResolver`] applies the per-table and per-column overrides an
//! [`EntitySchema`] carries before falling back to the strategy, so the
//! top-level query and every nested sub-query name things the same way.

use crate::schema::{EntitySchema, FieldDef};
use heck::ToSnakeCase;

/// Deterministic conversion of declared names into database names
pub trait NamingStrategy: Send + Sync {
    /// Table name for an entity type name (`Person` -> `people`)
    fn table_name(&self, entity: &str) -> String;

    /// Column name for a field of the given table (`GroupRef` -> `group_ref`)
    fn column_name(&self, table: &str, field: &str) -> String;

    /// Name of a junction table declared on a many-to-many relation
    fn join_table_name(&self, name: &str) -> String {
        name.to_snake_case()
    }

    /// Junction column referencing an entity's primary key (`ManyB` -> `many_b_id`)
    fn foreign_key_name(&self, entity: &str) -> String {
        format!("{}_id", entity.to_snake_case())
    }

    /// Identifies the strategy and its settings in cache keys
    ///
    /// Two strategies that can name the same entity differently must return
    /// different fingerprints.
    fn fingerprint(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Snake-case naming with pluralised table names
///
/// The default convention: `ObjectB` is stored in `object_bs`, its field
/// `ObjectAID` in column `object_aid`, and a many-to-many to `ObjectB` uses
/// the junction column `object_b_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnakeCaseNaming {
    /// Prefix prepended to every table name
    pub table_prefix: String,
    /// Keep table names singular
    pub singular_table: bool,
}

impl SnakeCaseNaming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn singular(mut self) -> Self {
        self.singular_table = true;
        self
    }
}

impl NamingStrategy for SnakeCaseNaming {
    fn table_name(&self, entity: &str) -> String {
        let snake = entity.to_snake_case();
        if self.singular_table {
            format!("{}{}", self.table_prefix, snake)
        } else {
            format!("{}{}", self.table_prefix, pluralize(&snake))
        }
    }

    fn column_name(&self, _table: &str, field: &str) -> String {
        field.to_snake_case()
    }

    fn join_table_name(&self, name: &str) -> String {
        format!("{}{}", self.table_prefix, name.to_snake_case())
    }

    fn fingerprint(&self) -> String {
        format!("snake_case:{}:{}", self.table_prefix, self.singular_table)
    }
}

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "deer",
    "news",
    "police",
    "metadata",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
];

/// Pluralise the last word of a snake_case name
pub fn pluralize(snake: &str) -> String {
    let (head, word) = match snake.rfind('_') {
        Some(idx) => snake.split_at(idx + 1),
        None => ("", snake),
    };

    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return snake.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(single, _)| *single == word) {
        return format!("{head}{plural}");
    }

    let plural = if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        // Single letters ("object_b" -> "object_bs") are not words to inflect.
        if word.len() == 1 {
            format!("{word}s")
        } else {
            format!("{word}es")
        }
    } else if word.len() > 1
        && word.ends_with('y')
        && !word[..word.len() - 1].ends_with(&['a', 'e', 'i', 'o', 'u'][..])
    {
        format!("{}ies", &word[..word.len() - 1])
    } else {
        format!("{word}s")
    };

    format!("{head}{plural}")
}

/// Resolves table and column names for schemas under one naming strategy
#[derive(Clone, Copy)]
pub struct ColumnResolver<'a> {
    naming: &'a dyn NamingStrategy,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(naming: &'a dyn NamingStrategy) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> &'a dyn NamingStrategy {
        self.naming
    }

    /// Table of an entity, honouring an explicit table name
    pub fn table(&self, schema: &EntitySchema) -> String {
        match &schema.table_name {
            Some(table) => table.clone(),
            None => self.naming.table_name(&schema.name),
        }
    }

    /// Column of a declared field, honouring an explicit column name
    pub fn column(&self, schema: &EntitySchema, field: &FieldDef) -> String {
        match &field.column_name {
            Some(column) => column.clone(),
            None => self.naming.column_name(&self.table(schema), &field.name),
        }
    }

    /// Column of a key named in an annotation (`GroupRef`, `group_ref`)
    ///
    /// The key is matched against the schema's declared fields so column
    /// overrides apply; unmatched keys go through the naming strategy.
    pub fn key_column(&self, schema: &EntitySchema, key: &str) -> String {
        let wanted = key.to_snake_case();
        let declared = schema
            .fields
            .iter()
            .find(|f| f.name == key || f.name.to_snake_case() == wanted);
        match declared {
            Some(field) => self.column(schema, field),
            None => self.naming.column_name(&self.table(schema), key),
        }
    }

    /// Primary key column, `id` when the schema declares none
    pub fn primary_key(&self, schema: &EntitySchema) -> String {
        match schema.primary_key_field() {
            Some(field) => self.column(schema, field),
            None => self.naming.column_name(&self.table(schema), "id"),
        }
    }

    /// Junction column referencing the given entity type
    pub fn junction_key(&self, entity: &str) -> String {
        self.naming.foreign_key_name(entity)
    }

    /// Junction table for a declared many-to-many name
    pub fn junction_table(&self, name: &str) -> String {
        self.naming.join_table_name(name)
    }
}
