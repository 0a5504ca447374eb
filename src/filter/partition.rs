//! Filter partitioner.
//!
//! Splits one or more filter mappings into scalar predicates on the current
//! entity and relational predicates that need a sub-query. Every key must
//! resolve to a plain column or a discovered relation of the entity.

use crate::error::DeepFilterError;
use crate::filter::value::{is_nested, scalar_predicate, Filter};
use crate::naming::ColumnResolver;
use crate::relation::cache::EntityRelations;
use crate::relation::classify::classify;
use crate::relation::def::RelationInfo;
use crate::relation::helpers::qualified;
use crate::schema::EntitySchema;
use sea_query::Expr;
use serde_json::Value as JsonValue;

/// A scalar filter entry on the current entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarEntry<'f> {
    pub column: &'f str,
    pub value: &'f JsonValue,
}

/// A nested filter entry on a relation of the current entity
#[derive(Debug, Clone, PartialEq)]
pub struct RelationalEntry<'f> {
    pub column: &'f str,
    pub relation: RelationInfo,
    pub filter: &'f Filter,
}

/// Result of partitioning filter mappings for one entity
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Partition<'f> {
    pub scalars: Vec<ScalarEntry<'f>>,
    pub relations: Vec<RelationalEntry<'f>>,
}

impl<'f> Partition<'f> {
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.relations.is_empty()
    }

    /// Scalar predicates qualified with `table`, combined by the caller with AND
    pub fn scalar_predicates(
        &self,
        table: &str,
        wildcards: bool,
    ) -> Result<Vec<Expr>, DeepFilterError> {
        self.scalars
            .iter()
            .map(|entry| {
                let column = qualified(table, entry.column);
                scalar_predicate(column, entry.column, entry.value, wildcards)
            })
            .collect()
    }
}

/// Partition every key of every filter mapping
///
/// # Errors
///
/// - `UnknownField` when a key is neither a plain column nor a relation;
/// - `InvalidValue` when a relation is given a scalar value;
/// - `UnclassifiableRelation` / `MalformedAnnotation` when a nested filter
///   names a struct field that could not be classified.
pub fn partition<'f>(
    schema: &EntitySchema,
    relations: &EntityRelations,
    resolver: &ColumnResolver<'_>,
    filters: &'f [Filter],
) -> Result<Partition<'f>, DeepFilterError> {
    let mut result = Partition::default();

    for filter in filters {
        for (column, value) in filter {
            match value {
                JsonValue::Object(nested) => {
                    let relation = relations
                        .relation(column)
                        .ok_or_else(|| missing_relation(schema, resolver, column))?;
                    result.relations.push(RelationalEntry {
                        column,
                        relation: relation.clone(),
                        filter: nested,
                    });
                }
                _ if relations.has_column(column) => {
                    if let JsonValue::Array(items) = value {
                        if items.iter().any(is_nested) {
                            return Err(DeepFilterError::InvalidValue {
                                field: column.clone(),
                                reason: "membership lists cannot hold nested filters".to_string(),
                            });
                        }
                    }
                    result.scalars.push(ScalarEntry { column, value });
                }
                _ if relations.relation(column).is_some() => {
                    return Err(DeepFilterError::InvalidValue {
                        field: column.clone(),
                        reason: "relations can only be filtered with a nested filter".to_string(),
                    });
                }
                _ => {
                    return Err(DeepFilterError::UnknownField {
                        entity: schema.name.clone(),
                        field: column.clone(),
                    });
                }
            }
        }
    }

    Ok(result)
}

/// Explain why a nested filter key has no relation
fn missing_relation(
    schema: &EntitySchema,
    resolver: &ColumnResolver<'_>,
    column: &str,
) -> DeepFilterError {
    let declared = schema
        .fields
        .iter()
        .find(|f| f.ty.shape().is_some() && resolver.column(schema, f) == column);

    match declared.map(|field| classify(schema, field, resolver)) {
        Some(Err(err)) => err,
        _ => DeepFilterError::UnknownField {
            entity: schema.name.clone(),
            field: column.to_string(),
        },
    }
}
