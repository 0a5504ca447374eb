//! Relationship classifier.
//!
//! Turns one declared field into a [`RelationInfo`]. The kind is inferred
//! from the field's shape and settled by its annotations:
//!
//! - a single struct with `foreign_key` is `ToOne`: the owner holds the key;
//! - a collection of structs with `foreign_key` is `ToMany`: the related
//!   entity holds a key pointing back at the owner;
//! - any struct field with `many_to_many` is `ManyToMany` through the named
//!   junction table, using `<type>_id` junction columns.

use crate::error::DeepFilterError;
use crate::naming::ColumnResolver;
use crate::relation::def::{Junction, RelationInfo, RelationKind};
use crate::schema::{EntityRef, EntitySchema, FieldDef, FieldShape};

/// Classify a struct-shaped field of `owner`
///
/// # Errors
///
/// - `UnclassifiableRelation` when the field is not struct-shaped, has no
///   relation annotation, or its element type is not a reflected entity;
/// - `MalformedAnnotation` when an annotation is present but empty.
pub fn classify(
    owner: &EntitySchema,
    field: &FieldDef,
    resolver: &ColumnResolver<'_>,
) -> Result<RelationInfo, DeepFilterError> {
    let unclassifiable = || DeepFilterError::UnclassifiableRelation {
        entity: owner.name.clone(),
        field: field.name.clone(),
    };

    let shape = field.ty.shape().ok_or_else(unclassifiable)?;
    let annotations = &field.annotations;

    if let Some(key) = &annotations.foreign_key {
        let related = related_entity(owner, field)?;
        if key.trim().is_empty() {
            return Err(malformed(owner, field, "foreign_key"));
        }

        return Ok(match shape {
            FieldShape::Single => RelationInfo {
                related,
                foreign_key: resolver.key_column(owner, key),
                kind: RelationKind::ToOne,
            },
            FieldShape::Collection => RelationInfo {
                related,
                foreign_key: resolver.key_column(&related.schema(), key),
                kind: RelationKind::ToMany,
            },
        });
    }

    if let Some(table) = &annotations.many_to_many {
        let related = related_entity(owner, field)?;
        if table.trim().is_empty() {
            return Err(malformed(owner, field, "many_to_many"));
        }

        let related_key = resolver.junction_key(related.name());
        let junction = Junction {
            table: resolver.junction_table(table),
            related_key: related_key.clone(),
            owner_key: resolver.junction_key(&owner.name),
        };
        return Ok(RelationInfo {
            related,
            foreign_key: related_key,
            kind: RelationKind::ManyToMany(junction),
        });
    }

    Err(unclassifiable())
}

fn related_entity(owner: &EntitySchema, field: &FieldDef) -> Result<EntityRef, DeepFilterError> {
    field
        .ty
        .entity_ref()
        .copied()
        .ok_or_else(|| DeepFilterError::UnclassifiableRelation {
            entity: owner.name.clone(),
            field: field.name.clone(),
        })
}

fn malformed(owner: &EntitySchema, field: &FieldDef, annotation: &'static str) -> DeepFilterError {
    DeepFilterError::MalformedAnnotation {
        entity: owner.name.clone(),
        field: field.name.clone(),
        annotation,
    }
}
