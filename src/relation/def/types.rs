//! Relation kind definitions.
//!
//! This module provides the `RelationKind` enum which represents which side
//! of a relationship holds the foreign key, and the `Junction` metadata of a
//! many-to-many association.

/// Junction table of a many-to-many association
///
/// Only the conventional two-column shape is supported: one column pointing
/// at the owner's primary key and one pointing at the related primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Junction {
    /// Junction table name
    pub table: String,
    /// Junction column referencing the related entity's primary key
    pub related_key: String,
    /// Junction column referencing the owning entity's primary key
    pub owner_key: String,
}

/// Kind of relationship, seen from the entity declaring the field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// The current entity holds the foreign key; exactly one related row
    ToOne,
    /// The related entity holds a foreign key pointing back at the current entity
    ToMany,
    /// Both entities are linked through a junction table
    ManyToMany(Junction),
}

impl RelationKind {
    /// Junction metadata, only present for many-to-many relations
    pub fn junction(&self) -> Option<&Junction> {
        match self {
            RelationKind::ManyToMany(junction) => Some(junction),
            _ => None,
        }
    }

    /// Short label used in log output
    pub fn label(&self) -> &'static str {
        match self {
            RelationKind::ToOne => "to-one",
            RelationKind::ToMany => "to-many",
            RelationKind::ManyToMany(_) => "many-to-many",
        }
    }
}
