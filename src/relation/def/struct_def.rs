//! RelationInfo struct for storing relationship metadata.
//!
//! This module provides the `RelationInfo` struct which contains everything
//! the sub-query compiler needs to join a relational field back to its owner.

use crate::relation::def::types::{Junction, RelationKind};
use crate::schema::EntityRef;

/// Discovered relationship of one entity field
///
/// This struct contains all metadata about a relationship, including:
/// - Relationship kind (ToOne, ToMany, ManyToMany)
/// - The related entity's constructor
/// - The resolved foreign key column
/// - Junction table columns for many-to-many relationships
///
/// # Example
///
/// ```no_run
/// use deepguard::relation::{RelationInfo, RelationKind};
/// use deepguard::schema::{EntityRef, EntitySchema};
///
/// // Person.group -> Group, people.group_ref holds groups.id
/// let rel = RelationInfo {
///     related: EntityRef::new("Group", || EntitySchema::new("Group")),
///     foreign_key: "group_ref".to_string(),
///     kind: RelationKind::ToOne,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationInfo {
    /// Constructor of the related entity, binds nested filters to its table
    pub related: EntityRef,
    /// Resolved foreign key column
    ///
    /// On the owner for `ToOne`, on the related entity for `ToMany`, and the
    /// junction column referencing the related entity for `ManyToMany`.
    pub foreign_key: String,
    /// Kind of relationship
    pub kind: RelationKind,
}

impl RelationInfo {
    pub fn junction(&self) -> Option<&Junction> {
        self.kind.junction()
    }
}
