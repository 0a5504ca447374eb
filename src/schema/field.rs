//! Field declarations and their type shapes.

use crate::schema::entity::EntityRef;

/// Declared type of an entity field, as far as relation discovery cares
///
/// Wrappers are kept so the classifier can see through them the same way
/// regardless of how a field was declared: `Option<Box<Group>>` is
/// `Pointer(Pointer(Entity(Group)))`, `Vec<Arc<Tag>>` is
/// `List(Pointer(Entity(Tag)))`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A plain column value (`i64`, `String`, `bool`, ...)
    Scalar(&'static str),
    /// A struct that is not a reflected entity (`NaiveDateTime`, `Uuid`, ...)
    Struct(&'static str),
    /// A reflected entity that can be queried as its own table
    Entity(EntityRef),
    /// `Option<T>`, `Box<T>`, `Arc<T>`, `Rc<T>`, `&T`
    Pointer(Box<FieldType>),
    /// `Vec<T>`, sets, slices and arrays
    List(Box<FieldType>),
}

/// Structural shape of a relational field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// A single struct, possibly behind pointers
    Single,
    /// A collection of structs
    Collection,
}

impl FieldType {
    pub fn scalar(name: &'static str) -> Self {
        FieldType::Scalar(name)
    }

    pub fn entity(entity: EntityRef) -> Self {
        FieldType::Entity(entity)
    }

    pub fn pointer(inner: FieldType) -> Self {
        FieldType::Pointer(Box::new(inner))
    }

    pub fn list(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    /// Strip every pointer layer
    pub fn concrete(&self) -> &FieldType {
        match self {
            FieldType::Pointer(inner) => inner.concrete(),
            other => other,
        }
    }

    /// Strip every pointer and collection layer
    ///
    /// `Vec<Option<Vec<Box<Tag>>>>` yields `Entity(Tag)`.
    pub fn element(&self) -> &FieldType {
        match self {
            FieldType::Pointer(inner) | FieldType::List(inner) => inner.element(),
            other => other,
        }
    }

    /// Whether the element type is a struct (entity or not)
    pub fn is_struct_like(&self) -> bool {
        matches!(self.element(), FieldType::Struct(_) | FieldType::Entity(_))
    }

    /// Shape of the field if its element type is a struct, `None` otherwise
    pub fn shape(&self) -> Option<FieldShape> {
        if !self.is_struct_like() {
            return None;
        }
        match self.concrete() {
            FieldType::List(_) => Some(FieldShape::Collection),
            _ => Some(FieldShape::Single),
        }
    }

    /// The related entity, if the element type is a reflected entity
    pub fn entity_ref(&self) -> Option<&EntityRef> {
        match self.element() {
            FieldType::Entity(entity) => Some(entity),
            _ => None,
        }
    }
}

/// Relation annotations carried by a field
///
/// `Some(String::new())` means the annotation was written without a value,
/// which the classifier reports as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationAnnotations {
    /// Name of the field holding the foreign key
    pub foreign_key: Option<String>,
    /// Name of the junction table of a many-to-many association
    pub many_to_many: Option<String>,
}

impl RelationAnnotations {
    pub fn is_empty(&self) -> bool {
        self.foreign_key.is_none() && self.many_to_many.is_none()
    }
}

/// One declared field of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Declared field name
    pub name: String,
    /// Declared type shape
    pub ty: FieldType,
    /// Explicit column name, overriding the naming strategy
    pub column_name: Option<String>,
    /// Whether this field is the primary key
    pub primary_key: bool,
    /// Relation annotations
    pub annotations: RelationAnnotations,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            column_name: None,
            primary_key: false,
            annotations: RelationAnnotations::default(),
        }
    }

    pub fn column_name(mut self, column: impl Into<String>) -> Self {
        self.column_name = Some(column.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn foreign_key(mut self, key: impl Into<String>) -> Self {
        self.annotations.foreign_key = Some(key.into());
        self
    }

    pub fn many_to_many(mut self, table: impl Into<String>) -> Self {
        self.annotations.many_to_many = Some(table.into());
        self
    }
}
