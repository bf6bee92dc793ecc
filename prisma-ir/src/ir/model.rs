//! Model IR definitions.
//!
//! A [`Model`] is one table: a fixed-shape primary key, foreign key columns
//! carrying their relation, plain columns, and index declarations.

use serde::{Deserialize, Serialize};

use super::types::ScalarType;

/// Table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Table name (snake_case identifier)
    pub name: String,

    /// Human readable description
    #[serde(default)]
    pub description: String,

    /// Read-only derived table
    #[serde(default)]
    pub material: bool,

    /// The primary key column
    pub primary_field: PrimaryField,

    /// Foreign key columns, in declaration order
    #[serde(default)]
    pub foreign_fields: Vec<ForeignField>,

    /// Plain columns, in declaration order
    #[serde(default)]
    pub plain_fields: Vec<PlainField>,

    /// Uniqueness constraints
    #[serde(default)]
    pub unique_indexes: Vec<UniqueIndex>,

    /// Lookup indexes
    #[serde(default)]
    pub plain_indexes: Vec<PlainIndex>,

    /// Full-text (trigram) indexes
    #[serde(default)]
    pub gin_indexes: Vec<GinIndex>,
}

impl Model {
    /// Create a model with an `id` primary key and no other columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            material: false,
            primary_field: PrimaryField::new("id"),
            foreign_fields: Vec::new(),
            plain_fields: Vec::new(),
            unique_indexes: Vec::new(),
            plain_indexes: Vec::new(),
            gin_indexes: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark as a materialized (read-only) table.
    pub fn with_material(mut self, material: bool) -> Self {
        self.material = material;
        self
    }

    /// Replace the primary key column.
    pub fn with_primary(mut self, primary: PrimaryField) -> Self {
        self.primary_field = primary;
        self
    }

    /// Append a foreign key column.
    pub fn with_foreign(mut self, field: ForeignField) -> Self {
        self.foreign_fields.push(field);
        self
    }

    /// Append a plain column.
    pub fn with_plain(mut self, field: PlainField) -> Self {
        self.plain_fields.push(field);
        self
    }

    /// Append a unique index.
    pub fn with_unique_index(mut self, index: UniqueIndex) -> Self {
        self.unique_indexes.push(index);
        self
    }

    /// Append a plain index.
    pub fn with_plain_index(mut self, index: PlainIndex) -> Self {
        self.plain_indexes.push(index);
        self
    }

    /// Append a full-text index.
    pub fn with_gin_index(mut self, index: GinIndex) -> Self {
        self.gin_indexes.push(index);
        self
    }

    /// All column names: primary, then foreign, then plain.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_field.name.as_str())
            .chain(self.foreign_fields.iter().map(|f| f.name.as_str()))
            .chain(self.plain_fields.iter().map(|f| f.name.as_str()))
    }

    /// Check whether a column with this name exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.field_names().any(|n| n == name)
    }

    /// Find a plain column by name.
    pub fn plain_field(&self, name: &str) -> Option<&PlainField> {
        self.plain_fields.iter().find(|f| f.name == name)
    }

    /// Find a foreign column by name.
    pub fn foreign_field(&self, name: &str) -> Option<&ForeignField> {
        self.foreign_fields.iter().find(|f| f.name == name)
    }
}

/// Primary key column. Always an opaque identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryField {
    /// Column name, conventionally `id`
    pub name: String,

    /// Human readable description
    #[serde(default)]
    pub description: String,
}

impl PrimaryField {
    /// Create a primary key column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "Primary Key.".to_string(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The column type, fixed by construction.
    pub fn scalar_type(&self) -> ScalarType {
        ScalarType::Uuid
    }
}

/// Foreign key column together with the relation it establishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignField {
    /// Column name, conventionally `{target}_id`
    pub name: String,

    /// Human readable description
    #[serde(default)]
    pub description: String,

    /// The relation this column backs
    pub relation: Relation,

    /// One-to-one relation
    #[serde(default)]
    pub unique: bool,

    /// Optional relation
    #[serde(default)]
    pub nullable: bool,
}

impl ForeignField {
    /// Create a required, non-unique foreign key column.
    pub fn new(name: impl Into<String>, relation: Relation) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            relation,
            unique: false,
            nullable: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark as one-to-one.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Mark as optional.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// The column type, fixed by construction.
    pub fn scalar_type(&self) -> ScalarType {
        ScalarType::Uuid
    }
}

/// Association from the owning model to `target_model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Relation property name on the owning model
    pub name: String,

    /// Name of the referenced model
    pub target_model: String,

    /// Label distinguishing several relations towards the same model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_name: Option<String>,

    /// Property name of the back-relation on the target model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_name: Option<String>,
}

impl Relation {
    /// Create a relation without a mapping name.
    pub fn new(name: impl Into<String>, target_model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_model: target_model.into(),
            mapping_name: None,
            opposite_name: None,
        }
    }

    /// Set the disambiguation label.
    pub fn with_mapping_name(mut self, mapping_name: impl Into<String>) -> Self {
        self.mapping_name = Some(mapping_name.into());
        self
    }

    /// Set the back-relation property name.
    pub fn with_opposite_name(mut self, opposite_name: impl Into<String>) -> Self {
        self.opposite_name = Some(opposite_name.into());
        self
    }

    /// Property name of the back-relation rendered on the target model.
    ///
    /// `opposite_name` wins; otherwise the source model name, suffixed with
    /// the mapping name when there is one.
    pub fn opposite_property(&self, source_model: &str) -> String {
        match (&self.opposite_name, &self.mapping_name) {
            (Some(opposite), _) => opposite.clone(),
            (None, Some(mapping)) => format!("{source_model}_{mapping}"),
            (None, None) => source_model.to_string(),
        }
    }
}

/// Plain (non-key) column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainField {
    /// Column name
    pub name: String,

    /// Column type
    #[serde(rename = "type")]
    pub ty: ScalarType,

    /// Human readable description
    #[serde(default)]
    pub description: String,

    /// Whether the column accepts null
    #[serde(default)]
    pub nullable: bool,
}

impl PlainField {
    /// Create a required column.
    pub fn new(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: String::new(),
            nullable: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark as nullable.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Uniqueness constraint over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueIndex {
    /// Participating columns, in order
    pub field_names: Vec<String>,
}

impl UniqueIndex {
    /// Create a unique index.
    pub fn new<I, S>(field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field_names: field_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Lookup index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainIndex {
    /// Participating columns, in order
    pub field_names: Vec<String>,
}

impl PlainIndex {
    /// Create a plain index.
    pub fn new<I, S>(field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field_names: field_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Full-text index over a single text column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GinIndex {
    /// The indexed column
    pub field_name: String,
}

impl GinIndex {
    /// Create a full-text index.
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }
}
