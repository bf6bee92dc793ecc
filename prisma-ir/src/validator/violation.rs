//! Violation records.
//!
//! A [`Violation`] is data, not an exception: it is serialized verbatim and
//! handed back to the producer as structured feedback.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ir::{Application, Component, File};

use super::ValidatedApplication;

/// Kind of broken invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    // ==========================================================================
    // Application level
    // ==========================================================================
    /// A model name appears more than once in the application
    DuplicateModel,

    /// A component has no file
    MissingFile,

    /// A file belongs to no component
    UnexpectedFile,

    /// Two files share a filename
    DuplicateFile,

    /// A file's namespace differs from its component's
    NamespaceMismatch,

    /// A file holds no models
    EmptyFile,

    /// A component's table is absent from its file
    MissingModel,

    /// A file holds a model its component does not own
    UnexpectedModel,

    // ==========================================================================
    // Model level
    // ==========================================================================
    /// A model or column name is not a valid identifier
    InvalidIdentifier,

    /// A relation property or label is not a valid relation name
    InvalidRelationName,

    /// A relation targets a model that does not exist
    DanglingRelation,

    /// Several relations towards the same model are not disambiguated
    AmbiguousRelation,

    /// A column or relation property name is used twice on one model
    DuplicateField,

    // ==========================================================================
    // Index level
    // ==========================================================================
    /// An index names a column that does not exist on the model
    UnknownIndexField,

    /// An index has no columns
    EmptyIndex,

    /// An index lists the same column twice
    DuplicateIndexField,

    /// Two indexes cover the same columns
    DuplicateIndex,

    /// A full-text index targets a column that is not plain text
    InvalidGinIndex,
}

impl ViolationKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::DuplicateModel => "duplicate_model",
            ViolationKind::MissingFile => "missing_file",
            ViolationKind::UnexpectedFile => "unexpected_file",
            ViolationKind::DuplicateFile => "duplicate_file",
            ViolationKind::NamespaceMismatch => "namespace_mismatch",
            ViolationKind::EmptyFile => "empty_file",
            ViolationKind::MissingModel => "missing_model",
            ViolationKind::UnexpectedModel => "unexpected_model",
            ViolationKind::InvalidIdentifier => "invalid_identifier",
            ViolationKind::InvalidRelationName => "invalid_relation_name",
            ViolationKind::DanglingRelation => "dangling_relation",
            ViolationKind::AmbiguousRelation => "ambiguous_relation",
            ViolationKind::DuplicateField => "duplicate_field",
            ViolationKind::UnknownIndexField => "unknown_index_field",
            ViolationKind::EmptyIndex => "empty_index",
            ViolationKind::DuplicateIndexField => "duplicate_index_field",
            ViolationKind::DuplicateIndex => "duplicate_index",
            ViolationKind::InvalidGinIndex => "invalid_gin_index",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of the offending entity: component > file > model > field/index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationPath {
    /// Component namespace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Filename
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Model name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Column or relation property name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Index label, e.g. `uniqueIndexes[0]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl ViolationPath {
    /// Path rooted at a file.
    pub fn for_file(file: &File) -> Self {
        Self {
            component: Some(file.namespace.clone()),
            file: Some(file.filename.clone()),
            ..Default::default()
        }
    }

    /// Path rooted at a component.
    pub fn for_component(component: &Component) -> Self {
        Self {
            component: Some(component.namespace.clone()),
            file: Some(component.filename.clone()),
            ..Default::default()
        }
    }

    /// Descend into a model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Descend into a column or relation property.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Descend into an index.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }
}

impl fmt::Display for ViolationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [
            &self.component,
            &self.file,
            &self.model,
            &self.index,
            &self.field,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();

        if parts.is_empty() {
            f.write_str("<application>")
        } else {
            f.write_str(&parts.join(" > "))
        }
    }
}

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// What was broken
    pub kind: ViolationKind,

    /// Where
    pub path: ViolationPath,

    /// Human readable explanation
    pub message: String,
}

impl Violation {
    /// Create a violation.
    pub fn new(kind: ViolationKind, path: ViolationPath, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.path, self.message)
    }
}

/// Every violation found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(transparent)]
#[error("Validation failed with {} violation(s):\n{}", count(.0), format_violations(.0))]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    /// Violations of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.0.iter().filter(move |v| v.kind == kind)
    }

    /// Check whether any violation has this kind.
    pub fn contains_kind(&self, kind: ViolationKind) -> bool {
        self.of_kind(kind).next().is_some()
    }
}

impl Deref for Violations {
    type Target = [Violation];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn count(violations: &[Violation]) -> usize {
    violations.len()
}

/// Format violations as a numbered list.
fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .enumerate()
        .map(|(i, v)| format!("  {}. {}", i + 1, v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outcome of a validation in the shape returned to external callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Whether the application passed
    pub accepted: bool,

    /// The accepted application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,

    /// Every violation, when rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
}

impl From<&Result<ValidatedApplication, Violations>> for ValidationReport {
    fn from(result: &Result<ValidatedApplication, Violations>) -> Self {
        match result {
            Ok(validated) => Self {
                accepted: true,
                application: Some(validated.application().clone()),
                violations: None,
            },
            Err(violations) => Self {
                accepted: false,
                application: None,
                violations: Some(violations.0.clone()),
            },
        }
    }
}
