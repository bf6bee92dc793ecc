//! Application, file and component definitions.
//!
//! A [`Component`] is the planning record that assigns a set of tables to
//! one output file. A [`File`] is what a producer actually delivered for
//! that component, and the [`Application`] is the ordered list of files.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::Model;

/// The whole schema under construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Files in output order
    pub files: Vec<File>,
}

impl Application {
    /// Create an application from files.
    pub fn new(files: Vec<File>) -> Self {
        Self { files }
    }

    /// Append a file.
    pub fn with_file(mut self, file: File) -> Self {
        self.files.push(file);
        self
    }

    /// Every model, in file order then declaration order.
    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.files.iter().flat_map(|file| file.models.iter())
    }

    /// Every model paired with the file that declares it.
    pub fn models_with_file(&self) -> impl Iterator<Item = (&File, &Model)> {
        self.files
            .iter()
            .flat_map(|file| file.models.iter().map(move |model| (file, model)))
    }

    /// Find a model by name. The first declaration wins.
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models().find(|m| m.name == name)
    }

    /// Set of all model names.
    pub fn model_names(&self) -> BTreeSet<&str> {
        self.models().map(|m| m.name.as_str()).collect()
    }

    /// Find a file by filename.
    pub fn file(&self, filename: &str) -> Option<&File> {
        self.files.iter().find(|f| f.filename == filename)
    }
}

/// A named, namespaced container of models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Output filename, `schema-{order}-{domain}.{ext}`
    pub filename: String,

    /// Namespace label shared with the owning component
    pub namespace: String,

    /// Models in declaration order
    #[serde(default)]
    pub models: Vec<Model>,
}

impl File {
    /// Create an empty file.
    pub fn new(filename: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            namespace: namespace.into(),
            models: Vec::new(),
        }
    }

    /// Create the (empty) file that corresponds to a component.
    pub fn for_component(component: &Component) -> Self {
        Self::new(component.filename.clone(), component.namespace.clone())
    }

    /// Append a model.
    pub fn with_model(mut self, model: Model) -> Self {
        self.models.push(model);
        self
    }

    /// Names of the models in this file.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.name.as_str())
    }
}

/// Planning record: one output file and the tables it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Output filename, `schema-{order}-{domain}.{ext}`
    pub filename: String,

    /// Namespace label
    pub namespace: String,

    /// Owned table names
    pub tables: Vec<String>,
}

impl Component {
    /// Create a component.
    pub fn new<I, S>(filename: impl Into<String>, namespace: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filename: filename.into(),
            namespace: namespace.into(),
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether this component owns a table.
    pub fn owns(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t == table)
    }
}
