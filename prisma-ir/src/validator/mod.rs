//! Structural validation.
//!
//! The validator re-checks every invariant of a candidate [`Application`]
//! from scratch and collects all violations in one pass. It is a pure
//! function of its inputs: no I/O, no shared state, deterministic output.
//!
//! Checks run in a fixed order:
//!
//! 1. component/file correspondence (component order)
//! 2. global model name uniqueness (application order)
//! 3. per model: identifiers, columns, relations, indexes (application order)
//! 4. relation names between each pair of models (application order)

pub mod violation;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::Deref;

use serde::Serialize;
use tracing::debug;

use crate::ir::{Application, Component, File, ForeignField, Model};
use crate::rules::{is_valid_identifier, is_valid_relation_name};

pub use violation::{ValidationReport, Violation, ViolationKind, ViolationPath, Violations};

/// An application that passed validation.
///
/// Only the validator constructs this type, which makes it the sole gate in
/// front of the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedApplication {
    application: Application,
}

impl ValidatedApplication {
    /// The validated application.
    pub fn application(&self) -> &Application {
        &self.application
    }

    /// Unwrap into the application.
    pub fn into_inner(self) -> Application {
        self.application
    }
}

impl Deref for ValidatedApplication {
    type Target = Application;

    fn deref(&self) -> &Self::Target {
        &self.application
    }
}

/// Validate a whole application against its component plan.
pub fn validate(
    application: &Application,
    components: &[Component],
) -> Result<ValidatedApplication, Violations> {
    Validator::new(components).validate(application)
}

/// Configurable validator.
///
/// `components` must each correspond to exactly one file. `others` are
/// components whose files are not part of the application being checked:
/// their tables count as existing relation targets, and a model they own
/// appearing in a checked file is reported as leakage.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    components: &'a [Component],
    others: &'a [Component],
}

impl<'a> Validator<'a> {
    /// Create a validator for the given components.
    pub fn new(components: &'a [Component]) -> Self {
        Self {
            components,
            others: &[],
        }
    }

    /// Declare components generated elsewhere.
    pub fn with_other_components(mut self, others: &'a [Component]) -> Self {
        self.others = others;
        self
    }

    /// Run every check.
    pub fn validate(&self, application: &Application) -> Result<ValidatedApplication, Violations> {
        debug!(
            files = application.files.len(),
            components = self.components.len(),
            "validating application"
        );

        let mut violations = Vec::new();
        self.check_correspondence(application, &mut violations);
        check_model_names(application, &mut violations);

        let targets = self.known_targets(application);
        let back_relations = collect_back_relations(application);
        for (file, model) in application.models_with_file() {
            check_model(file, model, &targets, &back_relations, &mut violations);
        }
        check_relation_ambiguity(application, &mut violations);

        if violations.is_empty() {
            debug!("validation accepted");
            Ok(ValidatedApplication {
                application: application.clone(),
            })
        } else {
            debug!(violations = violations.len(), "validation rejected");
            Err(Violations(violations))
        }
    }

    /// Model names a relation may point at.
    fn known_targets<'b>(&'b self, application: &'b Application) -> BTreeSet<&'b str> {
        let mut targets = application.model_names();
        for component in self.others {
            targets.extend(component.tables.iter().map(String::as_str));
        }
        targets
    }

    /// Namespace of the component (checked or other) owning a table.
    fn owner_of(&self, table: &str) -> Option<&'a Component> {
        self.components
            .iter()
            .chain(self.others.iter())
            .find(|c| c.owns(table))
    }

    fn check_correspondence(&self, application: &Application, out: &mut Vec<Violation>) {
        let mut seen = HashSet::new();
        for file in &application.files {
            if !seen.insert(file.filename.as_str()) {
                out.push(Violation::new(
                    ViolationKind::DuplicateFile,
                    ViolationPath::for_file(file),
                    format!("file '{}' is declared more than once", file.filename),
                ));
            }
            if file.models.is_empty() {
                out.push(Violation::new(
                    ViolationKind::EmptyFile,
                    ViolationPath::for_file(file),
                    format!("file '{}' has no models", file.filename),
                ));
            }
        }

        for component in self.components {
            let Some(file) = application.file(&component.filename) else {
                out.push(Violation::new(
                    ViolationKind::MissingFile,
                    ViolationPath::for_component(component),
                    format!(
                        "component '{}' has no file named '{}'",
                        component.namespace, component.filename
                    ),
                ));
                continue;
            };

            if file.namespace != component.namespace {
                out.push(Violation::new(
                    ViolationKind::NamespaceMismatch,
                    ViolationPath::for_component(component),
                    format!(
                        "file '{}' declares namespace '{}' but its component is '{}'",
                        file.filename, file.namespace, component.namespace
                    ),
                ));
            }

            let present: BTreeSet<&str> = file.model_names().collect();
            for table in &component.tables {
                if !present.contains(table.as_str()) {
                    out.push(Violation::new(
                        ViolationKind::MissingModel,
                        ViolationPath::for_component(component).model(table),
                        format!(
                            "table '{table}' is owned by component '{}' but its file does not define it",
                            component.namespace
                        ),
                    ));
                }
            }

            for model in &file.models {
                if component.owns(&model.name) {
                    continue;
                }
                let message = match self.owner_of(&model.name) {
                    Some(owner) => format!(
                        "table '{}' is owned by component '{}' ({}) and must not be defined here",
                        model.name, owner.namespace, owner.filename
                    ),
                    None => format!(
                        "table '{}' is not owned by component '{}' nor by any other component",
                        model.name, component.namespace
                    ),
                };
                out.push(Violation::new(
                    ViolationKind::UnexpectedModel,
                    ViolationPath::for_component(component).model(&model.name),
                    message,
                ));
            }
        }

        for file in &application.files {
            let planned = self
                .components
                .iter()
                .chain(self.others.iter())
                .any(|c| c.filename == file.filename);
            if !planned {
                out.push(Violation::new(
                    ViolationKind::UnexpectedFile,
                    ViolationPath::for_file(file),
                    format!("file '{}' does not belong to any component", file.filename),
                ));
            }
        }
    }
}

/// Back-relations grouped by target model, in application order.
type BackRelations<'a> = HashMap<&'a str, Vec<(&'a File, &'a Model, &'a ForeignField)>>;

fn collect_back_relations(application: &Application) -> BackRelations<'_> {
    let mut map: BackRelations<'_> = HashMap::new();
    for (file, model) in application.models_with_file() {
        for field in &model.foreign_fields {
            map.entry(field.relation.target_model.as_str())
                .or_default()
                .push((file, model, field));
        }
    }
    map
}

fn check_model_names(application: &Application, out: &mut Vec<Violation>) {
    let mut first_seen: HashMap<&str, &str> = HashMap::new();
    for (file, model) in application.models_with_file() {
        if let Some(first) = first_seen.get(model.name.as_str()) {
            out.push(Violation::new(
                ViolationKind::DuplicateModel,
                ViolationPath::for_file(file).model(&model.name),
                format!(
                    "model '{}' is already defined in '{}'",
                    model.name, first
                ),
            ));
        } else {
            first_seen.insert(&model.name, &file.filename);
        }
    }
}

fn check_model(
    file: &File,
    model: &Model,
    targets: &BTreeSet<&str>,
    back_relations: &BackRelations<'_>,
    out: &mut Vec<Violation>,
) {
    let path = ViolationPath::for_file(file).model(&model.name);

    if !is_valid_identifier(&model.name) {
        out.push(Violation::new(
            ViolationKind::InvalidIdentifier,
            path.clone(),
            format!(
                "model name '{}' must match [a-z][a-z0-9_]*",
                model.name
            ),
        ));
    }

    let mut properties = check_columns(model, &path, out);
    check_relations(model, &path, targets, &mut properties, out);
    check_back_relations(model, back_relations, &mut properties, out);
    check_indexes(model, &path, out);
}

/// Column names: identifier shape and uniqueness. Returns the names seen.
fn check_columns<'m>(
    model: &'m Model,
    path: &ViolationPath,
    out: &mut Vec<Violation>,
) -> HashSet<&'m str> {
    let mut seen = HashSet::new();
    for name in model.field_names() {
        if !is_valid_identifier(name) {
            out.push(Violation::new(
                ViolationKind::InvalidIdentifier,
                path.clone().field(name),
                format!("field name '{name}' must match [a-z][a-z0-9_]*"),
            ));
        }
        if !seen.insert(name) {
            out.push(Violation::new(
                ViolationKind::DuplicateField,
                path.clone().field(name),
                format!(
                    "duplicate field name '{name}' in model '{}'",
                    model.name
                ),
            ));
        }
    }
    seen
}

fn check_relations<'m>(
    model: &'m Model,
    path: &ViolationPath,
    targets: &BTreeSet<&str>,
    properties: &mut HashSet<&'m str>,
    out: &mut Vec<Violation>,
) {
    for field in &model.foreign_fields {
        let relation = &field.relation;
        let field_path = path.clone().field(&field.name);

        let labels = [
            ("relation name", Some(&relation.name)),
            ("mappingName", relation.mapping_name.as_ref()),
            ("oppositeName", relation.opposite_name.as_ref()),
        ];
        for (what, label) in labels {
            if let Some(label) = label {
                if !is_valid_relation_name(label) {
                    out.push(Violation::new(
                        ViolationKind::InvalidRelationName,
                        field_path.clone(),
                        format!("{what} '{label}' must match [A-Za-z_][A-Za-z0-9_]*"),
                    ));
                }
            }
        }

        if !properties.insert(&relation.name) {
            out.push(Violation::new(
                ViolationKind::DuplicateField,
                field_path.clone(),
                format!(
                    "relation property '{}' collides with another field or relation of '{}'",
                    relation.name, model.name
                ),
            ));
        }

        if !targets.contains(relation.target_model.as_str()) {
            out.push(Violation::new(
                ViolationKind::DanglingRelation,
                field_path.clone(),
                format!(
                    "relation '{}' targets model '{}' which does not exist",
                    relation.name, relation.target_model
                ),
            ));
        }
    }
}

/// Back-relation properties rendered on `model` must not collide with its
/// own fields. Reported on the source foreign field, where it can be fixed.
fn check_back_relations(
    model: &Model,
    back_relations: &BackRelations<'_>,
    properties: &mut HashSet<&str>,
    out: &mut Vec<Violation>,
) {
    let Some(sources) = back_relations.get(model.name.as_str()) else {
        return;
    };

    let mut opposite_names = HashSet::new();
    for (file, source, field) in sources {
        let property = field.relation.opposite_property(&source.name);
        let collides = properties.contains(property.as_str()) || !opposite_names.insert(property.clone());
        if collides {
            out.push(Violation::new(
                ViolationKind::DuplicateField,
                ViolationPath::for_file(file)
                    .model(&source.name)
                    .field(&field.name),
                format!(
                    "back-relation property '{property}' collides with another field or relation of '{}'; set oppositeName",
                    model.name
                ),
            ));
        }
    }
}

/// Relations linking the same pair of models are rendered on both ends, so
/// Prisma can only tell them apart by name. A self-relation renders both
/// ends on one model and always needs a name.
fn check_relation_ambiguity(application: &Application, out: &mut Vec<Violation>) {
    let mut pairs: HashMap<(&str, &str), Vec<&ForeignField>> = HashMap::new();
    for (_, model) in application.models_with_file() {
        for field in &model.foreign_fields {
            pairs
                .entry(model_pair(&model.name, &field.relation.target_model))
                .or_default()
                .push(field);
        }
    }

    for (file, model) in application.models_with_file() {
        for field in &model.foreign_fields {
            let target = field.relation.target_model.as_str();
            let Some(group) = pairs.get(&model_pair(&model.name, target)) else {
                continue;
            };
            let self_relation = model.name == target;
            if group.len() < 2 && !self_relation {
                continue;
            }

            let ambiguous = match &field.relation.mapping_name {
                None => true,
                Some(mapping) => {
                    group
                        .iter()
                        .filter(|f| f.relation.mapping_name.as_ref() == Some(mapping))
                        .count()
                        > 1
                }
            };
            if !ambiguous {
                continue;
            }

            let message = if group.len() == 1 {
                format!(
                    "self-relation '{}' on '{}' needs a mappingName",
                    field.relation.name, model.name
                )
            } else {
                format!(
                    "{} relations link '{}' and '{}'; each needs a distinct mappingName",
                    group.len(),
                    model.name,
                    target
                )
            };
            out.push(Violation::new(
                ViolationKind::AmbiguousRelation,
                ViolationPath::for_file(file)
                    .model(&model.name)
                    .field(&field.name),
                message,
            ));
        }
    }
}

fn model_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

fn check_indexes(model: &Model, path: &ViolationPath, out: &mut Vec<Violation>) {
    let mut covered: HashMap<&[String], String> = HashMap::new();

    let composite = model
        .unique_indexes
        .iter()
        .enumerate()
        .map(|(i, index)| (format!("uniqueIndexes[{i}]"), index.field_names.as_slice()))
        .chain(
            model
                .plain_indexes
                .iter()
                .enumerate()
                .map(|(i, index)| (format!("plainIndexes[{i}]"), index.field_names.as_slice())),
        );

    for (label, field_names) in composite {
        let index_path = path.clone().index(&label);

        if field_names.is_empty() {
            out.push(Violation::new(
                ViolationKind::EmptyIndex,
                index_path.clone(),
                format!("{label} has no fields"),
            ));
            continue;
        }

        let mut seen = HashSet::new();
        for name in field_names {
            if !seen.insert(name.as_str()) {
                out.push(Violation::new(
                    ViolationKind::DuplicateIndexField,
                    index_path.clone().field(name),
                    format!("{label} lists field '{name}' more than once"),
                ));
            } else if !is_valid_identifier(name) {
                out.push(Violation::new(
                    ViolationKind::InvalidIdentifier,
                    index_path.clone().field(name),
                    format!("index field name '{name}' must match [a-z][a-z0-9_]*"),
                ));
            } else if !model.has_field(name) {
                out.push(Violation::new(
                    ViolationKind::UnknownIndexField,
                    index_path.clone().field(name),
                    format!(
                        "{label} references field '{name}' which does not exist on '{}'",
                        model.name
                    ),
                ));
            }
        }

        match covered.get(field_names) {
            Some(first) => out.push(Violation::new(
                ViolationKind::DuplicateIndex,
                index_path,
                format!("{label} covers the same fields as {first}"),
            )),
            None => {
                covered.insert(field_names, label);
            }
        }
    }

    let mut gin_seen: HashMap<&str, String> = HashMap::new();
    for (i, index) in model.gin_indexes.iter().enumerate() {
        let label = format!("ginIndexes[{i}]");
        let name = index.field_name.as_str();
        let index_path = path.clone().index(&label).field(name);

        if !is_valid_identifier(name) {
            out.push(Violation::new(
                ViolationKind::InvalidIdentifier,
                index_path.clone(),
                format!("index field name '{name}' must match [a-z][a-z0-9_]*"),
            ));
        } else {
            match model.plain_field(name) {
                Some(field) if field.ty.is_text() => {}
                Some(field) => out.push(Violation::new(
                    ViolationKind::InvalidGinIndex,
                    index_path.clone(),
                    format!(
                        "{label} requires a string field but '{name}' is '{}'",
                        field.ty
                    ),
                )),
                None if model.has_field(name) => out.push(Violation::new(
                    ViolationKind::InvalidGinIndex,
                    index_path.clone(),
                    format!("{label} requires a plain string field but '{name}' is a key"),
                )),
                None => out.push(Violation::new(
                    ViolationKind::UnknownIndexField,
                    index_path.clone(),
                    format!(
                        "{label} references field '{name}' which does not exist on '{}'",
                        model.name
                    ),
                )),
            }
        }

        match gin_seen.get(name) {
            Some(first) => out.push(Violation::new(
                ViolationKind::DuplicateIndex,
                index_path,
                format!("{label} covers the same field as {first}"),
            )),
            None => {
                gin_seen.insert(name, label);
            }
        }
    }
}
