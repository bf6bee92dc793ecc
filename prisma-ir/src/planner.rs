//! Component planning.
//!
//! Splits the full table set into [`Component`]s, one per business domain.
//! The domain classification itself comes from outside (a [`DomainHint`]
//! list); the planner only enforces the partition rules and assigns
//! filenames in dependency order.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanningError, PlanningErrors};
use crate::ir::Component;
use crate::rules::is_valid_component_filename;

/// Default extension of generated schema files.
pub const DEFAULT_EXTENSION: &str = "prisma";

/// External classification of tables into one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainHint {
    /// Namespace label, e.g. `Actors`
    pub namespace: String,

    /// Tables belonging to the domain
    pub tables: Vec<String>,

    /// Namespaces whose tables this domain references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl DomainHint {
    /// Create a hint without dependencies.
    pub fn new<I, S>(namespace: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace: namespace.into(),
            tables: tables.into_iter().map(Into::into).collect(),
            depends_on: Vec::new(),
        }
    }

    /// Declare the namespaces this domain references.
    pub fn with_depends_on<I, S>(mut self, depends_on: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = depends_on.into_iter().map(Into::into).collect();
        self
    }
}

/// Planner options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Extension of the generated filenames, without the dot
    pub extension: String,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Partitions tables into components.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    options: PlannerOptions,
}

impl Planner {
    /// Create a planner with the given options.
    pub fn new(options: PlannerOptions) -> Self {
        Self { options }
    }

    /// Plan components from the required tables and domain hints.
    ///
    /// Components are ordered so that a domain comes after the domains it
    /// depends on (declaration order breaks ties, cycles are tolerated) and
    /// numbered from `01` in that order.
    pub fn plan<S: AsRef<str>>(
        &self,
        required: &[S],
        hints: &[DomainHint],
    ) -> Result<Vec<Component>, PlanningErrors> {
        let mut errors = Vec::new();

        let mut namespaces = HashSet::new();
        for hint in hints {
            if !namespaces.insert(hint.namespace.as_str()) {
                errors.push(PlanningError::DuplicateNamespace {
                    namespace: hint.namespace.clone(),
                });
            }
        }

        for hint in hints {
            for dependency in &hint.depends_on {
                if !namespaces.contains(dependency.as_str()) {
                    errors.push(PlanningError::UnknownDependency {
                        namespace: hint.namespace.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        errors.extend(check_partition(
            hints
                .iter()
                .map(|h| (h.namespace.as_str(), h.tables.as_slice())),
            required,
        ));

        if !errors.is_empty() {
            debug!(errors = errors.len(), "planning rejected");
        }
        PlanningErrors::into_result(errors)?;

        let components: Vec<Component> = dependency_order(hints)
            .into_iter()
            .enumerate()
            .map(|(index, hint)| {
                Component::new(
                    self.filename(index + 1, &hint.namespace),
                    hint.namespace.clone(),
                    hint.tables.iter().cloned(),
                )
            })
            .collect();

        debug!(components = components.len(), "planning accepted");
        Ok(components)
    }

    /// Verify an externally supplied component list.
    ///
    /// Applies the same partition rules as [`Planner::plan`], plus filename
    /// shape and filename uniqueness.
    pub fn check<S: AsRef<str>>(
        components: &[Component],
        required: &[S],
    ) -> Result<(), PlanningErrors> {
        let mut errors = Vec::new();

        let mut filenames = HashSet::new();
        let mut namespaces = HashSet::new();
        for component in components {
            if !is_valid_component_filename(&component.filename) {
                errors.push(PlanningError::InvalidFilename {
                    filename: component.filename.clone(),
                });
            }
            if !filenames.insert(component.filename.as_str()) {
                errors.push(PlanningError::DuplicateFilename {
                    filename: component.filename.clone(),
                });
            }
            if !namespaces.insert(component.namespace.as_str()) {
                errors.push(PlanningError::DuplicateNamespace {
                    namespace: component.namespace.clone(),
                });
            }
        }

        errors.extend(check_partition(
            components
                .iter()
                .map(|c| (c.namespace.as_str(), c.tables.as_slice())),
            required,
        ));

        PlanningErrors::into_result(errors)
    }

    /// Build `schema-{order}-{domain}.{ext}`.
    fn filename(&self, order: usize, namespace: &str) -> String {
        format!(
            "schema-{:02}-{}.{}",
            order,
            domain_slug(namespace),
            self.options.extension
        )
    }
}

/// Turn a namespace label into the `{domain}` part of a filename.
fn domain_slug(namespace: &str) -> String {
    let kebab: String = namespace
        .to_case(Case::Kebab)
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    let slug = kebab
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "domain".to_string()
    } else {
        slug
    }
}

/// Check disjointness and coverage of labelled table groups.
fn check_partition<'a, S: AsRef<str>>(
    groups: impl Iterator<Item = (&'a str, &'a [String])>,
    required: &[S],
) -> Vec<PlanningError> {
    let mut errors = Vec::new();
    let required_set: BTreeSet<&str> = required.iter().map(|s| s.as_ref()).collect();
    let mut owner: BTreeMap<&str, &str> = BTreeMap::new();

    for (label, tables) in groups {
        if tables.is_empty() {
            errors.push(PlanningError::EmptyComponent {
                component: label.to_string(),
            });
        }

        for table in tables {
            if let Some(first) = owner.get(table.as_str()) {
                errors.push(PlanningError::duplicate(table, *first, label));
                continue;
            }
            owner.insert(table.as_str(), label);
            if !required_set.contains(table.as_str()) {
                errors.push(PlanningError::unknown(label, table));
            }
        }
    }

    let mut reported = HashSet::new();
    for table in required.iter().map(|s| s.as_ref()) {
        if !owner.contains_key(table) && reported.insert(table) {
            errors.push(PlanningError::unassigned(table));
        }
    }

    errors
}

/// Order hints so that dependencies come first.
fn dependency_order(hints: &[DomainHint]) -> Vec<&DomainHint> {
    let by_namespace: HashMap<&str, &DomainHint> =
        hints.iter().map(|h| (h.namespace.as_str(), h)).collect();

    let mut result = Vec::with_capacity(hints.len());
    let mut visited = HashSet::new();
    let mut temp_visited = HashSet::new();

    for hint in hints {
        visit_hint(
            &hint.namespace,
            &by_namespace,
            &mut visited,
            &mut temp_visited,
            &mut result,
        );
    }

    result
}

/// Visit a hint for topological sort.
fn visit_hint<'a>(
    namespace: &'a str,
    by_namespace: &HashMap<&'a str, &'a DomainHint>,
    visited: &mut HashSet<&'a str>,
    temp_visited: &mut HashSet<&'a str>,
    result: &mut Vec<&'a DomainHint>,
) {
    // Cycle: the ordering is advisory, so just stop descending.
    if temp_visited.contains(namespace) || visited.contains(namespace) {
        return;
    }

    let Some(&hint) = by_namespace.get(namespace) else {
        return;
    };

    temp_visited.insert(namespace);
    for dependency in &hint.depends_on {
        visit_hint(dependency, by_namespace, visited, temp_visited, result);
    }
    temp_visited.remove(namespace);

    visited.insert(namespace);
    result.push(hint);
}
