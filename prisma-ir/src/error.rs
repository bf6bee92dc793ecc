//! Error types for component planning.
//!
//! Planning failures are fatal to the planning step and are always reported
//! together, so a caller can fix every problem in one pass.

use thiserror::Error;

/// A single planning failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    /// A required table is owned by no component.
    #[error("Table '{table}' is not assigned to any component")]
    UnassignedTable { table: String },

    /// A table is claimed by more than one component.
    #[error("Table '{table}' is assigned to both '{first}' and '{second}'")]
    DuplicateAssignment {
        table: String,
        first: String,
        second: String,
    },

    /// A component claims a table that is not in the required set.
    #[error("Component '{component}' claims table '{table}' which is not required")]
    UnknownTable { component: String, table: String },

    /// A component owns no tables.
    #[error("Component '{component}' has no tables")]
    EmptyComponent { component: String },

    /// Two components share a namespace.
    #[error("Namespace '{namespace}' is declared more than once")]
    DuplicateNamespace { namespace: String },

    /// Two components share a filename.
    #[error("Filename '{filename}' is declared more than once")]
    DuplicateFilename { filename: String },

    /// A filename does not follow `schema-{order}-{domain}.{ext}`.
    #[error("Filename '{filename}' does not match 'schema-{{order}}-{{domain}}.{{ext}}'")]
    InvalidFilename { filename: String },

    /// A domain depends on a namespace no hint declares.
    #[error("Namespace '{namespace}' depends on '{dependency}' which is not declared")]
    UnknownDependency {
        namespace: String,
        dependency: String,
    },
}

impl PlanningError {
    /// Create an unassigned table error.
    pub fn unassigned(table: impl Into<String>) -> Self {
        Self::UnassignedTable {
            table: table.into(),
        }
    }

    /// Create a duplicate assignment error.
    pub fn duplicate(
        table: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateAssignment {
            table: table.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create an unknown table error.
    pub fn unknown(component: impl Into<String>, table: impl Into<String>) -> Self {
        Self::UnknownTable {
            component: component.into(),
            table: table.into(),
        }
    }
}

/// Every planning failure found in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Planning failed:\n{}", format_errors(.0))]
pub struct PlanningErrors(pub Vec<PlanningError>);

impl PlanningErrors {
    /// The individual failures.
    pub fn errors(&self) -> &[PlanningError] {
        &self.0
    }

    /// Check whether any failure matches the predicate.
    pub fn any(&self, predicate: impl Fn(&PlanningError) -> bool) -> bool {
        self.0.iter().any(predicate)
    }

    pub(crate) fn into_result(errors: Vec<PlanningError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }
}

/// Format multiple errors for display.
fn format_errors(errors: &[PlanningError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {}. {}", i + 1, e))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planning_error_display() {
        assert_eq!(
            PlanningError::unassigned("orders").to_string(),
            "Table 'orders' is not assigned to any component"
        );
        assert_eq!(
            PlanningError::duplicate("orders", "Sales", "Billing").to_string(),
            "Table 'orders' is assigned to both 'Sales' and 'Billing'"
        );
        assert_eq!(
            PlanningError::InvalidFilename {
                filename: "x.prisma".to_string()
            }
            .to_string(),
            "Filename 'x.prisma' does not match 'schema-{order}-{domain}.{ext}'"
        );
    }

    #[test]
    fn test_planning_errors_numbered() {
        let errors = PlanningErrors(vec![
            PlanningError::unassigned("a"),
            PlanningError::unassigned("b"),
        ]);
        assert_eq!(
            errors.to_string(),
            "Planning failed:\n  1. Table 'a' is not assigned to any component\n  2. Table 'b' is not assigned to any component"
        );
    }

    #[test]
    fn test_into_result() {
        assert!(PlanningErrors::into_result(Vec::new()).is_ok());
        let err = PlanningErrors::into_result(vec![PlanningError::unassigned("a")]).unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert!(err.any(|e| matches!(e, PlanningError::UnassignedTable { .. })));
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PlanningErrors>();
    }
}
