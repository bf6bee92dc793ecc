//! Property-based tests for prisma-ir.
//!
//! Properties tested:
//! - Property 1: Planned components are disjoint and cover the required tables
//! - Property 2: Rendering a validated application is deterministic
//! - Property 3: Removing a relation target yields a dangling relation per reference
//! - Property 4: Duplicate column names are always rejected

use std::collections::BTreeSet;

use proptest::prelude::*;

use prisma_ir::ir::{
    Application, Component, File, ForeignField, Model, PlainField, Relation, ScalarType,
};
use prisma_ir::{DomainHint, Planner, ViolationKind, render, validate};

// =============================================================================
// Generators
// =============================================================================

/// Distinct table names.
fn arb_table_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("t_[a-z][a-z0-9_]{0,10}", 1..12)
        .prop_map(|names| names.into_iter().collect())
}

/// Distinct column names for one model.
fn arb_column_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("c_[a-z][a-z0-9]{0,8}", 0..6)
        .prop_map(|names| names.into_iter().collect())
}

fn arb_scalar() -> impl Strategy<Value = ScalarType> {
    prop::sample::select(ScalarType::ALL.to_vec())
}

/// Tables with a domain index for each.
fn arb_partition() -> impl Strategy<Value = (Vec<String>, Vec<usize>)> {
    (arb_table_names(), 1usize..5).prop_flat_map(|(tables, domains)| {
        let n = tables.len();
        (Just(tables), prop::collection::vec(0..domains, n))
    })
}

/// A valid single-component application. When `link` is set every model
/// after the first references the first.
fn arb_application() -> impl Strategy<Value = (Vec<Component>, Application)> {
    (
        arb_table_names(),
        prop::collection::vec((arb_column_names(), arb_scalar()), 12),
        any::<bool>(),
    )
        .prop_map(|(tables, columns, link)| build_application(&tables, &columns, link))
}

fn build_application(
    tables: &[String],
    columns: &[(Vec<String>, ScalarType)],
    link: bool,
) -> (Vec<Component>, Application) {
    let component = Component::new("schema-01-core.prisma", "Core", tables.iter().cloned());

    let models = tables.iter().enumerate().map(|(i, table)| {
        let (names, ty) = &columns[i % columns.len()];
        let mut model = Model::new(table.clone());
        for name in names {
            model = model.with_plain(PlainField::new(name.clone(), *ty));
        }
        if link && i > 0 {
            model = model.with_foreign(ForeignField::new(
                "ref_id",
                Relation::new("reference", tables[0].clone()),
            ));
        }
        model
    });

    let mut file = File::for_component(&component);
    for model in models {
        file = file.with_model(model);
    }

    (vec![component], Application::new(vec![file]))
}

// =============================================================================
// Property 1: Partition
// =============================================================================

proptest! {
    #[test]
    fn prop_planned_components_partition_tables((tables, assignment) in arb_partition()) {
        let domains: BTreeSet<usize> = assignment.iter().copied().collect();
        let hints: Vec<DomainHint> = domains
            .iter()
            .map(|d| {
                let owned = tables
                    .iter()
                    .zip(&assignment)
                    .filter(|(_, a)| *a == d)
                    .map(|(t, _)| t.clone());
                DomainHint::new(format!("Domain{d}"), owned)
            })
            .collect();

        let components = Planner::default().plan(&tables, &hints).unwrap();
        prop_assert_eq!(components.len(), hints.len());

        let mut seen = BTreeSet::new();
        for component in &components {
            for table in &component.tables {
                prop_assert!(seen.insert(table.clone()), "table {} owned twice", table);
            }
        }
        let required: BTreeSet<String> = tables.iter().cloned().collect();
        prop_assert_eq!(seen, required);

        prop_assert!(Planner::check(&components, &tables).is_ok());
    }

    #[test]
    fn prop_double_claim_always_rejected(tables in arb_table_names()) {
        let hints = vec![
            DomainHint::new("First", tables.iter().cloned()),
            DomainHint::new("Second", [tables[0].clone()]),
        ];
        prop_assert!(Planner::default().plan(&tables, &hints).is_err());
    }
}

// =============================================================================
// Property 2: Determinism
// =============================================================================

proptest! {
    #[test]
    fn prop_render_is_deterministic((components, app) in arb_application()) {
        let validated = validate(&app, &components).unwrap();
        let first = render(&validated);
        let second = render(&validate(&app, &components).unwrap());
        prop_assert_eq!(&first, &second);

        let text = &first["schema-01-core.prisma"];
        for table in &components[0].tables {
            let header = format!("model {} {{", table);
            prop_assert!(text.contains(&header));
        }
    }
}

// =============================================================================
// Property 3: Referential integrity
// =============================================================================

proptest! {
    #[test]
    fn prop_removed_target_dangles(
        tables in arb_table_names().prop_filter("need a source", |t| t.len() > 1),
        columns in prop::collection::vec((arb_column_names(), arb_scalar()), 12),
    ) {
        let (components, mut app) = build_application(&tables, &columns, true);
        prop_assert!(validate(&app, &components).is_ok());

        app.files[0].models.remove(0);
        let violations = validate(&app, &components).unwrap_err();
        let dangling: Vec<_> = violations.of_kind(ViolationKind::DanglingRelation).collect();

        prop_assert_eq!(dangling.len(), tables.len() - 1);
        for violation in dangling {
            prop_assert_eq!(violation.path.field.as_deref(), Some("ref_id"));
        }
    }
}

// =============================================================================
// Property 4: Duplicate columns
// =============================================================================

proptest! {
    #[test]
    fn prop_duplicate_column_rejected(
        (components, mut app) in arb_application(),
        name in "c_[a-z]{1,6}",
        ty in arb_scalar(),
    ) {
        let model = &mut app.files[0].models[0];
        model.plain_fields.push(PlainField::new(name.clone(), ty));
        model.plain_fields.push(PlainField::new(name, ty));

        let violations = validate(&app, &components).unwrap_err();
        prop_assert!(violations.contains_kind(ViolationKind::DuplicateField));
    }
}
