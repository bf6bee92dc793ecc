//! # prisma-ir
//!
//! A typed intermediate representation for relational database schemas,
//! with the pieces needed to build one safely from untrusted producers:
//!
//! - [`ir`] - applications, files, models, fields, indexes
//! - [`planner`] - partitions the required tables into components
//! - [`validator`] - re-checks every structural rule, collecting all violations
//! - [`render`] - turns a validated application into Prisma schema text
//!
//! The crate performs no I/O. Only a [`ValidatedApplication`] can be
//! rendered, so rendering is a total function.
//!
//! ## Usage
//!
//! ```rust
//! use prisma_ir::ir::{Application, Component, File, Model, PlainField, ScalarType};
//! use prisma_ir::{render, validate};
//!
//! let components = vec![Component::new(
//!     "schema-01-actors.prisma",
//!     "Actors",
//!     ["actors_users"],
//! )];
//! let app = Application::new(vec![
//!     File::new("schema-01-actors.prisma", "Actors").with_model(
//!         Model::new("actors_users").with_plain(PlainField::new("name", ScalarType::String)),
//!     ),
//! ]);
//!
//! let validated = validate(&app, &components).expect("valid application");
//! let output = render(&validated);
//! assert!(output["schema-01-actors.prisma"].contains("model actors_users {"));
//! ```

pub mod error;
pub mod ir;
pub mod planner;
pub mod render;
pub mod rules;
pub mod validator;

pub use error::{PlanningError, PlanningErrors};
pub use planner::{DomainHint, Planner, PlannerOptions};
pub use render::{RenderOptions, Renderer, render, render_datasource};
pub use validator::{
    ValidatedApplication, ValidationReport, Validator, Violation, ViolationKind, ViolationPath,
    Violations, validate,
};
