//! Intermediate Representation (IR) module.
//!
//! This module defines the structured, pre-text form of a database schema:
//! an [`Application`] made of [`File`]s, each holding [`Model`]s (tables).
//! The IR is assembled by producers, checked by the validator and consumed
//! by the renderer.

pub mod application;
pub mod model;
pub mod types;

pub use application::{Application, Component, File};
pub use model::{
    ForeignField, GinIndex, Model, PlainField, PlainIndex, PrimaryField, Relation, UniqueIndex,
};
pub use types::ScalarType;
