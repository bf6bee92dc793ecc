//! Prisma schema rendering.
//!
//! Rendering only accepts a [`ValidatedApplication`], so it has no error
//! path: every value reaching it already satisfies the structural rules.
//!
//! # Components
//!
//! - [`Renderer`] - renders a whole application, one text per file
//! - [`PrismaEmitter`] - emits `model` blocks and the datasource header
//! - [`PrismaTypeMapper`] - maps scalar types to Prisma column types

pub mod emitter;
pub mod options;
pub mod type_mapper;

use std::collections::BTreeMap;

use tracing::debug;

use crate::validator::ValidatedApplication;

pub use emitter::{DEFAULT_PRIMARY_KEY, PrismaEmitter};
pub use options::{Provider, RenderOptions, UnknownProvider};
pub use type_mapper::PrismaTypeMapper;

/// Filename of the generator/datasource header.
pub const DATASOURCE_FILENAME: &str = "main.prisma";

/// Renders validated applications to Prisma schema text.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    emitter: PrismaEmitter,
}

impl Renderer {
    /// Create a renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            emitter: PrismaEmitter::new(options),
        }
    }

    /// Options in use.
    pub fn options(&self) -> &RenderOptions {
        self.emitter.options()
    }

    /// Render every file, keyed by filename.
    pub fn render(&self, validated: &ValidatedApplication) -> BTreeMap<String, String> {
        let application = validated.application();
        debug!(files = application.files.len(), "rendering application");

        let output: BTreeMap<String, String> = application
            .files
            .iter()
            .map(|file| {
                (
                    file.filename.clone(),
                    self.emitter.emit_file(application, file),
                )
            })
            .collect();

        debug!(files = output.len(), "rendered application");
        output
    }

    /// Render a single file of the application.
    pub fn render_file(&self, validated: &ValidatedApplication, filename: &str) -> Option<String> {
        let application = validated.application();
        application
            .file(filename)
            .map(|file| self.emitter.emit_file(application, file))
    }

    /// Render the generator/datasource header.
    pub fn render_datasource(&self) -> String {
        self.emitter.emit_datasource()
    }
}

/// Render with default options.
pub fn render(validated: &ValidatedApplication) -> BTreeMap<String, String> {
    Renderer::default().render(validated)
}

/// Render the generator/datasource header for the given options.
pub fn render_datasource(options: &RenderOptions) -> String {
    Renderer::new(options.clone()).render_datasource()
}
