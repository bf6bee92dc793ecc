//! Prisma schema emitter.
//!
//! Turns the models of one file into Prisma schema text. Output layout is
//! fixed so that the same input always yields byte-identical text:
//!
//! - model header comments (description, `@namespace`, `@material`)
//! - columns: primary, then foreign, then plain, in stored order
//! - relations: forward relations in foreign-field order, then
//!   back-relations in application declaration order
//! - indexes: unique, then plain, then full-text

use crate::ir::{Application, File, ForeignField, Model};

use super::options::{Provider, RenderOptions};
use super::type_mapper::PrismaTypeMapper;

/// Primary key column assumed for relation targets outside the rendered
/// application.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Prisma schema emitter.
#[derive(Debug, Clone)]
pub struct PrismaEmitter {
    options: RenderOptions,
    type_mapper: PrismaTypeMapper,
}

impl Default for PrismaEmitter {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl PrismaEmitter {
    /// Create an emitter.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            type_mapper: PrismaTypeMapper::new(options.provider),
            options,
        }
    }

    /// Options in use.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Emit every model of a file, separated by blank lines.
    pub fn emit_file(&self, application: &Application, file: &File) -> String {
        file.models
            .iter()
            .map(|model| self.emit_model(application, file, model))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Emit one `model` block, newline terminated.
    pub fn emit_model(&self, application: &Application, file: &File, model: &Model) -> String {
        let mut lines = Vec::new();

        if self.options.comments {
            self.push_header(&mut lines, file, model);
        }
        lines.push(format!("model {} {{", model.name));

        push_section(&mut lines, "COLUMNS");
        for (i, column) in self.columns(model).into_iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.extend(column);
        }

        let relations = self.relations(application, model);
        if !relations.is_empty() {
            lines.push(String::new());
            push_section(&mut lines, "RELATIONS");
            lines.extend(relations);
        }

        let indexes = self.indexes(model);
        if !indexes.is_empty() {
            lines.push(String::new());
            lines.extend(indexes);
        }

        lines.push("}".to_string());

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Emit the `generator` and `datasource` blocks.
    pub fn emit_datasource(&self) -> String {
        match self.options.provider {
            Provider::Postgresql => concat!(
                "generator client {\n",
                "  provider        = \"prisma-client-js\"\n",
                "  previewFeatures = [\"postgresqlExtensions\"]\n",
                "}\n",
                "\n",
                "datasource db {\n",
                "  provider   = \"postgresql\"\n",
                "  url        = env(\"DATABASE_URL\")\n",
                "  extensions = [pg_trgm]\n",
                "}\n",
            )
            .to_string(),
            Provider::Sqlite => concat!(
                "generator client {\n",
                "  provider = \"prisma-client-js\"\n",
                "}\n",
                "\n",
                "datasource db {\n",
                "  provider = \"sqlite\"\n",
                "  url      = env(\"DATABASE_URL\")\n",
                "}\n",
            )
            .to_string(),
        }
    }

    // =========================================================================
    // Header
    // =========================================================================

    fn push_header(&self, lines: &mut Vec<String>, file: &File, model: &Model) {
        let description = doc_lines("", &model.description);
        if !description.is_empty() {
            lines.extend(description);
            lines.push("///".to_string());
        }
        lines.push(format!("/// @namespace {}", file.namespace));
        if model.material {
            lines.push("/// @material".to_string());
        }
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// One block of lines per column: doc comment lines then the declaration.
    fn columns(&self, model: &Model) -> Vec<Vec<String>> {
        let mut columns = Vec::new();

        let primary = &model.primary_field;
        columns.push(self.column(
            &primary.description,
            &primary.name,
            self.type_mapper
                .column_type(primary.scalar_type(), false, &["@id"]),
        ));

        for field in &model.foreign_fields {
            let attributes: &[&str] = if field.unique { &["@unique"] } else { &[] };
            columns.push(self.column(
                &field.description,
                &field.name,
                self.type_mapper
                    .column_type(field.scalar_type(), field.nullable, attributes),
            ));
        }

        for field in &model.plain_fields {
            columns.push(self.column(
                &field.description,
                &field.name,
                self.type_mapper.column_type(field.ty, field.nullable, &[]),
            ));
        }

        columns
    }

    fn column(&self, description: &str, name: &str, ty: String) -> Vec<String> {
        let mut lines = if self.options.comments {
            doc_lines("  ", description)
        } else {
            Vec::new()
        };
        lines.push(format!("  {name} {ty}"));
        lines
    }

    // =========================================================================
    // Relations
    // =========================================================================

    fn relations(&self, application: &Application, model: &Model) -> Vec<String> {
        let forward = model
            .foreign_fields
            .iter()
            .map(|field| forward_relation(application, field));

        let backward = application.models().flat_map(move |source| {
            source
                .foreign_fields
                .iter()
                .filter(move |field| field.relation.target_model == model.name)
                .map(move |field| back_relation(source, field))
        });

        forward.chain(backward).collect()
    }

    // =========================================================================
    // Indexes
    // =========================================================================

    fn indexes(&self, model: &Model) -> Vec<String> {
        let unique = model
            .unique_indexes
            .iter()
            .map(|index| format!("  @@unique([{}])", index.field_names.join(", ")));

        let plain = model
            .plain_indexes
            .iter()
            .map(|index| format!("  @@index([{}])", index.field_names.join(", ")));

        let gin = model.gin_indexes.iter().map(|index| {
            if self.options.provider.supports_gin() {
                format!(
                    "  @@index([{}(ops: raw(\"gin_trgm_ops\"))], type: Gin)",
                    index.field_name
                )
            } else {
                format!("  @@index([{}])", index.field_name)
            }
        });

        unique.chain(plain).chain(gin).collect()
    }
}

/// `  {name} {target}[?] @relation(...)` on the model holding the key.
fn forward_relation(application: &Application, field: &ForeignField) -> String {
    let relation = &field.relation;
    let references = application
        .model(&relation.target_model)
        .map(|target| target.primary_field.name.as_str())
        .unwrap_or(DEFAULT_PRIMARY_KEY);
    let label = relation
        .mapping_name
        .as_ref()
        .map(|mapping| format!("\"{mapping}\", "))
        .unwrap_or_default();

    format!(
        "  {} {}{} @relation({}fields: [{}], references: [{}], onDelete: Cascade)",
        relation.name,
        relation.target_model,
        if field.nullable { "?" } else { "" },
        label,
        field.name,
        references
    )
}

/// `  {opposite} {source}?|[]` on the referenced model.
fn back_relation(source: &Model, field: &ForeignField) -> String {
    let relation = &field.relation;
    let label = relation
        .mapping_name
        .as_ref()
        .map(|mapping| format!(" @relation(\"{mapping}\")"))
        .unwrap_or_default();

    format!(
        "  {} {}{}{}",
        relation.opposite_property(&source.name),
        source.name,
        if field.unique { "?" } else { "[]" },
        label
    )
}

fn push_section(lines: &mut Vec<String>, title: &str) {
    lines.push("  //----".to_string());
    lines.push(format!("  // {title}"));
    lines.push("  //----".to_string());
}

/// `///` lines for a free-text description. Blank descriptions yield none.
fn doc_lines(indent: &str, text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.trim()
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                format!("{indent}///")
            } else {
                format!("{indent}/// {line}")
            }
        })
        .collect()
}
