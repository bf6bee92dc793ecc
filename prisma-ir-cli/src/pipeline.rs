//! Command pipelines.
//!
//! The steps behind each subcommand, free of terminal output so they can be
//! tested directly.

use std::collections::BTreeMap;

use prisma_ir::ir::{Application, Component};
use prisma_ir::render::DATASOURCE_FILENAME;
use prisma_ir::{DomainHint, Planner, Renderer, ValidatedApplication, Violations, validate};
use prisma_ir_agent::{GenerationReport, Orchestrator, Producer};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{CliError, CliResult};

/// Partition the required tables into components.
pub fn plan(tables: &[String], hints: &[DomainHint], config: &Config) -> CliResult<Vec<Component>> {
    let components = Planner::new(config.planner_options()).plan(tables, hints)?;
    info!(components = components.len(), "planned components");
    Ok(components)
}

/// Check a supplied component list against the required tables.
///
/// Without a table list the components are only checked against each other
/// (filename shape, uniqueness, no table claimed twice).
pub fn check_components(components: &[Component], tables: Option<&[String]>) -> CliResult<()> {
    match tables {
        Some(tables) => Planner::check(components, tables)?,
        None => {
            let owned: Vec<&str> = components
                .iter()
                .flat_map(|c| c.tables.iter().map(String::as_str))
                .collect();
            Planner::check(components, &owned)?
        }
    }
    Ok(())
}

/// Validate an application against its components.
pub fn check(
    application: &Application,
    components: &[Component],
) -> Result<ValidatedApplication, Violations> {
    let result = validate(application, components);
    match &result {
        Ok(_) => debug!("application accepted"),
        Err(violations) => debug!(violations = violations.len(), "application rejected"),
    }
    result
}

/// Render a validated application, adding the datasource file when enabled.
pub fn render_outputs(validated: &ValidatedApplication, config: &Config) -> BTreeMap<String, String> {
    let renderer = Renderer::new(config.render_options());
    let mut output = renderer.render(validated);
    if config.output.datasource {
        output.insert(DATASOURCE_FILENAME.to_string(), renderer.render_datasource());
    }
    output
}

/// Validate then render.
pub fn render(
    application: &Application,
    components: &[Component],
    config: &Config,
) -> CliResult<BTreeMap<String, String>> {
    let validated = check(application, components)?;
    Ok(render_outputs(&validated, config))
}

/// Run the orchestrator over every component.
pub async fn generate<P: Producer + 'static>(
    producer: P,
    components: &[Component],
    context: &str,
    config: &Config,
) -> CliResult<GenerationReport> {
    check_components(components, None)?;

    let orchestrator = Orchestrator::new(producer)
        .with_policy(config.retry_policy()?)
        .with_render_options(config.render_options());

    Ok(orchestrator.generate_all(components, context).await)
}

/// Files to write for a generation report, or why there are none.
pub fn generation_output(
    report: &GenerationReport,
    config: &Config,
) -> CliResult<BTreeMap<String, String>> {
    if let Some(violations) = &report.violations {
        return Err(CliError::Validation(violations.clone()));
    }

    match &report.application {
        Some(validated) => Ok(render_outputs(validated, config)),
        None => {
            let failed: Vec<&str> = report
                .failures()
                .map(|failure| failure.component())
                .collect();
            Err(CliError::Generation(format!(
                "{} of {} component(s) failed: {}",
                failed.len(),
                report.outcomes.len(),
                failed.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_ir::ir::{File, Model, PlainField, ScalarType};
    use prisma_ir::render::Provider;

    fn components() -> Vec<Component> {
        vec![Component::new(
            "schema-01-actors.prisma",
            "Actors",
            ["actors_users"],
        )]
    }

    fn application() -> Application {
        Application::new(vec![
            File::new("schema-01-actors.prisma", "Actors").with_model(
                Model::new("actors_users").with_plain(PlainField::new("name", ScalarType::String)),
            ),
        ])
    }

    #[test]
    fn test_plan_uses_configured_extension() {
        let mut config = Config::default();
        config.output.extension = "schema".to_string();

        let components = plan(
            &["actors_users".to_string()],
            &[DomainHint::new("Actors", ["actors_users"])],
            &config,
        )
        .unwrap();
        assert_eq!(components[0].filename, "schema-01-actors.schema");
    }

    #[test]
    fn test_plan_reports_planning_errors() {
        let result = plan(&["orders".to_string()], &[], &Config::default());
        assert!(matches!(result, Err(CliError::Planning(_))));
    }

    #[test]
    fn test_check_components_detects_double_claim() {
        let claimed = vec![
            Component::new("schema-01-sales.prisma", "Sales", ["orders"]),
            Component::new("schema-02-billing.prisma", "Billing", ["orders"]),
        ];
        assert!(check_components(&claimed, None).is_err());
        assert!(check_components(&components(), None).is_ok());
    }

    #[test]
    fn test_check_components_against_required_tables() {
        let required = vec!["actors_users".to_string(), "actors_admins".to_string()];
        let result = check_components(&components(), Some(required.as_slice()));
        assert!(matches!(result, Err(CliError::Planning(_))));
    }

    #[test]
    fn test_render_adds_datasource() {
        let output = render(&application(), &components(), &Config::default()).unwrap();
        assert_eq!(output.len(), 2);
        assert!(output[DATASOURCE_FILENAME].contains("provider   = \"postgresql\""));
        assert!(output["schema-01-actors.prisma"].contains("model actors_users {"));
    }

    #[test]
    fn test_render_without_datasource_for_sqlite() {
        let mut config = Config::default();
        config.output.datasource = false;
        config.render.provider = Provider::Sqlite;

        let output = render(&application(), &components(), &config).unwrap();
        assert_eq!(output.len(), 1);
        assert!(!output["schema-01-actors.prisma"].contains("@db.Uuid"));
    }

    #[test]
    fn test_render_rejects_invalid_application() {
        let app = Application::new(vec![File::new("schema-01-actors.prisma", "Actors")]);
        let result = render(&app, &components(), &Config::default());
        assert!(matches!(result, Err(CliError::Validation(_))));
    }
}
