//! # prisma-ir
//!
//! CLI tool for planning, validating and rendering Prisma schemas.
//!
//! ## Usage
//!
//! ```bash
//! # Partition tables into components
//! prisma-ir plan --tables tables.json --hints hints.json --output components.json
//!
//! # Validate an application against its components
//! prisma-ir check --app app.json --components components.json
//!
//! # Validate and render to ./prisma
//! prisma-ir render --app app.json --components components.json
//!
//! # Run the generation loop over recorded candidates
//! prisma-ir generate --components components.json --candidates ./candidates
//!
//! # Initialize configuration
//! prisma-ir init
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use prisma_ir::ValidationReport;
use prisma_ir::render::Provider;
use prisma_ir_agent::GenerationReport;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use prisma_ir_cli::{
    config::{CliArgs, Config, ConfigManager},
    error::CliError,
    input, pipeline,
    writer::{self, FileStatus, SchemaWriter},
};

#[derive(Parser)]
#[command(name = "prisma-ir")]
#[command(author, version, about = "Plan, validate and render Prisma schemas", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Partition the required tables into components
    Plan {
        /// JSON array of required table names
        #[arg(short, long)]
        tables: PathBuf,

        /// JSON array of domain hints
        #[arg(long)]
        hints: PathBuf,

        /// Write the component list here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate an application against its components
    Check {
        /// Application JSON
        #[arg(short, long)]
        app: PathBuf,

        /// Component list JSON
        #[arg(long)]
        components: PathBuf,

        /// Also check the components partition these tables
        #[arg(short, long)]
        tables: Option<PathBuf>,

        /// Print the validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate an application and render Prisma schema files
    Render {
        /// Application JSON
        #[arg(short, long)]
        app: PathBuf,

        /// Component list JSON
        #[arg(long)]
        components: PathBuf,

        /// Output directory for rendered files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview output without writing files
        #[arg(long)]
        dry_run: bool,

        /// Database provider (postgresql, sqlite)
        #[arg(short, long)]
        provider: Option<Provider>,

        /// Omit documentation comments
        #[arg(long)]
        no_comments: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate every component from recorded producer candidates
    Generate {
        /// Component list JSON
        #[arg(long)]
        components: PathBuf,

        /// Directory holding one `{filename}.json` candidate per component
        #[arg(long)]
        candidates: PathBuf,

        /// Requirements text passed to the producer
        #[arg(long)]
        context: Option<PathBuf>,

        /// Output directory for rendered files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview output without writing files
        #[arg(long)]
        dry_run: bool,

        /// Attempts per component
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize a new prisma-ir configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "prisma-ir.toml")]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("prisma_ir={level},prisma_ir_cli={level},prisma_ir_agent={level}").into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Plan {
            tables,
            hints,
            output,
            config,
        } => cmd_plan(tables, hints, output, config),

        Commands::Check {
            app,
            components,
            tables,
            json,
        } => cmd_check(app, components, tables, json),

        Commands::Render {
            app,
            components,
            output,
            dry_run,
            provider,
            no_comments,
            config,
        } => {
            let args = CliArgs {
                output,
                provider,
                comments: no_comments.then_some(false),
                ..Default::default()
            };
            cmd_render(app, components, &args, dry_run, config)
        }

        Commands::Generate {
            components,
            candidates,
            context,
            output,
            dry_run,
            max_attempts,
            config,
        } => {
            let args = CliArgs {
                output,
                max_attempts,
                ..Default::default()
            };
            cmd_generate(components, candidates, context, &args, dry_run, config)
        }

        Commands::Init { output, force } => cmd_init(output, force),
    }
}

/// Plan command implementation.
fn cmd_plan(
    tables: PathBuf,
    hints: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = ConfigManager::load(config_path.as_deref())?;
    let tables = input::load_tables(&tables)?;
    let hints = input::load_hints(&hints)?;

    eprintln!(
        "{} {} table(s) across {} domain(s)...",
        "Planning".cyan(),
        tables.len(),
        hints.len()
    );

    let components = pipeline::plan(&tables, &hints, &config)?;
    let json = serde_json::to_string_pretty(&components).map_err(std::io::Error::other)?;

    match output {
        Some(path) => {
            writer::write_document(&path, &format!("{json}\n"))?;
            eprintln!(
                "{} Planned {} component(s) into {}",
                "✓".green(),
                components.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Check command implementation.
fn cmd_check(
    app: PathBuf,
    components: PathBuf,
    tables: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let application = input::load_application(&app)?;
    let components = input::load_components(&components)?;

    if let Some(tables) = tables {
        let tables = input::load_tables(&tables)?;
        pipeline::check_components(&components, Some(tables.as_slice()))?;
    }

    if !json {
        println!("{}", "Validating application...".cyan());
    }

    let result = pipeline::check(&application, &components);

    if json {
        let report = ValidationReport::from(&result);
        let text = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
        println!("{text}");
        return result.map(|_| ()).map_err(CliError::from);
    }

    match result {
        Ok(validated) => {
            println!(
                "{} {} file(s), {} model(s) valid",
                "✓".green(),
                validated.files.len(),
                validated.models().count()
            );
            Ok(())
        }
        Err(violations) => {
            println!(
                "{} {} violation(s)",
                "✗".red(),
                violations.len().to_string().red()
            );
            for violation in violations.iter() {
                println!(
                    "  {} {}\n      {}",
                    format!("[{}]", violation.kind).yellow(),
                    violation.path,
                    violation.message
                );
            }
            Err(CliError::Validation(violations))
        }
    }
}

/// Render command implementation.
fn cmd_render(
    app: PathBuf,
    components: PathBuf,
    args: &CliArgs,
    dry_run: bool,
    config_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(config_path, args)?;
    let application = input::load_application(&app)?;
    let components = input::load_components(&components)?;

    println!("{}", "Validating application...".cyan());
    let validated = pipeline::check(&application, &components)?;
    println!(
        "  {} model(s) in {} file(s)",
        validated.models().count().to_string().green(),
        validated.files.len()
    );

    println!(
        "{} ({})",
        "Rendering Prisma schema...".cyan(),
        config.render.provider
    );
    let output = pipeline::render_outputs(&validated, &config);

    write_outputs(&config, &output, dry_run)
}

/// Generate command implementation.
fn cmd_generate(
    components: PathBuf,
    candidates: PathBuf,
    context: Option<PathBuf>,
    args: &CliArgs,
    dry_run: bool,
    config_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(config_path, args)?;
    let components = input::load_components(&components)?;
    let context = input::load_context(context.as_deref())?;
    let producer = input::load_candidates(&candidates, &components)?;

    println!(
        "{} {} component(s), up to {} attempt(s) each...",
        "Generating".cyan(),
        components.len(),
        config.generation.max_attempts
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(pipeline::generate(producer, &components, &context, &config))?;

    print_outcomes(&report);
    let output = pipeline::generation_output(&report, &config)?;

    write_outputs(&config, &output, dry_run)
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        return Err(CliError::AlreadyExists { path: output });
    }

    let content = ConfigManager::default_config_content();
    std::fs::write(&output, content)?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

fn load_config(config_path: Option<PathBuf>, args: &CliArgs) -> Result<Config, CliError> {
    let config = ConfigManager::load(config_path.as_deref())?;
    let config = ConfigManager::merge_cli_args(config, args);
    ConfigManager::check(&config)?;
    Ok(config)
}

fn write_outputs(
    config: &Config,
    output: &BTreeMap<String, String>,
    dry_run: bool,
) -> Result<(), CliError> {
    let report = SchemaWriter::new(&config.output.dir, &config.output.extension)
        .dry_run(dry_run)
        .write(output)?;

    for file in &report.files {
        match file.status {
            FileStatus::Created | FileStatus::Updated => println!(
                "{} Written {} bytes to {}",
                "✓".green(),
                file.bytes,
                file.path.display()
            ),
            FileStatus::Unchanged => println!(
                "{} Unchanged {}",
                "·".dimmed(),
                file.path.display()
            ),
            FileStatus::Planned => {
                println!(
                    "{} Would write to {}:",
                    "[dry-run]".yellow(),
                    file.path.display()
                );
                println!("{}", "─".repeat(60).dimmed());
                print!("{}", output[&file.filename]);
                println!("{}", "─".repeat(60).dimmed());
            }
        }
    }

    for path in &report.stale {
        println!(
            "{} {} is not part of this schema; remove it before running prisma",
            "!".yellow(),
            path.display()
        );
    }

    Ok(())
}

fn print_outcomes(report: &GenerationReport) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(file) => println!(
                "  {} {} ({} model(s))",
                "✓".green(),
                outcome.component.filename,
                file.models.len()
            ),
            Err(error) => println!("  {} {}", "✗".red(), error),
        }
    }
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
