//! Property-based tests for prisma-ir-cli.
//!
//! Properties tested:
//! - Config override precedence: CLI values win, unset values survive
//! - Dry run safety: nothing touches the disk
//! - Planned filenames carry the configured extension

use std::collections::BTreeMap;
use std::path::PathBuf;

use proptest::prelude::*;
use tempfile::TempDir;

use prisma_ir::DomainHint;
use prisma_ir::render::Provider;
use prisma_ir_cli::{
    config::{CliArgs, Config, ConfigManager},
    pipeline,
    writer::{FileStatus, SchemaWriter},
};

fn arb_provider() -> impl Strategy<Value = Provider> {
    prop_oneof![Just(Provider::Postgresql), Just(Provider::Sqlite)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_config_override_precedence(
        file_dir in "[a-z]{3,8}",
        cli_dir in "[a-z]{3,8}",
        file_provider in arb_provider(),
        cli_provider in arb_provider(),
        cli_attempts in 1u32..=32,
        file_comments in any::<bool>(),
    ) {
        let mut file_config = Config::default();
        file_config.output.dir = PathBuf::from(&file_dir);
        file_config.render.provider = file_provider;
        file_config.render.comments = file_comments;

        let cli_args = CliArgs {
            output: Some(PathBuf::from(&cli_dir)),
            provider: Some(cli_provider),
            max_attempts: Some(cli_attempts),
            ..Default::default()
        };

        let merged = ConfigManager::merge_cli_args(file_config, &cli_args);

        prop_assert_eq!(&merged.output.dir, &PathBuf::from(&cli_dir));
        prop_assert_eq!(merged.render.provider, cli_provider);
        prop_assert_eq!(merged.generation.max_attempts, cli_attempts);
        prop_assert_eq!(merged.render.comments, file_comments);
        prop_assert!(merged.retry_policy().is_ok());
    }

    #[test]
    fn prop_dry_run_safety(
        files in prop::collection::btree_map("[a-z]{3,10}", "[ -~]{0,200}", 1..6),
        nested_depth in 0usize..3,
    ) {
        let dir = TempDir::new().unwrap();
        let mut target = dir.path().to_path_buf();
        for i in 0..nested_depth {
            target = target.join(format!("dir{i}"));
        }

        let files: BTreeMap<String, String> = files
            .into_iter()
            .map(|(name, content)| (format!("{name}.prisma"), content))
            .collect();

        let report = SchemaWriter::new(&target, "prisma")
            .dry_run(true)
            .write(&files)
            .unwrap();

        prop_assert_eq!(report.files.len(), files.len());
        prop_assert!(report.files.iter().all(|f| f.status == FileStatus::Planned));
        prop_assert!(!report.touched_disk());
        prop_assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn prop_planned_filenames_use_extension(
        extension in "[a-z]{1,8}",
        namespaces in prop::collection::btree_set("[A-Z][a-z]{2,8}", 1..5),
    ) {
        let hints: Vec<DomainHint> = namespaces
            .iter()
            .map(|ns| DomainHint::new(ns.clone(), [format!("{}_items", ns.to_lowercase())]))
            .collect();
        let tables: Vec<String> = hints.iter().flat_map(|h| h.tables.clone()).collect();

        let mut config = Config::default();
        config.output.extension = extension.clone();

        let components = pipeline::plan(&tables, &hints, &config).unwrap();

        prop_assert_eq!(components.len(), hints.len());
        for component in &components {
            let suffix = format!(".{extension}");
            prop_assert!(component.filename.ends_with(&suffix));
        }
    }
}
