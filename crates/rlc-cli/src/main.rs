use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::debug;

use rlc_builder::{Emitters, FallbackCoordinator, RetryPolicy, validate_prerequisites};
use rlc_core::GeneratedFile;
use rlc_core::config::{self, CONFIG_FILE_NAME, EmissionOptions, FeatureFlags, RlcConfig};
use rlc_core::descriptors::build_operation_descriptors;
use rlc_core::model::{self, ServiceModel};

#[derive(Parser)]
#[command(name = "rlc", about = "TypeScript REST client generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a client package from a service model
    Generate {
        /// Path to the service model (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force the declarative path on for every target
        #[arg(long, conflicts_with = "baseline")]
        declarative: bool,

        /// Force the baseline generator for every target
        #[arg(long)]
        baseline: bool,
    },

    /// Check that the declarative and baseline paths produce equivalent output
    Validate {
        /// Service model files to check
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect the descriptors and resolved flags for a service model
    Inspect {
        /// Path to the service model
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new rlc configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            declarative,
            baseline,
        } => cmd_generate(input, output, forced_emission(declarative, baseline)),

        Commands::Validate { inputs, json } => cmd_validate(&inputs, json),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "rlc", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn forced_emission(declarative: bool, baseline: bool) -> EmissionOptions {
    if declarative {
        EmissionOptions::forced(true)
    } else if baseline {
        EmissionOptions::forced(false)
    } else {
        EmissionOptions::default()
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<RlcConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_model(path: &Path) -> Result<ServiceModel> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let model = match ext {
        "json" => model::from_json(&content),
        _ => model::from_yaml(&content),
    }
    .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(model)
}

/// Flags for `model`: CLI overrides, then the config file, then the model's own options.
fn resolve_flags(model: &ServiceModel, cfg: &RlcConfig, cli: EmissionOptions) -> FeatureFlags {
    resolve_flags_with(model, cfg, cli, |key| std::env::var(key).ok())
}

/// [`resolve_flags`] with an explicit environment lookup.
fn resolve_flags_with<F>(
    model: &ServiceModel,
    cfg: &RlcConfig,
    cli: EmissionOptions,
    env: F,
) -> FeatureFlags
where
    F: Fn(&str) -> Option<String>,
{
    let options = model.options.emission.overlay(cfg.emission).overlay(cli);
    let flags = FeatureFlags::resolve_with(&options, env);
    debug!("resolved feature flags: {flags:?}");
    flags
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Generate the "do not edit" README.
fn readme_content() -> &'static str {
    r#"# Generated Code - Do Not Edit

This directory is **auto-generated** by rlc.
Any manual changes will be overwritten the next time `rlc generate` is run.

To regenerate, run:
```
rlc generate
```

To choose between the declarative and baseline emitters, edit `.rlc.yaml`.
"#
}

fn cmd_generate(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    cli_emission: EmissionOptions,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output_dir = output.unwrap_or_else(|| PathBuf::from(&cfg.output));
    let model = load_model(&input)?;

    let flags = resolve_flags(&model, &cfg, cli_emission);
    let emitters = Emitters::new().context("failed to initialise emitters")?;
    let coordinator = FallbackCoordinator::new(RetryPolicy::from(cfg.retry));
    let mut integration = emitters.integration(model, flags, &coordinator);

    eprintln!(
        "Generating {} → {}",
        integration.context().client_name(),
        output_dir.display()
    );
    let package = integration.build_complete_package()?;

    fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;
    let report = package.report();
    write_files(&output_dir, &package.into_files())?;
    for record in &report {
        eprintln!(
            "  wrote {} ({}, {} attempt(s))",
            output_dir.join(&record.path).display(),
            record.via,
            record.attempts
        );
    }

    let readme_path = output_dir.join("README.md");
    fs::write(&readme_path, readme_content())
        .with_context(|| format!("failed to write {}", readme_path.display()))?;
    eprintln!("  wrote {}", readme_path.display());

    let stats = coordinator.statistics();
    if stats.total_errors > 0 {
        eprintln!(
            "Declarative path failed {} time(s); affected files came from the baseline:",
            stats.total_errors
        );
        for (context, count) in stats.errors_by_context.iter().filter(|(_, c)| **c > 0) {
            eprintln!("  {context}: {count}");
        }
    }

    eprintln!(
        "Generated {} files in {}",
        report.len() + 1, // +1 for README
        output_dir.display()
    );
    Ok(())
}

fn cmd_validate(inputs: &[PathBuf], json: bool) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let models = inputs
        .iter()
        .map(|path| Ok((path.display().to_string(), load_model(path)?)))
        .collect::<Result<Vec<_>>>()?;

    let emitters = Emitters::new().context("failed to initialise emitters")?;
    let validator = emitters
        .validator()
        .with_policy(RetryPolicy::from(cfg.retry));
    let summary = validator.validate_all(models.iter().map(|(name, m)| (name.as_str(), m)));

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for result in &summary.results {
            let status = if result.passed { "ok" } else { "FAILED" };
            eprintln!("{} ... {}", result.test_name, status);
            if let Some(error) = &result.error {
                eprintln!("  error: {error}");
            }
            for difference in &result.differences {
                eprintln!("  {difference}");
            }
        }
        eprintln!(
            "{} passed, {} failed of {}",
            summary.passed_tests, summary.failed_tests, summary.total_tests
        );
    }

    if !summary.overall_success {
        anyhow::bail!("declarative and baseline outputs differ");
    }
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let model = load_model(&input)?;
    let summary = build_inspect_summary(&model, &cfg)?;

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(model: &ServiceModel, cfg: &RlcConfig) -> Result<serde_json::Value> {
    let operations: Vec<serde_json::Value> = build_operation_descriptors(model)?
        .iter()
        .map(|op| {
            serde_json::json!({
                "name": op.name,
                "method": op.method.as_str(),
                "path": op.path,
                "group": op.group,
                "kind": op.kind().as_str(),
                "returnType": op.return_type(),
                "parameters": op.parameters.iter().map(|p| p.signature()).collect::<Vec<_>>(),
            })
        })
        .collect();

    Ok(serde_json::json!({
        "client": model.client_name(),
        "srcPath": model.src_path,
        "flags": resolve_flags(model, cfg, EmissionOptions::default()),
        "prerequisites": validate_prerequisites(model),
        "operations": operations,
    }))
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
options: { title: Widgets, clientClass: false }
paths:
  /status:
    name: Status
    operations:
      - name: getStatus
        method: GET
        response: { type: Status }
"#;

    #[test]
    fn test_load_model_by_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let yaml = tmp.path().join("model.yaml");
        fs::write(&yaml, MODEL).unwrap();
        assert_eq!(load_model(&yaml).unwrap().client_name(), "Widgets");

        let json = tmp.path().join("model.json");
        fs::write(&json, r#"{"options":{"title":"Gadgets"},"paths":{}}"#).unwrap();
        assert_eq!(load_model(&json).unwrap().client_name(), "Gadgets");

        let broken = tmp.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        assert!(load_model(&broken).is_err());
    }

    #[test]
    fn test_write_files_creates_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let files = vec![GeneratedFile {
            path: "src/api/getStatus.ts".into(),
            content: "export {};\n".into(),
        }];
        write_files(tmp.path(), &files).unwrap();
        let written = fs::read_to_string(tmp.path().join("src/api/getStatus.ts")).unwrap();
        assert_eq!(written, "export {};\n");
    }

    #[test]
    fn test_flag_precedence() {
        let model = model::from_yaml(MODEL).unwrap();
        let cfg = RlcConfig {
            emission: EmissionOptions {
                use_alloy_code_generation: Some(true),
                ..EmissionOptions::default()
            },
            ..RlcConfig::default()
        };

        let no_env = |_: &str| None;
        let flags = resolve_flags_with(&model, &cfg, EmissionOptions::default(), no_env);
        assert!(flags.code_generation);
        assert!(!flags.client_class);
        assert!(!flags.package_json);

        let flags = resolve_flags_with(&model, &cfg, forced_emission(false, true), no_env);
        assert_eq!(flags, FeatureFlags::all(false));
    }

    #[test]
    fn test_environment_fills_unset_flags_only() {
        let model = model::from_yaml(MODEL).unwrap();
        let env = |key: &str| {
            matches!(key, config::ENV_PACKAGE_JSON | config::ENV_CLIENT_CLASS)
                .then(|| "true".to_string())
        };

        let cfg = RlcConfig::default();
        let flags = resolve_flags_with(&model, &cfg, EmissionOptions::default(), env);
        assert!(flags.package_json);
        // The model turns the client class off explicitly.
        assert!(!flags.client_class);
        assert!(!flags.code_generation);

        let flags = resolve_flags_with(&model, &cfg, forced_emission(false, true), env);
        assert_eq!(flags, FeatureFlags::all(false));
    }

    #[test]
    fn test_inspect_summary() {
        let model = model::from_yaml(MODEL).unwrap();
        let summary = build_inspect_summary(&model, &RlcConfig::default()).unwrap();
        assert_eq!(summary["client"], "Widgets");
        assert_eq!(summary["operations"][0]["kind"], "plain");
        assert_eq!(summary["prerequisites"]["isValid"], true);
    }
}
