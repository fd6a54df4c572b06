//! license-normalizer: normalize free-form license expressions into SPDX.

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use license_normalizer::{
    cli::{self, exit_codes},
    config::{self, ConfigOverrides, NormalizerConfig, OutputFormat, Validatable},
    model::ValidationMode,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "license-normalizer")]
#[command(version)]
#[command(about = "Normalize license expressions into canonical SPDX expressions", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Every query succeeded
    1  At least one query failed (unknown name, parse or validation failure)
    3  Error occurred

EXAMPLES:
    # Normalize a single expression
    license-normalizer normalize \"GPLv2+ || BSD3\"

    # Require plain SPDX identifiers, JSON output
    license-normalizer normalize --validate spdx -o json \"Apache 2.0 and MIT\"

    # Map onto the compatibility matrix
    license-normalizer compat x11-keith-packard

    # Normalize one expression per line from stdin
    cut -f3 scan.tsv | license-normalizer normalize")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory with license definition files (default: bundled definitions)
    #[arg(long, global = true, env = "LICENSE_NORMALIZER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// OSADL compatibility matrix JSON file (default: bundled matrix)
    #[arg(long, global = true, env = "LICENSE_NORMALIZER_MATRIX")]
    matrix: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Indent JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Write output to a file instead of stdout
    #[arg(long, global = true)]
    output_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by `normalize` and `compat`
#[derive(Args)]
struct QueryArgs {
    /// License expressions; read one per line from stdin when omitted
    expressions: Vec<String>,

    /// Validation modes to apply (comma-separated)
    #[arg(long = "validate", value_enum, value_delimiter = ',')]
    validations: Vec<ValidationMode>,

    /// Keep "-or-later" licenses as they are
    #[arg(long)]
    no_dual: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize license expressions
    Normalize(QueryArgs),

    /// Normalize and map onto the compatibility matrix
    Compat(QueryArgs),

    /// Resolve single license names or operators
    Identify {
        /// Names to resolve
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List canonical license and compound ids
    Licenses,

    /// List aliases
    Aliases {
        /// Only aliases of ids containing this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// List operator spellings
    Operators,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .license-normalizer.yaml in the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = if cli::is_query_error(&err) {
                exit_codes::QUERY_FAILED
            } else {
                exit_codes::ERROR
            };
            std::process::exit(code);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let mut overrides = ConfigOverrides {
        data_dir: cli.data_dir,
        matrix_file: cli.matrix,
        format: cli.output,
        pretty: cli.pretty,
        output_file: cli.output_file,
        ..ConfigOverrides::default()
    };
    if let Commands::Normalize(args) | Commands::Compat(args) = &cli.command {
        overrides.no_dual = args.no_dual;
        overrides.validations.clone_from(&args.validations);
    }

    let (config, loaded_from) =
        NormalizerConfig::from_file_with_overrides(cli.config.as_deref(), &overrides);
    if let Some(path) = &loaded_from {
        tracing::debug!("Using config file {}", path.display());
    }
    config.ensure_valid()?;

    // Dispatch to command handlers
    match cli.command {
        Commands::Normalize(args) => {
            let expressions = cli::collect_expressions(args.expressions)?;
            cli::run_normalize(&config, &expressions)
        }
        Commands::Compat(args) => {
            let expressions = cli::collect_expressions(args.expressions)?;
            cli::run_compat(&config, &expressions)
        }
        Commands::Identify { names } => cli::run_identify(&config, &names),
        Commands::Licenses => cli::run_licenses(&config).map(|()| exit_codes::SUCCESS),
        Commands::Aliases { filter } => {
            cli::run_aliases(&config, filter.as_deref()).map(|()| exit_codes::SUCCESS)
        }
        Commands::Operators => cli::run_operators(&config).map(|()| exit_codes::SUCCESS),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "license-normalizer", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { file } => {
            let schema = config::generate_json_schema().context("failed to generate schema")?;
            match file {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Path => {
                eprintln!("Config file search paths (in order):");
                for path in config::file::search_paths() {
                    eprintln!("  {}", path.display());
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in config::file::CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".license-normalizer.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                std::fs::write(&target, config::generate_full_example_config())
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}
