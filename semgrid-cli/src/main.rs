//! Semgrid CLI - text-embedding similarity workbench
//!
//! A command-line frontend for loading an embedding model, entering
//! sentences, and viewing their pairwise cosine-similarity matrix.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod config;
mod error;
mod shell;
mod table;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use semgrid::embedding::EmbeddingProvider;
use semgrid::pipeline::Pipeline;
use semgrid::providers::{Ollama, OllamaConfig, OpenAI, OpenAIConfig};
use semgrid::workbench::Workbench;

use crate::config::{AppConfig, Backend, config_path, load_config, load_config_from, save_config_to};
use crate::error::{CliError, Result};
use crate::shell::Shell;
use crate::table::render_matrix;

/// Semgrid - compare sentences by embedding similarity
#[derive(Parser)]
#[command(name = "semgrid")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "SEMGRID_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init(InitArgs),

    /// Embed sentences and print their similarity matrix
    Compare(CompareArgs),

    /// Start an interactive workbench session
    Shell(ShellArgs),

    /// Show configuration and environment status
    Status,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the init command
#[derive(Args)]
struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    force: bool,
}

/// Arguments for the compare command
#[derive(Args)]
struct CompareArgs {
    /// Sentences to compare (at least two)
    #[arg(required = true, num_args = 2..)]
    sentences: Vec<String>,

    /// Embedding model to use (overrides config)
    #[arg(short = 'M', long, env = "SEMGRID_MODEL")]
    model: Option<String>,
}

/// Arguments for the shell command
#[derive(Args)]
struct ShellArgs {
    /// Embedding model to use (overrides config)
    #[arg(short = 'M', long, env = "SEMGRID_MODEL")]
    model: Option<String>,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Edit configuration in default editor
    Edit,
    /// Validate configuration
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "semgrid_cli={level},semgrid={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init(args) => cmd_init(args).await,
        Commands::Compare(args) => cmd_compare(args, cli.config).await,
        Commands::Shell(args) => cmd_shell(args, cli.config).await,
        Commands::Status => cmd_status(cli.config).await,
        Commands::Config(args) => cmd_config(args, cli.config).await,
    }
}

/// Load the effective configuration: an explicit path must parse, the
/// default path falls back to defaults when the file is absent.
async fn load_effective_config(path: Option<PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => Ok(load_config_from(&path).await?),
        None => Ok(load_config().await?),
    }
}

/// Build the embedding provider selected by the configuration.
fn create_provider(
    config: &AppConfig,
    model_override: Option<&str>,
) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.backend {
        Backend::Ollama => {
            let mut provider_config = OllamaConfig::from_env();
            if let Some(url) = &config.provider.base_url {
                provider_config = provider_config.base_url(url);
            }
            if let Some(model) = &config.provider.model {
                provider_config = provider_config.model(model);
            }
            if let Some(secs) = config.provider.timeout_secs {
                provider_config = provider_config.timeout(secs);
            }
            if let Some(model) = model_override {
                provider_config = provider_config.model(model);
            }

            tracing::info!(model = %provider_config.model, "using Ollama backend");
            Ok(Arc::new(Ollama::new(provider_config)?))
        }
        Backend::OpenAI => {
            let api_key = config
                .provider
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .ok_or_else(|| {
                    CliError::usage(
                        "OpenAI backend needs an API key: set provider.api_key or OPENAI_API_KEY",
                    )
                })?;

            let mut provider_config = OpenAIConfig::new(api_key);
            if let Some(url) = &config.provider.base_url {
                provider_config = provider_config.with_base_url(url);
            }
            if let Some(model) = &config.provider.model {
                provider_config = provider_config.with_model(model);
            }
            if let Some(secs) = config.provider.timeout_secs {
                provider_config = provider_config.with_timeout(secs);
            }
            if let Some(model) = model_override {
                provider_config = provider_config.with_model(model);
            }

            tracing::info!(model = %provider_config.model, "using OpenAI backend");
            Ok(Arc::new(OpenAI::new(provider_config)?))
        }
    }
}

/// Initialize configuration.
async fn cmd_init(args: InitArgs) -> Result<()> {
    let config_file = config_path();

    if config_file.exists() && !args.force {
        println!("Configuration already exists at: {}", config_file.display());
        println!("Use --force to overwrite.");
        return Ok(());
    }

    save_config_to(&AppConfig::default(), &config_file).await?;

    println!("Configuration created: {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("  1. semgrid config edit");
    println!("  2. ollama pull nomic-embed-text   (or set an OpenAI API key)");
    println!("  3. semgrid shell");

    Ok(())
}

/// One-shot comparison.
async fn cmd_compare(args: CompareArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_effective_config(config_path).await?;
    let provider = create_provider(&config, args.model.as_deref())?;
    let mut workbench = Workbench::new(Pipeline::new(provider));

    println!("Loading {}...", workbench.pipeline().model());
    workbench.load().await?;
    println!(
        "Ready ({} dimensions)\n",
        workbench.pipeline().dimension().unwrap_or(0)
    );

    for (i, sentence) in args.sentences.iter().enumerate() {
        workbench.add_entry(sentence.clone());
        println!("#{} {sentence}", i + 1);
    }
    println!();

    workbench.embed_all().await?;
    let matrix = workbench.compute()?;
    print!(
        "{}",
        render_matrix(matrix, &config.display.policy(), config.display.precision)
    );

    Ok(())
}

/// Interactive session.
async fn cmd_shell(args: ShellArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_effective_config(config_path).await?;
    let provider = create_provider(&config, args.model.as_deref())?;
    let workbench = Workbench::new(Pipeline::new(provider));

    let mut shell = Shell::new(workbench, config.display.policy(), config.display.precision);
    shell.run().await
}

/// Show status.
async fn cmd_status(config_path_override: Option<PathBuf>) -> Result<()> {
    let config_file = config_path_override.unwrap_or_else(config_path);

    println!("Semgrid Status\n");

    println!("Configuration:");
    println!("  Path:   {}", config_file.display());
    println!(
        "  Exists: {}",
        if config_file.exists() { "yes" } else { "no" }
    );

    match load_config_from(&config_file).await {
        Ok(config) => {
            println!("  Valid:  yes");
            println!();
            println!("Provider:");
            println!("  Backend: {}", config.provider.backend.as_str());
            println!(
                "  Model:   {}",
                config.provider.model.as_deref().unwrap_or("(default)")
            );
            println!();
            println!("Display:");
            println!("  Accent threshold:   {}", config.display.accent_threshold);
            println!("  Emphasis threshold: {}", config.display.emphasis_threshold);
            println!("  Precision:          {}", config.display.precision);
        }
        Err(e) => {
            println!("  Valid:  no ({e})");
        }
    }

    println!();
    println!("Environment:");
    print_env_status("OLLAMA_BASE_URL");
    print_env_status("OLLAMA_EMBED_MODEL");
    print_env_status("OPENAI_API_KEY");
    print_env_status("SEMGRID_MODEL");

    Ok(())
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, config_path_override: Option<PathBuf>) -> Result<()> {
    let config_file = config_path_override.unwrap_or_else(config_path);

    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            if config_file.exists() {
                let content = tokio::fs::read_to_string(&config_file).await?;
                println!("{content}");
            } else {
                println!("Configuration file does not exist.");
                println!("Run 'semgrid init' to create one.");
            }
        }
        ConfigCommands::Edit => {
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
            std::process::Command::new(&editor)
                .arg(&config_file)
                .status()?;
        }
        ConfigCommands::Validate => {
            if !config_file.exists() {
                println!("error: configuration file does not exist");
                return Ok(());
            }

            match load_config_from(&config_file).await {
                Ok(_) => println!("Configuration is valid"),
                Err(e) => println!("error: {e}"),
            }
        }
    }

    Ok(())
}

/// Print environment variable status.
fn print_env_status(name: &str) {
    let status = if std::env::var(name).is_ok() {
        "set"
    } else {
        "-"
    };
    println!("  {name}: {status}");
}
