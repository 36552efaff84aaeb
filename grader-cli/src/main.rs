//! Grader CLI - Command line interface for Grader
//!
//! Reviews candidate coding assignments hosted on GitHub with a language
//! model, either as an HTTP service or one request at a time.

mod commands;
mod server;

use clap::{Parser, Subcommand};
use grader_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ReviewArgs, ServeArgs, TreeArgs};

/// Grader: language-model reviews of candidate coding assignments
#[derive(Parser, Debug)]
#[command(name = "grader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model to use (overrides config and env)
    #[arg(long, global = true, env = "GRADER_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the HTTP review service
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Review one repository and print the feedback
    #[command(visible_alias = "r")]
    Review(ReviewArgs),

    /// List the files a review of a repository would include
    Tree(TreeArgs),

    /// Show current configuration
    Config,

    /// Create a secrets file template
    InitSecrets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let bind = match &cli.command {
        Some(Commands::Serve(args)) => args.bind,
        _ => None,
    };
    let config = Config::load_with_overrides(cli.model.clone(), bind)?;

    if cli.verbose {
        tracing::info!(
            model = %config.llm.model,
            github_api = %config.github.api_base,
            ttl_secs = config.cache.ttl_secs,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("grader {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Review(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Tree(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => print_config(&config),
        Some(Commands::InitSecrets) => {
            let path = Secrets::create_template()?;
            println!("Secrets template at {}", path.display());
            println!("Fill in the GitHub token and OpenAI API key before serving.");
        }
        None => {
            println!("Grader - language-model reviews of candidate coding assignments");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("Grader Configuration");
    println!("====================");
    println!();
    println!("GitHub:");
    println!("  api_base: {}", config.github.api_base);
    println!("  timeout: {:?}", config.github.timeout);
    println!();
    println!("Review:");
    println!("  reviewable_suffixes: {}", config.review.reviewable_suffixes.join(", "));
    println!("  excluded_files: {}", config.review.excluded_files.join(", "));
    println!("  excluded_dirs: {}", config.review.excluded_dirs.join(", "));
    println!();
    println!("LLM:");
    println!("  model: {}", config.llm.model);
    println!("  api_base: {}", config.llm.api_base);
    println!("  timeout: {:?}", config.llm.timeout);
    println!("  max_attempts: {}", config.llm.retry.max_attempts);
    println!();
    println!("Cache:");
    println!("  redis_url: {}", config.cache.redis_url);
    println!("  ttl_secs: {}", config.cache.ttl_secs);
    println!();
    println!("Server:");
    println!("  bind: {}", config.server.bind);
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
