use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use api_ingress::{ApiIngress, ApiIngressConfig};
use users_info::{config::UsersInfoConfig, UsersInfo};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Users Server - in-memory user records over HTTP
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - in-memory user records over HTTP")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

/// Typed module sections pulled out of the `modules` bag.
struct ModulesConfig {
    api_ingress: ApiIngressConfig,
    users_info: UsersInfoConfig,
}

impl ModulesConfig {
    fn from_app(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            api_ingress: config.module_config("api_ingress")?,
            users_info: config.module_config("users_info")?,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (home_dir is resolved inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Print config and exit if requested
    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Initialize logging
    let logging_config = config
        .logging
        .clone()
        .unwrap_or_else(runtime::config::default_logging_config);
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Users Server starting");

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");
    let modules = ModulesConfig::from_app(&config)?;

    let users = UsersInfo::new(modules.users_info);
    let ingress = ApiIngress::new(modules.api_ingress);
    let router = ingress.build_router(users.router(), Some(users.openapi()))?;

    let addr = resolve_bind_addr(&config.server.bind_addr()).await?;

    let cancel = CancellationToken::new();
    let signals = modkit::cancel_on_shutdown(cancel.clone());

    let served = ingress.serve(router, addr, cancel.clone()).await;

    // Stop the signal watcher whether the server exited cleanly or not
    cancel.cancel();
    if let Err(e) = signals.await {
        tracing::warn!(error = %e, "shutdown watcher ended abnormally");
    }

    match &served {
        Ok(()) => tracing::info!("Users Server stopped"),
        Err(e) => tracing::error!(error = %e, "Users Server failed"),
    }
    served
}

async fn resolve_bind_addr(raw: &str) -> Result<SocketAddr> {
    tokio::net::lookup_host(raw)
        .await
        .with_context(|| format!("Invalid bind address '{raw}'"))?
        .next()
        .with_context(|| format!("Bind address '{raw}' resolved to nothing"))
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    ModulesConfig::from_app(&config)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
