// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # AgentStore CLI
//!
//! The `agentstore` binary is the client for the AgentStore marketplace.
//!
//! ## Modes
//!
//! - **Online** (default): commands talk to the configured backend. When it is
//!   unreachable, list views fall back to cached or empty data with a warning.
//! - **Offline** (`--offline`): commands run against an in-memory backend seeded
//!   from `spec.fallback.snapshot_path`, and changes are written back to it.
//!
//! ## Commands
//!
//! - `agentstore session login|show|logout` - Bearer token management
//! - `agentstore app ...` - Vendor listing lifecycle
//! - `agentstore review ...` - Admin approvals and deletion requests
//! - `agentstore market list|subscribe` - Public marketplace
//! - `agentstore revenue admin|vendor`, `agentstore stats` - Reporting
//! - `agentstore users|reports|notifications ...` - Administration and support
//! - `agentstore config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use agentstore_cli::commands::{
    self, AppCommand, ConfigCommand, MarketCommand, NotificationsCommand, ReportsCommand,
    RevenueCommand, ReviewCommand, SessionCommand, UsersCommand,
};
use agentstore_cli::context::{AppContext, GlobalArgs};
use agentstore_core::application::ServiceError;
use agentstore_core::domain::repository::ApiError;

/// AgentStore - marketplace for AI agents
#[derive(Parser)]
#[command(name = "agentstore")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AGENTSTORE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Backend base URL (overrides configuration)
    #[arg(long, global = true, env = "AGENTSTORE_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Run against the local snapshot instead of the backend
    #[arg(long, global = true)]
    offline: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AGENTSTORE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the stored login session
    #[command(name = "session")]
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Manage your listings (vendor)
    #[command(name = "app")]
    App {
        #[command(subcommand)]
        command: AppCommand,
    },

    /// Review listings and deletion requests (admin)
    #[command(name = "review")]
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },

    /// Browse and subscribe to agents
    #[command(name = "market")]
    Market {
        #[command(subcommand)]
        command: MarketCommand,
    },

    /// Revenue with platform/vendor split
    #[command(name = "revenue")]
    Revenue {
        #[command(subcommand)]
        command: RevenueCommand,
    },

    /// Platform dashboard counters (admin)
    #[command(name = "stats")]
    Stats,

    /// Manage users (admin)
    #[command(name = "users")]
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },

    /// Support reports
    #[command(name = "reports")]
    Reports {
        #[command(subcommand)]
        command: ReportsCommand,
    },

    /// Your notifications
    #[command(name = "notifications")]
    Notifications {
        #[command(subcommand)]
        command: NotificationsCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        report_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = match cli.command {
        Some(Commands::Config { command }) => {
            return commands::config::handle_command(command, cli.config).await;
        }
        Some(command) => command,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    };

    let ctx = AppContext::load(&GlobalArgs {
        config: cli.config,
        api_url: cli.api_url,
        offline: cli.offline,
        json: cli.json,
    })?;

    match command {
        Commands::Session { command } => commands::session::handle_command(command, &ctx).await?,
        Commands::App { command } => commands::app::handle_command(command, &ctx).await?,
        Commands::Review { command } => commands::review::handle_command(command, &ctx).await?,
        Commands::Market { command } => commands::market::handle_command(command, &ctx).await?,
        Commands::Revenue { command } => commands::revenue::handle_command(command, &ctx).await?,
        Commands::Stats => commands::stats::handle_command(&ctx).await?,
        Commands::Users { command } => commands::users::handle_command(command, &ctx).await?,
        Commands::Reports { command } => commands::reports::handle_command(command, &ctx).await?,
        Commands::Notifications { command } => {
            commands::notifications::handle_command(command, &ctx).await?
        }
        Commands::Config { .. } => unreachable!("handled before context setup"),
    }

    ctx.finish()
}

fn report_error(error: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), error);

    let unauthorized = error
        .downcast_ref::<ServiceError>()
        .is_some_and(ServiceError::is_unauthorized)
        || matches!(error.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized));
    if unauthorized {
        eprintln!(
            "{}",
            "Your session has expired. Run `agentstore session login` again.".yellow()
        );
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
