// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - private topics with per-user read tracking.
//!
//! This is the binary entry point. Every command acts on behalf of the user
//! passed with `--user`; authentication happens outside Parley.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod commands;
mod doctor;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parley_config::model::ParleyConfig;
use tracing::error;

/// Parley - private topics with per-user read tracking.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the private topics of a user.
    Index {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        page: Option<String>,
    },
    /// Show one page of a private topic and mark it read.
    Show {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        topic: i64,
        #[arg(long)]
        page: Option<String>,
    },
    /// Start a private topic.
    Create {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Comma-separated recipient user ids.
        #[arg(long)]
        to: String,
    },
    /// Rename a private topic.
    Update {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        topic: i64,
        #[arg(long)]
        title: String,
    },
    /// Deliver queued new-topic notifications.
    Notify,
    /// Check configuration and storage health.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.forum.log_level);

    let Some(command) = cli.command else {
        println!("parley: use --help for available commands");
        return;
    };

    if let Err(e) = run(command, &config).await {
        error!(error = %e, "command failed");
        eprintln!("parley: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &ParleyConfig) -> Result<(), parley_core::ParleyError> {
    if let Commands::Doctor { plain } = command {
        return doctor::run_doctor(config, plain).await;
    }

    let app = app::App::open(config).await?;
    let result = match command {
        Commands::Index { user, page } => commands::index(&app, user, page.as_deref()).await,
        Commands::Show { user, topic, page } => {
            commands::show(&app, user, topic, page.as_deref()).await
        }
        Commands::Create {
            user,
            title,
            content,
            to,
        } => commands::create(&app, user, title, content, to).await,
        Commands::Update { user, topic, title } => {
            commands::update(&app, user, topic, &title).await
        }
        Commands::Notify => commands::notify(&app).await,
        Commands::Doctor { .. } => Ok(()),
    };
    app.close().await?;
    result
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
