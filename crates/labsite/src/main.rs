//! labsite CLI - static website generator for research groups.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "labsite")]
#[command(about = "Static website generator for research groups and organizations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create site.toml, data files and a template in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build the site once
    Build {
        /// Output directory (defaults to config or "_build")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build, then rebuild on change while serving with live reload
    Serve {
        /// Port to listen on (defaults to config or 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Build and push the output to the hosting branch
    Deploy {
        /// Git remote URL (defaults to config)
        #[arg(short, long)]
        remote: Option<String>,

        /// Branch to push (defaults to config or "gh-pages")
        #[arg(short, long)]
        branch: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(yes).await?;
        }
        Commands::Build { output } => {
            commands::build::run(&cli.config, output).await?;
        }
        Commands::Serve { port, no_open } => {
            commands::serve::run(&cli.config, port, !no_open).await?;
        }
        Commands::Deploy { remote, branch } => {
            commands::deploy::run(&cli.config, remote, branch).await?;
        }
    }

    Ok(())
}
