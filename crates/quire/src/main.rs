//! quire CLI - static site generator for a personal Markdown blog.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Static site generator for a personal Markdown blog")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to blog.toml config file
    #[arg(short, long, default_value = "blog.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new blog in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Start development server with live reload
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Build the static site
    Build {
        /// Output directory (defaults to config or "public")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip CSS minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Preview the built site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = "public")]
        dir: PathBuf,
    },
}

impl Commands {
    /// Dispatch to the command implementation.
    async fn run(self, config: &Path) -> Result<()> {
        match self {
            Self::Init { yes } => commands::init::run(Path::new("."), config, yes).await,
            Self::Dev { port, no_open } => commands::dev::run(config, port, !no_open).await,
            Self::Build { output, no_minify } => {
                // Only an explicit flag overrides `[build] minify`
                let minify = no_minify.then_some(false);
                commands::build::run(config, output, minify).await
            }
            Self::Serve { port, dir } => commands::serve::run(port, dir).await,
        }
    }
}

/// Log to stderr at `info`, or `debug` with `--verbose`. `RUST_LOG`
/// takes precedence when set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    cli.command.run(&cli.config).await
}
