use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pdashboard::config::{CONFIG_FILE_NAME, DashboardConfig};

mod cmd;

#[derive(Parser)]
#[command(name = "pdashboard")]
#[command(version, about = "Production dashboard kiosk and page admin")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL. Overrides dashboard.toml and PDASHBOARD_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to dashboard.toml (defaults to ./dashboard.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List, reorder and enable/disable dashboard pages
    Pages {
        #[command(subcommand)]
        command: PagesCommands,
    },
    /// Check where the dashboard data comes from
    Status,
    /// Print the backend version
    Version,
    /// Serve the kiosk carousel to local displays
    Kiosk {
        /// Port to serve on (defaults to [kiosk] port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Open the kiosk in the default browser
        #[arg(long)]
        open: bool,

        /// Accept displays from other machines on the network
        #[arg(long)]
        lan: bool,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum PagesCommands {
    /// Show every page in display order
    List,
    /// Move a page to a 1-based position and save the new order
    Move {
        /// Page id
        id: i64,
        /// Target position, 1 is the first slide
        to: usize,
    },
    /// Enable or disable a page
    Toggle {
        /// Page id
        id: i64,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Create a default dashboard.toml
    Init,
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pdashboard={}", default_level)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

impl Cli {
    fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_dir()
                .context("Failed to get current directory")?
                .join(CONFIG_FILE_NAME)),
        }
    }

    /// File, then environment, then flags.
    fn load_config(&self) -> Result<DashboardConfig> {
        let path = self.config_path()?;
        let config = if path.exists() {
            DashboardConfig::load(&path)?
        } else if self.config.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        } else {
            DashboardConfig::default()
        };
        Ok(config.with_env().with_api_url(self.api_url.as_deref()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match &cli.command {
        Commands::Config { command } => {
            let path = cli.config_path()?;
            cmd::cmd_config(&path, &cli, command.clone())?;
        }
        Commands::Pages { command } => {
            let config = cli.load_config()?;
            cmd::cmd_pages(config, command.clone()).await?;
        }
        Commands::Status => {
            let config = cli.load_config()?;
            cmd::cmd_status(config).await?;
        }
        Commands::Version => {
            let config = cli.load_config()?;
            cmd::cmd_version(config).await?;
        }
        Commands::Kiosk { port, open, lan } => {
            let config = cli.load_config()?;
            cmd::cmd_kiosk(config, *port, *open, *lan).await?;
        }
    }

    Ok(())
}
