#![deny(unsafe_code)]

//! turbod-locate — find, inspect and dial a repository's turbod daemon.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use turbod_config::AppConfig;
use turbod_core::paths::{DaemonPaths, check_socket_path};
use turbod_core::{EntryPointRule, HostEnvironment, RepoRoot, SystemHost, repo_hash, resolve_paths};

/// Locate the per-repository turbod daemon.
#[derive(Parser)]
#[command(name = "turbod-locate", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "turbod.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the 16-character discriminator of a repository.
    Hash {
        /// Repository root (defaults to the current directory).
        repo: Option<PathBuf>,
    },

    /// Print the socket, pid and log paths of a repository's daemon.
    Paths {
        /// Repository root (defaults to the current directory).
        repo: Option<PathBuf>,

        /// Emit JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },

    /// Print the executable a daemon would be launched through.
    EntryPoint,

    /// Dial the daemon of a repository.
    Connect {
        /// Repository root (defaults to the current directory).
        repo: Option<PathBuf>,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Hash { repo } => cmd_hash(repo)?,
        Commands::Paths { repo, json } => cmd_paths(repo, json)?,
        Commands::EntryPoint => cmd_entry_point(&config)?,
        Commands::Connect { repo } => cmd_connect(repo, &config).await?,
        Commands::Config { show } => cmd_config(&cli.config, &config, show)?,
    }

    Ok(())
}

fn cmd_hash(repo: Option<PathBuf>) -> Result<()> {
    let root = repo_root(repo)?;
    println!("{}", repo_hash(&root));
    Ok(())
}

fn cmd_paths(repo: Option<PathBuf>, json: bool) -> Result<()> {
    let root = repo_root(repo)?;
    write_paths(&SystemHost, &root, json, &mut std::io::stdout().lock())
}

/// Print the daemon paths of `root`, then fail if the socket cannot be bound.
fn write_paths(
    host: &impl HostEnvironment,
    root: &RepoRoot,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let paths = resolve_paths(host, root)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&paths)?)?;
    } else {
        write!(out, "{}", render_paths(&paths))?;
    }

    check_socket_path(&paths.socket)?;
    Ok(())
}

fn cmd_entry_point(config: &AppConfig) -> Result<()> {
    let exe = SystemHost
        .current_exe()
        .context("failed to determine the running executable")?;
    let rule = EntryPointRule::from(&config.entry_point);
    println!("{}", rule.resolve(&exe).display());
    Ok(())
}

#[cfg(unix)]
async fn cmd_connect(repo: Option<PathBuf>, config: &AppConfig) -> Result<()> {
    use tokio_util::sync::CancellationToken;
    use turbod_core::{ClientBootstrapper, ClientOptions, UnixSocketConnector};

    let root = repo_root(repo)?;
    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let boot = ClientBootstrapper::system(UnixSocketConnector)
        .with_entry_point_rule(EntryPointRule::from(&config.entry_point));
    let span = tracing::info_span!("turbod_locate");

    info!(repo = %root, "connecting to daemon");
    let conn = boot
        .connect(
            cancel,
            &root,
            &span,
            env!("CARGO_PKG_VERSION"),
            ClientOptions::from(&config.client),
        )
        .await?;

    println!("connected to {}", conn.socket_path().display());
    Ok(())
}

#[cfg(not(unix))]
async fn cmd_connect(_repo: Option<PathBuf>, _config: &AppConfig) -> Result<()> {
    anyhow::bail!("connect is only supported on unix platforms")
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

fn render_paths(paths: &DaemonPaths) -> String {
    format!(
        "hash:   {}\nsocket: {}\npid:    {}\nlog:    {}\n",
        paths.repo_hash,
        paths.socket.display(),
        paths.pid.display(),
        paths.log.display()
    )
}

fn repo_root(repo: Option<PathBuf>) -> Result<RepoRoot> {
    let path = match repo {
        Some(path) => path,
        None => std::env::current_dir().context("failed to read the current directory")?,
    };
    // `absolute` keeps trailing separators; `RepoRoot::new` cleans them.
    let absolute = std::path::absolute(&path)
        .with_context(|| format!("failed to make '{}' absolute", path.display()))?;
    Ok(RepoRoot::new(absolute)?)
}

async fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::load(path)
            .await
            .with_context(|| format!("invalid config at '{}'", path.display()))
    } else {
        Ok(AppConfig::default())
    }
}
