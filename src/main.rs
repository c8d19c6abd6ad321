use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use impose::compose::{ComposeDocument, OutputTarget};
use impose::config::{Config, DEFAULT_COMPOSE_FILE, RegistryConfig};
use impose::version::registries::DockerHubRegistry;
use impose::version::selector::TagDenylist;

const LONG_ABOUT: &str = "Image version updater for Docker Compose.
Scans the given Docker Compose file for image versions and updates them.

Head or inline comments on the image key act as annotations:
  impose:ignore     ignores the image for updates
  impose:minor      only checks for minor version updates
  impose:patch      only checks for patch version updates
  impose:warnMajor  warns if the major version has changed
  impose:warnMinor  warns if the minor version has changed (including major changes)
  impose:warnPatch  warns if the patch version has changed (including major and minor changes)
  impose:warnAll    warns if the version string has changed in any way (including suffix)";

#[derive(Parser)]
#[command(name = "impose")]
#[command(version, about = "Image version updater for Docker Compose", long_about = LONG_ABOUT)]
struct Cli {
    /// Compose file
    #[arg(short, long, global = true, default_value = DEFAULT_COMPOSE_FILE)]
    file: PathBuf,

    /// Output file (default is the input file, "-" writes to stdout)
    #[arg(short, long, global = true)]
    out: Option<String>,

    /// Configuration file (default: $XDG_CONFIG_HOME/impose/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Registry API base URL
    #[arg(long, global = true, env = "IMPOSE_REGISTRY")]
    registry: Option<String>,

    /// Registry user
    #[arg(long, global = true, env = "IMPOSE_REGISTRY_USER")]
    user: Option<String>,

    /// Registry password
    #[arg(long, global = true, env = "IMPOSE_REGISTRY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Update image versions
    Update,
    /// Format the compose file the way an update would, without changing versions
    Format,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref(), cli.log_json)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

fn init_logging(
    verbose: u8,
    log_file: Option<&Path>,
    json: bool,
) -> anyhow::Result<WorkerGuard> {
    let default_level = match verbose {
        0 => "impose=warn",
        1 => "impose=info",
        _ => "impose=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (writer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.with_ansi(log_file.is_none()).init();
    }

    Ok(guard)
}

/// Merge CLI/env overrides into the registry section of the config file
fn registry_config(cli: &Cli, mut config: RegistryConfig) -> RegistryConfig {
    if let Some(url) = &cli.registry {
        config.url = url.clone();
    }
    if let Some(user) = &cli.user {
        config.username = Some(user.clone());
    }
    if let Some(password) = &cli.password {
        config.password = Some(password.clone());
    }
    config
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let mut document = ComposeDocument::load(&cli.file)
        .with_context(|| format!("Failed to load {}", cli.file.display()))?;
    let target = OutputTarget::from_arg(cli.out.as_deref());

    match cli.command {
        Command::Format => {
            document.write(&target)?;
        }
        Command::Update => {
            let registry = DockerHubRegistry::from_config(&registry_config(&cli, config.registry));
            let denylist = TagDenylist::default().extend(config.deny_tags);

            info!(
                "Updating {} services in {}",
                document.services().len(),
                cli.file.display()
            );
            document
                .update_versions(&registry, &denylist)
                .await
                .context("Failed to update image versions")?;
            document.write(&target)?;

            let summary = document.summary();
            if target == OutputTarget::Stdout {
                eprint!("{}", summary);
            } else {
                print!("{}", summary);
            }
        }
    }

    Ok(())
}
