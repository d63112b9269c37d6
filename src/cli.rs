use std::{
    path::{Path, PathBuf},
    time::Duration,
};

mod draft;
mod edit;
mod form_args;
mod log;
mod status;
mod terminal;

use clap::ArgAction;
use draft::Draft;
use indicatif::ProgressBar;
use log::Log;
use logbook::Session;
use status::Status;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory the logbook is stored in
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(&self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show draft and service log totals (default)
    Status(Status),

    /// Create, list, select and edit drafts
    Draft(Draft),

    /// Submit, list, edit and delete service logs
    Log(Log),

    /// Show or modify configuration settings
    Config(Config),
}

impl Command {
    fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root),
            Self::Draft(command) => command.run(root),
            Self::Log(command) => command.run(root),
            Self::Config(command) => command.run(root),
        }
    }
}

/// Output formats shared by the listing commands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Opens the logbook in `root`, showing a spinner while it is read.
fn open_session(root: &Path) -> Session {
    let config = logbook::Config::load_or_default(root);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Loading logbook...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    let session = Session::open(root, config);
    spinner.finish_and_clear();

    session
}

#[derive(Debug, clap::Parser)]
pub struct Config {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key to set (autosave_delay_ms, storage_key)
        key: String,

        /// Value to set
        value: String,
    },
}

impl Config {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        use terminal::Colorize;

        let config_path = root.join("config.toml");
        let mut config = if config_path.exists() {
            logbook::Config::load(&config_path).map_err(|e| anyhow::anyhow!("{e}"))?
        } else {
            logbook::Config::default()
        };

        match self.command {
            ConfigCommand::Show => {
                println!("Configuration:");
                println!(
                    "  autosave_delay_ms: {} {}",
                    config.autosave_delay().as_millis(),
                    "(quiescence window before a draft is autosaved)".dim()
                );
                println!("  storage_key: {}", config.storage_key());
            }
            ConfigCommand::Set { key, value } => {
                match key.as_str() {
                    "autosave_delay_ms" => {
                        let millis = value.parse::<u64>().map_err(|_| {
                            anyhow::anyhow!("Value must be a whole number of milliseconds")
                        })?;
                        config.set_autosave_delay(Duration::from_millis(millis));
                    }
                    "storage_key" => {
                        // reject keys the file backend cannot store
                        logbook::FileStorage::new(root.to_path_buf()).path_for(&value)?;
                        config.set_storage_key(value.clone());
                    }
                    _ => anyhow::bail!(
                        "Unknown configuration key: {key}. Expected autosave_delay_ms or storage_key"
                    ),
                }

                std::fs::create_dir_all(root)?;
                config
                    .save(&config_path)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                println!("{}", format!("Set {key} = {value}").success());
            }
        }

        Ok(())
    }
}
