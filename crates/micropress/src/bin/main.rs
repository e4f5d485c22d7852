//! Micropress CLI

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use micropress::{
    PublishArgs, PublishEvent, ReqwestExecutor, Settings, SubmitOutcome, VaultManager, Visibility,
    Workspace, default_config_path,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Micropress - publish Obsidian notes to Micro.blog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the Obsidian vault directory
    #[arg(long, env = "MICROPRESS_VAULT_PATH")]
    vault: PathBuf,

    /// Settings file (defaults to <vault>/.micropress/settings.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// App token; overrides the settings file
    #[arg(long, env = "MICROPRESS_APP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,

    /// Enable debug logging
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Human,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a note's embedded images and replace them with links
    Upload {
        /// Note path, relative to the vault
        note: PathBuf,

        /// Delete local images after upload
        #[arg(long, action = clap::ArgAction::SetTrue)]
        delete: bool,

        /// Skip the description service and caption from filenames
        #[arg(long, action = clap::ArgAction::SetTrue)]
        no_describe: bool,
    },

    /// Publish a note as a post
    Publish {
        /// Note path, relative to the vault
        note: PathBuf,

        #[arg(long)]
        title: Option<String>,

        /// Comma-separated tags, replacing those from the note
        #[arg(long)]
        tags: Option<String>,

        /// draft or published
        #[arg(long)]
        visibility: Option<Visibility>,

        /// Destination uid
        #[arg(long)]
        blog: Option<String>,

        /// Scheduled date, e.g. "2025-04-14 10:00"
        #[arg(long)]
        schedule: Option<String>,

        /// Suggested tag to add; repeatable
        #[arg(long = "suggest")]
        suggest: Vec<String>,

        /// Rename the note to YYYY-MM-DD_slug after publishing
        #[arg(long, action = clap::ArgAction::SetTrue)]
        rename: bool,
    },

    /// Refresh the blogs available to the app token
    Destinations,

    /// Synchronize each blog's categories for tag suggestions
    Categories,
}

fn init_logging(format: LogFormat, verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };

    match format {
        LogFormat::Json => {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level));
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;
        }
        LogFormat::Human => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
                .format_timestamp_secs()
                .try_init()
                .context("Failed to initialize logger")?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_format, args.verbose)?;

    log::info!("Micropress v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&args.vault));
    let mut settings = Settings::load(&config_path)
        .await
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;
    if let Some(token) = args.token {
        settings.app_token = token;
    }

    let vault = Arc::new(VaultManager::new(&args.vault)?);
    let executor = Arc::new(ReqwestExecutor::from_settings(&settings)?);

    match args.command {
        Command::Upload {
            note,
            delete,
            no_describe,
        } => {
            settings.delete_after_upload |= delete;
            if no_describe {
                settings.use_description_service = false;
            }

            let workspace =
                Workspace::new(vault, settings, executor).with_config_path(&config_path);
            let report = workspace.upload(&note).await?;
            println!("{}", report.summary());
            for result in report.results.iter().filter(|r| r.succeeded) {
                if let Some(location) = &result.remote_location {
                    println!("  {} -> {}", result.filename, location);
                }
            }
        }

        Command::Publish {
            note,
            title,
            tags,
            visibility,
            blog,
            schedule,
            suggest,
            rename,
        } => {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let printer = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match event {
                        PublishEvent::Submitting => log::info!("Submitting..."),
                        PublishEvent::Renamed { path } => {
                            log::info!("Renamed note to {}", path.display())
                        }
                        other => log::debug!("{:?}", other),
                    }
                }
            });

            let mut workspace =
                Workspace::new(vault, settings, executor).with_config_path(&config_path);
            let publish_args = PublishArgs {
                title,
                tags,
                visibility,
                blog,
                schedule,
                suggest,
                rename,
            };
            let outcome = workspace
                .publish(&note, publish_args, Some(Arc::new(tx)))
                .await?;
            printer.await.ok();

            match outcome {
                SubmitOutcome::Published(published) => {
                    println!("Published: {}", published.url);
                    if !published.preview.is_empty() {
                        println!("Preview: {}", published.preview);
                    }
                }
                SubmitOutcome::Rejected(e) | SubmitOutcome::Failed(e) => bail!(e),
            }
        }

        Command::Destinations => {
            let mut workspace =
                Workspace::new(vault, settings, executor).with_config_path(&config_path);
            let blogs = workspace.refresh_destinations().await?;
            if blogs.is_empty() {
                println!("No destinations available for this token");
            }
            for (uid, name) in blogs {
                println!("{}\t{}", uid, name);
            }
        }

        Command::Categories => {
            let mut workspace =
                Workspace::new(vault, settings, executor).with_config_path(&config_path);
            let synced = workspace.synchronize_categories().await?;
            for (uid, categories) in synced {
                println!("{}\t{}", uid, categories.join(", "));
            }
        }
    }

    Ok(())
}
