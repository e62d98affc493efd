#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use light_sync::blacklist::BlacklistTracker;
use light_sync::config::Settings;
use light_sync::constants;
use light_sync::event_handler::EventDispatcher;
use light_sync::export;
use light_sync::receiver::{self, SnapshotReceiver};
use light_sync::scene::{SceneDocument, SceneSession};
use light_sync::snapshot::SnapshotBuilder;
use light_sync::transport::AsyncTransport;
use light_sync::types::{EventLabel, LightId};

/// Push live light snapshots from a modeling scene to a local listener
#[derive(Debug, Parser)]
#[command(name = "light-sync", version)]
struct Cli {
    /// Settings file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the light inventory of a scene and write the backup file
    List {
        #[arg(long)]
        scene: PathBuf,
        /// Backup file (overrides the configured path)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run one light event against a scene and deliver the snapshot
    Push {
        #[arg(long)]
        scene: PathBuf,
        #[arg(long, value_enum, default_value_t = EventArg::Modified)]
        event: EventArg,
        /// Id of the light the event is about
        #[arg(long, default_value_t = 0)]
        id: u32,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print snapshots pushed to this machine
    Listen {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EventArg {
    Added,
    Deleted,
    Undeleted,
    Modified,
}

impl From<EventArg> for EventLabel {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Added => EventLabel::Added,
            EventArg::Deleted => EventLabel::Deleted,
            EventArg::Undeleted => EventLabel::Undeleted,
            EventArg::Modified => EventLabel::Modified,
        }
    }
}

fn parse_level(level: &str) -> TraceLevel {
    match level.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

fn run_list(settings: &Settings, scene: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let document = SceneDocument::load(&scene)?;
    let snapshot = SnapshotBuilder::for_table(&document).build(&document, &BlacklistTracker::new());

    print!("{}", export::format_inventory(&snapshot));

    let path = output.unwrap_or_else(|| settings.backup_path());
    export::write_backup(&path, &snapshot)?;
    println!("Light data successfully exported to: {}", path.display());
    Ok(())
}

fn run_push(settings: &Settings, scene: PathBuf, event: EventArg, id: u32, port: Option<u16>) -> Result<()> {
    let host = SceneSession::new(SceneDocument::load(&scene)?);

    let mut transport_config = settings.transport_config();
    if let Some(port) = port {
        transport_config.port = port;
    }
    let transport = AsyncTransport::spawn(transport_config)?;
    info!(endpoint = %transport.endpoint(), "Pushing scene snapshot");

    let mut dispatcher = EventDispatcher::new(transport).with_export_path(settings.event_export_path());
    dispatcher.handle_event(&host, event.into(), LightId(id), None);

    // One-shot: let the delivery finish before the process exits
    dispatcher.into_sink().shutdown();
    Ok(())
}

fn run_listen(settings: &Settings, port: Option<u16>) -> Result<()> {
    let listener = SnapshotReceiver::bind(port.unwrap_or(settings.port))?;
    listener.run(|snapshot| println!("{}", receiver::describe(&snapshot)))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    // LOG_LEVEL wins over the config file
    let log_level = std::env::var(constants::config::LOG_LEVEL_ENV)
        .ok()
        .or_else(|| settings.as_ref().ok().map(|s| s.log_level.clone()))
        .map(|level| parse_level(&level))
        .unwrap_or(TraceLevel::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let settings = settings?;
    info!(config = ?settings, "Settings loaded");

    match cli.command {
        Command::List { scene, output } => run_list(&settings, scene, output),
        Command::Push { scene, event, id, port } => run_push(&settings, scene, event, id, port),
        Command::Listen { port } => run_listen(&settings, port),
    }
}
