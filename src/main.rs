use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use airwatch::alert::{LogNotifier, TerminalBell};
use airwatch::app::Change;
use airwatch::{
    AlertDispatcher, App, AppConfig, FeedKind, JsonFileStore, PollingSession, ReplaySource,
    Report, SharedSettings, TelemetrySource,
};

#[derive(Parser, Debug)]
#[command(name = "airwatch", version)]
#[command(about = "Air-quality telemetry monitor with threshold alerts")]
struct Args {
    /// Path to a TOML config file (default: ./airwatch.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Replay readings from a recorded feed file instead of the provider
    #[arg(long, global = true)]
    replay: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll continuously and dispatch alerts until interrupted
    Watch,
    /// Fetch the current reading once and print it as JSON
    Current,
    /// Fetch historical readings and summarize them
    History {
        /// Number of days to fetch
        #[arg(short, long, default_value_t = 7)]
        days: u32,

        /// Export the summary as a JSON report
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Show or change notification settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Send a test SMS to the configured phone number
    TestMessage,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the current settings
    Show,
    /// Turn a setting on or off (e.g. `set smsAlerts true`)
    Set {
        key: String,
        #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
        value: bool,
    },
    /// Set the destination phone number (empty string clears it)
    Phone { number: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = AppConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Watch => watch(&config, args.replay).await,
        Command::Current => current(&config, args.replay).await,
        Command::History { days, export } => history(&config, args.replay, days, export).await,
        Command::Settings { action } => settings(&config, action),
        Command::TestMessage => test_message(&config).await,
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Pick the replay file if given, the configured provider otherwise.
fn telemetry_source(config: &AppConfig, replay: Option<PathBuf>) -> Result<Arc<dyn TelemetrySource>> {
    match replay {
        Some(path) => Ok(Arc::new(ReplaySource::new(path))),
        None => Ok(Arc::new(config.thingspeak_adapter()?)),
    }
}

fn load_settings(config: &AppConfig) -> Result<SharedSettings> {
    let store = JsonFileStore::open(config.settings_path())?;
    SharedSettings::load(Arc::new(store))
}

fn build_dispatcher(config: &AppConfig, settings: SharedSettings) -> Result<AlertDispatcher> {
    let mut dispatcher =
        AlertDispatcher::new(settings, Arc::new(TerminalBell::new()), Arc::new(LogNotifier));
    if let Some(messenger) = config.twilio_messenger()? {
        dispatcher = dispatcher.with_messenger(Arc::new(messenger));
    }
    Ok(dispatcher)
}

/// Run the session with the console consumer and the alert dispatcher.
async fn watch(config: &AppConfig, replay: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config)?;
    let dispatcher = build_dispatcher(config, settings)?;

    let session = PollingSession::builder()
        .shared_source(telemetry_source(config, replay)?)
        .config(config.session_config())
        .build()?;

    // Subscribe before starting so the first reading is not missed
    let dispatcher_task = tokio::spawn(dispatcher.run(session.subscribe()));
    let mut events = session.subscribe();
    let mut app = App::new(session.source_description());

    println!("Watching {} (Ctrl-C to stop)", app.source_description());
    session.start();

    while app.running {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                }
                session.stop();
            }
            event = events.recv() => match event {
                Ok(event) => render(&mut app, &event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Console lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    dispatcher_task.await.context("Alert dispatcher panicked")?;
    Ok(())
}

fn render(app: &mut App, event: &airwatch::SessionEvent) {
    match app.apply(event) {
        Change::Reading => println!("{}", app.status_line()),
        Change::Status => {
            println!("{}", app.status_line());
            print!("{}", app.recommendations());
        }
        Change::History => print!("{}", app.history_summary()),
        Change::Error => {
            for (feed, error) in [
                (FeedKind::Current, &app.current_error),
                (FeedKind::Historical, &app.history_error),
            ] {
                if let Some(error) = error {
                    println!("[{} feed] {}", feed, error);
                }
            }
        }
        Change::Stopped | Change::None => {}
    }
}

async fn current(config: &AppConfig, replay: Option<PathBuf>) -> Result<()> {
    let session = PollingSession::builder()
        .shared_source(telemetry_source(config, replay)?)
        .config(config.session_config())
        .build()?;

    let snapshot = session.refresh_current().await?;
    let report = Report::new(Local::now()).with_current(&snapshot);
    println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    Ok(())
}

async fn history(
    config: &AppConfig,
    replay: Option<PathBuf>,
    days: u32,
    export: Option<PathBuf>,
) -> Result<()> {
    if days == 0 {
        return Err(anyhow!("--days must be at least 1"));
    }

    let session = PollingSession::builder()
        .shared_source(telemetry_source(config, replay)?)
        .config(config.session_config())
        .build()?;

    let window = session.fetch_historical(days).await?;

    let mut app = App::new(session.source_description());
    app.apply(&airwatch::SessionEvent::HistoryUpdated(Arc::clone(&window)));
    print!("{}", app.history_summary());

    if let Some(path) = export {
        Report::new(Local::now()).with_history(&window).write_to(&path)?;
        println!("Exported report to: {}", path.display());
    }
    Ok(())
}

fn settings(config: &AppConfig, action: SettingsAction) -> Result<()> {
    let settings = load_settings(config)?;

    match action {
        SettingsAction::Show => {}
        SettingsAction::Set { key, value } => {
            settings.update(|s| s.set(&key, value))?;
        }
        SettingsAction::Phone { number } => settings.set_phone_number(&number)?,
    }

    let mut shown = serde_json::to_value(settings.notification())?;
    shown["phoneNumber"] = serde_json::json!(settings.phone_number());
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}

async fn test_message(config: &AppConfig) -> Result<()> {
    if config.messaging.is_none() {
        return Err(anyhow!(
            "No messaging provider configured (set [messaging] in the config file)"
        ));
    }

    let settings = load_settings(config)?;
    let dispatcher = build_dispatcher(config, settings)?;
    dispatcher.send_test_message().await?;
    println!("Test message sent");
    Ok(())
}
