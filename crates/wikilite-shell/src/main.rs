//! Wikilite Shell - terminal host for the wikilite engine.
//!
//! Locates the content database, supervises the engine serving it, and
//! drives the search client from a line-oriented terminal.

mod repl;
mod term;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use repl::Command;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wikilite_core::config::EngineConfig;
use wikilite_core::platform;
use wikilite_core::{
    ClientController, ClientOptions, DatabaseLocator, EventOutcome, FixedDelayGate,
    PreferenceStore, TcpProbeGate, UiEvent, View, WikiliteError, WikiliteShell,
};

/// Exit code when no database exists and provisioning has to run first.
const EXIT_NEEDS_PROVISIONING: u8 = 2;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum GateKind {
    /// Wait a fixed delay after starting the engine
    Delay,
    /// Poll the engine port until it accepts connections
    Probe,
}

#[derive(Parser, Debug)]
#[command(name = "wikilite-shell")]
#[command(about = "Browse an offline wikilite database from the terminal")]
struct Args {
    /// Engine binary (defaults to `wikilite` next to this executable)
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Data directory for the engine's working directory and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory to look for the database in before the platform defaults
    #[arg(long = "db-dir")]
    db_dirs: Vec<PathBuf>,

    /// Directory holding the preferences file
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// How to decide that the engine is ready
    #[arg(long, value_enum, default_value_t = GateKind::Delay)]
    readiness: GateKind,

    /// Pre-select semantic search
    #[arg(long)]
    ai: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    // RUST_LOG wins over --debug when set.
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .compact()
            .init();
        return;
    }

    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();
}

fn default_engine() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| anyhow::anyhow!("executable has no parent directory"))?;
    Ok(dir.join(EngineConfig::BINARY_NAME))
}

fn locator(args: &Args) -> Result<DatabaseLocator> {
    let mut candidates = args.db_dirs.clone();
    candidates.extend(platform::candidate_dirs()?);
    let config_dir = match &args.config_dir {
        Some(dir) => dir.clone(),
        None => platform::config_dir()?,
    };
    Ok(DatabaseLocator::new(
        candidates,
        PreferenceStore::in_dir(config_dir),
    ))
}

fn build_shell(args: &Args) -> Result<WikiliteShell> {
    let engine = match &args.engine {
        Some(path) => path.clone(),
        None => default_engine()?,
    };

    let mut builder = WikiliteShell::builder(engine)
        .locator(locator(args)?)
        .client_options(ClientOptions { ai: args.ai });
    if let Some(dir) = &args.data_dir {
        builder = builder.data_dir(dir);
    }
    builder = match args.readiness {
        GateKind::Delay => builder.readiness_gate(FixedDelayGate::default()),
        GateKind::Probe => builder.readiness_gate(TcpProbeGate::default()),
    };
    Ok(builder.build()?)
}

fn print_provisioning(searched: &[PathBuf]) {
    eprintln!("No wikilite database was found. Looked for:");
    for path in searched {
        eprintln!("  {}", path.display());
    }
    eprintln!("Download a database into one of these locations, then start again.");
}

fn prompt(client: &ClientController) {
    print!("{} wikilite> ", term::status_line(client.modes(), client.limit()));
    let _ = std::io::stdout().flush();
}

/// Turn a command into an event for the controller. `None` when there is
/// nothing to send.
fn to_event(command: Command, view: &View) -> Option<UiEvent> {
    match command {
        Command::Search(query) => Some(UiEvent::Submit(query)),
        Command::Mode { mode, selected } => Some(match selected {
            Some(selected) => UiEvent::SetMode { mode, selected },
            None => UiEvent::ToggleMode(mode),
        }),
        Command::Limit(limit) => Some(UiEvent::SetLimit(limit)),
        Command::Open(n) => match view {
            View::SearchResults { items, .. } if n <= items.len() => {
                Some(UiEvent::Open(items[n - 1].article_id))
            }
            _ => {
                println!("No result number {} on screen.", n);
                None
            }
        },
        Command::Back => Some(UiEvent::Back),
        Command::Reload => Some(UiEvent::Reload),
        Command::Empty | Command::Help | Command::Quit => None,
    }
}

/// Run `work` unless `interrupt` resolves first, in which case `work` is
/// dropped and `None` returned.
async fn unless_interrupted<T>(
    work: impl Future<Output = T>,
    interrupt: impl Future,
) -> Option<T> {
    tokio::select! {
        value = work => Some(value),
        _ = interrupt => {
            println!();
            info!("Interrupted");
            None
        }
    }
}

async fn run_terminal(client: &mut ClientController, initial: View) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut view = initial;
    println!("{}", term::view(&view));
    println!("{}", repl::HELP);

    loop {
        prompt(client);
        let Some(line) = unless_interrupted(lines.next_line(), tokio::signal::ctrl_c()).await
        else {
            break;
        };
        let Some(line) = line? else {
            break;
        };

        let command = match repl::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => {
                println!("{}", repl::HELP);
                continue;
            }
            _ => {}
        }

        let Some(event) = to_event(command, &view) else {
            continue;
        };
        let Some(outcome) = unless_interrupted(client.handle(event), tokio::signal::ctrl_c()).await
        else {
            break;
        };
        if outcome == EventOutcome::Propagate {
            break;
        }
        view = client.view();
        println!("{}", term::view(&view));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.debug);

    info!(
        "Starting wikilite shell {} on {}",
        env!("CARGO_PKG_VERSION"),
        platform::current_platform()
    );

    let shell = build_shell(&args)?;
    let mut session = match shell.launch().await {
        Ok(session) => session,
        Err(WikiliteError::DatabaseNotFound { searched }) => {
            print_provisioning(&searched);
            return Ok(ExitCode::from(EXIT_NEEDS_PROVISIONING));
        }
        Err(e) => return Err(e.into()),
    };
    info!("Using database {}", session.database);

    let initial = session.initial_view.clone();
    run_terminal(&mut session.client, initial).await?;

    session.engine.stop();
    match tokio::time::timeout(Duration::from_secs(5), session.engine.terminated()).await {
        Ok(state) => info!(?state, "Engine stopped"),
        Err(_) => warn!("Engine did not stop in time"),
    }
    Ok(ExitCode::SUCCESS)
}
