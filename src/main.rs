use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use roverlink::args::CommonArgs;
use roverlink::config::Config;
use roverlink::logging::{self, LogConfig};
use roverlink::protocol::{DecodedEvent, Intent};
use roverlink::surface::{ConsoleSpeech, ConsoleSurface};
use roverlink::theme as t;
use roverlink::{ConnectionManager, Dispatcher, LinkEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// ── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "roverlink",
    version,
    about = "Drive a rover over its WebSocket control channel"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Connect and read intents from stdin, one per line (default)
    ///
    /// `/listen` plays the voice-button cue, `/quit` exits.
    Run,
    /// Send a single intent and wait for the rover's reply
    Send {
        /// Intent to send (forward, backward, left, right, stop, or any phrase)
        intent: String,
        /// Seconds to wait for the connection
        #[arg(long, value_name = "SECS", default_value_t = 10)]
        connect_wait: u64,
        /// Seconds to wait for a command_result
        #[arg(long, value_name = "SECS", default_value_t = 5)]
        wait: u64,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    t::init_color(cli.common.no_color);
    logging::init(if cli.common.verbose {
        LogConfig::debug()
    } else {
        LogConfig::from_env()
    });

    let config_path = cli.common.config_path();
    let mut config = Config::load(Some(config_path.clone()))?;
    cli.common.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config).await,
        Commands::Send {
            intent,
            connect_wait,
            wait,
        } => {
            send_once(
                &config,
                &intent,
                Duration::from_secs(connect_wait),
                Duration::from_secs(wait),
            )
            .await
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
            ConfigCommands::Init { force } => init_config(&config, &config_path, force),
        },
    }
}

// ── run ─────────────────────────────────────────────────────────────────────

async fn run(config: &Config) -> Result<()> {
    let endpoint = config.endpoint()?;

    let cancel = CancellationToken::new();
    let (manager, link, events) =
        ConnectionManager::new(endpoint.clone(), config.reconnect_policy());
    let dispatcher = Arc::new(Dispatcher::new(
        link,
        Arc::new(ConsoleSurface),
        Arc::new(ConsoleSpeech),
    ));

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted");
                cancel.cancel();
            }
        }
    });

    let link_task = manager.start(cancel.clone());
    let pump = tokio::spawn({
        let dispatcher = dispatcher.clone();
        let cancel = cancel.clone();
        async move { dispatcher.run(events, cancel).await }
    });

    println!("{}", t::label_value("Rover", &endpoint.url()));
    println!("{}", t::muted("  Type an intent per line. /listen for the voice cue, /quit to exit."));

    let mut lines = spawn_stdin_reader();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.recv() => {
                let Some(line) = line else {
                    debug!("stdin closed");
                    break;
                };
                match line.trim() {
                    "" => {}
                    "/quit" | "/exit" => break,
                    "/listen" => dispatcher.begin_listening(),
                    "/status" => println!(
                        "{}",
                        t::label_value("Link", dispatcher.link().state().status_text())
                    ),
                    phrase => {
                        let _ = dispatcher.issue_phrase(phrase);
                    }
                }
            }
        }
    }

    cancel.cancel();
    let _ = link_task.await;
    let _ = pump.await;
    Ok(())
}

// Stdin is read on a plain thread, not tokio's blocking pool, so a read that
// never returns cannot hold up runtime shutdown. Lines that are not UTF-8
// are skipped.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut stdin = std::io::stdin().lock();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match stdin.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => match std::str::from_utf8(&buf) {
                    Ok(line) => {
                        if tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                    Err(error) => warn!(%error, len = buf.len(), "Skipping stdin line"),
                },
                Err(error) if error.kind() == std::io::ErrorKind::Interrupted => {}
                Err(error) => {
                    warn!(%error, "Failed to read stdin");
                    break;
                }
            }
        }
    });
    rx
}

// ── send ────────────────────────────────────────────────────────────────────

async fn send_once(
    config: &Config,
    intent: &str,
    connect_wait: Duration,
    wait: Duration,
) -> Result<()> {
    let intent = Intent::new(intent.trim())?;
    let endpoint = config.endpoint()?;

    let cancel = CancellationToken::new();
    let (manager, link, mut events) =
        ConnectionManager::new(endpoint.clone(), config.reconnect_policy());
    let link_task = manager.start(cancel.clone());

    let pb = t::spinner(&format!("Connecting to {}…", endpoint.url()));
    let connected = tokio::time::timeout(connect_wait, link.wait_connected()).await;
    if !matches!(connected, Ok(Ok(()))) {
        t::spinner_fail(&pb, "Rover unreachable");
        cancel.cancel();
        let _ = link_task.await;
        bail!(
            "Could not connect to rover at {} within {}s",
            endpoint,
            connect_wait.as_secs()
        );
    }
    t::spinner_ok(&pb, &format!("Connected to {}", endpoint));

    let dispatcher = Dispatcher::new(link, Arc::new(ConsoleSurface), Arc::new(ConsoleSpeech));
    let sent = dispatcher.issue(intent);

    if sent.is_ok() {
        let deadline = tokio::time::Instant::now() + wait;
        let mut replied = false;
        while let Ok(Some(event)) = tokio::time::timeout_at(deadline, events.recv()).await {
            if let LinkEvent::Event(DecodedEvent::CommandResult { .. }) = &event {
                dispatcher.handle(event);
                replied = true;
                break;
            }
        }
        if !replied {
            println!(
                "{}",
                t::muted(&format!("No reply from rover within {}s", wait.as_secs()))
            );
        }
    }

    cancel.cancel();
    let _ = link_task.await;
    sent.context("Command was not sent")?;
    Ok(())
}

// ── config ──────────────────────────────────────────────────────────────────

fn init_config(config: &Config, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    let written = config.save(Some(path))?;
    println!("{} {}", t::success("✓"), written.display());
    Ok(())
}
