use std::{io, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{
    config::{load_settings, load_settings_from},
    feed_url, DuplicatePolicy, HttpMailSource, InboxSession, MailSource, SessionEvent,
    StatusSignal,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{broadcast, mpsc},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

use commands::{parse_command, Command, HELP};
use terminal::TerminalBinder;

#[derive(Parser, Debug)]
struct Args {
    /// Capture server base URL, e.g. http://127.0.0.1:8085
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    duplicate_policy: Option<DuplicatePolicy>,
    /// Settings file to use instead of ./inbox.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if let Some(policy) = args.duplicate_policy {
        settings.duplicate_policy = policy;
    }

    let feed = feed_url(&settings.server_url)?;
    let source: Arc<dyn MailSource> = Arc::new(HttpMailSource::new(settings.server_url.clone()));
    info!(server_url = %settings.server_url, feed = %feed, "inbox: starting");

    let session = InboxSession::new(TerminalBinder::new(io::stdout()), settings.duplicate_policy);
    tokio::spawn(log_status(session.status().subscribe()));

    let (tx, rx) = mpsc::channel(settings.event_queue_capacity);
    tokio::spawn(read_commands(tx.clone()));

    let session = session.run(source, feed, tx, rx).await;
    info!(
        mails = session.store().len(),
        selected = ?session.binder().active(),
        rejected_frames = session.feed_adapter().rejected(),
        "inbox: exiting"
    );
    Ok(())
}

async fn log_status(mut rx: broadcast::Receiver<StatusSignal>) {
    loop {
        match rx.recv().await {
            Ok(StatusSignal::Block(message)) => info!(%message, "status: blocked"),
            Ok(StatusSignal::Unblock) => info!("status: ready"),
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Feeds stdin lines into the session queue until `quit` or end of input.
async fn read_commands(tx: mpsc::Sender<SessionEvent>) {
    eprintln!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(%err, "inbox: stdin read failed");
                break;
            }
        };
        match parse_command(&line) {
            Ok(Some(Command::Intent(intent))) => {
                if tx.send(SessionEvent::Intent(intent)).await.is_err() {
                    return;
                }
            }
            Ok(Some(Command::Help)) => eprintln!("{HELP}"),
            Ok(Some(Command::Quit)) => break,
            Ok(None) => {}
            Err(err) => eprintln!("{err}"),
        }
    }
    let _ = tx.send(SessionEvent::Shutdown).await;
}
