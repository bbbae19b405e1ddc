use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use verba_config::Config;

mod commands;
mod controller;
mod docs;
mod events;
mod handler;
mod io;
mod select;
mod session;
mod state;
#[cfg(test)]
mod tests;

use crate::controller::AppController;
use crate::events::ChatMessage;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "verba", version, about = "Vocabulary lookup and flashcard chat bot")]
struct Args {
    /// Chat user id to act as on the console transport
    #[arg(long)]
    user: Option<String>,

    /// Override the default deck
    #[arg(long)]
    deck: Option<String>,

    /// Command to run on startup, e.g. "!dl bread"
    #[arg(long)]
    command: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(atty::is(atty::Stream::Stdout))
        .init();

    let mut config = Config::new();
    if let Some(deck) = args.deck {
        config.anki.deck = deck;
    }

    let user = args.user.unwrap_or_else(|| config.app.admin_user.clone());
    let chunk_limit = config.app.chunk_limit;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), user, "starting");

    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(user.clone(), chunk_limit);

    if let Some(text) = args.command {
        controller
            .chat_sender()
            .send(ChatMessage { user, text })
            .await?;
    }

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        result = tasks.join_next() => {
            match result {
                Some(Ok(Ok(()))) => tracing::warn!("task exited"),
                Some(Ok(Err(e))) => tracing::error!("task failed: {e}"),
                Some(Err(e)) => tracing::error!("task panicked: {e}"),
                None => {}
            }
        }
    }

    controller.shutdown();
    tasks.shutdown().await;
    Ok(())
}
