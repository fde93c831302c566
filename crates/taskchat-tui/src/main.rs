use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use taskchat_core::{markup, ChatClient, ChatRole, Config, Conversation};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "taskchat", version)]
#[command(about = "Manage your tasks with natural language")]
struct Cli {
    /// Task assistant backend (overrides TASKCHAT_BACKEND_URL and the config file)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Remember --backend-url in the config file
    #[arg(long, requires = "backend_url")]
    save: bool,

    /// Where to write logs
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single message and print the reply
    Ask {
        /// Your message
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    let _log_guard = logging::init(&log_path)?;

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });
    let backend_url = config.resolve_backend_url(cli.backend_url.as_deref());

    if cli.save {
        Config::save_backend_url(&backend_url)?;
        tracing::info!(%backend_url, "saved backend url");
    }

    tracing::info!(%backend_url, "starting taskchat");
    let client = ChatClient::new(&backend_url);

    match cli.command {
        Some(Commands::Ask { message }) => ask(&client, &message).await,
        None => run_tui(client).await,
    }
}

async fn ask(client: &ChatClient, message: &str) -> Result<()> {
    let mut conversation = Conversation::new();
    if !conversation.exchange(client, message).await {
        bail!("Message is empty");
    }

    let state = conversation.state();
    if let Some(error) = &state.last_error {
        bail!("{}", error);
    }

    if let Some(reply) = state.turns.last().filter(|t| t.role == ChatRole::Assistant) {
        for line in markup::format(&reply.content) {
            println!("{}", line.plain_text());
        }
    }

    Ok(())
}

async fn run_tui(client: ChatClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(client);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!(turns = app.conversation.state().turns.len(), "exiting");
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event);
        app.poll_send_task().await;
    }

    if let Some(task) = app.send_task.take() {
        task.abort();
    }

    Ok(())
}
