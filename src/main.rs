use anyhow::Result;
use clap::{Parser, Subcommand};

mod app;
mod client;
mod config;
mod controller;
mod handler;
mod logging;
mod message;
mod tui;
mod ui;

use app::App;
use client::ChatbotClient;
use config::{Config, Settings};
use controller::{ChatController, RequestOutcome};
use logging::LogTarget;
use message::Locale;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "chatbot", version)]
#[command(about = "Terminal chat client for a /chatbot HTTP backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the chatbot server
    #[arg(long, env = "CHATBOT_URL", global = true)]
    url: Option<String>,

    /// UI language (pt-BR or en)
    #[arg(long, env = "CHATBOT_LOCALE", value_parser = parse_locale, global = true)]
    locale: Option<Locale>,

    /// Persist --url and --locale to the config file
    #[arg(long, global = true)]
    save: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one prompt and print the reply
    Ask {
        /// The prompt text
        prompt: String,
    },
    /// Print the effective configuration
    Config,
}

fn parse_locale(s: &str) -> Result<Locale, String> {
    Locale::from_str(s).ok_or_else(|| format!("unknown locale '{}' (expected pt-BR or en)", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so it logs to a file
    let log_target = match cli.command {
        None => LogTarget::File(logging::default_log_path()?),
        Some(_) => LogTarget::Stderr,
    };
    logging::init(cli.verbose, log_target)?;

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load config file, using defaults");
        Config::new()
    });

    if cli.save {
        if let Some(url) = &cli.url {
            config.server_url = Some(url.clone());
        }
        if let Some(locale) = cli.locale {
            config.locale = Some(locale.as_str().to_string());
        }
        config.save()?;
        tracing::info!(path = %Config::get_config_path()?.display(), "config saved");
    }

    let settings = Settings::resolve(&config, cli.url.as_deref(), cli.locale);

    match cli.command {
        None => run_tui(&settings).await,
        Some(Commands::Ask { prompt }) => ask(&settings, &prompt).await,
        Some(Commands::Config) => {
            println!("{}", serde_json::to_string_pretty(&settings.to_json())?);
            Ok(())
        }
    }
}

async fn run_tui(settings: &Settings) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(settings, events.sender());

    tracing::info!(endpoint = %app.client.endpoint(), "chat session started");
    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

/// One submit/resolve cycle without the terminal UI
async fn ask(settings: &Settings, prompt: &str) -> Result<()> {
    let mut chat = ChatController::new(settings.locale.strings());
    let client = ChatbotClient::new(&settings.server_url);

    let Some(prompt) = chat.submit_prompt(prompt) else {
        tracing::info!("blank prompt, nothing sent");
        return Ok(());
    };

    let outcome = RequestOutcome::from(client.send(&prompt).await);
    chat.resolve_response(outcome);

    if let Some(reply) = chat.messages().last() {
        println!("{}", reply.text);
    }
    Ok(())
}
