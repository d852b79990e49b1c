//! Nexus CLI: a terminal chat client for Gemini with a typing animation.

mod commands;
mod interrupt;

use anyhow::{Context, Result};
use clap::Parser;
use nexus_api::GeminiClient;
use nexus_config::{CliOverrides, NexusConfig};
use nexus_session::{ChatSession, Pacing, SessionError};
use nexus_terminal::{DisplaySink, PlainSink, Spinner, StreamRenderer, TerminalSink, style};
use nexus_types::{ConversationalModel, RenderError, Role};
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::commands::{SlashCommand, print_help, print_history};
use crate::interrupt::InterruptHandler;

const TITLE: &str = "Quantum Nexus Wisdom";

#[derive(Parser)]
#[command(name = "nexus", version, about = "A terminal chat client for Gemini")]
struct Cli {
    /// Send a single message, print the reply, and exit
    #[arg(short, long)]
    print: Option<String>,

    /// Model to use
    #[arg(long)]
    model: Option<String>,

    /// Maximum tokens in the reply
    #[arg(long)]
    max_tokens: Option<u32>,

    /// API key (overrides GEMINI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Print replies at once instead of typing them out
    #[arg(long)]
    no_animation: bool,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,
}

/// Everything a turn needs besides the session itself.
struct Ui {
    renderer: StreamRenderer,
    pacing: Pacing,
    interactive: bool,
}

/// How a turn ended, when it did not fail outright.
enum TurnOutcome {
    Completed,
    Cancelled,
    Failed(SessionError),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = NexusConfig::load(CliOverrides {
        api_key: cli.api_key,
        model: cli.model,
        max_tokens: cli.max_tokens,
        no_animation: cli.no_animation,
    })
    .context("Failed to load configuration")?;

    let model = create_model(&config)?;
    let ui = Ui {
        renderer: StreamRenderer::new().with_cursor(config.render.cursor.clone()),
        pacing: config.render.pacing,
        interactive: io::stdout().is_terminal(),
    };

    if let Some(text) = cli.print {
        // Print mode: single turn, no REPL
        let mut session = new_session(&model, &config);
        return match run_turn(&mut session, &text, &ui, &CancellationToken::new()).await? {
            TurnOutcome::Failed(e) => Err(e).context("Request failed"),
            TurnOutcome::Completed | TurnOutcome::Cancelled => Ok(()),
        };
    }

    repl(model, &config, &ui).await
}

fn create_model(config: &NexusConfig) -> Result<Arc<dyn ConversationalModel>> {
    let mut client = GeminiClient::new(&config.api_key, &config.api_base_url)
        .context("Failed to create API client")?
        .with_model(&config.model)
        .with_max_tokens(config.max_tokens)
        .with_temperature(config.temperature)
        .with_timeout(config.request_timeout);
    if let Some(prompt) = &config.system_prompt {
        client = client.with_system_prompt(prompt);
    }
    Ok(Arc::new(client))
}

fn new_session(model: &Arc<dyn ConversationalModel>, config: &NexusConfig) -> ChatSession {
    ChatSession::new(Arc::clone(model)).with_request_timeout(config.request_timeout)
}

async fn repl(model: Arc<dyn ConversationalModel>, config: &NexusConfig, ui: &Ui) -> Result<()> {
    let interrupts = InterruptHandler::install();
    let mut session = new_session(&model, config);
    let stdin = io::stdin();

    eprintln!("{}", style::banner(TITLE));
    eprintln!(
        "{}",
        style::dim(&format!(
            "nexus v{} (model: {}, session: {})",
            env!("CARGO_PKG_VERSION"),
            session.model_name(),
            session.short_id()
        ))
    );
    eprintln!("Type your message. /help for commands, Ctrl+D to exit.\n");

    loop {
        eprint!("> ");
        io::stderr().flush()?;

        let mut input = String::new();
        let bytes_read = stdin.lock().read_line(&mut input)?;
        if bytes_read == 0 {
            eprintln!();
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = SlashCommand::parse(input) {
            match command {
                SlashCommand::Quit => break,
                SlashCommand::Help => print_help(),
                SlashCommand::History => print_history(&session),
                SlashCommand::Clear => {
                    session = new_session(&model, config);
                    eprintln!("Conversation cleared. New session: {}", session.short_id());
                }
                SlashCommand::Unknown(cmd) => {
                    eprintln!("Unknown command: {cmd}. Type /help for available commands.");
                }
            }
            continue;
        }

        let cancel = interrupts.begin();
        let outcome = run_turn(&mut session, input, ui, &cancel).await;
        interrupts.end();

        match outcome? {
            TurnOutcome::Completed => {}
            TurnOutcome::Cancelled => {
                eprintln!("{}", style::dim("(reply cancelled)"));
            }
            TurnOutcome::Failed(e) => {
                eprintln!("{}", style::error_line(&e.to_string()));
            }
        }

        println!();
    }

    Ok(())
}

/// Submit `text`, obtain the reply, type it out, and store it.
///
/// Session errors (upstream failures) are reported as an outcome so the REPL
/// can continue; a failing display is a hard error.
async fn run_turn(
    session: &mut ChatSession,
    text: &str,
    ui: &Ui,
    cancel: &CancellationToken,
) -> Result<TurnOutcome> {
    if let Err(e) = session.submit(text) {
        return Ok(TurnOutcome::Failed(e));
    }

    let spinner = ui.interactive.then(|| Spinner::new("Thinking..."));
    let reply = tokio::select! {
        r = session.reply(text) => Some(r),
        _ = cancel.cancelled() => None,
    };
    if let Some(spinner) = spinner {
        spinner.stop().await;
    }

    let source = match reply {
        Some(Ok(source)) => source,
        Some(Err(e)) => return Ok(TurnOutcome::Failed(e)),
        None => {
            session.abandon();
            return Ok(TurnOutcome::Cancelled);
        }
    };

    let mut terminal_sink;
    let mut plain_sink;
    let sink: &mut dyn DisplaySink = if ui.interactive {
        println!("{}", style::role_label(Role::Assistant));
        terminal_sink = TerminalSink::new(io::stdout());
        &mut terminal_sink
    } else {
        plain_sink = PlainSink::new(io::stdout());
        &mut plain_sink
    };

    let delay = ui.pacing.delay_for(source.granularity());
    match ui.renderer.render(source.units(), delay, sink, cancel).await {
        Ok(rendered) => {
            session.finalize(&rendered)?;
            Ok(TurnOutcome::Completed)
        }
        Err(RenderError::Cancelled) => {
            session.abandon();
            println!();
            Ok(TurnOutcome::Cancelled)
        }
        Err(e) => {
            session.abandon();
            Err(e).context("Failed to display reply")
        }
    }
}
