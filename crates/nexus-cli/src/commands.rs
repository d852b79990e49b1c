//! Slash commands available at the REPL prompt.

use nexus_session::ChatSession;
use nexus_terminal::style;

#[derive(Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    History,
    Clear,
    Quit,
    Unknown(String),
}

impl SlashCommand {
    /// Parse a line starting with `/`. Returns `None` for ordinary chat input.
    pub fn parse(input: &str) -> Option<Self> {
        if !input.starts_with('/') {
            return None;
        }
        let cmd = input.split_whitespace().next().unwrap_or(input);
        let command = match cmd {
            "/help" => SlashCommand::Help,
            "/history" => SlashCommand::History,
            "/clear" => SlashCommand::Clear,
            "/quit" | "/exit" => SlashCommand::Quit,
            other => SlashCommand::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// Replay the conversation so far with role labels.
pub fn print_history(session: &ChatSession) {
    eprintln!(
        "{}",
        style::dim(&format!(
            "Session {}, started {}",
            session.short_id(),
            session.created_at().format("%Y-%m-%d %H:%M:%S UTC")
        ))
    );
    let transcript = session.transcript();
    if transcript.is_empty() {
        eprintln!("No messages yet.");
        return;
    }
    for message in transcript {
        println!("{}", style::role_label(message.role()));
        println!("{}\n", message.content());
    }
}

pub fn print_help() {
    eprintln!("{}", style::bold("Available commands:"));
    eprintln!("  /help     — Show this help");
    eprintln!("  /history  — Show the conversation so far");
    eprintln!("  /clear    — Clear conversation (starts new session)");
    eprintln!("  /quit     — Exit");
    eprintln!();
    eprintln!("Ctrl+C cancels a reply in progress. Ctrl+D exits.");
}
