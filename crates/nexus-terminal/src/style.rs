//! Terminal style helpers using crossterm ANSI escape sequences.

use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use nexus_types::Role;

/// Wrap text in bold.
pub fn bold(text: &str) -> String {
    format!(
        "{}{}{}",
        SetAttribute(Attribute::Bold),
        text,
        SetAttribute(Attribute::Reset)
    )
}

/// Wrap text in dim (faint).
pub fn dim(text: &str) -> String {
    format!(
        "{}{}{}",
        SetAttribute(Attribute::Dim),
        text,
        SetAttribute(Attribute::Reset)
    )
}

/// Bold role label: blue for the user, magenta for the assistant.
pub fn role_label(role: Role) -> String {
    let color = match role {
        Role::User => Color::Blue,
        Role::Assistant => Color::Magenta,
    };
    format!(
        "{}{}{}:{}",
        SetForegroundColor(color),
        SetAttribute(Attribute::Bold),
        role.label(),
        SetAttribute(Attribute::Reset)
    )
}

/// Application title line.
pub fn banner(title: &str) -> String {
    format!(
        "{}{}{}{}",
        SetForegroundColor(Color::Green),
        SetAttribute(Attribute::Bold),
        title,
        SetAttribute(Attribute::Reset)
    )
}

/// Format an error line: "✗ message" in red.
pub fn error_line(message: &str) -> String {
    format!(
        "{}✗ {}{}",
        SetForegroundColor(Color::Red),
        message,
        SetForegroundColor(Color::Reset)
    )
}
