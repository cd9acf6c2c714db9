//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::{ColoredString, Colorize};

use crate::application::services::HeatLevel;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print labelled value (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Count colored by heatmap band: red, yellow, green.
pub fn heat(count: u64) -> ColoredString {
    let text = count.to_string();
    match HeatLevel::from_count(count) {
        HeatLevel::Cold => text.red(),
        HeatLevel::Warm => text.yellow(),
        HeatLevel::Hot => text.green().bold(),
    }
}

/// Print one sweep row: colored value then the node.
pub fn heat_row(value: &(impl std::fmt::Display + ?Sized), node_id: &str, label: &str) {
    let first_line = label.lines().next().unwrap_or_default().trim();
    println!("{}\t{} {}", value, node_id.dimmed(), first_line);
}
