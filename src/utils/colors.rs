// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Terminal output helpers
//!
//! Progress lines go to stderr so they never mix with anything a
//! collaborator writes to stdout.

use colored::Colorize;
use std::io::IsTerminal;
use std::time::Duration;

/// Disable colouring when `NO_COLOR` is set or stderr is not a terminal
pub fn configure_colors() {
    if !should_use_colors() {
        colored::control::set_override(false);
    }
}

/// Check if colors should be used
pub fn should_use_colors() -> bool {
    // Respect NO_COLOR environment variable
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    std::io::stderr().is_terminal()
}

/// Print a styled header
pub fn print_header(title: &str) {
    eprintln!("{}", title.bold());
    eprintln!("{}", "═".repeat(title.chars().count().max(40)));
}

/// Print the start of a step
pub fn print_step_start(description: &str, command: &str) {
    eprintln!("  {} {}", "→".blue(), description.bold());
    eprintln!("    {}", command.dimmed());
}

/// Print a finished step
pub fn print_step_success(name: &str, duration: Duration) {
    eprintln!(
        "  {} {} ({:.2}s)",
        "✓".green(),
        name.bold(),
        duration.as_secs_f64()
    );
}

/// Print a failed step
pub fn print_step_failure(name: &str, exit_code: Option<i32>) {
    match exit_code {
        Some(code) => eprintln!("  {} {} failed (exit code {})", "✗".red(), name.bold(), code),
        None => eprintln!("  {} {} failed (terminated by signal)", "✗".red(), name.bold()),
    }
}

/// Print a key/value line
pub fn print_field(key: &str, value: &str) {
    eprintln!("  {:<8} {}", format!("{}:", key).dimmed(), value);
}

/// Print a planned command, marking whether its program is available
pub fn print_planned(num: usize, description: &str, command: &str, available: bool) {
    let marker = if available { "✓".green() } else { "✗".red() };
    eprintln!("  {}. {} {}", num, marker, description.bold());
    eprintln!("     {}", command.dimmed());
}

/// Print a summary line
pub fn print_summary(success: bool, message: &str) {
    eprintln!();
    if success {
        eprintln!("{}", message.green());
    } else {
        eprintln!("{}", message.red());
    }
}

/// Print a warning
pub fn print_warning(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow(), msg);
}
