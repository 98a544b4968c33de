// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Terminal color utilities
//!
//! Provides consistent color schemes across the CLI.

use colored::Colorize;

/// Style for code/commands
pub fn code(msg: &str) -> colored::ColoredString {
    msg.cyan()
}

/// Style for dimmed/secondary text
pub fn dimmed(msg: &str) -> colored::ColoredString {
    msg.dimmed()
}

/// Check if colors should be disabled
pub fn should_use_colors() -> bool {
    // NO_COLOR disables colors regardless of its value
    std::env::var_os("NO_COLOR").is_none()
}

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.chars().count().max(40)));
}

/// Print a styled section
pub fn print_section(title: &str) {
    println!();
    println!("{}:", title.bold());
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print an error cross
pub fn print_error(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}
