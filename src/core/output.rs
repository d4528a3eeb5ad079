//! Unified output formatting utilities for consistent CLI presentation.
//!
//! Every user-facing line goes through one of these helpers so errors,
//! warnings and progress messages share one color scheme.
//!
//! # Design Principles
//! - **Consistent color scheme**: Red for errors, yellow for warnings, green for success
//! - **Standardized spacing**: Errors and info blocks are padded with blank lines
//! - **Single-line errors**: Every pipeline failure ends as exactly one error line

use colored::*;

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    eprintln!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a non-fatal warning
///
/// # Format
/// ```text
/// ! <message>
/// ```
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "!".yellow(), message.yellow());
}

/// Formats and prints a success message with consistent styling
///
/// # Colors
/// - Checkmark in green, message in white
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message.white());
}

/// Formats and prints an informational message with consistent styling
pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Prints a progress step (`→ Cloning ...`)
pub fn print_step(message: &str) {
    println!("{} {}", "→".blue(), message);
}

/// Formats and prints a section header with consistent styling
///
/// # Format
/// ```text
///
/// <header>:
///
/// ```
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}
