//! Terminal output helpers: headings, labeled values, status lines and the
//! benchmark progress bar.

use std::fmt::Display;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a heading with clear separation
pub fn print_heading(text: &str) {
    let line = style("=".repeat(50)).blue().bright();
    println!("\n{}", line);
    println!("{}", style(format!(" {} ", text)).bold().white().bright());
    println!("{}\n", line);
}

/// Print a section heading (smaller than main heading)
pub fn print_section(text: &str) {
    let line = style("-".repeat(40)).blue();
    println!("\n{}", line);
    println!("{}", style(format!(" {} ", text)).bold().white());
    println!("{}", line);
}

/// Print an info line with label and value, with the label colored
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("{}: {}", style(label).cyan().bright(), value);
}

/// Print labeled values with the labels aligned.
pub fn print_config_block(items: &[(&str, String)]) {
    let width = items.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in items {
        println!(
            "  {:<width$} {} {}",
            style(key).green().bold(),
            style(":").white().bright(),
            value,
            width = width
        );
    }
}

/// Print an error message with red styling
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("Error:").red().bright().bold(), message);
}

/// Print a success message with green styling and a checkmark
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print a warning message with yellow styling
pub fn print_warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), style(message).yellow());
}

/// Create a progress bar over `total` frames.
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let template = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} frames ({per_sec}, {eta})";
    match ProgressStyle::default_bar().template(template) {
        Ok(progress_style) => pb.set_style(progress_style.progress_chars("█▓▒░ ")),
        Err(e) => log::debug!("Falling back to the default progress style: {}", e),
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
