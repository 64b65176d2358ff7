use owo_colors::OwoColorize;
use strata_core::PageRecord;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Strata".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Extract per-level search records from HTML pages\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled value
pub fn print_field(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print the per-level summary of a record
pub fn print_record_summary(record: &PageRecord) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Levels".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());

    for level in &record.levels {
        let weight = format!("{:>4}", level.weight);
        match &level.value {
            Some(value) => eprintln!(
                "  {} {} {}",
                weight.dimmed(),
                format!("{}:", level.level).bright_white(),
                truncate(&value.to_string(), 48)
            ),
            None => eprintln!("  {} {} {}", weight.dimmed(), format!("{}:", level.level).dimmed(), "-".dimmed()),
        }
    }

    let indexable = if record.is_indexable() { "yes".green().to_string() } else { "no".red().to_string() };
    eprintln!("\n  {} {}\n", "Indexable:".dimmed(), indexable);
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}…", &text[..end]),
        None => text.to_string(),
    }
}
