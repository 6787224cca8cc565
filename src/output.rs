//! Console output styling for the CLI.

use std::path::Path;

use colored::Colorize;
use cors_proxy::StartupSummary;

/// Print the startup box.
pub fn print_summary(summary: &StartupSummary) {
    let logging = if summary.logging_enabled {
        "on".green()
    } else {
        "off".bright_black()
    };

    eprintln!();
    eprintln!("  {}", "CORS proxy is running".cyan().bold());
    eprintln!();
    eprintln!("  {} {}", "Local address:".cyan(), summary.local_url.green().underline());
    eprintln!("  {} {}", "Proxy target: ".cyan(), summary.target.as_str().yellow());
    eprintln!("  {} {}", "Logging:      ".cyan(), logging);
    eprintln!(
        "  {} {}",
        "Timeout:      ".cyan(),
        format!("{}ms", summary.timeout.as_millis()).magenta()
    );
    eprintln!();
    eprintln!("  {}", "Press Ctrl+C to stop".bright_black());
    eprintln!();
}

/// Print a fatal startup error.
pub fn print_error(title: &str, detail: &dyn std::fmt::Display) {
    eprintln!("{} {}", "error:".red().bold(), title.bold());
    eprintln!("  {}", detail.to_string().bright_black());
}

/// Hint shown when the configuration is unusable.
pub fn print_usage_hint() {
    eprintln!();
    eprintln!(
        "  {} {} {} {}",
        "Quick start:".cyan().bold(),
        "cors-proxy".green(),
        "--port 8000 --target".magenta(),
        "http://example.com"
    );
    eprintln!("  Run {} for all options", "cors-proxy --help".cyan());
}

pub fn print_init_success(path: &Path) {
    eprintln!("{} {}", "Created".green().bold(), path.display().to_string().cyan());
    eprintln!(
        "  Edit it, then run {}",
        "cors-proxy start".green()
    );
}

pub fn print_stopping() {
    eprintln!();
    eprintln!("{}", "Shutting down, waiting for in-flight requests...".yellow().bold());
}

pub fn print_stopped() {
    eprintln!("{}", "Proxy stopped".green().bold());
}
