//! Terminal output utilities

use console::style;

/// Print an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{}: {}", style("error").red().bold(), message);
}

/// Print a warning message to stderr
pub fn print_warning(message: &str) {
    eprintln!("{}: {}", style("warning").yellow().bold(), message);
}

/// Print an info message to stderr
///
/// Hooks keep stdout for the wrapped tool's own output.
pub fn print_info(message: &str) {
    eprintln!("{}: {}", style("info").blue().bold(), message);
}

/// Print a section header followed by a block of text to stderr
pub fn print_block(title: &str, body: &str) {
    eprintln!("{}", style(title).red().bold());
    eprint!("{}", body);
    if !body.ends_with('\n') {
        eprintln!();
    }
}

/// Disable colored output on both streams
pub fn disable_colors() {
    console::set_colors_enabled(false);
    console::set_colors_enabled_stderr(false);
}
