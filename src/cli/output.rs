//! Shared CLI output helpers.
//!
//! Color scheme (console honours NO_COLOR and non-tty output):
//! - Green: success, checkmarks
//! - Red: errors, failed domains
//! - Yellow: warnings
//! - Cyan: paths, domains, hints
//! - Bold: headers, important values
//! - Dimmed: secondary info

use std::fmt::Display;

use console::style;

const RULE_WIDTH: usize = 56;

/// Print a success message with checkmark.
///
/// Example: `✓ associated domains updated`
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green(), msg);
}

/// Print an error message to stderr.
///
/// Example: `✗ target not found: MyApp`
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().for_stderr(), msg);
}

/// Print a warning message.
pub fn warn(msg: &str) {
    println!("{} {}", style("⚠").yellow(), msg);
}

/// Print a hint message.
///
/// Example: `→ pass --domains or --app-link-subdomain`
pub fn hint(msg: &str) {
    println!("{} {}", style("→").cyan(), style(msg).cyan());
}

/// Print a bold header.
pub fn header(title: &str) {
    println!("{}", style(title).bold());
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  team:  TEAM123`
pub fn kv(label: &str, value: impl Display) {
    println!("  {}  {}", style(label).dim(), style(value).bold());
}

/// Print a list item with bullet.
pub fn list_item(item: impl Display) {
    println!("  • {item}");
}

/// Print a per-domain verdict line.
pub fn verdict(domain: &str, ok: bool) {
    if ok {
        println!("  {} {}", style("✓").green(), style(domain).cyan());
    } else {
        println!("  {} {}", style("✗").red(), style(domain).cyan());
    }
}

/// Print a secondary message.
pub fn dimmed(msg: &str) {
    println!("{}", style(msg).dim());
}

/// Format a path inline.
pub fn path(p: impl Display) -> String {
    style(p).cyan().to_string()
}

/// Format a command inline.
pub fn cmd(c: &str) -> String {
    style(c).green().to_string()
}

pub fn blank() {
    println!();
}

fn rule() {
    println!("{}", style("─".repeat(RULE_WIDTH)).dim());
}

/// Print a section header with a separator line.
///
/// ```text
/// Domains
/// ────────────────────────────────────────────────────────
/// ```
pub fn section(title: &str) {
    println!();
    header(title);
    rule();
}
