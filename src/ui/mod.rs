//! Terminal output helpers for the command-line front end.
//!
//! Colors and spinners are only used when stdout is a terminal; piped
//! output stays plain.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::time::Duration;

use crate::agent::ToolInvocation;
use crate::models::PaperRecord;
use crate::tools::ToolOutcome;

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Icon for a paper source.
pub fn source_icon(source: &str) -> &'static str {
    match source.to_lowercase().as_str() {
        "arxiv" => "📝",
        "semantic" | "semantic scholar" => "🧠",
        _ => "📄",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
}

/// Status icons for different outcomes.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
    }
}

/// Print a status line, colored on a terminal.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    if !is_terminal() {
        println!("{} {}", icon, msg);
        return;
    }
    match status {
        Status::Success => println!("{} {}", icon.green().bold(), msg),
        Status::Error => println!("{} {}", icon.red().bold(), msg),
        Status::Warning => println!("{} {}", icon.yellow().bold(), msg),
        Status::Info => println!("{} {}", icon.cyan().bold(), msg),
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    if is_terminal() {
        println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
    } else {
        println!("=== {} ===", title);
    }
}

/// Print one paper as a plain block.
pub fn print_paper(index: usize, paper: &PaperRecord) {
    let year = paper.year().unwrap_or("????");
    let icon = source_icon(paper.source.name());
    if is_terminal() {
        println!("{} {}. {}", icon, index, paper.title.blue().bold());
        println!("   Authors: {}", paper.authors);
        println!("   Year:    {}", year.yellow());
        println!("   Link:    {}", paper.link.dimmed());
    } else {
        println!("{}. {}", index, paper.title);
        println!("   Authors: {}", paper.authors);
        println!("   Year:    {}", year);
        println!("   Link:    {}", paper.link);
    }
    if !paper.summary.is_empty() {
        println!("   {}", truncate_with_ellipsis(&paper.summary, 300));
    }
    println!();
}

/// Print a paper's generated summary under its block, or the error text.
pub fn print_paper_summary(outcome: &ToolOutcome) {
    if outcome.is_success() {
        for line in outcome.text.lines() {
            println!("   {}", line);
        }
    } else {
        print_status(Status::Warning, &format!("  {}", outcome.text));
    }
    println!();
}

/// Print the tool calls an agent made.
pub fn print_invocations(invocations: &[ToolInvocation]) {
    for (i, invocation) in invocations.iter().enumerate() {
        let status = if invocation.is_success() {
            Status::Success
        } else {
            Status::Warning
        };
        print_status(
            status,
            &format!(
                "step {}: {}({})",
                i + 1,
                invocation.tool,
                truncate_with_ellipsis(&invocation.input, 60)
            ),
        );
    }
}

/// Truncate to `max_chars` characters, ending with "..." when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_chars {
        return text;
    }
    if max_chars <= 3 {
        return "...".to_string();
    }
    let truncated: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", truncated)
}

/// A spinner shown while waiting on the network.
///
/// Hidden when stdout is not a terminal.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = if is_terminal() {
            indicatif::ProgressBar::new_spinner()
        } else {
            indicatif::ProgressBar::hidden()
        };
        if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Set the message.
    pub fn set_message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    /// Remove the spinner from the terminal.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
