//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::notes::Note;

/// Characters of note content shown per line in listings
const PREVIEW_CHARS: usize = 72;

/// Presenter for CLI output formatting.
///
/// Status lines go to stderr; notes and values go to stdout so they can be
/// piped.
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// A clone of the active spinner, for updating from callbacks
    pub fn spinner_handle(&self) -> Option<ProgressBar> {
        self.spinner.clone()
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// One listing line per note
    pub fn note_list<'a>(&self, notes: impl IntoIterator<Item = &'a Note>) {
        for note in notes {
            println!("{}", Self::format_note_line(note));
        }
    }

    /// A note in full: header line, then the untouched content
    pub fn note_detail(&self, note: &Note) {
        println!(
            "{} {}",
            note.id().as_str().yellow(),
            note.formatted_date().dimmed()
        );
        println!("{}", note.content());
    }

    /// Status line for a live dictation transcript
    pub fn format_live_transcript(text: &str) -> String {
        if text.is_empty() {
            "Listening... (press Enter to stop)".to_string()
        } else {
            format!("Listening... {}", Self::last_chars(text, PREVIEW_CHARS))
        }
    }

    fn format_note_line(note: &Note) -> String {
        format!(
            "{}  {}  {}",
            note.id().short().yellow(),
            note.formatted_date().dimmed(),
            note.preview(PREVIEW_CHARS)
        )
    }

    /// Tail of `text` that fits on a status line
    fn last_chars(text: &str, max: usize) -> String {
        let single_line = text.replace('\n', " ");
        let count = single_line.chars().count();
        if count <= max {
            single_line
        } else {
            let tail: String = single_line.chars().skip(count - max + 1).collect();
            format!("…{}", tail)
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
