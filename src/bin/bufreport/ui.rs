//! Console presentation of a report run.
//!
//! stdout carries the saved-chart line and the summary block; warnings and
//! the render spinner go to stderr.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use bufreport::Summary;
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use nu_ansi_term::{Color, Style};

const SUMMARY_HEADING: &str = "Summary Statistics";
const SAVED_MARK: &str = "✔";
const WARN_MARK: &str = "⚠";
const HEADING_MARK: &str = "▸";

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Theme {
    Auto,
    Light,
    Dark,
    Plain,
}

/// Styles for one theme. Plain styles print no escape codes.
#[derive(Clone, Copy)]
struct Styles {
    heading: Style,
    key: Style,
    value: Style,
    saved: Style,
    warn: Style,
}

impl Styles {
    fn for_theme(theme: Theme, paint: bool) -> Self {
        let plain = Style::new();
        if !paint {
            return Self {
                heading: plain,
                key: plain,
                value: plain,
                saved: plain,
                warn: plain,
            };
        }
        let (accent, key, value) = match theme {
            Theme::Light => (Color::Blue, Color::Black, Color::Black),
            _ => (Color::Purple, Color::LightBlue, Color::White),
        };
        Self {
            heading: accent.bold(),
            key: key.bold(),
            value: Style::new().fg(value),
            saved: Color::Green.bold(),
            warn: Color::Yellow.bold(),
        }
    }
}

pub struct Ui {
    styles: Styles,
    quiet: bool,
}

impl Ui {
    pub fn new(theme: Theme, quiet: bool) -> Self {
        let paint = !quiet && theme != Theme::Plain && std::io::stdout().is_terminal();

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        Self {
            styles: Styles::for_theme(theme, paint),
            quiet,
        }
    }

    /// `Graph saved as: <path>`, followed by a blank line unless quiet.
    pub fn chart_saved(&self, path: &Path) {
        let line = format!("Graph saved as: {}", path.display());
        if self.quiet {
            println!("{line}");
        } else {
            println!("{} {line}\n", self.styles.saved.paint(SAVED_MARK));
        }
    }

    /// The eight summary lines under their heading, keys right-aligned.
    ///
    /// A `TotalLogicalIO` that varied between workloads is flagged on stderr
    /// first.
    pub fn summary(&self, summary: &Summary) {
        if !summary.logical_io_is_constant() {
            self.warn(&format!(
                "TotalLogicalIO is not constant across workloads ({})",
                summary.logical_io
            ));
        }

        if self.quiet {
            println!("{SUMMARY_HEADING}");
        } else {
            println!(
                "{}",
                self.styles
                    .heading
                    .paint(format!("{HEADING_MARK} {SUMMARY_HEADING}"))
            );
        }

        let rows = summary.rows();
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in rows {
            println!(
                "  {} {}",
                self.styles.key.paint(format!("{key:>width$}:")),
                self.styles.value.paint(value)
            );
        }
    }

    fn warn(&self, message: &str) {
        if self.quiet {
            eprintln!("{message}");
        } else {
            eprintln!("{} {message}", self.styles.warn.paint(WARN_MARK));
        }
    }

    /// Spinner on stderr while the chart is drawn. Hidden when quiet or when
    /// stderr is not a terminal.
    pub fn rendering(&self, output: &Path) -> Rendering {
        let label = format!("Rendering {}", output.display());
        let bar = (!self.quiet).then(|| {
            let style = ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ");
            let bar = ProgressBar::new_spinner().with_style(style);
            bar.set_message(label.clone());
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        });
        Rendering {
            label,
            bar,
            started: Instant::now(),
            done: false,
        }
    }
}

/// A running render. Dropping it without [`Rendering::finish`] marks the
/// render as failed.
pub struct Rendering {
    label: String,
    bar: Option<ProgressBar>,
    started: Instant,
    done: bool,
}

impl Rendering {
    pub fn finish(mut self) -> Duration {
        self.done = true;
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        self.started.elapsed()
    }
}

impl Drop for Rendering {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Some(bar) = self.bar.take() {
            bar.abandon_with_message(format!(
                "{} failed after {}",
                self.label,
                elapsed(self.started.elapsed())
            ));
        }
    }
}

pub fn elapsed(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        format!("{:.0}ms", secs * 1_000.0)
    }
}
