//! Handles all user-facing output of a test run.
//!
//! Reporting goes through the [`OutputSink`] trait so runs can print to a
//! colored terminal, collect into a buffer for inspection, or stay silent.

use crate::runner::{RunSummary, TestResult};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// How a line of output should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Heading,
    Pass,
    Fail,
}

pub trait OutputSink {
    fn emit(&mut self, text: &str, tone: Tone);
}

/// Discards everything.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str, _tone: Tone) {}
}

/// Collects output into a String for testing or programmatic capture.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.buffer.lines()
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str, _tone: Tone) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
    }
}

/// Writes to stdout, coloring passes green and failures red.
pub struct StdoutSink {
    stream: StandardStream,
}

impl StdoutSink {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stream: StandardStream::stdout(choice),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str, tone: Tone) {
        let mut spec = ColorSpec::new();
        match tone {
            Tone::Plain => {}
            Tone::Heading => {
                spec.set_bold(true);
            }
            Tone::Pass => {
                spec.set_fg(Some(Color::Green));
            }
            Tone::Fail => {
                spec.set_fg(Some(Color::Red)).set_bold(true);
            }
        }
        let _ = self.stream.set_color(&spec);
        let _ = writeln!(self.stream, "{}", text);
        let _ = self.stream.reset();
    }
}

// ============================================================================
// RUN REPORTING
// ============================================================================

pub fn report_start(sink: &mut dyn OutputSink, target: &str) {
    sink.emit(&format!("Running tests for {}:", target), Tone::Heading);
}

pub fn report_case_start(sink: &mut dyn OutputSink, target: &str, index: usize, args: Option<&str>) {
    sink.emit(&format!("  Running test {}: {}", index, target), Tone::Plain);
    if let Some(args) = args {
        sink.emit(&format!("  args: ({}) ->", args), Tone::Plain);
    }
}

pub fn report_case(sink: &mut dyn OutputSink, result: &TestResult, print_res: bool) {
    match &result.reason {
        None => sink.emit(&format!("    Test {} passed", result.index), Tone::Pass),
        Some(reason) => sink.emit(
            &format!("    Test {} failed with error: {}", result.index, reason),
            Tone::Fail,
        ),
    }
    if print_res {
        let shown = match &result.outcome {
            Ok(value) => value.to_string(),
            Err(fault) => format!("raised {}", fault),
        };
        sink.emit(&format!("    result: {}", shown), Tone::Plain);
    }
}

pub fn report_summary(sink: &mut dyn OutputSink, summary: &RunSummary) {
    let failed = summary.failed();
    if failed.is_empty() {
        sink.emit(
            &format!("Tests for {} complete: all passed", summary.target),
            Tone::Pass,
        );
    } else {
        let indices: Vec<String> = failed.iter().map(usize::to_string).collect();
        sink.emit(
            &format!(
                "Tests for {} complete: {} of {} failed [{}]",
                summary.target,
                failed.len(),
                summary.results.len(),
                indices.join(", ")
            ),
            Tone::Fail,
        );
    }
}
