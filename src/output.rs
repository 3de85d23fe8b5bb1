//! Report recording and terminal rendering
//!
//! [`Outputter`] is the single path for everything the user sees. It writes
//! lines to the live stream as they are produced, mirrors them into an optional
//! plain-text transcript, and keeps the side-by-side rows so they can be
//! exported afterwards.

use crate::error::{NcompareError, Result};
use crate::export::{CsvTable, TableSink, XlsxTable};
use crate::sequence::{align, paired_iterate, Alignment};
use regex::Regex;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, IsTerminal as _, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::OnceLock;

/// Width of the label column.
pub const LABEL_WIDTH: usize = 33;
/// Width of each value column.
pub const VALUE_WIDTH: usize = 50;

const ANSI_RESET: &str = "\x1b[0m";

/// Terminal colors used by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Section headings.
    Blue,
    Cyan,
    Red,
    BrightRed,
    /// Skipped sections and other low-importance notes.
    Grey,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Blue => "\x1b[94m",
            Color::Cyan => "\x1b[36m",
            Color::Red => "\x1b[31m",
            Color::BrightRed => "\x1b[1m\x1b[31m",
            Color::Grey => "\x1b[90m",
        }
    }
}

/// Decides whether the report is decorated with ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPolicy {
    pub colors: bool,
}

impl FormatPolicy {
    /// Colors are off for `--no-color`, when `NO_COLOR` is set, or when stdout
    /// is not a terminal.
    pub fn from_flags(no_color: bool) -> Self {
        let colors =
            !no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
        Self { colors }
    }

    pub fn plain() -> Self {
        Self { colors: false }
    }

    pub fn colored() -> Self {
        Self { colors: true }
    }

    pub fn paint(&self, color: Color, text: &str) -> String {
        if self.colors {
            format!("{}{text}{ANSI_RESET}", color.code())
        } else {
            text.to_string()
        }
    }
}

/// Remove ANSI escape sequences from `text`.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    static ANSI: OnceLock<Option<Regex>> = OnceLock::new();
    match ANSI.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").ok()) {
        Some(re) => re.replace_all(text, ""),
        None => Cow::Borrowed(text),
    }
}

/// One recorded side-by-side row, holding full (untruncated) values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: String,
    pub value_a: String,
    pub value_b: String,
    pub highlight: bool,
    pub separator: bool,
}

impl Row {
    /// Whether this row reports a difference between the two files.
    pub fn differs(&self) -> bool {
        self.highlight && !self.separator && self.value_a != self.value_b
    }
}

/// Cut `text` to `width` characters, marking the cut with `...`.
fn fit(text: &str, width: usize) -> Cow<'_, str> {
    if text.chars().count() <= width {
        Cow::Borrowed(text)
    } else {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        Cow::Owned(format!("{kept}..."))
    }
}

fn pad(text: &str, width: usize, dashed: bool) -> String {
    let text = fit(text, width);
    if dashed {
        format!("{text:->width$}")
    } else {
        format!("{text:>width$}")
    }
}

struct Transcript {
    path: PathBuf,
    writer: BufWriter<File>,
}

/// Records and renders the comparison report.
pub struct Outputter {
    policy: FormatPolicy,
    only_diffs: bool,
    live: Box<dyn Write>,
    transcript: Option<Transcript>,
    rows: Vec<Row>,
    printed: Vec<String>,
}

impl Outputter {
    /// Report to stdout.
    pub fn new(policy: FormatPolicy) -> Self {
        Self::with_writer(policy, Box::new(std::io::stdout()))
    }

    /// Report to an arbitrary live stream.
    pub fn with_writer(policy: FormatPolicy, live: Box<dyn Write>) -> Self {
        Self {
            policy,
            only_diffs: false,
            live,
            transcript: None,
            rows: Vec::new(),
            printed: Vec::new(),
        }
    }

    /// Mirror every line, without colors, into a text file at `path`.
    pub fn with_transcript(mut self, path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| NcompareError::export_write(path, e.to_string()))?;
        log::info!("Writing text transcript to {}", path.display());
        self.transcript = Some(Transcript {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        });
        Ok(self)
    }

    /// Drop rows that request highlighting but whose values agree.
    pub fn with_only_diffs(mut self, only_diffs: bool) -> Self {
        self.only_diffs = only_diffs;
        self
    }

    pub fn policy(&self) -> FormatPolicy {
        self.policy
    }

    pub fn paint(&self, color: Color, text: &str) -> String {
        self.policy.paint(color, text)
    }

    /// Rows recorded so far, oldest first.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows that show a difference between the two files.
    pub fn differing_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| row.differs())
    }

    /// Lines emitted with `add_to_history`.
    pub fn printed_history(&self) -> &[String] {
        &self.printed
    }

    fn write_raw(&mut self, text: &str, end: &str) -> Result<()> {
        self.live.write_all(text.as_bytes())?;
        self.live.write_all(end.as_bytes())?;
        self.live.flush()?;

        if let Some(transcript) = self.transcript.as_mut() {
            let plain = strip_ansi(text);
            transcript
                .writer
                .write_all(plain.as_bytes())
                .and_then(|()| transcript.writer.write_all(end.as_bytes()))
                .map_err(|e| NcompareError::export_write(&transcript.path, e.to_string()))?;
        }
        Ok(())
    }

    /// Write `text` followed by `end` to the live stream.
    ///
    /// Color directives in `text` are stripped when the policy disables color
    /// or `apply_color` is false.
    pub fn emit_line(
        &mut self,
        text: &str,
        apply_color: bool,
        add_to_history: bool,
        end: &str,
    ) -> Result<()> {
        let rendered = if self.policy.colors && apply_color {
            Cow::Borrowed(text)
        } else {
            strip_ansi(text)
        };
        let rendered = rendered.into_owned();
        self.write_raw(&rendered, end)?;
        if add_to_history {
            self.printed.push(strip_ansi(text).into_owned());
        }
        Ok(())
    }

    pub fn print(&mut self, text: &str) -> Result<()> {
        self.emit_line(text, true, false, "\n")
    }

    pub fn print_plain(&mut self, text: &str) -> Result<()> {
        self.emit_line(text, false, false, "\n")
    }

    /// Print a blue section heading and keep it in the printed history.
    pub fn heading(&mut self, text: &str) -> Result<()> {
        let painted = self.paint(Color::Blue, text);
        self.emit_line(&painted, true, true, "\n")
    }

    /// Write one three-column row and record it.
    pub fn emit_row(
        &mut self,
        label: &str,
        value_a: &str,
        value_b: &str,
        highlight_if_different: bool,
        is_separator: bool,
    ) -> Result<()> {
        self.emit_row_with_display(
            label,
            (value_a, value_b),
            (value_a, value_b),
            highlight_if_different,
            is_separator,
        )
    }

    /// Row whose screen form differs from the recorded values.
    ///
    /// Highlighting and export both use `full`; only the screen shows `shown`.
    pub fn emit_row_with_display(
        &mut self,
        label: &str,
        shown: (&str, &str),
        full: (&str, &str),
        highlight_if_different: bool,
        is_separator: bool,
    ) -> Result<()> {
        let row = Row {
            label: label.to_string(),
            value_a: full.0.to_string(),
            value_b: full.1.to_string(),
            highlight: highlight_if_different,
            separator: is_separator,
        };

        if self.only_diffs && row.highlight && !row.separator && !row.differs() {
            return Ok(());
        }

        let mut cell_a = pad(shown.0, VALUE_WIDTH, is_separator);
        let mut cell_b = pad(shown.1, VALUE_WIDTH, is_separator);
        if row.differs() {
            cell_a = self.paint(Color::Red, &cell_a);
            cell_b = self.paint(Color::Red, &cell_b);
        }
        let line = format!("{} {cell_a} {cell_b}", pad(label, LABEL_WIDTH, is_separator));
        self.write_raw(&line, "\n")?;

        self.rows.push(row);
        Ok(())
    }

    pub fn side_by_side(&mut self, label: &str, value_a: &str, value_b: &str) -> Result<()> {
        self.emit_row(label, value_a, value_b, false, false)
    }

    pub fn side_by_side_highlight(
        &mut self,
        label: &str,
        value_a: &str,
        value_b: &str,
    ) -> Result<()> {
        self.emit_row(label, value_a, value_b, true, false)
    }

    pub fn separator(&mut self) -> Result<()> {
        self.emit_row("-", "-", "-", false, true)
    }

    /// Align two name lists and print one row per name in their union.
    pub fn lists_diff<S: AsRef<str>>(&mut self, list_a: &[S], list_b: &[S]) -> Result<Alignment> {
        let alignment = align(list_a, list_b);
        self.emit_row(
            "Num. items:",
            &list_a.len().to_string(),
            &list_b.len().to_string(),
            true,
            false,
        )?;
        for (index, key_a, key_b) in paired_iterate(list_a, list_b) {
            self.emit_row(&index.to_string(), &key_a, &key_b, true, false)?;
        }
        self.diff_summary(&alignment)?;
        Ok(alignment)
    }

    /// Align `(key, value)` pairs by key and print the values side by side.
    pub fn keyed_diff(
        &mut self,
        items_a: &[(String, String)],
        items_b: &[(String, String)],
    ) -> Result<Alignment> {
        let keys_a: Vec<&str> = items_a.iter().map(|(k, _)| k.as_str()).collect();
        let keys_b: Vec<&str> = items_b.iter().map(|(k, _)| k.as_str()).collect();
        let alignment = align(&keys_a, &keys_b);

        let lookup = |items: &[(String, String)], key: &str| {
            items
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };

        self.emit_row(
            "Num. items:",
            &items_a.len().to_string(),
            &items_b.len().to_string(),
            true,
            false,
        )?;
        for (_, key_a, key_b) in paired_iterate(&keys_a, &keys_b) {
            let key = if key_a.is_empty() { &key_b } else { &key_a };
            let value_a = lookup(items_a, &key_a);
            let value_b = lookup(items_b, &key_b);
            self.emit_row(&format!("{key}:"), &value_a, &value_b, true, false)?;
        }
        self.diff_summary(&alignment)?;
        Ok(alignment)
    }

    fn diff_summary(&mut self, alignment: &Alignment) -> Result<()> {
        let (left, right, both) = alignment.counts();
        self.side_by_side(
            "Number of shared items:",
            &both.to_string(),
            &both.to_string(),
        )?;
        self.side_by_side(
            "Number of non-shared items:",
            &left.to_string(),
            &right.to_string(),
        )
    }

    /// Append every recorded row, oldest first, to `sink`.
    pub fn export_rows(&self, sink: &mut dyn TableSink) -> Result<()> {
        for row in &self.rows {
            sink.append_row(&row.label, &row.value_a, &row.value_b)?;
        }
        Ok(())
    }

    pub fn write_history_to_csv(&self, path: &Path) -> Result<()> {
        let mut table = CsvTable::new();
        self.export_rows(&mut table)?;
        table.flush_to(path)?;
        log::info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    pub fn write_history_to_excel(&self, path: &Path) -> Result<()> {
        let mut table = XlsxTable::new();
        self.export_rows(&mut table)?;
        table.flush_to(path)?;
        log::info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Flush the live stream and close the transcript, reporting failures.
    pub fn finish(mut self) -> Result<()> {
        self.live.flush()?;
        if let Some(mut transcript) = self.transcript.take() {
            transcript
                .writer
                .flush()
                .map_err(|e| NcompareError::export_write(&transcript.path, e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for Outputter {
    fn drop(&mut self) {
        // Reached when the pass bailed out before `finish`.
        if let Some(mut transcript) = self.transcript.take() {
            if let Err(e) = transcript.writer.flush() {
                log::warn!(
                    "Failed to flush transcript {}: {}",
                    transcript.path.display(),
                    e
                );
            }
        }
        let _ = self.live.flush();
    }
}

/// Clonable in-memory live stream, for capturing a report.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
