//! Display sinks that receive render frames.

use crossterm::{
    cursor, queue,
    style::Print,
    terminal::{self, ClearType},
};
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

/// Destination for incremental reply frames.
///
/// A sink is exclusively borrowed for the duration of one render.
pub trait DisplaySink {
    /// Show an in-progress frame (text plus cursor glyph), replacing the previous one.
    fn update(&mut self, frame: &str) -> io::Result<()>;

    /// Show the final text, without cursor glyph. Called once per render.
    fn finish(&mut self, text: &str) -> io::Result<()> {
        self.update(text)
    }
}

impl<S: DisplaySink + ?Sized> DisplaySink for &mut S {
    fn update(&mut self, frame: &str) -> io::Result<()> {
        (**self).update(frame)
    }

    fn finish(&mut self, text: &str) -> io::Result<()> {
        (**self).finish(text)
    }
}

/// Columns between tab stops.
const TAB_WIDTH: usize = 8;

/// Redraws each frame in place on a terminal.
///
/// Only rows still on screen are redrawn. Rows that scroll off the top are
/// committed: later frames leave them alone and draw the rest below them.
pub struct TerminalSink<W: Write> {
    writer: W,
    /// Width of the terminal in columns.
    term_width: u16,
    /// Height of the terminal in rows.
    term_height: u16,
    /// Rows below the first redrawable row that the last frame occupied.
    rows_below: usize,
    /// Prefix of the reply that has scrolled out of reach.
    committed: String,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(writer: W) -> Self {
        let (width, height) = terminal::size().unwrap_or((80, 24));
        Self::with_size(writer, width, height)
    }

    /// Create a sink with a fixed size (useful for tests and pipes).
    pub fn with_size(writer: W, term_width: u16, term_height: u16) -> Self {
        Self {
            writer,
            term_width,
            term_height,
            rows_below: 0,
            committed: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn draw(&mut self, text: &str) -> io::Result<()> {
        let pending = self.uncommitted(text);
        let rows = layout(pending, self.term_width);

        if self.rows_below > 0 {
            queue!(self.writer, cursor::MoveUp(self.rows_below as u16))?;
        }
        queue!(
            self.writer,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::FromCursorDown)
        )?;
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                queue!(self.writer, Print("\r\n"))?;
            }
            queue!(self.writer, Print(&row.cells))?;
        }

        let visible = rows.len().min(self.term_height.max(1) as usize);
        let scrolled = rows.len() - visible;
        if scrolled > 0 {
            self.committed.push_str(&pending[..rows[scrolled - 1].end]);
        }
        self.rows_below = visible - 1;
        self.writer.flush()
    }

    /// The part of `text` after the committed rows.
    ///
    /// The final text is trimmed, so the committed prefix may only match
    /// once its own whitespace is trimmed too.
    fn uncommitted<'t>(&self, text: &'t str) -> &'t str {
        if self.committed.is_empty() {
            return text;
        }
        [
            self.committed.as_str(),
            self.committed.trim_start(),
            self.committed.trim(),
        ]
        .into_iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text)
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn update(&mut self, frame: &str) -> io::Result<()> {
        self.draw(frame)
    }

    fn finish(&mut self, text: &str) -> io::Result<()> {
        self.draw(text)?;
        self.rows_below = 0;
        self.committed.clear();
        writeln!(self.writer)?;
        self.writer.flush()
    }
}

/// One terminal row of laid-out text.
#[derive(Debug, PartialEq, Eq)]
struct Row {
    /// Byte offset in the source text just past this row, newline included.
    end: usize,
    /// What the row shows, with tabs expanded to spaces.
    cells: String,
}

/// Break `text` into the rows a terminal `term_width` columns wide shows.
fn layout(text: &str, term_width: u16) -> Vec<Row> {
    let width = term_width.max(1) as usize;
    let mut rows = Vec::new();
    let mut cells = String::new();
    let mut col = 0usize;

    for (i, ch) in text.char_indices() {
        if ch == '\n' {
            rows.push(Row {
                end: i + 1,
                cells: std::mem::take(&mut cells),
            });
            col = 0;
            continue;
        }
        if ch != '\t' && ch.is_control() {
            continue;
        }

        let mut cols = cell_width(ch, col, width);
        if col > 0 && col + cols > width {
            rows.push(Row {
                end: i,
                cells: std::mem::take(&mut cells),
            });
            col = 0;
            cols = cell_width(ch, col, width);
        }

        if ch == '\t' {
            cells.extend(std::iter::repeat_n(' ', cols));
        } else {
            cells.push(ch);
        }
        col += cols;
    }

    rows.push(Row {
        end: text.len(),
        cells,
    });
    rows
}

/// Columns `ch` takes when printed at column `col`.
fn cell_width(ch: char, col: usize, width: usize) -> usize {
    if ch == '\t' {
        (TAB_WIDTH - col % TAB_WIDTH).min(width)
    } else {
        ch.width().unwrap_or(0)
    }
}

/// Number of terminal rows `text` occupies at the given width.
pub fn rows_for(text: &str, term_width: u16) -> usize {
    layout(text, term_width).len()
}

/// Writes only the final text. For output that is not a terminal.
pub struct PlainSink<W: Write> {
    writer: W,
}

impl<W: Write> PlainSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> DisplaySink for PlainSink<W> {
    fn update(&mut self, _frame: &str) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.writer, "{text}")?;
        self.writer.flush()
    }
}

/// Records every frame in memory.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub frames: Vec<String>,
    pub finished: Option<String>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for FrameRecorder {
    fn update(&mut self, frame: &str) -> io::Result<()> {
        self.frames.push(frame.to_string());
        Ok(())
    }

    fn finish(&mut self, text: &str) -> io::Result<()> {
        self.finished = Some(text.to_string());
        Ok(())
    }
}
