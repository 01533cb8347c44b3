//! Terminal Executor
//!
//! Ties together the parser and the screen model and applies parsed
//! actions to update the terminal state.
//!
//! The same executor serves both passes over a stream. Without a buffer
//! (measuring) it runs all cursor arithmetic and only records the furthest
//! position a character was printed at; with a buffer (rendering) it draws.

use crate::core::{Cursor, EraseMode, Pen, ScreenBuffer};
use crate::parser::{Action, ControlCode, CsiAction, Parser};

const TAB_WIDTH: usize = 8;

/// Terminal executor that processes parsed actions and updates the screen
#[derive(Debug)]
pub struct Terminal {
    parser: Parser,
    pen: Pen,
    cursor: Cursor,
    /// `None` while measuring
    buffer: Option<ScreenBuffer>,
    /// Wrap column and scroll row
    max_cols: usize,
    max_rows: usize,
    /// Furthest column/row a character was printed at
    max_col_seen: usize,
    max_row_seen: usize,
    transparency: bool,
    end_of_text: bool,
    metadata: Vec<String>,
    pending_bells: usize,
}

impl Terminal {
    /// Create an executor that only measures the extent of its input
    pub fn measuring(max_cols: usize, max_rows: usize) -> Self {
        Self::with_buffer(None, max_cols, max_rows, false)
    }

    /// Create an executor that draws into a `cols` x `rows` buffer
    pub fn rendering(
        cols: usize,
        rows: usize,
        max_cols: usize,
        max_rows: usize,
        transparency: bool,
    ) -> Self {
        Self::with_buffer(
            Some(ScreenBuffer::new(cols, rows)),
            max_cols,
            max_rows,
            transparency,
        )
    }

    fn with_buffer(
        buffer: Option<ScreenBuffer>,
        max_cols: usize,
        max_rows: usize,
        transparency: bool,
    ) -> Self {
        Self {
            parser: Parser::new(),
            pen: Pen::default(),
            cursor: Cursor::new(),
            buffer,
            max_cols: max_cols.max(1),
            max_rows: max_rows.max(1),
            max_col_seen: 0,
            max_row_seen: 0,
            transparency,
            end_of_text: false,
            metadata: Vec::new(),
            pending_bells: 0,
        }
    }

    pub fn is_measuring(&self) -> bool {
        self.buffer.is_none()
    }

    pub fn buffer(&self) -> Option<&ScreenBuffer> {
        self.buffer.as_ref()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn pen(&self) -> &Pen {
        &self.pen
    }

    /// Columns and rows needed to show everything printed so far
    pub fn extent(&self) -> (usize, usize) {
        (self.max_col_seen + 1, self.max_row_seen + 1)
    }

    /// Whether the end-of-text marker has been reached
    pub fn end_of_text(&self) -> bool {
        self.end_of_text
    }

    /// Metadata strings found after the end-of-text marker
    pub fn metadata(&self) -> &[String] {
        &self.metadata
    }

    /// Number of bells rung since the last call
    pub fn take_bells(&mut self) -> usize {
        std::mem::take(&mut self.pending_bells)
    }

    /// Process a chunk of the input stream
    pub fn process(&mut self, data: &[u8]) {
        let actions = self.parser.parse(data);
        for action in actions {
            self.apply_action(action);
        }
    }

    /// Signal the end of the input stream
    pub fn finish(&mut self) {
        if let Some(action) = self.parser.finish() {
            self.apply_action(action);
        }
    }

    /// Apply a single parsed action
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::Print(codepoint) => self.print(codepoint),
            Action::Control(control) => self.execute_control(control),
            Action::Csi(csi) => self.execute_csi(&csi),
            Action::EndOfText => {
                tracing::debug!("end of text marker");
                self.end_of_text = true;
            }
            Action::Metadata(text) => {
                // Only the rendering pass reports metadata
                if !self.is_measuring() {
                    self.metadata.push(text);
                }
            }
        }
    }

    /// Put a codepoint at the cursor and advance, wrapping at the maximum
    /// width and scrolling once the cursor is past the maximum height
    fn print(&mut self, codepoint: u8) {
        if self.cursor.row >= self.max_rows {
            let overflow = self.cursor.row - self.max_rows + 1;
            let blank = self.blank();
            if let Some(buffer) = &mut self.buffer {
                buffer.scroll_up(overflow, blank);
            }
            self.cursor.row = self.max_rows - 1;
        }

        let (col, row) = (self.cursor.col, self.cursor.row);
        match &mut self.buffer {
            Some(buffer) => {
                buffer.set(col, row, self.pen.cell(codepoint, self.transparency));
            }
            None => {
                self.max_col_seen = self.max_col_seen.max(col);
                self.max_row_seen = self.max_row_seen.max(row);
            }
        }

        self.cursor.col += 1;
        if self.cursor.col >= self.max_cols {
            self.cursor.col = 0;
            self.cursor.row += 1;
        }
    }

    fn blank(&self) -> crate::core::Cell {
        self.pen.blank(self.transparency)
    }

    /// Execute a C0 control character
    fn execute_control(&mut self, control: ControlCode) {
        match control {
            ControlCode::Bell => {
                if !self.is_measuring() {
                    self.pending_bells += 1;
                }
            }
            ControlCode::Backspace => {
                self.cursor.col = self.cursor.col.saturating_sub(1);
            }
            ControlCode::Tab => {
                let next = (self.cursor.col / TAB_WIDTH + 1) * TAB_WIDTH;
                self.cursor.col = next.min(self.max_cols - 1);
            }
            ControlCode::LineFeed => {
                // Overflow is resolved by scrolling at the next print
                self.cursor.row += 1;
            }
            ControlCode::FormFeed => {
                self.erase_in_display(EraseMode::All);
            }
            ControlCode::CarriageReturn => {
                self.cursor.col = 0;
            }
        }
    }

    /// Execute a CSI sequence
    fn execute_csi(&mut self, csi: &CsiAction) {
        let count = csi.param(0, 1) as usize;
        match csi.final_byte {
            b'A' => {
                self.cursor.row = self.cursor.row.saturating_sub(count);
            }
            b'B' => {
                self.cursor.row = (self.cursor.row + count).min(self.max_rows - 1);
            }
            b'C' => {
                self.cursor.col = (self.cursor.col + count).min(self.max_cols - 1);
            }
            b'D' => {
                self.cursor.col = self.cursor.col.saturating_sub(count);
            }
            b'H' | b'f' => {
                let row = csi.param(0, 1) as usize;
                let col = csi.param(1, 1) as usize;
                self.cursor.row = row.min(self.max_rows).saturating_sub(1);
                self.cursor.col = col.min(self.max_cols).saturating_sub(1);
            }
            b'J' => {
                if let Some(mode) = EraseMode::from_param(csi.param(0, 0)) {
                    self.erase_in_display(mode);
                }
            }
            b'K' => {
                if let Some(mode) = EraseMode::from_param(csi.param(0, 0)) {
                    let blank = self.blank();
                    let (col, row) = (self.cursor.col, self.cursor.row);
                    if let Some(buffer) = &mut self.buffer {
                        buffer.erase_in_line(mode, col, row, blank);
                    }
                }
            }
            b'L' => {
                let blank = self.blank();
                let row = self.cursor.row;
                match &mut self.buffer {
                    Some(buffer) => buffer.insert_lines(row, count, blank),
                    None => {
                        // Content below is pushed down, so the screen must grow
                        if row <= self.max_row_seen {
                            self.max_row_seen += count;
                        }
                    }
                }
            }
            b'M' => {
                let blank = self.blank();
                let row = self.cursor.row;
                if let Some(buffer) = &mut self.buffer {
                    buffer.delete_lines(row, count, blank);
                }
            }
            b'P' => {
                let blank = self.blank();
                let (col, row) = (self.cursor.col, self.cursor.row);
                if let Some(buffer) = &mut self.buffer {
                    buffer.delete_chars(col, row, count, blank);
                }
            }
            b'X' => {
                let blank = self.blank();
                let (col, row) = (self.cursor.col, self.cursor.row);
                if let Some(buffer) = &mut self.buffer {
                    buffer.erase_chars(col, row, count, blank);
                }
            }
            b'S' => {
                let blank = self.blank();
                if let Some(buffer) = &mut self.buffer {
                    buffer.scroll_up(count, blank);
                }
            }
            b'T' => {
                let blank = self.blank();
                if let Some(buffer) = &mut self.buffer {
                    buffer.scroll_down(count, blank);
                }
            }
            b'm' => {
                self.pen.apply_sgr(csi.params_or(0));
            }
            b's' => self.cursor.save(),
            b'u' => self.cursor.restore(),
            _ => {
                tracing::trace!(command = %csi.final_char(), "ignoring unsupported CSI command");
            }
        }
    }

    fn erase_in_display(&mut self, mode: EraseMode) {
        let blank = self.blank();
        let (col, row) = (self.cursor.col, self.cursor.row);
        if let Some(buffer) = &mut self.buffer {
            buffer.erase_in_display(mode, col, row, blank);
        }
        if mode == EraseMode::All {
            self.cursor.home();
        }
    }
}
