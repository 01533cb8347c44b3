//! Screen Buffer
//!
//! A fixed-size, row-major grid of packed cells. The buffer is allocated
//! once at its final size; scrolling and line/character insertion shift its
//! own contents and never reallocate. Every operation clamps to the grid, so
//! cursor positions past the edge are harmless.

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use crate::codepage;

/// Erase mode for ED (CSI J) and EL (CSI K)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EraseMode {
    /// From the cursor to the end (mode 0)
    ToEnd,
    /// From the start up to the cursor (mode 1)
    ToStart,
    /// Everything (mode 2)
    All,
}

impl EraseMode {
    pub fn from_param(mode: u16) -> Option<Self> {
        match mode {
            0 => Some(EraseMode::ToEnd),
            1 => Some(EraseMode::ToStart),
            2 => Some(EraseMode::All),
            _ => None,
        }
    }
}

/// The screen buffer - a 2D array of cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBuffer {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl ScreenBuffer {
    /// Create a buffer filled with untouched default cells
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cells: vec![Cell::BLANK; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get a cell
    pub fn get(&self, col: usize, row: usize) -> Option<Cell> {
        if col < self.cols && row < self.rows {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Write a cell. Returns false when the position is outside the grid.
    pub fn set(&mut self, col: usize, row: usize, cell: Cell) -> bool {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = cell;
            true
        } else {
            false
        }
    }

    /// Get a row of cells
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        if row < self.rows {
            let start = row * self.cols;
            Some(&self.cells[start..start + self.cols])
        } else {
            None
        }
    }

    /// Iterate over all rows, top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }

    /// Row contents as text, untouched cells shown as spaces
    pub fn row_text(&self, row: usize) -> String {
        self.row(row)
            .map(|cells| {
                cells
                    .iter()
                    .map(|c| codepage::glyph(if c.is_untouched() { b' ' } else { c.codepoint() }))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fill a linear cell range, clamped to the buffer
    pub fn fill(&mut self, start: usize, end: usize, cell: Cell) {
        let len = self.cells.len();
        let (start, end) = (start.min(len), end.min(len));
        if start < end {
            self.cells[start..end].fill(cell);
        }
    }

    /// Linear index of a position, with the column clamped to the row
    fn offset(&self, col: usize, row: usize) -> usize {
        row.saturating_mul(self.cols)
            .saturating_add(col.min(self.cols))
    }

    /// Erase in display (CSI J)
    pub fn erase_in_display(&mut self, mode: EraseMode, col: usize, row: usize, blank: Cell) {
        let cursor = self.offset(col, row);
        match mode {
            EraseMode::ToEnd => self.fill(cursor, self.cells.len(), blank),
            EraseMode::ToStart => self.fill(0, cursor, blank),
            EraseMode::All => self.fill(0, self.cells.len(), blank),
        }
    }

    /// Erase in line (CSI K)
    pub fn erase_in_line(&mut self, mode: EraseMode, col: usize, row: usize, blank: Cell) {
        if row >= self.rows {
            return;
        }
        let line_start = row * self.cols;
        let line_end = line_start + self.cols;
        let cursor = self.offset(col, row);
        match mode {
            EraseMode::ToEnd => self.fill(cursor, line_end, blank),
            EraseMode::ToStart => self.fill(line_start, cursor, blank),
            EraseMode::All => self.fill(line_start, line_end, blank),
        }
    }

    /// Insert blank lines at `row`, pushing the rows below down (CSI L)
    pub fn insert_lines(&mut self, row: usize, count: usize, blank: Cell) {
        if row >= self.rows {
            return;
        }
        let count = count.min(self.rows - row);
        let cols = self.cols;
        self.cells
            .copy_within(row * cols..(self.rows - count) * cols, (row + count) * cols);
        self.fill(row * cols, (row + count) * cols, blank);
    }

    /// Delete lines at `row`, pulling the rows below up (CSI M)
    pub fn delete_lines(&mut self, row: usize, count: usize, blank: Cell) {
        if row >= self.rows {
            return;
        }
        let count = count.min(self.rows - row);
        let cols = self.cols;
        self.cells
            .copy_within((row + count) * cols..self.rows * cols, row * cols);
        self.fill((self.rows - count) * cols, self.rows * cols, blank);
    }

    /// Delete characters at the cursor, shifting the rest of the row left (CSI P)
    pub fn delete_chars(&mut self, col: usize, row: usize, count: usize, blank: Cell) {
        if row >= self.rows || col >= self.cols {
            return;
        }
        let count = count.min(self.cols - col);
        let start = row * self.cols + col;
        let line_end = (row + 1) * self.cols;
        self.cells.copy_within(start + count..line_end, start);
        self.fill(line_end - count, line_end, blank);
    }

    /// Blank characters at the cursor without shifting (CSI X)
    pub fn erase_chars(&mut self, col: usize, row: usize, count: usize, blank: Cell) {
        if row >= self.rows {
            return;
        }
        let start = self.offset(col, row);
        let line_end = (row + 1) * self.cols;
        self.fill(start, start.saturating_add(count).min(line_end), blank);
    }

    /// Scroll the whole buffer up, blanking the bottom rows (CSI S)
    pub fn scroll_up(&mut self, count: usize, blank: Cell) {
        let count = count.min(self.rows);
        let cols = self.cols;
        self.cells.copy_within(count * cols.., 0);
        self.fill((self.rows - count) * cols, self.rows * cols, blank);
    }

    /// Scroll the whole buffer down, blanking the top rows (CSI T)
    pub fn scroll_down(&mut self, count: usize, blank: Cell) {
        let count = count.min(self.rows);
        let cols = self.cols;
        self.cells
            .copy_within(0..(self.rows - count) * cols, count * cols);
        self.fill(0, count * cols, blank);
    }
}
