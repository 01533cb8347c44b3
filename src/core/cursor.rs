//! Cursor state management
//!
//! The cursor tracks position and supports save/restore (CSI s/u).
//! Bounds are enforced by the terminal executor, which knows the
//! configured maximum dimensions.

use serde::{Deserialize, Serialize};

/// Cursor position with one saved slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub col: usize,
    /// Row position (0-indexed)
    pub row: usize,
    saved_col: usize,
    saved_row: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the top-left corner
    pub fn home(&mut self) {
        self.col = 0;
        self.row = 0;
    }

    /// Save the current position (CSI s)
    pub fn save(&mut self) {
        self.saved_col = self.col;
        self.saved_row = self.row;
    }

    /// Restore the saved position (CSI u)
    pub fn restore(&mut self) {
        self.col = self.saved_col;
        self.row = self.saved_row;
    }
}
