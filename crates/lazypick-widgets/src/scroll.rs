//! Row cursor and viewport offset for the option panel.
//!
//! `ScrollState` tracks which row is highlighted and which slice of rows is
//! on screen. Moves clamp at both ends rather than wrapping: wrapping from
//! the last row to the first would jump away from the rows that trigger the
//! next page load.

use std::ops::Range;

/// Cursor position and scroll offset over `count` rows, `visible` at a time.
#[derive(Debug, Clone)]
pub struct ScrollState {
    cursor: usize,
    offset: usize,
    count: usize,
    visible: usize,
}

impl ScrollState {
    pub fn new(count: usize, visible: usize) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            count,
            visible,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn offset(&self) -> usize {
        self.offset
    }
    pub fn count(&self) -> usize {
        self.count
    }
    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Indices of the rows currently on screen.
    pub fn window(&self) -> Range<usize> {
        self.offset..(self.offset + self.visible).min(self.count)
    }

    /// Whether the final row is inside the viewport.
    pub fn last_row_visible(&self) -> bool {
        self.count > 0 && self.visible > 0 && self.offset + self.visible >= self.count
    }

    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        if self.count == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        if self.cursor >= self.count {
            self.cursor = self.count - 1;
        }
        self.clamp_offset();
        self.ensure_visible();
    }

    pub fn set_visible(&mut self, visible: usize) {
        self.visible = visible;
        self.clamp_offset();
        self.ensure_visible();
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.ensure_visible();
    }

    pub fn move_down(&mut self) {
        if self.count == 0 {
            return;
        }
        self.cursor = (self.cursor + 1).min(self.count - 1);
        self.ensure_visible();
    }

    pub fn page_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(self.visible.max(1));
        self.ensure_visible();
    }

    pub fn page_down(&mut self) {
        if self.count == 0 {
            return;
        }
        self.cursor = (self.cursor + self.visible.max(1)).min(self.count - 1);
        self.ensure_visible();
    }

    pub fn home(&mut self) {
        self.cursor = 0;
        self.ensure_visible();
    }

    pub fn end(&mut self) {
        if self.count > 0 {
            self.cursor = self.count - 1;
        }
        self.ensure_visible();
    }

    pub fn select(&mut self, index: usize) {
        if self.count == 0 {
            return;
        }
        self.cursor = index.min(self.count - 1);
        self.ensure_visible();
    }

    /// Move the viewport by `rows` (negative is up), dragging the cursor
    /// along when it would leave the screen.
    pub fn scroll_by(&mut self, rows: isize) {
        if self.count == 0 || self.visible == 0 {
            return;
        }
        let max_offset = self.count.saturating_sub(self.visible);
        self.offset = self.offset.saturating_add_signed(rows).min(max_offset);
        let last_on_screen = self.offset + self.visible - 1;
        self.cursor = self.cursor.clamp(self.offset, last_on_screen.min(self.count - 1));
    }

    fn clamp_offset(&mut self) {
        let max_offset = self.count.saturating_sub(self.visible);
        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }

    fn ensure_visible(&mut self) {
        if self.count == 0 || self.visible == 0 {
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + self.visible {
            self.offset = self.cursor + 1 - self.visible;
        }
    }
}
