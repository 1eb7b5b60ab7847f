// src/frame.rs

//! The finished character grid handed to the display.

use std::fmt;

use crate::projection::Viewport;

/// Glyph used for cells no fragment wrote to.
pub const BLANK_GLYPH: u8 = b' ';

/// A row-major grid of ASCII glyphs sized to a viewport.
///
/// Glyphs are stored as bytes: every glyph the rasterizer can emit is ASCII,
/// and cached frames are the dominant memory cost of the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameGrid {
    viewport: Viewport,
    cells: Vec<u8>,
}

impl FrameGrid {
    /// Creates a grid filled with [`BLANK_GLYPH`].
    pub fn blank(viewport: Viewport) -> Self {
        Self {
            viewport,
            cells: vec![BLANK_GLYPH; viewport.area()],
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn width(&self) -> usize {
        self.viewport.width()
    }

    pub fn height(&self) -> usize {
        self.viewport.height()
    }

    /// Glyph at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        self.index(x, y).map(|i| char::from(self.cells[i]))
    }

    /// Writes a glyph, ignoring coordinates outside the grid.
    pub fn set(&mut self, x: usize, y: usize, glyph: u8) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = glyph;
        }
    }

    /// Iterates over rows as byte slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact panics on a zero chunk size.
        self.cells.chunks_exact(self.width().max(1)).take(self.height())
    }

    /// Number of non-blank cells.
    pub fn lit_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c != BLANK_GLYPH).count()
    }

    /// Approximate heap footprint, used for cache sizing logs.
    pub fn byte_size(&self) -> usize {
        self.cells.len()
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width() && y < self.height() {
            Some(y * self.width() + x)
        } else {
            None
        }
    }
}

impl fmt::Display for FrameGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            // Rows only ever contain ASCII glyphs.
            f.write_str(&String::from_utf8_lossy(row))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn blank_grid_is_all_spaces() {
        let grid = FrameGrid::blank(Viewport::new(4, 3));
        assert_eq!(grid.lit_cells(), 0);
        assert_eq!(grid.rows().count(), 3);
        assert!(grid.rows().all(|row| row == b"    "));
    }

    #[test]
    fn set_and_get_are_row_major() {
        let mut grid = FrameGrid::blank(Viewport::new(3, 2));
        grid.set(2, 1, b'@');
        grid.set(5, 5, b'#');
        assert_eq!(grid.get(2, 1), Some('@'));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.to_string(), "   \n  @");
        assert_eq!(grid.lit_cells(), 1);
    }

    #[test]
    fn zero_width_grid_has_no_rows_content() {
        let grid = FrameGrid::blank(Viewport::new(0, 2));
        assert_eq!(grid.rows().count(), 0);
        assert_eq!(grid.to_string(), "");
    }
}
