use crate::{Color, FilterError, FilterResult};
use std::ops::Index;

/// A rows × cols grid of packed colors, stored row-major.
///
/// Dimensions are fixed at construction and there is no mutable access;
/// filters build a new grid with [`PixelGrid::from_fn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Color>,
}

fn cell_count(rows: usize, cols: usize) -> usize {
    rows.checked_mul(cols)
        .unwrap_or_else(|| panic!("{rows}x{cols} grid overflows usize"))
}

impl PixelGrid {
    /// # Panics
    ///
    /// If `rows * cols` overflows `usize`.
    pub fn new(rows: usize, cols: usize, fill: Color) -> Self {
        Self {
            rows,
            cols,
            cells: vec![fill; cell_count(rows, cols)],
        }
    }

    /// Calls `f(row, col)` for every cell in row-major order.
    ///
    /// # Panics
    ///
    /// If `rows * cols` overflows `usize`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> Color) -> Self {
        let mut cells = Vec::with_capacity(cell_count(rows, cols));
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(row, col));
            }
        }
        Self { rows, cols, cells }
    }

    /// Builds a grid from nested rows. Every row must be as long as the first.
    pub fn from_rows(rows: Vec<Vec<Color>>) -> FilterResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let num_rows = rows.len();
        let mut cells = Vec::with_capacity(num_rows * cols);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(FilterError::RaggedRows {
                    row: index,
                    expected: cols,
                    found: row.len(),
                });
            }
            cells.extend(row);
        }
        Ok(Self {
            rows: num_rows,
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn in_bounds(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as u64) < self.rows as u64 && (col as u64) < self.cols as u64
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Color> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Color> + '_ {
        self.cells.iter().copied()
    }

    /// A copy with exactly one cell replaced.
    pub fn with_cell(&self, row: usize, col: usize, color: Color) -> Self {
        Self::from_fn(self.rows, self.cols, |r, c| {
            if (r, c) == (row, col) {
                color
            } else {
                self[(r, c)]
            }
        })
    }
}

impl Index<(usize, usize)> for PixelGrid {
    type Output = Color;

    fn index(&self, (row, col): (usize, usize)) -> &Color {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        &self.cells[row * self.cols + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};

    #[test]
    fn from_fn_is_row_major() {
        let grid = PixelGrid::from_fn(2, 3, |r, c| Color::from_packed((r * 10 + c) as u32));
        assert_eq!(grid.dimensions(), (2, 3));
        assert_eq!(grid[(1, 2)], Color::from_packed(12));
        let packed: Vec<u32> = grid.cells().map(Color::packed).collect();
        assert_eq!(packed, vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = PixelGrid::from_rows(vec![vec![WHITE, WHITE], vec![BLACK]]).unwrap_err();
        assert!(matches!(
            err,
            FilterError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn from_rows_accepts_rectangular_input() {
        let grid = PixelGrid::from_rows(vec![vec![WHITE, BLACK], vec![BLACK, WHITE]]).unwrap();
        assert_eq!(grid.dimensions(), (2, 2));
        assert_eq!(grid[(0, 1)], BLACK);
    }

    #[test]
    fn bounds_checks() {
        let grid = PixelGrid::new(2, 3, WHITE);
        assert!(grid.in_bounds(1, 2));
        assert!(!grid.in_bounds(-1, 0));
        assert!(!grid.in_bounds(2, 0));
        assert!(!grid.in_bounds(0, 3));
        assert_eq!(grid.get(5, 0), None);
    }

    #[test]
    #[should_panic(expected = "overflows usize")]
    fn oversized_dimensions_panic_before_allocating() {
        PixelGrid::new(usize::MAX, 2, WHITE);
    }

    #[test]
    #[should_panic(expected = "overflows usize")]
    fn oversized_from_fn_panics_before_allocating() {
        PixelGrid::from_fn(2, usize::MAX, |_, _| WHITE);
    }

    #[test]
    fn with_cell_leaves_original_untouched() {
        let grid = PixelGrid::new(2, 2, WHITE);
        let changed = grid.with_cell(0, 1, BLACK);
        assert_eq!(grid[(0, 1)], WHITE);
        assert_eq!(changed[(0, 1)], BLACK);
        assert_eq!(changed[(1, 1)], WHITE);
    }
}
