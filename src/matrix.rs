//! Numeric Grid
//!
//! Fixed-shape numeric matrices used for bus and line data. A `Matrix` is
//! an immutable snapshot: edits and pastes produce a new value and leave
//! the original untouched.

use crate::error::{LrDetectError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Bus data shape (33 buses × 3 columns)
pub const BUS_ROWS: usize = 33;
pub const BUS_COLS: usize = 3;

/// Line data shape (32 lines × 4 columns)
pub const LINE_ROWS: usize = 32;
pub const LINE_COLS: usize = 4;

/// Separators accepted between pasted values
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,]+").expect("valid regex"));

/// Longest numeric prefix of a token, the way a browser's `parseFloat` reads it
static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("valid regex")
});

/// Row-major numeric grid with a fixed shape
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl Matrix {
    /// All-zero grid
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    /// Grid seeded from caller-owned rows; absent or short rows fill with 0
    pub fn from_rows(rows: usize, cols: usize, seed: &[Vec<f64>]) -> Self {
        let mut matrix = Self::zeros(rows, cols);
        for (r, row) in seed.iter().take(rows).enumerate() {
            for (c, value) in row.iter().take(cols).enumerate() {
                matrix.cells[r * cols + c] = *value;
            }
        }
        matrix
    }

    pub fn bus_default() -> Self {
        Self::zeros(BUS_ROWS, BUS_COLS)
    }

    pub fn line_default() -> Self {
        Self::zeros(LINE_ROWS, LINE_COLS)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells the grid holds (rows × cols)
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Nested rows, the shape the analysis backend expects
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.cells
            .chunks(self.cols.max(1))
            .take(self.rows)
            .map(<[f64]>::to_vec)
            .collect()
    }

    /// Copy of this grid with one cell overwritten.
    /// Out-of-range coordinates yield an unchanged copy.
    pub fn with_cell(&self, row: usize, col: usize, value: f64) -> Self {
        let mut next = self.clone();
        if row < self.rows && col < self.cols {
            next.cells[row * self.cols + col] = value;
        }
        next
    }

    /// Re-fill the grid from clipboard text.
    ///
    /// The text is split on whitespace and commas and each token is read as a
    /// float prefix; tokens with no numeric prefix are dropped. The paste is
    /// accepted only when exactly rows×cols values remain. A single-row grid
    /// comes back as a column: one single-value row per pasted value.
    pub fn paste(&self, text: &str) -> Result<Self> {
        let values = parse_numeric_tokens(text);
        let expected = self.capacity();

        if values.len() != expected {
            return Err(LrDetectError::PasteCount {
                expected,
                found: values.len(),
            });
        }

        if self.rows == 1 {
            return Ok(Self {
                rows: self.cols,
                cols: 1,
                cells: values,
            });
        }

        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            cells: values,
        })
    }
}

/// Tokenize pasted text into numbers, discarding non-numeric tokens
pub fn parse_numeric_tokens(text: &str) -> Vec<f64> {
    SEPARATORS
        .split(text.trim())
        .filter_map(parse_float_prefix)
        .collect()
}

/// Parse the leading numeric part of a token (`"3px"` → 3.0, `"px"` → None)
pub fn parse_float_prefix(token: &str) -> Option<f64> {
    let m = NUMERIC_PREFIX.find(token.trim_start())?;
    m.as_str().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults_have_fixed_shape() {
        let bus = Matrix::bus_default();
        assert_eq!((bus.rows(), bus.cols()), (33, 3));
        assert!(bus.to_rows().iter().all(|r| r.len() == 3 && r.iter().all(|v| *v == 0.0)));

        let line = Matrix::line_default();
        assert_eq!((line.rows(), line.cols()), (32, 4));
        assert_eq!(line.to_rows().len(), 32);
    }

    #[test]
    fn test_from_rows_defaults_absent_cells() {
        let seed = vec![vec![1.0, 2.0, 7.0], vec![3.0]];
        let m = Matrix::from_rows(3, 2, &seed);
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 0.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn test_with_cell_does_not_mutate_original() {
        let original = Matrix::zeros(2, 2);
        let edited = original.with_cell(1, 0, 4.5);
        assert_eq!(original.get(1, 0), Some(0.0));
        assert_eq!(edited.get(1, 0), Some(4.5));
    }

    #[test]
    fn test_with_cell_out_of_range_is_noop() {
        let original = Matrix::zeros(2, 2);
        assert_eq!(original.with_cell(5, 5, 1.0), original);
    }

    #[test]
    fn test_paste_fills_row_major() {
        let m = Matrix::zeros(2, 3);
        let pasted = m.paste("1 2 3\n4 5 6").expect("six values fit a 2x3 grid");
        assert_eq!(pasted.to_rows(), vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_paste_wrong_count_reports_required_total() {
        let m = Matrix::zeros(2, 3);
        let err = m.paste("1 2 3 4 5").expect_err("five values must be rejected");
        assert!(err.to_string().contains('6'));
        match err {
            LrDetectError::PasteCount { expected, found } => {
                assert_eq!(expected, 6);
                assert_eq!(found, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_paste_accepts_commas_and_tabs() {
        let m = Matrix::zeros(2, 2);
        let pasted = m.paste("1,2\t3 , 4").expect("four values");
        assert_eq!(pasted.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_paste_drops_non_numeric_tokens() {
        let m = Matrix::zeros(1, 2);
        let pasted = m.paste("bus 1.5 kw -2").expect("two numeric tokens");
        // single-row grids come back as a column
        assert_eq!(pasted.to_rows(), vec![vec![1.5], vec![-2.0]]);
        assert_eq!((pasted.rows(), pasted.cols()), (2, 1));
    }

    #[test]
    fn test_paste_empty_text_rejected() {
        let m = Matrix::zeros(1, 1);
        assert!(m.paste("   ").is_err());
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("3px"), Some(3.0));
        assert_eq!(parse_float_prefix("-0.25"), Some(-0.25));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("1e3"), Some(1000.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix(""), None);
    }

    proptest! {
        #[test]
        fn prop_successful_paste_matches_token_order(
            rows in 2usize..6,
            cols in 1usize..5,
            seed in proptest::collection::vec(-1.0e6f64..1.0e6, 30),
        ) {
            let values: Vec<f64> = seed.iter().copied().take(rows * cols).collect();
            prop_assume!(values.len() == rows * cols);
            let text = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");

            let pasted = Matrix::zeros(rows, cols).paste(&text).expect("exact count");
            prop_assert_eq!(pasted.rows(), rows);
            prop_assert_eq!(pasted.cols(), cols);
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(pasted.get(i / cols, i % cols), Some(*v));
            }
        }

        #[test]
        fn prop_failed_paste_leaves_grid_identical(
            extra in 1usize..4,
            fill in -100.0f64..100.0,
        ) {
            let grid = Matrix::zeros(3, 2).with_cell(1, 1, fill);
            let before = grid.clone();
            let text = vec!["7"; 6 + extra].join(" ");
            prop_assert!(grid.paste(&text).is_err());
            prop_assert_eq!(grid, before);
        }
    }
}
