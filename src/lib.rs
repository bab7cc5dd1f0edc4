pub mod color;
pub mod display;
pub mod filter;
pub mod grid;
pub mod image_io;
pub mod prompt;

pub use color::{color_distance, Color};
pub use grid::PixelGrid;

pub type FilterResult<T> = Result<T, FilterError>;

#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    #[error("Invalid parameter: {name} = {value}, expected {expected}")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        expected: &'static str,
    },
    #[error("Dimension mismatch: {left:?} vs {right:?} (rows, cols)")]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("Ragged rows: row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
