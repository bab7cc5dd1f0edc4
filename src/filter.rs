use crate::color::{color_distance, BLACK, GREEN, WHITE};
use crate::{FilterError, FilterResult, PixelGrid};
use log::{debug, trace};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

pub const MIN_RADIUS: i32 = 1;
pub const MAX_RADIUS: i32 = 100;
pub const DEFAULT_RADIUS: i32 = 5;
pub const DEFAULT_THRESHOLD: i32 = 30;
pub const DEFAULT_TOLERANCE: i32 = 30;

/// Rejected scatter draws allowed before falling back to the clipped window.
const MAX_REJECTIONS: usize = 64;

const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Source of uniformly distributed integers, injected into [`scatter`].
pub trait RandomSource {
    /// Returns an integer in the closed range `lo..=hi`.
    fn next_int_in_range(&mut self, lo: i64, hi: i64) -> i64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_int_in_range(&mut self, lo: i64, hi: i64) -> i64 {
        self.random_range(lo..=hi)
    }
}

/// Replaces every cell with a random cell from the square window of the given
/// radius around it. Draws that land outside the grid are redrawn, so cells
/// near the border favour interior sources.
pub fn scatter<S: RandomSource + ?Sized>(
    grid: &PixelGrid,
    radius: i32,
    rng: &mut S,
) -> FilterResult<PixelGrid> {
    if !(MIN_RADIUS..=MAX_RADIUS).contains(&radius) {
        return Err(FilterError::InvalidParameter {
            name: "radius",
            value: radius as i64,
            expected: "an integer in [1, 100]",
        });
    }

    let radius = radius as i64;
    let output = PixelGrid::from_fn(grid.rows(), grid.cols(), |row, col| {
        let (src_row, src_col) = scatter_source(grid, row as i64, col as i64, radius, rng);
        grid[(src_row, src_col)]
    });
    debug!("scatter: {}x{} radius {}", grid.rows(), grid.cols(), radius);
    Ok(output)
}

fn scatter_source<S: RandomSource + ?Sized>(
    grid: &PixelGrid,
    row: i64,
    col: i64,
    radius: i64,
    rng: &mut S,
) -> (usize, usize) {
    for _ in 0..MAX_REJECTIONS {
        let r = rng.next_int_in_range(row - radius, row + radius);
        let c = rng.next_int_in_range(col - radius, col + radius);
        if grid.in_bounds(r, c) {
            return (r as usize, c as usize);
        }
    }

    // Row and column are drawn independently, so rejecting until both land is
    // the same as drawing each uniformly from the window clipped to the grid.
    trace!("scatter: clipped draw at ({row}, {col})");
    let last_row = grid.rows() as i64 - 1;
    let last_col = grid.cols() as i64 - 1;
    let r = rng.next_int_in_range((row - radius).max(0), (row + radius).min(last_row));
    let c = rng.next_int_in_range((col - radius).max(0), (col + radius).min(last_col));
    (r as usize, c as usize)
}

/// Marks a cell black when any of its in-bounds 8-neighbours differs from it
/// by more than `threshold`, white otherwise.
pub fn edge_detect(grid: &PixelGrid, threshold: i32) -> FilterResult<PixelGrid> {
    require_positive("threshold", threshold)?;

    let mut edges = 0usize;
    let output = PixelGrid::from_fn(grid.rows(), grid.cols(), |row, col| {
        let center = grid[(row, col)];
        let is_edge = NEIGHBORS.iter().any(|&(dr, dc)| {
            let (r, c) = (row as i64 + dr, col as i64 + dc);
            grid.in_bounds(r, c) && color_distance(grid[(r as usize, c as usize)], center) > threshold
        });
        if is_edge {
            edges += 1;
            BLACK
        } else {
            WHITE
        }
    });
    debug!("edge_detect: {edges} edge cells at threshold {threshold}");
    Ok(output)
}

/// Lays `overlay` over `background` with its top-left corner at
/// `(place_row, place_col)`. Overlay cells within `tolerance` of pure green
/// let the background through; parts of the overlay that fall outside the
/// background are cropped.
pub fn green_screen_composite(
    background: &PixelGrid,
    overlay: &PixelGrid,
    tolerance: i32,
    place_row: i64,
    place_col: i64,
) -> FilterResult<PixelGrid> {
    require_positive("tolerance", tolerance)?;

    let output = PixelGrid::from_fn(background.rows(), background.cols(), |row, col| {
        // A placement near i64::MIN/MAX cannot be subtracted; that cell is off the overlay.
        let offset = (row as i64)
            .checked_sub(place_row)
            .zip((col as i64).checked_sub(place_col))
            .filter(|&(r, c)| overlay.in_bounds(r, c));
        if let Some((r, c)) = offset {
            let sticker = overlay[(r as usize, c as usize)];
            if color_distance(sticker, GREEN) > tolerance {
                return sticker;
            }
        }
        background[(row, col)]
    });
    debug!(
        "green_screen_composite: {}x{} overlay at ({place_row}, {place_col})",
        overlay.rows(),
        overlay.cols()
    );
    Ok(output)
}

/// Number of positions whose colors differ. Both grids must have the same
/// dimensions.
pub fn count_differing_pixels(a: &PixelGrid, b: &PixelGrid) -> FilterResult<usize> {
    if a.dimensions() != b.dimensions() {
        return Err(FilterError::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }
    Ok(a.cells().zip(b.cells()).filter(|(x, y)| x != y).count())
}

fn require_positive(name: &'static str, value: i32) -> FilterResult<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(FilterError::InvalidParameter {
            name,
            value: value as i64,
            expected: "an integer > 0",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Scatter,
    EdgeDetect,
    GreenScreen,
    Compare,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Scatter,
        FilterKind::EdgeDetect,
        FilterKind::GreenScreen,
        FilterKind::Compare,
    ];

    pub fn menu_number(self) -> u8 {
        match self {
            FilterKind::Scatter => 1,
            FilterKind::EdgeDetect => 2,
            FilterKind::GreenScreen => 3,
            FilterKind::Compare => 4,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilterKind::Scatter => "Scatter",
            FilterKind::EdgeDetect => "Edge Detection",
            FilterKind::GreenScreen => "\"Green Screen\" with another image",
            FilterKind::Compare => "Compare image with another image",
        };
        f.write_str(label)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown filter: {0:?}")]
pub struct UnknownFilter(pub String);

impl FromStr for FilterKind {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "scatter" => Ok(FilterKind::Scatter),
            "2" | "edges" | "edge" | "edge-detect" => Ok(FilterKind::EdgeDetect),
            "3" | "green-screen" | "greenscreen" => Ok(FilterKind::GreenScreen),
            "4" | "compare" => Ok(FilterKind::Compare),
            _ => Err(UnknownFilter(s.to_string())),
        }
    }
}

/// A fully parameterised filter, ready to run against a grid.
#[derive(Debug, Clone)]
pub enum Filter {
    Scatter {
        radius: i32,
    },
    EdgeDetect {
        threshold: i32,
    },
    GreenScreen {
        overlay: PixelGrid,
        tolerance: i32,
        place_row: i64,
        place_col: i64,
    },
    Compare {
        other: PixelGrid,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutput {
    Grid(PixelGrid),
    Count(usize),
}

impl Filter {
    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::Scatter { .. } => FilterKind::Scatter,
            Filter::EdgeDetect { .. } => FilterKind::EdgeDetect,
            Filter::GreenScreen { .. } => FilterKind::GreenScreen,
            Filter::Compare { .. } => FilterKind::Compare,
        }
    }

    pub fn apply<S: RandomSource + ?Sized>(
        &self,
        grid: &PixelGrid,
        rng: &mut S,
    ) -> FilterResult<FilterOutput> {
        match self {
            Filter::Scatter { radius } => scatter(grid, *radius, rng).map(FilterOutput::Grid),
            Filter::EdgeDetect { threshold } => {
                edge_detect(grid, *threshold).map(FilterOutput::Grid)
            }
            Filter::GreenScreen {
                overlay,
                tolerance,
                place_row,
                place_col,
            } => green_screen_composite(grid, overlay, *tolerance, *place_row, *place_col)
                .map(FilterOutput::Grid),
            Filter::Compare { other } => count_differing_pixels(grid, other).map(FilterOutput::Count),
        }
    }
}
