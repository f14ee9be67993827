//! Occupancy grid: a fixed-size, row-major map of free and blocked cells.
//!
//! The grid is built once before planning (usually by
//! [`OccupancyGrid::parse_scene`]) and is read-only afterwards. Point
//! queries truncate world coordinates to the covering cell; any query
//! outside `[0, width) x [0, height)` is a [`PlannerError::OutOfBounds`].

use crate::types::{PlannerError, Point};

/// Character marking a blocked cell in scene text.
pub const BLOCKED_CHAR: char = '#';

/// Character used when rendering a free cell.
pub const FREE_CHAR: char = '_';

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Traversable.
    Free,
    /// Obstacle.
    Blocked,
}

impl Cell {
    /// Interpret a scene character: `#` is blocked, anything else is free.
    #[must_use]
    pub const fn from_char(c: char) -> Self {
        if c == BLOCKED_CHAR {
            Self::Blocked
        } else {
            Self::Free
        }
    }

    /// Render the cell as a scene character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Free => FREE_CHAR,
            Self::Blocked => BLOCKED_CHAR,
        }
    }
}

/// A width x height map of [`Cell`]s stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl OccupancyGrid {
    /// Build a grid from row-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidScene`] if either dimension is zero
    /// or `cells.len() != width * height`.
    pub fn new(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, PlannerError> {
        if width == 0 || height == 0 {
            return Err(PlannerError::InvalidScene(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        let expected = cell_count(width, height)?;
        if cells.len() != expected {
            return Err(PlannerError::InvalidScene(format!(
                "a {width}x{height} grid needs {expected} cells, got {}",
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a grid from one string per row (top row first).
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidScene`] if there are no rows or the
    /// rows differ in length.
    pub fn from_rows(rows: &[&str]) -> Result<Self, PlannerError> {
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut cells = Vec::with_capacity(width * rows.len());
        for (i, row) in rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(PlannerError::InvalidScene(format!(
                    "row {i} has {len} cells, expected {width}"
                )));
            }
            cells.extend(row.chars().map(Cell::from_char));
        }
        Self::new(width, rows.len(), cells)
    }

    /// Parse a textual scene description.
    ///
    /// The first line holds the width and the second the height, both
    /// in decimal. They are followed by `width * height` cell characters
    /// in row-major order; whitespace between cells (including newlines)
    /// is skipped, so rows need not be line-aligned. Characters beyond the
    /// last cell are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidScene`] if a dimension line is
    /// missing or not a positive integer, or the cell data is truncated.
    pub fn parse_scene(text: &str) -> Result<Self, PlannerError> {
        let (width, rest) = take_dimension(text, "width")?;
        let (height, rest) = take_dimension(rest, "height")?;
        let expected = cell_count(width, height)?;

        let cells: Vec<Cell> = rest
            .chars()
            .filter(|c| !c.is_whitespace())
            .take(expected)
            .map(Cell::from_char)
            .collect();
        if cells.len() < expected {
            return Err(PlannerError::InvalidScene(format!(
                "expected {expected} cells for a {width}x{height} grid, found {}",
                cells.len()
            )));
        }

        Self::new(width, height, cells)
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell at column `col`, row `row`, if inside the grid.
    #[must_use]
    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row * self.width + col).copied()
    }

    /// Number of free cells.
    #[must_use]
    pub fn free_cell_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Free).count()
    }

    /// Returns `true` if `point` lies within `[0, width) x [0, height)`.
    ///
    /// Non-finite coordinates are never contained.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn contains(&self, point: Point) -> bool {
        (0.0..self.width as f64).contains(&point.x) && (0.0..self.height as f64).contains(&point.y)
    }

    /// Row-major index of the cell covering `point`.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::OutOfBounds`] if `point` is outside the grid.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cell_index(&self, point: Point) -> Result<usize, PlannerError> {
        if !self.contains(point) {
            return Err(self.out_of_bounds(point));
        }
        // `contains` guarantees both coordinates are non-negative and
        // below the dimension, so truncation lands on a valid cell.
        let col = point.x as usize;
        let row = point.y as usize;
        Ok(row * self.width + col)
    }

    /// Whether the cell covering `point` is blocked.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::OutOfBounds`] if `point` is outside the grid.
    pub fn is_blocked(&self, point: Point) -> Result<bool, PlannerError> {
        let index = self.cell_index(point)?;
        self.cells
            .get(index)
            .map(|&c| c == Cell::Blocked)
            .ok_or_else(|| self.out_of_bounds(point))
    }

    const fn out_of_bounds(&self, point: Point) -> PlannerError {
        PlannerError::OutOfBounds {
            x: point.x,
            y: point.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// `width * height`, rejecting overflow.
fn cell_count(width: usize, height: usize) -> Result<usize, PlannerError> {
    width.checked_mul(height).ok_or_else(|| {
        PlannerError::InvalidScene(format!("grid of {width}x{height} cells is too large"))
    })
}

/// Split the next line off `text` and parse it as a positive dimension.
fn take_dimension<'a>(text: &'a str, name: &str) -> Result<(usize, &'a str), PlannerError> {
    if text.is_empty() {
        return Err(PlannerError::InvalidScene(format!("missing {name} line")));
    }
    let (line, rest) = text.split_once('\n').unwrap_or((text, ""));
    let trimmed = line.trim();
    let value: usize = trimmed.parse().map_err(|e| {
        PlannerError::InvalidScene(format!("invalid {name} {trimmed:?}: {e}"))
    })?;
    if value == 0 {
        return Err(PlannerError::InvalidScene(format!(
            "{name} must be positive"
        )));
    }
    Ok((value, rest))
}
