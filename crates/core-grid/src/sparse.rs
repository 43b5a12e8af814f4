//! In-memory sparse grid host.
//!
//! Rows are ordered maps from column to occupant so `line_extent` is a
//! last-key lookup and ranged removal walks only occupied cells.

use crate::{Cell, GridAccessor, GridMutator, RemovalReport};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: usize, height: usize },
    #[error("cell ({x}, {y}) lies outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("row {row} has {len} cells but the grid is {width} wide")]
    RowTooWide { row: usize, len: usize, width: usize },
}

/// One stored glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub glyph: char,
    /// Protected occupants survive every delete.
    pub protected: bool,
}

impl Occupant {
    pub const fn new(glyph: char) -> Self {
        Self {
            glyph,
            protected: false,
        }
    }
}

type RewardFn = Box<dyn Fn(&Occupant) -> bool + Send + Sync>;

pub struct SparseGrid {
    width: usize,
    height: usize,
    rows: Vec<BTreeMap<usize, Occupant>>,
    reward: RewardFn,
}

impl fmt::Debug for SparseGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("occupied", &self.occupied())
            .finish_non_exhaustive()
    }
}

impl SparseGrid {
    /// Empty grid. Nothing counts toward reward until [`SparseGrid::with_reward`] is used.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            rows: vec![BTreeMap::new(); height],
            reward: Box::new(|_| false),
        })
    }

    /// Build from text rows; spaces are left unoccupied. The grid is as wide as
    /// the longest row.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let width = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        Self::from_rows_sized(rows, width, rows.len())
    }

    /// Build from text rows into a grid of at least `width` x `height`.
    /// Rows wider than `width` are rejected; missing rows stay empty.
    pub fn from_rows_sized<S: AsRef<str>>(
        rows: &[S],
        width: usize,
        height: usize,
    ) -> Result<Self, GridError> {
        let mut grid = Self::new(width, height.max(rows.len()))?;
        for (y, row) in rows.iter().enumerate() {
            let len = row.as_ref().chars().count();
            if len > width {
                return Err(GridError::RowTooWide { row: y, len, width });
            }
            for (x, glyph) in row.as_ref().chars().enumerate() {
                if glyph != ' ' {
                    grid.rows[y].insert(x, Occupant::new(glyph));
                }
            }
        }
        debug!(
            target: "grid",
            width = grid.width,
            height = grid.height,
            occupied = grid.occupied(),
            "grid_built"
        );
        Ok(grid)
    }

    /// Install the host's reward predicate.
    pub fn with_reward<F>(mut self, reward: F) -> Self
    where
        F: Fn(&Occupant) -> bool + Send + Sync + 'static,
    {
        self.reward = Box::new(reward);
        self
    }

    /// Mark every occupant matching `pred` as protected. Returns how many were marked.
    pub fn protect_where<F: Fn(&Occupant) -> bool>(&mut self, pred: F) -> usize {
        let mut marked = 0;
        for occ in self.rows.iter_mut().flat_map(|r| r.values_mut()) {
            if pred(occ) && !occ.protected {
                occ.protected = true;
                marked += 1;
            }
        }
        marked
    }

    pub fn set(&mut self, x: usize, y: usize, occupant: Occupant) -> Result<(), GridError> {
        if x >= self.width || y >= self.height {
            return Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.rows[y].insert(x, occupant);
        Ok(())
    }

    pub fn occupant(&self, x: usize, y: usize) -> Option<&Occupant> {
        self.rows.get(y).and_then(|r| r.get(&x))
    }

    /// Total number of stored occupants.
    pub fn occupied(&self) -> usize {
        self.rows.iter().map(BTreeMap::len).sum()
    }

    /// Render each row as text, empty cells as spaces, trailing spaces trimmed.
    pub fn render_rows(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| {
                let mut line = String::new();
                for (&x, occ) in row {
                    while line.chars().count() < x {
                        line.push(' ');
                    }
                    line.push(occ.glyph);
                }
                line
            })
            .collect()
    }
}

impl GridAccessor for SparseGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn cell_at(&self, x: usize, y: usize) -> Cell {
        self.occupant(x, y).map(|o| o.glyph)
    }

    fn line_extent(&self, y: usize) -> Option<usize> {
        self.rows
            .get(y)
            .and_then(|r| r.last_key_value())
            .map(|(&x, _)| x)
    }

    fn row_has_content(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|r| r.values().any(|o| !o.glyph.is_whitespace()))
    }
}

impl GridMutator for SparseGrid {
    fn remove_range(&mut self, y: usize, x_start: usize, x_end: usize) -> RemovalReport {
        let mut report = RemovalReport::default();
        let Some(row) = self.rows.get_mut(y) else {
            return report;
        };
        if x_start > x_end {
            return report;
        }
        let doomed: Vec<usize> = row
            .range(x_start..=x_end)
            .filter(|(_, o)| !o.protected)
            .map(|(&x, _)| x)
            .collect();
        for x in doomed {
            if let Some(occ) = row.remove(&x) {
                report.removed += 1;
                if (self.reward)(&occ) {
                    report.rewarded = true;
                }
                trace!(target: "grid", x, y, glyph = %occ.glyph, "occupant_removed");
            }
        }
        report
    }
}
