//! Sparse character grid contracts and cursor motion resolution.
//!
//! The interpreter never sees how a host stores its grid. It reads cells
//! through [`GridAccessor`] and removes occupants through the narrower
//! [`GridMutator`] contract; everything else (hashing, indexing, entity
//! bookkeeping) stays behind those two traits. [`SparseGrid`] is the in-memory
//! host used by the binary and the test suites.

pub mod find;
pub mod motion;
mod sparse;

pub use sparse::{GridError, Occupant, SparseGrid};

/// A cell coordinate. Columns grow rightward (`x`), rows grow downward (`y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Clamp into a `width` x `height` grid. A degenerate grid clamps to the origin.
    pub fn clamp_to(&mut self, width: usize, height: usize) {
        self.x = self.x.min(width.saturating_sub(1));
        self.y = self.y.min(height.saturating_sub(1));
    }
}

/// Contents of one grid cell: a stored glyph, or nothing.
pub type Cell = Option<char>;

/// Character class used by word motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellClass {
    /// No stored glyph, or a whitespace glyph.
    Space,
    /// Alphanumeric or underscore.
    Word,
    /// Any other visible glyph.
    Punctuation,
}

/// Classify a cell. An empty cell and a stored space are indistinguishable here.
pub fn classify(cell: Cell) -> CellClass {
    match cell {
        None => CellClass::Space,
        Some(c) if c.is_whitespace() => CellClass::Space,
        Some(c) if c.is_alphanumeric() || c == '_' => CellClass::Word,
        Some(_) => CellClass::Punctuation,
    }
}

/// Read-only view of a host grid.
///
/// Callers clamp coordinates before reading; `cell_at` outside
/// `width() x height()` must still be answered (as empty) but is never produced
/// by the motion resolver itself.
pub trait GridAccessor {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn cell_at(&self, x: usize, y: usize) -> Cell;

    fn class_at(&self, x: usize, y: usize) -> CellClass {
        classify(self.cell_at(x, y))
    }

    /// Last occupied column of row `y`, `None` for an empty row.
    fn line_extent(&self, y: usize) -> Option<usize> {
        (0..self.width())
            .rev()
            .find(|&x| self.cell_at(x, y).is_some())
    }

    /// True when row `y` holds at least one non-space glyph.
    fn row_has_content(&self, y: usize) -> bool {
        (0..self.width()).any(|x| self.class_at(x, y) != CellClass::Space)
    }
}

/// Result of a single ranged removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemovalReport {
    /// Occupants actually removed (protected occupants are never counted).
    pub removed: usize,
    /// True if any removed occupant satisfied the host's reward predicate.
    pub rewarded: bool,
}

impl RemovalReport {
    pub fn merge(self, other: RemovalReport) -> RemovalReport {
        RemovalReport {
            removed: self.removed + other.removed,
            rewarded: self.rewarded || other.rewarded,
        }
    }
}

/// Mutation contract consumed only by the delete operator.
pub trait GridMutator: GridAccessor {
    /// Remove every non-protected occupant of row `y` whose column lies in
    /// `x_start..=x_end`.
    fn remove_range(&mut self, y: usize, x_start: usize, x_end: usize) -> RemovalReport;
}
