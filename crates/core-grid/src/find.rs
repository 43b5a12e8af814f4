//! Char-targeting motions (`f`, `F`, `t`, `T`) and their repeat state.
//!
//! Searches never leave the cursor row. Asking for more occurrences than the
//! row holds lands on the furthest one found instead of failing.

use crate::motion::{MotionResult, MotionStyle};
use crate::{CellClass, GridAccessor, Position};
use tracing::trace;

/// Signature shared by every char-targeting motion.
pub type CharMotionFunc<G> = fn(&G, Position, u32, char) -> MotionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindKind {
    /// `f`: land on the target.
    Find,
    /// `F`: land on the target, searching backward.
    FindBack,
    /// `t`: stop one cell before the target.
    Till,
    /// `T`: stop one cell after the target, searching backward.
    TillBack,
}

impl FindKind {
    pub fn symbol(self) -> char {
        match self {
            FindKind::Find => 'f',
            FindKind::FindBack => 'F',
            FindKind::Till => 't',
            FindKind::TillBack => 'T',
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            FindKind::Find | FindKind::Till => Direction::Forward,
            FindKind::FindBack | FindKind::TillBack => Direction::Backward,
        }
    }

    pub fn is_till(self) -> bool {
        matches!(self, FindKind::Till | FindKind::TillBack)
    }

    /// Same landing rule, opposite direction (`f` <-> `F`, `t` <-> `T`).
    pub fn reversed(self) -> Self {
        match self {
            FindKind::Find => FindKind::FindBack,
            FindKind::FindBack => FindKind::Find,
            FindKind::Till => FindKind::TillBack,
            FindKind::TillBack => FindKind::Till,
        }
    }

    pub fn func<G: GridAccessor + ?Sized>(self) -> CharMotionFunc<G> {
        match self {
            FindKind::Find => find_forward::<G>,
            FindKind::FindBack => find_backward::<G>,
            FindKind::Till => till_forward::<G>,
            FindKind::TillBack => till_backward::<G>,
        }
    }
}

/// The most recent char-targeting command, replayed by `;` and `,`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastFind {
    pub target: char,
    pub kind: FindKind,
}

impl LastFind {
    pub fn direction(&self) -> Direction {
        self.kind.direction()
    }

    /// The command `;` (`reverse == false`) or `,` (`reverse == true`) replays.
    /// The stored command itself is never altered.
    pub fn replay_kind(&self, reverse: bool) -> FindKind {
        if reverse {
            self.kind.reversed()
        } else {
            self.kind
        }
    }
}

fn matches_target(cell: Option<char>, target: char) -> bool {
    if target.is_whitespace() {
        crate::classify(cell) == CellClass::Space
    } else {
        cell == Some(target)
    }
}

/// Column of the `count`-th occurrence (or the furthest one if fewer exist).
fn scan_row<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
    target: char,
    direction: Direction,
) -> Option<usize> {
    let wanted = count.max(1) as usize;
    let hit = |x: &usize| matches_target(grid.cell_at(*x, from.y), target);
    let last = match direction {
        Direction::Forward => ((from.x + 1)..grid.width()).filter(hit).take(wanted).last(),
        Direction::Backward => (0..from.x).rev().filter(hit).take(wanted).last(),
    };
    trace!(target: "motion.resolve", %target, ?direction, wanted, found = ?last, "scan_row");
    last
}

fn settle(from: Position, x: usize, style: MotionStyle) -> MotionResult {
    if x == from.x {
        return MotionResult::invalid(from);
    }
    MotionResult::charwise(from, Position::new(x, from.y), style)
}

pub fn find_forward<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
    target: char,
) -> MotionResult {
    match scan_row(grid, from, count, target, Direction::Forward) {
        Some(x) => settle(from, x, MotionStyle::Inclusive),
        None => MotionResult::invalid(from),
    }
}

pub fn find_backward<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
    target: char,
) -> MotionResult {
    match scan_row(grid, from, count, target, Direction::Backward) {
        Some(x) => settle(from, x, MotionStyle::Exclusive),
        None => MotionResult::invalid(from),
    }
}

pub fn till_forward<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
    target: char,
) -> MotionResult {
    match scan_row(grid, from, count, target, Direction::Forward) {
        Some(x) => settle(from, x - 1, MotionStyle::Inclusive),
        None => MotionResult::invalid(from),
    }
}

pub fn till_backward<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
    target: char,
) -> MotionResult {
    match scan_row(grid, from, count, target, Direction::Backward) {
        Some(x) => settle(from, x + 1, MotionStyle::Exclusive),
        None => MotionResult::invalid(from),
    }
}

/// Resolve a char-targeting motion on the cursor row.
pub fn resolve_find<G: GridAccessor + ?Sized>(
    grid: &G,
    kind: FindKind,
    from: Position,
    count: u32,
    target: char,
) -> MotionResult {
    if grid.width() == 0 || grid.height() == 0 {
        return MotionResult::invalid(from);
    }
    let res = (kind.func::<G>())(grid, from, count.max(1), target);
    trace!(
        target: "motion.resolve",
        kind = %kind.symbol(),
        %target,
        count,
        valid = res.valid,
        "find"
    );
    res
}
