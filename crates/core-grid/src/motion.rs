//! Cursor motion resolution.
//!
//! Every motion is a pure function of `(grid, start, count)` producing a
//! [`MotionResult`]. Nothing here mutates the grid or touches interpreter
//! state; operators consume the result afterwards.
//!
//! Word motions (`w`/`b`/`e` and the WORD variants) stay on the cursor row:
//! reaching the row edge without finding a landing cell ends the repetition.
//! A count of zero behaves like one everywhere.

use crate::{CellClass, GridAccessor, Position};
use tracing::trace;

/// Whether an operator treats the range as a span of cells or of whole rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeType {
    Char,
    Line,
}

/// Whether the landing cell belongs to an operator's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionStyle {
    Exclusive,
    Inclusive,
}

/// Outcome of resolving one motion. When `valid` is false the coordinates are
/// the untouched start position and must not be acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionResult {
    pub start: Position,
    pub end: Position,
    pub range: RangeType,
    pub style: MotionStyle,
    pub valid: bool,
}

impl MotionResult {
    pub fn invalid(at: Position) -> Self {
        Self {
            start: at,
            end: at,
            range: RangeType::Char,
            style: MotionStyle::Exclusive,
            valid: false,
        }
    }

    pub fn charwise(start: Position, end: Position, style: MotionStyle) -> Self {
        Self {
            start,
            end,
            range: RangeType::Char,
            style,
            valid: true,
        }
    }

    pub fn linewise(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            range: RangeType::Line,
            style: MotionStyle::Inclusive,
            valid: true,
        }
    }

    /// Charwise when both ends share a row, linewise otherwise.
    fn spanning(start: Position, end: Position, style: MotionStyle) -> Self {
        if start.y == end.y {
            Self::charwise(start, end, style)
        } else {
            Self::linewise(start, end)
        }
    }

    /// Where the cursor lands, if the motion succeeded.
    pub fn landing(&self) -> Option<Position> {
        self.valid.then_some(self.end)
    }
}

/// Signature shared by every count-taking motion.
pub type MotionFunc<G> = fn(&G, Position, u32) -> MotionResult;

/// Motions addressable from a key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    Left,
    Right,
    Down,
    Up,
    WordForward,
    WordBackward,
    WordEnd,
    BigWordForward,
    BigWordBackward,
    BigWordEnd,
    LineStart,
    FirstNonBlank,
    LineEnd,
    ScreenTop,
    ScreenMiddle,
    ScreenBottom,
    GridTop,
    GridBottom,
    ParagraphForward,
    ParagraphBackward,
    MatchBracket,
    /// `[count]go`: the count-th cell in row-major order.
    CellOffset,
    /// `count` cells starting under the cursor (the range behind `x`).
    CellsUnderCursor,
}

impl MotionKind {
    pub fn func<G: GridAccessor + ?Sized>(self) -> MotionFunc<G> {
        match self {
            MotionKind::Left => left::<G>,
            MotionKind::Right => right::<G>,
            MotionKind::Down => down::<G>,
            MotionKind::Up => up::<G>,
            MotionKind::WordForward => word_forward::<G>,
            MotionKind::WordBackward => word_backward::<G>,
            MotionKind::WordEnd => word_end::<G>,
            MotionKind::BigWordForward => big_word_forward::<G>,
            MotionKind::BigWordBackward => big_word_backward::<G>,
            MotionKind::BigWordEnd => big_word_end::<G>,
            MotionKind::LineStart => line_start::<G>,
            MotionKind::FirstNonBlank => first_non_blank::<G>,
            MotionKind::LineEnd => line_end::<G>,
            MotionKind::ScreenTop => screen_top::<G>,
            MotionKind::ScreenMiddle => screen_middle::<G>,
            MotionKind::ScreenBottom => screen_bottom::<G>,
            MotionKind::GridTop => grid_top::<G>,
            MotionKind::GridBottom => grid_bottom::<G>,
            MotionKind::ParagraphForward => paragraph_forward::<G>,
            MotionKind::ParagraphBackward => paragraph_backward::<G>,
            MotionKind::MatchBracket => match_bracket::<G>,
            MotionKind::CellOffset => cell_offset::<G>,
            MotionKind::CellsUnderCursor => cells_under_cursor::<G>,
        }
    }
}

/// Resolve `kind` from `from`, repeating `count` times where the motion repeats.
pub fn resolve<G: GridAccessor + ?Sized>(
    grid: &G,
    kind: MotionKind,
    from: Position,
    count: u32,
) -> MotionResult {
    if grid.width() == 0 || grid.height() == 0 {
        return MotionResult::invalid(from);
    }
    let result = (kind.func::<G>())(grid, from, count.max(1));
    trace!(
        target: "motion.resolve",
        ?kind,
        count,
        from_x = from.x,
        from_y = from.y,
        to_x = result.end.x,
        to_y = result.end.y,
        valid = result.valid,
        "resolved"
    );
    result
}

// -------------------------------------------------------------------------------------------------
// Horizontal / vertical steps
// -------------------------------------------------------------------------------------------------

pub fn left<G: GridAccessor + ?Sized>(_grid: &G, from: Position, count: u32) -> MotionResult {
    let x = from.x.saturating_sub(count.max(1) as usize);
    if x == from.x {
        return MotionResult::invalid(from);
    }
    MotionResult::charwise(from, Position::new(x, from.y), MotionStyle::Exclusive)
}

pub fn right<G: GridAccessor + ?Sized>(grid: &G, from: Position, count: u32) -> MotionResult {
    let last = grid.width().saturating_sub(1);
    let x = from.x.saturating_add(count.max(1) as usize).min(last);
    if x <= from.x {
        return MotionResult::invalid(from);
    }
    MotionResult::charwise(from, Position::new(x, from.y), MotionStyle::Exclusive)
}

pub fn down<G: GridAccessor + ?Sized>(grid: &G, from: Position, count: u32) -> MotionResult {
    let last = grid.height().saturating_sub(1);
    let y = from.y.saturating_add(count.max(1) as usize).min(last);
    if y <= from.y {
        return MotionResult::invalid(from);
    }
    MotionResult::linewise(from, Position::new(from.x, y))
}

pub fn up<G: GridAccessor + ?Sized>(_grid: &G, from: Position, count: u32) -> MotionResult {
    let y = from.y.saturating_sub(count.max(1) as usize);
    if y == from.y {
        return MotionResult::invalid(from);
    }
    MotionResult::linewise(from, Position::new(from.x, y))
}

// -------------------------------------------------------------------------------------------------
// word / WORD
// -------------------------------------------------------------------------------------------------

fn same_run(a: CellClass, b: CellClass, big: bool) -> bool {
    if big {
        a != CellClass::Space && b != CellClass::Space
    } else {
        a == b
    }
}

fn next_word_start<G: GridAccessor + ?Sized>(
    grid: &G,
    x: usize,
    y: usize,
    big: bool,
) -> Option<usize> {
    let width = grid.width();
    let class = grid.class_at(x, y);
    let mut i = x;
    if class == CellClass::Space {
        i += 1;
    } else {
        while i < width && same_run(grid.class_at(i, y), class, big) {
            i += 1;
        }
    }
    while i < width && grid.class_at(i, y) == CellClass::Space {
        i += 1;
    }
    (i < width).then_some(i)
}

fn prev_word_start<G: GridAccessor + ?Sized>(
    grid: &G,
    x: usize,
    y: usize,
    big: bool,
) -> Option<usize> {
    if x == 0 {
        return None;
    }
    let mut i = x - 1;
    while i > 0 && grid.class_at(i, y) == CellClass::Space {
        i -= 1;
    }
    let class = grid.class_at(i, y);
    if class == CellClass::Space {
        return None;
    }
    while i > 0 && same_run(grid.class_at(i - 1, y), class, big) {
        i -= 1;
    }
    Some(i)
}

fn next_word_end<G: GridAccessor + ?Sized>(
    grid: &G,
    x: usize,
    y: usize,
    big: bool,
) -> Option<usize> {
    let width = grid.width();
    let mut i = x + 1;
    while i < width && grid.class_at(i, y) == CellClass::Space {
        i += 1;
    }
    if i >= width {
        return None;
    }
    let class = grid.class_at(i, y);
    while i + 1 < width && same_run(grid.class_at(i + 1, y), class, big) {
        i += 1;
    }
    Some(i)
}

/// Apply `step` up to `count` times, stopping at the first step that cannot move.
fn repeat_on_row<G, F>(
    grid: &G,
    from: Position,
    count: u32,
    style: MotionStyle,
    step: F,
) -> MotionResult
where
    G: GridAccessor + ?Sized,
    F: Fn(&G, usize, usize) -> Option<usize>,
{
    let mut x = from.x;
    for _ in 0..count.max(1) {
        match step(grid, x, from.y) {
            Some(next) if next != x => x = next,
            _ => break,
        }
    }
    if x == from.x {
        return MotionResult::invalid(from);
    }
    MotionResult::charwise(from, Position::new(x, from.y), style)
}

pub fn word_forward<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
) -> MotionResult {
    repeat_on_row(grid, from, count, MotionStyle::Exclusive, |g, x, y| {
        next_word_start(g, x, y, false)
    })
}

pub fn word_backward<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
) -> MotionResult {
    repeat_on_row(grid, from, count, MotionStyle::Exclusive, |g, x, y| {
        prev_word_start(g, x, y, false)
    })
}

pub fn word_end<G: GridAccessor + ?Sized>(grid: &G, from: Position, count: u32) -> MotionResult {
    repeat_on_row(grid, from, count, MotionStyle::Inclusive, |g, x, y| {
        next_word_end(g, x, y, false)
    })
}

pub fn big_word_forward<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
) -> MotionResult {
    repeat_on_row(grid, from, count, MotionStyle::Exclusive, |g, x, y| {
        next_word_start(g, x, y, true)
    })
}

pub fn big_word_backward<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
) -> MotionResult {
    repeat_on_row(grid, from, count, MotionStyle::Exclusive, |g, x, y| {
        prev_word_start(g, x, y, true)
    })
}

pub fn big_word_end<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
) -> MotionResult {
    repeat_on_row(grid, from, count, MotionStyle::Inclusive, |g, x, y| {
        next_word_end(g, x, y, true)
    })
}

// -------------------------------------------------------------------------------------------------
// Row anchors
// -------------------------------------------------------------------------------------------------

pub fn line_start<G: GridAccessor + ?Sized>(
    _grid: &G,
    from: Position,
    _count: u32,
) -> MotionResult {
    MotionResult::charwise(from, Position::new(0, from.y), MotionStyle::Exclusive)
}

pub fn first_non_blank<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    _count: u32,
) -> MotionResult {
    let x = (0..grid.width())
        .find(|&x| grid.class_at(x, from.y) != CellClass::Space)
        .unwrap_or(0);
    MotionResult::charwise(from, Position::new(x, from.y), MotionStyle::Exclusive)
}

pub fn line_end<G: GridAccessor + ?Sized>(grid: &G, from: Position, _count: u32) -> MotionResult {
    let x = grid
        .line_extent(from.y)
        .unwrap_or_else(|| grid.width().saturating_sub(1));
    MotionResult::charwise(from, Position::new(x, from.y), MotionStyle::Inclusive)
}

// -------------------------------------------------------------------------------------------------
// Screen / grid rows. Counts are ignored.
// -------------------------------------------------------------------------------------------------

fn to_row(from: Position, y: usize) -> MotionResult {
    MotionResult::linewise(from, Position::new(from.x, y))
}

pub fn screen_top<G: GridAccessor + ?Sized>(
    _grid: &G,
    from: Position,
    _count: u32,
) -> MotionResult {
    to_row(from, 0)
}

pub fn screen_middle<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    _count: u32,
) -> MotionResult {
    to_row(from, grid.height() / 2)
}

pub fn screen_bottom<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    _count: u32,
) -> MotionResult {
    to_row(from, grid.height().saturating_sub(1))
}

pub fn grid_top<G: GridAccessor + ?Sized>(_grid: &G, from: Position, _count: u32) -> MotionResult {
    to_row(from, 0)
}

pub fn grid_bottom<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    _count: u32,
) -> MotionResult {
    to_row(from, grid.height().saturating_sub(1))
}

// -------------------------------------------------------------------------------------------------
// Paragraphs
// -------------------------------------------------------------------------------------------------

pub fn paragraph_forward<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
) -> MotionResult {
    let last = grid.height().saturating_sub(1);
    let mut y = from.y;
    for _ in 0..count.max(1) {
        if y >= last {
            break;
        }
        y = ((y + 1)..=last)
            .find(|&row| !grid.row_has_content(row))
            .unwrap_or(last);
    }
    if y == from.y {
        return MotionResult::invalid(from);
    }
    MotionResult::linewise(from, Position::new(0, y))
}

pub fn paragraph_backward<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
) -> MotionResult {
    let mut y = from.y;
    for _ in 0..count.max(1) {
        if y == 0 {
            break;
        }
        y = (0..y).rev().find(|&row| !grid.row_has_content(row)).unwrap_or(0);
    }
    if y == from.y {
        return MotionResult::invalid(from);
    }
    MotionResult::linewise(from, Position::new(0, y))
}

// -------------------------------------------------------------------------------------------------
// Bracket matching
// -------------------------------------------------------------------------------------------------

const BRACKET_PAIRS: [(char, char); 4] = [('(', ')'), ('{', '}'), ('[', ']'), ('<', '>')];

/// Opening/closing pair for `c` and whether the match lies forward.
fn bracket_pair(c: char) -> Option<(char, char, bool)> {
    BRACKET_PAIRS.iter().find_map(|&(open, close)| {
        if c == open {
            Some((open, close, true))
        } else if c == close {
            Some((open, close, false))
        } else {
            None
        }
    })
}

/// `%`: jump to the bracket pairing the one under the cursor, scanning in
/// row-major order and counting nesting of the same bracket type only.
pub fn match_bracket<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    _count: u32,
) -> MotionResult {
    let Some((open, close, forward)) = grid.cell_at(from.x, from.y).and_then(bracket_pair) else {
        return MotionResult::invalid(from);
    };
    let width = grid.width();
    let origin = from.y * width + from.x;
    let total = width * grid.height();
    let (opener, closer) = if forward { (open, close) } else { (close, open) };
    let mut depth = 0usize;
    let mut scan = |idx: usize| -> Option<Position> {
        let (x, y) = (idx % width, idx / width);
        match grid.cell_at(x, y) {
            Some(c) if c == opener => depth += 1,
            Some(c) if c == closer => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(Position::new(x, y));
                }
            }
            _ => {}
        }
        None
    };
    let found = if forward {
        (origin..total).find_map(&mut scan)
    } else {
        (0..=origin).rev().find_map(&mut scan)
    };
    match found {
        Some(end) => MotionResult::spanning(from, end, MotionStyle::Inclusive),
        None => MotionResult::invalid(from),
    }
}

// -------------------------------------------------------------------------------------------------
// Cell addressing
// -------------------------------------------------------------------------------------------------

pub fn cell_offset<G: GridAccessor + ?Sized>(grid: &G, from: Position, count: u32) -> MotionResult {
    let width = grid.width();
    let last = (width * grid.height()).saturating_sub(1);
    let idx = (count.max(1) as usize - 1).min(last);
    let end = Position::new(idx % width, idx / width);
    MotionResult::spanning(from, end, MotionStyle::Exclusive)
}

pub fn cells_under_cursor<G: GridAccessor + ?Sized>(
    grid: &G,
    from: Position,
    count: u32,
) -> MotionResult {
    let last = grid.width().saturating_sub(1);
    let x = from
        .x
        .saturating_add(count.max(1) as usize - 1)
        .min(last);
    MotionResult::charwise(from, Position::new(x, from.y), MotionStyle::Inclusive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SparseGrid;
    use proptest::prelude::*;

    fn grid(rows: &[&str]) -> SparseGrid {
        SparseGrid::from_rows(rows).unwrap()
    }

    fn land(
        g: &SparseGrid,
        kind: MotionKind,
        from: (usize, usize),
        count: u32,
    ) -> Option<(usize, usize)> {
        resolve(g, kind, Position::new(from.0, from.1), count)
            .landing()
            .map(|p| (p.x, p.y))
    }

    #[test]
    fn word_forward_respects_classes() {
        let g = grid(&["foo_bar, baz.qux"]);
        assert_eq!(land(&g, MotionKind::WordForward, (0, 0), 1), Some((7, 0)));
        assert_eq!(land(&g, MotionKind::WordForward, (7, 0), 1), Some((9, 0)));
        assert_eq!(land(&g, MotionKind::WordForward, (9, 0), 1), Some((12, 0)));
        assert_eq!(land(&g, MotionKind::WordForward, (0, 0), 3), Some((12, 0)));
    }

    #[test]
    fn word_forward_stops_early_at_row_edge() {
        let g = grid(&["ab cd", "ef"]);
        // Second step has nowhere to go on row 0; first step still counts.
        assert_eq!(land(&g, MotionKind::WordForward, (0, 0), 5), Some((3, 0)));
        assert_eq!(land(&g, MotionKind::WordForward, (3, 0), 1), None);
    }

    #[test]
    fn word_forward_from_space() {
        let g = grid(&["a   b"]);
        assert_eq!(land(&g, MotionKind::WordForward, (1, 0), 1), Some((4, 0)));
    }

    #[test]
    fn word_backward_mirrors_forward() {
        let g = grid(&["foo_bar, baz.qux"]);
        assert_eq!(land(&g, MotionKind::WordBackward, (9, 0), 1), Some((7, 0)));
        assert_eq!(land(&g, MotionKind::WordBackward, (7, 0), 1), Some((0, 0)));
        assert_eq!(land(&g, MotionKind::WordBackward, (15, 0), 1), Some((13, 0)));
        assert_eq!(land(&g, MotionKind::WordBackward, (0, 0), 1), None);
    }

    #[test]
    fn word_backward_over_leading_space_is_noop() {
        let g = grid(&["   ab"]);
        assert_eq!(land(&g, MotionKind::WordBackward, (3, 0), 1), None);
    }

    #[test]
    fn word_end_lands_on_run_end() {
        let g = grid(&["foo_bar, baz.qux"]);
        assert_eq!(land(&g, MotionKind::WordEnd, (0, 0), 1), Some((6, 0)));
        assert_eq!(land(&g, MotionKind::WordEnd, (6, 0), 1), Some((7, 0)));
        assert_eq!(land(&g, MotionKind::WordEnd, (7, 0), 1), Some((11, 0)));
        assert_eq!(land(&g, MotionKind::WordEnd, (15, 0), 1), None);
        let r = resolve(&g, MotionKind::WordEnd, Position::origin(), 1);
        assert_eq!(r.style, MotionStyle::Inclusive);
    }

    #[test]
    fn big_word_motions_ignore_punctuation() {
        let g = grid(&["foo_bar, baz.qux end"]);
        assert_eq!(land(&g, MotionKind::BigWordForward, (0, 0), 1), Some((9, 0)));
        assert_eq!(land(&g, MotionKind::BigWordForward, (9, 0), 1), Some((17, 0)));
        assert_eq!(land(&g, MotionKind::BigWordBackward, (17, 0), 1), Some((9, 0)));
        assert_eq!(land(&g, MotionKind::BigWordEnd, (0, 0), 1), Some((7, 0)));
        assert_eq!(land(&g, MotionKind::BigWordEnd, (7, 0), 1), Some((15, 0)));
    }

    #[test]
    fn line_anchors() {
        let g = grid(&["  ab c", "", "xyz"]);
        assert_eq!(land(&g, MotionKind::LineStart, (4, 0), 1), Some((0, 0)));
        assert_eq!(land(&g, MotionKind::FirstNonBlank, (5, 0), 1), Some((2, 0)));
        assert_eq!(land(&g, MotionKind::FirstNonBlank, (3, 1), 1), Some((0, 1)));
        assert_eq!(land(&g, MotionKind::LineEnd, (0, 0), 1), Some((5, 0)));
        // Empty row: last grid column.
        assert_eq!(land(&g, MotionKind::LineEnd, (0, 1), 1), Some((5, 1)));
        assert_eq!(land(&g, MotionKind::LineEnd, (0, 2), 1), Some((2, 2)));
    }

    #[test]
    fn screen_rows_ignore_count() {
        let g = grid(&["a", "b", "c", "d", "e"]);
        assert_eq!(land(&g, MotionKind::ScreenTop, (0, 3), 4), Some((0, 0)));
        assert_eq!(land(&g, MotionKind::ScreenMiddle, (0, 0), 9), Some((0, 2)));
        assert_eq!(land(&g, MotionKind::ScreenBottom, (0, 0), 2), Some((0, 4)));
        assert_eq!(land(&g, MotionKind::GridTop, (0, 4), 1), Some((0, 0)));
        assert_eq!(land(&g, MotionKind::GridBottom, (0, 1), 1), Some((0, 4)));
        let r = resolve(&g, MotionKind::GridBottom, Position::origin(), 1);
        assert_eq!(r.range, RangeType::Line);
    }

    fn paragraph_grid() -> SparseGrid {
        // Content only on rows 2, 3, 5, 6, 8.
        grid(&["", "", "aa", "bb", "", "cc", "dd", "", "ee", ""])
    }

    #[test]
    fn paragraph_forward_finds_next_empty_row() {
        let g = paragraph_grid();
        assert_eq!(land(&g, MotionKind::ParagraphForward, (0, 2), 1), Some((0, 4)));
        assert_eq!(land(&g, MotionKind::ParagraphForward, (0, 4), 1), Some((0, 7)));
        assert_eq!(land(&g, MotionKind::ParagraphForward, (0, 2), 2), Some((0, 7)));
        assert_eq!(land(&g, MotionKind::ParagraphForward, (0, 7), 1), Some((0, 9)));
        assert_eq!(land(&g, MotionKind::ParagraphForward, (0, 9), 1), None);
    }

    #[test]
    fn paragraph_forward_clamps_to_bottom() {
        let g = grid(&["a", "b", "c"]);
        assert_eq!(land(&g, MotionKind::ParagraphForward, (0, 0), 1), Some((0, 2)));
    }

    #[test]
    fn paragraph_backward_finds_previous_empty_row() {
        let g = paragraph_grid();
        assert_eq!(land(&g, MotionKind::ParagraphBackward, (0, 8), 1), Some((0, 7)));
        assert_eq!(land(&g, MotionKind::ParagraphBackward, (0, 6), 1), Some((0, 4)));
        assert_eq!(land(&g, MotionKind::ParagraphBackward, (0, 6), 3), Some((0, 0)));
        assert_eq!(land(&g, MotionKind::ParagraphBackward, (0, 0), 1), None);
    }

    #[test]
    fn bracket_match_round_trip() {
        let g = grid(&["(hello)"]);
        assert_eq!(land(&g, MotionKind::MatchBracket, (0, 0), 1), Some((6, 0)));
        assert_eq!(land(&g, MotionKind::MatchBracket, (6, 0), 1), Some((0, 0)));
    }

    #[test]
    fn bracket_match_nesting_and_mixed_types() {
        let g = grid(&["{a(b)[c]<(d)>}"]);
        assert_eq!(land(&g, MotionKind::MatchBracket, (0, 0), 1), Some((13, 0)));
        assert_eq!(land(&g, MotionKind::MatchBracket, (8, 0), 1), Some((12, 0)));
        assert_eq!(land(&g, MotionKind::MatchBracket, (9, 0), 1), Some((11, 0)));
        let nested = grid(&["((x))"]);
        assert_eq!(land(&nested, MotionKind::MatchBracket, (0, 0), 1), Some((4, 0)));
        assert_eq!(land(&nested, MotionKind::MatchBracket, (3, 0), 1), Some((1, 0)));
    }

    #[test]
    fn bracket_mismatch_never_matches() {
        let g = grid(&["(abc]"]);
        assert_eq!(land(&g, MotionKind::MatchBracket, (0, 0), 1), None);
        assert_eq!(land(&g, MotionKind::MatchBracket, (4, 0), 1), None);
        assert_eq!(land(&g, MotionKind::MatchBracket, (2, 0), 1), None);
    }

    #[test]
    fn bracket_match_across_rows_is_linewise() {
        let g = grid(&["f(", "  x", ")"]);
        let r = resolve(&g, MotionKind::MatchBracket, Position::new(1, 0), 1);
        assert_eq!(r.landing(), Some(Position::new(0, 2)));
        assert_eq!(r.range, RangeType::Line);
    }

    #[test]
    fn horizontal_and_vertical_steps_clamp() {
        let g = grid(&["abcd", "efgh", "ijkl"]);
        assert_eq!(land(&g, MotionKind::Right, (1, 0), 10), Some((3, 0)));
        assert_eq!(land(&g, MotionKind::Right, (3, 0), 1), None);
        assert_eq!(land(&g, MotionKind::Left, (2, 0), 10), Some((0, 0)));
        assert_eq!(land(&g, MotionKind::Left, (0, 0), 1), None);
        assert_eq!(land(&g, MotionKind::Down, (2, 0), 5), Some((2, 2)));
        assert_eq!(land(&g, MotionKind::Up, (2, 2), 1), Some((2, 1)));
        assert_eq!(land(&g, MotionKind::Up, (2, 0), 1), None);
    }

    #[test]
    fn cell_offset_walks_row_major() {
        let g = grid(&["abcd", "efgh"]);
        assert_eq!(land(&g, MotionKind::CellOffset, (3, 1), 1), Some((0, 0)));
        assert_eq!(land(&g, MotionKind::CellOffset, (0, 0), 6), Some((1, 1)));
        assert_eq!(land(&g, MotionKind::CellOffset, (0, 0), 500), Some((3, 1)));
    }

    #[test]
    fn cells_under_cursor_clamps_to_row_end() {
        let g = grid(&["abcd"]);
        let r = resolve(&g, MotionKind::CellsUnderCursor, Position::new(2, 0), 9);
        assert_eq!(r.end, Position::new(3, 0));
        assert_eq!(r.style, MotionStyle::Inclusive);
    }

    proptest! {
        #[test]
        fn zero_count_behaves_like_one(x in 0usize..16, kind_idx in 0usize..6) {
            let g = grid(&["foo_bar, baz.qux"]);
            let kinds = [
                MotionKind::WordForward,
                MotionKind::WordBackward,
                MotionKind::WordEnd,
                MotionKind::BigWordForward,
                MotionKind::Left,
                MotionKind::Right,
            ];
            let from = Position::new(x, 0);
            let kind = kinds[kind_idx];
            prop_assert_eq!(resolve(&g, kind, from, 0), resolve(&g, kind, from, 1));
        }

        #[test]
        fn w_then_b_returns_to_word_start(
            words in proptest::collection::vec("[a-z]{1,4}|[.,;]{1,2}", 2..6),
        ) {
            let row = words.join(" ");
            let g = grid(&[row.as_str()]);
            let mut x = 0;
            for _ in 0..words.len() - 1 {
                let fwd = resolve(&g, MotionKind::WordForward, Position::new(x, 0), 1);
                prop_assert!(fwd.valid);
                let back = resolve(&g, MotionKind::WordBackward, fwd.end, 1);
                prop_assert_eq!(back.landing(), Some(Position::new(x, 0)));
                x = fwd.end.x;
            }
        }

        #[test]
        fn percent_twice_is_identity(depth in 1usize..5, pad in 0usize..3) {
            let row = format!(
                "{}{}{}{}",
                " ".repeat(pad),
                "(".repeat(depth),
                "x",
                ")".repeat(depth)
            );
            let g = grid(&[row.as_str()]);
            for i in 0..depth {
                let from = Position::new(pad + i, 0);
                let there = resolve(&g, MotionKind::MatchBracket, from, 1);
                prop_assert!(there.valid);
                let back = resolve(&g, MotionKind::MatchBracket, there.end, 1);
                prop_assert_eq!(back.landing(), Some(from));
            }
        }
    }
}
