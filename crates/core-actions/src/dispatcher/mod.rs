//! Dispatcher applying a completed [`Action`] to the host grid.
//!
//! Sub-modules:
//! * `motion` - the Move operator (cursor update)
//! * `edit`   - the Delete operator (grid mutation)
//!
//! Motion resolution happens here, once per action, so both operators consume
//! the same [`MotionResult`]. Char searches record themselves in the caller's
//! `LastFind` slot; repeats (`;`/`,`) only read it.

use crate::{Action, MotionSpec, OperatorKind};
use core_grid::find::{self, LastFind};
use core_grid::motion::{self as resolver, MotionResult};
use core_grid::{GridAccessor, GridMutator, Position, RemovalReport};
use tracing::debug;

mod edit;
mod motion;

pub use edit::delete_range;
pub use motion::move_cursor;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// Resolved range; `None` for actions without a motion (mode switches).
    pub motion: Option<MotionResult>,
    /// Cursor after the action.
    pub cursor: Position,
    pub removal: RemovalReport,
}

impl DispatchResult {
    fn untouched(cursor: Position) -> Self {
        Self {
            motion: None,
            cursor,
            removal: RemovalReport::default(),
        }
    }
}

/// Resolve what `spec` covers from `from`. Fresh char searches overwrite
/// `last_find`; repeats replay it without altering it.
pub fn resolve_motion<G: GridAccessor + ?Sized>(
    grid: &G,
    spec: MotionSpec,
    from: Position,
    count: u32,
    last_find: &mut Option<LastFind>,
) -> MotionResult {
    match spec {
        MotionSpec::Motion(kind) => resolver::resolve(grid, kind, from, count),
        MotionSpec::Find { kind, target } => {
            *last_find = Some(LastFind { target, kind });
            find::resolve_find(grid, kind, from, count, target)
        }
        MotionSpec::RepeatFind { reverse } => match *last_find {
            Some(last) => {
                find::resolve_find(grid, last.replay_kind(reverse), from, count, last.target)
            }
            None => {
                debug!(target: "actions.dispatch", reverse, "repeat_find_without_history");
                MotionResult::invalid(from)
            }
        },
        MotionSpec::WholeLine => whole_lines(grid, from, count),
    }
}

/// `count` rows starting at the cursor row, clamped at the bottom.
fn whole_lines<G: GridAccessor + ?Sized>(grid: &G, from: Position, count: u32) -> MotionResult {
    if grid.width() == 0 || grid.height() == 0 {
        return MotionResult::invalid(from);
    }
    let bottom = from
        .y
        .saturating_add(count.max(1) as usize - 1)
        .min(grid.height() - 1);
    MotionResult::linewise(from, Position::new(from.x, bottom))
}

/// Apply an action. The cursor is clamped into the grid before resolution.
pub fn dispatch<G: GridMutator + ?Sized>(
    action: Action,
    grid: &mut G,
    cursor: &mut Position,
    last_find: &mut Option<LastFind>,
) -> DispatchResult {
    cursor.clamp_to(grid.width(), grid.height());
    debug!(
        target: "actions.dispatch",
        motion = ?action.motion(),
        count = action.count(),
        x = cursor.x,
        y = cursor.y,
        "dispatch"
    );
    match action {
        Action::Move { motion, count } => {
            let result = resolve_motion(&*grid, motion, *cursor, count, last_find);
            move_cursor(&result, cursor);
            DispatchResult {
                motion: Some(result),
                cursor: *cursor,
                removal: RemovalReport::default(),
            }
        }
        Action::Operate {
            op: OperatorKind::Delete,
            motion,
            count,
        } => {
            let result = resolve_motion(&*grid, motion, *cursor, count, last_find);
            let removal = delete_range(grid, &result);
            DispatchResult {
                motion: Some(result),
                cursor: *cursor,
                removal,
            }
        }
        Action::ModeSwitch(request) => {
            debug!(target: "actions.dispatch", ?request, "mode_switch_signalled");
            DispatchResult::untouched(*cursor)
        }
    }
}
