//! Move operator: land the cursor on a valid motion's end.

use core_grid::Position;
use core_grid::motion::MotionResult;
use tracing::trace;

/// Returns whether the cursor moved. Invalid results leave it untouched.
pub fn move_cursor(result: &MotionResult, cursor: &mut Position) -> bool {
    let Some(to) = result.landing() else {
        trace!(
            target: "actions.dispatch",
            op = "move",
            x = cursor.x,
            y = cursor.y,
            "motion_invalid"
        );
        return false;
    };
    trace!(
        target: "actions.dispatch",
        op = "move",
        from_x = cursor.x,
        from_y = cursor.y,
        to_x = to.x,
        to_y = to.y,
        "cursor"
    );
    let moved = *cursor != to;
    *cursor = to;
    moved
}
