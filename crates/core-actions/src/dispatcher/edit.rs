//! Delete operator.
//!
//! Linewise ranges clear every column of every covered row. Charwise ranges
//! stay on the start row: the bounds are ordered first, then an exclusive
//! range drops its landing column. An exclusive range whose bounds coincide
//! covers nothing. Protected occupants are the host's business; the operator
//! only asks for ranges to be cleared.

use core_grid::motion::{MotionResult, MotionStyle, RangeType};
use core_grid::{GridMutator, RemovalReport};
use tracing::debug;

pub fn delete_range<G: GridMutator + ?Sized>(grid: &mut G, result: &MotionResult) -> RemovalReport {
    if !result.valid || grid.width() == 0 || grid.height() == 0 {
        return RemovalReport::default();
    }
    let last_col = grid.width() - 1;
    let report = match result.range {
        RangeType::Line => {
            let (top, bottom) = ordered(result.start.y, result.end.y);
            let bottom = bottom.min(grid.height() - 1);
            (top..=bottom).fold(RemovalReport::default(), |acc, y| {
                acc.merge(grid.remove_range(y, 0, last_col))
            })
        }
        RangeType::Char => {
            let (x_start, mut x_end) = ordered(result.start.x, result.end.x);
            if result.style == MotionStyle::Exclusive {
                if x_end == x_start {
                    debug!(
                        target: "actions.dispatch",
                        op = "delete",
                        x = x_start,
                        "empty_exclusive_range"
                    );
                    return RemovalReport::default();
                }
                x_end -= 1;
            }
            grid.remove_range(result.start.y, x_start, x_end.min(last_col))
        }
    };
    debug!(
        target: "actions.dispatch",
        op = "delete",
        range = ?result.range,
        start_x = result.start.x,
        start_y = result.start.y,
        end_x = result.end.x,
        end_y = result.end.y,
        removed = report.removed,
        rewarded = report.rewarded,
        "edit"
    );
    report
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_grid::{Position, SparseGrid};

    fn grid(rows: &[&str]) -> SparseGrid {
        SparseGrid::from_rows(rows)
            .unwrap()
            .with_reward(|o| o.glyph == '*')
    }

    fn charwise(y: usize, from: usize, to: usize, style: MotionStyle) -> MotionResult {
        MotionResult::charwise(Position::new(from, y), Position::new(to, y), style)
    }

    #[test]
    fn inclusive_range_covers_landing_cell() {
        let mut g = grid(&["a bc d"]);
        let report = delete_range(&mut g, &charwise(0, 1, 5, MotionStyle::Inclusive));
        assert_eq!(report.removed, 3);
        assert_eq!(g.render_rows(), vec!["a"]);
    }

    #[test]
    fn exclusive_range_drops_landing_cell() {
        let mut g = grid(&["abcdef"]);
        delete_range(&mut g, &charwise(0, 1, 4, MotionStyle::Exclusive));
        assert_eq!(g.render_rows(), vec!["a   ef"]);
    }

    #[test]
    fn reversed_bounds_are_ordered() {
        let mut g = grid(&["abcdef"]);
        delete_range(&mut g, &charwise(0, 4, 1, MotionStyle::Exclusive));
        assert_eq!(g.render_rows(), vec!["a   ef"]);
    }

    #[test]
    fn coincident_exclusive_bounds_delete_nothing() {
        let mut g = grid(&["abc"]);
        let report = delete_range(&mut g, &charwise(0, 1, 1, MotionStyle::Exclusive));
        assert_eq!(report, RemovalReport::default());
        assert_eq!(g.occupied(), 3);
    }

    #[test]
    fn invalid_result_deletes_nothing() {
        let mut g = grid(&["abc"]);
        let mut result = charwise(0, 0, 2, MotionStyle::Inclusive);
        result.valid = false;
        assert_eq!(delete_range(&mut g, &result), RemovalReport::default());
        assert_eq!(g.occupied(), 3);
    }

    #[test]
    fn linewise_clears_rows_in_either_order() {
        let mut g = grid(&["ab", "c*", "de", "fg"]);
        let result = MotionResult::linewise(Position::new(1, 2), Position::new(0, 1));
        let report = delete_range(&mut g, &result);
        assert_eq!(
            report,
            RemovalReport {
                removed: 4,
                rewarded: true
            }
        );
        assert_eq!(g.render_rows(), vec!["ab", "", "", "fg"]);
    }

    #[test]
    fn protected_occupants_survive() {
        let mut g = grid(&["a#b*"]);
        g.protect_where(|o| o.glyph == '#');
        let report = delete_range(&mut g, &charwise(0, 0, 3, MotionStyle::Inclusive));
        assert_eq!(report.removed, 3);
        assert!(report.rewarded);
        assert_eq!(g.render_rows(), vec![" #"]);
    }
}
