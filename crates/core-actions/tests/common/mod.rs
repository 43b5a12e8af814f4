#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{CommandReport, Interpreter, KeyOutcome};
use core_events::parse_keys;
use core_grid::{Position, SparseGrid};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route interpreter traces to the test writer (visible with `--nocapture`).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    });
}

/// A grid, a cursor and an interpreter driven by key scripts.
pub struct Session {
    pub grid: SparseGrid,
    pub cursor: Position,
    pub interp: Interpreter,
}

impl Session {
    pub fn new(rows: &[&str], cursor: (usize, usize)) -> Self {
        init_tracing();
        let grid = SparseGrid::from_rows(rows)
            .unwrap()
            .with_reward(|o| o.glyph == '*');
        Self {
            grid,
            cursor: Position::new(cursor.0, cursor.1),
            interp: Interpreter::new(),
        }
    }

    /// Same as [`Session::new`] with every `#` protected.
    pub fn protected(rows: &[&str], cursor: (usize, usize)) -> Self {
        let mut s = Self::new(rows, cursor);
        s.grid.protect_where(|o| o.glyph == '#');
        s
    }

    pub fn keys(&mut self, script: &str) -> Vec<KeyOutcome> {
        let keys = parse_keys(script).unwrap();
        self.interp.feed_all(&mut self.grid, &mut self.cursor, &keys)
    }

    /// Feed `script` and return the report of the command it completes.
    pub fn run(&mut self, script: &str) -> CommandReport {
        match self.keys(script).pop() {
            Some(KeyOutcome::Executed(report)) => report,
            other => panic!("`{script}` did not execute a command: {other:?}"),
        }
    }

    pub fn at(&self) -> (usize, usize) {
        (self.cursor.x, self.cursor.y)
    }

    pub fn rows(&self) -> Vec<String> {
        self.grid.render_rows()
    }
}
