//! Normal-mode command interpretation over a sparse grid.
//!
//! Keys flow through [`KeyTranslator`] (counts, pending operator, char-wait
//! and `g` prefix state) until a command completes as an [`Action`]. The
//! [`dispatcher`] then resolves the action's motion against the host grid
//! and applies the Move or Delete operator. [`Interpreter`] ties the two
//! together and owns everything that must outlive a single command
//! (the binding table and the last char search).

pub mod dispatcher;
mod interpreter;
mod key_translator;

pub use interpreter::{CommandReport, Interpreter, KeyOutcome, cancel_keys_from};
pub use key_translator::{COUNT_CEILING, InputState, KeyTranslator, Translation};

pub use core_grid::find::{FindKind, LastFind};
pub use core_grid::motion::{MotionKind, MotionResult};
pub use core_keymap::{ModeRequest, OperatorKind};

/// What a completed command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionSpec {
    /// A count-taking motion from the binding tables.
    Motion(MotionKind),
    /// `f`/`F`/`t`/`T` with its target character.
    Find { kind: FindKind, target: char },
    /// `;` or `,` replaying the last find.
    RepeatFind { reverse: bool },
    /// Doubled operator (`dd`): `count` whole rows starting at the cursor row.
    WholeLine,
}

/// Fully resolved command emitted by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move {
        motion: MotionSpec,
        count: u32,
    },
    Operate {
        op: OperatorKind,
        motion: MotionSpec,
        count: u32,
    },
    ModeSwitch(ModeRequest),
}

impl Action {
    /// Effective count applied by this action (1 for mode switches).
    pub fn count(&self) -> u32 {
        match self {
            Action::Move { count, .. } | Action::Operate { count, .. } => *count,
            Action::ModeSwitch(_) => 1,
        }
    }

    pub fn motion(&self) -> Option<MotionSpec> {
        match self {
            Action::Move { motion, .. } | Action::Operate { motion, .. } => Some(*motion),
            Action::ModeSwitch(_) => None,
        }
    }
}
