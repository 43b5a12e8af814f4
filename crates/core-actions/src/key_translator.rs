//! KeyTranslator: stateful key -> Action translation.
//!
//! State machine:
//! * `Idle` / `Count`: digits `1-9` start or extend `count1`; `0` extends it
//!   only once non-zero (otherwise it is the line-start motion). Other keys
//!   are looked up in the normal table.
//! * `CharWait` / `OperatorCharWait`: the next literal key is the find target,
//!   never a table lookup.
//! * `OperatorWait`: digits extend `count2`; the operator's own key yields the
//!   whole-line variant; other keys go through the operator-pending table.
//! * `PrefixG` / `OperatorPrefixG`: the next key is looked up in the prefix
//!   table.
//!
//! Every terminal transition (completion, abort, cancel) clears all pending
//! state at once. Counts saturate at [`COUNT_CEILING`]; the effective count is
//! `max(count1, 1) * max(count2, 1)`, also saturated.

use crate::{Action, MotionSpec};
use core_events::KeyEvent;
use core_grid::find::FindKind;
use core_keymap::{Binding, BindingTable, BoundAction, OperatorKind, SpecialKind};
use smallvec::{SmallVec, smallvec};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, trace};

/// Saturation ceiling for every count accumulator.
pub const COUNT_CEILING: u32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputState {
    #[default]
    Idle,
    Count,
    CharWait,
    OperatorWait,
    OperatorCharWait,
    PrefixG,
    OperatorPrefixG,
}

/// Result of feeding one key to the translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Key consumed; more keys needed.
    Pending,
    /// A cancel key cleared all pending state.
    Cancelled,
    /// Key not part of the grammar here; pending state was discarded.
    NotHandled,
    Complete { action: Action, echo: String },
}

#[derive(Debug, Clone, Copy)]
struct EchoKey {
    key: KeyEvent,
    count_digit: bool,
}

#[derive(Debug)]
pub struct KeyTranslator {
    table: Arc<BindingTable>,
    cancel_keys: SmallVec<[KeyEvent; 2]>,
    state: InputState,
    /// Count typed before an operator or motion (`12w`, `2d3w`).
    count1: u32,
    /// Count typed after an operator (`d3w`).
    count2: u32,
    pending_operator: Option<OperatorKind>,
    pending_find: Option<FindKind>,
    pending_prefix: Option<char>,
    echo: SmallVec<[EchoKey; 8]>,
}

impl KeyTranslator {
    /// Translator over `table` with `<Esc>` as the only cancel key.
    pub fn new(table: Arc<BindingTable>) -> Self {
        Self {
            table,
            cancel_keys: smallvec![KeyEvent::esc()],
            state: InputState::Idle,
            count1: 0,
            count2: 0,
            pending_operator: None,
            pending_find: None,
            pending_prefix: None,
            echo: SmallVec::new(),
        }
    }

    pub fn with_cancel_keys<I: IntoIterator<Item = KeyEvent>>(mut self, keys: I) -> Self {
        self.cancel_keys = keys.into_iter().collect();
        self
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn cancel_keys(&self) -> &[KeyEvent] {
        &self.cancel_keys
    }

    /// Keys consumed by the command in progress, counts included.
    pub fn pending_echo(&self) -> String {
        render_echo(&self.echo, true)
    }

    /// Clear counts, pending operator, char-wait and prefix together.
    pub fn reset(&mut self) {
        self.state = InputState::Idle;
        self.count1 = 0;
        self.count2 = 0;
        self.pending_operator = None;
        self.pending_find = None;
        self.pending_prefix = None;
        self.echo.clear();
    }

    pub fn translate(&mut self, key: &KeyEvent) -> Translation {
        if self.cancel_keys.contains(key) {
            debug!(target: "input.context", from = ?self.state, key = %key, "cancel");
            self.reset();
            return Translation::Cancelled;
        }
        trace!(
            target: "input.context",
            state = ?self.state,
            key = %key,
            count1 = self.count1,
            count2 = self.count2,
            "translate"
        );
        match self.state {
            InputState::Idle | InputState::Count => self.on_normal(key),
            InputState::CharWait | InputState::OperatorCharWait => self.on_char_target(key),
            InputState::OperatorWait => self.on_operator_motion(key),
            InputState::PrefixG | InputState::OperatorPrefixG => self.on_prefix(key),
        }
    }

    fn on_normal(&mut self, key: &KeyEvent) -> Translation {
        let Some(c) = key.literal() else {
            return self.abort(key, "not_literal");
        };
        if let Some(d) = count_digit(c, self.count1) {
            self.count1 = push_digit(self.count1, d);
            self.push_echo(key, true);
            return self.enter(InputState::Count);
        }
        let Some(binding) = self.table.normal(c).copied() else {
            return self.abort(key, "unbound");
        };
        let count = self.accept(key, &binding);
        match binding.action {
            BoundAction::Motion(m) => self.complete(Action::Move {
                motion: MotionSpec::Motion(m),
                count,
            }),
            BoundAction::CharWait(find) => {
                self.pending_find = Some(find);
                self.enter(InputState::CharWait)
            }
            BoundAction::Operator(op) => {
                self.pending_operator = Some(op);
                self.enter(InputState::OperatorWait)
            }
            BoundAction::Prefix(p) => {
                self.pending_prefix = Some(p);
                self.enter(InputState::PrefixG)
            }
            BoundAction::ModeSwitch(req) => self.complete(Action::ModeSwitch(req)),
            BoundAction::Special(SpecialKind::RepeatFind { reverse }) => {
                self.finish(MotionSpec::RepeatFind { reverse }, count)
            }
            BoundAction::Special(SpecialKind::OperatorShorthand { op, motion }) => {
                self.complete(Action::Operate {
                    op,
                    motion: MotionSpec::Motion(motion),
                    count,
                })
            }
        }
    }

    /// Keys without a character (`<CR>`, `<C-x>`) cannot be searched for and
    /// abort the command as not handled.
    fn on_char_target(&mut self, key: &KeyEvent) -> Translation {
        let Some(target) = key.literal() else {
            return self.abort(key, "target_not_literal");
        };
        let Some(kind) = self.pending_find else {
            return self.abort(key, "no_pending_find");
        };
        self.push_echo(key, false);
        let count = self.effective_count();
        self.finish(MotionSpec::Find { kind, target }, count)
    }

    fn on_operator_motion(&mut self, key: &KeyEvent) -> Translation {
        let Some(c) = key.literal() else {
            return self.abort(key, "not_literal");
        };
        if let Some(d) = count_digit(c, self.count2) {
            self.count2 = push_digit(self.count2, d);
            self.push_echo(key, true);
            return Translation::Pending;
        }
        let Some(op) = self.pending_operator else {
            return self.abort(key, "no_pending_operator");
        };
        if c == op.symbol() {
            self.push_echo(key, false);
            let count = self.effective_count();
            return self.finish(MotionSpec::WholeLine, count);
        }
        let Some(binding) = self.table.operator_pending(c).copied() else {
            return self.abort(key, "unbound_after_operator");
        };
        let count = self.accept(key, &binding);
        match binding.action {
            BoundAction::Motion(m) => self.finish(MotionSpec::Motion(m), count),
            BoundAction::CharWait(find) => {
                self.pending_find = Some(find);
                self.enter(InputState::OperatorCharWait)
            }
            BoundAction::Prefix(p) => {
                self.pending_prefix = Some(p);
                self.enter(InputState::OperatorPrefixG)
            }
            BoundAction::Special(SpecialKind::RepeatFind { reverse }) => {
                self.finish(MotionSpec::RepeatFind { reverse }, count)
            }
            BoundAction::Operator(_)
            | BoundAction::ModeSwitch(_)
            | BoundAction::Special(SpecialKind::OperatorShorthand { .. }) => {
                self.abort(key, "not_a_motion")
            }
        }
    }

    fn on_prefix(&mut self, key: &KeyEvent) -> Translation {
        let Some(c) = key.literal() else {
            return self.abort(key, "not_literal");
        };
        let Some(binding) = self.table.prefix(c).copied() else {
            return self.abort(key, "unbound_after_prefix");
        };
        let BoundAction::Motion(m) = binding.action else {
            return self.abort(key, "prefix_not_motion");
        };
        let count = self.accept(key, &binding);
        self.finish(MotionSpec::Motion(m), count)
    }

    /// Complete with a move, or with the pending operator applied to `motion`.
    fn finish(&mut self, motion: MotionSpec, count: u32) -> Translation {
        let action = match self.pending_operator {
            Some(op) => Action::Operate { op, motion, count },
            None => Action::Move { motion, count },
        };
        self.complete(action)
    }

    fn complete(&mut self, action: Action) -> Translation {
        let echo = render_echo(&self.echo, self.effective_count() > 1);
        debug!(
            target: "input.context",
            from = ?self.state,
            prefix = ?self.pending_prefix,
            ?action,
            %echo,
            "command_complete"
        );
        self.reset();
        Translation::Complete { action, echo }
    }

    fn abort(&mut self, key: &KeyEvent, reason: &'static str) -> Translation {
        debug!(
            target: "input.context",
            from = ?self.state,
            key = %key,
            reason,
            pending = %self.pending_echo(),
            "not_handled"
        );
        self.reset();
        Translation::NotHandled
    }

    fn enter(&mut self, state: InputState) -> Translation {
        self.state = state;
        Translation::Pending
    }

    fn push_echo(&mut self, key: &KeyEvent, count_digit: bool) {
        self.echo.push(EchoKey {
            key: *key,
            count_digit,
        });
    }

    fn effective_count(&self) -> u32 {
        self.count1
            .max(1)
            .saturating_mul(self.count2.max(1))
            .min(COUNT_CEILING)
    }

    /// Record a matched binding's key; returns the count the binding applies.
    fn accept(&mut self, key: &KeyEvent, binding: &Binding) -> u32 {
        trace!(
            target: "input.keymap",
            symbol = %binding.symbol,
            kind = ?binding.kind(),
            accepts_count = binding.accepts_count,
            "binding_matched"
        );
        self.push_echo(key, false);
        self.count_for(binding)
    }

    fn count_for(&self, binding: &Binding) -> u32 {
        if binding.accepts_count {
            self.effective_count()
        } else {
            1
        }
    }
}

/// `0` only counts once a count is already in progress.
fn count_digit(c: char, current: u32) -> Option<u32> {
    let d = c.to_digit(10)?;
    if d == 0 && current == 0 {
        return None;
    }
    Some(d)
}

fn push_digit(current: u32, digit: u32) -> u32 {
    current
        .saturating_mul(10)
        .saturating_add(digit)
        .min(COUNT_CEILING)
}

fn render_echo(keys: &[EchoKey], keep_counts: bool) -> String {
    let mut out = String::new();
    for k in keys.iter().filter(|k| keep_counts || !k.count_digit) {
        let _ = write!(out, "{}", k.key);
    }
    out
}
