//! core-keymap: the normal-mode binding tables.
//!
//! Design principles:
//! - Built once: [`BindingTable::standard`] (or a [`BindingTableBuilder`])
//!   produces an immutable value the interpreter holds for its lifetime.
//! - Three independent maps: normal-mode keys, the narrower set of motions
//!   valid after an operator, and continuations of the `g` prefix.
//! - Pure data: bindings name what a key does; the interpreter decides when.

use core_grid::find::FindKind;
use core_grid::motion::MotionKind;
use std::collections::HashMap;
use tracing::{debug, trace};

// -------------------------------------------------------------------------------------------------
// Binding vocabulary
// -------------------------------------------------------------------------------------------------

/// Broad category deciding the interpreter's next state after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Motion,
    CharWait,
    Operator,
    Prefix,
    ModeSwitch,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Delete,
}

impl OperatorKind {
    pub fn symbol(self) -> char {
        match self {
            OperatorKind::Delete => 'd',
        }
    }
}

/// Mode change the host is asked to perform. The interpreter only signals it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeRequest {
    Insert,
    Append,
    CommandLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    /// `;` (`reverse == false`) and `,` (`reverse == true`).
    RepeatFind { reverse: bool },
    /// Single-key operator application, e.g. `x` (delete cells under cursor)
    /// and `D` (delete to row end).
    OperatorShorthand { op: OperatorKind, motion: MotionKind },
}

/// What a bound key resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundAction {
    Motion(MotionKind),
    CharWait(FindKind),
    Operator(OperatorKind),
    Prefix(char),
    ModeSwitch(ModeRequest),
    Special(SpecialKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub symbol: char,
    /// When false the accumulated count is dropped and 1 is used.
    pub accepts_count: bool,
    pub action: BoundAction,
}

impl Binding {
    pub const fn new(symbol: char, accepts_count: bool, action: BoundAction) -> Self {
        Self {
            symbol,
            accepts_count,
            action,
        }
    }

    pub const fn motion(symbol: char, accepts_count: bool, motion: MotionKind) -> Self {
        Self::new(symbol, accepts_count, BoundAction::Motion(motion))
    }

    pub const fn char_wait(symbol: char, find: FindKind) -> Self {
        Self::new(symbol, true, BoundAction::CharWait(find))
    }

    pub fn kind(&self) -> ActionKind {
        match self.action {
            BoundAction::Motion(_) => ActionKind::Motion,
            BoundAction::CharWait(_) => ActionKind::CharWait,
            BoundAction::Operator(_) => ActionKind::Operator,
            BoundAction::Prefix(_) => ActionKind::Prefix,
            BoundAction::ModeSwitch(_) => ActionKind::ModeSwitch,
            BoundAction::Special(_) => ActionKind::Special,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Tables
// -------------------------------------------------------------------------------------------------

/// One key -> binding map.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    entries: HashMap<char, Binding>,
}

impl KeyMap {
    fn insert(&mut self, binding: Binding) {
        if let Some(prev) = self.entries.insert(binding.symbol, binding) {
            // Later bindings override earlier ones.
            trace!(target: "input.keymap", symbol = %prev.symbol, "binding_override");
        }
    }

    pub fn get(&self, key: char) -> Option<&Binding> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bound symbols in sorted order.
    pub fn symbols(&self) -> Vec<char> {
        let mut keys: Vec<char> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

/// The three binding maps consulted by the interpreter.
#[derive(Debug, Clone)]
pub struct BindingTable {
    normal: KeyMap,
    operator_pending: KeyMap,
    prefix: KeyMap,
}

impl BindingTable {
    pub fn builder() -> BindingTableBuilder {
        BindingTableBuilder::default()
    }

    /// Normal-mode lookup.
    pub fn normal(&self, key: char) -> Option<&Binding> {
        self.normal.get(key)
    }

    /// Lookup after an operator is pending.
    pub fn operator_pending(&self, key: char) -> Option<&Binding> {
        self.operator_pending.get(key)
    }

    /// Continuation of a pending `g`.
    pub fn prefix(&self, key: char) -> Option<&Binding> {
        self.prefix.get(key)
    }

    pub fn normal_map(&self) -> &KeyMap {
        &self.normal
    }

    pub fn operator_pending_map(&self) -> &KeyMap {
        &self.operator_pending
    }

    pub fn prefix_map(&self) -> &KeyMap {
        &self.prefix
    }

    /// The stock modal-editor bindings.
    pub fn standard() -> Self {
        use MotionKind as M;
        let counted_motions = [
            Binding::motion('h', true, M::Left),
            Binding::motion('l', true, M::Right),
            Binding::motion('j', true, M::Down),
            Binding::motion('k', true, M::Up),
            Binding::motion('w', true, M::WordForward),
            Binding::motion('b', true, M::WordBackward),
            Binding::motion('e', true, M::WordEnd),
            Binding::motion('W', true, M::BigWordForward),
            Binding::motion('B', true, M::BigWordBackward),
            Binding::motion('E', true, M::BigWordEnd),
            Binding::motion('{', true, M::ParagraphBackward),
            Binding::motion('}', true, M::ParagraphForward),
        ];
        let anchored_motions = [
            Binding::motion('0', false, M::LineStart),
            Binding::motion('^', false, M::FirstNonBlank),
            Binding::motion('$', false, M::LineEnd),
            Binding::motion('G', false, M::GridBottom),
            Binding::motion('%', false, M::MatchBracket),
        ];
        let screen_motions = [
            Binding::motion('H', false, M::ScreenTop),
            Binding::motion('M', false, M::ScreenMiddle),
            Binding::motion('L', false, M::ScreenBottom),
        ];
        let finds = [
            Binding::char_wait('f', FindKind::Find),
            Binding::char_wait('F', FindKind::FindBack),
            Binding::char_wait('t', FindKind::Till),
            Binding::char_wait('T', FindKind::TillBack),
        ];
        let repeats = [
            Binding::new(
                ';',
                true,
                BoundAction::Special(SpecialKind::RepeatFind { reverse: false }),
            ),
            Binding::new(
                ',',
                true,
                BoundAction::Special(SpecialKind::RepeatFind { reverse: true }),
            ),
        ];
        let g_prefix = Binding::new('g', true, BoundAction::Prefix('g'));

        let mut builder = Self::builder();
        for b in counted_motions
            .iter()
            .chain(&anchored_motions)
            .chain(&finds)
            .chain(&repeats)
        {
            builder = builder.normal(*b).operator_pending(*b);
        }
        for b in screen_motions {
            builder = builder.normal(b);
        }
        builder
            .normal(g_prefix)
            .operator_pending(g_prefix)
            .normal(Binding::new(
                'd',
                true,
                BoundAction::Operator(OperatorKind::Delete),
            ))
            .normal(Binding::new(
                'x',
                true,
                BoundAction::Special(SpecialKind::OperatorShorthand {
                    op: OperatorKind::Delete,
                    motion: M::CellsUnderCursor,
                }),
            ))
            .normal(Binding::new(
                'D',
                false,
                BoundAction::Special(SpecialKind::OperatorShorthand {
                    op: OperatorKind::Delete,
                    motion: M::LineEnd,
                }),
            ))
            .normal(Binding::new(
                'i',
                false,
                BoundAction::ModeSwitch(ModeRequest::Insert),
            ))
            .normal(Binding::new(
                'a',
                false,
                BoundAction::ModeSwitch(ModeRequest::Append),
            ))
            .normal(Binding::new(
                ':',
                false,
                BoundAction::ModeSwitch(ModeRequest::CommandLine),
            ))
            .prefix(Binding::motion('g', false, M::GridTop))
            .prefix(Binding::motion('o', true, M::CellOffset))
            .build()
    }
}

/// Collects bindings for a [`BindingTable`]; consumed by [`BindingTableBuilder::build`].
#[derive(Debug, Default)]
pub struct BindingTableBuilder {
    normal: Vec<Binding>,
    operator_pending: Vec<Binding>,
    prefix: Vec<Binding>,
}

impl BindingTableBuilder {
    pub fn normal(mut self, binding: Binding) -> Self {
        self.normal.push(binding);
        self
    }

    pub fn operator_pending(mut self, binding: Binding) -> Self {
        self.operator_pending.push(binding);
        self
    }

    pub fn prefix(mut self, binding: Binding) -> Self {
        self.prefix.push(binding);
        self
    }

    pub fn build(self) -> BindingTable {
        let collect = |specs: Vec<Binding>| {
            let mut map = KeyMap::default();
            for b in specs {
                map.insert(b);
            }
            map
        };
        let table = BindingTable {
            normal: collect(self.normal),
            operator_pending: collect(self.operator_pending),
            prefix: collect(self.prefix),
        };
        debug!(
            target: "input.keymap",
            normal = table.normal.len(),
            operator_pending = table.operator_pending.len(),
            prefix = table.prefix.len(),
            "binding_table_built"
        );
        table
    }
}
