//! Interpreter facade: one instance per grid session.
//!
//! Owns the translator (and through it the immutable binding table) plus the
//! last char search, which outlives individual commands and is never reset by
//! cancellation.

use crate::dispatcher::{self, DispatchResult};
use crate::key_translator::{InputState, KeyTranslator, Translation};
use crate::{Action, ModeRequest};
use core_config::Config;
use core_events::{KeyEvent, parse_key};
use core_grid::find::LastFind;
use core_grid::motion::MotionResult;
use core_grid::{GridMutator, Position};
use core_keymap::BindingTable;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a host needs to report about one executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    pub action: Action,
    pub motion: MotionResult,
    /// Keys as typed, counts omitted when the effective count is 1.
    pub echo: String,
    pub cursor: Position,
    pub removed: usize,
    pub rewarded: bool,
}

impl CommandReport {
    fn new(action: Action, echo: String, res: DispatchResult) -> Self {
        Self {
            action,
            motion: res
                .motion
                .unwrap_or_else(|| MotionResult::invalid(res.cursor)),
            echo,
            cursor: res.cursor,
            removed: res.removal.removed,
            rewarded: res.removal.rewarded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Pending,
    Cancelled,
    /// The key means nothing here; the host may interpret it.
    NotHandled(KeyEvent),
    /// The host should switch modes; the interpreter changes nothing itself.
    ModeSwitch {
        request: ModeRequest,
        echo: String,
    },
    Executed(CommandReport),
}

#[derive(Debug)]
pub struct Interpreter {
    translator: KeyTranslator,
    last_find: Option<LastFind>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Standard bindings, `<Esc>` cancels.
    pub fn new() -> Self {
        Self::with_table(Arc::new(BindingTable::standard()))
    }

    pub fn with_table(table: Arc<BindingTable>) -> Self {
        Self {
            translator: KeyTranslator::new(table),
            last_find: None,
        }
    }

    /// Standard bindings with the cancel keys named in `[input] cancel`.
    pub fn from_config(config: &Config) -> Self {
        Self::new().with_cancel_keys(cancel_keys_from(config.cancel_notations()))
    }

    pub fn with_cancel_keys<I: IntoIterator<Item = KeyEvent>>(mut self, keys: I) -> Self {
        self.translator = self.translator.with_cancel_keys(keys);
        self
    }

    /// Feed one key. Completed commands are resolved and applied to `grid`
    /// and `cursor` before returning.
    pub fn feed<G: GridMutator + ?Sized>(
        &mut self,
        grid: &mut G,
        cursor: &mut Position,
        key: &KeyEvent,
    ) -> KeyOutcome {
        match self.translator.translate(key) {
            Translation::Pending => KeyOutcome::Pending,
            Translation::Cancelled => KeyOutcome::Cancelled,
            Translation::NotHandled => KeyOutcome::NotHandled(*key),
            Translation::Complete { action, echo } => {
                let res = dispatcher::dispatch(action, grid, cursor, &mut self.last_find);
                match action {
                    Action::ModeSwitch(request) => KeyOutcome::ModeSwitch { request, echo },
                    _ => KeyOutcome::Executed(CommandReport::new(action, echo, res)),
                }
            }
        }
    }

    /// Feed a key sequence, collecting every outcome.
    pub fn feed_all<G: GridMutator + ?Sized>(
        &mut self,
        grid: &mut G,
        cursor: &mut Position,
        keys: &[KeyEvent],
    ) -> Vec<KeyOutcome> {
        keys.iter().map(|k| self.feed(grid, cursor, k)).collect()
    }

    pub fn state(&self) -> InputState {
        self.translator.state()
    }

    pub fn last_find(&self) -> Option<LastFind> {
        self.last_find
    }

    /// Keys of the command in progress, for a status line.
    pub fn pending_echo(&self) -> String {
        self.translator.pending_echo()
    }

    /// Abandon any partial command. The last find survives.
    pub fn reset(&mut self) {
        self.translator.reset();
    }
}

/// Parse configured cancel notations, skipping invalid ones. Falls back to
/// `<Esc>` when nothing usable remains.
pub fn cancel_keys_from(notations: &[String]) -> Vec<KeyEvent> {
    let mut keys = Vec::with_capacity(notations.len());
    for notation in notations {
        match parse_key(notation) {
            Ok(key) => keys.push(key),
            Err(e) => {
                warn!(target: "config", notation = %notation, error = %e, "cancel_key_skipped")
            }
        }
    }
    if keys.is_empty() {
        warn!(target: "config", "no_usable_cancel_keys_falling_back_to_esc");
        keys.push(KeyEvent::esc());
    }
    debug!(target: "input.context", cancel_keys = keys.len(), "cancel_keys_configured");
    keys
}
