//! Key event types consumed by the gridvi interpreter.
//!
//! The interpreter is driven one `KeyEvent` at a time. Hosts translate their
//! own terminal/window events into this normalized form; scripts, config files
//! and tests use the textual key notation parsed by [`parse_keys`]
//! (`d2w`, `f<Space>`, `<Esc>`, `<C-c>`).

use std::fmt;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Plain printable key without modifiers.
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::empty())
    }

    pub const fn esc() -> Self {
        Self::new(KeyCode::Esc, KeyModifiers::empty())
    }

    /// The literal character this key types, if any. Tab counts as `'\t'`;
    /// modified keys (`<C-x>`) never type a literal.
    pub fn literal(&self) -> Option<char> {
        if self.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) {
            return None;
        }
        match self.code {
            KeyCode::Char(c) => Some(c),
            KeyCode::Tab => Some('\t'),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// KeyCode enumerates normalized logical key representations consumed by higher layers.
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl fmt::Display for KeyEvent {
    /// Renders the key back into script notation (`w`, `<Esc>`, `<C-c>`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let named = match self.code {
            KeyCode::Char(' ') => Some("Space"),
            KeyCode::Char('<') => Some("lt"),
            KeyCode::Char(_) => None,
            KeyCode::Enter => Some("CR"),
            KeyCode::Esc => Some("Esc"),
            KeyCode::Backspace => Some("BS"),
            KeyCode::Tab => Some("Tab"),
            KeyCode::Up => Some("Up"),
            KeyCode::Down => Some("Down"),
            KeyCode::Left => Some("Left"),
            KeyCode::Right => Some("Right"),
        };
        let mut prefix = String::new();
        if self.mods.contains(KeyModifiers::CTRL) {
            prefix.push_str("C-");
        }
        if self.mods.contains(KeyModifiers::ALT) {
            prefix.push_str("A-");
        }
        match (named, self.code) {
            (None, KeyCode::Char(c)) if prefix.is_empty() => write!(f, "{c}"),
            (None, KeyCode::Char(c)) => write!(f, "<{prefix}{c}>"),
            (Some(name), _) => write!(f, "<{prefix}{name}>"),
            (None, _) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("unterminated key notation starting at offset {0}")]
    Unterminated(usize),
    #[error("unknown key name `<{0}>`")]
    UnknownName(String),
    #[error("empty key notation")]
    Empty,
}

/// Parse a single key in notation form (`x`, `<Esc>`, `<C-c>`).
pub fn parse_key(notation: &str) -> Result<KeyEvent, KeyParseError> {
    let keys = parse_keys(notation)?;
    match keys.as_slice() {
        [single] => Ok(*single),
        _ => Err(KeyParseError::UnknownName(notation.to_string())),
    }
}

/// Parse a key script. Printable characters map to themselves; `<...>` groups
/// name special keys and modifier chords.
pub fn parse_keys(script: &str) -> Result<Vec<KeyEvent>, KeyParseError> {
    if script.is_empty() {
        return Err(KeyParseError::Empty);
    }
    let mut out = Vec::with_capacity(script.len());
    let mut rest = script.char_indices();
    while let Some((offset, c)) = rest.next() {
        if c != '<' {
            out.push(KeyEvent::char(c));
            continue;
        }
        let mut name = String::new();
        let mut closed = false;
        for (_, n) in rest.by_ref() {
            if n == '>' {
                closed = true;
                break;
            }
            name.push(n);
        }
        if !closed {
            return Err(KeyParseError::Unterminated(offset));
        }
        out.push(parse_named(&name)?);
    }
    trace!(target: "input.keys", script, parsed = out.len(), "parse_keys");
    Ok(out)
}

fn parse_named(name: &str) -> Result<KeyEvent, KeyParseError> {
    let mut mods = KeyModifiers::empty();
    let mut base = name;
    loop {
        if let Some(r) = base.strip_prefix("C-").or_else(|| base.strip_prefix("c-")) {
            mods |= KeyModifiers::CTRL;
            base = r;
        } else if let Some(r) = base.strip_prefix("A-").or_else(|| base.strip_prefix("M-")) {
            mods |= KeyModifiers::ALT;
            base = r;
        } else {
            break;
        }
    }
    let code = match base.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        _ => {
            let mut chars = base.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !mods.is_empty() => KeyCode::Char(c),
                _ => return Err(KeyParseError::UnknownName(name.to_string())),
            }
        }
    };
    Ok(KeyEvent::new(code, mods))
}
