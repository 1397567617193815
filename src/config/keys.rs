//! Keybinding configuration types and parsing
//!
//! Keys are written in vim-style notation (e.g., "C-x", "S-x", "<CR>", "<Tab>").

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ui::action::Action;
use crate::ui::events::{FocusColumn, ViewState};

/// A key combination (key code + modifiers)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Create a KeyCombo from a crossterm KeyEvent.
    ///
    /// Uppercase characters become lowercase + SHIFT so that "X" in config matches
    /// Shift+x key events. BackTab is reported by terminals as Shift+BackTab and is
    /// kept as-is.
    pub fn from_key_event(event: &KeyEvent) -> Self {
        match event.code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => Self {
                code: KeyCode::Char(c.to_ascii_lowercase()),
                modifiers: event.modifiers | KeyModifiers::SHIFT,
            },
            _ => Self {
                code: event.code,
                modifiers: event.modifiers,
            },
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("C");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("M");
        }

        let key_str = match self.code {
            KeyCode::Char(' ') => "<Space>".to_string(),
            KeyCode::Char(c) if self.modifiers.contains(KeyModifiers::SHIFT) => {
                c.to_ascii_uppercase().to_string()
            }
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "<CR>".to_string(),
            KeyCode::Esc => "<Esc>".to_string(),
            KeyCode::Tab => "<Tab>".to_string(),
            KeyCode::Backspace => "<BS>".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            _ => format!("{:?}", self.code),
        };

        if parts.is_empty() {
            write!(f, "{}", key_str)
        } else {
            parts.push(&key_str);
            write!(f, "{}", parts.join("-"))
        }
    }
}

impl FromStr for KeyCombo {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key_notation(s)
    }
}

/// Context for keybindings (which screen or pane has the keyboard)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyContext {
    /// Keys that work everywhere unless a context overrides them
    Global,
    /// One of the four selection columns
    Matrix,
    /// Project tree
    Sidebar,
    /// Review screen before launch
    Confirm,
    /// Viewing a session's captured output
    Output,
    /// Fatal error screen
    Error,
}

impl KeyContext {
    /// Table names accepted under `[keys]` in the config file
    pub fn from_table_name(name: &str) -> Option<Self> {
        match name {
            "matrix" => Some(KeyContext::Matrix),
            "sidebar" => Some(KeyContext::Sidebar),
            "confirm" => Some(KeyContext::Confirm),
            "output" => Some(KeyContext::Output),
            "error" => Some(KeyContext::Error),
            _ => None,
        }
    }

    /// Resolve the active context from the orchestrator's view and focus
    pub fn resolve(view: ViewState, focus: FocusColumn, viewing_output: bool) -> Self {
        match view {
            ViewState::Error => KeyContext::Error,
            ViewState::Confirm => KeyContext::Confirm,
            ViewState::Matrix if viewing_output && focus != FocusColumn::Sidebar => {
                KeyContext::Output
            }
            ViewState::Matrix if focus == FocusColumn::Sidebar => KeyContext::Sidebar,
            ViewState::Matrix => KeyContext::Matrix,
        }
    }
}

/// Configuration for all keybindings
#[derive(Debug, Clone, Default)]
pub struct KeybindingConfig {
    /// Global keybindings (apply to all contexts unless overridden)
    pub global: HashMap<KeyCombo, Action>,
    /// Context-specific keybindings
    pub context: HashMap<KeyContext, HashMap<KeyCombo, Action>>,
}

impl KeybindingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an action for a key combo in a given context.
    /// Context bindings win over global ones.
    pub fn get_action(&self, key: &KeyCombo, context: KeyContext) -> Option<Action> {
        self.context
            .get(&context)
            .and_then(|bindings| bindings.get(key))
            .or_else(|| self.global.get(key))
            .copied()
    }

    /// Merge user configuration on top of defaults
    pub fn merge(&mut self, other: KeybindingConfig) {
        self.global.extend(other.global);
        for (ctx, bindings) in other.context {
            self.context.entry(ctx).or_default().extend(bindings);
        }
    }

    /// First key bound to `action` in `context` (falling back to global), for hints
    pub fn key_for(&self, action: Action, context: KeyContext) -> Option<KeyCombo> {
        let pick = |map: &HashMap<KeyCombo, Action>| {
            let mut keys: Vec<&KeyCombo> = map
                .iter()
                .filter(|(_, bound)| **bound == action)
                .map(|(key, _)| key)
                .collect();
            // Stable choice across HashMap iteration orders
            keys.sort_by_key(|key| key.to_string());
            keys.first().map(|key| (*key).clone())
        };
        self.context
            .get(&context)
            .and_then(pick)
            .or_else(|| pick(&self.global))
    }
}

/// Parse a vim-style key notation string into a KeyCombo
///
/// Supported notation:
/// - `C-x` for Ctrl+x, `M-x` for Alt+x, `S-x` or `X` for Shift+x
/// - `<CR>`, `<Esc>`, `<Tab>`, `<BS>`, `<Del>`, `<Space>`
/// - `<Up>`, `<Down>`, `<Left>`, `<Right>`, `<PageUp>`, `<PageDown>`, `<Home>`, `<End>`
/// - `<F1>` through `<F12>`
pub fn parse_key_notation(s: &str) -> Result<KeyCombo, KeyParseError> {
    let s = s.trim();

    if s.is_empty() {
        return Err(KeyParseError::Empty);
    }

    if s.starts_with('<') && s.ends_with('>') {
        return parse_special_key(s);
    }

    let parts: Vec<&str> = s.split('-').collect();
    let mut modifiers = KeyModifiers::NONE;
    let mut key_part = None;

    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        match *part {
            "C" if !is_last => modifiers |= KeyModifiers::CONTROL,
            "M" if !is_last => modifiers |= KeyModifiers::ALT,
            "S" if !is_last => modifiers |= KeyModifiers::SHIFT,
            _ => key_part = Some(*part),
        }
    }

    let key_str = key_part.ok_or(KeyParseError::NoKey)?;
    let (code, needs_shift) = parse_key_code(key_str)?;
    if needs_shift {
        modifiers |= KeyModifiers::SHIFT;
    }

    Ok(KeyCombo::new(code, modifiers))
}

/// Parse a special key notation like <CR>, <Esc>, <C-CR>
fn parse_special_key(s: &str) -> Result<KeyCombo, KeyParseError> {
    let inner = &s[1..s.len() - 1];
    let parts: Vec<&str> = inner.split('-').collect();

    let mut modifiers = KeyModifiers::NONE;
    let mut key_name = inner;

    if parts.len() > 1 {
        for part in &parts[..parts.len() - 1] {
            match *part {
                "C" => modifiers |= KeyModifiers::CONTROL,
                "M" => modifiers |= KeyModifiers::ALT,
                "S" => modifiers |= KeyModifiers::SHIFT,
                _ => return Err(KeyParseError::InvalidModifier(part.to_string())),
            }
        }
        key_name = parts[parts.len() - 1];
    }

    let code = match key_name.to_uppercase().as_str() {
        "CR" | "ENTER" | "RETURN" => KeyCode::Enter,
        "ESC" | "ESCAPE" => KeyCode::Esc,
        "TAB" => KeyCode::Tab,
        "BS" | "BACKSPACE" => KeyCode::Backspace,
        "DEL" | "DELETE" => KeyCode::Delete,
        "UP" => KeyCode::Up,
        "DOWN" => KeyCode::Down,
        "LEFT" => KeyCode::Left,
        "RIGHT" => KeyCode::Right,
        "PAGEUP" | "PGUP" => KeyCode::PageUp,
        "PAGEDOWN" | "PGDN" => KeyCode::PageDown,
        "HOME" => KeyCode::Home,
        "END" => KeyCode::End,
        "SPACE" => KeyCode::Char(' '),
        name if name.starts_with('F') && name.len() > 1 => {
            let num: u8 = name[1..]
                .parse()
                .map_err(|_| KeyParseError::InvalidKey(name.to_string()))?;
            if num == 0 || num > 12 {
                return Err(KeyParseError::InvalidKey(name.to_string()));
            }
            KeyCode::F(num)
        }
        _ => return Err(KeyParseError::InvalidSpecialKey(key_name.to_string())),
    };

    Ok(KeyCombo::new(code, modifiers))
}

/// Parse a single key code. Returns the KeyCode and whether SHIFT should be added.
fn parse_key_code(s: &str) -> Result<(KeyCode, bool), KeyParseError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok((KeyCode::Char(c.to_ascii_lowercase()), c.is_ascii_uppercase())),
        _ if s.starts_with('<') && s.ends_with('>') => {
            parse_special_key(s).map(|combo| (combo.code, false))
        }
        _ => match s.to_uppercase().as_str() {
            "SPACE" => Ok((KeyCode::Char(' '), false)),
            "TAB" => Ok((KeyCode::Tab, false)),
            "ENTER" | "CR" | "RETURN" => Ok((KeyCode::Enter, false)),
            "ESC" | "ESCAPE" => Ok((KeyCode::Esc, false)),
            "BS" | "BACKSPACE" => Ok((KeyCode::Backspace, false)),
            _ => Err(KeyParseError::InvalidKey(s.to_string())),
        },
    }
}

/// Error type for key parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("empty key notation")]
    Empty,
    #[error("no key specified")]
    NoKey,
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("invalid modifier: {0}")]
    InvalidModifier(String),
    #[error("invalid special key: {0}")]
    InvalidSpecialKey(String),
}
