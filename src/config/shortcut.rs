//! Key-chord parsing and normalization.
//!
//! Shortcuts are stored in the config file as text such as `Ctrl+Shift+R`.
//! Parsing is case-insensitive and accepts common aliases; the canonical form
//! orders modifiers `Ctrl+Alt+Shift+Meta`, upper-cases letters and uses one
//! name per key.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default chord for toggling recording.
pub const DEFAULT_RECORD_SHORTCUT: &str = "Ctrl+R";
/// Default chord for playing the last recording.
pub const DEFAULT_PLAY_SHORTCUT: &str = "Ctrl+Shift+R";

/// Parsed form of [`DEFAULT_RECORD_SHORTCUT`].
pub const DEFAULT_RECORD_CHORD: KeyChord = KeyChord::new(KeyModifiers::CONTROL, KeyCode::Char('R'));
/// Parsed form of [`DEFAULT_PLAY_SHORTCUT`].
pub const DEFAULT_PLAY_CHORD: KeyChord = KeyChord::new(
    KeyModifiers::CONTROL.union(KeyModifiers::SHIFT),
    KeyCode::Char('R'),
);

/// Reasons a shortcut string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    #[error("shortcut is empty")]
    Empty,
    #[error("only single-chord shortcuts are supported")]
    MultipleChords,
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("shortcut has no key, only modifiers")]
    MissingKey,
}

/// A single keyboard shortcut: a set of modifiers plus one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    modifiers: KeyModifiers,
    code: KeyCode,
}

/// Modifiers that take part in chord matching, in canonical order.
const MODIFIER_ORDER: [(KeyModifiers, &str); 4] = [
    (KeyModifiers::CONTROL, "Ctrl"),
    (KeyModifiers::ALT, "Alt"),
    (KeyModifiers::SHIFT, "Shift"),
    (KeyModifiers::SUPER, "Meta"),
];

const NAMED_KEYS: [(KeyCode, &str); 15] = [
    (KeyCode::Char(' '), "Space"),
    (KeyCode::Tab, "Tab"),
    (KeyCode::Enter, "Return"),
    (KeyCode::Esc, "Esc"),
    (KeyCode::Backspace, "Backspace"),
    (KeyCode::Delete, "Del"),
    (KeyCode::Insert, "Ins"),
    (KeyCode::Home, "Home"),
    (KeyCode::End, "End"),
    (KeyCode::PageUp, "PgUp"),
    (KeyCode::PageDown, "PgDown"),
    (KeyCode::Up, "Up"),
    (KeyCode::Down, "Down"),
    (KeyCode::Left, "Left"),
    (KeyCode::Right, "Right"),
];

impl KeyChord {
    pub const fn new(modifiers: KeyModifiers, code: KeyCode) -> Self {
        Self { modifiers, code }
    }

    /// Builds the chord a terminal key event corresponds to.
    ///
    /// Letters are compared case-insensitively; `META` is folded into `SUPER`.
    pub fn from_event(event: &KeyEvent) -> Self {
        let mut modifiers = event.modifiers
            & (KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT | KeyModifiers::SUPER);
        if event.modifiers.contains(KeyModifiers::META) {
            modifiers |= KeyModifiers::SUPER;
        }
        let code = match event.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_uppercase()),
            KeyCode::BackTab => {
                modifiers |= KeyModifiers::SHIFT;
                KeyCode::Tab
            }
            other => other,
        };
        Self { modifiers, code }
    }

    /// Whether a key event triggers this chord.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        Self::from_event(event) == *self
    }
}

impl FromStr for KeyChord {
    type Err = ChordError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChordError::Empty);
        }
        if text.contains(',') && text.len() > 1 && !text.ends_with("+,") {
            return Err(ChordError::MultipleChords);
        }

        let mut tokens: Vec<&str> = text.split('+').map(str::trim).collect();
        // A trailing "++" means the key itself is '+'
        if text.ends_with("++") {
            tokens.pop();
            tokens.pop();
            tokens.push("+");
        } else if text == "+" {
            tokens = vec!["+"];
        }

        let (key_token, modifier_tokens) = tokens.split_last().ok_or(ChordError::Empty)?;

        let mut modifiers = KeyModifiers::NONE;
        for token in modifier_tokens {
            modifiers |= parse_modifier(token)?;
        }

        if key_token.is_empty() {
            return Err(ChordError::MissingKey);
        }
        if parse_modifier(key_token).is_ok() {
            return Err(ChordError::MissingKey);
        }
        let code = parse_key(key_token)?;

        Ok(Self { modifiers, code })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in MODIFIER_ORDER {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        if let Some((_, name)) = NAMED_KEYS.iter().find(|(code, _)| *code == self.code) {
            return f.write_str(name);
        }
        match self.code {
            KeyCode::F(n) => write!(f, "F{n}"),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            other => write!(f, "{other:?}"),
        }
    }
}

fn parse_modifier(token: &str) -> Result<KeyModifiers, ChordError> {
    match token.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Ok(KeyModifiers::CONTROL),
        "alt" | "option" => Ok(KeyModifiers::ALT),
        "shift" => Ok(KeyModifiers::SHIFT),
        "meta" | "super" | "cmd" | "command" | "win" => Ok(KeyModifiers::SUPER),
        _ => Err(ChordError::UnknownModifier(token.to_string())),
    }
}

fn parse_key(token: &str) -> Result<KeyCode, ChordError> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_graphic() {
            return Ok(KeyCode::Char(c.to_ascii_uppercase()));
        }
        return Err(ChordError::UnknownKey(token.to_string()));
    }

    let lower = token.to_ascii_lowercase();
    if let Some(number) = lower.strip_prefix('f') {
        if let Ok(n) = number.parse::<u8>() {
            if (1..=24).contains(&n) {
                return Ok(KeyCode::F(n));
            }
        }
    }

    let code = match lower.as_str() {
        "space" => KeyCode::Char(' '),
        "tab" => KeyCode::Tab,
        "return" | "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "ins" | "insert" => KeyCode::Insert,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pgup" | "pageup" => KeyCode::PageUp,
        "pgdown" | "pagedown" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        _ => return Err(ChordError::UnknownKey(token.to_string())),
    };
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    #[test]
    fn test_parse_defaults() {
        let record: KeyChord = DEFAULT_RECORD_SHORTCUT.parse().unwrap();
        assert_eq!(record, KeyChord::new(KeyModifiers::CONTROL, KeyCode::Char('R')));

        let play: KeyChord = DEFAULT_PLAY_SHORTCUT.parse().unwrap();
        assert_eq!(
            play,
            KeyChord::new(KeyModifiers::CONTROL | KeyModifiers::SHIFT, KeyCode::Char('R'))
        );
        assert_eq!(play.to_string(), "Ctrl+Shift+R");

        assert_eq!(record, DEFAULT_RECORD_CHORD);
        assert_eq!(play, DEFAULT_PLAY_CHORD);
    }

    #[test]
    fn test_canonical_form() {
        let chord: KeyChord = " shift + control + r ".parse().unwrap();
        assert_eq!(chord.to_string(), "Ctrl+Shift+R");

        let chord: KeyChord = "cmd+option+pagedown".parse().unwrap();
        assert_eq!(chord.to_string(), "Alt+Meta+PgDown");

        assert_eq!("alt+f5".parse::<KeyChord>().unwrap().to_string(), "Alt+F5");
        assert_eq!("Ctrl+enter".parse::<KeyChord>().unwrap().to_string(), "Ctrl+Return");
        assert_eq!("ctrl+right".parse::<KeyChord>().unwrap().to_string(), "Ctrl+Right");
        assert_eq!("Ctrl++".parse::<KeyChord>().unwrap().to_string(), "Ctrl++");
        assert_eq!("space".parse::<KeyChord>().unwrap().to_string(), "Space");
    }

    #[test]
    fn test_invalid_chords() {
        assert_eq!("".parse::<KeyChord>(), Err(ChordError::Empty));
        assert_eq!("   ".parse::<KeyChord>(), Err(ChordError::Empty));
        assert_eq!("Ctrl+".parse::<KeyChord>(), Err(ChordError::MissingKey));
        assert_eq!("Ctrl+Shift".parse::<KeyChord>(), Err(ChordError::MissingKey));
        assert_eq!(
            "Hyper+R".parse::<KeyChord>(),
            Err(ChordError::UnknownModifier("Hyper".to_string()))
        );
        assert_eq!(
            "Ctrl+Banana".parse::<KeyChord>(),
            Err(ChordError::UnknownKey("Banana".to_string()))
        );
        assert_eq!("F25".parse::<KeyChord>(), Err(ChordError::UnknownKey("F25".to_string())));
        assert_eq!(
            "Ctrl+K, Ctrl+C".parse::<KeyChord>(),
            Err(ChordError::MultipleChords)
        );
    }

    #[test]
    fn test_matches_key_events() {
        let record = "Ctrl+R".parse::<KeyChord>().unwrap();
        let play = "Ctrl+Shift+R".parse::<KeyChord>().unwrap();

        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(record.matches(&ctrl_r));
        assert!(!play.matches(&ctrl_r));

        let ctrl_shift_r = KeyEvent::new_with_kind(
            KeyCode::Char('R'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
            KeyEventKind::Press,
        );
        assert!(play.matches(&ctrl_shift_r));
        assert!(!record.matches(&ctrl_shift_r));

        let plain_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        assert!(!record.matches(&plain_r));
    }
}
