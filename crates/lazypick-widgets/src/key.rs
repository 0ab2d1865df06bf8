//! Key bindings and the one-line key hint rendered under the picker.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// A key binding that maps one or more key combinations to a described action.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The set of key combinations that trigger this binding.
    pub keys: Vec<KeyCombination>,
    /// A human-readable description of the action this binding performs.
    pub description: String,
    /// Whether this binding is currently active. Disabled bindings never match.
    pub enabled: bool,
}

/// A single key press with optional modifier keys (Ctrl, Alt, Shift).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombination {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Binding {
    /// Create a new binding for a single key combination with the given description.
    pub fn new(key: KeyCombination, description: impl Into<String>) -> Self {
        Self {
            keys: vec![key],
            description: description.into(),
            enabled: true,
        }
    }

    /// Create a new binding for multiple key combinations with the given description.
    pub fn with_keys(keys: Vec<KeyCombination>, description: impl Into<String>) -> Self {
        Self {
            keys,
            description: description.into(),
            enabled: true,
        }
    }

    /// Return whether the given key event matches any of this binding's key combinations.
    /// Always returns `false` when the binding is disabled.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if !self.enabled {
            return false;
        }
        self.keys
            .iter()
            .any(|k| k.code == event.code && event.modifiers.contains(k.modifiers))
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Label for the hint line: every key joined with `/`.
    pub fn keys_label(&self) -> String {
        self.keys
            .iter()
            .map(KeyCombination::label)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl KeyCombination {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Short human-readable form, e.g. `ctrl+x`, `enter`, `↑`.
    pub fn label(&self) -> String {
        let key = match self.code {
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::PageUp => "pgup".to_string(),
            KeyCode::PageDown => "pgdn".to_string(),
            KeyCode::Home => "home".to_string(),
            KeyCode::End => "end".to_string(),
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::Backspace => "bksp".to_string(),
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            other => format!("{other:?}").to_lowercase(),
        };
        let mut label = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            label.push_str("ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            label.push_str("alt+");
        }
        label.push_str(&key);
        label
    }
}

/// Types that expose their key bindings for the hint line.
pub trait KeyMap {
    /// The most important bindings, in display order.
    fn short_help(&self) -> Vec<&Binding>;
}

/// Styles for [`hint_line`].
#[derive(Debug, Clone, Default)]
pub struct HintStyle {
    pub key: Style,
    pub description: Style,
}

/// Render enabled `bindings` as `key desc • key desc`, stopping with an
/// ellipsis before the line would exceed `max_width` columns.
pub fn hint_line<'a>(bindings: &[&Binding], max_width: usize, style: &HintStyle) -> Line<'a> {
    const SEPARATOR: &str = " \u{2022} ";
    const ELLIPSIS: &str = "\u{2026}";

    let mut spans: Vec<Span<'a>> = Vec::new();
    let mut total = 0;
    for (idx, b) in bindings.iter().filter(|b| b.enabled).enumerate() {
        let keys = b.keys_label();
        let entry = keys.width() + 1 + b.description.width();
        let sep = if idx > 0 { SEPARATOR.width() } else { 0 };
        if total + sep + entry > max_width {
            if total + ELLIPSIS.width() <= max_width {
                spans.push(Span::raw(ELLIPSIS));
            }
            break;
        }
        if idx > 0 {
            spans.push(Span::raw(SEPARATOR));
        }
        spans.push(Span::styled(keys, style.key));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(b.description.clone(), style.description));
        total += sep + entry;
    }
    Line::from(spans)
}
