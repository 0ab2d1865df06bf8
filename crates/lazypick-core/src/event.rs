use crossterm::event::{KeyEvent, KeyEventKind, MouseEvent};

/// Terminal events delivered through the
/// [`terminal_events`](crate::subscriptions::terminal_events) subscription.
///
/// Each variant wraps the corresponding [`crossterm::event::Event`] payload.
/// Key releases and repeats are not forwarded; only presses reach models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A key press.
    Key(KeyEvent),
    /// A mouse event (only reported while mouse capture is enabled).
    Mouse(MouseEvent),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// Bracketed paste content.
    Paste(String),
}

impl TerminalEvent {
    /// Convert a raw crossterm event, dropping the kinds models never see.
    pub fn from_crossterm(event: crossterm::event::Event) -> Option<Self> {
        match event {
            crossterm::event::Event::Key(k) if k.kind == KeyEventKind::Press => {
                Some(TerminalEvent::Key(k))
            }
            crossterm::event::Event::Key(_) => None,
            crossterm::event::Event::Mouse(m) => Some(TerminalEvent::Mouse(m)),
            crossterm::event::Event::Resize(w, h) => Some(TerminalEvent::Resize(w, h)),
            crossterm::event::Event::Paste(s) => Some(TerminalEvent::Paste(s)),
            crossterm::event::Event::FocusGained | crossterm::event::Event::FocusLost => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> crossterm::event::Event {
        crossterm::event::Event::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn key_releases_are_dropped() {
        assert!(TerminalEvent::from_crossterm(key(KeyEventKind::Press)).is_some());
        assert!(TerminalEvent::from_crossterm(key(KeyEventKind::Release)).is_none());
    }
}
