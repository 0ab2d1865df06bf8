//! Animated "Loading..." row shown while a page is in flight.

use lazypick_core::subscriptions::Every;
use lazypick_core::{subscribe, Command, Component, Subscription};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::time::Duration;

/// Built-in spinner frame sets.
pub mod frames {
    /// Braille dot spinner cycling through ten positions.
    pub const DOTS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    /// Classic ASCII line spinner for terminals without braille glyphs.
    pub const LINE: &[&str] = &["|", "/", "-", "\\"];
}

#[derive(Debug, Clone)]
pub enum Message {
    /// Advance the spinner to its next frame.
    Tick,
}

/// Cycles through a frame set on a timer while spinning.
///
/// The tick subscription only exists while [`is_spinning`](Spinner::is_spinning),
/// so a stopped spinner costs nothing.
pub struct Spinner {
    frames: &'static [&'static str],
    frame_index: usize,
    title: String,
    style: Style,
    interval: Duration,
    spinning: bool,
    id: &'static str,
}

impl Spinner {
    /// Defaults to [`frames::DOTS`] at 100ms per frame, stopped.
    pub fn new(id: &'static str) -> Self {
        Self {
            frames: frames::DOTS,
            frame_index: 0,
            title: String::new(),
            style: Style::default().fg(Color::Cyan),
            interval: Duration::from_millis(100),
            spinning: false,
            id,
        }
    }

    pub fn with_frames(mut self, frames: &'static [&'static str]) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn start(&mut self) {
        self.spinning = true;
    }

    /// Stop and rewind to the first frame.
    pub fn stop(&mut self) {
        self.spinning = false;
        self.frame_index = 0;
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Current frame followed by the title.
    pub fn text(&self) -> String {
        let frame = self.frames.get(self.frame_index).copied().unwrap_or("");
        if self.title.is_empty() {
            frame.to_string()
        } else {
            format!("{} {}", frame, self.title)
        }
    }
}

impl Component for Spinner {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Tick => {
                if self.spinning && !self.frames.is_empty() {
                    self.frame_index = (self.frame_index + 1) % self.frames.len();
                }
                Command::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        if !self.spinning || area.width == 0 || area.height == 0 {
            return;
        }
        let paragraph = Paragraph::new(Span::styled(self.text(), self.style));
        frame.render_widget(paragraph, area);
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        if self.spinning {
            vec![subscribe(Every::new(self.interval, self.id))
                .map(|_: std::time::Instant| Message::Tick)]
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_advance_while_spinning() {
        let mut spinner = Spinner::new("test").with_frames(frames::LINE).with_title("Loading...");
        let _ = spinner.update(Message::Tick);
        assert_eq!(spinner.text(), "| Loading...");

        spinner.start();
        let _ = spinner.update(Message::Tick);
        assert_eq!(spinner.text(), "/ Loading...");

        spinner.stop();
        assert_eq!(spinner.text(), "| Loading...");
    }

    #[test]
    fn subscribes_only_while_spinning() {
        let mut spinner = Spinner::new("test");
        assert!(spinner.subscriptions().is_empty());
        spinner.start();
        assert_eq!(spinner.subscriptions().len(), 1);
    }
}
