//! **lazypick** -- a searchable multi-select list for [`ratatui`] that pages
//! in remote options as you scroll.
//!
//! This is the umbrella crate that re-exports everything needed to embed the
//! picker from a single dependency:
//!
//! ```toml
//! [dependencies]
//! lazypick = "0.1"
//! ```
//!
//! # Re-exports
//!
//! * All public items from [`lazypick_core`] are available at the crate root
//!   ([`Model`], [`Component`], [`Command`], [`Subscription`], [`Program`],
//!   [`run`], [`run_with`], etc.).
//! * The [`widgets`] module re-exports everything from [`lazypick_widgets`]
//!   (the page store, selection, presenter, and their helpers).
//! * [`ratatui`], [`crossterm`], and [`tokio`] are re-exported so downstream
//!   crates do not need to depend on them directly.
//!
//! # Quick start
//!
//! ```ignore
//! use lazypick::widgets::{presenter, ListPresenter, PickerConfig};
//! use lazypick::{terminal_events, Command, Component, Model, Subscription};
//! use ratatui::Frame;
//!
//! struct App {
//!     picker: ListPresenter,
//! }
//!
//! impl Model for App {
//!     type Message = presenter::Message;
//!     type Flags = ListPresenter;
//!
//!     fn init(mut picker: ListPresenter) -> (Self, Command<Self::Message>) {
//!         let cmd = picker.start();
//!         (App { picker }, cmd)
//!     }
//!     fn update(&mut self, msg: Self::Message) -> Command<Self::Message> {
//!         self.picker.update(msg)
//!     }
//!     fn view(&self, frame: &mut Frame) {
//!         self.picker.view(frame, frame.area());
//!     }
//!     fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
//!         let mut subs = vec![terminal_events(presenter::Message::from_terminal_event)];
//!         subs.extend(self.picker.subscriptions());
//!         subs
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let picker = ListPresenter::http(PickerConfig::default())?;
//!     lazypick::run::<App>(picker).await?;
//!     Ok(())
//! }
//! ```

pub use lazypick_core::*;
pub mod widgets {
    pub use lazypick_widgets::*;
}

// Re-export dependencies for use in demos and downstream crates
pub use crossterm;
pub use ratatui;
pub use tokio;
