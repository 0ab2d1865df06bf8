//! Built-in subscription sources.
//!
//! - **Terminal events** ([`terminal_events`]): key presses, mouse, resize,
//!   and paste events from the terminal.
//! - **Timers** ([`Every`]): a repeating tick, used for spinner animation.

mod terminal;
mod timer;

pub use terminal::*;
pub use timer::*;
