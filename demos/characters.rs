//! # Character Picker Demo
//!
//! Browse the public character catalogue one page at a time:
//! - Type to filter, Enter to select, Tab to open or close the list
//! - Scroll to the bottom to load the next page
//! - Click a chip or press Backspace on an empty search to deselect
//!
//! Ctrl+Q (or Ctrl+C) quits and prints the selected names.
//!
//! Run with: `cargo run --example characters -- --rows 6 --log-file picker.log`

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lazypick::crossterm::event::{KeyCode, KeyModifiers};
use lazypick::ratatui::layout::{Constraint, Layout};
use lazypick::ratatui::style::{Color, Style};
use lazypick::ratatui::text::{Line, Span};
use lazypick::ratatui::widgets::{Paragraph, Wrap};
use lazypick::ratatui::Frame;
use lazypick::widgets::config::DEFAULT_URL;
use lazypick::widgets::{presenter, ListPresenter, PickerConfig};
use lazypick::{terminal_events, Command, Component, Model, ProgramOptions, Subscription, TerminalEvent};

/// Command-line arguments for the demo.
#[derive(Parser, Debug)]
#[command(name = "characters", about = "Searchable multi-select over a paginated API")]
struct Args {
    #[arg(long, value_name = "URL", env = "LAZYPICK_URL", default_value = DEFAULT_URL)]
    url: String,
    #[arg(long, value_name = "N", env = "LAZYPICK_ROWS", default_value_t = 8)]
    rows: usize,
    #[arg(long, value_name = "SECS", env = "LAZYPICK_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,
    /// Write logs here; the terminal is taken by the UI. Filter with RUST_LOG.
    #[arg(long, value_name = "FILE", env = "LAZYPICK_LOG_FILE")]
    log_file: Option<PathBuf>,
}

struct App {
    picker: ListPresenter,
    selected: Vec<String>,
}

#[derive(Debug)]
enum Msg {
    Picker(presenter::Message),
    Quit,
}

impl Model for App {
    type Message = Msg;
    type Flags = ListPresenter;

    fn init(mut picker: ListPresenter) -> (Self, Command<Msg>) {
        let cmd = picker.start().map(Msg::Picker);
        (
            App {
                picker,
                selected: Vec::new(),
            },
            cmd,
        )
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Picker(presenter::Message::SelectionChanged(names)) => {
                tracing::info!(count = names.len(), "selection changed");
                self.selected = names;
                Command::none()
            }
            Msg::Picker(msg) => self.picker.update(msg).map(Msg::Picker),
            Msg::Quit => {
                let release = self.picker.dispose().map(Msg::Picker);
                Command::batch([release, Command::quit()])
            }
        }
    }

    fn view(&self, frame: &mut Frame) {
        let [picker_area, summary_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(4)]).areas(frame.area());

        self.picker.view(frame, picker_area);

        let summary = if self.selected.is_empty() {
            Line::styled("Nothing selected", Style::default().fg(Color::DarkGray))
        } else {
            Line::from(vec![
                Span::styled("Selected: ", Style::default().fg(Color::Cyan)),
                Span::raw(self.selected.join(", ")),
            ])
        };
        let footer = Line::styled("ctrl+q quit", Style::default().fg(Color::DarkGray));
        frame.render_widget(
            Paragraph::new(vec![summary, Line::raw(""), footer]).wrap(Wrap { trim: true }),
            summary_area,
        );
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        let mut subs = vec![terminal_events(|ev| match ev {
            TerminalEvent::Key(key)
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c')) =>
            {
                Some(Msg::Quit)
            }
            other => presenter::Message::from_terminal_event(other).map(Msg::Picker),
        })];
        subs.extend(
            self.picker
                .subscriptions()
                .into_iter()
                .map(|sub| sub.map(Msg::Picker)),
        );
        subs
    }
}

#[lazypick::tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = PickerConfig::default()
        .with_initial_url(args.url)
        .with_max_rows(args.rows)
        .with_request_timeout(Duration::from_secs(args.timeout_secs));
    let picker = ListPresenter::http(config)?;

    let options = ProgramOptions {
        title: Some("lazypick".to_string()),
        log_file: args.log_file,
        ..ProgramOptions::default()
    };
    let app = lazypick::run_with::<App>(picker, options).await?;

    for name in app.picker.selected_names() {
        println!("{name}");
    }
    Ok(())
}
