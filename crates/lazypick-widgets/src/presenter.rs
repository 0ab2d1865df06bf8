//! The searchable multi-select panel.
//!
//! [`ListPresenter`] composes a [`PageStore`] and a [`SelectionController`]
//! with the state only the UI needs: the search term, whether the panel is
//! open, the row cursor, and the geometry of the last render. Everything the
//! user does arrives as a [`Message`]; every page load leaves as a
//! [`Command`].
//!
//! After each message the presenter re-checks whether the last filtered row
//! is on screen. When it comes into view the presenter asks the store for
//! the next page; the store's in-flight guard and end-of-data cursor absorb
//! repeats.
//!
//! # Example
//!
//! ```rust,ignore
//! let source = Arc::new(HttpSource::new(config.request_timeout)?);
//! let mut picker = ListPresenter::new(config, source);
//! let first_page = picker.start();
//! ```

use crate::config::PickerConfig;
use crate::highlight;
use crate::key::{hint_line, Binding, HintStyle, KeyCombination, KeyMap};
use crate::option::{OptionId, SelectOption};
use crate::page_store::{self, LoadOutcome, PageStore};
use crate::scroll::ScrollState;
use crate::selection::SelectionController;
use crate::source::{FetchError, HttpSource, PageSource};
use crate::spinner::{self, Spinner};
use crate::visibility::EndOfListWatch;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use lazypick_core::{Command, Component, Subscription, TerminalEvent};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use unicode_width::UnicodeWidthStr;

/// Terminal lines per option row: the label, then the episode count.
pub const ROW_HEIGHT: usize = 2;

// Borders, search line and hint line.
const FIXED_LINES: usize = 4;

/// Messages for the picker.
#[derive(Debug)]
pub enum Message {
    KeyPress(KeyEvent),
    /// Only delivered while the panel is open (mouse capture is held).
    Mouse(MouseEvent),
    Paste(String),
    Resize(u16, u16),
    /// A page load finished.
    Store(page_store::Message),
    /// Advance the loading spinner.
    SpinnerTick,
    /// Emitted after every selection change with the names of all selected
    /// options, oldest first. Ignored when received.
    SelectionChanged(Vec<String>),
}

impl Message {
    /// Map a terminal event to the picker message that handles it.
    pub fn from_terminal_event(event: TerminalEvent) -> Option<Self> {
        match event {
            TerminalEvent::Key(key) => Some(Message::KeyPress(key)),
            TerminalEvent::Mouse(mouse) => Some(Message::Mouse(mouse)),
            TerminalEvent::Paste(text) => Some(Message::Paste(text)),
            TerminalEvent::Resize(w, h) => Some(Message::Resize(w, h)),
        }
    }
}

/// Configurable key bindings for the picker.
///
/// Printable characters without Ctrl/Alt always go to the search term, so
/// bindings here should use non-character keys or a Ctrl chord.
pub struct PickerKeyBindings {
    /// Default: Up
    pub up: Binding,
    /// Default: Down
    pub down: Binding,
    /// Default: PageUp
    pub page_up: Binding,
    /// Default: PageDown
    pub page_down: Binding,
    /// Default: Home
    pub first: Binding,
    /// Default: End
    pub last: Binding,
    /// Select or deselect the highlighted row. Default: Enter
    pub toggle: Binding,
    /// Delete the last search character, or the last chip when the term is
    /// empty. Default: Backspace
    pub erase: Binding,
    /// Default: Ctrl+X
    pub clear: Binding,
    /// Re-issue a failed page load. Default: Ctrl+R
    pub retry: Binding,
    /// Open or close the panel. Default: Tab
    pub toggle_panel: Binding,
    /// Default: Esc
    pub close: Binding,
}

impl Default for PickerKeyBindings {
    fn default() -> Self {
        Self {
            up: Binding::new(KeyCombination::new(KeyCode::Up), "up"),
            down: Binding::new(KeyCombination::new(KeyCode::Down), "down"),
            page_up: Binding::new(KeyCombination::new(KeyCode::PageUp), "page up"),
            page_down: Binding::new(KeyCombination::new(KeyCode::PageDown), "page down"),
            first: Binding::new(KeyCombination::new(KeyCode::Home), "first"),
            last: Binding::new(KeyCombination::new(KeyCode::End), "last"),
            toggle: Binding::new(KeyCombination::new(KeyCode::Enter), "select"),
            erase: Binding::new(KeyCombination::new(KeyCode::Backspace), "erase"),
            clear: Binding::new(KeyCombination::ctrl(KeyCode::Char('x')), "clear"),
            retry: Binding::new(KeyCombination::ctrl(KeyCode::Char('r')), "retry"),
            toggle_panel: Binding::new(KeyCombination::new(KeyCode::Tab), "open/close"),
            close: Binding::new(KeyCombination::new(KeyCode::Esc), "close"),
        }
    }
}

impl KeyMap for PickerKeyBindings {
    fn short_help(&self) -> Vec<&Binding> {
        vec![
            &self.toggle,
            &self.toggle_panel,
            &self.clear,
            &self.retry,
            &self.close,
        ]
    }
}

/// Style configuration for the picker.
#[derive(Debug, Clone)]
pub struct PickerStyle {
    pub border: Style,
    pub title: Style,
    pub placeholder: Style,
    /// The highlighted row.
    pub cursor: Style,
    /// Search matches inside labels, applied over the row style.
    pub matched: Style,
    pub detail: Style,
    pub chip: Style,
    pub error: Style,
    pub spinner: Style,
    pub hint: HintStyle,
}

impl Default for PickerStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::DarkGray),
            title: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            placeholder: Style::default().fg(Color::DarkGray),
            cursor: Style::default().fg(Color::Cyan),
            matched: Style::default().add_modifier(Modifier::BOLD),
            detail: Style::default().fg(Color::DarkGray),
            chip: Style::default().fg(Color::Black).bg(Color::Cyan),
            error: Style::default().fg(Color::Red),
            spinner: Style::default().fg(Color::Cyan),
            hint: HintStyle {
                key: Style::default().fg(Color::Cyan),
                description: Style::default().fg(Color::DarkGray),
            },
        }
    }
}

enum KeyAction {
    Up,
    Down,
    PageUp,
    PageDown,
    First,
    Last,
    Toggle,
    Erase,
    Clear,
    Retry,
    TogglePanel,
    Close,
    Type(char),
}

/// What the end-of-list watch follows: the last filtered row, how many rows
/// there are, and the cursor they were loaded up to. Any successful load
/// changes it, so a last row that is still on screen after a page arrives
/// triggers the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RowTarget {
    last: OptionId,
    rows: usize,
    cursor: Option<String>,
}

/// Searchable multi-select list over lazily loaded pages.
pub struct ListPresenter {
    config: PickerConfig,
    store: PageStore,
    selection: SelectionController,
    term: String,
    open: bool,
    disposed: bool,
    // Indices into the store's items that match the term, in store order.
    matches: Vec<usize>,
    scroll: ScrollState,
    watch: EndOfListWatch<RowTarget>,
    spinner: Spinner,
    key_bindings: PickerKeyBindings,
    style: PickerStyle,
    // The area the picker was last drawn into; row capacity is measured
    // against it.
    allotted: Cell<Option<Rect>>,
    area: Cell<Rect>,
    search_area: Cell<Rect>,
    rows_area: Cell<Rect>,
    chip_hits: RefCell<Vec<(Rect, OptionId)>>,
}

impl ListPresenter {
    /// Build a picker over `source`. Nothing is fetched until
    /// [`start`](Self::start).
    pub fn new(config: PickerConfig, source: Arc<dyn PageSource>) -> Self {
        let store = PageStore::new(source, config.initial_url.clone());
        let rows = config.max_rows;
        let style = PickerStyle::default();
        Self {
            store,
            selection: SelectionController::new(),
            term: String::new(),
            open: false,
            disposed: false,
            matches: Vec::new(),
            scroll: ScrollState::new(0, rows),
            watch: EndOfListWatch::new(),
            spinner: Spinner::new("lazypick-loading")
                .with_title("Loading...")
                .with_style(style.spinner),
            key_bindings: PickerKeyBindings::default(),
            style,
            allotted: Cell::new(None),
            area: Cell::new(Rect::default()),
            search_area: Cell::new(Rect::default()),
            rows_area: Cell::new(Rect::default()),
            chip_hits: RefCell::new(Vec::new()),
            config,
        }
    }

    /// Build a picker that fetches over HTTP with the configured timeout.
    pub fn http(config: PickerConfig) -> Result<Self, FetchError> {
        let source = HttpSource::new(config.request_timeout)?;
        Ok(Self::new(config, Arc::new(source)))
    }

    pub fn with_key_bindings(mut self, bindings: PickerKeyBindings) -> Self {
        self.key_bindings = bindings;
        self
    }

    pub fn with_style(mut self, style: PickerStyle) -> Self {
        self.spinner = self.spinner.with_style(style.spinner);
        self.style = style;
        self
    }

    pub fn key_bindings(&self) -> &PickerKeyBindings {
        &self.key_bindings
    }

    /// Request the first page.
    pub fn start(&mut self) -> Command<Message> {
        let cmd = self.store.start().map(Message::Store);
        let follow = self.sync();
        Command::batch([cmd, follow])
    }

    /// Tear down: late page results are dropped, the end-of-list watch is
    /// released, and mouse capture is given back if the panel held it.
    /// Every later message is ignored. Idempotent.
    pub fn dispose(&mut self) -> Command<Message> {
        if self.disposed {
            return Command::none();
        }
        tracing::debug!("disposing picker");
        let release = self.close();
        self.store.dispose();
        self.spinner.stop();
        self.disposed = true;
        release
    }

    pub fn store(&self) -> &PageStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn search_term(&self) -> &str {
        &self.term
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Replace the search term and refilter. The selection is untouched and
    /// nothing is fetched here; a newly visible last row is picked up when
    /// the next message is handled.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
        self.rebuild_matches();
        self.scroll.home();
    }

    /// Options whose name contains the term, ignoring case, in load order.
    pub fn visible_rows(&self) -> Vec<&SelectOption> {
        let items = self.store.items();
        self.matches.iter().map(|&i| &items[i]).collect()
    }

    /// The row under the cursor.
    pub fn highlighted(&self) -> Option<&SelectOption> {
        let index = *self.matches.get(self.scroll.cursor())?;
        self.store.items().get(index)
    }

    /// Names of the selected options, oldest first. Options that are not
    /// loaded (any more) show their id.
    pub fn selected_names(&self) -> Vec<String> {
        self.selection
            .selected()
            .iter()
            .map(|id| self.label_for(id))
            .collect()
    }

    /// Select or deselect `id`.
    pub fn toggle(&mut self, id: &OptionId) -> Command<Message> {
        let selected = self.selection.toggle(id);
        tracing::debug!(%id, selected, "selection toggled");
        self.selection_changed()
    }

    /// Ask for the next page if the last filtered row has just come into
    /// view. Closed panels and empty result sets release the watch.
    pub fn detect_end_of_list(&mut self) -> Command<Message> {
        if !self.open || self.disposed {
            self.watch.release();
            return Command::none();
        }
        let Some(&last) = self.matches.last() else {
            self.watch.release();
            return Command::none();
        };
        let target = RowTarget {
            last: self.store.items()[last].id.clone(),
            rows: self.matches.len(),
            cursor: self.store.next_page().map(str::to_string),
        };
        self.watch.observe(target);
        if self.watch.check(self.scroll.last_row_visible()) {
            tracing::debug!(rows = self.matches.len(), "last row in view");
            return self.store.load_next().map(Message::Store);
        }
        Command::none()
    }

    fn label_for(&self, id: &OptionId) -> String {
        self.store
            .get(id)
            .map(|option| option.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn selection_changed(&self) -> Command<Message> {
        Command::message(Message::SelectionChanged(self.selected_names()))
    }

    fn rebuild_matches(&mut self) {
        self.matches = self
            .store
            .items()
            .iter()
            .enumerate()
            .filter(|(_, option)| highlight::contains(&option.name, &self.term))
            .map(|(i, _)| i)
            .collect();
        self.scroll.set_count(self.matches.len());
    }

    fn open(&mut self) -> Command<Message> {
        if self.open {
            return Command::none();
        }
        self.open = true;
        tracing::debug!("panel opened");
        Command::enable_mouse_capture()
    }

    fn close(&mut self) -> Command<Message> {
        if !self.open {
            return Command::none();
        }
        self.open = false;
        self.watch.release();
        tracing::debug!("panel closed");
        Command::disable_mouse_capture()
    }

    // Bring derived state in line after a message: viewport size, then the
    // end-of-list check, then the spinner (the check may start a load).
    fn sync(&mut self) -> Command<Message> {
        let height = self.row_capacity();
        if self.scroll.visible() != height {
            self.scroll.set_visible(height);
        }
        let cmd = self.detect_end_of_list();
        if self.open && self.store.is_loading() {
            self.spinner.start();
        } else if self.spinner.is_spinning() {
            self.spinner.stop();
        }
        cmd
    }

    /// Row slots the open panel gets in the area it was last drawn into.
    /// Before the first draw the configured maximum stands in.
    fn row_capacity(&self) -> usize {
        match self.allotted.get() {
            Some(area) => {
                let (_, chip_lines) = self.chip_layout(area.width.saturating_sub(2));
                self.capacity_in(area.height, chip_lines)
            }
            None => self.config.max_rows,
        }
    }

    fn capacity_in(&self, height: u16, chip_lines: u16) -> usize {
        let room = (height as usize).saturating_sub(FIXED_LINES + chip_lines as usize + 1);
        (room / ROW_HEIGHT).min(self.config.max_rows).max(1)
    }

    fn action_for(&self, key: &KeyEvent) -> Option<KeyAction> {
        let kb = &self.key_bindings;
        let action = if kb.clear.matches(key) {
            KeyAction::Clear
        } else if kb.retry.matches(key) {
            KeyAction::Retry
        } else if kb.toggle_panel.matches(key) {
            KeyAction::TogglePanel
        } else if kb.close.matches(key) {
            KeyAction::Close
        } else if kb.erase.matches(key) {
            KeyAction::Erase
        } else if kb.toggle.matches(key) {
            KeyAction::Toggle
        } else if kb.up.matches(key) {
            KeyAction::Up
        } else if kb.down.matches(key) {
            KeyAction::Down
        } else if kb.page_up.matches(key) {
            KeyAction::PageUp
        } else if kb.page_down.matches(key) {
            KeyAction::PageDown
        } else if kb.first.matches(key) {
            KeyAction::First
        } else if kb.last.matches(key) {
            KeyAction::Last
        } else {
            match key.code {
                KeyCode::Char(c)
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    KeyAction::Type(c)
                }
                _ => return None,
            }
        };
        Some(action)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command<Message> {
        let Some(action) = self.action_for(&key) else {
            return Command::none();
        };
        match action {
            KeyAction::Clear => {
                if self.selection.clear() {
                    tracing::debug!("selection cleared");
                    self.selection_changed()
                } else {
                    Command::none()
                }
            }
            KeyAction::Retry => self.store.retry().map(Message::Store),
            KeyAction::TogglePanel if self.open => self.close(),
            KeyAction::TogglePanel => self.open(),
            KeyAction::Close => self.close(),
            KeyAction::Erase if self.term.is_empty() => match self.selection.remove_last() {
                Some(id) => {
                    tracing::debug!(%id, "removed last chip");
                    self.selection_changed()
                }
                None => Command::none(),
            },
            KeyAction::Erase => {
                let mut term = self.term.clone();
                term.pop();
                self.set_search_term(term);
                Command::none()
            }
            KeyAction::Type(c) => {
                let mut term = self.term.clone();
                term.push(c);
                self.set_search_term(term);
                self.open()
            }
            // Movement and toggling first open a closed panel.
            _ if !self.open => self.open(),
            KeyAction::Toggle => match self.highlighted().map(|o| o.id.clone()) {
                Some(id) => self.toggle(&id),
                None => Command::none(),
            },
            KeyAction::Up => {
                self.scroll.move_up();
                Command::none()
            }
            KeyAction::Down => {
                self.scroll.move_down();
                Command::none()
            }
            KeyAction::PageUp => {
                self.scroll.page_up();
                Command::none()
            }
            KeyAction::PageDown => {
                self.scroll.page_down();
                Command::none()
            }
            KeyAction::First => {
                self.scroll.home();
                Command::none()
            }
            KeyAction::Last => {
                self.scroll.end();
                Command::none()
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Command<Message> {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(_) if !self.area.get().contains(pos) => {
                tracing::trace!(x = pos.x, y = pos.y, "press outside picker");
                self.close()
            }
            MouseEventKind::Down(MouseButton::Left) => self.click(pos),
            MouseEventKind::ScrollDown if self.rows_area.get().contains(pos) => {
                self.scroll.scroll_by(1);
                Command::none()
            }
            MouseEventKind::ScrollUp if self.rows_area.get().contains(pos) => {
                self.scroll.scroll_by(-1);
                Command::none()
            }
            _ => Command::none(),
        }
    }

    fn click(&mut self, pos: Position) -> Command<Message> {
        let chip = self
            .chip_hits
            .borrow()
            .iter()
            .find(|(rect, _)| rect.contains(pos))
            .map(|(_, id)| id.clone());
        if let Some(id) = chip {
            return self.toggle(&id);
        }
        if self.search_area.get().contains(pos) {
            return if self.open { self.close() } else { self.open() };
        }
        let rows = self.rows_area.get();
        if self.open && rows.contains(pos) {
            let index = self.scroll.offset() + (pos.y - rows.y) as usize / ROW_HEIGHT;
            if index < self.matches.len() {
                self.scroll.select(index);
                if let Some(id) = self.highlighted().map(|o| o.id.clone()) {
                    return self.toggle(&id);
                }
            }
        }
        Command::none()
    }

    fn chip_layout(&self, width: u16) -> (Vec<Chip>, u16) {
        let mut chips = Vec::new();
        let (mut x, mut line) = (0u16, 0u16);
        for id in self.selection.selected() {
            let text = format!(" {} \u{00d7} ", self.label_for(id));
            let w = (text.width() as u16).min(width);
            if x > 0 && x + w > width {
                x = 0;
                line += 1;
            }
            chips.push(Chip {
                id: id.clone(),
                text,
                x,
                line,
                width: w,
            });
            x = x.saturating_add(w + 1);
        }
        let lines = if chips.is_empty() { 0 } else { line + 1 };
        (chips, lines)
    }

    fn render_chips(&self, frame: &mut Frame, area: Rect, chips: Vec<Chip>) {
        let mut hits = self.chip_hits.borrow_mut();
        for chip in chips {
            let rect = Rect {
                x: area.x + chip.x,
                y: area.y + chip.line,
                width: chip.width,
                height: 1,
            }
            .intersection(area);
            if rect.is_empty() {
                continue;
            }
            frame.render_widget(Paragraph::new(Span::styled(chip.text, self.style.chip)), rect);
            hits.push((rect, chip.id));
        }
    }

    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let indicator = if self.open { "\u{25be} " } else { "\u{25b8} " };
        let mut spans = vec![Span::styled(indicator, self.style.cursor)];
        if self.term.is_empty() && !self.open {
            spans.push(Span::styled(self.config.placeholder.as_str(), self.style.placeholder));
        } else {
            spans.push(Span::raw(self.term.as_str()));
        }
        if self.open {
            spans.push(Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_rows(&self, frame: &mut Frame, area: Rect) {
        let items = self.store.items();
        let mut lines = Vec::with_capacity(area.height as usize);
        for pos in self.scroll.window() {
            let option = &items[self.matches[pos]];
            let on_cursor = pos == self.scroll.cursor();
            let base = if on_cursor { self.style.cursor } else { Style::default() };
            let marker = if on_cursor { "\u{25b8} " } else { "  " };
            let check = if self.selection.is_selected(&option.id) {
                "[x] "
            } else {
                "[ ] "
            };
            let mut label = vec![Span::styled(marker, base), Span::styled(check, base)];
            label.extend(highlight::spans(
                &option.name,
                &self.term,
                base,
                self.style.matched,
            ));
            lines.push(Line::from(label));
            lines.push(Line::from(Span::styled(
                format!("      {} Episodes", option.episode_count),
                self.style.detail,
            )));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.spinner.is_spinning() {
            self.spinner.view(frame, area);
            return;
        }
        let line = if let Some(failed) = self.store.last_error() {
            Line::from(vec![
                Span::styled(format!("Failed to load: {}", failed.reason), self.style.error),
                Span::styled(
                    format!(" \u{00b7} {} retry", self.key_bindings.retry.keys_label()),
                    self.style.detail,
                ),
            ])
        } else if self.matches.is_empty() && !self.store.is_empty() {
            Line::styled("No matches", self.style.detail)
        } else {
            return;
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

struct Chip {
    id: OptionId,
    text: String,
    x: u16,
    line: u16,
    width: u16,
}

impl Component for ListPresenter {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        if self.disposed {
            return Command::none();
        }
        let cmd = match msg {
            Message::KeyPress(key) => self.handle_key(key),
            Message::Mouse(mouse) => self.handle_mouse(mouse),
            Message::Paste(text) => {
                let term = format!("{}{}", self.term, text.replace(['\r', '\n'], " "));
                self.set_search_term(term);
                self.open()
            }
            Message::Store(msg) => {
                if let LoadOutcome::Merged { .. } = self.store.update(msg) {
                    self.rebuild_matches();
                }
                Command::none()
            }
            Message::SpinnerTick => {
                let _ = self.spinner.update(spinner::Message::Tick);
                Command::none()
            }
            // The viewport is re-measured on the next render.
            Message::Resize(..) => Command::none(),
            // Notification for the embedding model.
            Message::SelectionChanged(_) => Command::none(),
        };
        let follow = self.sync();
        Command::batch([cmd, follow])
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        self.chip_hits.borrow_mut().clear();
        self.allotted.set(Some(area));
        if area.width < 4 || area.height < 3 {
            self.area.set(Rect::default());
            self.search_area.set(Rect::default());
            self.rows_area.set(Rect::default());
            return;
        }

        let (chips, chip_lines) = self.chip_layout(area.width - 2);
        let mut shown = 0;
        let mut needed = FIXED_LINES + chip_lines as usize;
        if self.open {
            let capacity = self.capacity_in(area.height, chip_lines);
            shown = capacity.min(self.matches.len());
            needed += shown * ROW_HEIGHT + 1;
        }
        let boxed = Rect {
            height: (needed as u16).min(area.height),
            ..area
        };
        self.area.set(boxed);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.style.border)
            .title(Span::styled(format!(" {} ", self.config.title), self.style.title));
        let inner = block.inner(boxed);
        frame.render_widget(block, boxed);

        let mut constraints = vec![Constraint::Length(chip_lines), Constraint::Length(1)];
        if self.open {
            constraints.push(Constraint::Length((shown * ROW_HEIGHT) as u16));
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Length(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        self.render_chips(frame, chunks[0], chips);
        self.search_area.set(chunks[1]);
        self.render_search(frame, chunks[1]);

        let hint_area = if self.open {
            self.rows_area.set(chunks[2]);
            self.render_rows(frame, chunks[2]);
            self.render_status(frame, chunks[3]);
            chunks[4]
        } else {
            self.rows_area.set(Rect::default());
            chunks[2]
        };
        let hint = hint_line(
            &self.key_bindings.short_help(),
            hint_area.width as usize,
            &self.style.hint,
        );
        frame.render_widget(Paragraph::new(hint), hint_area);
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        self.spinner
            .subscriptions()
            .into_iter()
            .map(|sub| sub.map(|_| Message::SpinnerTick))
            .collect()
    }

    fn focused(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{characters, named, ScriptedSource};
    use lazypick_core::testing::TestProgram;
    use lazypick_core::{Model, TerminalCommand};

    const PAGE2: &str = "page2url";

    struct Harness {
        picker: ListPresenter,
        changes: Vec<Vec<String>>,
    }

    impl Model for Harness {
        type Message = Message;
        type Flags = (PickerConfig, Arc<ScriptedSource>);

        fn init((config, source): Self::Flags) -> (Self, Command<Message>) {
            let mut picker = ListPresenter::new(config, source);
            let cmd = picker.start();
            (
                Harness {
                    picker,
                    changes: Vec::new(),
                },
                cmd,
            )
        }

        fn update(&mut self, msg: Message) -> Command<Message> {
            if let Message::SelectionChanged(names) = &msg {
                self.changes.push(names.clone());
            }
            self.picker.update(msg)
        }

        fn view(&self, frame: &mut Frame) {
            self.picker.view(frame, frame.area());
        }
    }

    fn config() -> PickerConfig {
        PickerConfig::default()
            .with_initial_url("https://example.test/api/character")
            .with_max_rows(5)
    }

    /// Twenty characters on the first page, ten more on the second.
    fn two_pages() -> Arc<ScriptedSource> {
        let source = ScriptedSource::new();
        source.page(&config().initial_url, characters(1..21), Some(PAGE2));
        source.page(PAGE2, characters(21..31), None);
        source
    }

    fn program(source: &Arc<ScriptedSource>) -> TestProgram<Harness> {
        let mut prog = TestProgram::new((config(), source.clone()));
        prog.settle();
        prog
    }

    fn press(prog: &mut TestProgram<Harness>, code: KeyCode) {
        prog.send(Message::KeyPress(KeyEvent::new(code, KeyModifiers::NONE)));
        prog.drain_messages();
    }

    fn ctrl(prog: &mut TestProgram<Harness>, c: char) {
        prog.send(Message::KeyPress(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )));
        prog.drain_messages();
    }

    fn type_text(prog: &mut TestProgram<Harness>, text: &str) {
        for c in text.chars() {
            press(prog, KeyCode::Char(c));
        }
    }

    fn click(prog: &mut TestProgram<Harness>, column: u16, row: u16) {
        prog.send(Message::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }));
        prog.drain_messages();
    }

    fn picker(prog: &TestProgram<Harness>) -> &ListPresenter {
        &prog.model().picker
    }

    fn selected_ids(prog: &TestProgram<Harness>) -> Vec<String> {
        picker(prog)
            .selection()
            .selected()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Column and row of the first occurrence of `needle` on screen.
    fn locate(screen: &str, needle: &str) -> Option<(u16, u16)> {
        screen.lines().enumerate().find_map(|(y, line)| {
            line.find(needle)
                .map(|byte| (line[..byte].chars().count() as u16, y as u16))
        })
    }

    #[test]
    fn first_page_loads_without_opening_the_panel() {
        let source = two_pages();
        let prog = program(&source);

        assert_eq!(picker(&prog).store().len(), 20);
        assert!(!picker(&prog).is_open());
        assert_eq!(source.call_count(), 1);
        assert!(prog.terminal_log().is_empty());
    }

    #[test]
    fn typing_filters_rows_case_insensitively_in_load_order() {
        let source = ScriptedSource::new();
        source.page(
            &config().initial_url,
            named(&[
                (1, "Rick Sanchez"),
                (2, "Morty Smith"),
                (3, "Pickle Rick"),
                (4, "Summer Smith"),
                (5, "Evil Rick"),
            ]),
            None,
        );
        let mut prog = program(&source);

        type_text(&mut prog, "RICK");
        assert!(picker(&prog).is_open());
        let names: Vec<_> = picker(&prog)
            .visible_rows()
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(names, vec!["Rick Sanchez", "Pickle Rick", "Evil Rick"]);

        press(&mut prog, KeyCode::Backspace);
        assert_eq!(picker(&prog).search_term(), "RIC");
        assert_eq!(picker(&prog).store().len(), 5);
        assert_eq!(source.call_count(), 1);
    }

    #[test]
    fn filter_keeps_every_name_containing_the_term() {
        let source = ScriptedSource::new();
        source.page(
            &config().initial_url,
            named(&[(1, "Rick Sanchez"), (2, "Morty Smith"), (3, "Summer Smith")]),
            None,
        );
        let mut prog = program(&source);

        type_text(&mut prog, "smith");
        let names: Vec<_> = picker(&prog)
            .visible_rows()
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(names, vec!["Morty Smith", "Summer Smith"]);
    }

    #[test]
    fn last_row_in_view_requests_exactly_one_page() {
        let source = two_pages();
        let mut prog = program(&source);

        press(&mut prog, KeyCode::Tab);
        assert_eq!(prog.pending_futures(), 0);

        press(&mut prog, KeyCode::End);
        assert_eq!(prog.pending_futures(), 1);
        assert_eq!(source.call_count(), 2);

        // Still in view, then out and back while the page is in flight.
        press(&mut prog, KeyCode::Up);
        press(&mut prog, KeyCode::Down);
        press(&mut prog, KeyCode::Home);
        press(&mut prog, KeyCode::End);
        assert_eq!(prog.pending_futures(), 1);
        assert_eq!(source.call_count(), 2);

        prog.settle();
        assert_eq!(picker(&prog).store().len(), 30);
        assert!(!picker(&prog).store().has_more());

        press(&mut prog, KeyCode::End);
        assert_eq!(prog.pending_futures(), 0);
        assert_eq!(source.call_count(), 2);
    }

    #[test]
    fn short_filtered_list_keeps_loading_until_rows_fill_the_panel() {
        let source = two_pages();
        let mut prog = program(&source);

        // Only "Character 2" and "Character 20" match on the first page, so
        // the last row is on screen as soon as the panel opens.
        type_text(&mut prog, "Character 2");
        assert_eq!(picker(&prog).visible_rows().len(), 2);
        assert_eq!(source.call_count(), 2);

        prog.settle();
        assert_eq!(picker(&prog).store().len(), 30);
        assert_eq!(picker(&prog).visible_rows().len(), 11);
        assert_eq!(source.call_count(), 2);
    }

    #[test]
    fn end_of_list_is_judged_against_rows_that_fit_on_screen() {
        let source = two_pages();
        let mut prog = TestProgram::new((config().with_max_rows(12), source.clone()));
        prog.settle();
        prog.render(60, 14);

        // Eleven rows match, but only four fit in a 14-line terminal.
        prog.send(Message::Paste("Character 1".into()));
        prog.drain_messages();
        assert_eq!(picker(&prog).visible_rows().len(), 11);
        let screen = prog.render_string(60, 14);
        assert!(screen.contains("Character 12"));
        assert!(!screen.contains("Character 19"));
        assert_eq!(prog.pending_futures(), 0);
        assert_eq!(source.call_count(), 1);

        press(&mut prog, KeyCode::End);
        assert_eq!(prog.pending_futures(), 1);
        assert_eq!(source.call_count(), 2);
    }

    #[test]
    fn enter_toggles_highlighted_row_and_reports_names() {
        let source = two_pages();
        let mut prog = program(&source);

        press(&mut prog, KeyCode::Tab);
        press(&mut prog, KeyCode::Down);
        press(&mut prog, KeyCode::Enter);
        assert_eq!(selected_ids(&prog), vec!["2"]);
        assert_eq!(prog.model().changes.last().unwrap(), &vec!["Character 2".to_string()]);

        press(&mut prog, KeyCode::Enter);
        assert!(picker(&prog).selection().is_empty());
        assert_eq!(prog.model().changes.last().unwrap(), &Vec::<String>::new());
    }

    #[test]
    fn selection_survives_filtering() {
        let source = two_pages();
        let mut prog = program(&source);
        press(&mut prog, KeyCode::Tab);
        press(&mut prog, KeyCode::Enter);

        type_text(&mut prog, "Character 7");
        assert!(picker(&prog)
            .visible_rows()
            .iter()
            .all(|o| o.name.contains("Character 7")));
        assert_eq!(selected_ids(&prog), vec!["1"]);
        assert_eq!(picker(&prog).selected_names(), vec!["Character 1"]);
    }

    #[test]
    fn backspace_on_empty_term_removes_last_chip_and_ctrl_x_clears() {
        let source = two_pages();
        let mut prog = program(&source);
        press(&mut prog, KeyCode::Tab);
        for _ in 0..3 {
            press(&mut prog, KeyCode::Enter);
            press(&mut prog, KeyCode::Down);
        }
        assert_eq!(selected_ids(&prog), vec!["1", "2", "3"]);

        press(&mut prog, KeyCode::Backspace);
        assert_eq!(selected_ids(&prog), vec!["1", "2"]);

        ctrl(&mut prog, 'x');
        assert!(selected_ids(&prog).is_empty());
        assert_eq!(prog.model().changes.len(), 5);
    }

    #[test]
    fn esc_closes_and_typing_reopens() {
        let source = two_pages();
        let mut prog = program(&source);

        press(&mut prog, KeyCode::Tab);
        press(&mut prog, KeyCode::Esc);
        assert!(!picker(&prog).is_open());

        type_text(&mut prog, "c");
        assert!(picker(&prog).is_open());
        assert_eq!(
            prog.terminal_log(),
            &[
                TerminalCommand::EnableMouseCapture,
                TerminalCommand::DisableMouseCapture,
                TerminalCommand::EnableMouseCapture,
            ]
        );
    }

    #[test]
    fn press_outside_closes_panel_and_inside_does_not() {
        let source = two_pages();
        let mut prog = program(&source);
        press(&mut prog, KeyCode::Tab);
        prog.render(60, 30);

        click(&mut prog, 0, 0);
        assert!(picker(&prog).is_open());

        click(&mut prog, 5, 28);
        assert!(!picker(&prog).is_open());
        assert_eq!(
            prog.terminal_log().last(),
            Some(&TerminalCommand::DisableMouseCapture)
        );
    }

    #[test]
    fn clicking_rows_toggles_them() {
        let source = two_pages();
        let mut prog = program(&source);
        press(&mut prog, KeyCode::Tab);
        let screen = prog.render_string(60, 30);
        let (x, y) = locate(&screen, "Character 1").unwrap();

        click(&mut prog, x, y);
        assert_eq!(selected_ids(&prog), vec!["1"]);

        // The chip row pushes the list down by one line.
        let screen = prog.render_string(60, 30);
        let (_, y) = locate(&screen, "[ ] Character 2").unwrap();
        click(&mut prog, x, y + 1);
        assert_eq!(selected_ids(&prog), vec!["1", "2"]);
    }

    #[test]
    fn clicking_a_chip_removes_it() {
        let source = two_pages();
        let mut prog = program(&source);
        press(&mut prog, KeyCode::Tab);
        press(&mut prog, KeyCode::Enter);
        press(&mut prog, KeyCode::Down);
        press(&mut prog, KeyCode::Enter);

        let screen = prog.render_string(60, 30);
        let (x, y) = locate(&screen, "Character 2 \u{00d7}").unwrap();
        click(&mut prog, x, y);
        assert_eq!(selected_ids(&prog), vec!["1"]);
        assert_eq!(prog.model().changes.last().unwrap(), &vec!["Character 1".to_string()]);
    }

    #[test]
    fn matches_render_bold() {
        let source = two_pages();
        let mut prog = program(&source);
        type_text(&mut prog, "acter 1");

        let buf = prog.render(60, 30);
        let screen = lazypick_core::testing::buffer_to_string(&buf);
        let (x, y) = locate(&screen, "Character 1").unwrap();
        assert!(!buf[(x, y)].modifier.contains(Modifier::BOLD));
        assert!(buf[(x + 4, y)].modifier.contains(Modifier::BOLD));
        assert!(screen.contains("Episodes"));
    }

    #[test]
    fn loading_row_shows_while_a_page_is_in_flight() {
        let source = two_pages();
        let mut prog = program(&source);
        press(&mut prog, KeyCode::Tab);
        press(&mut prog, KeyCode::End);

        assert!(prog.render_string(60, 30).contains("Loading..."));
        assert_eq!(picker(&prog).subscriptions().len(), 1);

        prog.settle();
        assert!(!prog.render_string(60, 30).contains("Loading..."));
        assert!(picker(&prog).subscriptions().is_empty());
    }

    #[test]
    fn filter_triggered_load_spins_until_the_page_lands() {
        let source = two_pages();
        let mut prog = program(&source);

        type_text(&mut prog, "Character 2");
        assert!(picker(&prog).store().is_loading());
        assert_eq!(picker(&prog).subscriptions().len(), 1);
        prog.send(Message::SpinnerTick);
        prog.drain_messages();
        assert!(prog.render_string(60, 30).contains("Loading..."));

        prog.settle();
        assert!(picker(&prog).subscriptions().is_empty());
    }

    #[test]
    fn loading_row_uses_the_spinner_style() {
        let source = two_pages();
        let mut prog = program(&source);
        let style = PickerStyle {
            spinner: Style::default().fg(Color::Magenta),
            ..PickerStyle::default()
        };
        let slot = &mut prog.model_mut().picker;
        let picker = std::mem::replace(slot, ListPresenter::new(config(), source.clone()));
        *slot = picker.with_style(style);

        press(&mut prog, KeyCode::Tab);
        press(&mut prog, KeyCode::End);
        let buf = prog.render(60, 30);
        let screen = lazypick_core::testing::buffer_to_string(&buf);
        let (x, y) = locate(&screen, "Loading...").unwrap();
        assert_eq!(buf[(x, y)].fg, Color::Magenta);
    }

    #[test]
    fn failed_page_shows_error_and_ctrl_r_retries() {
        let source = ScriptedSource::new();
        source.page(&config().initial_url, characters(1..21), Some(PAGE2));
        source.fail(PAGE2, FetchError::Status(500));
        source.page(PAGE2, characters(21..31), None);
        let mut prog = program(&source);

        press(&mut prog, KeyCode::Tab);
        press(&mut prog, KeyCode::End);
        prog.settle();
        assert_eq!(picker(&prog).store().len(), 20);
        assert!(prog.render_string(60, 30).contains("Failed to load: HTTP 500"));

        ctrl(&mut prog, 'r');
        assert_eq!(prog.pending_futures(), 1);
        prog.settle();
        assert_eq!(picker(&prog).store().len(), 30);
        assert!(!prog.render_string(60, 30).contains("Failed to load"));
        assert_eq!(source.calls(), vec![config().initial_url, PAGE2.into(), PAGE2.into()]);
    }

    #[test]
    fn dispose_releases_capture_and_drops_late_pages() {
        let source = two_pages();
        let mut prog = program(&source);
        press(&mut prog, KeyCode::Tab);
        press(&mut prog, KeyCode::End);
        assert_eq!(prog.pending_futures(), 1);

        let cmd = prog.model_mut().picker.dispose();
        assert!(cmd.contains_terminal(&TerminalCommand::DisableMouseCapture));
        assert!(prog.model_mut().picker.dispose().is_none());

        prog.settle();
        assert_eq!(picker(&prog).store().len(), 20);
        press(&mut prog, KeyCode::Enter);
        assert!(picker(&prog).selection().is_empty());
    }
}
