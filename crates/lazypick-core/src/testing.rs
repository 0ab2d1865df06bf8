use crate::command::{Action, Command, CommandInner, TerminalCommand};
use crate::model::Model;
use futures::future::BoxFuture;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::collections::VecDeque;

/// A headless test harness that drives a [`Model`] without a real terminal.
///
/// Synchronous commands ([`Command::message`]) are queued and flushed with
/// [`drain_messages`](TestProgram::drain_messages).  Async commands are
/// *held*, not dropped: the test decides when they resolve by calling
/// [`settle`](TestProgram::settle) or [`settle_one`](TestProgram::settle_one).
/// That makes "a second trigger arrives while the fetch is still in flight"
/// an ordinary, deterministic test.  Terminal commands are recorded in
/// [`terminal_log`](TestProgram::terminal_log).
///
/// # Example
///
/// ```rust,ignore
/// let mut prog = TestProgram::<Picker>::new(config);
/// assert_eq!(prog.pending_futures(), 1);   // first page requested
/// prog.settle();                           // page arrives
/// assert_eq!(prog.model().picker.store().len(), 20);
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    pending_messages: Vec<M::Message>,
    pending_futures: VecDeque<BoxFuture<'static, M::Message>>,
    terminal_log: Vec<TerminalCommand>,
    quit: bool,
}

impl<M: Model> TestProgram<M> {
    /// Create a test program by calling [`Model::init`] with the given flags.
    pub fn new(flags: M::Flags) -> Self {
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            pending_messages: Vec::new(),
            pending_futures: VecDeque::new(),
            terminal_log: Vec::new(),
            quit: false,
        };
        program.collect(init_cmd);
        program
    }

    /// Send a message, triggering a single update cycle.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.collect(cmd);
    }

    /// Process pending synchronous messages until none are left.
    pub fn drain_messages(&mut self) {
        while !self.pending_messages.is_empty() {
            let messages: Vec<_> = self.pending_messages.drain(..).collect();
            for msg in messages {
                self.send(msg);
            }
        }
    }

    /// Number of async commands waiting to resolve.
    pub fn pending_futures(&self) -> usize {
        self.pending_futures.len()
    }

    /// Resolve the oldest pending async command and deliver its message.
    ///
    /// Returns `false` when nothing was pending.
    pub fn settle_one(&mut self) -> bool {
        let Some(fut) = self.pending_futures.pop_front() else {
            return false;
        };
        let msg = futures::executor::block_on(fut);
        self.send(msg);
        self.drain_messages();
        true
    }

    /// Resolve async commands (including any they spawn) until none remain.
    pub fn settle(&mut self) {
        self.drain_messages();
        while self.settle_one() {}
    }

    /// Drop every pending async command without delivering its result, as
    /// the runtime does when the program exits mid-flight.
    pub fn abandon_futures(&mut self) -> usize {
        let n = self.pending_futures.len();
        self.pending_futures.clear();
        n
    }

    /// Terminal commands issued so far, in order.
    pub fn terminal_log(&self) -> &[TerminalCommand] {
        &self.terminal_log
    }

    /// Whether the model has returned [`Command::quit`].
    pub fn has_quit(&self) -> bool {
        self.quit
    }

    /// Get a shared reference to the model for assertions.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model for direct test setup.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Render the model to a ratatui [`Buffer`] of the given dimensions.
    pub fn render(&self, width: u16, height: u16) -> Buffer {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("test backend never fails");
        terminal
            .draw(|frame| {
                self.model.view(frame);
            })
            .expect("test backend never fails");
        terminal.backend().buffer().clone()
    }

    /// Render the model and return the visible content as a plain string,
    /// one line per row.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        buffer_to_string(&self.render(width, height))
    }

    fn collect(&mut self, cmd: Command<M::Message>) {
        match cmd.inner {
            CommandInner::None => {}
            CommandInner::Action(Action::Message(msg)) => self.pending_messages.push(msg),
            CommandInner::Action(Action::Quit) => self.quit = true,
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    self.collect(cmd);
                }
            }
            CommandInner::Future(fut) => self.pending_futures.push_back(fut),
            CommandInner::Terminal(tcmd) => self.terminal_log.push(tcmd),
        }
    }
}

/// Flatten a buffer into newline-separated rows of cell symbols.
pub fn buffer_to_string(buf: &Buffer) -> String {
    let area: Rect = buf.area;
    let mut output = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            output.push_str(buf[(x, y)].symbol());
        }
        if y + 1 < area.bottom() {
            output.push('\n');
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;

    struct Fetcher {
        pages: Vec<u32>,
        log: Vec<&'static str>,
    }

    #[derive(Debug)]
    enum Msg {
        Fetch(u32),
        Fetched(u32),
        Announce,
        Capture,
        Stop,
    }

    impl Model for Fetcher {
        type Message = Msg;
        type Flags = ();

        fn init(_: ()) -> (Self, Command<Msg>) {
            (
                Fetcher {
                    pages: vec![],
                    log: vec![],
                },
                Command::perform(async { 1 }, Msg::Fetched),
            )
        }

        fn update(&mut self, msg: Msg) -> Command<Msg> {
            match msg {
                Msg::Fetch(n) => Command::perform(async move { n }, Msg::Fetched),
                Msg::Fetched(n) => {
                    self.pages.push(n);
                    if n == 2 {
                        Command::message(Msg::Announce)
                    } else {
                        Command::none()
                    }
                }
                Msg::Announce => {
                    self.log.push("announced");
                    Command::none()
                }
                Msg::Capture => Command::enable_mouse_capture(),
                Msg::Stop => Command::quit(),
            }
        }

        fn view(&self, frame: &mut ratatui::Frame) {
            let text = format!("pages: {:?}", self.pages);
            frame.render_widget(Paragraph::new(text), frame.area());
        }
    }

    #[test]
    fn init_future_is_held_until_settled() {
        let mut prog = TestProgram::<Fetcher>::new(());
        assert_eq!(prog.pending_futures(), 1);
        assert!(prog.model().pages.is_empty());

        prog.settle();
        assert_eq!(prog.model().pages, vec![1]);
        assert_eq!(prog.pending_futures(), 0);
    }

    #[test]
    fn settle_one_resolves_in_issue_order() {
        let mut prog = TestProgram::<Fetcher>::new(());
        prog.send(Msg::Fetch(2));
        prog.send(Msg::Fetch(3));
        assert_eq!(prog.pending_futures(), 3);

        assert!(prog.settle_one());
        assert_eq!(prog.model().pages, vec![1]);
        prog.settle();
        assert_eq!(prog.model().pages, vec![1, 2, 3]);
    }

    #[test]
    fn messages_from_settled_futures_are_drained() {
        let mut prog = TestProgram::<Fetcher>::new(());
        prog.send(Msg::Fetch(2));
        prog.settle();
        assert_eq!(prog.model().log, vec!["announced"]);
    }

    #[test]
    fn abandoned_futures_never_deliver() {
        let mut prog = TestProgram::<Fetcher>::new(());
        assert_eq!(prog.abandon_futures(), 1);
        prog.settle();
        assert!(prog.model().pages.is_empty());
    }

    #[test]
    fn terminal_commands_and_quit_are_recorded() {
        let mut prog = TestProgram::<Fetcher>::new(());
        prog.send(Msg::Capture);
        prog.send(Msg::Stop);
        assert_eq!(prog.terminal_log(), &[TerminalCommand::EnableMouseCapture]);
        assert!(prog.has_quit());
    }

    #[test]
    fn render_string_reflects_state() {
        let mut prog = TestProgram::<Fetcher>::new(());
        prog.settle();
        assert!(prog.render_string(30, 1).contains("pages: [1]"));
    }
}
