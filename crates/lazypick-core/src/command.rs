use futures::future::BoxFuture;
use std::future::Future;

/// A side effect returned from [`Model::update`](crate::Model::update) or [`Model::init`](crate::Model::init).
///
/// Commands describe async work (such as a page fetch), immediate follow-up
/// messages, terminal resource changes, and program exit. `update` stays a
/// pure state transition; the runtime carries out whatever it returns.
///
/// # Examples
///
/// ```rust,ignore
/// // Do nothing:
/// let cmd = Command::none();
///
/// // Run an async fetch and map the result to a message:
/// let cmd = Command::perform(source.fetch(&url), Msg::PageLoaded);
///
/// // Quit the program:
/// let cmd = Command::quit();
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) inner: CommandInner<Msg>,
}

pub(crate) enum CommandInner<Msg: Send + 'static> {
    None,
    Action(Action<Msg>),
    Future(BoxFuture<'static, Msg>),
    Batch(Vec<Command<Msg>>),
    Terminal(TerminalCommand),
}

/// Actions the runtime handles synchronously, without spawning a task.
pub enum Action<Msg> {
    /// Send a message immediately (no async).
    Message(Msg),
    /// Quit the program.
    Quit,
}

/// Terminal resources a model can acquire and release.
///
/// Mouse capture is scoped: a widget that needs clicks (for example to detect
/// a click outside its area) enables it while it needs it and disables it on
/// every exit path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    /// Start reporting mouse presses, releases, drags, and wheel events.
    EnableMouseCapture,
    /// Stop reporting mouse events.
    DisableMouseCapture,
}

impl<Msg: Send + 'static> Command<Msg> {
    /// No-op command.
    pub fn none() -> Self {
        Command {
            inner: CommandInner::None,
        }
    }

    /// Run an async future, map the result to a message.
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> Msg + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Command {
            inner: CommandInner::Future(Box::pin(async move { map(future.await) })),
        }
    }

    /// Send a message immediately.
    pub fn message(msg: Msg) -> Self {
        Command {
            inner: CommandInner::Action(Action::Message(msg)),
        }
    }

    /// Quit the program.
    pub fn quit() -> Self {
        Command {
            inner: CommandInner::Action(Action::Quit),
        }
    }

    /// Run multiple commands concurrently. `none` entries are dropped.
    pub fn batch(cmds: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let mut cmds: Vec<_> = cmds.into_iter().filter(|cmd| !cmd.is_none()).collect();
        match cmds.len() {
            0 => Command::none(),
            1 => cmds.remove(0),
            _ => Command {
                inner: CommandInner::Batch(cmds),
            },
        }
    }

    /// Terminal management command.
    pub fn terminal(cmd: TerminalCommand) -> Self {
        Command {
            inner: CommandInner::Terminal(cmd),
        }
    }

    /// Acquire mouse capture.
    pub fn enable_mouse_capture() -> Self {
        Command::terminal(TerminalCommand::EnableMouseCapture)
    }

    /// Release mouse capture.
    pub fn disable_mouse_capture() -> Self {
        Command::terminal(TerminalCommand::DisableMouseCapture)
    }

    /// Transform the message type (for component composition).
    pub fn map<NewMsg: Send + 'static>(
        self,
        f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static,
    ) -> Command<NewMsg> {
        self.map_with(std::sync::Arc::new(f))
    }

    fn map_with<NewMsg: Send + 'static>(
        self,
        f: std::sync::Arc<dyn Fn(Msg) -> NewMsg + Send + Sync>,
    ) -> Command<NewMsg> {
        match self.inner {
            CommandInner::None => Command::none(),
            CommandInner::Action(Action::Message(msg)) => Command::message(f(msg)),
            CommandInner::Action(Action::Quit) => Command::quit(),
            CommandInner::Future(fut) => Command {
                inner: CommandInner::Future(Box::pin(async move { f(fut.await) })),
            },
            CommandInner::Batch(cmds) => Command {
                inner: CommandInner::Batch(
                    cmds.into_iter()
                        .map(|cmd| cmd.map_with(f.clone()))
                        .collect(),
                ),
            },
            CommandInner::Terminal(tcmd) => Command::terminal(tcmd),
        }
    }

    // --- Inspection methods (useful for testing) ---

    /// Returns `true` if this is a no-op command.
    pub fn is_none(&self) -> bool {
        matches!(self.inner, CommandInner::None)
    }

    /// Returns `true` if this command, or any command batched inside it,
    /// runs async work.
    pub fn has_future(&self) -> bool {
        match &self.inner {
            CommandInner::Future(_) => true,
            CommandInner::Batch(cmds) => cmds.iter().any(Command::has_future),
            _ => false,
        }
    }

    /// Returns `true` if this command, or any command batched inside it,
    /// is the given terminal command.
    pub fn contains_terminal(&self, wanted: &TerminalCommand) -> bool {
        match &self.inner {
            CommandInner::Terminal(tcmd) => tcmd == wanted,
            CommandInner::Batch(cmds) => cmds.iter().any(|cmd| cmd.contains_terminal(wanted)),
            _ => false,
        }
    }

    /// If this command is an immediate message action, return it.
    pub fn into_message(self) -> Option<Msg> {
        match self.inner {
            CommandInner::Action(Action::Message(msg)) => Some(msg),
            _ => None,
        }
    }

    /// If this command is a single async operation, return its future.
    pub fn into_future(self) -> Option<BoxFuture<'static, Msg>> {
        match self.inner {
            CommandInner::Future(fut) => Some(fut),
            _ => None,
        }
    }

    /// If this command is a batch, return the inner commands.
    pub fn into_batch(self) -> Option<Vec<Command<Msg>>> {
        match self.inner {
            CommandInner::Batch(cmds) => Some(cmds),
            _ => None,
        }
    }
}

impl<Msg: Send + 'static> std::fmt::Debug for Command<Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            CommandInner::None => f.write_str("Command::None"),
            CommandInner::Action(Action::Message(_)) => f.write_str("Command::Message"),
            CommandInner::Action(Action::Quit) => f.write_str("Command::Quit"),
            CommandInner::Future(_) => f.write_str("Command::Future"),
            CommandInner::Batch(cmds) => f.debug_tuple("Command::Batch").field(cmds).finish(),
            CommandInner::Terminal(tcmd) => f.debug_tuple("Command::Terminal").field(tcmd).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_none_is_none() {
        let cmd: Command<()> = Command::none();
        assert!(matches!(cmd.inner, CommandInner::None));
    }

    #[test]
    fn command_message_creates_action() {
        let cmd: Command<i32> = Command::message(42);
        match cmd.inner {
            CommandInner::Action(Action::Message(msg)) => assert_eq!(msg, 42),
            _ => panic!("Expected Action::Message"),
        }
    }

    #[test]
    fn command_quit_creates_quit() {
        let cmd: Command<()> = Command::quit();
        assert!(matches!(cmd.inner, CommandInner::Action(Action::Quit)));
    }

    #[test]
    fn command_batch_empty_returns_none() {
        let cmd: Command<()> = Command::batch(vec![]);
        assert!(cmd.is_none());
    }

    #[test]
    fn command_batch_drops_none_entries() {
        let cmd: Command<i32> =
            Command::batch(vec![Command::none(), Command::message(1), Command::none()]);
        assert_eq!(cmd.into_message(), Some(1));
    }

    #[test]
    fn command_batch_multiple() {
        let cmd: Command<i32> = Command::batch(vec![Command::message(1), Command::message(2)]);
        assert_eq!(cmd.into_batch().map(|cmds| cmds.len()), Some(2));
    }

    #[test]
    fn command_map_message() {
        let cmd: Command<i32> = Command::message(42);
        let mapped: Command<String> = cmd.map(|n| n.to_string());
        assert_eq!(mapped.into_message().as_deref(), Some("42"));
    }

    #[test]
    fn command_map_future_keeps_future() {
        let cmd: Command<i32> = Command::perform(async { 1 }, |n| n + 1);
        let mapped: Command<String> = cmd.map(|n| n.to_string());
        assert!(mapped.has_future());
    }

    #[test]
    fn into_future_yields_mapped_output() {
        let cmd: Command<i32> = Command::perform(async { 20 }, |n| n + 1);
        let fut = cmd.into_future().expect("future command");
        assert_eq!(futures::executor::block_on(fut), 21);
        assert!(Command::<i32>::message(1).into_future().is_none());
    }

    #[test]
    fn command_map_terminal_preserves_command() {
        let cmd: Command<i32> = Command::enable_mouse_capture();
        let mapped: Command<String> = cmd.map(|n| n.to_string());
        assert!(mapped.contains_terminal(&TerminalCommand::EnableMouseCapture));
    }

    #[test]
    fn contains_terminal_searches_batches() {
        let cmd: Command<i32> = Command::batch(vec![
            Command::message(1),
            Command::disable_mouse_capture(),
        ]);
        assert!(cmd.contains_terminal(&TerminalCommand::DisableMouseCapture));
        assert!(!cmd.contains_terminal(&TerminalCommand::EnableMouseCapture));
    }
}
