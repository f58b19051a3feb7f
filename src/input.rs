//! Input handling.
//!
//! A `less`-style state machine turns raw key events into domain-level
//! [`InputAction`]s. Prompt buffers (search pattern, goto-line digits) are
//! owned here; the pager only ever sees complete buffer snapshots, so its
//! state machine stays independent of key handling.

use crate::error::Result;
use crate::search::SearchDirection;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Current input mode: navigation keys, or one of the prompts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputState {
    Navigation,
    SearchInput { direction: SearchDirection },
    GotoInput,
}

/// Scroll direction for line-wise scroll actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// High-level input actions emitted by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Scroll {
        direction: ScrollDirection,
        rows: usize,
    },
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    GoToStart,
    GoToEnd,
    Quit,
    StartSearch(SearchDirection),
    UpdateSearchBuffer {
        direction: SearchDirection,
        buffer: String,
    },
    ExecuteSearch,
    CancelSearch,
    NextMatch,
    PreviousMatch,
    StartGotoLine,
    UpdateGotoBuffer {
        buffer: String,
    },
    ExecuteGotoLine,
    CancelGotoLine,
    Resize {
        width: u16,
        height: u16,
    },
    NoAction,
    InvalidInput,
}

/// State machine that mirrors classic `less` bindings.
pub struct InputStateMachine {
    state: InputState,
    buffer: String,
}

impl InputStateMachine {
    pub fn new() -> Self {
        Self {
            state: InputState::Navigation,
            buffer: String::new(),
        }
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> InputAction {
        if key_event.kind != KeyEventKind::Press {
            return InputAction::NoAction;
        }

        match (self.state, key_event.code, key_event.modifiers) {
            (InputState::Navigation, KeyCode::Char('j'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::Scroll {
                    direction: ScrollDirection::Down,
                    rows: 1,
                }
            }
            (InputState::Navigation, KeyCode::Down, _) | (InputState::Navigation, KeyCode::Enter, _) => {
                InputAction::Scroll {
                    direction: ScrollDirection::Down,
                    rows: 1,
                }
            }
            (InputState::Navigation, KeyCode::Char('k'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::Scroll {
                    direction: ScrollDirection::Up,
                    rows: 1,
                }
            }
            (InputState::Navigation, KeyCode::Up, _) => InputAction::Scroll {
                direction: ScrollDirection::Up,
                rows: 1,
            },
            (InputState::Navigation, KeyCode::Char(' '), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::PageDown
            }
            (InputState::Navigation, KeyCode::Char('f'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::PageDown
            }
            (InputState::Navigation, KeyCode::PageDown, _) => InputAction::PageDown,
            (InputState::Navigation, KeyCode::Char('b'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::PageUp
            }
            (InputState::Navigation, KeyCode::PageUp, _) => InputAction::PageUp,
            (InputState::Navigation, KeyCode::Char('d'), modifiers)
                if !modifiers.contains(KeyModifiers::ALT) =>
            {
                InputAction::HalfPageDown
            }
            (InputState::Navigation, KeyCode::Char('u'), modifiers)
                if !modifiers.contains(KeyModifiers::ALT) =>
            {
                InputAction::HalfPageUp
            }
            (InputState::Navigation, KeyCode::Char('g'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::GoToStart
            }
            (InputState::Navigation, KeyCode::Char('G'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::GoToEnd
            }
            (InputState::Navigation, KeyCode::Char('q'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::Quit
            }
            (InputState::Navigation, KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                InputAction::Quit
            }
            (InputState::Navigation, KeyCode::Char('n'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::NextMatch
            }
            (InputState::Navigation, KeyCode::Char('N'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::PreviousMatch
            }
            (InputState::Navigation, KeyCode::Char('/'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.enter_search(SearchDirection::Forward)
            }
            (InputState::Navigation, KeyCode::Char('?'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.enter_search(SearchDirection::Backward)
            }
            (InputState::Navigation, KeyCode::Char(':'), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.state = InputState::GotoInput;
                self.buffer.clear();
                InputAction::StartGotoLine
            }
            (InputState::SearchInput { .. }, KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.leave_prompt();
                InputAction::CancelSearch
            }
            (InputState::SearchInput { direction }, KeyCode::Char(ch), modifiers)
                if !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.buffer.push(ch);
                InputAction::UpdateSearchBuffer {
                    direction,
                    buffer: self.buffer.clone(),
                }
            }
            (InputState::SearchInput { direction }, KeyCode::Backspace, _) => {
                self.buffer.pop();
                if self.buffer.is_empty() {
                    self.leave_prompt();
                    InputAction::CancelSearch
                } else {
                    InputAction::UpdateSearchBuffer {
                        direction,
                        buffer: self.buffer.clone(),
                    }
                }
            }
            (InputState::SearchInput { .. }, KeyCode::Enter, _) => {
                let pattern = std::mem::take(&mut self.buffer);
                self.state = InputState::Navigation;
                if pattern.trim().is_empty() {
                    InputAction::CancelSearch
                } else {
                    InputAction::ExecuteSearch
                }
            }
            (InputState::SearchInput { .. }, KeyCode::Esc, _) => {
                self.leave_prompt();
                InputAction::CancelSearch
            }
            (InputState::GotoInput, KeyCode::Char(ch), modifiers)
                if ch.is_ascii_digit()
                    && !modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.buffer.push(ch);
                InputAction::UpdateGotoBuffer {
                    buffer: self.buffer.clone(),
                }
            }
            (InputState::GotoInput, KeyCode::Backspace, _) => {
                self.buffer.pop();
                if self.buffer.is_empty() {
                    self.leave_prompt();
                    InputAction::CancelGotoLine
                } else {
                    InputAction::UpdateGotoBuffer {
                        buffer: self.buffer.clone(),
                    }
                }
            }
            (InputState::GotoInput, KeyCode::Enter, _) => {
                self.leave_prompt();
                InputAction::ExecuteGotoLine
            }
            (InputState::GotoInput, KeyCode::Esc, _)
            | (InputState::GotoInput, KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.leave_prompt();
                InputAction::CancelGotoLine
            }
            _ => InputAction::InvalidInput,
        }
    }

    fn enter_search(&mut self, direction: SearchDirection) -> InputAction {
        self.state = InputState::SearchInput { direction };
        self.buffer.clear();
        InputAction::StartSearch(direction)
    }

    fn leave_prompt(&mut self) {
        self.state = InputState::Navigation;
        self.buffer.clear();
    }
}

impl Default for InputStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal event source: polls crossterm and runs the state machine.
pub struct InputService {
    state_machine: InputStateMachine,
}

impl InputService {
    pub fn new() -> Self {
        Self {
            state_machine: InputStateMachine::new(),
        }
    }

    /// Block up to `timeout` for one terminal event and map it to an action.
    pub fn poll_action(&mut self, timeout: Duration) -> Result<Option<InputAction>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let action = match event::read()? {
            Event::Key(key_event) => self.state_machine.handle_key_event(key_event),
            Event::Resize(width, height) => InputAction::Resize { width, height },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => InputAction::Scroll {
                    direction: ScrollDirection::Down,
                    rows: 3,
                },
                MouseEventKind::ScrollUp => InputAction::Scroll {
                    direction: ScrollDirection::Up,
                    rows: 3,
                },
                _ => InputAction::NoAction,
            },
            _ => InputAction::NoAction,
        };
        match action {
            InputAction::NoAction | InputAction::InvalidInput => Ok(None),
            action => Ok(Some(action)),
        }
    }
}

impl Default for InputService {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a blocking thread that polls terminal events and forwards actions
/// to the runtime loop. The thread exits when the receiver is dropped or the
/// shutdown flag is raised.
pub fn spawn_input_thread(
    tx: UnboundedSender<InputAction>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut service = InputService::new();
        while !shutdown.load(Ordering::SeqCst) {
            match service.poll_action(poll_interval) {
                Ok(Some(action)) => {
                    if tx.send(action).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    log::error!("input thread: {err}");
                    return;
                }
            }
        }
    })
}
