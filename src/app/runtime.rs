//! The runtime: wires input, the pager state machine, the scan worker, and
//! the terminal together.
//!
//! One `tokio::select!` loop multiplexes three sources: input actions from
//! the blocking terminal thread, scan responses from the worker, and growth
//! notifications from the store. Scan responses pass through the
//! [`ResponseGate`], so only the newest in-flight scan can change state.

use crate::app::worker::scan_worker_loop;
use crate::error::Result;
use crate::input::{spawn_input_thread, InputAction, ScrollDirection};
use crate::pager::{Pager, ScanKind};
use crate::render::{ResponseGate, ScanCommand, ScanResponse, TerminalUi};
use crate::search::{ScanJob, SearchDirection, SearchOptions};
use crate::store::LineStore;
use crate::viewport::Viewport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One multiplexed occurrence in the runtime loop.
enum LoopEvent {
    Action(Option<InputAction>),
    Response(Option<ScanResponse>),
    Growth(bool),
}

pub struct Application {
    pager: Pager,
    ui: TerminalUi,
    gate: ResponseGate,
    commands: UnboundedSender<ScanCommand>,
    responses: UnboundedReceiver<ScanResponse>,
    actions: UnboundedReceiver<InputAction>,
    growth: watch::Receiver<usize>,
    shutdown: Arc<AtomicBool>,
    /// Keep the viewport pinned to the end while the stream grows. Set by
    /// `G`, cleared by any other movement.
    follow: bool,
}

impl Application {
    /// Assemble the runtime over an already-ingesting store. Spawns the scan
    /// worker task and the blocking input thread.
    pub fn new(
        store: Arc<LineStore>,
        title: impl Into<String>,
        wrap: bool,
        options: SearchOptions,
    ) -> Result<Self> {
        let ui = TerminalUi::new(title);
        let (width, height) = ui.size()?;
        let viewport = Viewport::new(width as usize, (height as usize).saturating_sub(1), wrap);
        let pager = Pager::with_options(Arc::clone(&store), viewport, options);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        tokio::spawn(scan_worker_loop(command_rx, response_tx, Arc::clone(&store)));

        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        spawn_input_thread(action_tx, Arc::clone(&shutdown), INPUT_POLL_INTERVAL);

        let growth = store.subscribe();
        Ok(Self {
            pager,
            ui,
            gate: ResponseGate::new(),
            commands: command_tx,
            responses: response_rx,
            actions: action_rx,
            growth,
            shutdown,
            follow: false,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        self.ui.initialize()?;
        let result = self.event_loop().await;
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.commands.send(ScanCommand::Shutdown);
        self.ui.cleanup()?;
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        self.ui.render(&self.pager)?;
        loop {
            // Resolve the select to a plain value first; handlers need the
            // whole application mutably.
            let event = tokio::select! {
                action = self.actions.recv() => LoopEvent::Action(action),
                response = self.responses.recv() => LoopEvent::Response(response),
                changed = self.growth.changed() => LoopEvent::Growth(changed.is_ok()),
            };
            match event {
                LoopEvent::Action(None) => break,
                LoopEvent::Action(Some(action)) => {
                    if self.handle_action(action)? {
                        break;
                    }
                }
                LoopEvent::Response(Some(response)) => self.handle_response(response)?,
                LoopEvent::Response(None) => {}
                LoopEvent::Growth(false) => break,
                LoopEvent::Growth(true) => {
                    if self.follow {
                        self.pager.move_to_end();
                    }
                }
            }
            self.ui.render(&self.pager)?;
        }
        Ok(())
    }

    /// Apply one input action. Returns `true` when the application should
    /// quit.
    fn handle_action(&mut self, action: InputAction) -> Result<bool> {
        match action {
            InputAction::Scroll { direction, rows } => {
                self.follow = false;
                match direction {
                    ScrollDirection::Down => self.pager.scroll_down(rows)?,
                    ScrollDirection::Up => self.pager.scroll_up(rows)?,
                }
            }
            InputAction::PageDown => {
                self.follow = false;
                self.pager.page_down()?;
            }
            InputAction::PageUp => {
                self.follow = false;
                self.pager.page_up()?;
            }
            InputAction::HalfPageDown => {
                self.follow = false;
                self.pager.half_page_down()?;
            }
            InputAction::HalfPageUp => {
                self.follow = false;
                self.pager.half_page_up()?;
            }
            InputAction::GoToStart => {
                self.follow = false;
                self.pager.move_to_start();
            }
            InputAction::GoToEnd => {
                self.pager.move_to_end();
                self.follow = !self.pager.store().is_complete();
            }
            InputAction::Quit => return Ok(true),
            InputAction::StartSearch(direction) => {
                self.follow = false;
                self.pager.start_search(direction);
            }
            InputAction::UpdateSearchBuffer { buffer, .. } => {
                let request = self.pager.update_search_pattern(&buffer)?;
                self.dispatch(request);
            }
            InputAction::ExecuteSearch => self.pager.commit_search(),
            InputAction::CancelSearch => self.pager.cancel_search(),
            InputAction::NextMatch => {
                self.follow = false;
                let request = match self.pager.search_direction() {
                    SearchDirection::Forward => self.pager.next_hit_request()?,
                    SearchDirection::Backward => self.pager.prev_hit_request()?,
                };
                self.dispatch(request);
            }
            InputAction::PreviousMatch => {
                self.follow = false;
                let request = match self.pager.search_direction() {
                    SearchDirection::Forward => self.pager.prev_hit_request()?,
                    SearchDirection::Backward => self.pager.next_hit_request()?,
                };
                self.dispatch(request);
            }
            InputAction::StartGotoLine => self.pager.start_goto_line(),
            InputAction::UpdateGotoBuffer { buffer } => self.pager.update_goto_buffer(buffer),
            InputAction::ExecuteGotoLine => {
                self.follow = false;
                self.pager.execute_goto_line()?;
            }
            InputAction::CancelGotoLine => self.pager.cancel_goto_line(),
            InputAction::Resize { width, height } => {
                self.pager
                    .resize(width as usize, (height as usize).saturating_sub(1));
            }
            InputAction::NoAction | InputAction::InvalidInput => {}
        }
        Ok(false)
    }

    fn dispatch(&mut self, request: Option<(ScanKind, ScanJob)>) {
        if let Some((kind, job)) = request {
            let request_id = self.gate.register(kind);
            let _ = self.commands.send(ScanCommand::ExecuteScan { request_id, job });
        }
    }

    fn handle_response(&mut self, response: ScanResponse) -> Result<()> {
        match response {
            ScanResponse::ScanCompleted { request_id, hit } => {
                if let Some(kind) = self.gate.accept(request_id) {
                    self.pager.apply_scan_result(kind, hit)?;
                }
            }
            ScanResponse::Error { request_id, message } => {
                if self.gate.accept(request_id).is_some() {
                    log::warn!("scan failed: {message}");
                }
            }
        }
        Ok(())
    }
}
