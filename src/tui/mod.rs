//! # TUI Adapter
//!
//! The ratatui-specific layer. Provides the terminal's implementations of the
//! engine's rendering interfaces, draws the active page, and translates
//! keyboard events into navigator calls.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! ```text
//! draw ──► poll key ──► root navigator ──► callback ──► status ──► draw
//!            │              next_page / previous_page / on_back_press
//!            └─► prompt page input
//! ```
//!
//! The loop is idle-driven: it sleeps up to 500ms waiting for a key and only
//! redraws after an event or a resize.

mod component;
mod components;
pub mod event;
pub mod surface;
mod ui;

use log::{debug, info};
use std::cell::RefCell;
use std::io::{self, stdout};
use std::rc::Rc;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::config::ResolvedConfig;
use crate::core::coordinator::Coordinator;
use crate::core::error::NavigationError;
use crate::core::flow::{Flow, FlowDefinition};
use crate::core::navigator::NavigationCallback;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::surface::{TerminalContainer, TerminalRenderFactory};

pub const LAST_PAGE_STATUS: &str = "Reached the last page";
pub const FIRST_PAGE_STATUS: &str = "Already at the first page";

/// TUI-specific presentation state (not part of the navigation engine)
pub struct TuiState {
    pub exit_on_root_back: bool,
    pub show_breadcrumbs: bool,
    pub show_state: bool,
    status: Rc<RefCell<String>>,
}

impl TuiState {
    pub fn new(exit_on_root_back: bool, show_breadcrumbs: bool, show_state: bool) -> Self {
        Self {
            exit_on_root_back,
            show_breadcrumbs,
            show_state,
            status: Rc::new(RefCell::new(String::new())),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            config.exit_on_root_back,
            config.show_breadcrumbs,
            config.show_state,
        )
    }

    pub fn status_message(&self) -> String {
        self.status.borrow().clone()
    }

    /// Clear the status after a handled move. Moves handled inside a nested
    /// navigator never reach the root callback.
    fn settle(&self, handled: bool) {
        if handled {
            self.status.borrow_mut().clear();
        }
    }

    /// A root navigation callback that writes into this state's status line.
    pub fn status_callback(&self) -> Rc<dyn NavigationCallback> {
        Rc::new(StatusCallback {
            status: Rc::clone(&self.status),
        })
    }
}

struct StatusCallback {
    status: Rc<RefCell<String>>,
}

impl StatusCallback {
    fn set(&self, handled: bool, unhandled_message: &str) {
        let mut status = self.status.borrow_mut();
        status.clear();
        if !handled {
            status.push_str(unhandled_message);
        }
    }
}

impl NavigationCallback for StatusCallback {
    fn on_next(&self, handled: bool) {
        self.set(handled, LAST_PAGE_STATUS);
    }

    fn on_previous(&self, handled: bool) {
        self.set(handled, FIRST_PAGE_STATUS);
    }
}

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Apply one input event to the flow.
///
/// Letters go to the active page when it takes input; otherwise `n`, `p` and
/// `q` are shortcuts.
pub fn handle_event(
    flow: &Flow,
    tui: &TuiState,
    event: TuiEvent,
) -> Result<Control, NavigationError> {
    let root = flow.root();
    let prompt_page = flow.active_page().filter(|page| page.prompt().is_some());

    match event {
        TuiEvent::ForceQuit => return Ok(Control::Quit),
        TuiEvent::Resize => {}
        TuiEvent::Next => tui.settle(root.next_page()?),
        TuiEvent::Previous => tui.settle(root.previous_page()?),
        TuiEvent::Backspace if prompt_page.as_ref().is_some_and(|page| page.pop_char()) => {}
        TuiEvent::Back | TuiEvent::Backspace => {
            let handled = root.on_back_press()?;
            tui.settle(handled);
            if !handled && tui.exit_on_root_back {
                info!("Back pressed on the first page, exiting");
                return Ok(Control::Quit);
            }
        }
        TuiEvent::InputChar(c) => match (prompt_page, c) {
            (Some(page), c) => page.push_char(c),
            (None, 'n') => tui.settle(root.next_page()?),
            (None, 'p') => tui.settle(root.previous_page()?),
            (None, 'q') => return Ok(Control::Quit),
            (None, _) => {}
        },
    }
    Ok(Control::Continue)
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Kitty keyboard protocol: key releases are reported separately and
        // filtered in event::map_key. Terminals without it ignore the request.
        execute!(
            stdout(),
            Hide,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (hidden cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags, Show);
    }
}

/// Build the flow on terminal surfaces and run it until the user quits.
pub fn run(config: &ResolvedConfig, definition: &FlowDefinition) -> io::Result<()> {
    let flow = Flow::build(definition, TerminalRenderFactory::new());
    let tui = TuiState::from_config(config);
    let root_container = TerminalContainer::new();

    flow.root().set_navigation_callback(tui.status_callback());
    flow.initialize(root_container).map_err(io::Error::other)?;
    info!("Flow `{}` initialized", flow.title());

    let mut terminal = ratatui::init();
    let result = TerminalModeGuard::new().and_then(|_guard| event_loop(&mut terminal, &flow, &tui));
    ratatui::restore();

    // Tear the tree down children-first so every attach gets its detach.
    flow.root().release();
    debug!(
        "Released flow `{}` (root attached: {})",
        flow.title(),
        flow.root().is_attached()
    );
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    flow: &Flow,
    tui: &TuiState,
) -> io::Result<()> {
    let mut needs_redraw = true; // Force first frame

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, flow, tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(Duration::from_millis(500))?;
        if first_event.is_none() {
            continue;
        }
        needs_redraw = true;

        // Process first event + drain ALL pending events before next draw
        let mut pending = first_event;
        while let Some(event) = pending {
            if handle_event(flow, tui, event).map_err(io::Error::other)? == Control::Quit {
                return Ok(());
            }
            pending = poll_event_immediate()?;
        }
    }
}
