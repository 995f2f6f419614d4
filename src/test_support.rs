//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).
//!
//! The doubles here stand in for a rendering host: [`MemorySurface`] /
//! [`MemoryContainer`] / [`MemoryRenderFactory`] keep everything in memory,
//! and [`RecordingPage`] writes every hook it receives into an [`EventLog`].

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::sync::{Arc, Mutex};

use log::{Level, Log, Metadata, Record};

use crate::core::coordinator::{Coordinator, CoordinatorCore, LayoutDescriptor};
use crate::core::error::NavigationError;
use crate::core::navigator::NavigationCallback;
use crate::core::page_manager::{CachingPageManager, PageFactory};
use crate::core::state::State;
use crate::core::surface::{AttachStateListener, Container, RenderFactory, Surface, SurfaceId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Attach(String),
    Detach(String),
    Enter(String),
    Reenter(String),
    ExitForwards(String),
    ExitBackwards(String),
    SetState(String),
    EndingState(String),
    Callback { forward: bool, handled: bool },
}

/// Shared, ordered record of hook calls.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// A page that records its hooks. Its layout is its name.
pub struct RecordingPage {
    core: CoordinatorCore,
    name: String,
    log: EventLog,
    consume_back: Cell<bool>,
    advance_on_enter: Cell<bool>,
    entered_with: RefCell<Option<State>>,
    ending: Option<Box<dyn Fn(State) -> State>>,
}

impl RecordingPage {
    pub fn new(name: &str, log: &EventLog) -> Rc<Self> {
        Rc::new(Self::build(name, log, None))
    }

    /// A page whose `ending_state` applies `ending`.
    pub fn with_ending(
        name: &str,
        log: &EventLog,
        ending: impl Fn(State) -> State + 'static,
    ) -> Rc<Self> {
        Rc::new(Self::build(name, log, Some(Box::new(ending))))
    }

    fn build(name: &str, log: &EventLog, ending: Option<Box<dyn Fn(State) -> State>>) -> Self {
        Self {
            core: CoordinatorCore::new(),
            name: name.to_string(),
            log: log.clone(),
            consume_back: Cell::new(false),
            advance_on_enter: Cell::new(false),
            entered_with: RefCell::new(None),
            ending,
        }
    }

    pub fn consume_back_press(&self, consume: bool) {
        self.consume_back.set(consume);
    }

    /// Immediately call `next_page()` on the owning navigator from `on_enter`.
    pub fn advance_on_enter(&self, advance: bool) {
        self.advance_on_enter.set(advance);
    }

    /// State seen by the most recent entry hook.
    pub fn entered_with(&self) -> Option<State> {
        self.entered_with.borrow().clone()
    }
}

impl Coordinator for RecordingPage {
    fn core(&self) -> &CoordinatorCore {
        &self.core
    }

    fn layout(&self) -> LayoutDescriptor {
        LayoutDescriptor::new(self.name.clone())
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn attach(&self, _surface: &dyn Surface) {
        self.log.push(Event::Attach(self.name.clone()));
    }

    fn on_enter(&self, _surface: &dyn Surface) {
        self.log.push(Event::Enter(self.name.clone()));
        *self.entered_with.borrow_mut() = Some(self.state());
        if self.advance_on_enter.get()
            && let Some(navigator) = self.navigator()
        {
            navigator.next_page().unwrap();
        }
    }

    fn on_reenter(&self, _surface: &dyn Surface) {
        self.log.push(Event::Reenter(self.name.clone()));
        *self.entered_with.borrow_mut() = Some(self.state());
    }

    fn on_exit_forwards(&self, _surface: &dyn Surface) {
        self.log.push(Event::ExitForwards(self.name.clone()));
    }

    fn on_exit_backwards(&self, _surface: &dyn Surface) {
        self.log.push(Event::ExitBackwards(self.name.clone()));
    }

    fn detach(&self, _surface: &dyn Surface) {
        self.log.push(Event::Detach(self.name.clone()));
    }

    fn on_back_press(&self) -> Result<bool, NavigationError> {
        Ok(self.consume_back.get())
    }

    fn set_state(&self, state: State) {
        self.log.push(Event::SetState(self.name.clone()));
        self.core.set_state(state);
    }

    fn ending_state(&self, state: State) -> State {
        self.log.push(Event::EndingState(self.name.clone()));
        match &self.ending {
            Some(ending) => ending(state),
            None => state,
        }
    }
}

/// A page manager over pages named `names`, created on first visit.
pub fn named_pages(
    names: &[&str],
    log: &EventLog,
) -> CachingPageManager<impl PageFactory + use<>> {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let log = log.clone();
    CachingPageManager::new(move |index: usize| {
        names
            .get(index)
            .map(|name| RecordingPage::new(name, &log) as Rc<dyn Coordinator>)
    })
}

/// A page manager over pre-built coordinators.
pub fn fixed_pages(
    pages: Vec<Rc<dyn Coordinator>>,
) -> CachingPageManager<impl PageFactory + use<>> {
    CachingPageManager::new(move |index: usize| pages.get(index).cloned())
}

/// A factory for `pages` recording pages that counts how often it is asked.
pub fn counting_factory(pages: usize) -> (impl PageFactory, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let log = EventLog::new();
    let factory = move |index: usize| {
        counter.set(counter.get() + 1);
        (index < pages).then(|| RecordingPage::new(&format!("p{index}"), &log) as Rc<dyn Coordinator>)
    };
    (factory, calls)
}

thread_local! {
    static LAYOUTS: RefCell<HashMap<SurfaceId, String>> = RefCell::new(HashMap::new());
}

fn layout_of(id: SurfaceId) -> Option<String> {
    LAYOUTS.with(|layouts| layouts.borrow().get(&id).cloned())
}

/// An in-memory rendered node.
pub struct MemorySurface {
    me: Weak<MemorySurface>,
    id: SurfaceId,
    nested: Option<Rc<MemoryContainer>>,
    listeners: RefCell<Vec<Weak<dyn AttachStateListener>>>,
}

impl MemorySurface {
    pub fn leaf(layout: &str) -> Rc<Self> {
        Self::build(layout, None)
    }

    /// A node exposing a nested container in every slot.
    pub fn slotted(layout: &str) -> Rc<Self> {
        Self::build(layout, Some(MemoryContainer::new()))
    }

    fn build(layout: &str, nested: Option<Rc<MemoryContainer>>) -> Rc<Self> {
        let id = SurfaceId::next();
        LAYOUTS.with(|layouts| layouts.borrow_mut().insert(id, layout.to_string()));
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            id,
            nested,
            listeners: RefCell::new(Vec::new()),
        })
    }

    /// Deliver a host-side detach signal to every live listener.
    pub fn signal_detached(&self) {
        let Some(me) = self.me.upgrade() else {
            return;
        };
        let me: Rc<dyn Surface> = me;
        let listeners: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for listener in listeners {
            listener.on_detached(&me);
        }
    }
}

impl Surface for MemorySurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn nested_container(&self, _slot: &str) -> Option<Rc<dyn Container>> {
        self.nested
            .as_ref()
            .map(|c| Rc::clone(c) as Rc<dyn Container>)
    }

    fn add_attach_listener(&self, listener: Weak<dyn AttachStateListener>) {
        self.listeners.borrow_mut().push(listener);
    }
}

/// An in-memory single-child container.
pub struct MemoryContainer {
    id: SurfaceId,
    child: RefCell<Option<Rc<dyn Surface>>>,
}

impl MemoryContainer {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: SurfaceId::next(),
            child: RefCell::new(None),
        })
    }

    pub fn child_id(&self) -> Option<SurfaceId> {
        self.child.borrow().as_ref().map(|c| c.id())
    }

    /// Layout name of the child, when it was made by a [`MemoryRenderFactory`].
    pub fn child_layout(&self) -> Option<String> {
        self.child_id().and_then(layout_of)
    }
}

impl Surface for MemoryContainer {
    fn id(&self) -> SurfaceId {
        self.id
    }
}

impl Container for MemoryContainer {
    fn child(&self) -> Option<Rc<dyn Surface>> {
        self.child.borrow().clone()
    }

    fn insert(&self, surface: Rc<dyn Surface>) {
        assert!(
            self.child.borrow().is_none(),
            "container already holds a child"
        );
        *self.child.borrow_mut() = Some(surface);
    }

    fn remove(&self, surface: &Rc<dyn Surface>) {
        let mut child = self.child.borrow_mut();
        if child.as_ref().is_some_and(|c| c.id() == surface.id()) {
            *child = None;
        }
    }
}

/// Renders every layout as a [`MemorySurface`].
#[derive(Default)]
pub struct MemoryRenderFactory {
    slotted: HashSet<String>,
    failing: HashSet<String>,
}

impl MemoryRenderFactory {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Layouts in `slotted` get a nested container.
    pub fn with_slots(slotted: &[&str]) -> Rc<Self> {
        Rc::new(Self {
            slotted: slotted.iter().map(|s| s.to_string()).collect(),
            failing: HashSet::new(),
        })
    }

    /// Layouts in `failing` cannot be rendered.
    pub fn failing(failing: &[&str]) -> Rc<Self> {
        Rc::new(Self {
            slotted: HashSet::new(),
            failing: failing.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl RenderFactory for MemoryRenderFactory {
    fn materialize(
        &self,
        layout: &LayoutDescriptor,
        _container: &dyn Container,
    ) -> Result<Rc<dyn Surface>, NavigationError> {
        let name = layout.as_str();
        if self.failing.contains(name) {
            return Err(NavigationError::Render {
                layout: name.to_string(),
                reason: "refused by test factory".to_string(),
            });
        }
        let surface: Rc<dyn Surface> = if self.slotted.contains(name) {
            MemorySurface::slotted(name)
        } else {
            MemorySurface::leaf(name)
        };
        Ok(surface)
    }
}

/// Writes every callback into an [`EventLog`].
pub struct RecordingCallback {
    log: EventLog,
}

impl RecordingCallback {
    pub fn new(log: &EventLog) -> Rc<Self> {
        Rc::new(Self { log: log.clone() })
    }
}

impl NavigationCallback for RecordingCallback {
    fn on_next(&self, handled: bool) {
        self.log.push(Event::Callback {
            forward: true,
            handled,
        });
    }

    fn on_previous(&self, handled: bool) {
        self.log.push(Event::Callback {
            forward: false,
            handled,
        });
    }
}

/// A [`log::Log`] that keeps `"LEVEL message"` lines.
pub struct RecordingLog {
    level: Level,
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingLog {
    pub fn new(level: Level) -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                level,
                lines: Arc::clone(&lines),
            },
            lines,
        )
    }
}

impl Log for RecordingLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("{} {}", record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}
