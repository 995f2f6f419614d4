//! # Navigator
//!
//! A navigator is a coordinator that owns a sequence of pages and moves
//! through it. Navigators nest, so a running app is a tree:
//!
//! ```text
//! Navigator (root)
//! ├── Page
//! ├── Navigator ──┬── Page
//! │               └── Page
//! └── Page
//! ```
//!
//! ## Traversal
//!
//! A `next_page()` / `previous_page()` call is resolved depth-first:
//!
//! 1. If the mounted page is a navigator, it gets the request first. Its
//!    answer is final at this level.
//! 2. Otherwise the page manager steps its cursor. A page found there replaces
//!    the mounted one.
//! 3. No page: the request bubbles to the parent navigator's step 2. At the
//!    root, the callback hears `handled = false` and the call returns `false`.
//!
//! Replacing a page is strictly ordered:
//!
//! ```text
//! outgoing: exit hook → ending_state folded → removed → detach
//! incoming: rendered → inserted → attach → set_state → entry hook
//!           → (navigator) initialised in its nested container
//! ```
//!
//! A navigator passes its exit hook down to its mounted page and answers
//! `ending_state` with its own running state, so whatever a nested flow
//! collected reaches the parent. Its `detach` then unmounts the page
//! (detach hook only) and resets the page manager.
//!
//! Nothing here is thread-safe or re-entrant across threads; everything runs
//! on the thread that drives the rendering surface. No `RefCell` borrow is
//! held while a hook runs, so hooks may call back into their navigator.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::Log;

use crate::core::binding::AttachmentBinding;
use crate::core::coordinator::{Coordinator, CoordinatorCore, LayoutDescriptor, same_coordinator};
use crate::core::diagnostics::Diagnostics;
use crate::core::error::NavigationError;
use crate::core::page_manager::PageManager;
use crate::core::state::State;
use crate::core::surface::{AttachStateListener, Container, NAVIGATOR_CONTENT, RenderFactory, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn step(self, pages: &mut dyn PageManager) -> Option<Rc<dyn Coordinator>> {
        match self {
            Direction::Forward => pages.next_page(),
            Direction::Backward => pages.previous_page(),
        }
    }

    fn enter(self, page: &dyn Coordinator, surface: &dyn Surface) {
        match self {
            Direction::Forward => page.on_enter(surface),
            Direction::Backward => page.on_reenter(surface),
        }
    }

    fn exit(self, page: &dyn Coordinator, surface: &dyn Surface) {
        match self {
            Direction::Forward => page.on_exit_forwards(surface),
            Direction::Backward => page.on_exit_backwards(surface),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("next"),
            Direction::Backward => f.write_str("previous"),
        }
    }
}

/// Observer of navigation outcomes.
///
/// Invoked once per `next_page()` / `previous_page()` at the navigator where
/// the request ends up: `handled = false` means the first or last page was
/// reached.
pub trait NavigationCallback {
    fn on_next(&self, handled: bool);
    fn on_previous(&self, handled: bool);
}

impl<F> NavigationCallback for F
where
    F: Fn(Direction, bool),
{
    fn on_next(&self, handled: bool) {
        self(Direction::Forward, handled)
    }

    fn on_previous(&self, handled: bool) {
        self(Direction::Backward, handled)
    }
}

/// How a navigation request ended at one level of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Traversal {
    /// This navigator swapped pages.
    Handled,
    /// Nothing to move to and nobody above to ask.
    Declined,
    /// Handed to the parent, which already tried its own step.
    Escalated { handled: bool },
}

impl Traversal {
    fn handled(self) -> bool {
        matches!(
            self,
            Traversal::Handled | Traversal::Escalated { handled: true }
        )
    }
}

/// The page currently rendered in a navigator's container.
struct Mounted {
    coordinator: Rc<dyn Coordinator>,
    surface: Rc<dyn Surface>,
    binding: Rc<AttachmentBinding>,
}

pub struct Navigator {
    me: Weak<Navigator>,
    name: String,
    layout: LayoutDescriptor,
    core: CoordinatorCore,
    page_manager: RefCell<Box<dyn PageManager>>,
    render_factory: Rc<dyn RenderFactory>,
    container: RefCell<Option<Rc<dyn Container>>>,
    callback: RefCell<Option<Rc<dyn NavigationCallback>>>,
    mounted: RefCell<Option<Mounted>>,
    /// Binding of this navigator to its container when it is the tree's root.
    root_binding: RefCell<Option<Rc<AttachmentBinding>>>,
    diagnostics: Diagnostics,
}

pub struct NavigatorBuilder {
    name: String,
    layout: LayoutDescriptor,
    page_manager: Box<dyn PageManager>,
    render_factory: Rc<dyn RenderFactory>,
    log_sink: Option<Box<dyn Log>>,
}

impl NavigatorBuilder {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Layout used when this navigator is itself a page of another navigator.
    /// It must render a container in the `NAVIGATOR_CONTENT` slot.
    pub fn with_layout(mut self, layout: LayoutDescriptor) -> Self {
        self.layout = layout;
        self
    }

    /// Send this navigator's diagnostics to `sink` instead of the global logger.
    pub fn with_log_sink(mut self, sink: Box<dyn Log>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub fn build(self) -> Rc<Navigator> {
        Rc::new_cyclic(|me| Navigator {
            me: me.clone(),
            name: self.name,
            layout: self.layout,
            core: CoordinatorCore::new(),
            page_manager: RefCell::new(self.page_manager),
            render_factory: self.render_factory,
            container: RefCell::new(None),
            callback: RefCell::new(None),
            mounted: RefCell::new(None),
            root_binding: RefCell::new(None),
            diagnostics: Diagnostics::new(self.log_sink),
        })
    }
}

impl Navigator {
    pub fn builder(
        page_manager: impl PageManager + 'static,
        render_factory: Rc<dyn RenderFactory>,
    ) -> NavigatorBuilder {
        NavigatorBuilder {
            name: "Navigator".to_string(),
            layout: LayoutDescriptor::from_static("navigator"),
            page_manager: Box::new(page_manager),
            render_factory,
            log_sink: None,
        }
    }

    /// Bind this navigator to `container` as the root of a tree and show the first page.
    ///
    /// Fails with `EmptyPageSource` if the page manager has no first page.
    pub fn initialize(self: &Rc<Self>, container: Rc<dyn Container>) -> Result<(), NavigationError> {
        let surface: Rc<dyn Surface> = container.clone();
        let me: Rc<dyn Coordinator> = self.clone();
        let binding = AttachmentBinding::bind(&surface, me, None)?;
        *self.root_binding.borrow_mut() = Some(binding);
        self.start(container)
    }

    /// Move to the next page. `Ok(false)` when there is no next page anywhere up the tree.
    pub fn next_page(&self) -> Result<bool, NavigationError> {
        Ok(self.navigate(Direction::Forward)?.handled())
    }

    /// Move to the previous page. `Ok(false)` when there is no previous page anywhere up the tree.
    pub fn previous_page(&self) -> Result<bool, NavigationError> {
        Ok(self.navigate(Direction::Backward)?.handled())
    }

    pub fn set_navigation_callback(&self, callback: Rc<dyn NavigationCallback>) {
        *self.callback.borrow_mut() = Some(callback);
    }

    /// Deliver the detach signal for the root binding, tearing the whole tree down.
    pub fn release(&self) {
        let binding = self.root_binding.borrow_mut().take();
        let container = self.container.borrow().clone();
        if let (Some(binding), Some(container)) = (binding, container) {
            let surface: Rc<dyn Surface> = container;
            binding.on_detached(&surface);
        }
    }

    /// The coordinator currently rendered in this navigator's container.
    pub fn current_coordinator(&self) -> Option<Rc<dyn Coordinator>> {
        self.mounted
            .borrow()
            .as_ref()
            .map(|m| Rc::clone(&m.coordinator))
    }

    /// The surface currently rendered in this navigator's container.
    pub fn current_surface(&self) -> Option<Rc<dyn Surface>> {
        self.mounted.borrow().as_ref().map(|m| Rc::clone(&m.surface))
    }

    /// The page under the page manager's cursor.
    pub fn current_page(&self) -> Option<Rc<dyn Coordinator>> {
        self.page_manager.borrow().current_page()
    }

    pub fn container(&self) -> Option<Rc<dyn Container>> {
        self.container.borrow().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.container.borrow().is_some()
    }

    /// Show the first page in `container` without binding this navigator to it.
    fn start(&self, container: Rc<dyn Container>) -> Result<(), NavigationError> {
        *self.container.borrow_mut() = Some(container);
        match self.advance(Direction::Forward, false)? {
            Traversal::Handled => Ok(()),
            _ => {
                self.diagnostics
                    .error(format_args!("{} has no first page", self.name));
                Err(NavigationError::EmptyPageSource {
                    navigator: self.name.clone(),
                })
            }
        }
    }

    fn navigate(&self, direction: Direction) -> Result<Traversal, NavigationError> {
        // The mounted child, not the page under the cursor: after an
        // exhausted step the cursor no longer points at what is on screen.
        if let Some(child) = self.active_child() {
            self.diagnostics.trace(format_args!(
                "{}: offering {} to child navigator {}",
                self.name, direction, child.name
            ));
            match child.navigate(direction)? {
                Traversal::Declined => {}
                outcome => return Ok(outcome),
            }
        }
        self.advance(direction, true)
    }

    fn advance(&self, direction: Direction, bubble: bool) -> Result<Traversal, NavigationError> {
        let container = self.container().ok_or_else(|| NavigationError::NotInitialized {
            navigator: self.name.clone(),
        })?;

        let Some(incoming) = self.step(direction) else {
            if bubble && let Some(parent) = self.core.navigator() {
                self.diagnostics.debug(format_args!(
                    "{}: no {} page, bubbling to {}",
                    self.name, direction, parent.name
                ));
                let handled = parent.advance(direction, true)?.handled();
                return Ok(Traversal::Escalated { handled });
            }
            self.diagnostics
                .debug(format_args!("{}: no {} page", self.name, direction));
            self.notify(direction, false);
            return Ok(Traversal::Declined);
        };

        self.unmount(direction, &container);
        self.mount(incoming, direction, &container)?;
        self.notify(direction, true);
        Ok(Traversal::Handled)
    }

    /// Step the page manager, skipping over the page that is already on screen.
    ///
    /// After an exhausted step the cursor rests one past the end; stepping
    /// back from there lands on the page still being shown. That page is
    /// skipped, never re-mounted: a move always changes the page on screen.
    fn step(&self, direction: Direction) -> Option<Rc<dyn Coordinator>> {
        let mut pages = self.page_manager.borrow_mut();
        let page = direction.step(pages.as_mut())?;
        let showing = self
            .mounted
            .borrow()
            .as_ref()
            .is_some_and(|m| same_coordinator(&m.coordinator, &page));
        if showing {
            return direction.step(pages.as_mut());
        }
        Some(page)
    }

    fn unmount(&self, direction: Direction, container: &Rc<dyn Container>) {
        let outgoing = self.mounted.borrow_mut().take();
        let Some(outgoing) = outgoing else {
            return;
        };
        self.diagnostics.trace(format_args!(
            "{}: leaving {} ({})",
            self.name,
            outgoing.coordinator.name(),
            direction
        ));

        direction.exit(outgoing.coordinator.as_ref(), outgoing.surface.as_ref());
        let folded = outgoing.coordinator.ending_state(self.core.state());
        self.core.set_state(folded);
        container.remove(&outgoing.surface);
        outgoing.binding.on_detached(&outgoing.surface);
    }

    fn mount(
        &self,
        incoming: Rc<dyn Coordinator>,
        direction: Direction,
        container: &Rc<dyn Container>,
    ) -> Result<(), NavigationError> {
        let layout = incoming.layout();
        self.diagnostics.debug(format_args!(
            "{}: showing {} (layout {}, {})",
            self.name,
            incoming.name(),
            layout,
            direction
        ));

        let surface = self
            .render_factory
            .materialize(&layout, container.as_ref())?;
        container.insert(Rc::clone(&surface));
        let binding = AttachmentBinding::bind(&surface, Rc::clone(&incoming), Some(self.me.clone()))?;
        *self.mounted.borrow_mut() = Some(Mounted {
            coordinator: Rc::clone(&incoming),
            surface: Rc::clone(&surface),
            binding,
        });

        incoming.set_state(self.core.state());
        direction.enter(incoming.as_ref(), surface.as_ref());

        if let Some(child) = incoming.as_navigator() {
            let Some(nested) = surface.nested_container(NAVIGATOR_CONTENT) else {
                self.diagnostics.error(format_args!(
                    "{}: child navigator {} rendered without a {} container",
                    self.name, child.name, NAVIGATOR_CONTENT
                ));
                return Err(NavigationError::MissingNestedContainer {
                    navigator: self.name.clone(),
                    child: child.name.clone(),
                    slot: NAVIGATOR_CONTENT,
                });
            };
            child.start(nested)?;
        }
        Ok(())
    }

    fn notify(&self, direction: Direction, handled: bool) {
        let callback = self.callback.borrow().clone();
        if let Some(callback) = callback {
            match direction {
                Direction::Forward => callback.on_next(handled),
                Direction::Backward => callback.on_previous(handled),
            }
        }
    }

    fn active_child(&self) -> Option<Rc<Navigator>> {
        self.current_coordinator()
            .and_then(|current| current.as_navigator())
    }

    /// Run the mounted page's exit hook and fold its ending state, leaving it mounted.
    fn leave(&self, direction: Direction) {
        let current = self
            .mounted
            .borrow()
            .as_ref()
            .map(|m| (Rc::clone(&m.coordinator), Rc::clone(&m.surface)));
        if let Some((coordinator, surface)) = current {
            direction.exit(coordinator.as_ref(), surface.as_ref());
            let folded = coordinator.ending_state(self.core.state());
            self.core.set_state(folded);
        }
    }

    fn back(&self) -> Result<Traversal, NavigationError> {
        if let Some(current) = self.current_coordinator() {
            if let Some(child) = current.as_navigator() {
                return child.back();
            }
            if current.on_back_press()? {
                return Ok(Traversal::Handled);
            }
        }
        self.navigate(Direction::Backward)
    }
}

impl Coordinator for Navigator {
    fn core(&self) -> &CoordinatorCore {
        &self.core
    }

    fn layout(&self) -> LayoutDescriptor {
        self.layout.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    /// Leaving a navigator leaves its mounted page too.
    fn on_exit_forwards(&self, _surface: &dyn Surface) {
        self.leave(Direction::Forward);
    }

    fn on_exit_backwards(&self, _surface: &dyn Surface) {
        self.leave(Direction::Backward);
    }

    /// Hands everything this navigator's pages added back to the parent.
    fn ending_state(&self, _state: State) -> State {
        self.core.state()
    }

    /// Unmounts the current page (children first), then forgets every cached
    /// page, the container and the callback.
    fn detach(&self, _surface: &dyn Surface) {
        let outgoing = self.mounted.borrow_mut().take();
        if let Some(outgoing) = outgoing {
            if let Some(container) = self.container() {
                container.remove(&outgoing.surface);
            }
            outgoing.binding.on_detached(&outgoing.surface);
        }
        self.page_manager.borrow_mut().reset();
        *self.container.borrow_mut() = None;
        *self.callback.borrow_mut() = None;
        self.diagnostics
            .debug(format_args!("{}: detached and reset", self.name));
    }

    /// The mounted page gets the back press first; otherwise go to the previous page.
    fn on_back_press(&self) -> Result<bool, NavigationError> {
        Ok(self.back()?.handled())
    }

    fn as_navigator(&self) -> Option<Rc<Navigator>> {
        self.me.upgrade()
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("name", &self.name)
            .field("layout", &self.layout)
            .field("attached", &self.core.is_attached())
            .field("initialized", &self.is_initialized())
            .field(
                "current",
                &self.current_coordinator().map(|c| c.name()),
            )
            .finish()
    }
}
