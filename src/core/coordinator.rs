//! # Coordinators
//!
//! A coordinator owns one page's behaviour. The engine drives it through a
//! fixed hook sequence:
//!
//! ```text
//! attach → set_state → (on_enter | on_reenter)
//!        … page is active …
//! (on_exit_forwards | on_exit_backwards) → ending_state → detach
//! ```
//!
//! The sequence may repeat when a cached page is revisited. All hooks take
//! `&self`: pages keep their own mutable bits in `Cell`/`RefCell`, which lets
//! a hook call back into its navigator without tripping a borrow.
//!
//! Attachment bookkeeping lives in [`CoordinatorCore`], which every
//! implementation embeds and exposes through [`Coordinator::core`]. Only the
//! [`AttachmentBinding`](super::binding::AttachmentBinding) writes to it.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::error::NavigationError;
use crate::core::navigator::Navigator;
use crate::core::state::State;
use crate::core::surface::Surface;

/// Opaque description of what a page looks like, handed to the render factory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutDescriptor(Cow<'static, str>);

impl LayoutDescriptor {
    pub const fn from_static(name: &'static str) -> Self {
        LayoutDescriptor(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        LayoutDescriptor(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attachment status shared by every coordinator.
#[derive(Default)]
pub struct CoordinatorCore {
    attached: Cell<bool>,
    navigator: RefCell<Option<Weak<Navigator>>>,
    state: RefCell<State>,
}

impl CoordinatorCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// True from just before the `attach` hook until just after `detach`.
    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// The navigator this coordinator is currently rendered by, if any.
    pub fn navigator(&self) -> Option<Rc<Navigator>> {
        self.navigator.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// The last state handed to this coordinator.
    pub fn state(&self) -> State {
        self.state.borrow().clone()
    }

    pub fn set_state(&self, state: State) {
        *self.state.borrow_mut() = state;
    }

    pub(crate) fn set_attached(&self, attached: bool) {
        self.attached.set(attached);
    }

    pub(crate) fn set_navigator(&self, navigator: Option<Weak<Navigator>>) {
        *self.navigator.borrow_mut() = navigator;
    }
}

impl fmt::Debug for CoordinatorCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinatorCore")
            .field("attached", &self.attached.get())
            .field("has_navigator", &self.navigator().is_some())
            .finish()
    }
}

/// Behaviour of a single page.
///
/// Only [`core`](Coordinator::core) and [`layout`](Coordinator::layout) are
/// required; every hook defaults to doing nothing.
pub trait Coordinator {
    fn core(&self) -> &CoordinatorCore;

    /// Descriptor the render factory uses to build this page's node. Pure.
    fn layout(&self) -> LayoutDescriptor;

    /// Human-readable name used in logs and error messages.
    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }

    /// Called when bound to a surface. Invoked by the attachment binding only.
    fn attach(&self, _surface: &dyn Surface) {}

    /// Page became active through forward navigation. Runs after `attach`.
    fn on_enter(&self, _surface: &dyn Surface) {}

    /// Page became active through backward navigation. Runs after `attach`.
    fn on_reenter(&self, _surface: &dyn Surface) {}

    /// Page is being left through forward navigation. Runs before `detach`.
    fn on_exit_forwards(&self, _surface: &dyn Surface) {}

    /// Page is being left through backward navigation. Runs before `detach`.
    fn on_exit_backwards(&self, _surface: &dyn Surface) {}

    /// Called when unbound from its surface. Invoked by the attachment binding only.
    fn detach(&self, _surface: &dyn Surface) {}

    /// Return `Ok(true)` to consume a back press, e.g. while navigating internally.
    ///
    /// A coordinator that consumes it is expected to eventually call
    /// [`Navigator::previous_page`] itself.
    fn on_back_press(&self) -> Result<bool, NavigationError> {
        Ok(false)
    }

    /// Receives the navigator's running state after attach and before the entry hook.
    fn set_state(&self, state: State) {
        self.core().set_state(state);
    }

    /// Last chance to contribute to the running state before detach.
    ///
    /// Returns `state` unchanged by default.
    fn ending_state(&self, state: State) -> State {
        state
    }

    fn is_attached(&self) -> bool {
        self.core().is_attached()
    }

    fn navigator(&self) -> Option<Rc<Navigator>> {
        self.core().navigator()
    }

    fn state(&self) -> State {
        self.core().state()
    }

    /// `Some` when this coordinator is itself a navigator.
    fn as_navigator(&self) -> Option<Rc<Navigator>> {
        None
    }
}

/// Identity comparison for shared coordinators.
pub fn same_coordinator(a: &Rc<dyn Coordinator>, b: &Rc<dyn Coordinator>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
