//! # Rendering Surfaces
//!
//! The engine never draws anything. It talks to whatever does the drawing
//! through the interfaces in this module:
//!
//! - [`Surface`]: a rendered node. Has an identity and may expose a nested
//!   [`Container`] in a well-known slot.
//! - [`Container`]: a slot that holds at most one rendered child.
//! - [`RenderFactory`]: turns a page's [`LayoutDescriptor`] into a surface.
//! - [`AttachStateListener`]: receives low-level attach/detach signals for a
//!   surface. [`AttachmentBinding`](super::binding::AttachmentBinding) is the
//!   engine's implementation.

use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::coordinator::LayoutDescriptor;
use crate::core::error::NavigationError;

/// Slot identifier under which a navigator page exposes the container its
/// own pages render into.
pub const NAVIGATOR_CONTENT: &str = "navigator_content";

/// Identity of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// A process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SurfaceId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A rendered node.
pub trait Surface {
    fn id(&self) -> SurfaceId;

    /// The nested container at `slot`, if this node has one.
    fn nested_container(&self, _slot: &str) -> Option<Rc<dyn Container>> {
        None
    }

    /// Register for attach/detach signals delivered by the host.
    ///
    /// Hosts that never emit signals on their own can ignore this; the
    /// navigator delivers the signals it causes itself.
    fn add_attach_listener(&self, _listener: Weak<dyn AttachStateListener>) {}
}

/// A slot that renders at most one child surface.
///
/// A container is itself a surface so a root navigator can bind to it.
pub trait Container: Surface {
    /// The child currently rendered here.
    fn child(&self) -> Option<Rc<dyn Surface>>;

    fn insert(&self, surface: Rc<dyn Surface>);

    fn remove(&self, surface: &Rc<dyn Surface>);
}

/// Materialises renderable nodes for page layouts.
pub trait RenderFactory {
    fn materialize(
        &self,
        layout: &LayoutDescriptor,
        container: &dyn Container,
    ) -> Result<Rc<dyn Surface>, NavigationError>;
}

/// Receiver of low-level attach/detach signals for a surface.
pub trait AttachStateListener {
    fn on_attached(&self, surface: &Rc<dyn Surface>) -> Result<(), NavigationError>;
    fn on_detached(&self, surface: &Rc<dyn Surface>);
}
