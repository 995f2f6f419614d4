//! Terminal-side implementations of the engine's rendering interfaces.
//!
//! Nothing here draws. A [`TerminalContainer`] only records which surface is
//! mounted in it; `ui.rs` draws from the flow model afterwards.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, warn};

use crate::core::coordinator::LayoutDescriptor;
use crate::core::error::NavigationError;
use crate::core::flow::{NAVIGATOR_LAYOUT, PAGE_LAYOUT};
use crate::core::surface::{Container, NAVIGATOR_CONTENT, RenderFactory, Surface, SurfaceId};

pub struct TerminalContainer {
    id: SurfaceId,
    child: RefCell<Option<Rc<dyn Surface>>>,
}

impl TerminalContainer {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: SurfaceId::next(),
            child: RefCell::new(None),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.child.borrow().is_none()
    }
}

impl Surface for TerminalContainer {
    fn id(&self) -> SurfaceId {
        self.id
    }
}

impl Container for TerminalContainer {
    fn child(&self) -> Option<Rc<dyn Surface>> {
        self.child.borrow().clone()
    }

    fn insert(&self, surface: Rc<dyn Surface>) {
        let previous = self.child.borrow_mut().replace(surface);
        if let Some(previous) = previous {
            warn!(
                "Container {} replaced surface {} that was never removed",
                self.id.get(),
                previous.id().get()
            );
        }
    }

    fn remove(&self, surface: &Rc<dyn Surface>) {
        let mut child = self.child.borrow_mut();
        if child.as_ref().is_some_and(|c| c.id() == surface.id()) {
            *child = None;
        }
    }
}

pub struct TerminalSurface {
    id: SurfaceId,
    nested: Option<Rc<TerminalContainer>>,
}

impl Surface for TerminalSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn nested_container(&self, slot: &str) -> Option<Rc<dyn Container>> {
        if slot != NAVIGATOR_CONTENT {
            return None;
        }
        self.nested
            .as_ref()
            .map(|c| Rc::clone(c) as Rc<dyn Container>)
    }
}

/// Builds [`TerminalSurface`]s. Layouts registered as navigator layouts get
/// a nested container in the `NAVIGATOR_CONTENT` slot.
pub struct TerminalRenderFactory {
    leaf_layouts: HashSet<String>,
    navigator_layouts: HashSet<String>,
}

impl TerminalRenderFactory {
    /// A factory for flow layouts.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::with_layouts(
            &[PAGE_LAYOUT.as_str()],
            &[NAVIGATOR_LAYOUT.as_str()],
        ))
    }

    pub fn with_layouts(leaves: &[&str], navigators: &[&str]) -> Self {
        Self {
            leaf_layouts: leaves.iter().map(|l| l.to_string()).collect(),
            navigator_layouts: navigators.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl RenderFactory for TerminalRenderFactory {
    fn materialize(
        &self,
        layout: &LayoutDescriptor,
        container: &dyn Container,
    ) -> Result<Rc<dyn Surface>, NavigationError> {
        let nested = if self.navigator_layouts.contains(layout.as_str()) {
            Some(TerminalContainer::new())
        } else if self.leaf_layouts.contains(layout.as_str()) {
            None
        } else {
            return Err(NavigationError::Render {
                layout: layout.to_string(),
                reason: "no terminal view registered for this layout".to_string(),
            });
        };

        let surface = TerminalSurface {
            id: SurfaceId::next(),
            nested,
        };
        debug!(
            "Materialized {} as surface {} in container {}",
            layout,
            surface.id.get(),
            container.id().get()
        );
        Ok(Rc::new(surface))
    }
}
