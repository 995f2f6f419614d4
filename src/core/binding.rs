//! # Attachment Binding
//!
//! Ties one coordinator to the surface it is rendered on and turns the
//! host's attach/detach signals into exactly one `attach` / `detach` hook
//! call per real transition.
//!
//! Hosts may deliver the same signal more than once (or the navigator may
//! deliver it before the host does). The binding remembers which surface it
//! is bound to and ignores repeats:
//!
//! | signal          | recorded surface | effect                               |
//! |-----------------|------------------|--------------------------------------|
//! | attached(s)     | s                | none                                 |
//! | attached(s)     | other / none     | bind, or `AlreadyAttached` if bound elsewhere |
//! | detached(s)     | s                | unbind                               |
//! | detached(s)     | other / none     | none                                 |

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, error};

use crate::core::coordinator::Coordinator;
use crate::core::error::NavigationError;
use crate::core::navigator::Navigator;
use crate::core::surface::{AttachStateListener, Surface, SurfaceId};

pub struct AttachmentBinding {
    coordinator: Rc<dyn Coordinator>,
    navigator: Option<Weak<Navigator>>,
    bound: RefCell<Option<Rc<dyn Surface>>>,
}

impl AttachmentBinding {
    /// A binding for `coordinator`, which will report `navigator` as its parent while bound.
    pub fn new(coordinator: Rc<dyn Coordinator>, navigator: Option<Weak<Navigator>>) -> Rc<Self> {
        Rc::new(Self {
            coordinator,
            navigator,
            bound: RefCell::new(None),
        })
    }

    /// Bind `coordinator` to `surface`: subscribe to the surface's signals and
    /// deliver the first attach right away, since the host may already have
    /// sent it before anyone was listening.
    pub fn bind(
        surface: &Rc<dyn Surface>,
        coordinator: Rc<dyn Coordinator>,
        navigator: Option<Weak<Navigator>>,
    ) -> Result<Rc<Self>, NavigationError> {
        let binding = Self::new(coordinator, navigator);
        let listener: Rc<dyn AttachStateListener> = binding.clone();
        surface.add_attach_listener(Rc::downgrade(&listener));
        binding.on_attached(surface)?;
        Ok(binding)
    }

    pub fn bound_surface(&self) -> Option<SurfaceId> {
        self.bound.borrow().as_ref().map(|s| s.id())
    }
}

impl AttachStateListener for AttachmentBinding {
    fn on_attached(&self, surface: &Rc<dyn Surface>) -> Result<(), NavigationError> {
        if self.bound_surface() == Some(surface.id()) {
            return Ok(());
        }
        let core = self.coordinator.core();
        if core.is_attached() {
            let name = self.coordinator.name();
            error!(
                "Refusing to bind {} to surface {}: already attached",
                name,
                surface.id().get()
            );
            return Err(NavigationError::AlreadyAttached { coordinator: name });
        }

        debug!(
            "Attaching {} to surface {}",
            self.coordinator.name(),
            surface.id().get()
        );
        core.set_navigator(self.navigator.clone());
        *self.bound.borrow_mut() = Some(Rc::clone(surface));
        core.set_attached(true);
        self.coordinator.attach(surface.as_ref());
        Ok(())
    }

    fn on_detached(&self, surface: &Rc<dyn Surface>) {
        if self.bound_surface() != Some(surface.id()) {
            return;
        }
        let Some(bound) = self.bound.borrow_mut().take() else {
            return;
        };

        debug!(
            "Detaching {} from surface {}",
            self.coordinator.name(),
            bound.id().get()
        );
        self.coordinator.detach(bound.as_ref());
        let core = self.coordinator.core();
        core.set_attached(false);
        core.set_navigator(None);
    }
}
