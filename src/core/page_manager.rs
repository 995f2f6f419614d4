//! # Page Managers
//!
//! A page manager is the ordered, cursor-addressed source of pages behind a
//! navigator. The cursor starts before the first page:
//!
//! ```text
//!  cursor:  -1     0     1    …   N-1     N
//!           │    [P0]  [P1]  …  [PN-1]    │
//!        before                        past end
//!         start                      (exhausted)
//! ```
//!
//! `next_page()` / `previous_page()` move the cursor one step and answer with
//! the page there. Stepping off either end answers `None` and leaves the
//! cursor on the exhausted position; further steps in the same direction are
//! no-ops.

use std::rc::Rc;

use log::trace;

use crate::core::coordinator::Coordinator;

pub trait PageManager {
    /// The page under the cursor, if any.
    fn current_page(&self) -> Option<Rc<dyn Coordinator>>;

    /// Step forward and return the page there, or `None` past the last page.
    fn next_page(&mut self) -> Option<Rc<dyn Coordinator>>;

    /// Step backward and return the page there, or `None` before the first page.
    fn previous_page(&mut self) -> Option<Rc<dyn Coordinator>>;

    /// Back to the initial, page-less condition. Called when the navigator detaches.
    fn reset(&mut self);
}

/// Creates the page at a given index on first visit.
pub trait PageFactory {
    /// `None` means there is no page at `index`, i.e. the sequence ends before it.
    fn create_coordinator(&mut self, index: usize) -> Option<Rc<dyn Coordinator>>;
}

impl<F> PageFactory for F
where
    F: FnMut(usize) -> Option<Rc<dyn Coordinator>>,
{
    fn create_coordinator(&mut self, index: usize) -> Option<Rc<dyn Coordinator>> {
        self(index)
    }
}

/// Result of asking the factory for an index, remembered for the lifetime of the cache.
enum Slot {
    Page(Rc<dyn Coordinator>),
    Absent,
}

/// A [`PageManager`] that creates pages lazily and keeps them.
///
/// Revisiting index `i` returns the same coordinator instance until
/// [`reset`](PageManager::reset) drops the whole cache. An index the factory
/// declined is cached as absent and marks the end of the sequence.
pub struct CachingPageManager<F> {
    factory: F,
    cached: Vec<Slot>,
    /// -1 is "before the first page"; `cached.len() - 1` may be an absent slot.
    cursor: isize,
}

impl<F: PageFactory> CachingPageManager<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            cached: Vec::new(),
            cursor: -1,
        }
    }

    /// Cursor position, -1 meaning before the first page.
    pub fn cursor(&self) -> isize {
        self.cursor
    }

    /// Number of indices the factory has been asked about since the last reset.
    pub fn cached_len(&self) -> usize {
        self.cached.len()
    }

    fn page_at(&self, index: isize) -> Option<Rc<dyn Coordinator>> {
        let index = usize::try_from(index).ok()?;
        match self.cached.get(index)? {
            Slot::Page(page) => Some(Rc::clone(page)),
            Slot::Absent => None,
        }
    }

    /// True when the cursor sits on the cached end marker.
    fn past_end(&self) -> bool {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|i| self.cached.get(i))
            .is_some_and(|slot| matches!(slot, Slot::Absent))
    }

    fn realize(&mut self, index: usize) -> Option<Rc<dyn Coordinator>> {
        if index < self.cached.len() {
            return self.page_at(index as isize);
        }
        // The cursor only moves one step at a time, so growth is always at the tail.
        debug_assert_eq!(index, self.cached.len());
        let created = self.factory.create_coordinator(index);
        trace!(
            "Page factory answered index {}: {}",
            index,
            if created.is_some() { "page" } else { "end" }
        );
        self.cached.push(match &created {
            Some(page) => Slot::Page(Rc::clone(page)),
            None => Slot::Absent,
        });
        created
    }
}

impl<F: PageFactory> PageManager for CachingPageManager<F> {
    fn current_page(&self) -> Option<Rc<dyn Coordinator>> {
        self.page_at(self.cursor)
    }

    fn next_page(&mut self) -> Option<Rc<dyn Coordinator>> {
        if self.past_end() {
            return None;
        }
        self.cursor += 1;
        self.realize(self.cursor as usize)
    }

    fn previous_page(&mut self) -> Option<Rc<dyn Coordinator>> {
        if self.cursor < 0 {
            return None;
        }
        self.cursor -= 1;
        self.page_at(self.cursor)
    }

    fn reset(&mut self) {
        self.cached.clear();
        self.cursor = -1;
    }
}
