//! Section lifetimes.
//!
//! Every registration (binding, hover region, draggable, timeline, theme
//! subscription) carries a [`Liveness`] cloned from its section's
//! [`SectionScope`].  Tearing the scope down (explicitly or by dropping it)
//! flips the shared flag once; components check it before every per-frame
//! callback and prune whatever belongs to a dead section.

use std::cell::Cell;
use std::rc::Rc;

/// Shared "is my section still mounted" flag.
#[derive(Debug, Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    /// A flag that is never torn down.  For process-wide registrations.
    pub fn forever() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }
}

/// Owner of a section's lifetime.  Teardown happens at most once.
#[derive(Debug)]
pub struct SectionScope {
    name: &'static str,
    alive: Rc<Cell<bool>>,
}

impl SectionScope {
    pub fn new(name: &'static str) -> Self {
        tracing::debug!(section = name, "section mounted");
        Self {
            name,
            alive: Rc::new(Cell::new(true)),
        }
    }

    /// Token handed to each registration made on behalf of this section.
    pub fn liveness(&self) -> Liveness {
        Liveness(Rc::clone(&self.alive))
    }

    /// Invalidate every registration made through this scope.
    pub fn teardown(&self) {
        if self.alive.replace(false) {
            tracing::debug!(section = self.name, "section torn down");
        }
    }
}

impl Drop for SectionScope {
    fn drop(&mut self) {
        self.teardown();
    }
}
