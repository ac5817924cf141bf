use super::config::SortableConfig;
use super::registry::{BindOutcome, Registry};
use super::session::{DragPhase, DragSession, Settled};
use super::surface::SortSurface;
use std::rc::Rc;

/// A pointer press on a handle, already resolved to its container and item.
#[derive(Clone, Debug)]
pub struct Grab<C, I> {
    pub container: C,
    pub item: I,
    pub pointer_id: i32,
    pub x: f64,
    pub y: f64,
    /// Primary button / touch contact.
    pub primary: bool,
}

/// Every bound container on a page plus the single drag in progress.
///
/// At most one session exists at a time; presses while one is active are
/// ignored, as are moves and releases from other pointers.
pub struct Sortables<S: SortSurface> {
    surface: S,
    registry: Registry<S::Container>,
    active: Option<DragSession<S::Container, S::Item>>,
}

impl<S> Sortables<S>
where
    S: SortSurface,
    S::Container: 'static,
{
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            registry: Registry::default(),
            active: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Bind or rebind a container.
    pub fn bind(
        &mut self,
        container: S::Container,
        config: SortableConfig<S::Container>,
    ) -> BindOutcome {
        self.registry.bind(container, config)
    }

    pub fn config(&self, container: &S::Container) -> Option<Rc<SortableConfig<S::Container>>> {
        self.registry.config(container)
    }

    pub fn is_bound(&self, container: &S::Container) -> bool {
        self.registry.is_bound(container)
    }

    /// Forget containers the surface no longer renders. A session whose
    /// origin went away is aborted.
    pub fn prune(&mut self) -> Vec<S::Container> {
        let surface = &self.surface;
        let removed = self.registry.prune(|c| surface.is_live(c));
        let orphaned = self
            .active
            .as_ref()
            .is_some_and(|s| removed.contains(s.origin()));
        if orphaned {
            self.abort();
        }
        removed
    }

    pub fn phase(&self) -> DragPhase {
        self.active
            .as_ref()
            .map_or(DragPhase::Idle, DragSession::phase)
    }

    pub fn active_pointer(&self) -> Option<i32> {
        self.active.as_ref().map(DragSession::pointer_id)
    }

    /// Placeholder slot of the session being dragged.
    pub fn slot(&self) -> Option<usize> {
        self.active.as_ref().map(DragSession::slot)
    }

    /// Arm a session for `grab`. Returns the item's index when armed.
    pub fn arm(&mut self, grab: Grab<S::Container, S::Item>) -> Option<usize> {
        if self.active.is_some() || !grab.primary {
            return None;
        }
        let config = self.registry.config(&grab.container)?;
        let items = self.surface.items(&grab.container, &config.item_selector);
        let index = items.iter().position(|i| *i == grab.item)?;
        if items.len() < 2 && !config.allows_cross_container() {
            return None;
        }
        self.active = Some(DragSession::arm(
            grab.pointer_id,
            grab.container,
            grab.item,
            config,
            index,
            (grab.x, grab.y),
        ));
        Some(index)
    }

    /// Feed a pointer move. Returns `true` when a drag consumed it.
    pub fn track(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        let Some(session) = self.active.as_mut() else {
            return false;
        };
        if session.pointer_id() != pointer_id {
            return false;
        }
        session.track(&mut self.surface, &self.registry, x, y)
    }

    /// Pointer-up. The session ends either way; `Some` carries a drop to
    /// dispatch once the caller holds no borrows of `self`.
    pub fn release(&mut self, pointer_id: i32, x: f64, y: f64) -> Option<Settled<S::Container>> {
        if self.active_pointer() != Some(pointer_id) {
            return None;
        }
        let session = self.active.take()?;
        session.settle(&mut self.surface, &self.registry, x, y)
    }

    /// Pointer-cancel for the active pointer.
    pub fn cancel(&mut self, pointer_id: i32) -> bool {
        if self.active_pointer() != Some(pointer_id) {
            return false;
        }
        self.abort()
    }

    /// Drop the session, whatever pointer owns it.
    pub fn abort(&mut self) -> bool {
        match self.active.take() {
            Some(session) => {
                session.cancel(&mut self.surface);
                true
            }
            None => false,
        }
    }
}
