//! One pointer-driven reorder gesture, from press to settle.

use super::config::{MoveContext, PersistFuture, SortableConfig};
use super::geometry::{self, Axis, Rect};
use super::registry::Registry;
use super::surface::SortSurface;
use std::cmp::Ordering;
use std::future;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    /// Pressed on a handle; not moved far enough to count as a drag.
    Armed,
    /// Placeholder inserted, item floating.
    Dragging,
}

/// What a settled drag changed.
#[derive(Clone, Debug, PartialEq)]
pub enum DropOutcome<C> {
    Unchanged,
    Reordered {
        from: usize,
        to: usize,
    },
    Moved {
        from: usize,
        to: usize,
        context: MoveContext<C>,
    },
}

/// Result of pointer-up on an active drag. Handlers run in [`Settled::dispatch`],
/// after the engine has released every borrow.
pub struct Settled<C> {
    pub outcome: DropOutcome<C>,
    config: Rc<SortableConfig<C>>,
}

impl<C: 'static> Settled<C> {
    /// Invoke the binding's handler for the outcome.
    ///
    /// Nothing runs for [`DropOutcome::Unchanged`]. A changed outcome with no
    /// handler yields a failed future so the error path re-renders.
    pub fn dispatch(&self) -> Option<PersistFuture> {
        match &self.outcome {
            DropOutcome::Unchanged => None,
            DropOutcome::Reordered { from, to } => match &self.config.on_reorder {
                Some(handler) => handler(*from, *to),
                None => Some(missing("reorder")),
            },
            DropOutcome::Moved { from, to, context } => match &self.config.on_move_between {
                Some(handler) => handler(*from, *to, context),
                None => Some(missing("move")),
            },
        }
    }

    pub fn error_message(&self) -> &str {
        &self.config.error_message
    }

    /// Hand a persistence failure to the binding's error hook.
    pub fn report(&self, cause: &str) {
        if let Some(handler) = &self.config.on_error {
            handler(&self.config.error_message, cause);
        }
    }
}

fn missing(kind: &str) -> PersistFuture {
    let cause = format!("no {kind} handler bound");
    Box::pin(future::ready(Err(cause)))
}

pub struct DragSession<C, I> {
    pointer_id: i32,
    origin: C,
    container: C,
    item: I,
    config: Rc<SortableConfig<C>>,
    from_index: usize,
    start: (f64, f64),
    phase: DragPhase,
    /// Pointer position inside the item at lift time.
    grab_offset: (f64, f64),
    /// Item center relative to the pointer; placement is measured from there.
    center_offset: (f64, f64),
    /// In-flow items ahead of the placeholder. The lifted item is out of flow,
    /// so this is already the post-removal index.
    slot: usize,
    origin_slot: Option<Rect>,
    origin_slot_exited: bool,
    skip_next_reflow: bool,
    last_pointer: (f64, f64),
}

impl<C, I> DragSession<C, I>
where
    C: Clone + PartialEq + std::fmt::Debug + 'static,
    I: Clone + PartialEq + std::fmt::Debug,
{
    pub(crate) fn arm(
        pointer_id: i32,
        container: C,
        item: I,
        config: Rc<SortableConfig<C>>,
        from_index: usize,
        start: (f64, f64),
    ) -> Self {
        Self {
            pointer_id,
            origin: container.clone(),
            container,
            item,
            config,
            from_index,
            start,
            phase: DragPhase::Armed,
            grab_offset: (0.0, 0.0),
            center_offset: (0.0, 0.0),
            slot: from_index,
            origin_slot: None,
            origin_slot_exited: false,
            skip_next_reflow: false,
            last_pointer: start,
        }
    }

    pub fn pointer_id(&self) -> i32 {
        self.pointer_id
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn from_index(&self) -> usize {
        self.from_index
    }

    pub fn origin(&self) -> &C {
        &self.origin
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn item(&self) -> &I {
        &self.item
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    fn axis(&self) -> Axis {
        self.config.axis
    }

    /// Handle a pointer move. Returns `true` when the move belongs to an active
    /// drag (the caller should suppress the browser default).
    pub(crate) fn track<S>(
        &mut self,
        surface: &mut S,
        registry: &Registry<C>,
        x: f64,
        y: f64,
    ) -> bool
    where
        S: SortSurface<Container = C, Item = I>,
    {
        if self.phase == DragPhase::Armed {
            if !geometry::exceeds_drag_threshold(self.start, (x, y)) {
                return false;
            }
            self.start_drag(surface, x, y);
        }

        surface.move_floating(&self.item, x - self.grab_offset.0, y - self.grab_offset.1);

        if self.skip_next_reflow {
            self.skip_next_reflow = false;
            return true;
        }

        if self.axis() == Axis::Grid && !self.origin_slot_exited {
            if let Some(slot) = self.origin_slot {
                let (px, py) = self.center(x, y);
                if slot.contains_inset(px, py, geometry::ORIGIN_SLOT_INSET) {
                    return true;
                }
            }
            self.origin_slot_exited = true;
        }

        self.reflow(surface, registry, x, y);
        true
    }

    fn start_drag<S>(&mut self, surface: &mut S, x: f64, y: f64)
    where
        S: SortSurface<Container = C, Item = I>,
    {
        let rect = surface.item_rect(&self.item);
        self.grab_offset = (x - rect.left, y - rect.top);
        self.center_offset = (
            rect.width / 2.0 - self.grab_offset.0,
            rect.height / 2.0 - self.grab_offset.1,
        );
        self.origin_slot = Some(surface.lift(&self.item, rect, self.axis()));
        self.phase = DragPhase::Dragging;
        self.skip_next_reflow = true;
        self.last_pointer = (x, y);
        log::debug!(
            "sortable: drag started at index {} ({} axis)",
            self.from_index,
            self.axis()
        );
    }

    fn center(&self, x: f64, y: f64) -> (f64, f64) {
        (x + self.center_offset.0, y + self.center_offset.1)
    }

    fn set_slot<S>(&mut self, surface: &mut S, slot: usize)
    where
        S: SortSurface<Container = C, Item = I>,
    {
        self.slot = slot;
        surface.place_placeholder(
            &self.container,
            slot,
            &self.config.item_selector,
            self.config.end_anchor(),
        );
    }

    fn cross_container_target<S>(
        &self,
        surface: &S,
        registry: &Registry<C>,
        px: f64,
        py: f64,
    ) -> Option<C>
    where
        S: SortSurface<Container = C, Item = I>,
    {
        let selector = self.config.cross_container_selector.as_deref()?;
        surface
            .containers_at(px, py, selector)
            .into_iter()
            .find(|c| registry.accepts(c, &self.config))
    }

    /// Recompute where the placeholder belongs for the pointer at `(x, y)`.
    pub(crate) fn reflow<S>(&mut self, surface: &mut S, registry: &Registry<C>, x: f64, y: f64)
    where
        S: SortSurface<Container = C, Item = I>,
    {
        if self.phase != DragPhase::Dragging {
            return;
        }

        let (px, py) = self.center(x, y);
        let selector = self.config.item_selector.clone();

        if let Some(target) = self.cross_container_target(surface, registry, px, py) {
            if target != self.container {
                log::debug!("sortable: placeholder crossed into {target:?}");
                self.container = target;
                let tail = surface.items(&self.container, &selector).len();
                self.set_slot(surface, tail);
            }
        }

        let (dx, dy) = (x - self.last_pointer.0, y - self.last_pointer.1);
        self.last_pointer = (x, y);

        let axis = self.axis();
        let bounds = surface.container_rect(&self.container);
        if !geometry::within_container(px, py, &bounds, geometry::CONTAINER_MARGIN) {
            return;
        }

        let items = surface.items(&self.container, &selector);
        let Some(first) = items.first() else {
            self.set_slot(surface, 0);
            return;
        };

        if geometry::leads_first_item(axis, px, py, &surface.item_rect(first)) {
            if self.slot != 0 {
                self.set_slot(surface, 0);
            }
            return;
        }

        if geometry::past_trailing_edge(axis, px, py, &bounds) {
            self.set_slot(surface, items.len());
            return;
        }

        let forward_first = geometry::major_delta(axis, dx, dy) >= 0.0;
        for _ in 0..geometry::MAX_REFLOW_STEPS {
            let moved = if forward_first {
                self.step(surface, &items, px, py, true) || self.step(surface, &items, px, py, false)
            } else {
                self.step(surface, &items, px, py, false) || self.step(surface, &items, px, py, true)
            };
            if !moved {
                break;
            }
        }
    }

    /// Try to move the placeholder one slot past its next (or previous) neighbor.
    fn step<S>(&mut self, surface: &mut S, items: &[I], px: f64, py: f64, forward: bool) -> bool
    where
        S: SortSurface<Container = C, Item = I>,
    {
        let axis = self.axis();
        if forward {
            let Some(next) = items.get(self.slot) else {
                return false;
            };
            if geometry::compare(axis, px, py, &surface.item_rect(next)) == Ordering::Greater {
                self.set_slot(surface, self.slot + 1);
                return true;
            }
        } else {
            let Some(prev) = self.slot.checked_sub(1).and_then(|i| items.get(i)) else {
                return false;
            };
            if geometry::compare(axis, px, py, &surface.item_rect(prev)) == Ordering::Less {
                self.set_slot(surface, self.slot - 1);
                return true;
            }
        }
        false
    }

    /// Pointer-up: place once more, put the item back in flow and report what
    /// changed. The surface is fully cleaned up afterwards.
    pub(crate) fn settle<S>(
        mut self,
        surface: &mut S,
        registry: &Registry<C>,
        x: f64,
        y: f64,
    ) -> Option<Settled<C>>
    where
        S: SortSurface<Container = C, Item = I>,
    {
        if self.phase != DragPhase::Dragging {
            surface.tear_down(&self.item);
            return None;
        }

        self.reflow(surface, registry, x, y);
        surface.drop_at_placeholder(&self.item);
        surface.tear_down(&self.item);

        let to = self.slot;
        let outcome = if self.container != self.origin {
            DropOutcome::Moved {
                from: self.from_index,
                to,
                context: MoveContext {
                    from_container: self.origin.clone(),
                    to_container: self.container.clone(),
                },
            }
        } else if to != self.from_index {
            DropOutcome::Reordered {
                from: self.from_index,
                to,
            }
        } else {
            DropOutcome::Unchanged
        };
        log::debug!("sortable: settled {outcome:?}");

        Some(Settled {
            outcome,
            config: self.config,
        })
    }

    /// Pointer-cancel or explicit abort: the item goes back to its origin slot,
    /// no handler runs.
    pub(crate) fn cancel<S>(self, surface: &mut S)
    where
        S: SortSurface<Container = C, Item = I>,
    {
        if self.phase == DragPhase::Dragging {
            surface.place_placeholder(
                &self.origin,
                self.from_index,
                &self.config.item_selector,
                self.config.end_anchor(),
            );
            surface.drop_at_placeholder(&self.item);
        }
        surface.tear_down(&self.item);
        log::debug!("sortable: drag cancelled");
    }
}
