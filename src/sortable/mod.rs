//! Pointer-driven drag-and-drop reordering.
//!
//! The logical core (`geometry`, `session`, `registry`, `binder`) only sees
//! rectangles and slot indices through [`SortSurface`]; [`dom`] is the
//! browser implementation and owns the pointer listeners.

mod binder;
mod commit;
mod config;
pub mod dom;
mod geometry;
#[cfg(test)]
mod memory;
mod registry;
mod session;
mod surface;

pub use binder::{Grab, Sortables};
pub use commit::{move_between, move_item, pair_mut, CommitError};
pub use config::{
    ErrorHandler, MoveContext, MoveHandler, PersistFuture, ReorderHandler, SortableConfig,
};
pub use dom::{bind_sortable, cancel_active_drag, DomSurface};
pub use geometry::{compare, within_container, Axis, Rect};
pub use registry::{BindOutcome, Registry};
pub use session::{DragPhase, DropOutcome, Settled};
pub use surface::SortSurface;
