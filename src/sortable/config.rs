use super::geometry::Axis;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Persistence work returned by a reorder/move handler.
pub type PersistFuture = Pin<Box<dyn Future<Output = Result<(), String>>>>;

pub type ReorderHandler = Rc<dyn Fn(usize, usize) -> Option<PersistFuture>>;

pub type MoveHandler<C> = Rc<dyn Fn(usize, usize, &MoveContext<C>) -> Option<PersistFuture>>;

/// Called with the binding's user-facing message and the underlying cause.
pub type ErrorHandler = Rc<dyn Fn(&str, &str)>;

pub(crate) const DEFAULT_ERROR_MESSAGE: &str = "Failed to reorder items.";

/// Source and destination of a cross-container move.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveContext<C> {
    pub from_container: C,
    pub to_container: C,
}

/// Declarative binding of one sortable container.
pub struct SortableConfig<C> {
    pub item_selector: String,
    pub handle_selector: String,
    pub axis: Axis,
    /// Element that must stay after every item (e.g. an "add" slot).
    pub end_before_selector: Option<String>,
    /// Sibling containers that may receive items dragged out of this one.
    pub cross_container_selector: Option<String>,
    pub error_message: String,
    pub on_reorder: Option<ReorderHandler>,
    pub on_move_between: Option<MoveHandler<C>>,
    pub on_error: Option<ErrorHandler>,
}

impl<C> SortableConfig<C> {
    pub fn new(item_selector: impl Into<String>, handle_selector: impl Into<String>) -> Self {
        Self {
            item_selector: item_selector.into(),
            handle_selector: handle_selector.into(),
            axis: Axis::default(),
            end_before_selector: None,
            cross_container_selector: None,
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            on_reorder: None,
            on_move_between: None,
            on_error: None,
        }
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn end_before(mut self, selector: impl Into<String>) -> Self {
        self.end_before_selector = Some(selector.into());
        self
    }

    pub fn cross_container(mut self, selector: impl Into<String>) -> Self {
        self.cross_container_selector = Some(selector.into());
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub fn on_reorder(
        mut self,
        handler: impl Fn(usize, usize) -> Option<PersistFuture> + 'static,
    ) -> Self {
        self.on_reorder = Some(Rc::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl Fn(&str, &str) + 'static) -> Self {
        self.on_error = Some(Rc::new(handler));
        self
    }

    pub fn allows_cross_container(&self) -> bool {
        self.cross_container_selector.is_some()
    }

    /// Cross-container moves require both ends to agree on what an item and a
    /// handle are.
    pub fn shares_selectors(&self, other: &SortableConfig<C>) -> bool {
        self.item_selector == other.item_selector && self.handle_selector == other.handle_selector
    }

    pub(crate) fn end_anchor(&self) -> Option<&str> {
        self.end_before_selector.as_deref()
    }
}

impl<C: 'static> SortableConfig<C> {
    pub fn on_move_between(
        mut self,
        handler: impl Fn(usize, usize, &MoveContext<C>) -> Option<PersistFuture> + 'static,
    ) -> Self {
        self.on_move_between = Some(Rc::new(handler));
        self
    }
}

impl<C> Clone for SortableConfig<C> {
    fn clone(&self) -> Self {
        Self {
            item_selector: self.item_selector.clone(),
            handle_selector: self.handle_selector.clone(),
            axis: self.axis,
            end_before_selector: self.end_before_selector.clone(),
            cross_container_selector: self.cross_container_selector.clone(),
            error_message: self.error_message.clone(),
            on_reorder: self.on_reorder.clone(),
            on_move_between: self.on_move_between.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<C> fmt::Debug for SortableConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortableConfig")
            .field("item_selector", &self.item_selector)
            .field("handle_selector", &self.handle_selector)
            .field("axis", &self.axis)
            .field("end_before_selector", &self.end_before_selector)
            .field("cross_container_selector", &self.cross_container_selector)
            .field("error_message", &self.error_message)
            .field("on_reorder", &self.on_reorder.is_some())
            .field("on_move_between", &self.on_move_between.is_some())
            .finish()
    }
}
