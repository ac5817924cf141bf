use super::geometry::{Axis, Rect};
use std::fmt::Debug;

/// The visual side of pointer sorting.
///
/// A drag session only reasons about slot indices and rectangles; everything
/// that touches real nodes (placeholder creation, floating the dragged item,
/// reinserting it) goes through this trait. The browser implementation lives in
/// [`super::dom`]; tests drive the same state machine over an in-memory layout.
///
/// Slot indices count in-flow items only: neither the placeholder nor the
/// lifted item take part.
pub trait SortSurface {
    type Container: Clone + PartialEq + Debug;
    type Item: Clone + PartialEq + Debug;

    /// In-flow items of `container` matching `item_selector`, in order.
    fn items(&self, container: &Self::Container, item_selector: &str) -> Vec<Self::Item>;

    fn container_rect(&self, container: &Self::Container) -> Rect;

    fn item_rect(&self, item: &Self::Item) -> Rect;

    /// Containers matching `selector` under the viewport point, innermost first.
    fn containers_at(&self, x: f64, y: f64, selector: &str) -> Vec<Self::Container>;

    /// Whether the container is still part of the rendered tree.
    fn is_live(&self, _container: &Self::Container) -> bool {
        true
    }

    /// Put a placeholder in `item`'s slot and float `item` above the page.
    ///
    /// `rect` is the item's box before lifting. Returns the placeholder's box.
    fn lift(&mut self, item: &Self::Item, rect: Rect, axis: Axis) -> Rect;

    /// Move the placeholder into `container` so that `slot` in-flow items
    /// precede it. A slot at or past the end lands before the end anchor.
    fn place_placeholder(
        &mut self,
        container: &Self::Container,
        slot: usize,
        item_selector: &str,
        end_before_selector: Option<&str>,
    );

    /// Position the floating item's top-left corner in viewport coordinates.
    fn move_floating(&mut self, item: &Self::Item, left: f64, top: f64);

    /// Reinsert the floating item where the placeholder currently is.
    fn drop_at_placeholder(&mut self, item: &Self::Item);

    /// Remove the placeholder and every floating style. Must be safe to call
    /// even when `lift` never happened.
    fn tear_down(&mut self, item: &Self::Item);
}
