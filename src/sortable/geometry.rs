//! Pure placement math for pointer sorting.
//!
//! Everything here works on viewport coordinates (`clientX`/`clientY`) and
//! plain rectangles, so it can be exercised without a DOM.

use std::cmp::Ordering;

/// Pointer travel (px) that turns an armed press into a drag.
pub const DRAG_START_DISTANCE: f64 = 6.0;

/// Overshoot (px) past a container's edges that still counts as "inside".
pub const CONTAINER_MARGIN: f64 = 24.0;

/// Band (px) at a container's trailing edge that snaps the placeholder to the tail.
pub const TRAILING_EDGE_ZONE: f64 = 18.0;

/// Inset (px) of the origin slot used to hold off grid reflow right after lift.
pub const ORIGIN_SLOT_INSET: f64 = 6.0;

/// Upper bound on one-slot placeholder moves per pointer event.
pub const MAX_REFLOW_STEPS: usize = 24;

const DEAD_ZONE_MIN: f64 = 8.0;
const DEAD_ZONE_MAX: f64 = 20.0;
const DEAD_ZONE_X_RATIO: f64 = 0.16;
const DEAD_ZONE_Y_RATIO: f64 = 0.18;

/// Reflow direction of a sortable container.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    /// Stacked rows.
    #[default]
    Vertical,
    /// Inline items (tabs).
    Horizontal,
    /// Free 2D reflow across wrapped rows.
    Grid,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Whether `(x, y)` lies inside the rect shrunk by `inset` on every side.
    pub fn contains_inset(&self, x: f64, y: f64, inset: f64) -> bool {
        x >= self.left + inset
            && x <= self.right() - inset
            && y >= self.top + inset
            && y <= self.bottom() - inset
    }
}

/// Horizontal and vertical dead-zone half widths for a target rect.
pub fn dead_zone(rect: &Rect) -> (f64, f64) {
    let x = (rect.width * DEAD_ZONE_X_RATIO).clamp(DEAD_ZONE_MIN, DEAD_ZONE_MAX);
    let y = (rect.height * DEAD_ZONE_Y_RATIO).clamp(DEAD_ZONE_MIN, DEAD_ZONE_MAX);
    (x, y)
}

/// Where the pointer sits relative to `rect` along `axis`.
///
/// `Less` means "before the target", `Greater` "after it", and `Equal` that the
/// pointer is inside the dead zone around the target's effective center. The
/// dead zone keeps the placeholder from oscillating when the pointer rests on a
/// boundary.
///
/// The grid axis tests rows first: the top band of the target reads as "row
/// above", the bottom band as "row below", and only the middle band falls back
/// to a left/right split around the horizontal center.
pub fn compare(axis: Axis, x: f64, y: f64, rect: &Rect) -> Ordering {
    let (dead_x, dead_y) = dead_zone(rect);
    let center_x = rect.center_x();
    let center_y = rect.center_y();

    match axis {
        Axis::Vertical => split(y, center_y - dead_y, center_y + dead_y),
        Axis::Horizontal => split(x, center_x - dead_x, center_x + dead_x),
        Axis::Grid => {
            if y < rect.top + dead_y {
                Ordering::Less
            } else if y > rect.bottom() - dead_y {
                Ordering::Greater
            } else {
                split(x, center_x - dead_x, center_x + dead_x)
            }
        }
    }
}

fn split(value: f64, low: f64, high: f64) -> Ordering {
    if value < low {
        Ordering::Less
    } else if value > high {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Whether the pointer is still over `container` for drop purposes, allowing
/// `margin` pixels of overshoot on every side.
pub fn within_container(x: f64, y: f64, container: &Rect, margin: f64) -> bool {
    x >= container.left - margin
        && x <= container.right() + margin
        && y >= container.top - margin
        && y <= container.bottom() + margin
}

/// Whether the pointer moved far enough from the press point to start a drag.
pub fn exceeds_drag_threshold(start: (f64, f64), now: (f64, f64)) -> bool {
    (now.0 - start.0).hypot(now.1 - start.1) >= DRAG_START_DISTANCE
}

/// Linear axes only: the dragged item's center is ahead of the first item's center.
pub fn leads_first_item(axis: Axis, x: f64, y: f64, first: &Rect) -> bool {
    match axis {
        Axis::Vertical => y < first.center_y(),
        Axis::Horizontal => x < first.center_x(),
        Axis::Grid => false,
    }
}

/// The dragged item's center is inside the trailing band of the container.
pub fn past_trailing_edge(axis: Axis, x: f64, y: f64, container: &Rect) -> bool {
    match axis {
        Axis::Horizontal => x > container.right() - TRAILING_EDGE_ZONE,
        Axis::Vertical | Axis::Grid => y > container.bottom() - TRAILING_EDGE_ZONE,
    }
}

/// Movement component that decides whether reflow steps forward or backward
/// first.
pub fn major_delta(axis: Axis, dx: f64, dy: f64) -> f64 {
    match axis {
        Axis::Vertical => dy,
        Axis::Horizontal => dx,
        Axis::Grid => {
            if dy.abs() >= dx.abs() {
                dy
            } else {
                dx
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn row() -> Rect {
        Rect::new(0.0, 100.0, 200.0, 40.0)
    }

    #[test]
    fn test_dead_zone_is_clamped() {
        assert_eq!(dead_zone(&Rect::new(0.0, 0.0, 10.0, 10.0)), (8.0, 8.0));
        assert_eq!(dead_zone(&Rect::new(0.0, 0.0, 1000.0, 1000.0)), (20.0, 20.0));
        let (x, y) = dead_zone(&Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!((x - 16.0).abs() < 1e-9);
        assert!((y - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_vertical_uses_center_band() {
        // center 120, dead zone 8
        assert_eq!(compare(Axis::Vertical, 50.0, 105.0, &row()), Ordering::Less);
        assert_eq!(compare(Axis::Vertical, 50.0, 118.0, &row()), Ordering::Equal);
        assert_eq!(compare(Axis::Vertical, 50.0, 135.0, &row()), Ordering::Greater);
        // x is irrelevant
        assert_eq!(compare(Axis::Vertical, -900.0, 135.0, &row()), Ordering::Greater);
    }

    #[test]
    fn test_compare_horizontal_ignores_y() {
        let tab = Rect::new(100.0, 0.0, 100.0, 30.0);
        assert_eq!(compare(Axis::Horizontal, 120.0, 500.0, &tab), Ordering::Less);
        assert_eq!(compare(Axis::Horizontal, 150.0, -10.0, &tab), Ordering::Equal);
        assert_eq!(compare(Axis::Horizontal, 190.0, 15.0, &tab), Ordering::Greater);
    }

    #[test]
    fn test_compare_grid_splits_rows_before_columns() {
        let cell = Rect::new(100.0, 100.0, 100.0, 100.0);
        // top band wins even on the right half
        assert_eq!(compare(Axis::Grid, 190.0, 105.0, &cell), Ordering::Less);
        // bottom band wins even on the left half
        assert_eq!(compare(Axis::Grid, 110.0, 195.0, &cell), Ordering::Greater);
        // middle band: left / dead / right
        assert_eq!(compare(Axis::Grid, 110.0, 150.0, &cell), Ordering::Less);
        assert_eq!(compare(Axis::Grid, 150.0, 150.0, &cell), Ordering::Equal);
        assert_eq!(compare(Axis::Grid, 190.0, 150.0, &cell), Ordering::Greater);
    }

    #[test]
    fn test_within_container_allows_margin() {
        let c = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(within_container(-20.0, 50.0, &c, CONTAINER_MARGIN));
        assert!(within_container(124.0, 124.0, &c, CONTAINER_MARGIN));
        assert!(!within_container(125.0, 50.0, &c, CONTAINER_MARGIN));
        assert!(!within_container(50.0, -30.0, &c, CONTAINER_MARGIN));
    }

    #[test]
    fn test_drag_threshold_is_euclidean() {
        assert!(!exceeds_drag_threshold((0.0, 0.0), (4.0, 4.0)));
        assert!(exceeds_drag_threshold((0.0, 0.0), (6.0, 0.0)));
        assert!(exceeds_drag_threshold((10.0, 10.0), (14.0, 15.0)));
    }

    #[test]
    fn test_trailing_edge_per_axis() {
        let c = Rect::new(0.0, 0.0, 300.0, 200.0);
        assert!(past_trailing_edge(Axis::Vertical, 0.0, 190.0, &c));
        assert!(!past_trailing_edge(Axis::Vertical, 299.0, 150.0, &c));
        assert!(past_trailing_edge(Axis::Horizontal, 290.0, 0.0, &c));
        assert!(past_trailing_edge(Axis::Grid, 0.0, 183.0, &c));
    }

    #[test]
    fn test_leads_first_item_only_on_linear_axes() {
        let first = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert!(leads_first_item(Axis::Vertical, 500.0, 10.0, &first));
        assert!(leads_first_item(Axis::Horizontal, 10.0, 500.0, &first));
        assert!(!leads_first_item(Axis::Grid, 0.0, 0.0, &first));
    }

    #[test]
    fn test_origin_slot_inset() {
        let slot = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(slot.contains_inset(50.0, 50.0, ORIGIN_SLOT_INSET));
        assert!(!slot.contains_inset(3.0, 50.0, ORIGIN_SLOT_INSET));
        assert!(!slot.contains_inset(50.0, 97.0, ORIGIN_SLOT_INSET));
    }

    #[test]
    fn test_major_delta_grid_prefers_dominant_component() {
        assert_eq!(major_delta(Axis::Grid, 3.0, -10.0), -10.0);
        assert_eq!(major_delta(Axis::Grid, -12.0, 4.0), -12.0);
        assert_eq!(major_delta(Axis::Vertical, 100.0, 1.0), 1.0);
    }

    #[test]
    fn test_axis_parses_config_strings() {
        assert_eq!(Axis::from_str("grid").ok(), Some(Axis::Grid));
        assert_eq!(Axis::Horizontal.to_string(), "horizontal");
        assert!(Axis::from_str("diagonal").is_err());
    }
}
