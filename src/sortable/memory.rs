//! Laid-out lanes of fixed-size cells that stand in for the DOM in tests.

use super::geometry::{Axis, Rect};
use super::surface::SortSurface;

#[derive(Clone, Debug, PartialEq)]
enum Slot {
    Item(&'static str),
    Placeholder,
    Anchor,
}

pub struct Lane {
    id: &'static str,
    origin: (f64, f64),
    columns: usize,
    cell: (f64, f64),
    slots: Vec<Slot>,
    live: bool,
}

impl Lane {
    fn new(id: &'static str, origin: (f64, f64), columns: usize, cell: (f64, f64), items: &[&'static str]) -> Self {
        Self {
            id,
            origin,
            columns,
            cell,
            slots: items.iter().map(|i| Slot::Item(*i)).collect(),
            live: true,
        }
    }

    pub fn column(id: &'static str, origin: (f64, f64), cell: (f64, f64), items: &[&'static str]) -> Self {
        Self::new(id, origin, 1, cell, items)
    }

    pub fn row(id: &'static str, origin: (f64, f64), cell: (f64, f64), items: &[&'static str]) -> Self {
        Self::new(id, origin, usize::MAX, cell, items)
    }

    pub fn grid(
        id: &'static str,
        origin: (f64, f64),
        columns: usize,
        cell: (f64, f64),
        items: &[&'static str],
    ) -> Self {
        Self::new(id, origin, columns, cell, items)
    }

    /// Trailing element every item must stay ahead of.
    pub fn with_anchor(mut self) -> Self {
        self.slots.push(Slot::Anchor);
        self
    }

    fn cell_rect(&self, k: usize) -> Rect {
        let (col, row) = (k % self.columns, k / self.columns);
        Rect::new(
            self.origin.0 + col as f64 * self.cell.0,
            self.origin.1 + row as f64 * self.cell.1,
            self.cell.0,
            self.cell.1,
        )
    }
}

#[derive(Default)]
pub struct MemorySurface {
    lanes: Vec<Lane>,
    lifted: Option<&'static str>,
    floating: Option<(f64, f64)>,
}

impl MemorySurface {
    pub fn new(lanes: Vec<Lane>) -> Self {
        Self {
            lanes,
            ..Self::default()
        }
    }

    fn lane(&self, id: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == id)
    }

    fn in_flow(&self, slot: &Slot) -> bool {
        match slot {
            Slot::Item(name) => self.lifted != Some(*name),
            Slot::Placeholder | Slot::Anchor => true,
        }
    }

    /// Item names of a lane in document order, placeholder excluded.
    pub fn order(&self, id: &str) -> Vec<&'static str> {
        self.lane(id)
            .map(|l| {
                l.slots
                    .iter()
                    .filter_map(|s| match s {
                        Slot::Item(name) => Some(*name),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// No placeholder anywhere and nothing floating.
    pub fn is_clean(&self) -> bool {
        self.lifted.is_none()
            && self.floating.is_none()
            && self.lanes.iter().all(|l| !l.slots.contains(&Slot::Placeholder))
    }

    /// The lane's last slot is its anchor.
    pub fn anchored(&self, id: &str) -> bool {
        self.lane(id).is_some_and(|l| l.slots.last() == Some(&Slot::Anchor))
    }

    pub fn detach(&mut self, id: &str) {
        if let Some(lane) = self.lanes.iter_mut().find(|l| l.id == id) {
            lane.live = false;
        }
    }

    fn remove_placeholder(&mut self) {
        for lane in &mut self.lanes {
            lane.slots.retain(|s| *s != Slot::Placeholder);
        }
    }

    fn flow_count(&self, lane: &Lane) -> usize {
        lane.slots.iter().filter(|s| self.in_flow(s)).count()
    }
}

impl SortSurface for MemorySurface {
    type Container = &'static str;
    type Item = &'static str;

    fn items(&self, container: &&'static str, _item_selector: &str) -> Vec<&'static str> {
        self.order(container)
            .into_iter()
            .filter(|name| self.lifted != Some(*name))
            .collect()
    }

    fn container_rect(&self, container: &&'static str) -> Rect {
        let Some(lane) = self.lane(container) else {
            return Rect::default();
        };
        let n = self.flow_count(lane).max(1);
        let columns = lane.columns.min(n);
        let rows = n.div_ceil(lane.columns);
        Rect::new(
            lane.origin.0,
            lane.origin.1,
            columns as f64 * lane.cell.0,
            rows as f64 * lane.cell.1,
        )
    }

    fn item_rect(&self, item: &&'static str) -> Rect {
        for lane in &self.lanes {
            let mut k = 0;
            for slot in &lane.slots {
                if !self.in_flow(slot) {
                    continue;
                }
                if *slot == Slot::Item(*item) {
                    return lane.cell_rect(k);
                }
                k += 1;
            }
        }
        Rect::default()
    }

    fn containers_at(&self, x: f64, y: f64, _selector: &str) -> Vec<&'static str> {
        self.lanes
            .iter()
            .filter(|l| {
                let r = self.container_rect(&l.id);
                x >= r.left && x <= r.right() && y >= r.top && y <= r.bottom()
            })
            .map(|l| l.id)
            .collect()
    }

    fn is_live(&self, container: &&'static str) -> bool {
        self.lane(container).is_some_and(|l| l.live)
    }

    fn lift(&mut self, item: &&'static str, rect: Rect, _axis: Axis) -> Rect {
        for lane in &mut self.lanes {
            if let Some(at) = lane.slots.iter().position(|s| *s == Slot::Item(*item)) {
                lane.slots.insert(at, Slot::Placeholder);
                break;
            }
        }
        self.lifted = Some(*item);
        self.floating = Some((rect.left, rect.top));
        rect
    }

    fn place_placeholder(
        &mut self,
        container: &&'static str,
        slot: usize,
        _item_selector: &str,
        _end_before_selector: Option<&str>,
    ) {
        self.remove_placeholder();
        let lifted = self.lifted;
        let Some(lane) = self.lanes.iter_mut().find(|l| l.id == *container) else {
            return;
        };
        let at = lane
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, Slot::Item(name) if lifted != Some(*name)))
            .nth(slot)
            .map(|(i, _)| i)
            .or_else(|| lane.slots.iter().position(|s| *s == Slot::Anchor))
            .unwrap_or(lane.slots.len());
        lane.slots.insert(at, Slot::Placeholder);
    }

    fn move_floating(&mut self, _item: &&'static str, left: f64, top: f64) {
        if self.floating.is_some() {
            self.floating = Some((left, top));
        }
    }

    fn drop_at_placeholder(&mut self, item: &&'static str) {
        for lane in &mut self.lanes {
            lane.slots.retain(|s| *s != Slot::Item(*item));
        }
        for lane in &mut self.lanes {
            if let Some(at) = lane.slots.iter().position(|s| *s == Slot::Placeholder) {
                lane.slots[at] = Slot::Item(*item);
                break;
            }
        }
        self.lifted = None;
    }

    fn tear_down(&mut self, _item: &&'static str) {
        self.remove_placeholder();
        self.lifted = None;
        self.floating = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_stays_last() {
        let mut m = MemorySurface::new(vec![Lane::column("l", (0.0, 0.0), (10.0, 10.0), &["a", "b"]).with_anchor()]);
        let rect = m.item_rect(&"a");
        m.lift(&"a", rect, Axis::Vertical);
        m.place_placeholder(&"l", 5, "", Some("[data-add]"));
        m.drop_at_placeholder(&"a");
        m.tear_down(&"a");
        assert_eq!(m.order("l"), vec!["b", "a"]);
        assert_eq!(m.lanes[0].slots.last(), Some(&Slot::Anchor));
    }
}
