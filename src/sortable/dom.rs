//! Browser driver: a [`SortSurface`] over real nodes plus the pointer
//! listeners that feed the engine.

use super::binder::{Grab, Sortables};
use super::config::SortableConfig;
use super::geometry::{Axis, Rect};
use super::registry::BindOutcome;
use super::session::{DragPhase, Settled};
use super::surface::SortSurface;
use leptos::task::spawn_local;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Node, PointerEvent};

pub const PLACEHOLDER_CLASS: &str = "sortable-placeholder";
pub const FLOATING_CLASS: &str = "sortable-floating";
pub const ACTIVE_BODY_CLASS: &str = "sorting-active";

fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|w| w.document())
}

fn rect_of(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

fn as_node(el: &Element) -> &Node {
    el
}

fn set_styles(el: &Element, props: &[(&str, String)]) {
    let Some(el) = el.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = el.style();
    for (name, value) in props {
        let _ = style.set_property(name, value);
    }
}

struct Lifted {
    placeholder: Element,
    original_style: Option<String>,
}

/// DOM side of a drag: placeholder clone, floating item, body class.
#[derive(Default)]
pub struct DomSurface {
    lifted: Option<Lifted>,
}

impl DomSurface {
    fn end_reference(container: &Element, selector: Option<&str>) -> Option<Element> {
        let found = container.query_selector(selector?).ok().flatten()?;
        let parent = found.parent_element()?;
        (parent == *container).then_some(found)
    }
}

impl SortSurface for DomSurface {
    type Container = Element;
    type Item = Element;

    fn items(&self, container: &Element, item_selector: &str) -> Vec<Element> {
        let children = container.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .filter(|el| el.matches(item_selector).unwrap_or(false))
            .filter(|el| {
                let classes = el.class_list();
                !classes.contains(PLACEHOLDER_CLASS) && !classes.contains(FLOATING_CLASS)
            })
            .collect()
    }

    fn container_rect(&self, container: &Element) -> Rect {
        rect_of(container)
    }

    fn item_rect(&self, item: &Element) -> Rect {
        rect_of(item)
    }

    fn containers_at(&self, x: f64, y: f64, selector: &str) -> Vec<Element> {
        let Some(doc) = document() else {
            return vec![];
        };
        let mut found: Vec<Element> = vec![];
        for node in doc.elements_from_point(x as f32, y as f32).iter() {
            let Ok(el) = node.dyn_into::<Element>() else {
                continue;
            };
            if let Ok(Some(container)) = el.closest(selector) {
                if !found.contains(&container) {
                    found.push(container);
                }
            }
        }
        found
    }

    fn is_live(&self, container: &Element) -> bool {
        container.is_connected()
    }

    fn lift(&mut self, item: &Element, rect: Rect, axis: Axis) -> Rect {
        let Some(placeholder) = item
            .clone_node_with_deep(true)
            .ok()
            .and_then(|n| n.dyn_into::<Element>().ok())
        else {
            return rect;
        };
        let width = format!("{}px", rect.width.ceil());
        let height = format!("{}px", rect.height.ceil());

        placeholder.set_class_name(format!("{} {PLACEHOLDER_CLASS}", item.class_name()).trim());
        let _ = placeholder.remove_attribute("id");
        let _ = placeholder.set_attribute("aria-hidden", "true");
        if axis == Axis::Grid {
            set_styles(&placeholder, &[("min-height", height.clone())]);
        } else {
            set_styles(
                &placeholder,
                &[
                    ("width", width.clone()),
                    ("height", height.clone()),
                    ("margin", "0".to_string()),
                ],
            );
        }

        if let Some(parent) = item.parent_node() {
            let _ = parent.insert_before(&placeholder, Some(as_node(item)));
        }
        let placeholder_rect = rect_of(&placeholder);

        let original_style = item.get_attribute("style");
        let _ = item.class_list().add_1(FLOATING_CLASS);
        set_styles(
            item,
            &[
                ("position", "fixed".to_string()),
                ("left", "0".to_string()),
                ("top", "0".to_string()),
                ("margin", "0".to_string()),
                ("width", width),
                ("height", height),
                ("z-index", "9999".to_string()),
                ("pointer-events", "none".to_string()),
            ],
        );
        if let Some(body) = document().and_then(|d| d.body()) {
            let _ = body.append_child(item);
            let _ = body.class_list().add_1(ACTIVE_BODY_CLASS);
        }

        self.lifted = Some(Lifted {
            placeholder,
            original_style,
        });
        placeholder_rect
    }

    fn place_placeholder(
        &mut self,
        container: &Element,
        slot: usize,
        item_selector: &str,
        end_before_selector: Option<&str>,
    ) {
        let Some(lifted) = &self.lifted else {
            return;
        };
        let placeholder = &lifted.placeholder;
        let items = self.items(container, item_selector);
        let reference = match items.get(slot) {
            Some(item) => Some(item.clone()),
            None => Self::end_reference(container, end_before_selector),
        };

        let in_container = placeholder.parent_element().as_ref() == Some(container);
        if in_container && placeholder.next_element_sibling() == reference {
            return;
        }
        let _ = container.insert_before(placeholder, reference.as_ref().map(as_node));
    }

    fn move_floating(&mut self, item: &Element, left: f64, top: f64) {
        if self.lifted.is_none() {
            return;
        }
        set_styles(
            item,
            &[(
                "transform",
                format!("translate({}px, {}px)", left.round(), top.round()),
            )],
        );
    }

    fn drop_at_placeholder(&mut self, item: &Element) {
        let Some(lifted) = &self.lifted else {
            return;
        };
        if let Some(parent) = lifted.placeholder.parent_node() {
            let _ = parent.insert_before(item, Some(as_node(&lifted.placeholder)));
        }
    }

    fn tear_down(&mut self, item: &Element) {
        let Some(lifted) = self.lifted.take() else {
            return;
        };
        lifted.placeholder.remove();
        let _ = item.class_list().remove_1(FLOATING_CLASS);
        let _ = match &lifted.original_style {
            Some(style) => item.set_attribute("style", style),
            None => item.remove_attribute("style"),
        };
        if let Some(body) = document().and_then(|d| d.body()) {
            let _ = body.class_list().remove_1(ACTIVE_BODY_CLASS);
        }
    }
}

type PointerClosure = Closure<dyn FnMut(PointerEvent)>;

/// `pointermove`/`pointerup`/`pointercancel` on the window for one session.
struct WindowListeners {
    on_move: PointerClosure,
    on_up: PointerClosure,
    on_cancel: PointerClosure,
}

impl WindowListeners {
    fn attach(driver: Weak<RefCell<Driver>>) -> Self {
        let weak = driver.clone();
        let on_move: PointerClosure = Closure::new(move |ev: PointerEvent| handle_move(&weak, &ev));
        let weak = driver.clone();
        let on_up: PointerClosure = Closure::new(move |ev: PointerEvent| handle_up(&weak, &ev));
        let on_cancel: PointerClosure =
            Closure::new(move |ev: PointerEvent| handle_cancel(&driver, &ev));

        let listeners = Self {
            on_move,
            on_up,
            on_cancel,
        };
        if let Some(window) = web_sys::window() {
            for (name, cb) in listeners.each() {
                let _ = window.add_event_listener_with_callback_and_bool(
                    name,
                    cb.as_ref().unchecked_ref(),
                    true,
                );
            }
        }
        listeners
    }

    fn each(&self) -> [(&'static str, &PointerClosure); 3] {
        [
            ("pointermove", &self.on_move),
            ("pointerup", &self.on_up),
            ("pointercancel", &self.on_cancel),
        ]
    }

    fn detach(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for (name, cb) in self.each() {
            let _ = window.remove_event_listener_with_callback_and_bool(
                name,
                cb.as_ref().unchecked_ref(),
                true,
            );
        }
    }
}

impl Drop for WindowListeners {
    fn drop(&mut self) {
        self.detach();
    }
}

struct PressListener {
    container: Element,
    callback: PointerClosure,
}

impl Drop for PressListener {
    fn drop(&mut self) {
        let _ = self.container.remove_event_listener_with_callback_and_bool(
            "pointerdown",
            self.callback.as_ref().unchecked_ref(),
            true,
        );
    }
}

struct Driver {
    engine: Sortables<DomSurface>,
    presses: Vec<PressListener>,
    window: Option<WindowListeners>,
    /// Listeners of the session that just ended. A closure cannot be freed
    /// while it runs, so these are dropped on the next press.
    retired: Option<WindowListeners>,
    /// Handle holding pointer capture for the active pointer.
    capture: Option<(Element, i32)>,
}

impl Driver {
    fn new() -> Self {
        Self {
            engine: Sortables::new(DomSurface::default()),
            presses: vec![],
            window: None,
            retired: None,
            capture: None,
        }
    }

    fn finish(&mut self) {
        if let Some((handle, pointer_id)) = self.capture.take() {
            if handle.has_pointer_capture(pointer_id) {
                let _ = handle.release_pointer_capture(pointer_id);
            }
        }
        if let Some(listeners) = self.window.take() {
            listeners.detach();
            self.retired = Some(listeners);
        }
    }

    /// Unbind containers that left the document. A session whose origin went
    /// with them is aborted and its capture and window listeners released.
    fn prune_detached(&mut self) {
        let was_active = self.engine.phase() != DragPhase::Idle;
        let removed = self.engine.prune();
        if removed.is_empty() {
            return;
        }
        self.presses.retain(|p| !removed.contains(&p.container));
        log::debug!("sortable: pruned {} detached container(s)", removed.len());
        if was_active && self.engine.phase() == DragPhase::Idle {
            log::debug!("sortable: drag aborted, its container was removed");
            self.finish();
        }
    }
}

thread_local! {
    static DRIVER: Rc<RefCell<Driver>> = Rc::new(RefCell::new(Driver::new()));
}

/// Make `container`'s items draggable by their handles, or update the
/// configuration of an already bound container.
///
/// Containers that left the document since the last call are unbound first.
pub fn bind_sortable(container: &Element, config: SortableConfig<Element>) {
    DRIVER.with(|driver| {
        let mut d = driver.borrow_mut();
        d.prune_detached();
        if d.engine.bind(container.clone(), config) == BindOutcome::Attached {
            let weak = Rc::downgrade(driver);
            let target = container.clone();
            let callback: PointerClosure =
                Closure::new(move |ev: PointerEvent| handle_press(&weak, &target, &ev));
            let _ = container.add_event_listener_with_callback_and_bool(
                "pointerdown",
                callback.as_ref().unchecked_ref(),
                true,
            );
            d.presses.push(PressListener {
                container: container.clone(),
                callback,
            });
        }
    });
}

/// Cancel whatever drag is in progress, restoring the item to its origin.
pub fn cancel_active_drag() {
    DRIVER.with(|driver| {
        let mut d = driver.borrow_mut();
        if d.engine.abort() {
            d.finish();
        }
    });
}

pub fn drag_phase() -> DragPhase {
    DRIVER.with(|driver| driver.borrow().engine.phase())
}

fn client_point(ev: &PointerEvent) -> (f64, f64) {
    (f64::from(ev.client_x()), f64::from(ev.client_y()))
}

fn handle_press(driver: &Weak<RefCell<Driver>>, container: &Element, ev: &PointerEvent) {
    let Some(driver) = driver.upgrade() else {
        return;
    };
    let mut d = driver.borrow_mut();
    if d.engine.phase() != DragPhase::Idle {
        return;
    }
    let Some(config) = d.engine.config(container) else {
        return;
    };
    let Some(handle) = ev
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|t| t.closest(&config.handle_selector).ok().flatten())
        .filter(|h| container.contains(Some(as_node(h))))
    else {
        return;
    };
    let Some(item) = handle
        .closest(&config.item_selector)
        .ok()
        .flatten()
        .filter(|i| container.contains(Some(as_node(i))))
    else {
        return;
    };

    let (x, y) = client_point(ev);
    let grab = Grab {
        container: container.clone(),
        item,
        pointer_id: ev.pointer_id(),
        x,
        y,
        primary: ev.pointer_type() != "mouse" || ev.button() == 0,
    };
    if d.engine.arm(grab).is_none() {
        return;
    }
    ev.prevent_default();
    ev.stop_propagation();

    let _ = handle.set_pointer_capture(ev.pointer_id());
    d.capture = Some((handle, ev.pointer_id()));
    d.retired = None;
    d.window = Some(WindowListeners::attach(Rc::downgrade(&driver)));
}

fn handle_move(driver: &Weak<RefCell<Driver>>, ev: &PointerEvent) {
    let Some(driver) = driver.upgrade() else {
        return;
    };
    let (x, y) = client_point(ev);
    if driver.borrow_mut().engine.track(ev.pointer_id(), x, y) {
        ev.prevent_default();
    }
}

fn handle_up(driver: &Weak<RefCell<Driver>>, ev: &PointerEvent) {
    let Some(driver) = driver.upgrade() else {
        return;
    };
    let settled = {
        let mut d = driver.borrow_mut();
        if d.engine.active_pointer() != Some(ev.pointer_id()) {
            return;
        }
        ev.prevent_default();
        let (x, y) = client_point(ev);
        let settled = d.engine.release(ev.pointer_id(), x, y);
        d.finish();
        settled
    };
    if let Some(settled) = settled {
        persist(settled);
    }
}

fn handle_cancel(driver: &Weak<RefCell<Driver>>, ev: &PointerEvent) {
    let Some(driver) = driver.upgrade() else {
        return;
    };
    let mut d = driver.borrow_mut();
    if d.engine.cancel(ev.pointer_id()) {
        ev.prevent_default();
        d.finish();
    }
}

/// Run the drop's handler; a rejected future goes to the binding's error hook.
fn persist(settled: Settled<Element>) {
    let Some(work) = settled.dispatch() else {
        return;
    };
    spawn_local(async move {
        if let Err(cause) = work.await {
            log::error!("{}: {cause}", settled.error_message());
            settled.report(&cause);
        }
    });
}
