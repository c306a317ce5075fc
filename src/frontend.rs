use crate::config::SiteConfig;
use crate::logging::print_banner;
use crate::page::{Page, Rect};
use crate::reveal::{ObserverOptions, VisibilityEntry};
use crate::site::Site;
use crate::timing::{Scheduler, Tick, TimerId};
use gloo_timers::callback::{Interval, Timeout};
use js_sys::Array;
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::{Rc, Weak},
};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, Element, Event, EventTarget, FormData, HtmlElement,
    HtmlFormElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    ScrollBehavior, ScrollToOptions, Window,
};

struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    fn html(element: &Element) -> Option<&HtmlElement> {
        element.dyn_ref::<HtmlElement>()
    }
}

impl Page for DomPage {
    type Element = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|index| nodes.get(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn set_class(&self, element: &Element, class: &str, present: bool) {
        let classes = element.class_list();
        let _ = if present {
            classes.add_1(class)
        } else {
            classes.remove_1(class)
        };
    }

    fn style(&self, element: &Element, property: &str) -> String {
        Self::html(element)
            .and_then(|html| html.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        let Some(html) = Self::html(element) else {
            return;
        };
        let style = html.style();
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn text(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    fn offset_top(&self, element: &Element) -> f64 {
        Self::html(element)
            .map(|html| f64::from(html.offset_top()))
            .unwrap_or(0.0)
    }

    fn offset_height(&self, element: &Element) -> f64 {
        Self::html(element)
            .map(|html| f64::from(html.offset_height()))
            .unwrap_or(0.0)
    }

    fn offset_size(&self, element: &Element) -> (f64, f64) {
        Self::html(element)
            .map(|html| (f64::from(html.offset_width()), f64::from(html.offset_height())))
            .unwrap_or((0.0, 0.0))
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        let _ = parent.append_child(child);
    }

    fn remove(&self, element: &Element) {
        element.remove();
    }

    fn head(&self) -> Option<Element> {
        self.document.head().map(Element::from)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn inner_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0)
    }

    fn inner_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_to_smooth(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn form_fields(&self, form: &Element) -> Vec<(String, String)> {
        let Some(form) = form.dyn_ref::<HtmlFormElement>() else {
            return Vec::new();
        };
        let Ok(data) = FormData::new_with_form(form) else {
            return Vec::new();
        };
        let Ok(Some(entries)) = js_sys::try_iter(&data) else {
            return Vec::new();
        };

        entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let pair = entry.dyn_into::<Array>().ok()?;
                let name = pair.get(0).as_string()?;
                Some((name, pair.get(1).as_string().unwrap_or_default()))
            })
            .collect()
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }
}

enum Timer {
    Once(Timeout),
    Repeating(Interval),
}

type TimerTable = RefCell<HashMap<TimerId, Timer>>;

// A timer drops its own entry once it has fired or stopped.
struct BrowserScheduler {
    next_id: Cell<u64>,
    timers: Rc<TimerTable>,
}

impl BrowserScheduler {
    fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            timers: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    fn allocate(&self) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TimerId(id)
    }
}

fn release(timers: &Weak<TimerTable>, id: TimerId) -> Option<Timer> {
    let timers = timers.upgrade()?;
    let released = timers.borrow_mut().remove(&id);
    released
}

impl Scheduler for BrowserScheduler {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.allocate();
        let timers = Rc::downgrade(&self.timers);
        let timeout = Timeout::new(delay_ms, move || {
            let _finished = release(&timers, id);
            callback();
        });
        self.timers.borrow_mut().insert(id, Timer::Once(timeout));
        id
    }

    fn set_interval(&self, period_ms: u32, mut callback: Box<dyn FnMut() -> Tick>) -> TimerId {
        let id = self.allocate();
        let timers = Rc::downgrade(&self.timers);
        let interval = Interval::new(period_ms, move || {
            if callback() == Tick::Stop {
                let _stopped = release(&timers, id);
            }
        });
        self.timers.borrow_mut().insert(id, Timer::Repeating(interval));
        id
    }

    fn clear(&self, id: TimerId) {
        let _cancelled = self.timers.borrow_mut().remove(&id);
    }
}

fn listen(target: &EventTarget, kind: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn observe_visibility(
    targets: &[Element],
    options: ObserverOptions,
    handler: impl Fn(&[VisibilityEntry<Element>]) -> Vec<Element> + 'static,
) {
    if targets.is_empty() {
        return;
    }

    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            let entries: Vec<VisibilityEntry<Element>> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| VisibilityEntry {
                    target: entry.target(),
                    is_intersecting: entry.is_intersecting(),
                })
                .collect();
            for element in handler(&entries) {
                observer.unobserve(&element);
            }
        },
    );

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(options.threshold));
    init.set_root_margin(&options.root_margin());
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init);
    let Ok(observer) = observer else {
        return;
    };
    for target in targets {
        observer.observe(target);
    }
    callback.forget();
}

fn read_config(document: &Document) -> SiteConfig {
    let body = document.body();
    SiteConfig::from_dataset(|key| body.as_ref()?.get_attribute(&format!("data-{key}")))
}

fn start(window: Window, document: Document) {
    let config = read_config(&document);
    let page = Rc::new(DomPage {
        window: window.clone(),
        document: document.clone(),
    });
    let site = Rc::new(Site::init(page, Rc::new(BrowserScheduler::new()), config));
    let bindings = site.bindings();

    if let Some(toggle) = &bindings.menu_toggle {
        let site = Rc::clone(&site);
        listen(toggle, "click", move |_| site.on_menu_toggle());
    }

    for link in &bindings.nav_links {
        let site = Rc::clone(&site);
        listen(link, "click", move |_| site.on_nav_link_click());
    }

    for link in &bindings.anchor_links {
        let site = Rc::clone(&site);
        let target = link.clone();
        listen(link, "click", move |event| {
            if site.on_anchor_click(&target) {
                event.prevent_default();
            }
        });
    }

    {
        let site = Rc::clone(&site);
        listen(&window, "scroll", move |_| site.on_scroll());
    }

    {
        let site = Rc::clone(&site);
        listen(&window, "resize", move |_| site.on_resize());
    }

    for element in &bindings.tooltip_targets {
        let enter_site = Rc::clone(&site);
        let enter_target = element.clone();
        listen(element, "mouseenter", move |_| enter_site.on_pointer_enter(&enter_target));

        let leave_site = Rc::clone(&site);
        let leave_target = element.clone();
        listen(element, "mouseleave", move |_| leave_site.on_pointer_leave(&leave_target));
    }

    for form in &bindings.contact_forms {
        let site = Rc::clone(&site);
        let target = form.clone();
        listen(form, "submit", move |event| {
            if site.on_submit(&target) {
                event.prevent_default();
            }
        });
    }

    {
        let site_for_fade = Rc::clone(&site);
        observe_visibility(&bindings.fade_targets, site.fade_options(), move |entries| {
            site_for_fade.on_fade_entries(entries)
        });
        let site_for_counters = Rc::clone(&site);
        observe_visibility(&bindings.counter_targets, site.counter_options(), move |entries| {
            site_for_counters.on_counter_entries(entries)
        });
    }

    if document.ready_state() == "complete" {
        site.on_load();
    } else {
        let site = Rc::clone(&site);
        listen(&window, "load", move |_| site.on_load());
    }
}

pub fn run() {
    print_banner();

    let Some(window) = window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    if document.ready_state() == "loading" {
        let ready_window = window.clone();
        let ready_document = document.clone();
        listen(&document, "DOMContentLoaded", move |_| {
            start(ready_window.clone(), ready_document.clone())
        });
    } else {
        start(window, document);
    }
}
