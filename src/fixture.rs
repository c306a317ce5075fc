use crate::page::{Page, Rect};
use crate::reveal::{ObserverOptions, VisibilityEntry};
use crate::timing::{Scheduler, Tick, TimerId};
use scraper::{Html, Selector};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fmt::Write,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Default)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
    rect: Rect,
    initial_value: Option<String>,
}

pub struct MemoryPage {
    nodes: RefCell<Vec<Node>>,
    scroll_y: Cell<f64>,
    width: Cell<f64>,
    height: Cell<f64>,
    created_size: Cell<(f64, f64)>,
    scroll_requests: RefCell<Vec<f64>>,
}

const ROOT: usize = 0;
const HEAD: usize = 1;
const BODY: usize = 2;

impl MemoryPage {
    pub fn new() -> Self {
        let page = Self {
            nodes: RefCell::new(vec![Node {
                tag: "html".to_string(),
                ..Node::default()
            }]),
            scroll_y: Cell::new(0.0),
            width: Cell::new(1280.0),
            height: Cell::new(800.0),
            created_size: Cell::new((0.0, 0.0)),
            scroll_requests: RefCell::new(Vec::new()),
        };
        page.add(page.root(), "head", &[]);
        page.add(page.root(), "body", &[]);
        page
    }

    pub fn root(&self) -> NodeId {
        NodeId(ROOT)
    }

    pub fn head_id(&self) -> NodeId {
        NodeId(HEAD)
    }

    pub fn body_id(&self) -> NodeId {
        NodeId(BODY)
    }

    // `value` doubles as the field's reset value.
    pub fn add(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut node = Node {
            tag: tag.to_string(),
            parent: Some(parent.0),
            ..Node::default()
        };
        for (name, value) in attrs {
            match *name {
                "class" => node
                    .classes
                    .extend(value.split_whitespace().map(ToString::to_string)),
                "value" => {
                    node.initial_value = Some(value.to_string());
                    node.attrs.insert(name.to_string(), value.to_string());
                }
                _ => {
                    node.attrs.insert(name.to_string(), value.to_string());
                }
            }
        }

        let mut nodes = self.nodes.borrow_mut();
        let id = nodes.len();
        nodes.push(node);
        nodes[parent.0].children.push(id);
        NodeId(id)
    }

    pub fn place(&self, node: NodeId, rect: Rect) {
        self.nodes.borrow_mut()[node.0].rect = rect;
    }

    pub fn set_created_size(&self, width: f64, height: f64) {
        self.created_size.set((width, height));
    }

    pub fn set_scroll_y(&self, y: f64) {
        self.scroll_y.set(y);
    }

    pub fn set_inner_width(&self, width: f64) {
        self.width.set(width);
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[node.0]
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    pub fn set_field(&self, node: NodeId, value: &str) {
        self.nodes.borrow_mut()[node.0]
            .attrs
            .insert("value".to_string(), value.to_string());
    }

    pub fn scroll_requests(&self) -> Vec<f64> {
        self.scroll_requests.borrow().clone()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0]
            .children
            .iter()
            .map(|index| NodeId(*index))
            .collect()
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].tag.clone()
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = node.0;
        loop {
            if current == ROOT {
                return true;
            }
            match nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn document_order(&self) -> Vec<usize> {
        let nodes = self.nodes.borrow();
        let mut order = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(nodes[index].children.iter().rev());
        }
        order
    }

    fn descendants(&self, node: NodeId) -> Vec<usize> {
        let nodes = self.nodes.borrow();
        let mut found = Vec::new();
        let mut stack: Vec<usize> = nodes[node.0].children.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            found.push(index);
            stack.extend(nodes[index].children.iter().rev());
        }
        found
    }

    fn markup(&self) -> String {
        let nodes = self.nodes.borrow();
        let mut markup = String::from("<!DOCTYPE html>");
        write_node(&nodes, ROOT, &mut markup);
        markup
    }
}

const NODE_ATTRIBUTE: &str = "data-memory-node";

fn write_node(nodes: &[Node], index: usize, markup: &mut String) {
    let node = &nodes[index];
    let _ = write!(markup, "<{} {NODE_ATTRIBUTE}=\"{index}\"", node.tag);
    if !node.classes.is_empty() {
        let _ = write!(markup, " class=\"{}\"", escape_attribute(&node.classes.join(" ")));
    }
    for (name, value) in &node.attrs {
        let _ = write!(markup, " {name}=\"{}\"", escape_attribute(value));
    }
    markup.push('>');
    for child in &node.children {
        write_node(nodes, *child, markup);
    }
    let _ = write!(markup, "</{}>", node.tag);
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

impl Page for MemoryPage {
    type Element = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        let document = Html::parse_document(&self.markup());
        document
            .select(&selector)
            .filter_map(|element| element.value().attr(NODE_ATTRIBUTE)?.parse().ok())
            .map(NodeId)
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        self.document_order()
            .into_iter()
            .find(|index| nodes[*index].attrs.get("id").map(String::as_str) == Some(id))
            .map(NodeId)
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        let nodes = self.nodes.borrow();
        let node = &nodes[element.0];
        if name == "class" {
            return Some(node.classes.join(" "));
        }
        node.attrs.get(name).cloned()
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[element.0]
            .classes
            .iter()
            .any(|existing| existing == class)
    }

    fn set_class(&self, element: &NodeId, class: &str, present: bool) {
        let mut nodes = self.nodes.borrow_mut();
        let classes = &mut nodes[element.0].classes;
        classes.retain(|existing| existing != class);
        if present {
            classes.push(class.to_string());
        }
    }

    fn style(&self, element: &NodeId, property: &str) -> String {
        self.nodes.borrow()[element.0]
            .style
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let style = &mut nodes[element.0].style;
        if value.is_empty() {
            style.remove(property);
        } else {
            style.insert(property.to_string(), value.to_string());
        }
    }

    fn text(&self, element: &NodeId) -> String {
        self.nodes.borrow()[element.0].text.clone()
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        self.nodes.borrow_mut()[element.0].text = text.to_string();
    }

    fn bounding_rect(&self, element: &NodeId) -> Rect {
        let rect = self.nodes.borrow()[element.0].rect;
        Rect {
            top: rect.top - self.scroll_y.get(),
            ..rect
        }
    }

    fn offset_top(&self, element: &NodeId) -> f64 {
        self.nodes.borrow()[element.0].rect.top
    }

    fn offset_height(&self, element: &NodeId) -> f64 {
        self.nodes.borrow()[element.0].rect.height
    }

    fn offset_size(&self, element: &NodeId) -> (f64, f64) {
        let rect = self.nodes.borrow()[element.0].rect;
        (rect.width, rect.height)
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        let (width, height) = self.created_size.get();
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node {
            tag: tag.to_string(),
            rect: Rect::new(0.0, 0.0, width, height),
            ..Node::default()
        });
        Some(NodeId(nodes.len() - 1))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.remove(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent.0);
        nodes[parent.0].children.push(child.0);
    }

    fn remove(&self, element: &NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[element.0].parent.take() {
            nodes[parent].children.retain(|child| *child != element.0);
        }
    }

    fn head(&self) -> Option<NodeId> {
        Some(self.head_id())
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.body_id())
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn inner_width(&self) -> f64 {
        self.width.get()
    }

    fn inner_height(&self) -> f64 {
        self.height.get()
    }

    fn scroll_to_smooth(&self, top: f64) {
        self.scroll_requests.borrow_mut().push(top);
    }

    fn form_fields(&self, form: &NodeId) -> Vec<(String, String)> {
        let fields = self.descendants(*form);
        let nodes = self.nodes.borrow();
        fields
            .into_iter()
            .filter_map(|index| {
                let node = &nodes[index];
                let name = node.attrs.get("name")?;
                let value = node.attrs.get("value").cloned().unwrap_or_default();
                Some((name.clone(), value))
            })
            .collect()
    }

    fn reset_form(&self, form: &NodeId) {
        let fields = self.descendants(*form);
        let mut nodes = self.nodes.borrow_mut();
        for index in fields {
            let node = &mut nodes[index];
            if !node.attrs.contains_key("name") {
                continue;
            }
            let initial = node.initial_value.clone().unwrap_or_default();
            node.attrs.insert("value".to_string(), initial);
        }
    }
}

enum Job {
    Once(Box<dyn FnOnce()>),
    Every(u32, Box<dyn FnMut() -> Tick>),
}

struct Pending {
    due: u64,
    job: Job,
}

pub struct ManualScheduler {
    now: Cell<u64>,
    next_id: Cell<u64>,
    pending: RefCell<BTreeMap<TimerId, Pending>>,
    running: Cell<Option<TimerId>>,
    running_cleared: Cell<bool>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            next_id: Cell::new(1),
            pending: RefCell::new(BTreeMap::new()),
            running: Cell::new(None),
            running_cleared: Cell::new(false),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        loop {
            let next = {
                let pending = self.pending.borrow();
                pending
                    .iter()
                    .filter(|(_, entry)| entry.due <= target)
                    .min_by_key(|(id, entry)| (entry.due, **id))
                    .map(|(id, _)| *id)
            };
            let Some(id) = next else {
                break;
            };
            let entry = self
                .pending
                .borrow_mut()
                .remove(&id)
                .expect("timer listed as pending");
            self.now.set(entry.due);

            match entry.job {
                Job::Once(callback) => callback(),
                Job::Every(period, mut callback) => {
                    self.running.set(Some(id));
                    self.running_cleared.set(false);
                    let tick = callback();
                    self.running.set(None);
                    if tick == Tick::Continue && !self.running_cleared.get() {
                        self.pending.borrow_mut().insert(
                            id,
                            Pending {
                                due: entry.due + u64::from(period),
                                job: Job::Every(period, callback),
                            },
                        );
                    }
                }
            }
        }
        self.now.set(target);
    }

    fn allocate(&self) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TimerId(id)
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.allocate();
        self.pending.borrow_mut().insert(
            id,
            Pending {
                due: self.now.get() + u64::from(delay_ms),
                job: Job::Once(callback),
            },
        );
        id
    }

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut() -> Tick>) -> TimerId {
        let id = self.allocate();
        let period = period_ms.max(1);
        self.pending.borrow_mut().insert(
            id,
            Pending {
                due: self.now.get() + u64::from(period),
                job: Job::Every(period, callback),
            },
        );
        id
    }

    fn clear(&self, id: TimerId) {
        if self.running.get() == Some(id) {
            self.running_cleared.set(true);
            return;
        }
        self.pending.borrow_mut().remove(&id);
    }
}

pub fn intersection_ratio(rect: Rect, width: f64, height: f64, bottom_margin: f64) -> f64 {
    let root_bottom = height + bottom_margin;
    let overlap_width = rect.right().min(width) - rect.left.max(0.0);
    let overlap_height = rect.bottom().min(root_bottom) - rect.top.max(0.0);
    if overlap_width < 0.0 || overlap_height < 0.0 {
        return 0.0;
    }

    let area = rect.width * rect.height;
    if area <= 0.0 {
        return 1.0;
    }
    (overlap_width * overlap_height / area).clamp(0.0, 1.0)
}

// Mirrors IntersectionObserver delivery: one entry per target on first sight,
// then one whenever `is_intersecting` flips. Any visible overlap intersects.
pub struct ViewportObserver {
    options: ObserverOptions,
    reported: RefCell<Vec<(NodeId, bool)>>,
}

impl ViewportObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            reported: RefCell::new(Vec::new()),
        }
    }

    pub fn entries(&self, page: &MemoryPage, targets: &[NodeId]) -> Vec<VisibilityEntry<NodeId>> {
        let mut reported = self.reported.borrow_mut();
        let mut entries = Vec::new();
        for target in targets {
            let ratio = intersection_ratio(
                page.bounding_rect(target),
                page.inner_width(),
                page.inner_height(),
                self.options.bottom_margin,
            );
            let is_intersecting = ratio > 0.0;
            match reported.iter_mut().find(|(node, _)| node == target) {
                Some((_, last)) if *last == is_intersecting => continue,
                Some((_, last)) => *last = is_intersecting,
                None => reported.push((*target, is_intersecting)),
            }
            entries.push(VisibilityEntry {
                target: *target,
                is_intersecting,
            });
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_matcher_handles_descendants_and_attribute_prefixes() {
        let page = MemoryPage::new();
        let nav = page.add(page.body_id(), "nav", &[("class", "nav-menu")]);
        let list = page.add(nav, "ul", &[]);
        let anchor = page.add(list, "a", &[("href", "#about")]);
        let external = page.add(list, "a", &[("href", "/blog")]);
        let outside = page.add(page.body_id(), "a", &[("href", "#top")]);

        assert_eq!(page.query_all(".nav-menu a"), vec![anchor, external]);
        assert_eq!(page.query_all(".nav-menu a[href^=\"#\"]"), vec![anchor]);
        assert_eq!(page.query_all("a[href^=\"#\"]"), vec![anchor, outside]);
        assert_eq!(page.query("section[id]"), None);
    }

    #[test]
    fn selector_matcher_handles_quoted_spaces_and_child_combinator() {
        let page = MemoryPage::new();
        let nav = page.add(page.body_id(), "nav", &[("class", "nav-menu")]);
        let direct = page.add(nav, "a", &[("href", "#top")]);
        let list = page.add(nav, "ul", &[]);
        page.add(list, "a", &[("href", "#deep")]);
        let hint = page.add(page.body_id(), "span", &[("data-tooltip", "two words")]);

        assert_eq!(page.query_all(".nav-menu > a"), vec![direct]);
        assert_eq!(page.query_all("[data-tooltip=\"two words\"]"), vec![hint]);
    }

    #[test]
    fn detached_nodes_are_not_matched() {
        let page = MemoryPage::new();
        let label = page.create_element("div").expect("created");
        page.set_class(&label, "tooltip", true);
        assert!(page.query_all(".tooltip").is_empty());

        page.append_child(&page.body_id(), &label);
        assert_eq!(page.query_all(".tooltip"), vec![label]);
    }

    #[test]
    fn ratio_respects_bottom_inset() {
        let full = Rect::new(0.0, 100.0, 200.0, 100.0);
        assert_eq!(intersection_ratio(full, 1280.0, 800.0, -50.0), 1.0);

        let edge = Rect::new(0.0, 740.0, 200.0, 100.0);
        assert!((intersection_ratio(edge, 1280.0, 800.0, -50.0) - 0.1).abs() < 1e-9);

        let below = Rect::new(0.0, 760.0, 200.0, 100.0);
        assert_eq!(intersection_ratio(below, 1280.0, 800.0, -50.0), 0.0);
    }

    #[test]
    fn observer_reports_first_sight_then_only_changes() {
        let page = MemoryPage::new();
        let card = page.add(page.body_id(), "div", &[]);
        page.place(card, Rect::new(0.0, 1000.0, 200.0, 100.0));
        let observer = ViewportObserver::new(ObserverOptions {
            threshold: 0.1,
            bottom_margin: -50.0,
        });

        assert_eq!(
            observer.entries(&page, &[card]),
            vec![VisibilityEntry {
                target: card,
                is_intersecting: false
            }]
        );
        assert!(observer.entries(&page, &[card]).is_empty());

        page.set_scroll_y(500.0);
        let entered = observer.entries(&page, &[card]);
        assert_eq!(entered.len(), 1);
        assert!(entered[0].is_intersecting);
    }
}
