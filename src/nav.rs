use crate::logging::{log_event, LogLevel};
use crate::page::Page;
use crate::timing::{Debouncer, Scheduler, Throttle};
use serde_json::json;
use std::rc::Rc;

pub const MENU_TOGGLE_SELECTOR: &str = ".mobile-menu-toggle";
pub const NAV_MENU_SELECTOR: &str = ".nav-menu";
pub const NAV_LINK_SELECTOR: &str = ".nav-menu a";
pub const NAV_ANCHOR_SELECTOR: &str = ".nav-menu a[href^=\"#\"]";
pub const SECTION_SELECTOR: &str = "section[id]";
const ACTIVE_CLASS: &str = "active";

// Open state is the `active` class on both the nav and the toggle.
pub struct Menu<P: Page> {
    page: Rc<P>,
    toggle: P::Element,
    nav: P::Element,
    log_level: LogLevel,
}

impl<P: Page> Menu<P> {
    pub fn locate(page: Rc<P>, log_level: LogLevel) -> Option<Self> {
        let toggle = page.query(MENU_TOGGLE_SELECTOR)?;
        let nav = page.query(NAV_MENU_SELECTOR)?;
        Some(Self {
            page,
            toggle,
            nav,
            log_level,
        })
    }

    pub fn toggle_element(&self) -> &P::Element {
        &self.toggle
    }

    pub fn is_open(&self) -> bool {
        self.page.has_class(&self.nav, ACTIVE_CLASS)
    }

    pub fn set_open(&self, open: bool) {
        self.page.set_class(&self.nav, ACTIVE_CLASS, open);
        self.page.set_class(&self.toggle, ACTIVE_CLASS, open);
        if let Some(body) = self.page.body() {
            self.page
                .set_style(&body, "overflow", if open { "hidden" } else { "" });
        }
    }

    pub fn toggle(&self) -> bool {
        let open = !self.is_open();
        self.set_open(open);
        log_event(
            self.log_level,
            LogLevel::Debug,
            "menu_toggled",
            json!({ "open": open }),
        );
        open
    }

    pub fn close(&self) {
        self.set_open(false);
    }
}

pub struct ResizeReset<P: Page, S: Scheduler> {
    menu: Rc<Menu<P>>,
    scheduler: Rc<S>,
    debouncer: Debouncer,
    breakpoint: f64,
}

impl<P: Page + 'static, S: Scheduler> ResizeReset<P, S> {
    pub fn new(menu: Rc<Menu<P>>, scheduler: Rc<S>, quiet_ms: u32, breakpoint: f64) -> Self {
        Self {
            menu,
            scheduler,
            debouncer: Debouncer::new(quiet_ms),
            breakpoint,
        }
    }

    pub fn on_resize(&self) {
        let menu = Rc::clone(&self.menu);
        let breakpoint = self.breakpoint;
        self.debouncer.trigger(
            &*self.scheduler,
            Box::new(move || {
                let width = menu.page.inner_width();
                if width > breakpoint && menu.is_open() {
                    menu.close();
                    log_event(
                        menu.log_level,
                        LogLevel::Debug,
                        "menu_force_closed",
                        json!({ "width": width }),
                    );
                }
            }),
        );
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionSpan {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

pub fn active_section(scroll_y: f64, spans: &[SectionSpan]) -> Option<&str> {
    spans
        .iter()
        .filter(|span| scroll_y >= span.top && scroll_y < span.top + span.height)
        .last()
        .map(|span| span.id.as_str())
}

pub struct SectionHighlighter<P: Page, S: Scheduler> {
    page: Rc<P>,
    scheduler: Rc<S>,
    sections: Vec<P::Element>,
    links: Vec<P::Element>,
    offset: f64,
    throttle: Throttle,
}

impl<P: Page, S: Scheduler> SectionHighlighter<P, S> {
    pub fn new(page: Rc<P>, scheduler: Rc<S>, offset: f64, throttle_ms: u32) -> Self {
        let sections = page.query_all(SECTION_SELECTOR);
        let links = page.query_all(NAV_ANCHOR_SELECTOR);
        Self {
            page,
            scheduler,
            sections,
            links,
            offset,
            throttle: Throttle::new(throttle_ms),
        }
    }

    pub fn on_scroll(&self) {
        if self.sections.is_empty() && self.links.is_empty() {
            return;
        }
        if !self.throttle.admit(&*self.scheduler) {
            return;
        }

        let spans: Vec<SectionSpan> = self
            .sections
            .iter()
            .filter_map(|section| {
                Some(SectionSpan {
                    id: self.page.attribute(section, "id")?,
                    top: self.page.offset_top(section) - self.offset,
                    height: self.page.offset_height(section),
                })
            })
            .collect();
        // Above the first section a bare `#` link counts as current.
        let current = active_section(self.page.scroll_y(), &spans).unwrap_or("");

        for link in &self.links {
            self.page.set_class(link, ACTIVE_CLASS, false);
            let href = self.page.attribute(link, "href");
            if href.as_deref().and_then(|href| href.strip_prefix('#')) == Some(current) {
                self.page.set_class(link, ACTIVE_CLASS, true);
            }
        }
    }
}
